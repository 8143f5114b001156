use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::refresh,
        crate::api::users::list_users,
        crate::api::users::retrieve_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::courses::create_course,
        crate::api::courses::list_courses,
        crate::api::courses::retrieve_course,
        crate::api::courses::update_course,
        crate::api::courses::delete_course,
        crate::api::lessons::create_lesson,
        crate::api::lessons::list_lessons,
        crate::api::lessons::retrieve_lesson,
        crate::api::lessons::update_lesson,
        crate::api::lessons::delete_lesson,
        crate::api::payments::list_payments,
        crate::api::payments::retrieve_payment,
        crate::api::payments::create_payment,
        crate::api::payments::check_payment_status,
        crate::api::subscriptions::toggle_subscription
    ),
    components(
        schemas(
            crate::api::auth::RegisterRequest,
            crate::api::auth::LoginRequest,
            crate::api::auth::RefreshRequest,
            crate::api::auth::AuthResponse,
            crate::api::users::UpdateUserRequest,
            crate::api::courses::CourseRequest,
            crate::api::lessons::LessonRequest,
            crate::api::payments::CreatePaymentRequest,
            crate::api::subscriptions::SubscriptionRequest,
            crate::models::UserBrief,
            crate::models::UserDetail,
            crate::models::Course,
            crate::models::CourseDetail,
            crate::models::Lesson,
            crate::models::Payment,
            crate::models::Subscription
        )
    ),
    tags(
        (name = "auth", description = "Registration and JWT issuance"),
        (name = "users", description = "User profiles"),
        (name = "courses", description = "Course catalog"),
        (name = "lessons", description = "Course lessons"),
        (name = "payments", description = "Payments and checkout sessions"),
        (name = "subscriptions", description = "Course update subscriptions")
    )
)]
pub struct ApiDoc;
