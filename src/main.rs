// src/main.rs
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use dotenvy::dotenv;
use sqlx::PgPool;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use lms_backend::{api, docs, mailer::Mailer, scheduler, AppState};

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Service ready!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Fails fast instead of on the first login.
    env::var("JWT_SECRET").expect("JWT_SECRET required");

    let stripe_secret_key = env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY required");
    let app_base_url =
        env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

    let mailer = Mailer::from_env();
    if mailer.is_none() {
        log::warn!("EMAIL_* not fully configured, update notifications disabled");
    }

    if let Err(e) = scheduler::start_scheduler(pool.clone()).await {
        log::error!("scheduler start error: {e}");
    }

    let state = web::Data::new(AppState {
        pool,
        stripe_secret_key,
        app_base_url,
        mailer,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(index))
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            // Public auth routes
            .service(api::auth::register)
            .service(api::auth::login)
            .service(api::auth::refresh)
            // Everything else requires a valid access token
            .service(
                web::scope("/api")
                    .wrap(api::auth::JwtMiddleware)
                    .service(api::users::list_users)
                    .service(api::users::retrieve_user)
                    .service(api::users::update_user)
                    .service(api::users::delete_user)
                    .service(api::courses::create_course)
                    .service(api::courses::list_courses)
                    .service(api::courses::retrieve_course)
                    .service(api::courses::update_course)
                    .service(api::courses::delete_course)
                    .service(api::lessons::create_lesson)
                    .service(api::lessons::list_lessons)
                    .service(api::lessons::retrieve_lesson)
                    .service(api::lessons::update_lesson)
                    .service(api::lessons::delete_lesson)
                    .service(api::payments::list_payments)
                    .service(api::payments::retrieve_payment)
                    .service(api::payments::create_payment)
                    .service(api::payments::check_payment_status)
                    .service(api::subscriptions::toggle_subscription),
            )
    })
    .bind(("0.0.0.0", 8000))?
    .run()
    .await
}
