use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::Row;
use uuid::Uuid;

use lms_backend::api::auth::JwtMiddleware;
use lms_backend::api::lessons::{
    create_lesson, delete_lesson, list_lessons, retrieve_lesson, update_lesson,
};

mod support;

macro_rules! lesson_app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data($state).service(
                web::scope("/api")
                    .wrap(JwtMiddleware)
                    .service(create_lesson)
                    .service(list_lessons)
                    .service(retrieve_lesson)
                    .service(update_lesson)
                    .service(delete_lesson),
            ),
        )
        .await
    };
}

#[actix_web::test]
async fn owner_creates_lesson_in_course() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let owner_id = support::create_user(pool, &suffix).await;
    let course_id = support::create_course(pool, owner_id, "Course with Lessons").await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = lesson_app!(state);

    let req = TestRequest::post()
        .uri("/api/lessons")
        .insert_header(support::auth_header(owner_id))
        .set_json(json!({
            "name": "Lesson One",
            "description": "Intro video: https://youtu.be/abc123",
            "course_id": course_id
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["course_id"].as_i64(), Some(course_id as i64));
    assert_eq!(body["owner_id"].as_i64(), Some(owner_id as i64));
}

#[actix_web::test]
async fn lesson_in_unknown_course_is_rejected() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let owner_id = support::create_user(pool, &suffix).await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = lesson_app!(state);

    let req = TestRequest::post()
        .uri("/api/lessons")
        .insert_header(support::auth_header(owner_id))
        .set_json(json!({
            "name": "Orphan Lesson",
            "description": "No course to hold me",
            "course_id": 999_999
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn lesson_description_link_validation() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let owner_id = support::create_user(pool, &suffix).await;
    let course_id = support::create_course(pool, owner_id, "Validation Course").await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = lesson_app!(state);

    let req = TestRequest::post()
        .uri("/api/lessons")
        .insert_header(support::auth_header(owner_id))
        .set_json(json!({
            "name": "Bad Lesson",
            "description": "Mirror at http://dailymotion.com/video/xyz",
            "course_id": course_id
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn moderator_updates_lesson_but_cannot_delete() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let owner_id = support::create_user(pool, &suffix).await;
    let moderator_id = support::create_moderator(pool, &suffix).await;
    let course_id = support::create_course(pool, owner_id, "Moderated Course").await;
    let lesson_id = support::create_lesson(pool, course_id, owner_id, "Moderated Lesson").await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = lesson_app!(state);

    let req = TestRequest::put()
        .uri(&format!("/api/lessons/{lesson_id}"))
        .insert_header(support::auth_header(moderator_id))
        .set_json(json!({
            "name": "Moderated Lesson (edited)",
            "description": "Fixed a typo",
            "course_id": course_id
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let req = TestRequest::delete()
        .uri(&format!("/api/lessons/{lesson_id}"))
        .insert_header(support::auth_header(moderator_id))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 403);
}

#[actix_web::test]
async fn owner_deletes_lesson() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let owner_id = support::create_user(pool, &suffix).await;
    let course_id = support::create_course(pool, owner_id, "Short-lived Course").await;
    let lesson_id = support::create_lesson(pool, course_id, owner_id, "Short-lived Lesson").await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = lesson_app!(state);

    let req = TestRequest::delete()
        .uri(&format!("/api/lessons/{lesson_id}"))
        .insert_header(support::auth_header(owner_id))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);

    let remaining: i64 = sqlx::query("SELECT COUNT(*) AS count FROM lessons WHERE id = $1")
        .bind(lesson_id)
        .fetch_one(pool)
        .await
        .expect("count lessons")
        .get("count");
    assert_eq!(remaining, 0);
}

#[actix_web::test]
async fn other_user_reads_but_cannot_update_lesson() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let owner_id = support::create_user(pool, &suffix).await;
    let other_id = support::create_user(pool, &format!("other_{suffix}")).await;
    let course_id = support::create_course(pool, owner_id, "Readable Course").await;
    let lesson_id = support::create_lesson(pool, course_id, owner_id, "Readable Lesson").await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = lesson_app!(state);

    let req = TestRequest::get()
        .uri(&format!("/api/lessons/{lesson_id}"))
        .insert_header(support::auth_header(other_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let req = TestRequest::put()
        .uri(&format!("/api/lessons/{lesson_id}"))
        .insert_header(support::auth_header(other_id))
        .set_json(json!({
            "name": "Not Yours",
            "description": "Should be forbidden",
            "course_id": course_id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 403);
}
