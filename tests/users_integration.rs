use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::Row;
use uuid::Uuid;

use lms_backend::api::auth::JwtMiddleware;
use lms_backend::api::users::{delete_user, list_users, retrieve_user, update_user};

mod support;

macro_rules! user_app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data($state).service(
                web::scope("/api")
                    .wrap(JwtMiddleware)
                    .service(list_users)
                    .service(retrieve_user)
                    .service(update_user)
                    .service(delete_user),
            ),
        )
        .await
    };
}

#[actix_web::test]
async fn user_list_exposes_restricted_fields_only() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let user_id = support::create_user(pool, &suffix).await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = user_app!(state);

    let req = TestRequest::get()
        .uri("/api/users")
        .insert_header(support::auth_header(user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    let users = body.as_array().expect("user array");
    assert!(!users.is_empty());
    for user in users {
        assert!(user.get("username").is_some());
        assert!(user.get("phone").is_none());
        assert!(user.get("payments").is_none());
    }
}

#[actix_web::test]
async fn own_profile_is_detailed_foreign_profile_is_restricted() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let user_id = support::create_user(pool, &suffix).await;
    let other_id = support::create_user(pool, &format!("other_{suffix}")).await;

    sqlx::query("UPDATE users SET city = 'Almaty' WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("set city");

    sqlx::query(
        r#"INSERT INTO payments (user_id, amount, method)
           VALUES ($1, 1500.00, 'transfer')"#,
    )
    .bind(user_id)
    .execute(pool)
    .await
    .expect("insert payment");

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = user_app!(state);

    let req = TestRequest::get()
        .uri(&format!("/api/users/{user_id}"))
        .insert_header(support::auth_header(user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["city"].as_str(), Some("Almaty"));
    let payments = body["payments"].as_array().expect("payments array");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["amount"].as_str(), Some("1500.00"));

    let req = TestRequest::get()
        .uri(&format!("/api/users/{user_id}"))
        .insert_header(support::auth_header(other_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("city").is_none());
    assert!(body.get("payments").is_none());
    assert!(body.get("username").is_some());
}

#[actix_web::test]
async fn only_profile_owner_updates_profile() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let user_id = support::create_user(pool, &suffix).await;
    let other_id = support::create_user(pool, &format!("other_{suffix}")).await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = user_app!(state);

    let req = TestRequest::put()
        .uri(&format!("/api/users/{user_id}"))
        .insert_header(support::auth_header(other_id))
        .set_json(json!({ "city": "Elsewhere" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 403);

    let req = TestRequest::put()
        .uri(&format!("/api/users/{user_id}"))
        .insert_header(support::auth_header(user_id))
        .set_json(json!({ "city": "Astana", "phone": "+7 700 000 00 00" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["city"].as_str(), Some("Astana"));

    let city: Option<String> = sqlx::query("SELECT city FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("select city")
        .get("city");
    assert_eq!(city.as_deref(), Some("Astana"));
}

#[actix_web::test]
async fn only_profile_owner_deletes_account() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let suffix = Uuid::new_v4().simple().to_string();
    let user_id = support::create_user(pool, &suffix).await;
    let other_id = support::create_user(pool, &format!("other_{suffix}")).await;

    let state = web::Data::new(support::build_state(pool.clone()));
    let app = user_app!(state);

    let req = TestRequest::delete()
        .uri(&format!("/api/users/{user_id}"))
        .insert_header(support::auth_header(other_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 403);

    let req = TestRequest::delete()
        .uri(&format!("/api/users/{user_id}"))
        .insert_header(support::auth_header(user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);

    let remaining: i64 = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("count users")
        .get("count");
    assert_eq!(remaining, 0);
}
