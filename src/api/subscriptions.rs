// src/api/subscriptions.rs

use actix_web::{post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{db, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscriptionRequest {
    pub course_id: i32,
}

/// Idempotent toggle: an existing (user, course) subscription is removed,
/// otherwise one is created.
#[utoipa::path(
    context_path = "/api",
    tag = "subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscription added"),
        (status = 204, description = "Subscription removed"),
        (status = 404, description = "Course not found")
    )
)]
#[post("/subscriptions")]
pub async fn toggle_subscription(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    payload: web::Json<SubscriptionRequest>,
) -> impl Responder {
    let user_id = *user_id;
    let course_id = payload.course_id;

    match db::course_owner(&state.pool, course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "course not found" })),
        Err(e) => {
            log::error!("course lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    let existing = match db::find_subscription(&state.pool, user_id, course_id).await {
        Ok(existing) => existing,
        Err(e) => {
            log::error!("subscription lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match existing {
        Some(subscription_id) => {
            if let Err(e) = db::delete_subscription(&state.pool, subscription_id).await {
                log::error!("subscription delete error: {e}");
                return HttpResponse::InternalServerError().finish();
            }
            log::info!("subscription to course {course_id} removed by user {user_id}");
            HttpResponse::NoContent().finish()
        }
        None => {
            if let Err(e) = db::create_subscription(&state.pool, user_id, course_id).await {
                log::error!("subscription create error: {e}");
                return HttpResponse::InternalServerError().finish();
            }
            log::info!("subscription to course {course_id} added by user {user_id}");
            HttpResponse::Created().json(json!({ "message": "subscription added" }))
        }
    }
}
