// src/api/users.rs

use actix_web::{delete, get, put, web, HttpResponse, Responder};
use bcrypt::{hash, DEFAULT_COST};
use serde::Deserialize;
use serde_json::json;
use sqlx::postgres::PgRow;
use sqlx::Row;
use utoipa::ToSchema;

use crate::models::{UserBrief, UserDetail};
use crate::{db, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub avatar: Option<String>,
    pub password: Option<String>,
}

fn map_brief(r: &PgRow) -> UserBrief {
    UserBrief {
        id: r.get("id"),
        username: r.get("username"),
        email: r.get("email"),
    }
}

async fn fetch_detail(
    pool: &sqlx::PgPool,
    user_id: i32,
) -> Result<Option<UserDetail>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, username, email, first_name, last_name, phone, city, avatar,
                  is_moderator, is_active, last_login, date_joined
           FROM users
           WHERE id = $1"#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let payments = db::list_user_payments(pool, user_id).await?;

    Ok(Some(UserDetail {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        phone: row.get("phone"),
        city: row.get("city"),
        avatar: row.get("avatar"),
        is_moderator: row.get("is_moderator"),
        is_active: row.get("is_active"),
        last_login: row.get("last_login"),
        date_joined: row.get("date_joined"),
        payments,
    }))
}

#[utoipa::path(
    context_path = "/api",
    tag = "users",
    responses((status = 200, description = "User list, restricted fields", body = [UserBrief]))
)]
#[get("/users")]
pub async fn list_users(state: web::Data<AppState>) -> impl Responder {
    let rows = match sqlx::query("SELECT id, username, email FROM users ORDER BY id")
        .fetch_all(&state.pool)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("list users db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let users: Vec<UserBrief> = rows.iter().map(map_brief).collect();
    HttpResponse::Ok().json(users)
}

/// Own profile comes back in full, including payments; anyone else's
/// profile only shows the restricted fields.
#[utoipa::path(
    context_path = "/api",
    tag = "users",
    responses(
        (status = 200, description = "Profile", body = UserDetail),
        (status = 404, description = "User not found")
    )
)]
#[get("/users/{id}")]
pub async fn retrieve_user(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> impl Responder {
    let requester_id = *user_id;
    let target_id = path.into_inner();

    if requester_id == target_id {
        return match fetch_detail(&state.pool, target_id).await {
            Ok(Some(detail)) => HttpResponse::Ok().json(detail),
            Ok(None) => HttpResponse::NotFound().json(json!({ "error": "user not found" })),
            Err(e) => {
                log::error!("retrieve user error: {e}");
                HttpResponse::InternalServerError().finish()
            }
        };
    }

    let row = match sqlx::query("SELECT id, username, email FROM users WHERE id = $1")
        .bind(target_id)
        .fetch_optional(&state.pool)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("retrieve user error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match row {
        Some(r) => HttpResponse::Ok().json(map_brief(&r)),
        None => HttpResponse::NotFound().json(json!({ "error": "user not found" })),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserDetail),
        (status = 403, description = "Only the profile owner may update"),
        (status = 404, description = "User not found")
    )
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
    payload: web::Json<UpdateUserRequest>,
) -> impl Responder {
    let requester_id = *user_id;
    let target_id = path.into_inner();

    if requester_id != target_id {
        return HttpResponse::Forbidden().json(json!({ "error": "forbidden" }));
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => match hash(password, DEFAULT_COST) {
            Ok(h) => Some(h),
            Err(e) => {
                log::error!("bcrypt hash error: {e}");
                return HttpResponse::InternalServerError().finish();
            }
        },
        None => None,
    };

    let result = sqlx::query(
        r#"UPDATE users
           SET username = COALESCE($1, username),
               first_name = COALESCE($2, first_name),
               last_name = COALESCE($3, last_name),
               phone = COALESCE($4, phone),
               city = COALESCE($5, city),
               avatar = COALESCE($6, avatar),
               password_hash = COALESCE($7, password_hash)
           WHERE id = $8"#,
    )
    .bind(payload.username.as_deref())
    .bind(payload.first_name.as_deref())
    .bind(payload.last_name.as_deref())
    .bind(payload.phone.as_deref())
    .bind(payload.city.as_deref())
    .bind(payload.avatar.as_deref())
    .bind(password_hash)
    .bind(target_id)
    .execute(&state.pool)
    .await;

    if let Err(e) = result {
        log::warn!("update user db error: {e}");
        return HttpResponse::BadRequest().json(json!({
            "error": "username already taken or invalid data"
        }));
    }

    log::info!("user {target_id} profile updated");

    match fetch_detail(&state.pool, target_id).await {
        Ok(Some(detail)) => HttpResponse::Ok().json(detail),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "user not found" })),
        Err(e) => {
            log::error!("retrieve user error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "users",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 403, description = "Only the profile owner may delete")
    )
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> impl Responder {
    let requester_id = *user_id;
    let target_id = path.into_inner();

    if requester_id != target_id {
        return HttpResponse::Forbidden().json(json!({ "error": "forbidden" }));
    }

    if let Err(e) = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(target_id)
        .execute(&state.pool)
        .await
    {
        log::error!("delete user db error: {e}");
        return HttpResponse::InternalServerError().finish();
    }

    log::warn!("user {target_id} deleted their account");
    HttpResponse::NoContent().finish()
}
