// src/api/lessons.rs

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use utoipa::ToSchema;

use crate::api::PageQuery;
use crate::models::{Lesson, Page};
use crate::{db, permissions, validators, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LessonRequest {
    pub name: String,
    pub description: String,
    pub course_id: i32,
    pub image: Option<String>,
    pub video: Option<String>,
}

#[utoipa::path(
    context_path = "/api",
    tag = "lessons",
    request_body = LessonRequest,
    responses(
        (status = 201, description = "Lesson created, requester becomes owner", body = Lesson),
        (status = 400, description = "Validation failed or unknown course")
    )
)]
#[post("/lessons")]
pub async fn create_lesson(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    payload: web::Json<LessonRequest>,
) -> impl Responder {
    let user_id = *user_id;

    if let Err(message) = validators::validate_description_links(&payload.description) {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }

    match db::course_owner(&state.pool, payload.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::BadRequest().json(json!({ "error": "course not found" })),
        Err(e) => {
            log::error!("course lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    let row = match sqlx::query(
        r#"INSERT INTO lessons (name, description, course_id, image, video, owner_id)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING id"#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.course_id)
    .bind(payload.image.as_deref())
    .bind(payload.video.as_deref())
    .bind(user_id)
    .fetch_one(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("create lesson db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let lesson_id: i32 = row.get("id");
    log::info!("lesson {} created by user {user_id}", payload.name);

    match db::get_lesson(&state.pool, lesson_id).await {
        Ok(Some(lesson)) => HttpResponse::Created().json(lesson),
        Ok(None) => HttpResponse::InternalServerError().finish(),
        Err(e) => {
            log::error!("fetch created lesson error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "lessons",
    params(PageQuery),
    responses((status = 200, description = "Paginated lesson list"))
)]
#[get("/lessons")]
pub async fn list_lessons(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let user_id = *user_id;
    let (page, page_size) = query.resolve();

    log::info!("lesson list requested by user {user_id}");

    let count = match db::count_lessons(&state.pool).await {
        Ok(c) => c,
        Err(e) => {
            log::error!("count lessons error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let results = match db::list_lessons(&state.pool, page_size, (page - 1) * page_size).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("list lessons error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    HttpResponse::Ok().json(Page {
        count,
        page,
        page_size,
        results,
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "lessons",
    responses(
        (status = 200, description = "Lesson detail", body = Lesson),
        (status = 404, description = "Lesson not found")
    )
)]
#[get("/lessons/{id}")]
pub async fn retrieve_lesson(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> impl Responder {
    let user_id = *user_id;
    let lesson_id = path.into_inner();

    match db::get_lesson(&state.pool, lesson_id).await {
        Ok(Some(lesson)) => {
            log::info!("lesson {} requested by user {user_id}", lesson.name);
            HttpResponse::Ok().json(lesson)
        }
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "lesson not found" })),
        Err(e) => {
            log::error!("retrieve lesson error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "lessons",
    request_body = LessonRequest,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 403, description = "Requester is neither owner nor moderator"),
        (status = 404, description = "Lesson not found")
    )
)]
#[put("/lessons/{id}")]
pub async fn update_lesson(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
    payload: web::Json<LessonRequest>,
) -> impl Responder {
    let user_id = *user_id;
    let lesson_id = path.into_inner();

    let owner_id = match db::lesson_owner(&state.pool, lesson_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "lesson not found" })),
        Err(e) => {
            log::error!("lesson owner lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match permissions::can_modify(&state.pool, user_id, owner_id).await {
        Ok(true) => {}
        Ok(false) => return HttpResponse::Forbidden().json(json!({ "error": "forbidden" })),
        Err(e) => {
            log::error!("permission check error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    if let Err(message) = validators::validate_description_links(&payload.description) {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }

    match db::course_owner(&state.pool, payload.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::BadRequest().json(json!({ "error": "course not found" })),
        Err(e) => {
            log::error!("course lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    if let Err(e) = sqlx::query(
        r#"UPDATE lessons
           SET name = $1, description = $2, course_id = $3, image = $4, video = $5
           WHERE id = $6"#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.course_id)
    .bind(payload.image.as_deref())
    .bind(payload.video.as_deref())
    .bind(lesson_id)
    .execute(&state.pool)
    .await
    {
        log::error!("update lesson db error: {e}");
        return HttpResponse::InternalServerError().finish();
    }

    log::info!("lesson {} updated by user {user_id}", payload.name);

    match db::get_lesson(&state.pool, lesson_id).await {
        Ok(Some(lesson)) => HttpResponse::Ok().json(lesson),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "lesson not found" })),
        Err(e) => {
            log::error!("fetch updated lesson error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "lessons",
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 403, description = "Only the owner may delete"),
        (status = 404, description = "Lesson not found")
    )
)]
#[delete("/lessons/{id}")]
pub async fn delete_lesson(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> impl Responder {
    let user_id = *user_id;
    let lesson_id = path.into_inner();

    let owner_id = match db::lesson_owner(&state.pool, lesson_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "lesson not found" })),
        Err(e) => {
            log::error!("lesson owner lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !permissions::is_owner(owner_id, user_id) {
        return HttpResponse::Forbidden().json(json!({ "error": "forbidden" }));
    }

    if let Err(e) = sqlx::query("DELETE FROM lessons WHERE id = $1")
        .bind(lesson_id)
        .execute(&state.pool)
        .await
    {
        log::error!("delete lesson db error: {e}");
        return HttpResponse::InternalServerError().finish();
    }

    log::warn!("lesson {lesson_id} deleted by user {user_id}");
    HttpResponse::NoContent().finish()
}
