// src/api/courses.rs

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use utoipa::ToSchema;

use crate::api::PageQuery;
use crate::models::{CourseDetail, Page};
use crate::{db, permissions, tasks, validators, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CourseRequest {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

#[utoipa::path(
    context_path = "/api",
    tag = "courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created, requester becomes owner", body = CourseDetail),
        (status = 400, description = "Validation failed")
    )
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    payload: web::Json<CourseRequest>,
) -> impl Responder {
    let user_id = *user_id;

    if let Err(message) = validators::validate_description_links(&payload.description) {
        return HttpResponse::BadRequest().json(json!({ "error": message }));
    }

    let row = match sqlx::query(
        r#"INSERT INTO courses (name, description, image, owner_id)
           VALUES ($1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.image.as_deref())
    .bind(user_id)
    .fetch_one(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("create course db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let course_id: i32 = row.get("id");
    log::info!("course {} created by user {user_id}", payload.name);

    match db::get_course_detail(&state.pool, course_id, user_id).await {
        Ok(Some(course)) => HttpResponse::Created().json(course),
        Ok(None) => HttpResponse::InternalServerError().finish(),
        Err(e) => {
            log::error!("fetch created course error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "courses",
    params(PageQuery),
    responses((status = 200, description = "Paginated course list"))
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let user_id = *user_id;
    let (page, page_size) = query.resolve();

    log::info!("course list requested by user {user_id}");

    let count = match db::count_courses(&state.pool).await {
        Ok(c) => c,
        Err(e) => {
            log::error!("count courses error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let results = match db::list_courses(&state.pool, user_id, page_size, (page - 1) * page_size).await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("list courses error: {e}");
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
    tag = "courses",
    responses(
        (status = 200, description = "Course detail with lessons", body = CourseDetail),
        (status = 404, description = "Course not found")
    )
)]
#[get("/courses/{id}")]
pub async fn retrieve_course(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> impl Responder {
    let user_id = *user_id;
    let course_id = path.into_inner();

    match db::get_course_detail(&state.pool, course_id, user_id).await {
        Ok(Some(course)) => {
            log::info!("course {} requested by user {user_id}", course.name);
            HttpResponse::Ok().json(course)
        }
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "course not found" })),
        Err(e) => {
            log::error!("retrieve course error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "courses",
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseDetail),
        (status = 403, description = "Requester is neither owner nor moderator"),
        (status = 404, description = "Course not found")
    )
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
    payload: web::Json<CourseRequest>,
) -> impl Responder {
    let user_id = *user_id;
    let course_id = path.into_inner();

    let owner_id = match db::course_owner(&state.pool, course_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "course not found" })),
        Err(e) => {
            log::error!("course owner lookup error: {e}");
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

    if let Err(e) = sqlx::query(
        r#"UPDATE courses
           SET name = $1, description = $2, image = $3, updated_at = NOW()
           WHERE id = $4"#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.image.as_deref())
    .bind(course_id)
    .execute(&state.pool)
    .await
    {
        log::error!("update course db error: {e}");
        return HttpResponse::InternalServerError().finish();
    }

    log::info!("course {} updated by user {user_id}", payload.name);

    // Notify subscribers off the request path.
    let pool = state.pool.clone();
    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        tasks::send_course_update_email(&pool, mailer.as_ref(), course_id).await;
    });

    match db::get_course_detail(&state.pool, course_id, user_id).await {
        Ok(Some(course)) => HttpResponse::Ok().json(course),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "course not found" })),
        Err(e) => {
            log::error!("fetch updated course error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "courses",
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Only the owner may delete"),
        (status = 404, description = "Course not found")
    )
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    path: web::Path<i32>,
) -> impl Responder {
    let user_id = *user_id;
    let course_id = path.into_inner();

    let owner_id = match db::course_owner(&state.pool, course_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "course not found" })),
        Err(e) => {
            log::error!("course owner lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !permissions::is_owner(owner_id, user_id) {
        return HttpResponse::Forbidden().json(json!({ "error": "forbidden" }));
    }

    if let Err(e) = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(course_id)
        .execute(&state.pool)
        .await
    {
        log::error!("delete course db error: {e}");
        return HttpResponse::InternalServerError().finish();
    }

    log::warn!("course {course_id} deleted by user {user_id}");
    HttpResponse::NoContent().finish()
}
