// src/api/payments.rs

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use utoipa::{IntoParams, ToSchema};

use crate::api::stripe_client;
use crate::models::Payment;
use crate::{currency, db, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub course_id: Option<i32>,
    pub lesson_id: Option<i32>,

    /// Ruble amount as a decimal string, e.g. "1500.00".
    pub amount: String,

    /// cash | transfer
    pub method: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PaymentFilterQuery {
    pub user_id: Option<i32>,
    pub course_id: Option<i32>,
    pub lesson_id: Option<i32>,
    pub method: Option<String>,

    /// Substring match over payer email, course name and lesson name.
    pub search: Option<String>,

    /// date | -date | amount | -amount
    pub ordering: Option<String>,
}

#[utoipa::path(
    context_path = "/api",
    tag = "payments",
    params(PaymentFilterQuery),
    responses((status = 200, description = "Filtered payment list", body = [Payment]))
)]
#[get("/payments")]
pub async fn list_payments(
    state: web::Data<AppState>,
    query: web::Query<PaymentFilterQuery>,
) -> impl Responder {
    let order_by = match query.ordering.as_deref() {
        Some("date") => "p.date ASC",
        Some("-date") => "p.date DESC",
        Some("amount") => "p.amount ASC",
        Some("-amount") => "p.amount DESC",
        _ => "p.id ASC",
    };

    let sql = format!(
        r#"SELECT p.id, p.user_id, p.date, p.course_id, p.lesson_id,
                  p.amount::text AS amount, p.method, p.session_id, p.link, p.status
           FROM payments p
           LEFT JOIN users u ON u.id = p.user_id
           LEFT JOIN courses c ON c.id = p.course_id
           LEFT JOIN lessons l ON l.id = p.lesson_id
           WHERE ($1::int IS NULL OR p.user_id = $1)
             AND ($2::int IS NULL OR p.course_id = $2)
             AND ($3::int IS NULL OR p.lesson_id = $3)
             AND ($4::text IS NULL OR p.method = $4)
             AND ($5::text IS NULL
                  OR u.email ILIKE '%' || $5 || '%'
                  OR c.name ILIKE '%' || $5 || '%'
                  OR l.name ILIKE '%' || $5 || '%')
           ORDER BY {order_by}"#
    );

    let rows = match sqlx::query(&sql)
        .bind(query.user_id)
        .bind(query.course_id)
        .bind(query.lesson_id)
        .bind(query.method.as_deref())
        .bind(query.search.as_deref())
        .fetch_all(&state.pool)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("list payments db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let payments: Vec<Payment> = rows
        .iter()
        .map(|r| Payment {
            id: r.get("id"),
            user_id: r.get("user_id"),
            date: r.get("date"),
            course_id: r.get("course_id"),
            lesson_id: r.get("lesson_id"),
            amount: r.get("amount"),
            method: r.get("method"),
            session_id: r.get("session_id"),
            link: r.get("link"),
            status: r.get("status"),
        })
        .collect();

    HttpResponse::Ok().json(payments)
}

#[utoipa::path(
    context_path = "/api",
    tag = "payments",
    responses(
        (status = 200, description = "Payment detail", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
#[get("/payments/{id}")]
pub async fn retrieve_payment(state: web::Data<AppState>, path: web::Path<i32>) -> impl Responder {
    let payment_id = path.into_inner();

    match db::get_payment(&state.pool, payment_id).await {
        Ok(Some(payment)) => HttpResponse::Ok().json(payment),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "payment not found" })),
        Err(e) => {
            log::error!("payment lookup error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Records a payment for the requester, converts the ruble amount to
/// dollars and opens a Stripe checkout session for it. The session id
/// and payment link are stored on the payment row.
#[utoipa::path(
    context_path = "/api",
    tag = "payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded, checkout session created", body = Payment),
        (status = 400, description = "Invalid amount/method or provider failure")
    )
)]
#[post("/payments")]
pub async fn create_payment(
    state: web::Data<AppState>,
    user_id: web::ReqData<i32>,
    payload: web::Json<CreatePaymentRequest>,
) -> impl Responder {
    let user_id = *user_id;

    if payload.method != "cash" && payload.method != "transfer" {
        return HttpResponse::BadRequest().json(json!({
            "error": "method must be cash or transfer"
        }));
    }

    let amount_rub: f64 = match payload.amount.parse() {
        Ok(v) if v > 0.0 => v,
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "amount must be a positive decimal"
            }));
        }
    };

    // Name the checkout after what is being bought.
    let product_name = match (payload.course_id, payload.lesson_id) {
        (Some(course_id), _) => match db::get_course_detail(&state.pool, course_id, user_id).await {
            Ok(Some(course)) => course.name,
            Ok(None) => {
                return HttpResponse::BadRequest().json(json!({ "error": "course not found" }))
            }
            Err(e) => {
                log::error!("course lookup error: {e}");
                return HttpResponse::InternalServerError().finish();
            }
        },
        (None, Some(lesson_id)) => match db::get_lesson(&state.pool, lesson_id).await {
            Ok(Some(lesson)) => lesson.name,
            Ok(None) => {
                return HttpResponse::BadRequest().json(json!({ "error": "lesson not found" }))
            }
            Err(e) => {
                log::error!("lesson lookup error: {e}");
                return HttpResponse::InternalServerError().finish();
            }
        },
        (None, None) => "Course payment".to_string(),
    };

    let row = match sqlx::query(
        r#"INSERT INTO payments (user_id, course_id, lesson_id, amount, method, status)
           VALUES ($1, $2, $3, $4::numeric, $5, 'pending')
           RETURNING id"#,
    )
    .bind(user_id)
    .bind(payload.course_id)
    .bind(payload.lesson_id)
    .bind(&payload.amount)
    .bind(&payload.method)
    .fetch_one(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("create payment insert error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let payment_id: i32 = row.get("id");

    let amount_usd = match currency::convert_rub_to_usd(amount_rub).await {
        Ok(v) => v,
        Err(e) => {
            log::error!("currency conversion error: {e}");
            return HttpResponse::BadRequest().json(json!({
                "error": "currency conversion failed",
                "details": e.to_string()
            }));
        }
    };

    log::info!(
        "stripe checkout user_id={user_id} payment_id={payment_id} amount_rub={amount_rub} amount_usd={amount_usd}"
    );

    let price = match stripe_client::create_price(&state.stripe_secret_key, amount_usd, &product_name)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            log::error!("stripe create_price error: {e} user_id={user_id}");
            return HttpResponse::BadRequest().json(json!({
                "error": "stripe price create failed",
                "details": e.to_string()
            }));
        }
    };

    let session = match stripe_client::create_checkout_session(
        &state.stripe_secret_key,
        &price.id,
        &state.app_base_url,
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            log::error!("stripe create_checkout_session error: {e} user_id={user_id}");
            return HttpResponse::BadRequest().json(json!({
                "error": "stripe session create failed",
                "details": e.to_string()
            }));
        }
    };

    if let Err(e) = sqlx::query("UPDATE payments SET session_id = $1, link = $2 WHERE id = $3")
        .bind(&session.id)
        .bind(session.url.as_deref())
        .bind(payment_id)
        .execute(&state.pool)
        .await
    {
        log::error!("payment session update error: {e}");
        return HttpResponse::InternalServerError().finish();
    }

    match db::get_payment(&state.pool, payment_id).await {
        Ok(Some(payment)) => HttpResponse::Created().json(payment),
        Ok(None) => HttpResponse::InternalServerError().finish(),
        Err(e) => {
            log::error!("fetch created payment error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Pulls the checkout session state from Stripe and maps its
/// payment_status onto the local payment row.
#[utoipa::path(
    context_path = "/api",
    tag = "payments",
    responses(
        (status = 200, description = "Stripe payment status"),
        (status = 400, description = "Payment has no checkout session"),
        (status = 404, description = "Payment not found")
    )
)]
#[get("/payments/{id}/check-status")]
pub async fn check_payment_status(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> impl Responder {
    let payment_id = path.into_inner();

    let payment = match db::get_payment(&state.pool, payment_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "payment not found" })),
        Err(e) => {
            log::error!("payment lookup error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let Some(session_id) = payment.session_id.as_deref() else {
        return HttpResponse::BadRequest().json(json!({
            "error": "payment has no session id to check"
        }));
    };

    let session = match stripe_client::retrieve_session(&state.stripe_secret_key, session_id).await {
        Ok(s) => s,
        Err(e) => {
            log::error!("stripe retrieve_session error: {e}");
            return HttpResponse::BadRequest().json(json!({
                "error": "stripe session lookup failed",
                "details": e.to_string()
            }));
        }
    };

    let stripe_status = session.payment_status.unwrap_or_default();
    let status = match stripe_status.as_str() {
        "paid" => "paid",
        "unpaid" => "unpaid",
        _ => "pending",
    };

    if let Err(e) = sqlx::query("UPDATE payments SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(payment_id)
        .execute(&state.pool)
        .await
    {
        log::error!("payment status update error: {e}");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok().json(json!({ "payment_status": stripe_status }))
}
