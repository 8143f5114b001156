// src/api/auth.rs

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use actix_web::{post, web, HttpMessage, HttpResponse, Responder};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use utoipa::ToSchema;

use crate::AppState;

const ACCESS_TOKEN_MINUTES: i64 = 30;
const REFRESH_TOKEN_DAYS: i64 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    exp: usize,
    token_type: String, // access | refresh
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user_id: i32,
}

#[utoipa::path(
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Duplicate username or email, or invalid data")
    )
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> impl Responder {
    let email = payload.email.trim();
    if !email.contains('@') {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "invalid email"
        }));
    }

    let password_hash = match hash(&payload.password, DEFAULT_COST) {
        Ok(h) => h,
        Err(e) => {
            log::error!("bcrypt hash error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let row = match sqlx::query(
        r#"INSERT INTO users (username, email, password_hash, first_name, last_name)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id"#,
    )
    .bind(&payload.username)
    .bind(email)
    .bind(password_hash)
    .bind(payload.first_name.as_deref())
    .bind(payload.last_name.as_deref())
    .fetch_one(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::warn!("register db error: {e}");
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "user with this username or email already exists"
            }));
        }
    };

    let user_id: i32 = row.get("id");
    log::info!("user {} registered with email {email}", payload.username);

    match token_pair(user_id) {
        Ok((access, refresh_token)) => HttpResponse::Created().json(AuthResponse {
            access,
            refresh: refresh_token,
            user_id,
        }),
        Err(e) => {
            log::error!("jwt encode error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = AuthResponse),
        (status = 401, description = "Bad credentials or inactive account")
    )
)]
#[post("/auth/login")]
pub async fn login(state: web::Data<AppState>, payload: web::Json<LoginRequest>) -> impl Responder {
    let row = match sqlx::query(
        r#"SELECT id, password_hash, is_active FROM users WHERE email = $1"#,
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("login db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let Some(row) = row else {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "no active account found with the given credentials"
        }));
    };

    let user_id: i32 = row.get("id");
    let password_hash: String = row.get("password_hash");
    let is_active: bool = row.get("is_active");

    match verify(&payload.password, &password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "no active account found with the given credentials"
            }));
        }
        Err(e) => {
            log::error!("bcrypt verify error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !is_active {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "no active account found with the given credentials"
        }));
    }

    // The inactivity sweep keys off last_login.
    if let Err(e) = sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(&state.pool)
        .await
    {
        log::error!("last_login update error: {e}");
    }

    match token_pair(user_id) {
        Ok((access, refresh_token)) => HttpResponse::Ok().json(AuthResponse {
            access,
            refresh: refresh_token,
            user_id,
        }),
        Err(e) => {
            log::error!("jwt encode error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token"),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
#[post("/auth/refresh")]
pub async fn refresh(payload: web::Json<RefreshRequest>) -> impl Responder {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET required");

    let claims = match decode::<Claims>(
        &payload.refresh,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(_) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "invalid refresh token"
            }));
        }
    };

    if claims.token_type != "refresh" {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "invalid refresh token"
        }));
    }

    match generate_token(claims.sub, "access", Duration::minutes(ACCESS_TOKEN_MINUTES)) {
        Ok(access) => HttpResponse::Ok().json(serde_json::json!({ "access": access })),
        Err(e) => {
            log::error!("jwt encode error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn generate_token(
    user_id: i32,
    token_type: &str,
    lifetime: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET required");

    let expiration = Utc::now()
        .checked_add_signed(lifetime)
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        exp: expiration,
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn generate_access_token(user_id: i32) -> Result<String, jsonwebtoken::errors::Error> {
    generate_token(user_id, "access", Duration::minutes(ACCESS_TOKEN_MINUTES))
}

pub fn generate_refresh_token(user_id: i32) -> Result<String, jsonwebtoken::errors::Error> {
    generate_token(user_id, "refresh", Duration::days(REFRESH_TOKEN_DAYS))
}

fn token_pair(user_id: i32) -> Result<(String, String), jsonwebtoken::errors::Error> {
    Ok((generate_access_token(user_id)?, generate_refresh_token(user_id)?))
}

/// Middleware for the /api scope:
/// - takes `Authorization: Bearer <jwt>`
/// - validates the access token
/// - stores the `i32` user id in `req.extensions_mut()`
pub struct JwtMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareInner<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareInner { service }))
    }
}

pub struct JwtMiddlewareInner<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareInner<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) => s,
            Err(_) => {
                return Box::pin(async move {
                    Err(actix_web::error::ErrorInternalServerError(
                        "JWT secret not set",
                    ))
                })
            }
        };

        let auth_header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");

        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            match decode::<Claims>(
                token,
                &DecodingKey::from_secret(secret.as_ref()),
                &Validation::default(),
            ) {
                Ok(token_data) if token_data.claims.token_type == "access" => {
                    req.extensions_mut().insert(token_data.claims.sub);
                    let fut = self.service.call(req);
                    return Box::pin(async move { fut.await });
                }
                _ => {
                    return Box::pin(async move {
                        Err(actix_web::error::ErrorUnauthorized("Invalid token"))
                    })
                }
            }
        }

        Box::pin(async move {
            Err(actix_web::error::ErrorUnauthorized(
                "Missing or invalid Authorization header",
            ))
        })
    }
}
