use sqlx::{PgPool, Row};
use std::env;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};

use lms_backend::AppState;

fn split_db_url(url: &str) -> Result<(String, String), String> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base.to_string(), Some(query)),
        None => (url.to_string(), None),
    };

    let db_start = base
        .rfind('/')
        .ok_or_else(|| "invalid database url".to_string())?;
    if db_start + 1 >= base.len() {
        return Err("database name is empty".to_string());
    }

    let db_name = base[db_start + 1..].to_string();
    let mut admin_url = format!("{}postgres", &base[..db_start + 1]);
    if let Some(query) = query {
        admin_url = format!("{admin_url}?{query}");
    }

    Ok((admin_url, db_name))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

pub async fn init_test_db() -> TestDb {
    dotenvy::dotenv().ok();
    env::set_var("JWT_SECRET", "test-secret");

    let test_url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let (admin_url, db_name) = split_db_url(&test_url).expect("invalid TEST_DATABASE_URL format");

    let lock = TEST_DB_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().await;

    let admin_pool = PgPool::connect(&admin_url).await.expect("connect admin db");

    let _ = sqlx::query("SELECT pg_advisory_lock(424242)")
        .execute(&admin_pool)
        .await;

    let quoted_name = quote_identifier(&db_name);
    let drop_sql = format!("DROP DATABASE IF EXISTS {quoted_name} WITH (FORCE)");
    let create_sql = format!("CREATE DATABASE {quoted_name}");

    let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
    let create_result = sqlx::query(&create_sql).execute(&admin_pool).await;
    if let Err(e) = create_result {
        eprintln!("create test db error: {e}");
        let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
        sqlx::query(&create_sql)
            .execute(&admin_pool)
            .await
            .expect("create test db retry");
    }

    let _ = sqlx::query("SELECT pg_advisory_unlock(424242)")
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;

    let pool = PgPool::connect(&test_url).await.expect("connect test db");
    sqlx::migrate!().run(&pool).await.expect("migrations");

    TestDb { pool, _guard: guard }
}

pub fn build_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        stripe_secret_key: "sk_test_dummy".to_string(),
        app_base_url: "http://localhost:8000".to_string(),
        mailer: None,
    }
}

/// Low bcrypt cost to keep the suite fast; login verifies against any cost.
pub fn test_password_hash(password: &str) -> String {
    bcrypt::hash(password, 4).expect("bcrypt hash")
}

pub async fn create_user(pool: &PgPool, suffix: &str) -> i32 {
    sqlx::query(
        r#"INSERT INTO users (username, email, password_hash)
           VALUES ($1, $2, $3)
           RETURNING id"#,
    )
    .bind(format!("user_{suffix}"))
    .bind(format!("user_{suffix}@example.com"))
    .bind(test_password_hash("password123"))
    .fetch_one(pool)
    .await
    .expect("insert user")
    .get("id")
}

pub async fn create_moderator(pool: &PgPool, suffix: &str) -> i32 {
    sqlx::query(
        r#"INSERT INTO users (username, email, password_hash, is_moderator)
           VALUES ($1, $2, $3, TRUE)
           RETURNING id"#,
    )
    .bind(format!("moderator_{suffix}"))
    .bind(format!("moderator_{suffix}@example.com"))
    .bind(test_password_hash("password123"))
    .fetch_one(pool)
    .await
    .expect("insert moderator")
    .get("id")
}

pub async fn create_course(pool: &PgPool, owner_id: i32, name: &str) -> i32 {
    sqlx::query(
        r#"INSERT INTO courses (name, description, owner_id)
           VALUES ($1, 'Test course description', $2)
           RETURNING id"#,
    )
    .bind(name)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .expect("insert course")
    .get("id")
}

pub async fn create_lesson(pool: &PgPool, course_id: i32, owner_id: i32, name: &str) -> i32 {
    sqlx::query(
        r#"INSERT INTO lessons (name, description, course_id, owner_id)
           VALUES ($1, 'Test lesson description', $2, $3)
           RETURNING id"#,
    )
    .bind(name)
    .bind(course_id)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .expect("insert lesson")
    .get("id")
}

/// Authorization header for a user, as issued by the auth module.
pub fn auth_header(user_id: i32) -> (&'static str, String) {
    let token = lms_backend::api::auth::generate_access_token(user_id).expect("access token");
    ("Authorization", format!("Bearer {token}"))
}
