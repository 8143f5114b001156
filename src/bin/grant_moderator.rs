// src/bin/grant_moderator.rs
//
// Marks an account as moderator:
//
//     cargo run --bin grant_moderator -- user@example.com

use dotenvy::dotenv;
use sqlx::PgPool;
use std::env;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let email = match env::args().nth(1) {
        Some(email) => email,
        None => {
            eprintln!("usage: grant_moderator <email>");
            std::process::exit(2);
        }
    };

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    let result = sqlx::query("UPDATE users SET is_moderator = TRUE WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .expect("update failed");

    if result.rows_affected() == 0 {
        eprintln!("no user with email {email}");
        std::process::exit(1);
    }

    println!("{email} is now a moderator");
}
