pub mod api;
pub mod currency;
pub mod db;
pub mod docs;
pub mod mailer;
pub mod models;
pub mod permissions;
pub mod scheduler;
pub mod tasks;
pub mod validators;

use sqlx::PgPool;

use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub stripe_secret_key: String,
    pub app_base_url: String,
    pub mailer: Option<Mailer>,
}
