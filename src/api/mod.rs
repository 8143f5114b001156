pub mod auth;
pub mod courses;
pub mod lessons;
pub mod payments;
pub mod stripe_client;
pub mod subscriptions;
pub mod users;

use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: i64 = 2;
pub const MAX_PAGE_SIZE: i64 = 10;

/// Page-number pagination query, shared by course and lesson listings.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    /// Resolved (page, page_size) with defaults applied and the size
    /// clamped to the allowed maximum.
    pub fn resolve(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        (page, page_size)
    }
}
