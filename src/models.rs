// src/models.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Restricted user shape shown in listings and foreign profiles.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserBrief {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// Full profile, only visible to the account owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetail {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub avatar: Option<String>,
    pub is_moderator: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub owner_id: Option<i32>,
    pub lessons_count: i64,
    pub is_subscribed: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetail {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub owner_id: Option<i32>,
    pub lessons_count: i64,
    pub is_subscribed: bool,
    pub updated_at: DateTime<Utc>,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Lesson {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub course_id: i32,
    pub image: Option<String>,
    pub video: Option<String>,
    pub owner_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Payment {
    pub id: i32,
    pub user_id: i32,
    pub date: DateTime<Utc>,
    pub course_id: Option<i32>,
    pub lesson_id: Option<i32>,
    /// Ruble amount, kept as text to preserve NUMERIC precision.
    pub amount: String,
    pub method: String, // cash | transfer
    pub session_id: Option<String>,
    pub link: Option<String>,
    pub status: String, // pending | paid | unpaid
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Subscription {
    pub id: i32,
    pub user_id: i32,
    pub course_id: i32,
}

/// Page-number pagination envelope for course and lesson listings.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<T>,
}
