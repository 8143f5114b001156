// src/permissions.rs
//
// Access rules: the owner of a record has full access; moderators may read
// and update any course or lesson but never create or destroy; any other
// authenticated user only reads.

use sqlx::{PgPool, Row};

pub fn is_owner(owner_id: Option<i32>, user_id: i32) -> bool {
    owner_id == Some(user_id)
}

pub async fn is_moderator(pool: &PgPool, user_id: i32) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT is_moderator FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get("is_moderator")).unwrap_or(false))
}

/// Update access: owner or moderator.
pub async fn can_modify(
    pool: &PgPool,
    user_id: i32,
    owner_id: Option<i32>,
) -> Result<bool, sqlx::Error> {
    if is_owner(owner_id, user_id) {
        return Ok(true);
    }

    is_moderator(pool, user_id).await
}
