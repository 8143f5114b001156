// src/tasks.rs
//
// Background work: the course-update mail-out (spawned from the update
// handler) and the daily inactivity sweep (driven by the scheduler).

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};

use crate::mailer::Mailer;

/// A course is re-announced at most once per this many hours.
pub const UPDATE_NOTIFICATION_COOLDOWN_HOURS: i64 = 4;

/// Accounts idle longer than this are deactivated by the sweep.
pub const INACTIVITY_THRESHOLD_DAYS: i64 = 30;

pub fn notification_due(last_notified_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_notified_at {
        Some(at) => now - at >= Duration::hours(UPDATE_NOTIFICATION_COOLDOWN_HOURS),
        None => true,
    }
}

/// Emails every subscriber of the course about the update, unless a
/// notification already went out within the cooldown window. Errors are
/// logged and the task moves on.
pub async fn send_course_update_email(pool: &PgPool, mailer: Option<&Mailer>, course_id: i32) {
    let Some(mailer) = mailer else {
        log::warn!("mail relay not configured, skipping update notification for course {course_id}");
        return;
    };

    let course = match sqlx::query(
        "SELECT name, description, last_notified_at FROM courses WHERE id = $1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await
    {
        Ok(Some(row)) => row,
        Ok(None) => return,
        Err(e) => {
            log::error!("notification course lookup error: {e}");
            return;
        }
    };

    let last_notified_at: Option<DateTime<Utc>> = course.get("last_notified_at");
    if !notification_due(last_notified_at, Utc::now()) {
        return;
    }

    let name: String = course.get("name");
    let description: String = course.get("description");
    let subject = format!("Course updated: {name}");
    let body = format!("The materials of the course \"{name}\" have been updated.\n\n{description}");

    let subscribers = match sqlx::query(
        r#"SELECT u.email
           FROM subscriptions s
           JOIN users u ON u.id = s.user_id
           WHERE s.course_id = $1 AND u.email <> ''"#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("notification subscriber query error: {e}");
            return;
        }
    };

    for row in subscribers {
        let email: String = row.get("email");
        match mailer.send(&email, &subject, &body).await {
            Ok(()) => log::info!("update notification sent to {email}"),
            Err(e) => log::error!("update notification to {email} failed: {e}"),
        }
    }

    if let Err(e) = sqlx::query("UPDATE courses SET last_notified_at = NOW() WHERE id = $1")
        .bind(course_id)
        .execute(pool)
        .await
    {
        log::error!("last_notified_at update error: {e}");
    }
}

/// Deactivates accounts whose last login is older than the threshold.
/// Accounts that never logged in are left alone.
pub async fn block_inactive_users(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - Duration::days(INACTIVITY_THRESHOLD_DAYS);

    let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE is_active AND last_login < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
