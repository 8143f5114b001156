// src/db.rs

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::{Course, CourseDetail, Lesson, Payment};

fn map_lesson(r: &PgRow) -> Lesson {
    Lesson {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        course_id: r.get("course_id"),
        image: r.get("image"),
        video: r.get("video"),
        owner_id: r.get("owner_id"),
    }
}

fn map_payment(r: &PgRow) -> Payment {
    Payment {
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
    }
}

/// Owner of a course, or `None` when the course does not exist.
/// The inner option is the nullable owner column.
pub async fn course_owner(pool: &PgPool, course_id: i32) -> Result<Option<Option<i32>>, sqlx::Error> {
    let row = sqlx::query("SELECT owner_id FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get("owner_id")))
}

pub async fn lesson_owner(pool: &PgPool, lesson_id: i32) -> Result<Option<Option<i32>>, sqlx::Error> {
    let row = sqlx::query("SELECT owner_id FROM lessons WHERE id = $1")
        .bind(lesson_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get("owner_id")))
}

pub async fn count_courses(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM courses")
        .fetch_one(pool)
        .await?;

    Ok(row.get("count"))
}

/// Course listing page; `lessons_count` and `is_subscribed` are computed
/// per row for the requesting user.
pub async fn list_courses(
    pool: &PgPool,
    viewer_id: i32,
    limit: i64,
    offset: i64,
) -> Result<Vec<Course>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT c.id, c.name, c.description, c.image, c.owner_id, c.updated_at,
                  (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS lessons_count,
                  EXISTS(SELECT 1 FROM subscriptions s
                         WHERE s.course_id = c.id AND s.user_id = $1) AS is_subscribed
           FROM courses c
           ORDER BY c.id
           LIMIT $2 OFFSET $3"#,
    )
    .bind(viewer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Course {
            id: r.get("id"),
            name: r.get("name"),
            description: r.get("description"),
            image: r.get("image"),
            owner_id: r.get("owner_id"),
            lessons_count: r.get("lessons_count"),
            is_subscribed: r.get("is_subscribed"),
            updated_at: r.get("updated_at"),
        })
        .collect())
}

pub async fn get_course_detail(
    pool: &PgPool,
    course_id: i32,
    viewer_id: i32,
) -> Result<Option<CourseDetail>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT c.id, c.name, c.description, c.image, c.owner_id, c.updated_at,
                  EXISTS(SELECT 1 FROM subscriptions s
                         WHERE s.course_id = c.id AND s.user_id = $2) AS is_subscribed
           FROM courses c
           WHERE c.id = $1"#,
    )
    .bind(course_id)
    .bind(viewer_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let lessons = sqlx::query(
        r#"SELECT id, name, description, course_id, image, video, owner_id
           FROM lessons
           WHERE course_id = $1
           ORDER BY id"#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    let lessons: Vec<Lesson> = lessons.iter().map(map_lesson).collect();

    Ok(Some(CourseDetail {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image: row.get("image"),
        owner_id: row.get("owner_id"),
        lessons_count: lessons.len() as i64,
        is_subscribed: row.get("is_subscribed"),
        updated_at: row.get("updated_at"),
        lessons,
    }))
}

pub async fn count_lessons(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM lessons")
        .fetch_one(pool)
        .await?;

    Ok(row.get("count"))
}

pub async fn list_lessons(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Lesson>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT id, name, description, course_id, image, video, owner_id
           FROM lessons
           ORDER BY id
           LIMIT $1 OFFSET $2"#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_lesson).collect())
}

pub async fn get_lesson(pool: &PgPool, lesson_id: i32) -> Result<Option<Lesson>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, name, description, course_id, image, video, owner_id
           FROM lessons
           WHERE id = $1"#,
    )
    .bind(lesson_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| map_lesson(&r)))
}

pub async fn get_payment(pool: &PgPool, payment_id: i32) -> Result<Option<Payment>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT id, user_id, date, course_id, lesson_id, amount::text AS amount,
                  method, session_id, link, status
           FROM payments
           WHERE id = $1"#,
    )
    .bind(payment_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| map_payment(&r)))
}

pub async fn list_user_payments(pool: &PgPool, user_id: i32) -> Result<Vec<Payment>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT id, user_id, date, course_id, lesson_id, amount::text AS amount,
                  method, session_id, link, status
           FROM payments
           WHERE user_id = $1
           ORDER BY date DESC"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_payment).collect())
}

/// Subscription row id for (user, course), if one exists.
pub async fn find_subscription(
    pool: &PgPool,
    user_id: i32,
    course_id: i32,
) -> Result<Option<i32>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM subscriptions WHERE user_id = $1 AND course_id = $2")
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get("id")))
}

pub async fn create_subscription(
    pool: &PgPool,
    user_id: i32,
    course_id: i32,
) -> Result<i32, sqlx::Error> {
    let row = sqlx::query(
        r#"INSERT INTO subscriptions (user_id, course_id)
           VALUES ($1, $2)
           RETURNING id"#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn delete_subscription(pool: &PgPool, subscription_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM subscriptions WHERE id = $1")
        .bind(subscription_id)
        .execute(pool)
        .await?;

    Ok(())
}
