//! Owner-scoped task persistence.
//!
//! Every function takes `&mut SqliteConnection` so the same code path serves
//! both pool-scoped calls and the turn-spanning transaction owned by the
//! orchestrator.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::TaskRow;

/// Completion filter accepted by the list tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

pub async fn insert(
    db: &mut SqliteConnection,
    user_id: &str,
    title: &str,
    description: Option<&str>,
) -> Result<TaskRow> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO tasks (id, user_id, title, description, completed, created_at, updated_at)
         VALUES (?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(title)
    .bind(description)
    .bind(&now)
    .bind(&now)
    .execute(&mut *db)
    .await?;
    get(db, &id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("task not found after insert"))
}

/// Fetch by canonical id without an owner filter; callers run the
/// ownership guard on the returned row.
pub async fn get(db: &mut SqliteConnection, id: &str) -> Result<Option<TaskRow>> {
    Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?)
}

/// Tasks for one user, newest first (the order the list tool exposes).
pub async fn list_for_user(
    db: &mut SqliteConnection,
    user_id: &str,
    filter: StatusFilter,
) -> Result<Vec<TaskRow>> {
    let rows = match filter {
        StatusFilter::All => {
            sqlx::query_as("SELECT * FROM tasks WHERE user_id = ? ORDER BY created_at DESC, id")
                .bind(user_id)
                .fetch_all(db)
                .await?
        }
        StatusFilter::Pending => {
            sqlx::query_as(
                "SELECT * FROM tasks WHERE user_id = ? AND completed = 0 \
                 ORDER BY created_at DESC, id",
            )
            .bind(user_id)
            .fetch_all(db)
            .await?
        }
        StatusFilter::Completed => {
            sqlx::query_as(
                "SELECT * FROM tasks WHERE user_id = ? AND completed = 1 \
                 ORDER BY created_at DESC, id",
            )
            .bind(user_id)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

/// Tasks for one user in creation order. External-id resolution scans this
/// list, so when two derived ids collide the earliest task shadows the rest.
pub async fn list_for_user_oldest_first(
    db: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<TaskRow>> {
    Ok(
        sqlx::query_as("SELECT * FROM tasks WHERE user_id = ? ORDER BY created_at ASC, id")
            .bind(user_id)
            .fetch_all(db)
            .await?,
    )
}

pub async fn set_completed(db: &mut SqliteConnection, id: &str, completed: bool) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE tasks SET completed = ?, updated_at = ? WHERE id = ?")
        .bind(completed)
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_fields(
    db: &mut SqliteConnection,
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    match (title, description) {
        (Some(t), Some(d)) => {
            sqlx::query("UPDATE tasks SET title = ?, description = ?, updated_at = ? WHERE id = ?")
                .bind(t)
                .bind(d)
                .bind(&now)
                .bind(id)
                .execute(db)
                .await?;
        }
        (Some(t), None) => {
            sqlx::query("UPDATE tasks SET title = ?, updated_at = ? WHERE id = ?")
                .bind(t)
                .bind(&now)
                .bind(id)
                .execute(db)
                .await?;
        }
        (None, Some(d)) => {
            sqlx::query("UPDATE tasks SET description = ?, updated_at = ? WHERE id = ?")
                .bind(d)
                .bind(&now)
                .bind(id)
                .execute(db)
                .await?;
        }
        (None, None) => {}
    }
    Ok(())
}

pub async fn delete(db: &mut SqliteConnection, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn count_for_user(db: &mut SqliteConnection, user_id: &str) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(row.0)
}
