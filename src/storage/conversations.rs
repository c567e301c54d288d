//! Conversation and message persistence.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqliteConnection;

use super::{ConversationRow, MessageRow};

pub async fn create(
    db: &mut SqliteConnection,
    user_id: &str,
    title: Option<&str>,
) -> Result<ConversationRow> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO conversations (user_id, title, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(title)
    .bind(&now)
    .bind(&now)
    .execute(&mut *db)
    .await?;
    let id = result.last_insert_rowid();
    get(db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("conversation not found after insert"))
}

pub async fn get(db: &mut SqliteConnection, id: i64) -> Result<Option<ConversationRow>> {
    Ok(sqlx::query_as("SELECT * FROM conversations WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?)
}

/// Advance the conversation's last-activity timestamp.
pub async fn touch(db: &mut SqliteConnection, id: i64) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn insert_message(
    db: &mut SqliteConnection,
    conversation_id: i64,
    user_id: &str,
    role: &str,
    content: &str,
    tool_calls: Option<&str>,
) -> Result<MessageRow> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO messages (conversation_id, user_id, role, content, tool_calls, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(role)
    .bind(content)
    .bind(tool_calls)
    .bind(&now)
    .execute(&mut *db)
    .await?;
    let id = result.last_insert_rowid();
    get_message(db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("message not found after insert"))
}

pub async fn get_message(db: &mut SqliteConnection, id: i64) -> Result<Option<MessageRow>> {
    Ok(sqlx::query_as("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?)
}

/// Full history, oldest first. Insertion id breaks same-timestamp ties so
/// replays keep the order messages were persisted in.
pub async fn list_messages(
    db: &mut SqliteConnection,
    conversation_id: i64,
) -> Result<Vec<MessageRow>> {
    Ok(sqlx::query_as(
        "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(conversation_id)
    .fetch_all(db)
    .await?)
}

pub async fn count_messages(db: &mut SqliteConnection, conversation_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
        .bind(conversation_id)
        .fetch_one(db)
        .await?;
    Ok(row.0)
}
