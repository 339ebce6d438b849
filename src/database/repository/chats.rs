use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Chat, ChatMessage};

const MESSAGE_SELECT: &str = "SELECT m.id, m.chat_id, m.sender_id, m.content, m.is_read, m.created_at, \
     u.name AS sender_name, u.profile_image AS sender_profile_image \
     FROM messages m JOIN users u ON u.id = m.sender_id";

#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Single-statement upsert on the normalised pair, then a lookup.
    /// Returns the chat and whether this call created it.
    pub async fn get_or_create(
        &self,
        a: Uuid,
        b: Uuid,
        journey_id: Option<Uuid>,
    ) -> Result<(Chat, bool), DatabaseError> {
        let (low, high) = Chat::normalize_pair(a, b);
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO chats (id, participant_low, participant_high, journey_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (participant_low, participant_high) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(low)
        .bind(high)
        .bind(journey_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let chat = sqlx::query_as::<_, Chat>(
            "SELECT * FROM chats WHERE participant_low = ? AND participant_high = ?",
        )
        .bind(low)
        .bind(high)
        .fetch_one(&self.pool)
        .await?;

        Ok((chat, result.rows_affected() > 0))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Chat>, DatabaseError> {
        let chat = sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(chat)
    }

    /// Chats `user_id` takes part in, most recently active first
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<Chat>, DatabaseError> {
        let chats = sqlx::query_as::<_, Chat>(
            "SELECT * FROM chats WHERE participant_low = ? OR participant_high = ?
             ORDER BY updated_at DESC, rowid DESC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(chats)
    }

    /// Append a message and bump the chat's activity timestamp in one transaction
    pub async fn insert_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<ChatMessage, DatabaseError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO messages (id, chat_id, sender_id, content, is_read, created_at) VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(id)
        .bind(chat_id)
        .bind(sender_id)
        .bind(content)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let message = sqlx::query_as::<_, ChatMessage>(&format!("{} WHERE m.id = ?", MESSAGE_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(message)
    }

    /// Full log in append order
    pub async fn messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>, DatabaseError> {
        let messages = sqlx::query_as::<_, ChatMessage>(&format!(
            "{} WHERE m.chat_id = ? ORDER BY m.created_at, m.rowid",
            MESSAGE_SELECT
        ))
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    /// Newest message of every chat `user_id` takes part in, keyed by chat
    pub async fn last_messages_for(&self, user_id: Uuid) -> Result<HashMap<Uuid, ChatMessage>, DatabaseError> {
        let sql = format!(
            "{} WHERE m.rowid IN (
                 SELECT (SELECT l.rowid FROM messages l WHERE l.chat_id = c.id
                         ORDER BY l.created_at DESC, l.rowid DESC LIMIT 1)
                 FROM chats c WHERE c.participant_low = ? OR c.participant_high = ?)",
            MESSAGE_SELECT
        );
        let messages = sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages.into_iter().map(|m| (m.message.chat_id, m)).collect())
    }

    /// Unread counts for `reader` across all their chats. Chats with nothing unread are absent.
    pub async fn unread_counts_for(&self, reader: Uuid) -> Result<HashMap<Uuid, i64>, DatabaseError> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT m.chat_id, COUNT(*) FROM messages m JOIN chats c ON c.id = m.chat_id
             WHERE (c.participant_low = ? OR c.participant_high = ?) AND m.sender_id != ? AND m.is_read = 0
             GROUP BY m.chat_id",
        )
        .bind(reader)
        .bind(reader)
        .bind(reader)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Flip the read flag on everything the other participant sent
    pub async fn mark_read(&self, chat_id: Uuid, reader: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1 WHERE chat_id = ? AND sender_id != ? AND is_read = 0",
        )
        .bind(chat_id)
        .bind(reader)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
