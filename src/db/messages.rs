//! Message log repository.
//!
//! Stores every broadcast and direct message and answers backlog queries.

use super::{DbError, from_micros, to_micros};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Receiver value recorded for broadcasts.
pub const ALL_RECEIVER: &str = "all";

/// One replayable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogEntry {
    pub text: String,
    pub sender: String,
    pub sent_at: DateTime<Utc>,
}

/// Repository for message operations.
pub struct MessageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message. An empty receiver is recorded as [`ALL_RECEIVER`].
    pub async fn store(
        &self,
        sender: &str,
        receiver: &str,
        text: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let receiver = if receiver.is_empty() {
            ALL_RECEIVER
        } else {
            receiver
        };

        sqlx::query(
            r#"
            INSERT INTO messages (message, sender, receiver, send_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(text)
        .bind(sender)
        .bind(receiver)
        .bind(to_micros(sent_at))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Messages visible to `username`: everything addressed to it or to
    /// everyone at or after `since`, plus the latest `before_limit` such
    /// messages at or before `since`. Oldest first.
    pub async fn backlog(
        &self,
        username: &str,
        since: DateTime<Utc>,
        before_limit: u32,
    ) -> Result<Vec<BacklogEntry>, DbError> {
        let since = to_micros(since);

        let rows = sqlx::query_as::<_, (String, String, i64)>(
            r#"
            SELECT message, sender, send_date FROM (
                SELECT message, sender, send_date
                FROM messages
                WHERE receiver IN (?, ?) AND send_date >= ?
            )
            UNION
            SELECT message, sender, send_date FROM (
                SELECT message, sender, send_date
                FROM messages
                WHERE receiver IN (?, ?) AND send_date <= ?
                ORDER BY send_date DESC
                LIMIT ?
            )
            ORDER BY send_date ASC
            "#,
        )
        .bind(ALL_RECEIVER)
        .bind(username)
        .bind(since)
        .bind(ALL_RECEIVER)
        .bind(username)
        .bind(since)
        .bind(i64::from(before_limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(text, sender, sent)| BacklogEntry {
                text,
                sender,
                sent_at: from_micros(sent),
            })
            .collect())
    }

    /// Delete messages sent strictly before `cutoff`. Returns rows removed.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM messages WHERE send_date < ?")
            .bind(to_micros(cutoff))
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Total stored messages.
    pub async fn count(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
