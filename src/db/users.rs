//! User repository.
//!
//! Handles user registration lookups and the per-period broadcast counter.

use super::{DbError, from_micros, to_micros};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// A user known to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub registered_at: DateTime<Utc>,
    pub message_count: i64,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a user by exact name.
    pub async fn fetch(&self, username: &str) -> Result<Option<UserRecord>, DbError> {
        let row = sqlx::query_as::<_, (String, i64, i64)>(
            r#"
            SELECT username, reg_date, count_messages
            FROM registrations
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(username, reg_date, count)| UserRecord {
            username,
            registered_at: from_micros(reg_date),
            message_count: count,
        }))
    }

    /// Insert a user with a zero counter.
    ///
    /// Returns [`DbError::UserExists`] if the name is already registered.
    pub async fn create(&self, username: &str, registered_at: DateTime<Utc>) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO registrations (username, reg_date, count_messages)
            VALUES (?, ?, 0)
            "#,
        )
        .bind(username)
        .bind(to_micros(registered_at))
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::UserExists(username.to_string());
            }
            DbError::from(e)
        })?;

        Ok(())
    }

    /// Overwrite a user's counter. Returns the number of rows touched.
    pub async fn set_count(&self, username: &str, count: i64) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET count_messages = ?
            WHERE username = ?
            "#,
        )
        .bind(count)
        .bind(username)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Zero every user's counter. Returns the number of users.
    pub async fn reset_counts(&self) -> Result<u64, DbError> {
        let result = sqlx::query("UPDATE registrations SET count_messages = 0")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, DbError};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = Database::new(":memory:").await.unwrap();
        let now = Utc::now();

        assert!(db.users().fetch("alice").await.unwrap().is_none());
        db.users().create("alice", now).await.unwrap();

        let user = db.users().fetch("alice").await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.message_count, 0);
        assert_eq!(user.registered_at.timestamp_micros(), now.timestamp_micros());
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let db = Database::new(":memory:").await.unwrap();
        db.users().create("alice", Utc::now()).await.unwrap();

        let err = db.users().create("alice", Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::UserExists(name) if name == "alice"));
    }

    #[tokio::test]
    async fn test_set_and_reset_counts() {
        let db = Database::new(":memory:").await.unwrap();
        let then = Utc::now() - Duration::hours(1);
        db.users().create("alice", then).await.unwrap();
        db.users().create("bob", then).await.unwrap();

        assert_eq!(db.users().set_count("alice", 7).await.unwrap(), 1);
        assert_eq!(db.users().set_count("nobody", 7).await.unwrap(), 0);
        assert_eq!(db.users().fetch("alice").await.unwrap().unwrap().message_count, 7);

        assert_eq!(db.users().reset_counts().await.unwrap(), 2);
        assert_eq!(db.users().fetch("alice").await.unwrap().unwrap().message_count, 0);
    }

    #[tokio::test]
    async fn test_negative_count_rejected() {
        let db = Database::new(":memory:").await.unwrap();
        db.users().create("alice", Utc::now()).await.unwrap();
        assert!(db.users().set_count("alice", -1).await.is_err());
    }
}
