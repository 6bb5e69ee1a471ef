//! Persistence gateway.
//!
//! Every storage operation is sent as a [`StorageOp`] to one worker task that
//! owns the [`Database`]. The worker executes operations strictly one at a
//! time in the order they were queued, so the storage engine never sees two
//! concurrent writers. Callers hold a cheap, cloneable [`Storage`] handle and
//! await the reply.
//!
//! Failures never reach callers: the worker logs them and replies with an
//! empty or default value, so a broken database degrades chat features rather
//! than dropping connections.

mod worker;

use crate::db::{BacklogEntry, Database, UserRecord};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;

pub use worker::StorageWorker;

/// Queue depth between callers and the storage worker.
const STORAGE_QUEUE_SIZE: usize = 1024;

/// One queued storage operation with its reply channel.
#[derive(Debug)]
pub enum StorageOp {
    FetchUser {
        username: String,
        reply: oneshot::Sender<Option<UserRecord>>,
    },
    CreateUser {
        username: String,
        reply: oneshot::Sender<()>,
    },
    StoreMessage {
        sender: String,
        receiver: String,
        text: String,
        reply: oneshot::Sender<()>,
    },
    FetchBacklog {
        username: String,
        since: DateTime<Utc>,
        reply: oneshot::Sender<Vec<BacklogEntry>>,
    },
    AppendCount {
        username: String,
        count: i64,
        reply: oneshot::Sender<()>,
    },
    ResetCounts {
        reply: oneshot::Sender<u64>,
    },
    DeleteExpired {
        older_than: DateTime<Utc>,
        reply: oneshot::Sender<u64>,
    },
}

impl StorageOp {
    /// Static operation name for logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchUser { .. } => "fetch_user",
            Self::CreateUser { .. } => "create_user",
            Self::StoreMessage { .. } => "store_message",
            Self::FetchBacklog { .. } => "fetch_backlog",
            Self::AppendCount { .. } => "append_count",
            Self::ResetCounts { .. } => "reset_counts",
            Self::DeleteExpired { .. } => "delete_expired",
        }
    }
}

/// Handle to the storage worker.
#[derive(Clone, Debug)]
pub struct Storage {
    tx: mpsc::Sender<StorageOp>,
}

impl Storage {
    /// Spawn the storage worker for `db`.
    ///
    /// `backlog_limit` is how many messages from before a user's
    /// registration `fetch_backlog` includes.
    pub fn spawn(db: Database, backlog_limit: u32) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(STORAGE_QUEUE_SIZE);
        let worker = StorageWorker::new(db, rx, backlog_limit);
        let handle = tokio::spawn(worker.run());
        (Self { tx }, handle)
    }

    /// Queue an operation and wait for its reply, falling back to the
    /// default value if the worker is gone.
    async fn call<T: Default>(
        &self,
        op: &'static str,
        build: impl FnOnce(oneshot::Sender<T>) -> StorageOp,
    ) -> T {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(build(reply)).await.is_err() {
            warn!(%op, "Storage worker stopped; operation dropped");
            return T::default();
        }
        match rx.await {
            Ok(value) => value,
            Err(_) => {
                warn!(%op, "Storage worker dropped reply");
                T::default()
            }
        }
    }

    /// Look up a user record.
    pub async fn fetch_user(&self, username: &str) -> Option<UserRecord> {
        let username = username.to_string();
        self.call("fetch_user", |reply| StorageOp::FetchUser { username, reply })
            .await
    }

    /// Register a user with the current time and a zero counter.
    ///
    /// A duplicate is logged and ignored; call [`Storage::fetch_user`] first.
    pub async fn create_user(&self, username: &str) {
        let username = username.to_string();
        self.call("create_user", |reply| StorageOp::CreateUser { username, reply })
            .await
    }

    /// Log a message. An empty receiver means everyone.
    pub async fn store_message(&self, sender: &str, receiver: &str, text: &str) {
        let (sender, receiver, text) = (sender.to_string(), receiver.to_string(), text.to_string());
        self.call("store_message", |reply| StorageOp::StoreMessage {
            sender,
            receiver,
            text,
            reply,
        })
        .await
    }

    /// Messages to replay to `username`, oldest first. See
    /// [`crate::db::MessageRepository::backlog`] for the window.
    pub async fn fetch_backlog(&self, username: &str, since: DateTime<Utc>) -> Vec<BacklogEntry> {
        let username = username.to_string();
        self.call("fetch_backlog", |reply| StorageOp::FetchBacklog {
            username,
            since,
            reply,
        })
        .await
    }

    /// Store a new counter value for `username`.
    pub async fn append_count(&self, username: &str, count: i64) {
        let username = username.to_string();
        self.call("append_count", |reply| StorageOp::AppendCount {
            username,
            count,
            reply,
        })
        .await
    }

    /// Zero every user's counter. Returns the number of users reset.
    pub async fn reset_all_counts(&self) -> u64 {
        self.call("reset_counts", |reply| StorageOp::ResetCounts { reply })
            .await
    }

    /// Delete messages sent before `older_than`. Returns rows removed.
    pub async fn delete_expired(&self, older_than: DateTime<Utc>) -> u64 {
        self.call("delete_expired", |reply| StorageOp::DeleteExpired { older_than, reply })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn storage() -> Storage {
        let db = Database::new(":memory:").await.unwrap();
        Storage::spawn(db, 10).0
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let storage = storage().await;

        assert!(storage.fetch_user("alice").await.is_none());
        storage.create_user("alice").await;
        // Duplicate is swallowed.
        storage.create_user("alice").await;

        let user = storage.fetch_user("alice").await.unwrap();
        assert_eq!(user.message_count, 0);

        storage.append_count("alice", 3).await;
        assert_eq!(storage.fetch_user("alice").await.unwrap().message_count, 3);

        assert_eq!(storage.reset_all_counts().await, 1);
        assert_eq!(storage.fetch_user("alice").await.unwrap().message_count, 0);
    }

    #[tokio::test]
    async fn test_store_and_backlog() {
        let storage = storage().await;
        let since = Utc::now() - Duration::seconds(5);

        storage.store_message("alice", "", "hello all").await;
        storage.store_message("alice", "bob", "hello bob").await;
        storage.store_message("alice", "carol", "hello carol").await;

        let backlog = storage.fetch_backlog("bob", since).await;
        let mut texts: Vec<&str> = backlog.iter().map(|e| e.text.as_str()).collect();
        texts.sort_unstable();
        assert_eq!(texts, vec!["hello all", "hello bob"]);
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let storage = storage().await;
        storage.store_message("alice", "", "old news").await;

        assert_eq!(storage.delete_expired(Utc::now() - Duration::hours(1)).await, 0);
        assert_eq!(storage.delete_expired(Utc::now() + Duration::seconds(1)).await, 1);
        assert!(storage.fetch_backlog("bob", Utc::now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_operations_queue_in_order() {
        let storage = storage().await;
        storage.create_user("alice").await;

        // Queue many writes from separate tasks, then read back through the
        // same queue; the read runs after every write it was queued behind.
        let mut tasks = Vec::new();
        for n in 0..20 {
            let storage = storage.clone();
            tasks.push(tokio::spawn(async move {
                storage.store_message("alice", "", &format!("m{n}")).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let backlog = storage
            .fetch_backlog("bob", Utc::now() - Duration::minutes(1))
            .await;
        assert_eq!(backlog.len(), 20);
    }

    #[tokio::test]
    async fn test_stopped_worker_degrades_to_defaults() {
        let db = Database::new(":memory:").await.unwrap();
        let (storage, handle) = Storage::spawn(db, 10);
        handle.abort();
        let _ = handle.await;

        assert!(storage.fetch_user("alice").await.is_none());
        assert!(storage.fetch_backlog("alice", Utc::now()).await.is_empty());
        assert_eq!(storage.reset_all_counts().await, 0);
        storage.store_message("alice", "", "lost").await;
    }
}
