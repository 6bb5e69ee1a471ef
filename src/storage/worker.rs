//! The single storage worker task.

use super::StorageOp;
use crate::db::{Database, DbError};
use crate::metrics;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Owns the database and drains the operation queue one entry at a time.
pub struct StorageWorker {
    db: Database,
    rx: mpsc::Receiver<StorageOp>,
    backlog_limit: u32,
}

impl StorageWorker {
    pub fn new(db: Database, rx: mpsc::Receiver<StorageOp>, backlog_limit: u32) -> Self {
        Self {
            db,
            rx,
            backlog_limit,
        }
    }

    /// Run until every [`super::Storage`] handle is dropped.
    pub async fn run(mut self) {
        info!("Storage worker started");
        while let Some(op) = self.rx.recv().await {
            self.execute(op).await;
        }
        info!("Storage worker stopped");
    }

    async fn execute(&self, op: StorageOp) {
        let name = op.name();
        debug!(op = name, "Executing storage operation");

        // A dropped reply receiver means the caller went away; nothing to do.
        match op {
            StorageOp::FetchUser { username, reply } => {
                let user = self.db.users().fetch(&username).await;
                let _ = reply.send(or_default(name, user));
            }
            StorageOp::CreateUser { username, reply } => {
                match self.db.users().create(&username, Utc::now()).await {
                    Ok(()) => info!(%username, "User registered"),
                    Err(DbError::UserExists(_)) => {
                        warn!(%username, "User already registered");
                    }
                    Err(e) => log_failure(name, &e),
                }
                let _ = reply.send(());
            }
            StorageOp::StoreMessage {
                sender,
                receiver,
                text,
                reply,
            } => {
                let stored = self
                    .db
                    .messages()
                    .store(&sender, &receiver, &text, Utc::now())
                    .await;
                or_default(name, stored);
                let _ = reply.send(());
            }
            StorageOp::FetchBacklog {
                username,
                since,
                reply,
            } => {
                let entries = self
                    .db
                    .messages()
                    .backlog(&username, since, self.backlog_limit)
                    .await;
                let _ = reply.send(or_default(name, entries));
            }
            StorageOp::AppendCount {
                username,
                count,
                reply,
            } => {
                let updated = self.db.users().set_count(&username, count).await;
                or_default(name, updated);
                let _ = reply.send(());
            }
            StorageOp::ResetCounts { reply } => {
                let reset = self.db.users().reset_counts().await;
                let _ = reply.send(or_default(name, reset));
            }
            StorageOp::DeleteExpired { older_than, reply } => {
                let removed = self.db.messages().delete_older_than(older_than).await;
                let _ = reply.send(or_default(name, removed));
            }
        }
    }
}

fn log_failure(op: &'static str, e: &DbError) {
    error!(op, error = %e, "Storage operation failed");
    metrics::record_storage_error(op);
}

/// Unwrap a storage result, logging the failure and substituting the default.
fn or_default<T: Default>(op: &'static str, result: Result<T, DbError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log_failure(op, &e);
            T::default()
        }
    }
}
