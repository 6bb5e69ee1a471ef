//! Background maintenance: message expiry and broadcast-counter resets.
//!
//! Both tasks tick once immediately and then on their interval. They go
//! through the storage queue like any request, so they never run at the
//! same time as each other or as request traffic.

use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::storage::Storage;

/// Delete messages older than `lifetime`. Returns rows removed.
pub async fn expire_messages(storage: &Storage, lifetime: chrono::Duration) -> u64 {
    let cutoff = Utc::now()
        .checked_sub_signed(lifetime)
        .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
    let removed = storage.delete_expired(cutoff).await;
    if removed > 0 {
        info!(removed, %cutoff, "Expired messages deleted");
    } else {
        debug!(%cutoff, "No expired messages");
    }
    removed
}

/// Zero every user's broadcast counter. Returns users reset.
pub async fn reset_limits(storage: &Storage) -> u64 {
    let reset = storage.reset_all_counts().await;
    info!(users = reset, "Message limits reset");
    reset
}

/// Run [`expire_messages`] every `interval`.
pub fn spawn_expiry_task(
    storage: Storage,
    interval: Duration,
    lifetime: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            expire_messages(&storage, lifetime).await;
        }
    })
}

/// Run [`reset_limits`] every `period`.
pub fn spawn_reset_task(storage: Storage, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            reset_limits(&storage).await;
        }
    })
}
