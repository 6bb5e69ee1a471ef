//! Outbound handles for connected sessions.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::error::DeliveryError;

/// Identifies one connection for its whole lifetime.
pub type SessionId = u64;

/// Hands out process-unique session ids.
#[derive(Debug)]
pub struct SessionIdGenerator {
    counter: AtomicU64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Generate the next id. Ids are never reused.
    pub fn next(&self) -> SessionId {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable sender side of one session's outbound line queue.
///
/// The queue is bounded; [`SessionHandle::deliver`] waits for space, which is
/// how a slow reader applies back-pressure to whoever is writing to it.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    tx: mpsc::Sender<String>,
}

impl SessionHandle {
    pub fn new(id: SessionId, tx: mpsc::Sender<String>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue one line for the session's writer.
    pub async fn deliver(&self, line: String) -> Result<(), DeliveryError> {
        self.tx
            .send(line)
            .await
            .map_err(|_| DeliveryError::Closed(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids = SessionIdGenerator::new();
        let a = ids.next();
        let b = ids.next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_deliver_and_close() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = SessionHandle::new(9, tx);

        handle.deliver("hi".into()).await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("hi"));

        drop(rx);
        assert_eq!(
            handle.deliver("lost".into()).await,
            Err(DeliveryError::Closed(9))
        );
    }
}
