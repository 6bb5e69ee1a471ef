//! Username to session mapping.

use dashmap::DashMap;
use tracing::debug;

use super::dashmap_ext::DashMapExt;
use super::session::{SessionHandle, SessionId, SessionIdGenerator};
use crate::metrics;

/// Registered sessions keyed by username.
///
/// One entry per username; a later `hello` for the same name replaces the
/// earlier handle. Shared behind an `Arc` by every connection task.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
    ids: SessionIdGenerator,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a new connection.
    pub fn next_session_id(&self) -> SessionId {
        self.ids.next()
    }

    /// Map `username` to `handle`, replacing any previous session.
    pub fn register(&self, username: &str, handle: SessionHandle) {
        let session = handle.id();
        if let Some(previous) = self.sessions.insert(username.to_string(), handle)
            && previous.id() != session
        {
            debug!(%username, old = previous.id(), new = session, "Session replaced");
        }
        metrics::set_registered_sessions(self.sessions.len());
    }

    /// Remove `username` if present.
    pub fn unregister(&self, username: &str) -> bool {
        let removed = self.sessions.remove(username).is_some();
        metrics::set_registered_sessions(self.sessions.len());
        removed
    }

    /// Remove `username` only while it still maps to `session`.
    pub fn unregister_session(&self, username: &str, session: SessionId) -> bool {
        let removed = self
            .sessions
            .remove_if(username, |_, handle| handle.id() == session)
            .is_some();
        if removed {
            debug!(%username, session, "Session unregistered");
        }
        metrics::set_registered_sessions(self.sessions.len());
        removed
    }

    /// Owned copy of every registered session.
    pub fn all(&self) -> Vec<(String, SessionHandle)> {
        self.sessions.snapshot()
    }

    pub fn lookup(&self, username: &str) -> Option<SessionHandle> {
        self.sessions.get_cloned(username)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(registry: &SessionRegistry) -> (SessionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (SessionHandle::new(registry.next_session_id(), tx), rx)
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = SessionRegistry::new();
        let (h, _rx) = handle(&registry);

        registry.register("alice", h.clone());
        registry.register("alice", h.clone());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("alice").map(|s| s.id()), Some(h.id()));
    }

    #[test]
    fn test_last_hello_wins() {
        let registry = SessionRegistry::new();
        let (first, _rx1) = handle(&registry);
        let (second, _rx2) = handle(&registry);

        registry.register("alice", first);
        registry.register("alice", second.clone());

        assert_eq!(registry.lookup("alice").map(|s| s.id()), Some(second.id()));
    }

    #[test]
    fn test_unregister_missing_is_noop() {
        let registry = SessionRegistry::new();
        assert!(!registry.unregister("ghost"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_session_keeps_newer_handle() {
        let registry = SessionRegistry::new();
        let (old, _rx1) = handle(&registry);
        let (new, _rx2) = handle(&registry);

        registry.register("alice", old.clone());
        registry.register("alice", new.clone());

        assert!(!registry.unregister_session("alice", old.id()));
        assert!(registry.lookup("alice").is_some());
        assert!(registry.unregister_session("alice", new.id()));
        assert!(registry.lookup("alice").is_none());
    }

    #[test]
    fn test_all_is_a_snapshot() {
        let registry = SessionRegistry::new();
        let (a, _rx1) = handle(&registry);
        let (b, _rx2) = handle(&registry);
        registry.register("alice", a);
        registry.register("bob", b);

        let snapshot = registry.all();
        registry.unregister("alice");

        let mut names: Vec<_> = snapshot.into_iter().map(|(name, _)| name).collect();
        names.sort();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(registry.len(), 1);
    }
}
