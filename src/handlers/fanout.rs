//! Delivery to registered sessions other than the requester.

use tracing::debug;

use crate::metrics;
use crate::state::{SessionHandle, SessionId, SessionRegistry};

/// Queue `line` to one registered session.
///
/// A closed session is removed from the registry, provided the name still
/// maps to that same session. Returns whether the line was queued.
pub async fn deliver(
    registry: &SessionRegistry,
    username: &str,
    handle: &SessionHandle,
    line: String,
) -> bool {
    match handle.deliver(line).await {
        Ok(()) => {
            metrics::record_delivered();
            true
        }
        Err(e) => {
            debug!(%username, error = %e, "Dropping dead session");
            registry.unregister_session(username, handle.id());
            false
        }
    }
}

/// Queue `line` to every registered session except `skip`, one at a time in
/// snapshot order. Returns how many sessions accepted it.
pub async fn to_all_except(registry: &SessionRegistry, skip: SessionId, line: &str) -> usize {
    let mut delivered = 0;
    for (username, handle) in registry.all() {
        if handle.id() == skip {
            continue;
        }
        if deliver(registry, &username, &handle, line.to_string()).await {
            delivered += 1;
        }
    }
    metrics::record_fanout(delivered);
    delivered
}
