//! Telemetry utilities for request timing and span construction.

use parlor_proto::Target;
use std::time::Instant;

/// Guard for timing request handling.
///
/// Records latency under the request's target when dropped.
pub struct RequestTimer {
    target: Target,
    start: Instant,
}

impl RequestTimer {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_request(self.target.as_str(), duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use parlor_proto::Target;
    use std::net::SocketAddr;
    use tracing::{Span, debug_span, info_span};

    /// Span for one client connection.
    pub fn connection(session: u64, addr: SocketAddr) -> Span {
        info_span!("connection", session, addr = %addr)
    }

    /// Span for one handled request.
    pub fn request(target: Target, username: &str) -> Span {
        debug_span!("request", target = %target, username = %username)
    }
}
