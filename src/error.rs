//! Error types for request handling and session delivery.

use thiserror::Error;

use crate::state::SessionId;

// ============================================================================
// Delivery Errors (outbound queues)
// ============================================================================

/// A line could not be queued to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The session's writer is gone; its connection has ended.
    #[error("session {0} is closed")]
    Closed(SessionId),
}

// ============================================================================
// Handler Errors (request processing)
// ============================================================================

/// Errors that end processing of one request.
///
/// Failures delivering to *other* sessions are handled inside the
/// coordinator; only failures that concern the requester surface here.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The requester's own outbound queue is closed.
    #[error("requester unreachable: {0}")]
    Delivery(#[from] DeliveryError),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Delivery(_) => "delivery_failed",
        }
    }
}

/// Result type for request handlers.
pub type HandlerResult = Result<(), HandlerError>;
