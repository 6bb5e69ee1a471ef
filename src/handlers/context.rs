//! Per-request context and chat policy.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parlor_proto::reply::format_timestamp;
use std::net::SocketAddr;

use crate::error::HandlerResult;
use crate::metrics;
use crate::state::{SessionHandle, SessionRegistry};
use crate::storage::Storage;

/// Rate limit and timestamp rendering shared by every handler.
#[derive(Debug, Clone)]
pub struct ChatPolicy {
    /// Broadcasts allowed per reset period.
    pub message_limit: i64,
    /// Zone chat timestamps are rendered in.
    pub timezone: Tz,
}

impl ChatPolicy {
    pub fn new(message_limit: u32, timezone: Tz) -> Self {
        Self {
            message_limit: i64::from(message_limit),
            timezone,
        }
    }

    /// Render `at` in the configured zone.
    pub fn stamp(&self, at: DateTime<Utc>) -> String {
        format_timestamp(&at.with_timezone(&self.timezone))
    }

    pub fn now_stamp(&self) -> String {
        self.stamp(Utc::now())
    }
}

/// The requester's stored user record, created on first contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedUser {
    pub registered_at: DateTime<Utc>,
    pub message_count: i64,
}

/// Everything a handler needs for one request.
pub struct Context<'a> {
    /// Outbound handle of the connection that sent the request.
    pub requester: &'a SessionHandle,
    pub registry: &'a SessionRegistry,
    pub storage: &'a Storage,
    pub policy: &'a ChatPolicy,
    /// The sender's user record as it was before this request.
    pub user: ResolvedUser,
    pub remote_addr: SocketAddr,
}

impl Context<'_> {
    /// Send a line back to the requester.
    pub async fn reply(&self, line: String) -> HandlerResult {
        self.requester.deliver(line).await?;
        metrics::record_delivered();
        Ok(())
    }
}
