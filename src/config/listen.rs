//! Network listener configuration.

use serde::Deserialize;
use std::net::SocketAddr;

use super::defaults::{default_max_line_length, default_outbound_queue};

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:8000").
    pub address: SocketAddr,
    /// Longest accepted request line in bytes, newline included.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Capacity of each session's outbound line queue.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}
