//! parlor - a small multi-user line chat server.
//!
//! Clients connect over TCP, say `hello`, and exchange JSON requests, one per
//! line. The server replays each user's backlog on `hello`, broadcasts or
//! delivers direct messages, limits broadcasts per period, and expires old
//! messages in the background.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod http;
pub mod maintenance;
pub mod metrics;
pub mod network;
pub mod server;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use server::Server;
