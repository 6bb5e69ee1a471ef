//! In-memory session state.
//!
//! Holds the registry of connected sessions. Nothing here is persisted; the
//! registry starts empty on every restart.

mod dashmap_ext;
mod registry;
mod session;

pub use dashmap_ext::DashMapExt;
pub use registry::SessionRegistry;
pub use session::{SessionHandle, SessionId, SessionIdGenerator};
