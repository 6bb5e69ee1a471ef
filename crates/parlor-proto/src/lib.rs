//! Wire protocol for the parlor chat server.
//!
//! Clients send one JSON [`Request`] per line. The server answers with plain
//! text lines built by the helpers in [`reply`]. [`ChatCodec`] frames both
//! directions for use with `tokio_util::codec`.

pub mod codec;
pub mod error;
pub mod line;
pub mod reply;
pub mod request;

pub use codec::ChatCodec;
pub use error::{ProtocolError, Result};
pub use line::LineCodec;
pub use reply::{JOIN_ANNOUNCEMENT_PREFIX, RATE_LIMIT_WARNING};
pub use request::{Request, Target};
