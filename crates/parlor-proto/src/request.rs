//! Client request type.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where a request is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Announce the sender and replay their backlog.
    Hello,
    /// Broadcast to every connected session.
    #[default]
    All,
    /// Deliver to the session named by `receiver`.
    OneToOne,
    /// Reserved by the protocol; the server accepts it and does nothing.
    Status,
}

impl Target {
    /// Wire name of the target, also used as a metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::All => "all",
            Self::OneToOne => "one_to_one",
            Self::Status => "status",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded client request.
///
/// `receiver` and `message` are optional on the wire and default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub username: String,
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub message: String,
}

impl Request {
    /// Build a `hello` request.
    pub fn hello(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            target: Target::Hello,
            receiver: String::new(),
            message: String::new(),
        }
    }

    /// Build a broadcast request.
    pub fn to_all(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            target: Target::All,
            receiver: String::new(),
            message: message.into(),
        }
    }

    /// Build a direct message request.
    pub fn to_one(
        username: impl Into<String>,
        receiver: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            target: Target::OneToOne,
            receiver: receiver.into(),
            message: message.into(),
        }
    }

    /// Parse a request from one line of JSON.
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Serialize to a single JSON line (no terminator).
    pub fn to_json(&self) -> String {
        // A struct of strings and a unit enum always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}
