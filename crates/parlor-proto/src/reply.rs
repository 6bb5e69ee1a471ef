//! Server-to-client text lines.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Prefix of the line sent to existing sessions when someone says hello.
pub const JOIN_ANNOUNCEMENT_PREFIX: &str = "New guest in the chat! - ";

/// Sent to a sender who has used up their broadcast quota for the period.
pub const RATE_LIMIT_WARNING: &str =
    "You have reached the limit for sending messages to the general chat";

/// Timestamp layout used in chat lines: `2024-05-01 13:37:00.000000+02:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

/// Render a timestamp in the zone it carries.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `"<timestamp> <sender>: <text>"`, used for backlog, broadcast and direct lines.
pub fn chat_line(timestamp: &str, sender: &str, text: &str) -> String {
    format!("{timestamp} {sender}: {text}")
}

/// `"New guest in the chat! - <username>"`.
pub fn join_announcement(username: &str) -> String {
    format!("{JOIN_ANNOUNCEMENT_PREFIX}{username}")
}
