//! Chat policy and maintenance configuration.

use chrono_tz::Tz;
use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    default_backlog_limit, default_expiry_interval_secs, default_message_lifetime_minutes,
    default_message_limit, default_reset_period_minutes, default_timezone,
};

/// Backlog, retention and rate-limit policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// IANA timezone used when rendering timestamps (e.g., "Europe/Moscow").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// How many messages from before a user's registration are replayed on hello.
    #[serde(default = "default_backlog_limit")]
    pub backlog_limit: u32,
    /// Messages older than this are deleted by the expiry task.
    #[serde(default = "default_message_lifetime_minutes")]
    pub message_lifetime_minutes: u64,
    /// Period after which every user's broadcast counter is reset.
    #[serde(default = "default_reset_period_minutes")]
    pub reset_period_minutes: u64,
    /// Broadcasts allowed per user per period.
    #[serde(default = "default_message_limit")]
    pub message_limit: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            backlog_limit: default_backlog_limit(),
            message_lifetime_minutes: default_message_lifetime_minutes(),
            reset_period_minutes: default_reset_period_minutes(),
            message_limit: default_message_limit(),
        }
    }
}

impl ChatConfig {
    /// The configured zone, if `timezone` names a known IANA zone.
    pub fn parsed_timezone(&self) -> Option<Tz> {
        self.timezone.parse().ok()
    }

    /// Message retention as a chrono duration.
    pub fn message_lifetime(&self) -> chrono::Duration {
        let minutes = i64::try_from(self.message_lifetime_minutes).unwrap_or(i64::MAX);
        chrono::Duration::try_minutes(minutes).unwrap_or(chrono::Duration::MAX)
    }

    /// Counter reset period.
    pub fn reset_period(&self) -> Duration {
        Duration::from_secs(self.reset_period_minutes.saturating_mul(60))
    }
}

/// Background task timing.
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceConfig {
    /// Seconds between expiry sweeps.
    #[serde(default = "default_expiry_interval_secs")]
    pub expiry_interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            expiry_interval_secs: default_expiry_interval_secs(),
        }
    }
}

impl MaintenanceConfig {
    /// Interval between expiry sweeps.
    pub fn expiry_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_interval_secs)
    }
}
