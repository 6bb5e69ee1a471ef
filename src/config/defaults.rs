//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "parlor".to_string()
}

pub fn default_database_path() -> String {
    "parlor.db".to_string()
}

// =============================================================================
// Listener Defaults
// =============================================================================

pub fn default_max_line_length() -> usize {
    parlor_proto::line::DEFAULT_MAX_LINE_LENGTH
}

pub fn default_outbound_queue() -> usize {
    64
}

// =============================================================================
// Chat Defaults
// =============================================================================

pub fn default_timezone() -> String {
    "UTC".to_string()
}

pub fn default_backlog_limit() -> u32 {
    20
}

pub fn default_message_lifetime_minutes() -> u64 {
    60 * 24
}

pub fn default_reset_period_minutes() -> u64 {
    60
}

pub fn default_message_limit() -> u32 {
    20
}

// =============================================================================
// Maintenance Defaults
// =============================================================================

pub fn default_expiry_interval_secs() -> u64 {
    60
}
