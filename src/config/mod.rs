//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config struct, server identity and database settings
//! - [`listen`]: Client listener configuration (ListenConfig)
//! - [`chat`]: Chat policy and maintenance timing (ChatConfig, MaintenanceConfig)
//! - [`validation`]: Startup validation of loaded values

mod chat;
mod defaults;
mod listen;
mod types;
mod validation;

pub use chat::{ChatConfig, MaintenanceConfig};
pub use listen::ListenConfig;
pub use types::{Config, ConfigError, DatabaseConfig, ServerConfig};
pub use validation::{ValidationError, validate};
