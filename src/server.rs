//! Server assembly: storage, registry, coordinator, listener and
//! background tasks wired from one [`Config`].

use anyhow::Context as _;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{Config, validate};
use crate::db::Database;
use crate::handlers::{ChatPolicy, Coordinator};
use crate::maintenance;
use crate::network::Gateway;
use crate::state::SessionRegistry;
use crate::storage::Storage;
use crate::{http, metrics};

/// Default Prometheus port when `[server].metrics_port` is unset.
const DEFAULT_METRICS_PORT: u16 = 9090;

/// A bound, not yet running, chat server.
pub struct Server {
    config: Config,
    gateway: Gateway,
    registry: Arc<SessionRegistry>,
    storage: Storage,
    storage_worker: JoinHandle<()>,
}

impl Server {
    /// Validate `config`, open the database, start the storage worker and
    /// bind the listener. Each validation error is logged before failing.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        if let Err(errors) = validate(&config) {
            for e in &errors {
                error!(error = %e, "Invalid configuration");
            }
            anyhow::bail!("{} configuration error(s)", errors.len());
        }

        let Some(timezone) = config.chat.parsed_timezone() else {
            anyhow::bail!("invalid timezone {:?}", config.chat.timezone);
        };

        let db = Database::new(&config.database.path)
            .await
            .with_context(|| format!("opening database {}", config.database.path))?;
        let (storage, storage_worker) = Storage::spawn(db, config.chat.backlog_limit);

        let policy = ChatPolicy::new(config.chat.message_limit, timezone);
        let registry = Arc::new(SessionRegistry::new());
        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&registry),
            storage.clone(),
            policy,
        ));

        let gateway = Gateway::bind(&config.listen, coordinator)
            .await
            .with_context(|| format!("binding {}", config.listen.address))?;

        Ok(Self {
            config,
            gateway,
            registry,
            storage,
            storage_worker,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.gateway.local_addr()
    }

    /// The live session registry.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Start background tasks and accept connections until the listener fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            config,
            gateway,
            registry: _,
            storage,
            storage_worker,
        } = self;

        // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
        let metrics_port = config.server.metrics_port.unwrap_or(DEFAULT_METRICS_PORT);
        if metrics_port == 0 {
            info!("Metrics disabled");
        } else {
            metrics::init();
            tokio::spawn(http::run_http_server(metrics_port));
            info!(port = metrics_port, "Metrics endpoint started");
        }

        let expiry = maintenance::spawn_expiry_task(
            storage.clone(),
            config.maintenance.expiry_interval(),
            config.chat.message_lifetime(),
        );
        info!(
            interval_secs = config.maintenance.expiry_interval_secs,
            lifetime_minutes = config.chat.message_lifetime_minutes,
            "Message expiry task started"
        );

        let reset = maintenance::spawn_reset_task(storage, config.chat.reset_period());
        info!(
            period_minutes = config.chat.reset_period_minutes,
            limit = config.chat.message_limit,
            "Message limit reset task started"
        );

        info!(server = %config.server.name, address = %config.listen.address, "Accepting connections");
        let result = gateway.run().await;

        expiry.abort();
        reset.abort();
        storage_worker.abort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(timezone: &str) -> Config {
        Config::from_toml(&format!(
            r#"
[server]
name = "test.parlor"
metrics_port = 0

[listen]
address = "127.0.0.1:0"

[database]
path = ":memory:"

[chat]
timezone = "{timezone}"
"#
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_binds_ephemeral_port() {
        let server = Server::build(config("Europe/Moscow")).await.unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert!(server.registry().is_empty());
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let err = Server::build(config("Nowhere/Special")).await.err().unwrap();
        assert_eq!(err.to_string(), "1 configuration error(s)");
    }
}
