//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the client socket and spawns one Connection task per
//! accepted client.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, instrument};

use crate::config::ListenConfig;
use crate::handlers::Coordinator;
use crate::metrics;
use crate::network::Connection;
use crate::telemetry::spans;

/// Accepts client connections and hands them to the coordinator.
pub struct Gateway {
    listener: TcpListener,
    config: ListenConfig,
    coordinator: Arc<Coordinator>,
}

impl Gateway {
    /// Bind the listener to `config.address`.
    pub async fn bind(config: &ListenConfig, coordinator: Arc<Coordinator>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.address).await?;
        info!(address = %config.address, "Listener bound");
        Ok(Self {
            listener,
            config: config.clone(),
            coordinator,
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    metrics::record_connection();
                    let session = self.coordinator.registry().next_session_id();
                    info!(%addr, session, "Connection accepted");

                    if let Err(e) = stream.set_nodelay(true) {
                        error!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }

                    let connection = Connection::new(
                        session,
                        stream,
                        addr,
                        Arc::clone(&self.coordinator),
                        &self.config,
                    );
                    tokio::spawn(connection.run().instrument(spans::connection(session, addr)));
                }
                Err(e) => {
                    error!(error = %e, "Accept failed");
                }
            }
        }
    }
}
