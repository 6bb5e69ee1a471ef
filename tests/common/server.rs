//! Test server management.
//!
//! Runs a parlor server inside the test's runtime on an ephemeral port with a
//! throwaway database.

use parlor::Server;
use parlor::config::Config;
use parlor::state::{SessionId, SessionRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Knobs for the `[chat]` section.
#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    pub message_limit: u32,
    pub backlog_limit: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            message_limit: 20,
            backlog_limit: 20,
        }
    }
}

/// A test server instance.
pub struct TestServer {
    addr: SocketAddr,
    registry: Arc<SessionRegistry>,
    task: JoinHandle<anyhow::Result<()>>,
    _data_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Spawn a server with default chat settings.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(ChatSettings::default()).await
    }

    pub async fn spawn_with(chat: ChatSettings) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let db_path = data_dir.path().join("parlor.db");

        let config = Config::from_toml(&format!(
            r#"
[server]
name = "test.parlor"
metrics_port = 0

[listen]
address = "127.0.0.1:0"

[database]
path = "{}"

[chat]
timezone = "UTC"
message_limit = {}
backlog_limit = {}
"#,
            db_path.display(),
            chat.message_limit,
            chat.backlog_limit,
        ))?;

        let server = Server::build(config).await?;
        let addr = server.local_addr()?;
        let registry = server.registry();
        let task = tokio::spawn(server.run());

        Ok(Self {
            addr,
            registry,
            task,
            _data_dir: data_dir,
        })
    }

    /// Get the server address.
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self, username: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(self.addr, username).await
    }

    /// Session currently registered under `username`.
    pub fn session_of(&self, username: &str) -> Option<SessionId> {
        self.registry.lookup(username).map(|handle| handle.id())
    }

    /// Wait until `username` is (or is no longer) registered.
    pub async fn wait_registered(&self, username: &str, registered: bool) -> anyhow::Result<()> {
        for _ in 0..100 {
            if self.registry.lookup(username).is_some() == registered {
                return Ok(());
            }
            sleep(Duration::from_millis(20)).await;
        }
        anyhow::bail!("{username} registered != {registered} after 2 seconds")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
