//! Broadcast coordinator.
//!
//! Every decoded [`Request`] passes through [`Coordinator::dispatch`], which
//! logs the message, makes sure the sender has a user record, and hands the
//! request to the handler for its [`Target`]:
//!
//! - `hello`: replay backlog to the requester, register it, announce it
//! - `all`: broadcast to every other session, subject to the message limit
//! - `one_to_one`: deliver to the named receiver if connected
//! - `status`: accepted and ignored
//!
//! Deliveries to one fan-out's recipients happen one after another, each
//! waiting for room in that recipient's bounded queue.

mod broadcast;
mod context;
mod direct;
mod fanout;
mod hello;
mod status;

pub use context::{ChatPolicy, Context, ResolvedUser};

use async_trait::async_trait;
use chrono::Utc;
use parlor_proto::{Request, Target};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Instrument;

use crate::error::HandlerResult;
use crate::metrics;
use crate::state::{SessionHandle, SessionRegistry};
use crate::storage::Storage;
use crate::telemetry::{RequestTimer, spans};

/// Handler for one request target.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>, request: &Request) -> HandlerResult;
}

/// Shared by all connections; routes requests to target handlers.
pub struct Coordinator {
    registry: Arc<SessionRegistry>,
    storage: Storage,
    policy: ChatPolicy,
    handlers: HashMap<Target, Box<dyn Handler>>,
}

impl Coordinator {
    pub fn new(registry: Arc<SessionRegistry>, storage: Storage, policy: ChatPolicy) -> Self {
        let mut handlers: HashMap<Target, Box<dyn Handler>> = HashMap::new();
        handlers.insert(Target::Hello, Box::new(hello::HelloHandler));
        handlers.insert(Target::All, Box::new(broadcast::BroadcastHandler));
        handlers.insert(Target::OneToOne, Box::new(direct::DirectHandler));
        handlers.insert(Target::Status, Box::new(status::StatusHandler));

        Self {
            registry,
            storage,
            policy,
            handlers,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Process one request from the connection owning `requester`.
    ///
    /// Errors only concern the requester's own queue; failures reaching
    /// other sessions are absorbed by unregistering them.
    pub async fn dispatch(
        &self,
        requester: &SessionHandle,
        remote_addr: SocketAddr,
        request: Request,
    ) -> HandlerResult {
        let target = request.target;
        let _timer = RequestTimer::new(target);

        if target != Target::Hello {
            self.storage
                .store_message(&request.username, &request.receiver, &request.message)
                .await;
        }

        let user = self.resolve_user(&request.username).await;
        let ctx = Context {
            requester,
            registry: &self.registry,
            storage: &self.storage,
            policy: &self.policy,
            user,
            remote_addr,
        };

        let Some(handler) = self.handlers.get(&target) else {
            return Ok(());
        };

        let result = handler
            .handle(&ctx, &request)
            .instrument(spans::request(target, &request.username))
            .await;

        if let Err(e) = &result {
            metrics::record_request_error(target.as_str(), e.error_code());
        }
        result
    }

    /// Fetch the sender's record, creating it on first contact.
    async fn resolve_user(&self, username: &str) -> ResolvedUser {
        match self.storage.fetch_user(username).await {
            Some(record) => ResolvedUser {
                registered_at: record.registered_at,
                message_count: record.message_count,
            },
            None => {
                let registered_at = Utc::now();
                self.storage.create_user(username).await;
                ResolvedUser {
                    registered_at,
                    message_count: 0,
                }
            }
        }
    }
}
