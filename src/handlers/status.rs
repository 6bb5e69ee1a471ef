use async_trait::async_trait;
use parlor_proto::Request;
use tracing::debug;

use super::{Context, Handler};
use crate::error::HandlerResult;

/// `status` is accepted and ignored.
pub struct StatusHandler;

#[async_trait]
impl Handler for StatusHandler {
    async fn handle(&self, _ctx: &Context<'_>, request: &Request) -> HandlerResult {
        debug!(username = %request.username, "Status request ignored");
        Ok(())
    }
}
