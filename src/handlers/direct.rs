//! `one_to_one`: deliver to a single named session.

use async_trait::async_trait;
use parlor_proto::Request;
use parlor_proto::reply::chat_line;
use tracing::debug;

use super::fanout;
use super::{Context, Handler};
use crate::error::HandlerResult;

pub struct DirectHandler;

#[async_trait]
impl Handler for DirectHandler {
    async fn handle(&self, ctx: &Context<'_>, request: &Request) -> HandlerResult {
        let receiver = request.receiver.as_str();

        let Some(handle) = ctx.registry.lookup(receiver) else {
            debug!(sender = %request.username, %receiver, "Receiver not connected");
            return Ok(());
        };

        let line = chat_line(&ctx.policy.now_stamp(), &request.username, &request.message);
        fanout::deliver(ctx.registry, receiver, &handle, line).await;
        Ok(())
    }
}
