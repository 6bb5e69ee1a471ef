//! `all`: rate-limited broadcast to every other session.

use async_trait::async_trait;
use parlor_proto::reply::chat_line;
use parlor_proto::{RATE_LIMIT_WARNING, Request};
use tracing::{debug, info};

use super::fanout;
use super::{Context, Handler};
use crate::error::HandlerResult;
use crate::metrics;

pub struct BroadcastHandler;

#[async_trait]
impl Handler for BroadcastHandler {
    async fn handle(&self, ctx: &Context<'_>, request: &Request) -> HandlerResult {
        let username = request.username.as_str();
        let count = ctx.user.message_count;

        if count >= ctx.policy.message_limit {
            info!(%username, count, limit = ctx.policy.message_limit, "Broadcast rate limited");
            metrics::record_rate_limited();
            return ctx.reply(RATE_LIMIT_WARNING.to_string()).await;
        }

        let line = chat_line(&ctx.policy.now_stamp(), username, &request.message);
        let recipients = fanout::to_all_except(ctx.registry, ctx.requester.id(), &line).await;

        // Read-then-write: concurrent broadcasts by one user may both pass
        // the check above and store the same next value.
        ctx.storage.append_count(username, count + 1).await;

        debug!(%username, recipients, count = count + 1, "Broadcast delivered");
        Ok(())
    }
}
