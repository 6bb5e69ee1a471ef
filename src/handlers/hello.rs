//! `hello`: backlog replay, registration and join announcement.

use async_trait::async_trait;
use parlor_proto::Request;
use parlor_proto::reply::{chat_line, join_announcement};
use tracing::info;

use super::fanout;
use super::{Context, Handler};
use crate::error::HandlerResult;

pub struct HelloHandler;

#[async_trait]
impl Handler for HelloHandler {
    async fn handle(&self, ctx: &Context<'_>, request: &Request) -> HandlerResult {
        let username = request.username.as_str();

        let backlog = ctx
            .storage
            .fetch_backlog(username, ctx.user.registered_at)
            .await;
        let replayed = backlog.len();
        for entry in backlog {
            let line = chat_line(&ctx.policy.stamp(entry.sent_at), &entry.sender, &entry.text);
            ctx.reply(line).await?;
        }

        ctx.registry.register(username, ctx.requester.clone());

        let announced =
            fanout::to_all_except(ctx.registry, ctx.requester.id(), &join_announcement(username))
                .await;

        info!(
            %username,
            addr = %ctx.remote_addr,
            session = ctx.requester.id(),
            replayed,
            announced,
            "Session registered"
        );
        Ok(())
    }
}
