use super::{messages, HandlerContext, HandlerResult, Reply};
use crate::types::UserId;

/// `/status` - report the bot account and the caller's id
pub async fn handle(ctx: &HandlerContext, caller: UserId) -> HandlerResult {
    let me = ctx.bot.get_me().await?;
    Ok(Reply::text(messages::status(&me.username, caller)))
}
