use super::{messages, HandlerContext, HandlerResult, Reply};
use crate::types::UserId;

/// `/start` - register the caller and greet
pub async fn handle(ctx: &HandlerContext, caller: UserId) -> HandlerResult {
    ctx.store.upsert_user(caller).await?;
    Ok(Reply::text(messages::GREETING))
}
