use super::{messages, HandlerContext, HandlerResult, Reply};
use crate::types::UserId;

pub const MAX_PROJECT_NAME_CHARS: usize = 100;

/// `/newproject <name>` - create a named project for the caller
pub async fn handle(ctx: &HandlerContext, caller: UserId, name: Option<&str>) -> HandlerResult {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(Reply::text(messages::NEW_PROJECT_USAGE));
    };
    if name.chars().count() > MAX_PROJECT_NAME_CHARS {
        return Ok(Reply::text(messages::PROJECT_NAME_TOO_LONG));
    }

    ctx.store.upsert_user(caller).await?;
    let project = ctx.store.create_project(caller, name).await?;
    tracing::info!("Created project {} for owner {}", project.id, caller);

    Ok(Reply::text(messages::project_created(&project.name)))
}
