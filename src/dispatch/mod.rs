pub mod gate;

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{error, info, Instrument};

use crate::handlers::{self, messages, HandlerContext, HandlerResult, Reply};
use crate::types::{CommandName, Update, UpdateKind};

pub use gate::{AdminGate, Gated};

/// How an update ended, surfaced to the webhook response and the logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Handled,
    Refused,
    Ignored,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub route: &'static str,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    pub reply_sent: bool,
}

/// Routes each canonical update to exactly one handler and sends its reply
pub struct UpdateRouter {
    ctx: HandlerContext,
    gate: AdminGate,
    admin_only: BTreeSet<CommandName>,
}

enum Routed {
    Done(Reply),
    Refused,
}

impl UpdateRouter {
    pub fn new(ctx: HandlerContext, gate: AdminGate, admin_only: BTreeSet<CommandName>) -> Self {
        Self {
            ctx,
            gate,
            admin_only,
        }
    }

    /// Handle one update end to end. Never returns an error: failures become the fixed
    /// error reply and a `Failed` outcome.
    pub async fn dispatch(&self, update: &Update) -> DispatchOutcome {
        let route = update.kind.route();
        let span = tracing::info_span!(
            "update",
            update_id = update.update_id,
            caller = update.caller,
            route
        );

        async move {
            let (status, reply) = match self.route(update).await {
                Ok(Routed::Done(Reply::Send(text))) => (OutcomeStatus::Handled, Some(text)),
                Ok(Routed::Done(Reply::Silent)) => (OutcomeStatus::Ignored, None),
                Ok(Routed::Refused) => (OutcomeStatus::Refused, Some(messages::ACCESS_DENIED.to_string())),
                Err(e) => {
                    error!("Update handling failed: {}", e);
                    (
                        OutcomeStatus::Failed { error: e.to_string() },
                        Some(e.reply_text().to_string()),
                    )
                }
            };

            let reply_sent = match reply {
                Some(text) => match self.ctx.bot.send_message(update.chat_id, &text).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!("Failed to send reply to chat {}: {}", update.chat_id, e);
                        false
                    }
                },
                None => false,
            };

            let outcome = DispatchOutcome {
                route,
                status,
                reply_sent,
            };
            match &outcome.status {
                OutcomeStatus::Failed { .. } => {}
                status => info!(?status, reply_sent, "Update dispatched"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn route(&self, update: &Update) -> Result<Routed, handlers::HandlerError> {
        let caller = update.caller;

        match update.kind.command() {
            Some(command) if self.admin_only.contains(&command) => {
                match self.gate.guard(caller, || self.run(update)).await {
                    Gated::Allowed(result) => result.map(Routed::Done),
                    Gated::Refused => Ok(Routed::Refused),
                }
            }
            _ => self.run(update).await.map(Routed::Done),
        }
    }

    async fn run(&self, update: &Update) -> HandlerResult {
        let ctx = &self.ctx;
        let caller = update.caller;

        match &update.kind {
            UpdateKind::Start => handlers::start::handle(ctx, caller).await,
            UpdateKind::Status => handlers::status::handle(ctx, caller).await,
            UpdateKind::NewProject { name } => {
                handlers::new_project::handle(ctx, caller, name.as_deref()).await
            }
            UpdateKind::Photo { variants } => handlers::media::handle(ctx, caller, variants).await,
            UpdateKind::Unrecognized { text } => Ok(unrecognized(text.as_deref())),
        }
    }
}

/// Unknown slash commands get a hint; plain chatter is ignored
fn unrecognized(text: Option<&str>) -> Reply {
    match text {
        Some(t) if t.trim_start().starts_with('/') => Reply::text(messages::UNKNOWN_COMMAND),
        _ => Reply::Silent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ProjectStore;
    use crate::testing::{MemoryProjectStore, RecordingBot};
    use crate::types::PhotoVariant;
    use std::sync::Arc;

    struct Harness {
        store: Arc<MemoryProjectStore>,
        bot: Arc<RecordingBot>,
        router: UpdateRouter,
    }

    fn harness(admin: Option<&str>, admin_only: &[CommandName]) -> Harness {
        let store = Arc::new(MemoryProjectStore::new());
        let bot = Arc::new(RecordingBot::new("nezarat_bot"));
        let router = UpdateRouter::new(
            HandlerContext::new(store.clone(), bot.clone()),
            AdminGate::new(admin.map(str::to_string)),
            admin_only.iter().copied().collect(),
        );
        Harness { store, bot, router }
    }

    fn update(caller: i64, kind: UpdateKind) -> Update {
        Update {
            update_id: 1,
            caller,
            chat_id: caller,
            kind,
        }
    }

    fn photo(ids: &[&str]) -> UpdateKind {
        UpdateKind::Photo {
            variants: ids
                .iter()
                .map(|id| PhotoVariant {
                    platform_file_id: id.to_string(),
                    width: 10,
                    height: 10,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn start_registers_user_and_greets() {
        let h = harness(None, &[]);

        let outcome = h.router.dispatch(&update(42, UpdateKind::Start)).await;

        assert_eq!(outcome.status, OutcomeStatus::Handled);
        assert!(outcome.reply_sent);
        assert_eq!(h.store.users().iter().map(|u| u.id).collect::<Vec<_>>(), [42]);
        assert_eq!(h.bot.last_text().as_deref(), Some(messages::GREETING));
        assert_eq!(h.bot.sent()[0].chat_id, 42);
    }

    #[tokio::test]
    async fn status_reports_bot_and_caller() {
        let h = harness(None, &[]);
        h.router.dispatch(&update(42, UpdateKind::Status)).await;
        assert_eq!(
            h.bot.last_text().as_deref(),
            Some("Bot: nezarat_bot\nUserId: 42")
        );
    }

    #[tokio::test]
    async fn photo_then_photo_reuses_default_project() {
        let h = harness(None, &[]);

        let first = h
            .router
            .dispatch(&update(7, photo(&["small", "medium", "large"])))
            .await;
        assert_eq!(first.route, "photo");
        assert_eq!(first.status, OutcomeStatus::Handled);

        let projects = h.store.projects();
        let files = h.store.files();
        assert_eq!(projects.len(), 1);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].project_id, projects[0].id);
        assert_eq!(files[0].platform_file_id, "large");
        assert_eq!(h.bot.last_text().as_deref(), Some(messages::PHOTO_SAVED));

        h.router.dispatch(&update(7, photo(&["s2", "l2"]))).await;

        let files = h.store.files();
        assert_eq!(h.store.projects().len(), 1);
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].project_id, projects[0].id);
        assert_eq!(files[1].platform_file_id, "l2");
    }

    #[tokio::test]
    async fn redelivered_photo_duplicates_file_row() {
        let h = harness(None, &[]);
        let u = update(7, photo(&["large"]));
        h.router.dispatch(&u).await;
        h.router.dispatch(&u).await;
        assert_eq!(h.store.files().len(), 2);
    }

    #[tokio::test]
    async fn photo_failure_gets_photo_error_reply() {
        let h = harness(None, &[]);
        h.store.fail_writes(true);

        let outcome = h.router.dispatch(&update(7, photo(&["large"]))).await;

        assert!(matches!(outcome.status, OutcomeStatus::Failed { .. }));
        assert!(outcome.reply_sent);
        assert_eq!(h.bot.last_text().as_deref(), Some(messages::PHOTO_FAILED));
    }

    #[tokio::test]
    async fn command_failure_gets_generic_error_reply() {
        let h = harness(None, &[]);
        h.store.fail_writes(true);

        let outcome = h.router.dispatch(&update(42, UpdateKind::Start)).await;

        assert!(matches!(outcome.status, OutcomeStatus::Failed { .. }));
        assert_eq!(h.bot.last_text().as_deref(), Some(messages::GENERIC_ERROR));
    }

    #[tokio::test]
    async fn gated_newproject_refuses_non_admin() {
        let h = harness(Some("42"), &[CommandName::NewProject]);

        let outcome = h
            .router
            .dispatch(&update(
                7,
                UpdateKind::NewProject {
                    name: Some("Kitchen".to_string()),
                },
            ))
            .await;

        assert_eq!(outcome.status, OutcomeStatus::Refused);
        assert_eq!(h.bot.last_text().as_deref(), Some(messages::ACCESS_DENIED));
        assert!(h.store.projects().is_empty());
        assert!(h.store.users().is_empty());
    }

    #[tokio::test]
    async fn gated_newproject_runs_for_admin() {
        let h = harness(Some("42"), &[CommandName::NewProject]);

        let outcome = h
            .router
            .dispatch(&update(
                42,
                UpdateKind::NewProject {
                    name: Some("Kitchen".to_string()),
                },
            ))
            .await;

        assert_eq!(outcome.status, OutcomeStatus::Handled);
        let projects = h.store.list_projects(42).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Kitchen");
        assert_eq!(
            h.bot.last_text(),
            Some(messages::project_created("Kitchen"))
        );
    }

    #[tokio::test]
    async fn ungated_newproject_runs_for_anyone() {
        let h = harness(Some("42"), &[]);
        h.router
            .dispatch(&update(7, UpdateKind::NewProject { name: Some("Mine".to_string()) }))
            .await;
        assert_eq!(h.store.list_projects(7).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn newproject_without_name_shows_usage() {
        let h = harness(None, &[]);
        h.router
            .dispatch(&update(7, UpdateKind::NewProject { name: None }))
            .await;
        assert_eq!(h.bot.last_text().as_deref(), Some(messages::NEW_PROJECT_USAGE));
        assert!(h.store.projects().is_empty());
    }

    #[tokio::test]
    async fn photos_are_never_gated() {
        let h = harness(Some("42"), &[CommandName::Start, CommandName::Status, CommandName::NewProject]);
        let outcome = h.router.dispatch(&update(7, photo(&["large"]))).await;
        assert_eq!(outcome.status, OutcomeStatus::Handled);
    }

    #[tokio::test]
    async fn unrecognized_commands_get_hint_and_chatter_is_ignored() {
        let h = harness(None, &[]);

        let hinted = h
            .router
            .dispatch(&update(7, UpdateKind::Unrecognized { text: Some("/help".to_string()) }))
            .await;
        assert_eq!(hinted.status, OutcomeStatus::Handled);
        assert_eq!(h.bot.last_text().as_deref(), Some(messages::UNKNOWN_COMMAND));

        let ignored = h
            .router
            .dispatch(&update(7, UpdateKind::Unrecognized { text: Some("hi".to_string()) }))
            .await;
        assert_eq!(ignored.status, OutcomeStatus::Ignored);
        assert!(!ignored.reply_sent);
        assert_eq!(h.bot.sent().len(), 1);
    }

    #[tokio::test]
    async fn send_failure_is_reported_not_raised() {
        let h = harness(None, &[]);
        h.bot.fail_sends(true);

        let outcome = h.router.dispatch(&update(42, UpdateKind::Start)).await;

        assert_eq!(outcome.status, OutcomeStatus::Handled);
        assert!(!outcome.reply_sent);
        assert_eq!(h.store.users().len(), 1);
    }

    #[test]
    fn outcome_serializes_flat() {
        let outcome = DispatchOutcome {
            route: "photo",
            status: OutcomeStatus::Failed {
                error: "boom".to_string(),
            },
            reply_sent: true,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({
                "route": "photo",
                "status": "failed",
                "error": "boom",
                "reply_sent": true
            })
        );
    }
}
