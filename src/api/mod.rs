// HTTP surface: webhook intake plus liveness/health probes
pub mod health;
pub mod webhook;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::database::ProjectStore;
use crate::dispatch::UpdateRouter;

pub const WEBHOOK_PATH: &str = "/webhook";

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<UpdateRouter>,
    pub store: Arc<dyn ProjectStore>,
    /// This bot's handle, for matching `/command@bot`
    pub bot_username: Arc<str>,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        router: Arc<UpdateRouter>,
        store: Arc<dyn ProjectStore>,
        bot_username: String,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            router,
            store,
            bot_username: Arc::from(bot_username),
            webhook_secret: webhook_secret.map(Arc::from),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Platform callback
        .route(WEBHOOK_PATH, post(webhook::webhook_post))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
