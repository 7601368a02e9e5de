#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use nezarat_bot::api;
use nezarat_bot::bootstrap;
use nezarat_bot::config::AppConfig;
use nezarat_bot::testing::{MemoryProjectStore, RecordingBot};

pub const ADMIN_ID: i64 = 42;

pub struct TestApp {
    pub base_url: String,
    pub store: Arc<MemoryProjectStore>,
    pub bot: Arc<RecordingBot>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn post_update(&self, update: &Value) -> Result<reqwest::Response> {
        self.client
            .post(format!("{}/webhook", self.base_url))
            .json(update)
            .send()
            .await
            .context("webhook request failed")
    }
}

/// Serve the real router on a free port, backed by the in-memory store and a recording bot.
/// `extra_env` is layered over the minimal required configuration.
pub async fn spawn_app(extra_env: &[(&str, &str)]) -> Result<TestApp> {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("TELEGRAM_TOKEN".to_string(), "123:test".to_string()),
        ("DATABASE_URL".to_string(), "postgres://localhost/unused".to_string()),
        ("ADMIN_TELEGRAM_ID".to_string(), ADMIN_ID.to_string()),
    ]);
    for (k, v) in extra_env {
        vars.insert(k.to_string(), v.to_string());
    }
    let config = AppConfig::from_source(|key| vars.get(key).cloned())?;

    let store = Arc::new(MemoryProjectStore::new());
    let bot = Arc::new(RecordingBot::new("nezarat_bot"));
    let state = bootstrap::build_state(&config, store.clone(), bot.clone()).await?;

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, api::app(state)).await;
    });

    Ok(TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        bot,
        client: reqwest::Client::new(),
    })
}

pub fn text_update(update_id: i64, caller: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": 1_700_000_000,
            "from": { "id": caller, "is_bot": false, "first_name": "Tester" },
            "chat": { "id": caller, "type": "private" },
            "text": text
        }
    })
}

pub fn photo_update(update_id: i64, caller: i64, file_ids: &[&str]) -> Value {
    let sizes: Vec<Value> = file_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let side = 90 * (i as u32 + 1);
            json!({ "file_id": id, "file_unique_id": format!("u-{}", id), "width": side, "height": side })
        })
        .collect();

    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": 1_700_000_000,
            "from": { "id": caller, "is_bot": false, "first_name": "Tester" },
            "chat": { "id": caller, "type": "private" },
            "photo": sizes
        }
    })
}
