mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn root_returns_fixed_plaintext() -> Result<()> {
    let app = common::spawn_app(&[]).await?;

    let res = app.client.get(format!("{}/", app.base_url)).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "Bot is running");
    Ok(())
}

#[tokio::test]
async fn health_reports_database() -> Result<()> {
    let app = common::spawn_app(&[]).await?;

    let res = app.client.get(format!("{}/health", app.base_url)).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn health_is_503_when_store_unreachable() -> Result<()> {
    let app = common::spawn_app(&[]).await?;
    app.store.set_unreachable(true);

    let res = app.client.get(format!("{}/health", app.base_url)).send().await?;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    Ok(())
}

#[tokio::test]
async fn webhook_only_accepts_post() -> Result<()> {
    let app = common::spawn_app(&[]).await?;

    let res = app.client.get(format!("{}/webhook", app.base_url)).send().await?;

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
