use anyhow::Result;
use axum::Router;
use chrono::{TimeZone, Utc};
use shared::domain::{ModelId, ModelRecord, ModelStatus};
use tokio::net::TcpListener;

pub(crate) async fn spawn_stub(app: Router) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// Base URL of a port nothing listens on.
pub(crate) async fn closed_port_url() -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

pub(crate) fn record(id: &str) -> ModelRecord {
    ModelRecord {
        id: ModelId::new(id),
        name: format!("model-{id}"),
        version: "1.0.0".to_string(),
        status: ModelStatus::Created,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: None,
    }
}

pub(crate) fn record_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("model-{id}"),
        "version": "1.0.0",
        "status": "CREATED",
        "created_at": "2024-01-01T00:00:00+00:00",
        "updated_at": "2024-01-01T00:00:00+00:00"
    })
}
