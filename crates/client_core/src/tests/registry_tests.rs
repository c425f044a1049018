use super::*;
use crate::test_support::{closed_port_url, record_json, spawn_stub};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::Mutex;

async fn list_stub(status: StatusCode, body: impl Into<String>) -> String {
    let body: String = body.into();
    let app = Router::new().route(
        "/models",
        get(move || {
            let body = body.clone();
            async move { (status, body) }
        }),
    );
    spawn_stub(app).await.expect("spawn stub")
}

#[derive(Clone, Default)]
struct RegistryStubState {
    registered: Arc<Mutex<Vec<Value>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

async fn register_ok(
    State(state): State<RegistryStubState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.registered.lock().await.push(body);
    (StatusCode::CREATED, Json(record_json("m-1")))
}

async fn delete_ok(State(state): State<RegistryStubState>, Path(id): Path<String>) -> StatusCode {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.deleted.lock().await.push(id);
    StatusCode::NO_CONTENT
}

async fn spawn_registry_stub() -> (String, RegistryStubState) {
    let state = RegistryStubState::default();
    let app = Router::new()
        .route("/models", get(|| async { Json(json!([])) }).post(register_ok))
        .route("/models/:id", delete(delete_ok))
        .with_state(state.clone());
    (spawn_stub(app).await.expect("spawn stub"), state)
}

#[tokio::test]
async fn list_models_decodes_record_array() {
    let body = json!([record_json("a"), record_json("b")]).to_string();
    let client = RegistryClient::new(list_stub(StatusCode::OK, body).await);

    let models = client.list_models().await.expect("list");
    let ids: Vec<_> = models.iter().map(|m| m.id.as_str().to_string()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn list_models_treats_non_sequence_bodies_as_empty() {
    for (status, body) in [
        (StatusCode::OK, r#"{"models": []}"#),
        (StatusCode::OK, "null"),
        (StatusCode::OK, "42"),
        (StatusCode::OK, ""),
    ] {
        let client = RegistryClient::new(list_stub(status, body).await);
        let models = client.list_models().await.expect("never fails on shape");
        assert!(models.is_empty(), "body {body:?} must normalize to empty");
    }
}

#[tokio::test]
async fn list_models_skips_malformed_entries() {
    let body = json!([record_json("good"), {"id": "bad"}, "junk"]).to_string();
    let client = RegistryClient::new(list_stub(StatusCode::OK, body).await);

    let models = client.list_models().await.expect("list");
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].id.as_str(), "good");
}

#[tokio::test]
async fn list_models_rejection_surfaces_backend_message() {
    let body = json!({"message": "db down"}).to_string();
    let client = RegistryClient::new(list_stub(StatusCode::INTERNAL_SERVER_ERROR, body).await);
    let err = client.list_models().await.expect_err("rejected");
    assert_eq!(
        err,
        ConsoleError::Validation("Failed to fetch models: db down".to_string())
    );

    let client = RegistryClient::new(
        list_stub(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong: boom").await,
    );
    let err = client.list_models().await.expect_err("rejected");
    assert_eq!(err.to_string(), "Failed to fetch models: Unknown error");
}

#[test]
fn list_normalization_accepts_timestamps_without_offset() {
    let body = br#"[{"id":"a","name":"iris","version":"1","status":"registered","created_at":"2024-01-01T00:00:00"}]"#;
    let models = normalize_model_list(body);
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].id.as_str(), "a");
    assert_eq!(models[0].created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn list_models_reports_transport_failure() {
    let client = RegistryClient::new(closed_port_url().await.expect("port"));
    let err = client.list_models().await.expect_err("must fail");
    assert!(err.is_transport(), "unexpected error: {err:?}");
    assert!(err.to_string().starts_with("Error: "));
}

#[tokio::test]
async fn register_posts_name_and_version() {
    let (url, state) = spawn_registry_stub().await;
    let client = RegistryClient::new(url);

    let record = client
        .register_model("iris", "1.0.0")
        .await
        .expect("register")
        .expect("record");

    assert_eq!(record.id.as_str(), "m-1");
    let sent = state.registered.lock().await.clone();
    assert_eq!(sent, vec![json!({"name": "iris", "version": "1.0.0"})]);
}

#[tokio::test]
async fn register_rejection_surfaces_backend_message() {
    let app = Router::new().route(
        "/models",
        axum::routing::post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "name already taken"})),
            )
        }),
    );
    let client = RegistryClient::new(spawn_stub(app).await.expect("spawn stub"));

    let err = client
        .register_model("iris", "1.0.0")
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        ConsoleError::Validation("Failed to register model: name already taken".to_string())
    );
}

#[tokio::test]
async fn register_rejection_without_message_uses_unknown_label() {
    let app = Router::new().route(
        "/models",
        axum::routing::post(|| async {
            (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }),
    );
    let client = RegistryClient::new(spawn_stub(app).await.expect("spawn stub"));

    let err = client
        .register_model("iris", "1.0.0")
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "Failed to register model: Unknown error");
}

#[tokio::test]
async fn register_with_empty_name_never_reaches_backend() {
    let (url, state) = spawn_registry_stub().await;
    let client = RegistryClient::new(url);

    let err = client
        .register_model("  ", "1.0.0")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ConsoleError::Validation(_)));
    assert_eq!(state.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn delete_requires_confirmed_request() {
    let (url, state) = spawn_registry_stub().await;
    let client = RegistryClient::new(url);

    DeleteRequest::new(ModelId::new("keep")).cancel();
    let confirmed = DeleteRequest::new(ModelId::new("m-9")).confirm();
    client.delete_model(&confirmed).await.expect("delete");

    assert_eq!(state.deleted.lock().await.clone(), vec!["m-9".to_string()]);
    assert_eq!(state.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn delete_rejection_surfaces_backend_message() {
    let app = Router::new().route(
        "/models/:id",
        delete(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Model not found"})),
            )
        }),
    );
    let client = RegistryClient::new(spawn_stub(app).await.expect("spawn stub"));

    let err = client
        .delete_model(&DeleteRequest::new(ModelId::new("gone")).confirm())
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "Failed to delete model: Model not found");
}

#[test]
fn normalizes_registry_list_shapes() {
    assert!(normalize_model_list(b"not json").is_empty());
    assert!(normalize_model_list(br#"{"id":"a"}"#).is_empty());
    assert_eq!(
        normalize_model_list(json!([record_json("a")]).to_string().as_bytes()).len(),
        1
    );
}
