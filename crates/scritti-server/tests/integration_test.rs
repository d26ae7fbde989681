//! End-to-end tests for the scritti HTTP API.
//!
//! Each test builds a router over a fresh in-memory store and sends
//! requests with `tower::ServiceExt::oneshot`, without a network server.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use scritti_server::router::build_router;
use scritti_server::state::AppState;
use scritti_storage::{FileSystem, MemoryFileSystem};
use scritti_store::{AssetStore, StoreConfig};

fn test_app(files: &[(&str, &str)]) -> Router {
    let fs = MemoryFileSystem::new();
    for (path, content) in files {
        fs.write(Path::new(path), content.as_bytes()).unwrap();
    }
    let store = AssetStore::new(Arc::new(fs), StoreConfig::default());
    build_router(AppState::new(store))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));
    (status, json)
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    send(app, Request::builder().uri(path).body(Body::empty()).unwrap()).await
}

async fn put_json(
    app: &Router,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder()
            .method("PUT")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn get_component_reports_source_and_dependencies() {
    let app = test_app(&[("main", "root\n\tchild | hi"), ("style/root", "a")]);

    let (status, body) = get_json(&app, "/assets/component/main").await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["id"], json!({ "kind": 0, "name": "main" }));
    assert_eq!(body["source"], "root\n\tchild | hi");
    assert_eq!(
        body["dependencies"],
        json!([{ "kind": 1, "name": "child" }, { "kind": 1, "name": "root" }])
    );
}

#[tokio::test]
async fn list_includes_loaded_and_placeholder_entries() {
    let app = test_app(&[("main", "root")]);

    let (_, body) = get_json(&app, "/assets").await;
    assert_eq!(body["assets"], json!([]));

    get_json(&app, "/assets/component/main").await;
    let (status, body) = get_json(&app, "/assets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["assets"],
        json!([{ "kind": 0, "name": "main" }, { "kind": 1, "name": "root" }])
    );
}

#[tokio::test]
async fn missing_asset_is_404() {
    let app = test_app(&[]);
    let (status, body) = get_json(&app, "/assets/style/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn unknown_kind_is_400() {
    let app = test_app(&[]);
    let (status, body) = get_json(&app, "/assets/font/serif").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn kind_accepts_index() {
    let app = test_app(&[("style/root", "a b")]);
    let (status, body) = get_json(&app, "/assets/1/root").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "a b");
}

#[tokio::test]
async fn nested_names_resolve_under_kind_directory() {
    let app = test_app(&[("svg/icons/logo", "<svg/>")]);
    let (status, body) = get_json(&app, "/assets/svg/icons/logo").await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["id"]["name"], "icons/logo");
}

#[tokio::test]
async fn put_creates_missing_asset() {
    let app = test_app(&[]);

    let (status, body) = put_json(&app, "/assets/style/fresh", json!({ "source": "x y" })).await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["id"], json!({ "kind": 1, "name": "fresh" }));

    let (status, body) = get_json(&app, "/assets/style/fresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "x y");
}

#[tokio::test]
async fn put_of_unparsable_new_asset_is_422() {
    let app = test_app(&[]);
    let (status, body) = put_json(&app, "/assets/svg/broken", json!({ "source": "plain text" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
}

#[tokio::test]
async fn put_without_source_is_rejected() {
    let app = test_app(&[]);
    let (status, _) = put_json(&app, "/assets/style/x", json!({ "content": "a" })).await;
    assert!(status.is_client_error());
}
