//! JSON-RPC dispatch for the hot-reload channel, driven without a socket.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use scritti_core::AssetKey;
use scritti_server::rpc::RpcSession;
use scritti_server::schema::jsonrpc::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use scritti_storage::{FileSystem, MemoryFileSystem};
use scritti_store::{AssetEvent, AssetStore, StoreConfig};

fn store(files: &[(&str, &str)]) -> AssetStore {
    let fs = MemoryFileSystem::new();
    for (path, content) in files {
        fs.write(Path::new(path), content.as_bytes()).unwrap();
    }
    AssetStore::new(Arc::new(fs), StoreConfig::default())
}

async fn call(session: &mut RpcSession, method: &str, params: Value, id: i64) -> JsonRpcResponse {
    let request: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id,
    }))
    .unwrap();
    session.dispatch(request).await
}

fn error_code(response: &JsonRpcResponse) -> i64 {
    response.error.as_ref().expect("expected an error").code
}

#[tokio::test]
async fn get_returns_asset_data() {
    let (mut session, _events) = RpcSession::new(store(&[("main", "root"), ("style/root", "a")]));

    let response = call(&mut session, "get", json!({ "kind": 0, "name": "main" }), 7).await;
    assert_eq!(response.id, json!(7));
    let result = response.result.unwrap();
    assert_eq!(result["source"], "root");
    assert_eq!(result["dependencies"], json!([{ "kind": 1, "name": "root" }]));
}

#[tokio::test]
async fn get_accepts_legacy_field_names() {
    let (mut session, _events) = RpcSession::new(store(&[("style/root", "a")]));
    let response = call(&mut session, "get", json!({ "assetType": "style", "name": "root" }), 1).await;
    assert!(response.error.is_none(), "{response:?}");
}

#[tokio::test]
async fn error_codes() {
    let (mut session, _events) = RpcSession::new(store(&[]));

    let missing = call(&mut session, "get", json!({ "kind": 1, "name": "gone" }), 1).await;
    assert_eq!(error_code(&missing), 1);

    let invalid = call(&mut session, "get", json!({ "kind": 1, "name": "../up" }), 2).await;
    assert_eq!(error_code(&invalid), 0);

    let bad_params = call(&mut session, "get", json!("root"), 3).await;
    assert_eq!(error_code(&bad_params), -32602);

    let unknown = call(&mut session, "render", json!(null), 4).await;
    assert_eq!(error_code(&unknown), -32601);

    let garbage = session.handle_text("{not json").await;
    assert_eq!(error_code(&garbage), -32700);
    assert_eq!(garbage.id, Value::Null);
}

#[tokio::test]
async fn set_then_list() {
    let (mut session, _events) = RpcSession::new(store(&[]));

    let params = json!({ "id": { "kind": 1, "name": "theme" }, "source": "dark" });
    let response = call(&mut session, "set", params.clone(), 1).await;
    assert_eq!(response.result, Some(params));

    let list = call(&mut session, "list", Value::Null, 2).await;
    assert_eq!(list.result, Some(json!([{ "kind": 1, "name": "theme" }])));
}

#[tokio::test]
async fn watch_pushes_changes_of_dependencies() {
    let (mut session, mut events) =
        RpcSession::new(store(&[("main", "root"), ("style/root", "a")]));
    let main = AssetKey::component("main");
    let root = AssetKey::style("root");

    let response = call(&mut session, "watch", json!({ "kind": 0, "name": "main" }), 1).await;
    assert!(response.error.is_none(), "{response:?}");
    assert_eq!(session.watching(), vec![main.clone()]);

    let set = json!({ "id": { "kind": 1, "name": "root" }, "source": "b" });
    call(&mut session, "set", set, 2).await;

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, AssetEvent { key: main, origin: root });

    let push = serde_json::to_value(JsonRpcNotification::changed(event)).unwrap();
    assert_eq!(push["method"], "changed");
    assert_eq!(push["params"]["origin"], json!({ "kind": 1, "name": "root" }));
}

#[tokio::test]
async fn unwatch_stops_pushes() {
    let (mut session, mut events) = RpcSession::new(store(&[("style/root", "a")]));
    let key = json!({ "kind": 1, "name": "root" });

    call(&mut session, "watch", key.clone(), 1).await;
    let first = call(&mut session, "unwatch", key.clone(), 2).await;
    assert_eq!(first.result, Some(json!(true)));
    let second = call(&mut session, "unwatch", key, 3).await;
    assert_eq!(second.result, Some(json!(false)));
    assert!(session.watching().is_empty());
    // Let the store deregister the subscriber.
    tokio::time::sleep(Duration::from_millis(50)).await;

    call(
        &mut session,
        "set",
        json!({ "id": { "kind": 1, "name": "root" }, "source": "b" }),
        4,
    )
    .await;
    let got = tokio::time::timeout(Duration::from_millis(200), events.recv()).await;
    assert!(got.is_err(), "unexpected push after unwatch: {got:?}");
}
