//! JSON-RPC method dispatch for one hot-reload connection.
//!
//! An [`RpcSession`] owns the connection's subscriptions. Each `watch`
//! spawns a forwarder that moves store events into the session's outgoing
//! channel; the socket loop drains that channel as `changed` pushes.
//! Dropping or closing the session cancels every subscription it holds.

use std::collections::HashMap;

use scritti_core::AssetKey;
use scritti_store::{AssetEvent, AssetStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::schema::assets::{AssetData, AssetSource};
use crate::schema::jsonrpc::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

/// Pushes buffered per connection before forwarders wait on the socket.
pub const SESSION_BUFFER: usize = 64;

pub struct RpcSession {
    store: AssetStore,
    connection: CancellationToken,
    subscriptions: HashMap<AssetKey, CancellationToken>,
    events: mpsc::Sender<AssetEvent>,
}

impl RpcSession {
    /// Creates a session and the receiver its pushes arrive on.
    pub fn new(store: AssetStore) -> (Self, mpsc::Receiver<AssetEvent>) {
        let (events, rx) = mpsc::channel(SESSION_BUFFER);
        let session = RpcSession {
            store,
            connection: CancellationToken::new(),
            subscriptions: HashMap::new(),
            events,
        };
        (session, rx)
    }

    /// Handles one text frame.
    pub async fn handle_text(&mut self, text: &str) -> JsonRpcResponse {
        match serde_json::from_str::<JsonRpcRequest>(text) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::new(PARSE_ERROR, err.to_string()),
            ),
        }
    }

    pub async fn dispatch(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("rpc {} {}", request.method, request.params);
        match self.call(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::result(request.id, result),
            Err(error) => {
                tracing::debug!("rpc {} failed: {}", request.method, error.message);
                JsonRpcResponse::error(request.id, error)
            }
        }
    }

    async fn call(&mut self, method: &str, params: Value) -> Result<Value, JsonRpcError> {
        match method {
            "get" => {
                let key: AssetKey = parse_params(params)?;
                let asset = self.store.get(&key).await?;
                let dependencies = self.store.dependencies(&key).await;
                to_result(AssetData::new(key, &asset, dependencies))
            }
            "set" => {
                let request: AssetSource = parse_params(params)?;
                self.store.set(&request.id, &request.source).await?;
                to_result(request)
            }
            "list" => to_result(self.store.list()),
            "watch" => {
                let key: AssetKey = parse_params(params)?;
                self.watch(&key).await?;
                to_result(key)
            }
            "unwatch" => {
                let key: AssetKey = parse_params(params)?;
                Ok(Value::Bool(self.unwatch(&key)))
            }
            other => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("unknown method {other:?}"),
            )),
        }
    }

    async fn watch(&mut self, key: &AssetKey) -> Result<(), StoreError> {
        if self.subscriptions.contains_key(key) {
            return Ok(());
        }

        let token = self.connection.child_token();
        let mut changes = self.store.watch(key, token.clone()).await?;
        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(event) = changes.recv().await {
                if events.send(event).await.is_err() {
                    break;
                }
            }
        });

        self.subscriptions.insert(key.clone(), token);
        Ok(())
    }

    /// Returns false if `key` was not watched.
    fn unwatch(&mut self, key: &AssetKey) -> bool {
        match self.subscriptions.remove(key) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Keys this session is subscribed to, in key order.
    pub fn watching(&self) -> Vec<AssetKey> {
        let mut keys: Vec<AssetKey> = self.subscriptions.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn close(&mut self) {
        self.connection.cancel();
        self.subscriptions.clear();
    }
}

impl Drop for RpcSession {
    fn drop(&mut self) {
        self.connection.cancel();
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| JsonRpcError::new(INVALID_PARAMS, e.to_string()))
}

fn to_result<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))
}
