//! JSON-RPC 2.0 envelopes for the hot-reload socket.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use scritti_store::{AssetEvent, StoreError};

pub const VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// The requested asset does not exist.
pub const ASSET_NOT_FOUND: i64 = 1;
/// Any other store failure.
pub const STORE_FAILURE: i64 = 0;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        JsonRpcError {
            code,
            message: message.into(),
        }
    }
}

impl From<StoreError> for JsonRpcError {
    fn from(err: StoreError) -> Self {
        let code = if err.is_not_found() {
            ASSET_NOT_FOUND
        } else {
            STORE_FAILURE
        };
        JsonRpcError::new(code, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        JsonRpcResponse {
            jsonrpc: VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, error: JsonRpcError) -> Self {
        JsonRpcResponse {
            jsonrpc: VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// Server-initiated `changed` push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: AssetEvent,
}

impl JsonRpcNotification {
    pub fn changed(event: AssetEvent) -> Self {
        JsonRpcNotification {
            jsonrpc: VERSION.to_string(),
            method: "changed".to_string(),
            params: event,
        }
    }
}
