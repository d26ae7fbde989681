//! WebSocket hot-reload channel.
//!
//! `GET /ws` upgrades to a socket carrying JSON-RPC requests from the client
//! and `changed` pushes from the server, interleaved on one connection.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::rpc::RpcSession;
use crate::schema::jsonrpc::JsonRpcNotification;
use crate::state::AppState;

/// `GET /ws`
pub async fn hot_reload(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: AppState) {
    let (mut session, mut events) = RpcSession::new(state.store.clone());
    tracing::info!("hot-reload connection opened");

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                if !send_json(&mut socket, &JsonRpcNotification::changed(event)).await {
                    break;
                }
            }
            message = socket.recv() => match message {
                Some(Ok(Message::Text(text))) => {
                    let response = session.handle_text(text.as_str()).await;
                    if !send_json(&mut socket, &response).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!("hot-reload socket error: {}", err);
                    break;
                }
            },
        }
    }

    tracing::info!(
        "hot-reload connection closed, dropping {} subscription(s)",
        session.watching().len()
    );
    session.close();
}

/// Returns false once the socket can no longer be written.
async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> bool {
    let text = match serde_json::to_string(value) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("cannot encode hot-reload message: {}", err);
            return true;
        }
    };
    match socket.send(Message::Text(text.into())).await {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!("hot-reload send failed: {}", err);
            false
        }
    }
}
