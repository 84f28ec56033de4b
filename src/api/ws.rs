//! Real-time price channel

use super::AppState;
use crate::hub::{BroadcastHub, PriceUpdateEvent};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

/// Forward hub events to one client until either side goes away
async fn handle_socket(socket: WebSocket, hub: BroadcastHub) {
    // Subscribe before anything else so no event published after the
    // upgrade is missed
    let mut subscription = hub.subscribe();
    let id = subscription.id();
    let (mut sender, mut receiver) = socket.split();

    tracing::info!(subscriber = %id, "WebSocket client connected");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    tracing::info!(subscriber = %id, "Subscriber fell behind, closing connection");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                };
                if !send_event(&mut sender, &event).await {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    None | Some(Ok(Message::Close(_))) => break,
                    Some(Err(e)) => {
                        tracing::debug!(subscriber = %id, error = %e, "WebSocket receive error");
                        break;
                    }
                    // Client messages carry no meaning
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::info!(subscriber = %id, "WebSocket client disconnected");
}

/// Returns false once the client can no longer be written to
async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &PriceUpdateEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize price update");
            return true;
        }
    };

    sender.send(Message::Text(json.into())).await.is_ok()
}
