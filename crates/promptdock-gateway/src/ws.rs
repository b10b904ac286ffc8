//! WebSocket chat relay.
//!
//! One long-lived handler per connection. Every inbound text frame is an
//! independent chat request; handler errors are answered with an `error`
//! frame and the connection stays open. Only client disconnect or a
//! transport failure closes the socket.

use crate::relay::{self, ResolvedChat};
use crate::server::AppState;
use crate::{GatewayError, Result};
use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use promptdock_providers::{StreamCallbacks, Usage};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One frame sent to the browser.
///
/// Lifecycle per request: `start` opens a logical assistant message,
/// zero-or-more `stream` frames append content, exactly one terminal
/// frame (`end` or `error`) closes it. `info` is sent once on connect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WsFrame {
    /// Connection greeting.
    Info { message: String },

    /// A response is starting.
    Start,

    /// Incremental content fragment, in vendor order.
    Stream { content: String },

    /// Terminal frame carrying the full concatenated text.
    End {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },

    /// Terminal error frame. The connection stays open.
    Error { error: String },
}

impl WsFrame {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

/// Destination for outbound frames.
///
/// Abstracted from the socket so the relay logic can be exercised
/// without a live connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Send one frame; an error means the transport is gone.
    async fn send_frame(&mut self, frame: WsFrame) -> Result<()>;
}

struct SocketSink(SplitSink<WebSocket, WsMessage>);

#[async_trait]
impl FrameSink for SocketSink {
    async fn send_frame(&mut self, frame: WsFrame) -> Result<()> {
        let text = serde_json::to_string(&frame)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        self.0
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| GatewayError::WebSocket(e.to_string()))
    }
}

#[async_trait]
impl FrameSink for Vec<WsFrame> {
    async fn send_frame(&mut self, frame: WsFrame) -> Result<()> {
        self.push(frame);
        Ok(())
    }
}

/// WebSocket upgrade handler for `/api/chat/ws`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

/// Drive one WebSocket connection to completion.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, addr: SocketAddr) {
    let conn_id = uuid::Uuid::new_v4();
    info!("WebSocket client connected: {} from {}", conn_id, addr);

    let (sender, mut receiver) = socket.split();
    let mut sink = SocketSink(sender);

    if sink
        .send_frame(WsFrame::Info {
            message: "Connected to PromptDock chat".to_string(),
        })
        .await
        .is_err()
    {
        return;
    }

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(WsMessage::Text(text)) => {
                // Err here means the transport failed mid-send.
                if handle_client_frame(&text, &state, &addr.to_string(), &mut sink)
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Ok(WsMessage::Close(_)) => {
                debug!("WebSocket client {} closed connection", conn_id);
                break;
            }
            Err(e) => {
                warn!("WebSocket transport error on {}: {}", conn_id, e);
                break;
            }
            _ => {}
        }
    }

    info!("WebSocket client disconnected: {}", conn_id);
}

/// Process one inbound client frame.
///
/// All handler-level failures are reported as a single `error` frame;
/// the returned error is reserved for transport failures.
async fn handle_client_frame<S: FrameSink>(
    text: &str,
    state: &AppState,
    client: &str,
    sink: &mut S,
) -> Result<()> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            return sink
                .send_frame(WsFrame::error("Invalid JSON message format"))
                .await;
        }
    };

    let params = match relay::parse_chat_params(&value) {
        Ok(p) => p,
        Err(message) => return sink.send_frame(WsFrame::error(message)).await,
    };

    let resolved = match relay::resolve(state, &params) {
        Ok(r) => r,
        Err(e) => return sink.send_frame(WsFrame::error(e.to_string())).await,
    };

    if params.stream {
        stream_to_sink(resolved, client, sink).await
    } else {
        respond_to_sink(resolved, client, sink).await
    }
}

/// Streaming path: `start`, one `stream` frame per vendor fragment, then
/// one `end` frame carrying the full concatenation.
///
/// The vendor call runs on its own task. If the client drops mid-stream
/// the call finishes anyway and its result is discarded.
async fn stream_to_sink<S: FrameSink>(
    resolved: ResolvedChat,
    client: &str,
    sink: &mut S,
) -> Result<()> {
    let ResolvedChat {
        provider,
        agent,
        model,
        messages,
        options,
    } = resolved;

    info!(
        "Streaming chat: provider={} model={} client={}",
        provider.name(),
        model,
        client
    );

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let callbacks = StreamCallbacks::default().on_chunk(move |chunk| {
        let _ = tx.send(chunk.to_string());
    });

    let task = tokio::spawn(async move {
        provider
            .stream_chat(&model, &messages, options, callbacks)
            .await
    });

    sink.send_frame(WsFrame::Start).await?;

    while let Some(chunk) = rx.recv().await {
        sink.send_frame(WsFrame::Stream { content: chunk }).await?;
    }

    match task.await {
        Ok(Ok(response)) => {
            let content = agent.postprocess_response(response.message);
            sink.send_frame(WsFrame::End {
                content,
                usage: response.usage,
            })
            .await
        }
        Ok(Err(e)) => sink.send_frame(WsFrame::error(e.to_string())).await,
        Err(e) => {
            sink.send_frame(WsFrame::error(format!("Stream task failed: {}", e)))
                .await
        }
    }
}

/// Non-streaming path: `start`, a single `stream` frame with the entire
/// response, then `end`.
async fn respond_to_sink<S: FrameSink>(
    resolved: ResolvedChat,
    client: &str,
    sink: &mut S,
) -> Result<()> {
    match relay::run_chat(&resolved, client).await {
        Ok(response) => {
            sink.send_frame(WsFrame::Start).await?;
            sink.send_frame(WsFrame::Stream {
                content: response.message.clone(),
            })
            .await?;
            sink.send_frame(WsFrame::End {
                content: response.message,
                usage: response.usage,
            })
            .await
        }
        Err(e) => sink.send_frame(WsFrame::error(e.to_string())).await,
    }
}
