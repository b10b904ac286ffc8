//! HTTP and WebSocket chat relay for PromptDock.
//!
//! This crate wires the provider adapters and agent strategies into two
//! entry points sharing one resolution path:
//! - `POST /api/chat` — synchronous request/response
//! - `GET /api/chat/ws` — persistent WebSocket with incremental token
//!   delivery
//!
//! plus the structured-analysis endpoints under `/api/ai-analysis/`.

pub mod error;
pub mod handlers;
pub mod relay;
pub mod server;
pub mod ws;

pub use error::GatewayError;
pub use server::{AppState, Server, ServerConfig};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
