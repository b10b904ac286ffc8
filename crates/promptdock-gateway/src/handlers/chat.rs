//! Synchronous chat endpoint and client configuration.

use crate::error::GatewayError;
use crate::relay;
use crate::server::AppState;
use crate::Result;
use axum::extract::{ConnectInfo, State};
use axum::Json;
use promptdock_providers::{ChatResponse, ProviderKind};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

/// `POST /api/chat` — one request, one complete response.
///
/// Unlike the WebSocket path, an empty conversation is rejected here:
/// there is nothing to respond to synchronously.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<Value>,
) -> Result<Json<ChatResponse>> {
    let params = relay::parse_chat_params(&body).map_err(GatewayError::InvalidRequest)?;
    if params.messages.is_empty() {
        return Err(GatewayError::InvalidRequest(
            relay::INVALID_MESSAGES.to_string(),
        ));
    }
    let resolved = relay::resolve(&state, &params)?;
    let response = relay::run_chat(&resolved, &addr.ip().to_string()).await?;
    Ok(Json(response))
}

/// `GET /api/chat/config` — providers and models the client can select.
pub async fn config(State(state): State<Arc<AppState>>) -> Json<Value> {
    let default = state.factory.default_kind();

    let available: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.as_str()).collect();
    let display_names: Value = ProviderKind::ALL
        .iter()
        .map(|k| (k.as_str().to_string(), json!(k.display_name())))
        .collect::<serde_json::Map<_, _>>()
        .into();

    let models: Value = ProviderKind::ALL
        .iter()
        .map(|kind| {
            let ids: Vec<&str> = kind.known_models().iter().map(|(id, _)| *id).collect();
            let names: Value = kind
                .known_models()
                .iter()
                .map(|(id, name)| (id.to_string(), json!(name)))
                .collect::<serde_json::Map<_, _>>()
                .into();
            let adapter = state.factory.create(*kind);
            (
                kind.as_str().to_string(),
                json!({
                    "available": ids,
                    "default": adapter.default_model(),
                    "displayNames": names,
                }),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into();

    Json(json!({
        "providers": {
            "available": available,
            "default": default.as_str(),
            "displayNames": display_names,
        },
        "models": models,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_lists_all_providers() {
        let state = Arc::new(AppState::for_tests());
        let Json(config) = config(State(state)).await;

        let available = config["providers"]["available"].as_array().unwrap();
        assert_eq!(available.len(), ProviderKind::ALL.len());
        assert_eq!(config["providers"]["default"], "openai");
        assert_eq!(config["providers"]["displayNames"]["anthropic"], "Anthropic");

        for kind in ProviderKind::ALL {
            let entry = &config["models"][kind.as_str()];
            assert!(!entry["available"].as_array().unwrap().is_empty());
            assert!(entry["default"].is_string());
        }
    }
}
