//! Shared request resolution for both chat entry points.
//!
//! HTTP and WebSocket requests carry the same selector fields and go
//! through the same pipeline: validate messages, resolve agent and
//! provider, build the conversation, dispatch, postprocess.

use crate::error::GatewayError;
use crate::server::AppState;
use crate::Result;
use promptdock_agents::{Agent, AgentContext, AgentKind};
use promptdock_providers::{ChatOptions, ChatResponse, Message, Provider};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Exact validation message for a missing or non-array `messages` field.
pub const INVALID_MESSAGES: &str = "Messages are required and must be an array";

/// Parsed chat request, shared by the HTTP and WebSocket paths.
#[derive(Debug, Clone)]
pub struct ChatParams {
    /// Conversation history.
    pub messages: Vec<Message>,

    /// Provider selector.
    pub provider: Option<String>,

    /// Model selector.
    pub model: Option<String>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Agent strategy selector.
    pub agent: Option<String>,

    /// Prompt-under-test content.
    pub prompt_content: Option<String>,

    /// Prompt-under-test title.
    pub prompt_title: Option<String>,

    /// Whether to stream the response. Defaults to false when the field
    /// is absent; an explicit `false` behaves identically.
    pub stream: bool,
}

/// Parse and validate an inbound chat payload.
///
/// Fails with [`INVALID_MESSAGES`] before any provider is touched when
/// `messages` is missing or not an array. Entries with unknown roles or
/// non-string content are skipped.
pub fn parse_chat_params(value: &Value) -> std::result::Result<ChatParams, String> {
    let items = match value.get("messages") {
        Some(Value::Array(items)) => items,
        _ => return Err(INVALID_MESSAGES.to_string()),
    };

    let messages = items
        .iter()
        .filter_map(|m| {
            let role = m.get("role")?.as_str()?;
            let content = m.get("content")?.as_str()?;
            match role {
                "system" => Some(Message::system(content)),
                "user" => Some(Message::user(content)),
                "assistant" => Some(Message::assistant(content)),
                _ => None,
            }
        })
        .collect();

    let get_str = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.to_string())
    };

    Ok(ChatParams {
        messages,
        provider: get_str("provider"),
        model: get_str("model"),
        temperature: value
            .get("temperature")
            .and_then(Value::as_f64)
            .map(|t| t as f32),
        agent: get_str("agent"),
        prompt_content: get_str("promptContent"),
        prompt_title: get_str("promptTitle"),
        stream: value.get("stream").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// A request resolved down to concrete collaborators, ready to dispatch.
pub struct ResolvedChat {
    /// Provider adapter serving this request.
    pub provider: Arc<dyn Provider>,

    /// Agent strategy shaping this request.
    pub agent: Box<dyn Agent>,

    /// Concrete model identifier.
    pub model: String,

    /// Full conversation including the synthesized system prompt.
    pub messages: Vec<Message>,

    /// Per-call options.
    pub options: ChatOptions,
}

/// Resolve selectors to a provider, agent, model, and conversation.
pub fn resolve(state: &AppState, params: &ChatParams) -> Result<ResolvedChat> {
    let kind = state.factory.resolve(params.provider.as_deref());
    let provider = state.factory.create(kind);

    let agent = AgentKind::resolve(params.agent.as_deref()).create();

    let context = AgentContext {
        prompt_content: params.prompt_content.clone(),
        prompt_title: params.prompt_title.clone(),
        messages: params.messages.clone(),
        provider: params.provider.clone(),
        model: params.model.clone(),
        temperature: params.temperature,
    };

    if !agent.validate(&context) {
        return Err(GatewayError::InvalidRequest(format!(
            "Invalid context for agent '{}'",
            agent.kind().as_str()
        )));
    }

    let messages = agent.build_conversation(&context);

    let model = params
        .model
        .clone()
        .unwrap_or_else(|| provider.default_model().to_string());

    let options = ChatOptions {
        temperature: params.temperature,
        ..Default::default()
    };

    Ok(ResolvedChat {
        provider,
        agent,
        model,
        messages,
        options,
    })
}

/// Dispatch a resolved request synchronously and postprocess the result.
pub async fn run_chat(resolved: &ResolvedChat, client: &str) -> Result<ChatResponse> {
    info!(
        "Chat request: provider={} model={} client={}",
        resolved.provider.name(),
        resolved.model,
        client
    );

    let response = resolved
        .provider
        .chat(&resolved.model, &resolved.messages, resolved.options.clone())
        .await?;

    Ok(ChatResponse {
        message: resolved.agent.postprocess_response(response.message),
        ..response
    })
}
