//! OpenAI GPT provider implementation.
//!
//! OpenAI's wire format already supports a `system` role inline, so the
//! internal message list passes through unchanged.

use crate::{
    ChatOptions, ChatResponse, CompletionStream, Message, MessageRole, Provider, ProviderError,
    Result, StreamEvent, Usage, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use promptdock_core::ProviderSettings;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Default OpenAI API base URL.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Models surfaced through the config endpoint, with display names.
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    ("gpt-4o", "GPT-4o"),
    ("gpt-4o-mini", "GPT-4o mini"),
    ("gpt-4-turbo", "GPT-4 Turbo"),
    ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
];

/// OpenAI GPT provider.
pub struct OpenAiProvider {
    /// HTTP client.
    client: Client,

    /// API key. Missing keys fail lazily at call time.
    api_key: Option<SecretString>,

    /// API base URL.
    api_base: String,

    /// Organization ID (optional).
    organization: Option<String>,

    /// Default model to use.
    default_model: String,
}

impl OpenAiProvider {
    /// Create a provider from settings.
    ///
    /// An absent API key is not an error here; calls fail with an
    /// authentication error instead.
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key.clone(),
            api_base: settings
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            organization: settings.organization.clone(),
            default_model: settings
                .default_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn api_key(&self) -> Result<&SecretString> {
        self.api_key
            .as_ref()
            .ok_or_else(|| ProviderError::auth("OPENAI_API_KEY is not configured"))
    }

    /// Convert messages to OpenAI format (1:1, system role inline).
    fn convert_messages(&self, messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|msg| OpenAiMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            })
            .collect()
    }

    fn build_request(&self, model: &str, messages: &[Message], options: &ChatOptions, stream: bool) -> OpenAiRequest {
        OpenAiRequest {
            model: model.to_string(),
            messages: self.convert_messages(messages),
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            response_format: options.json_mode.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
            stream,
        }
    }

    async fn send(&self, request: &OpenAiRequest) -> Result<reqwest::Response> {
        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key()?.expose_secret()),
            )
            .json(request);

        if let Some(org) = &self.organization {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body: OpenAiError = response.json().await.unwrap_or_else(|_| OpenAiError {
                error: OpenAiErrorDetail {
                    message: "Unknown error".to_string(),
                },
            });
            let err = ProviderError::from_status(status.as_u16(), error_body.error.message);
            error!("OpenAI request failed: model={} error={}", request.model, err);
            return Err(err);
        }

        Ok(response)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: ChatOptions,
    ) -> Result<ChatResponse> {
        let request = self.build_request(model, messages, &options, false);

        debug!("Sending request to OpenAI: model={}", model);

        let response: OpenAiResponse = self.send(&request).await?.json().await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::stream("No choices in response"))?;

        Ok(ChatResponse {
            message: choice.message.content,
            model: response.model,
            usage: response.usage.map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }

    async fn chat_stream(
        &self,
        model: &str,
        messages: &[Message],
        options: ChatOptions,
    ) -> Result<CompletionStream> {
        let request = self.build_request(model, messages, &options, true);

        debug!("Starting OpenAI stream: model={}", model);

        let response = self.send(&request).await?;
        let event_stream = response.bytes_stream().eventsource();

        let stream = event_stream.filter_map(move |result| {
            let emit = match result {
                Ok(event) => {
                    if event.data.is_empty() || event.data == "[DONE]" {
                        None
                    } else {
                        match serde_json::from_str::<OpenAiStreamChunk>(&event.data) {
                            Ok(chunk) => match chunk.choices.into_iter().next() {
                                Some(choice) => {
                                    if let Some(delta) = choice.delta.content {
                                        Some(Ok(StreamEvent::ContentDelta { delta }))
                                    } else if choice.finish_reason.is_some() {
                                        Some(Ok(StreamEvent::End { usage: None }))
                                    } else {
                                        None
                                    }
                                }
                                None => None,
                            },
                            Err(e) => {
                                warn!("Failed to parse SSE event: {}", e);
                                None
                            }
                        }
                    }
                }
                Err(e) => Some(Err(ProviderError::stream(e.to_string()))),
            };
            async move { emit }
        });

        Ok(Box::pin(stream))
    }
}

// Internal types for the OpenAI API

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// Streaming types

#[derive(Deserialize)]
struct OpenAiStreamChunk {
    choices: Vec<OpenAiStreamChoice>,
}

#[derive(Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiStreamDelta {
    content: Option<String>,
}
