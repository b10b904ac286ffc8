//! Anthropic Claude provider implementation.
//!
//! Anthropic has no `system` role in its message array; leading system
//! messages from the internal list are extracted into the request's
//! top-level `system` field. All other roles map 1:1 in order.

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

/// Default Anthropic API base URL.
const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// Current API version.
const API_VERSION: &str = "2023-06-01";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Models surfaced through the config endpoint, with display names.
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    ("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet"),
    ("claude-3-5-haiku-20241022", "Claude 3.5 Haiku"),
    ("claude-3-opus-20240229", "Claude 3 Opus"),
    ("claude-3-haiku-20240307", "Claude 3 Haiku"),
];

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    /// HTTP client.
    client: Client,

    /// API key. Missing keys fail lazily at call time.
    api_key: Option<SecretString>,

    /// API base URL.
    api_base: String,

    /// Default model to use.
    default_model: String,
}

impl AnthropicProvider {
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
            default_model: settings
                .default_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn api_key(&self) -> Result<&SecretString> {
        self.api_key
            .as_ref()
            .ok_or_else(|| ProviderError::auth("ANTHROPIC_API_KEY is not configured"))
    }

    /// Split the internal message list into the top-level system field and
    /// the vendor message array.
    ///
    /// Non-system roles keep their relative order; when several system
    /// messages are present the last one wins, matching the single logical
    /// system message the agent layer synthesizes.
    fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system = None;
        let mut converted = Vec::new();

        for msg in messages {
            match msg.role {
                MessageRole::System => {
                    system = Some(msg.content.clone());
                }
                MessageRole::User => converted.push(AnthropicMessage {
                    role: "user".to_string(),
                    content: msg.content.clone(),
                }),
                MessageRole::Assistant => converted.push(AnthropicMessage {
                    role: "assistant".to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        (system, converted)
    }

    fn build_request(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
        stream: bool,
    ) -> AnthropicRequest {
        let (system, converted) = Self::convert_messages(messages);

        AnthropicRequest {
            model: model.to_string(),
            messages: converted,
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            stream,
        }
    }

    async fn send(&self, request: &AnthropicRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", self.api_key()?.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body: AnthropicError =
                response.json().await.unwrap_or_else(|_| AnthropicError {
                    error: AnthropicErrorDetail {
                        message: "Unknown error".to_string(),
                    },
                });
            let err = ProviderError::from_status(status.as_u16(), error_body.error.message);
            error!(
                "Anthropic request failed: model={} error={}",
                request.model, err
            );
            return Err(err);
        }

        Ok(response)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
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

        debug!("Sending request to Anthropic: model={}", model);

        let response: AnthropicResponse = self.send(&request).await?.json().await?;

        let message = response
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(ChatResponse {
            message,
            model: response.model,
            usage: Some(Usage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
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

        debug!("Starting Anthropic stream: model={}", model);

        let response = self.send(&request).await?;
        let event_stream = response.bytes_stream().eventsource();

        let stream = event_stream.filter_map(move |result| {
            let emit = match result {
                Ok(event) => {
                    if event.data.is_empty() {
                        None
                    } else {
                        match serde_json::from_str::<AnthropicStreamEvent>(&event.data) {
                            Ok(sse) => match sse {
                                AnthropicStreamEvent::MessageStart { message } => {
                                    Some(Ok(StreamEvent::Start {
                                        id: Some(message.id),
                                    }))
                                }
                                AnthropicStreamEvent::ContentBlockDelta { delta, .. } => {
                                    delta.text.map(|text| {
                                        Ok(StreamEvent::ContentDelta { delta: text })
                                    })
                                }
                                AnthropicStreamEvent::MessageDelta { usage } => {
                                    Some(Ok(StreamEvent::End {
                                        usage: Some(Usage {
                                            input_tokens: 0,
                                            output_tokens: usage.output_tokens,
                                        }),
                                    }))
                                }
                                AnthropicStreamEvent::Error { error } => {
                                    Some(Err(ProviderError::stream(error.message)))
                                }
                                _ => None,
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

// Internal types for the Anthropic API

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text { text: String },
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: usize,
    output_tokens: usize,
}

#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

// SSE types

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicStreamEvent {
    MessageStart {
        message: AnthropicStreamMessage,
    },
    ContentBlockStart {},
    ContentBlockDelta {
        delta: ContentDelta,
    },
    ContentBlockStop {},
    MessageDelta {
        usage: StreamUsage,
    },
    MessageStop,
    Ping,
    Error {
        error: AnthropicErrorDetail,
    },
}

#[derive(Deserialize)]
struct AnthropicStreamMessage {
    id: String,
}

#[derive(Deserialize)]
struct ContentDelta {
    text: Option<String>,
}

#[derive(Deserialize)]
struct StreamUsage {
    output_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_with_key() -> ProviderSettings {
        ProviderSettings {
            api_key: Some(SecretString::new("test-key".to_string())),
            api_base: None,
            organization: None,
            default_model: None,
        }
    }

    #[test]
    fn test_provider_creation() {
        let provider = AnthropicProvider::new(&settings_with_key());
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.default_model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_system_message_extracted() {
        let messages = vec![
            Message::system("You are a pirate."),
            Message::user("Hello"),
            Message::assistant("Ahoy"),
            Message::user("How are you?"),
        ];

        let (system, converted) = AnthropicProvider::convert_messages(&messages);

        assert_eq!(system.as_deref(), Some("You are a pirate."));
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "user");
        assert_eq!(converted[0].content, "Hello");
        assert_eq!(converted[1].role, "assistant");
        assert_eq!(converted[1].content, "Ahoy");
        assert_eq!(converted[2].role, "user");
        assert_eq!(converted[2].content, "How are you?");
    }

    #[test]
    fn test_no_system_message() {
        let messages = vec![Message::user("Hello")];
        let (system, converted) = AnthropicProvider::convert_messages(&messages);
        assert!(system.is_none());
        assert_eq!(converted.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_fails_lazily() {
        let provider = AnthropicProvider::new(&ProviderSettings {
            api_key: None,
            api_base: None,
            organization: None,
            default_model: None,
        });

        let result = provider
            .chat(DEFAULT_MODEL, &[Message::user("hi")], ChatOptions::default())
            .await;
        assert!(matches!(result, Err(ProviderError::Authentication(_))));
    }

    #[test]
    fn test_numeric_defaults() {
        let provider = AnthropicProvider::new(&settings_with_key());
        let request = provider.build_request(
            DEFAULT_MODEL,
            &[Message::user("hi")],
            &ChatOptions::default(),
            false,
        );
        assert_eq!(request.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(!request.stream);
    }

    #[tokio::test]
    async fn test_chat_sends_system_top_level_and_joins_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(serde_json::json!({
                "system": "You are a pirate.",
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": DEFAULT_MODEL,
                "content": [
                    {"type": "text", "text": "Ahoy, "},
                    {"type": "text", "text": "matey!"}
                ],
                "usage": {"input_tokens": 9, "output_tokens": 5}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&ProviderSettings {
            api_key: Some(SecretString::new("test-key".to_string())),
            api_base: Some(server.uri()),
            organization: None,
            default_model: None,
        });

        let response = provider
            .chat(
                DEFAULT_MODEL,
                &[Message::system("You are a pirate."), Message::user("Hello")],
                ChatOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.message, "Ahoy, matey!");
        assert_eq!(
            response.usage,
            Some(Usage {
                input_tokens: 9,
                output_tokens: 5
            })
        );
    }
}
