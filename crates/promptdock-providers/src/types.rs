//! Common types for model providers.

use serde::{Deserialize, Serialize};

/// Default sampling temperature applied when a request carries none.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default output token limit applied when a request carries none.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Message role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions).
    System,
    /// User message.
    User,
    /// Assistant message.
    Assistant,
}

impl MessageRole {
    /// Check if this is a system message.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Check if this is a user message.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User)
    }

    /// Check if this is an assistant message.
    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant)
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: MessageRole,

    /// Message content.
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Chat completion options.
///
/// Absent fields fall back to vendor defaults inside each adapter:
/// [`DEFAULT_TEMPERATURE`] and [`DEFAULT_MAX_TOKENS`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Temperature for sampling (0.0 to 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Ask the vendor for a JSON object response where the API supports it
    /// (OpenAI `response_format`). Vendors without the feature ignore this;
    /// the analysis layer adds an explicit instruction instead.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub json_mode: bool,
}

impl ChatOptions {
    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set the output token limit.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Request a JSON object response.
    pub fn json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Input/prompt tokens.
    pub input_tokens: usize,

    /// Output/completion tokens.
    pub output_tokens: usize,
}

impl Usage {
    /// Get total tokens used.
    pub fn total_tokens(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// Chat completion response.
///
/// Both the synchronous and the streaming paths resolve with this shape, so
/// relay-level bookkeeping always sees the complete text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The complete assistant message.
    pub message: String,

    /// Model that produced the response.
    pub model: String,

    /// Token usage, when the vendor reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Streaming event yielded by a provider's completion stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Stream started.
    Start {
        /// Vendor response ID, when reported.
        id: Option<String>,
    },

    /// Text delta, in vendor order.
    ContentDelta { delta: String },

    /// Stream completed.
    End {
        /// Token usage, when the vendor reports it.
        usage: Option<Usage>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let sys = Message::system("You are a helpful assistant.");
        assert!(sys.role.is_system());
        assert_eq!(sys.content, "You are a helpful assistant.");

        let user = Message::user("Hello!");
        assert!(user.role.is_user());

        let assistant = Message::assistant("Hi there!");
        assert!(assistant.role.is_assistant());
    }

    #[test]
    fn test_chat_options() {
        let opts = ChatOptions::default().temperature(0.2).max_tokens(1000);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(1000));
        assert!(!opts.json_mode);

        let opts = ChatOptions::default().json_mode();
        assert!(opts.json_mode);
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");

        let role: MessageRole = serde_json::from_str("\"system\"").unwrap();
        assert!(role.is_system());
    }

    #[test]
    fn test_usage() {
        let usage = Usage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total_tokens(), 150);
    }
}
