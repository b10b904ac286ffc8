//! LLM provider adapters for PromptDock.
//!
//! This crate normalizes two vendor chat APIs (OpenAI, Anthropic) into one
//! internal shape: a [`Provider`] trait with a synchronous `chat` call and
//! an incremental streaming path, a [`ModelFactory`] that resolves a
//! provider by name with a safe fallback, and an [`AnalysisModel`] variant
//! constrained to structured JSON output.
//!
//! # Example
//!
//! ```rust,ignore
//! use promptdock_providers::{ModelFactory, Message, ChatOptions};
//!
//! let factory = ModelFactory::new(settings);
//! let provider = factory.create_by_name(Some("anthropic"));
//! let response = provider
//!     .chat("claude-3-haiku-20240307", &[Message::user("Hello!")], ChatOptions::default())
//!     .await?;
//! println!("{}", response.message);
//! ```

mod error;
mod types;

pub mod analysis;
pub mod anthropic;
pub mod factory;
pub mod openai;

pub use analysis::{AnalysisModel, AnalysisReport, AnalysisRequest, GeneratedPrompt, Suggestion};
pub use anthropic::AnthropicProvider;
pub use error::{ProviderError, Result};
pub use factory::{ModelFactory, ProviderKind};
pub use openai::OpenAiProvider;
pub use types::*;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// Stream of completion events for streaming responses.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Structured callback set for [`Provider::stream_chat`].
///
/// Callbacks fire in vendor order; no fragment is buffered beyond the one
/// being delivered.
#[derive(Default)]
pub struct StreamCallbacks {
    /// Invoked once when the vendor opens the response.
    pub on_response_start: Option<Box<dyn FnMut() + Send>>,

    /// Invoked for every incremental content fragment.
    pub on_response_chunk: Option<Box<dyn FnMut(&str) + Send>>,

    /// Invoked once with the fully concatenated text.
    pub on_response_end: Option<Box<dyn FnMut(&str) + Send>>,
}

impl StreamCallbacks {
    /// Set the response-start callback.
    pub fn on_start(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_response_start = Some(Box::new(f));
        self
    }

    /// Set the per-fragment callback.
    pub fn on_chunk(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_response_chunk = Some(Box::new(f));
        self
    }

    /// Set the response-end callback.
    pub fn on_end(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_response_end = Some(Box::new(f));
        self
    }
}

/// A model provider that can generate completions.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get provider name.
    fn name(&self) -> &str;

    /// Default model identifier for this vendor.
    fn default_model(&self) -> &str;

    /// Generate a chat completion.
    ///
    /// Vendor errors propagate unchanged; the caller decides how to surface
    /// them.
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: ChatOptions,
    ) -> Result<ChatResponse>;

    /// Generate a streaming chat completion as an event stream.
    async fn chat_stream(
        &self,
        model: &str,
        messages: &[Message],
        options: ChatOptions,
    ) -> Result<CompletionStream>;

    /// Generate a streaming chat completion, delivering fragments through
    /// `callbacks` and resolving with the fully concatenated text.
    ///
    /// The final [`ChatResponse::message`] equals the exact concatenation of
    /// the fragments handed to `on_response_chunk`.
    async fn stream_chat(
        &self,
        model: &str,
        messages: &[Message],
        options: ChatOptions,
        mut callbacks: StreamCallbacks,
    ) -> Result<ChatResponse> {
        let mut stream = self.chat_stream(model, messages, options).await?;

        let mut full = String::new();
        let mut usage = None;
        let mut started = false;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Start { .. } => {
                    if !started {
                        started = true;
                        if let Some(f) = callbacks.on_response_start.as_mut() {
                            f();
                        }
                    }
                }
                StreamEvent::ContentDelta { delta } => {
                    if !started {
                        // Some vendors emit content without an explicit
                        // start event.
                        started = true;
                        if let Some(f) = callbacks.on_response_start.as_mut() {
                            f();
                        }
                    }
                    if let Some(f) = callbacks.on_response_chunk.as_mut() {
                        f(&delta);
                    }
                    full.push_str(&delta);
                }
                StreamEvent::End { usage: u } => {
                    usage = u;
                }
            }
        }

        if let Some(f) = callbacks.on_response_end.as_mut() {
            f(&full);
        }

        Ok(ChatResponse {
            message: full,
            model: model.to_string(),
            usage,
        })
    }
}
