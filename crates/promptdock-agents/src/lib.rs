//! Agent strategies for PromptDock.
//!
//! An agent decides *what* system prompt and message shaping to apply
//! before a request reaches a provider, independent of which vendor will
//! serve it. Two strategies ship today: [`ChatAgent`] runs the caller's
//! prompt-under-test as the system prompt, and [`DesignAgent`] applies a
//! fixed prompt-design-assistant persona.

mod chat;
mod context;
mod design;

pub use chat::ChatAgent;
pub use context::AgentContext;
pub use design::DesignAgent;

use promptdock_providers::Message;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Descriptive metadata about an agent strategy.
#[derive(Debug, Clone, Serialize)]
pub struct AgentMetadata {
    /// Canonical key for the strategy.
    pub name: &'static str,

    /// One-line description for UI display.
    pub description: &'static str,
}

/// A strategy for system-prompt construction and message/response shaping.
pub trait Agent: Send + Sync {
    /// The strategy's kind tag.
    fn kind(&self) -> AgentKind;

    /// Descriptive metadata.
    fn metadata(&self) -> AgentMetadata;

    /// Build the system prompt for this request.
    fn system_prompt(&self, context: &AgentContext) -> String;

    /// Transform the caller-supplied message history before dispatch.
    fn preprocess_messages(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
    }

    /// Transform the provider's response text before it is returned.
    fn postprocess_response(&self, response: String) -> String {
        response
    }

    /// Whether the context is acceptable for this strategy.
    fn validate(&self, _context: &AgentContext) -> bool {
        true
    }

    /// Assemble the full conversation: the synthesized system prompt at
    /// position 0, followed by the preprocessed history.
    ///
    /// Exactly one system message is synthesized per request; system
    /// messages already present in the history pass through untouched for
    /// vendor-specific extraction downstream.
    fn build_conversation(&self, context: &AgentContext) -> Vec<Message> {
        let mut messages = self.preprocess_messages(context.messages.clone());
        messages.insert(0, Message::system(self.system_prompt(context)));
        messages
    }
}

/// The supported agent strategy set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Run the prompt under test as the system prompt.
    Chat,
    /// Fixed prompt-design-assistant persona.
    Design,
}

impl AgentKind {
    /// All supported kinds.
    pub const ALL: &'static [AgentKind] = &[AgentKind::Chat, AgentKind::Design];

    /// Parse an agent key, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chat" => Some(Self::Chat),
            "design" => Some(Self::Design),
            _ => None,
        }
    }

    /// Resolve a request's agent selector.
    ///
    /// `None` and unrecognized keys both resolve to [`AgentKind::Chat`];
    /// the latter logs a warning. Never an error.
    pub fn resolve(name: Option<&str>) -> Self {
        match name {
            None => Self::Chat,
            Some(name) => Self::parse(name).unwrap_or_else(|| {
                warn!("Unknown agent type '{}', falling back to chat", name);
                Self::Chat
            }),
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Design => "design",
        }
    }

    /// Instantiate the strategy.
    pub fn create(&self) -> Box<dyn Agent> {
        match self {
            Self::Chat => Box::new(ChatAgent),
            Self::Design => Box::new(DesignAgent),
        }
    }
}
