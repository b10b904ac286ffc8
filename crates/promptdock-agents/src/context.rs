//! Per-request agent context.

use promptdock_providers::Message;

/// Everything an agent needs to shape one request.
///
/// Built fresh per request and owned by that request's processing
/// lifetime; never shared across requests.
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    /// Content of the prompt under test, when the caller supplied one.
    pub prompt_content: Option<String>,

    /// Title of the prompt under test.
    pub prompt_title: Option<String>,

    /// Caller-supplied conversation history.
    pub messages: Vec<Message>,

    /// Provider selector from the request, for logging/metadata.
    pub provider: Option<String>,

    /// Model selector from the request.
    pub model: Option<String>,

    /// Sampling temperature from the request.
    pub temperature: Option<f32>,
}
