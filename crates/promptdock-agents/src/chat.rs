//! Prompt-under-test chat strategy.

use crate::{Agent, AgentContext, AgentKind, AgentMetadata};

/// Fallback system prompt when the caller supplied no prompt content.
const FALLBACK_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer the user's questions clearly and concisely.";

/// Runs the caller's prompt-under-test verbatim as the system prompt.
///
/// No message or response transformation is applied.
pub struct ChatAgent;

impl Agent for ChatAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Chat
    }

    fn metadata(&self) -> AgentMetadata {
        AgentMetadata {
            name: "chat",
            description: "Test a prompt by using it as the system prompt",
        }
    }

    fn system_prompt(&self, context: &AgentContext) -> String {
        context
            .prompt_content
            .as_deref()
            .filter(|content| !content.trim().is_empty())
            .unwrap_or(FALLBACK_SYSTEM_PROMPT)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_content_used_verbatim() {
        let context = AgentContext {
            prompt_content: Some("You are a grumpy code reviewer.".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ChatAgent.system_prompt(&context),
            "You are a grumpy code reviewer."
        );
    }

    #[test]
    fn test_fallback_when_absent_or_blank() {
        assert_eq!(
            ChatAgent.system_prompt(&AgentContext::default()),
            FALLBACK_SYSTEM_PROMPT
        );

        let blank = AgentContext {
            prompt_content: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(ChatAgent.system_prompt(&blank), FALLBACK_SYSTEM_PROMPT);
    }

    #[test]
    fn test_no_transformation_and_always_valid() {
        let context = AgentContext::default();
        assert!(ChatAgent.validate(&context));
        assert_eq!(
            ChatAgent.postprocess_response("unchanged".to_string()),
            "unchanged"
        );
    }
}
