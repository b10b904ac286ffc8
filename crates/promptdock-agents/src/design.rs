//! Prompt-design-assistant strategy.

use crate::{Agent, AgentContext, AgentKind, AgentMetadata};

/// Fixed persona for the design assistant.
const DESIGN_PERSONA: &str = "You are an expert prompt design assistant. You help users write, \
refine, and structure prompts for large language models. Give concrete, actionable advice: \
point at specific wording, suggest replacements, and explain the effect of each change.";

/// Guidance appended when the caller supplied no prompt to discuss.
const GENERIC_GUIDANCE: &str = "The user has not shared a prompt yet. Help them articulate what \
they want the prompt to achieve, then draft one together.";

/// Applies a fixed prompt-design-assistant persona, augmented with the
/// caller's prompt as reference context when present.
pub struct DesignAgent;

impl Agent for DesignAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Design
    }

    fn metadata(&self) -> AgentMetadata {
        AgentMetadata {
            name: "design",
            description: "Get help designing and refining prompts",
        }
    }

    fn system_prompt(&self, context: &AgentContext) -> String {
        let mut prompt = DESIGN_PERSONA.to_string();

        match context.prompt_content.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(content) => {
                prompt.push_str("\n\nThe user is working on the following prompt");
                if let Some(title) = context.prompt_title.as_deref().filter(|t| !t.trim().is_empty())
                {
                    prompt.push_str(&format!(" (\"{}\")", title));
                }
                prompt.push_str(":\n\n");
                prompt.push_str(content);
            }
            None => {
                prompt.push_str("\n\n");
                prompt.push_str(GENERIC_GUIDANCE);
            }
        }

        prompt
    }
}
