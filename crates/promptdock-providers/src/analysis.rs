//! Structured-output analysis variant.
//!
//! Same adapter machinery as free chat, constrained to a fixed JSON schema.
//! OpenAI gets `response_format: json_object`; Anthropic gets an explicit
//! JSON-only instruction and the reply is parsed manually. A reply that is
//! not valid JSON is a distinct failure from the vendor being unreachable.

use crate::{ChatOptions, Message, Provider, ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Request for a prompt analysis.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// The prompt text under analysis.
    pub prompt_text: String,

    /// Aspects to focus on (clarity, specificity, ...). Free-form.
    #[serde(default)]
    pub analysis_aspects: Vec<String>,

    /// When false, `alternatives` is stripped from every suggestion.
    #[serde(default = "default_true")]
    pub include_alternatives: bool,
}

fn default_true() -> bool {
    true
}

/// One improvement suggestion within a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub category: String,
    pub title: String,
    pub description: String,
    pub original_text: String,
    pub replacement_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
}

/// Structured feedback about a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub overall_score: f32,
    pub summary: String,
    pub suggestions: Vec<Suggestion>,
}

/// Result of generating a prompt from questionnaire answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPrompt {
    pub content: String,
    pub title: String,
    pub suggested_tags: Vec<String>,
}

const ANALYSIS_SCHEMA_INSTRUCTION: &str = r#"You are an expert prompt engineer reviewing a prompt. Respond with a single JSON object and nothing else, matching exactly this shape:
{
  "overallScore": <number 0-100>,
  "summary": "<one-paragraph assessment>",
  "suggestions": [
    {
      "category": "<aspect the suggestion addresses>",
      "title": "<short title>",
      "description": "<what to change and why>",
      "originalText": "<excerpt from the prompt>",
      "replacementText": "<proposed replacement>",
      "alternatives": ["<other phrasings>"]
    }
  ]
}"#;

const GENERATE_SCHEMA_INSTRUCTION: &str = r#"You are an expert prompt engineer. From the user's answers, write a complete prompt. Respond with a single JSON object and nothing else, matching exactly this shape:
{
  "content": "<the full prompt text>",
  "title": "<short descriptive title>",
  "suggestedTags": ["<tag>"]
}"#;

/// Provider adapter variant constrained to structured JSON responses.
pub struct AnalysisModel {
    provider: Arc<dyn Provider>,
}

impl AnalysisModel {
    /// Wrap a provider for structured-output calls.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Analyze a prompt, returning the structured report.
    pub async fn analyze(&self, model: &str, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let mut system = ANALYSIS_SCHEMA_INSTRUCTION.to_string();
        if !request.analysis_aspects.is_empty() {
            system.push_str("\nFocus on these aspects: ");
            system.push_str(&request.analysis_aspects.join(", "));
            system.push('.');
        }

        let messages = vec![
            Message::system(system),
            Message::user(format!("Analyze this prompt:\n\n{}", request.prompt_text)),
        ];

        debug!(
            "Analysis request: provider={} model={} aspects={:?}",
            self.provider.name(),
            model,
            request.analysis_aspects
        );

        let response = self
            .provider
            .chat(model, &messages, ChatOptions::default().json_mode())
            .await?;

        let mut report: AnalysisReport = parse_model_json(&response.message)?;

        // Response shaping only; never re-queries.
        if !request.include_alternatives {
            for suggestion in &mut report.suggestions {
                suggestion.alternatives = None;
            }
        }

        Ok(report)
    }

    /// Generate a prompt from questionnaire answers.
    pub async fn generate(&self, model: &str, answers: &str) -> Result<GeneratedPrompt> {
        let messages = vec![
            Message::system(GENERATE_SCHEMA_INSTRUCTION),
            Message::user(answers.to_string()),
        ];

        debug!(
            "Generate request: provider={} model={}",
            self.provider.name(),
            model
        );

        let response = self
            .provider
            .chat(model, &messages, ChatOptions::default().json_mode())
            .await?;

        parse_model_json(&response.message)
    }
}

/// Parse JSON out of a model reply, tolerating markdown code fences.
fn parse_model_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|_| ProviderError::InvalidJson)
}
