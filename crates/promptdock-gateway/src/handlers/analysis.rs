//! Structured prompt analysis and generation endpoints.

use crate::error::GatewayError;
use crate::server::AppState;
use crate::Result;
use axum::extract::State;
use axum::Json;
use promptdock_providers::{AnalysisModel, AnalysisRequest, AnalysisReport, GeneratedPrompt};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// `POST /api/ai-analysis/analyze` — structured feedback on a prompt.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<AnalysisReport>> {
    let prompt_text = body
        .get("promptText")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::InvalidRequest("Prompt text is required".to_string()))?;

    let request = AnalysisRequest {
        prompt_text: prompt_text.to_string(),
        analysis_aspects: body
            .get("analysisAspects")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        include_alternatives: body
            .get("includeAlternatives")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    };

    let (analysis, model) = analysis_model(&state, &body);
    info!("Analysis request: model={}", model);

    let report = analysis.analyze(&model, &request).await?;
    Ok(Json(report))
}

/// `POST /api/ai-analysis/generate` — build a prompt from questionnaire
/// answers.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<GeneratedPrompt>> {
    let answers = body
        .get("answers")
        .filter(|v| !v.is_null())
        .ok_or_else(|| GatewayError::InvalidRequest("Answers are required".to_string()))?;

    // Accept either a prose string or a structured answer object.
    let answers = match answers {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let (analysis, model) = analysis_model(&state, &body);
    info!("Generate request: model={}", model);

    let generated = analysis.generate(&model, &answers).await?;
    Ok(Json(generated))
}

/// Resolve the optional provider/model selectors into a JSON-mode adapter.
fn analysis_model(state: &AppState, body: &Value) -> (AnalysisModel, String) {
    let provider = state
        .factory
        .create_by_name(body.get("provider").and_then(Value::as_str));

    let model = body
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| provider.default_model().to_string());

    (AnalysisModel::new(provider), model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_analyze_rejects_missing_prompt_text() {
        let state = Arc::new(AppState::for_tests());

        for body in [json!({}), json!({"promptText": ""}), json!({"promptText": "   "})] {
            let err = analyze(State(state.clone()), Json(body)).await.unwrap_err();
            assert!(matches!(err, GatewayError::InvalidRequest(_)));
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_answers() {
        let state = Arc::new(AppState::for_tests());
        let err = generate(State(state), Json(json!({}))).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }

    #[test]
    fn test_analysis_model_selectors() {
        let state = AppState::for_tests();

        let (_, model) = analysis_model(&state, &json!({"model": "gpt-4o-mini"}));
        assert_eq!(model, "gpt-4o-mini");

        // Default model comes from the resolved provider.
        let (_, model) = analysis_model(&state, &json!({"provider": "anthropic"}));
        assert_eq!(model, "claude-3-5-sonnet-20241022");
    }
}
