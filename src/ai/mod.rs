use async_trait::async_trait;
use serde_json::json;

use crate::config::AiConfig;
use crate::error::AppError;
use crate::models::ai::{GenerateSuggestionsRequest, SuggestedItem};

/// Text-generation upstream. Implementations return the raw model text;
/// parsing into suggestions happens in [`parse_suggestions`] so stubs and
/// the real engine share the same decode path.
#[async_trait]
pub trait SuggestionEngine: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AppError>;
}

/// Google Gemini `generateContent` client.
pub struct GeminiEngine {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiEngine {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SuggestionEngine for GeminiEngine {
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("AI request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Internal(format!("AI response read failed: {e}")))?;

        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "AI upstream returned status {status}"
            )));
        }

        let envelope: serde_json::Value =
            serde_json::from_str(&text).map_err(|_| AppError::UpstreamFormat { raw: text.clone() })?;

        envelope["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_owned)
            .ok_or(AppError::UpstreamFormat { raw: text })
    }
}

/// Build the instruction prompt sent to the text-generation upstream.
pub fn build_prompt(req: &GenerateSuggestionsRequest) -> String {
    format!(
        "You are an expert project-budgeting assistant. Given the project \
         description and estimated total value below, list the main service \
         and/or product line items that would compose this budget.\n\
         For each item include: name, description, quantity, unit_price, \
         estimated_time_hours (0 if not applicable), product_service_id (a \
         placeholder UUID) and total_item_price (quantity * unit_price).\n\
         Output a JSON array of objects, with no text before or after. The \
         sum of the generated items should approximate the estimated total.\n\n\
         Project description: \"{}\"\n\
         Service type: \"{}\"\n\
         Estimated total value: {}\n",
        req.project_description, req.service_type, req.estimated_total_value
    )
}

/// Decode the model's raw text into candidate line items.
///
/// Models often wrap JSON in Markdown code fences; those are stripped first.
/// Anything that still fails to parse surfaces as `UpstreamFormat` with the
/// raw payload preserved.
pub fn parse_suggestions(raw: &str) -> Result<Vec<SuggestedItem>, AppError> {
    let body = strip_code_fence(raw.trim());
    serde_json::from_str(body).map_err(|_| AppError::UpstreamFormat {
        raw: raw.to_string(),
    })
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop the language tag (e.g. "json") up to the first newline.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").map_or(rest, str::trim_end)
}
