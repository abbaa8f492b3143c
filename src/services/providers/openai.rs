//! OpenAI-compatible chat completions provider
//!
//! Implements both collaborator traits against `/chat/completions`:
//! explanations are a plain text completion, skin tone analysis sends the
//! photo as an `image_url` data URI and asks for a JSON object back.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Depth, SkinToneAnalysis, Undertone},
    services::providers::{ReasonContext, TextGenerator, VisionAnalyzer},
};

const PROVIDER_NAME: &str = "openai";
const EXPLANATION_MAX_TOKENS: u32 = 120;
const ANALYSIS_MAX_TOKENS: u32 = 200;

const ANALYSIS_PROMPT: &str = "Analyze the skin tone of the person in this photo. \
Respond with only a JSON object with the keys \"undertone\" (warm, cool or neutral), \
\"depth\" (light, medium or deep), \"gender\" and \"age\" (an estimated number).";

#[derive(Clone)]
pub struct OpenAiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Loosely typed analysis as returned by the model
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    undertone: String,
    #[serde(default)]
    depth: String,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    age: Option<Value>,
}

impl OpenAiProvider {
    /// Creates a provider whose HTTP client enforces `timeout` per request
    pub fn new(api_key: String, api_url: String, model: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn explanation_prompt(context: &ReasonContext) -> String {
        let category = if context.category.is_empty() {
            "item".to_string()
        } else {
            context.category.to_lowercase()
        };

        format!(
            "In one or two friendly sentences, explain to a shopper with a {} undertone and {} skin depth \
why this {} has a compatibility score of {} out of 100 for them. Do not mention the number.",
            context.undertone, context.depth, category, context.score
        )
    }

    async fn complete(&self, messages: Value, max_tokens: u32) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.api_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "max_tokens": max_tokens,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Generation API returned status {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response.json().await?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::ExternalApi("Generation API returned no content".to_string()))
    }
}

/// Pulls the first JSON object out of a completion that may be wrapped in
/// prose or a markdown code fence.
fn parse_analysis(content: &str) -> AppResult<SkinToneAnalysis> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(AppError::ExternalApi(format!(
                "Vision response is not JSON: {}",
                content
            )))
        }
    };

    let raw: RawAnalysis = serde_json::from_str(json).map_err(|e| {
        tracing::error!(error = %e, response = %content, "Failed to deserialize vision response");
        AppError::ExternalApi(format!("Failed to parse vision response: {}", e))
    })?;

    Ok(SkinToneAnalysis {
        undertone: Undertone::from_loose(&raw.undertone),
        depth: Depth::from_loose(&raw.depth),
        gender: raw.gender.filter(|g| !g.trim().is_empty()),
        age: raw.age.as_ref().and_then(parse_age),
    })
}

/// Accepts `28`, `"28"` or ranges like `"25-30"` (lower bound)
fn parse_age(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_f64().map(|age| age.round() as u32),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiProvider {
    async fn explain(&self, context: &ReasonContext) -> AppResult<String> {
        let messages = json!([
            {
                "role": "system",
                "content": "You are a fashion stylist who explains color choices briefly."
            },
            {
                "role": "user",
                "content": Self::explanation_prompt(context)
            }
        ]);

        let text = self.complete(messages, EXPLANATION_MAX_TOKENS).await?;

        tracing::debug!(
            score = context.score,
            provider = PROVIDER_NAME,
            "Explanation generated"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[async_trait::async_trait]
impl VisionAnalyzer for OpenAiProvider {
    async fn analyze_skin_tone(&self, image_base64: &str) -> AppResult<SkinToneAnalysis> {
        let messages = json!([
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": ANALYSIS_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:image/jpeg;base64,{}", image_base64) }
                    }
                ]
            }
        ]);

        let content = self.complete(messages, ANALYSIS_MAX_TOKENS).await?;
        let analysis = parse_analysis(&content)?;

        tracing::info!(
            undertone = %analysis.undertone,
            depth = %analysis.depth,
            provider = PROVIDER_NAME,
            "Skin tone analyzed"
        );

        Ok(analysis)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
