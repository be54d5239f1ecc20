use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::model::{CurrentConditions, ForecastSnapshot, Location};

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

const SYSTEM_INSTRUCTION: &str =
    "You are a helpful and witty weather assistant named SkyCast AI.";

const TEMPERATURE: f64 = 0.7;

/// Shown whenever the summary cannot be produced, for any reason.
pub const FALLBACK_INSIGHT: &str =
    "SkyCast AI is currently resting. Check back soon for insights!";

const EMPTY_RESPONSE_INSIGHT: &str = "Unable to generate insights at this time.";

/// Produces the short natural-language summary shown next to a
/// forecast. The surface is infallible: implementations absorb their
/// own errors and fall back to a static string, so a summary failure
/// can never disturb the forecast display.
#[async_trait]
pub trait InsightGenerator: Send + Sync + Debug {
    async fn summarize(&self, location: &Location, snapshot: &ForecastSnapshot) -> String;
}

/// Summary generation backed by the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiInsights {
    api_key: String,
    http: Client,
    url: String,
}

impl GeminiInsights {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, GEMINI_URL)
    }

    pub fn with_endpoint(api_key: String, url: impl Into<String>) -> Self {
        Self {
            api_key,
            http: Client::new(),
            url: url.into(),
        }
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let payload = GeminiRequest {
            contents: [GeminiContent {
                parts: [GeminiPart { text: prompt }],
            }],
            system_instruction: GeminiContent {
                parts: [GeminiPart {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let res = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to the insight provider")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read insight response body")?;

        if !status.is_success() {
            return Err(anyhow!("insight request failed with status {status}"));
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&body).context("Failed to parse insight JSON")?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow!("insight response contained no candidates"))?;

        if text.trim().is_empty() {
            Ok(EMPTY_RESPONSE_INSIGHT.to_string())
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl InsightGenerator for GeminiInsights {
    async fn summarize(&self, location: &Location, snapshot: &ForecastSnapshot) -> String {
        let prompt = build_prompt(location, &snapshot.current);
        match self.request(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("insight generation failed: {e:#}");
                FALLBACK_INSIGHT.to_string()
            }
        }
    }
}

/// Used when no API key is configured: every summary is the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInsights;

#[async_trait]
impl InsightGenerator for NoInsights {
    async fn summarize(&self, _location: &Location, _snapshot: &ForecastSnapshot) -> String {
        FALLBACK_INSIGHT.to_string()
    }
}

fn build_prompt(location: &Location, current: &CurrentConditions) -> String {
    format!(
        "Provide a concise, friendly weather summary for {}.\n\
         Current Temp: {}°\n\
         Condition: {}\n\
         Humidity: {}%\n\
         UV Index: {}\n\n\
         Suggest appropriate clothing and outdoor activities for today. Keep it under 60 words.",
        location.name,
        current.temperature,
        current.condition,
        current.humidity_pct,
        current.uv_index,
    )
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: [GeminiPart<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
    system_instruction: GeminiContent<'a>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}
