//! Model client adapter.
//!
//! Wraps the hosted vision-and-text model behind the [`VisionModel`] trait so
//! handlers (and tests) never talk to the wire format directly. The real
//! implementation calls the OpenAI Responses API with the prompt as an
//! `input_text` part and the inline image as an `input_image` part.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::riddle::Detail;

/// One prompt + inline image generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// `data:<mime>;base64,<payload>` — no external fetch needed.
    pub image_data_url: String,
    pub detail: Detail,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

/// A vision-capable text-generation backend. Returns the raw model text;
/// callers own any structure-recovery of that text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Human-readable model identifier, for response metadata.
    fn name(&self) -> &str;
}

pub struct OpenAiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl VisionModel for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [{
                "role": "user",
                "content": [
                    { "type": "input_text", "text": request.prompt },
                    {
                        "type": "input_image",
                        "image_url": request.image_data_url,
                        "detail": request.detail.as_str(),
                    }
                ]
            }],
            "temperature": request.temperature,
            "max_output_tokens": request.max_output_tokens,
        });

        debug!("Responses API request to {}/responses", self.api_base);

        let response = self
            .client
            .post(format!("{}/responses", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to call the model API")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("Model API error {}: {}", status, text);
            anyhow::bail!("Model API returned {}: {}", status, text);
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse the model API response")?;

        Ok(output_text(&payload))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Concatenates every `output_text` part of a Responses API payload.
/// An empty result is not an error here; downstream recovery handles it.
fn output_text(payload: &serde_json::Value) -> String {
    let mut out = String::new();
    for item in payload["output"].as_array().into_iter().flatten() {
        for part in item["content"].as_array().into_iter().flatten() {
            if part["type"] == "output_text" {
                if let Some(text) = part["text"].as_str() {
                    out.push_str(text);
                }
            }
        }
    }
    out
}
