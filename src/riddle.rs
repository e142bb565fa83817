//! The riddle endpoint: request schema, difficulty handling, prompt
//! construction, and the `POST /api/riddle` handler.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::model::GenerationRequest;
use crate::recover::recover;
use crate::AppState;

pub const IMAGE_DATA_PREFIX: &str = "data:image/";

/// Output-length cap for one riddle, in model tokens.
const MAX_OUTPUT_TOKENS: u32 = 300;

/// Difficulty tier. Controls clue count and how indirect the wording gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Easy,
    Medium,
    Hard,
}

impl Mode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Mode::Easy),
            "medium" => Some(Mode::Medium),
            "hard" => Some(Mode::Hard),
            _ => None,
        }
    }

    /// Invalid or missing values normalize to `Medium`.
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(Mode::Medium)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Easy => "easy",
            Mode::Medium => "medium",
            Mode::Hard => "hard",
        }
    }

    /// Hard riddles get a looser sampling temperature.
    pub fn temperature(self) -> f64 {
        if self == Mode::Hard {
            0.9
        } else {
            0.6
        }
    }

    fn guide(self) -> &'static str {
        match self {
            Mode::Easy => {
                "Make it easy: 2 short clues, no metaphors, clearly refer to the main subject."
            }
            Mode::Medium => "Make it medium: 2-3 clues, one mild metaphor allowed, still fair.",
            Mode::Hard => {
                "Make it hard: 3 clues, indirect wording, but solvable without obscure knowledge."
            }
        }
    }
}

/// Vision-analysis detail hint, forwarded to the model as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    Low,
    Auto,
    High,
}

impl Detail {
    /// Invalid or missing values normalize to `Auto`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("low") => Detail::Low,
            Some("high") => Detail::High,
            _ => Detail::Auto,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Detail::Low => "low",
            Detail::Auto => "auto",
            Detail::High => "high",
        }
    }
}

/// Inbound request body. Everything is optional at the schema level;
/// defaulting and normalization happen in the handler so a sloppy client
/// still gets a riddle rather than a 400 for the tunable fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiddleRequest {
    #[serde(default)]
    pub image_data_url: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub include_solution: Option<bool>,
}

/// Success payload. Two shapes: the full riddle, or one with the
/// solution-revealing fields structurally absent when the client asked to
/// keep the answer hidden. Absent, not empty: the UI treats a missing key
/// as "nothing to reveal".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RiddleResult {
    WithSolution {
        riddle: String,
        solution: String,
        focus: String,
        difficulty: Mode,
        answer: String,
    },
    WithoutSolution {
        riddle: String,
        focus: String,
        difficulty: Mode,
    },
}

/// The uniform success envelope: `ok` plus the riddle fields flattened in.
#[derive(Debug, Serialize)]
pub struct RiddleEnvelope {
    pub ok: bool,
    #[serde(flatten)]
    pub result: RiddleResult,
}

/// Builds the model instruction for one difficulty tier. Pure; nothing but
/// the tier affects the text.
pub fn build_prompt(mode: Mode) -> String {
    format!(
        r#"You are a visual riddle game generator.

Return STRICT JSON with these keys:
- "riddle": string (max 3 short lines)
- "solution": string (1 sentence explanation)
- "focus": string (what part of the image is targeted)
- "difficulty": "easy" | "medium" | "hard"
- "answer": string (1-5 words, the expected guess)

Rules:
- English only.
- Do NOT mention "image", "photo", "picture", or "uploaded".
- Do NOT reveal the answer inside the riddle.
- Avoid ultra-abstract poetry; make it playable.
- {}"#,
        mode.guide()
    )
}

pub async fn generate_riddle(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RiddleEnvelope>, ApiError> {
    let model = state
        .model
        .as_ref()
        .ok_or(ApiError::MissingConfig("OPENAI_API_KEY"))?;

    let request: RiddleRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON body.".to_string()))?;

    let mode = Mode::from_param(request.mode.as_deref());
    let detail = Detail::from_param(request.detail.as_deref());
    let include_solution = request.include_solution.unwrap_or(true);

    let image_data_url = match request.image_data_url {
        Some(url) if url.starts_with(IMAGE_DATA_PREFIX) => url,
        _ => {
            return Err(ApiError::BadRequest(
                "imageDataUrl must be a data:image/*;base64,... string".to_string(),
            ))
        }
    };

    info!(
        "Generating {} riddle ({} detail, solution: {})",
        mode.as_str(),
        detail.as_str(),
        include_solution
    );

    let generation = GenerationRequest {
        prompt: build_prompt(mode),
        image_data_url,
        detail,
        temperature: mode.temperature(),
        max_output_tokens: MAX_OUTPUT_TOKENS,
    };

    let raw = model.generate(&generation).await.map_err(|err| {
        warn!("Riddle generation failed: {err:#}");
        ApiError::Upstream(format!("{err:#}"))
    })?;

    let result = recover(&raw, mode, include_solution);
    Ok(Json(RiddleEnvelope { ok: true, result }))
}
