//! Plain captioning endpoint: multipart upload in, one neutral sentence out.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::response::Json;
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::model::GenerationRequest;
use crate::riddle::Detail;
use crate::AppState;

const CAPTION_PROMPT: &str = "Write a neutral, factual image caption in one sentence. \
    Do not guess identity, age, or medical condition.";
const CAPTION_MAX_TOKENS: u32 = 300;

#[derive(Debug, Serialize)]
pub struct CaptionResponse {
    pub ok: bool,
    pub caption: String,
    pub model: String,
    pub processing_time_ms: u128,
}

pub async fn caption_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<CaptionResponse>, ApiError> {
    let model = state
        .model
        .as_ref()
        .ok_or(ApiError::MissingConfig("OPENAI_API_KEY"))?;

    let start = Instant::now();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read the upload: {e}")))?;

        let img = image::load_from_memory(&data)
            .map_err(|_| ApiError::BadRequest("Upload is not a decodable image.".to_string()))?;

        // Re-encode to JPEG so oversized or exotic formats become a
        // predictable inline payload.
        let mut jpeg_bytes = Vec::new();
        img.write_to(
            &mut Cursor::new(&mut jpeg_bytes),
            image::ImageOutputFormat::Jpeg(85),
        )
        .map_err(|e| ApiError::Upstream(format!("Could not re-encode the image: {e}")))?;

        let image_data_url = format!(
            "data:image/jpeg;base64,{}",
            general_purpose::STANDARD.encode(&jpeg_bytes)
        );

        let generation = GenerationRequest {
            prompt: CAPTION_PROMPT.to_string(),
            image_data_url,
            detail: Detail::Auto,
            temperature: 0.6,
            max_output_tokens: CAPTION_MAX_TOKENS,
        };

        let caption = model.generate(&generation).await.map_err(|err| {
            warn!("Captioning failed: {err:#}");
            ApiError::Upstream(format!("{err:#}"))
        })?;

        let elapsed = start.elapsed().as_millis();
        info!("Captioned upload in {elapsed} ms");

        return Ok(Json(CaptionResponse {
            ok: true,
            caption: caption.trim().to_string(),
            model: model.name().to_string(),
            processing_time_ms: elapsed,
        }));
    }

    Err(ApiError::BadRequest(
        "No image field in the form data.".to_string(),
    ))
}
