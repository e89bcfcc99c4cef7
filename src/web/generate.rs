//! `POST /api/generate`: validate a request and forward it to the image provider.

use super::prelude::*;
use crate::validate::validate_payload;

pub(crate) async fn generate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, StudioError> {
    let input: Value = serde_json::from_slice(&body)
        .map_err(|_| StudioError::InvalidPayload("body must be JSON object".to_string()))?;
    let payload = validate_payload(&input)?;
    debug!(
        "Generating image, prompt {} chars, {} image(s)",
        payload.prompt.chars().count(),
        payload.images.len()
    );

    let image = state.provider.generate(&payload).await?;
    info!("Generated {} via {}", image.mime_type, image.model_used);

    let mut response = json!({
        "ok": true,
        "imageBase64": image.base64(),
        "mimeType": image.mime_type,
        "modelUsed": image.model_used,
    });
    if let Some(safety) = image.safety {
        response["safety"] = safety;
    }
    Ok(Json(response))
}
