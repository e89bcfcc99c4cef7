//! Validation of inbound generate requests.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{MAX_IMAGE_BYTES, MAX_IMAGES, MAX_PROMPT_CHARS};
use crate::data_url;
use crate::error::StudioError;

/// A request that passed validation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratePayload {
    /// Trimmed prompt.
    pub prompt: String,
    /// Reference images: data URLs or bare base64.
    pub images: Vec<String>,
    /// Passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<Value>,
    /// Passed through untouched, `{}` when absent.
    pub selectors: Value,
}

fn invalid(reason: &str) -> StudioError {
    StudioError::InvalidPayload(reason.to_string())
}

/// Checks `input` and returns a normalized payload.
///
/// Non-string images are dropped and the list is cut to [`MAX_IMAGES`] before
/// sizes are checked; one oversized image fails the whole request.
pub fn validate_payload(input: &Value) -> Result<GeneratePayload, StudioError> {
    let Some(object) = input.as_object() else {
        return Err(invalid("body must be JSON object"));
    };

    let prompt = match object.get("prompt") {
        Some(Value::String(prompt)) if !prompt.trim().is_empty() => prompt,
        _ => return Err(invalid("prompt is required")),
    };
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(invalid("prompt too large"));
    }

    let images: Vec<String> = match object.get("images") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .take(MAX_IMAGES)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    for image in &images {
        if data_url::approx_decoded_len(data_url::strip_prefix(image)) > MAX_IMAGE_BYTES {
            return Err(invalid("image too large"));
        }
    }

    Ok(GeneratePayload {
        prompt: prompt.trim().to_string(),
        images,
        module: object.get("module").filter(|v| !v.is_null()).cloned(),
        selectors: object
            .get("selectors")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
    })
}
