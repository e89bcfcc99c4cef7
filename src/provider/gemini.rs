//! Google Gemini `generateContent` adapter.

use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::{GenerateFuture, GeneratedImage, ImageProvider, ProviderError};
use crate::config::{EnvLookup, ProviderSettings, process_env};
use crate::constants::{DEFAULT_IMAGE_MIME, PROVIDER_TIMEOUT};
use crate::data_url;
use crate::validate::GeneratePayload;

/// Request body for `POST models/{model}:generateContent`
#[derive(Serialize, Debug)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline {
        inline_data: InlineDataOut<'a>,
    },
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineDataOut<'a> {
    data: &'a str,
    mime_type: &'a str,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    safety_ratings: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "inline_data")]
    inline_data: Option<InlineDataIn>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct InlineDataIn {
    #[serde(default)]
    data: String,
    #[serde(default, alias = "mime_type")]
    mime_type: Option<String>,
}

/// Calls Gemini with the prompt and reference images as inline attachments.
#[derive(Clone)]
pub struct GeminiProvider {
    http: reqwest::Client,
    lookup: EnvLookup,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider").finish_non_exhaustive()
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiProvider {
    /// Provider reading `GEMINI_*` from the process environment on every call.
    pub fn new() -> Self {
        Self::with_lookup(process_env())
    }

    /// Provider resolving its settings through `lookup`.
    pub fn with_lookup(lookup: EnvLookup) -> Self {
        Self {
            http: reqwest::Client::new(),
            lookup,
        }
    }

    fn endpoint(settings: &ProviderSettings) -> Result<Url, ProviderError> {
        let model = settings.model.trim();
        let model = model.strip_prefix("models/").unwrap_or(model);
        let base = Url::parse(&format!("{}/", settings.api_base))
            .map_err(|err| ProviderError::Request(format!("invalid GEMINI_API_BASE: {err}")))?;
        base.join(&format!("models/{model}:generateContent"))
            .map_err(|err| ProviderError::Request(format!("invalid model name: {err}")))
    }

    fn build_request(payload: &GeneratePayload) -> GenerateContentRequest<'_> {
        let mut parts = Vec::with_capacity(payload.images.len() + 1);
        parts.push(RequestPart::Text {
            text: &payload.prompt,
        });
        for image in &payload.images {
            parts.push(RequestPart::Inline {
                inline_data: InlineDataOut {
                    data: data_url::strip_prefix(image),
                    mime_type: data_url::mime_type(image).unwrap_or(DEFAULT_IMAGE_MIME),
                },
            });
        }
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        }
    }

    async fn call(&self, payload: &GeneratePayload) -> Result<GeneratedImage, ProviderError> {
        let settings = ProviderSettings::resolve(&self.lookup)?;
        let endpoint = Self::endpoint(&settings)?;
        let body = Self::build_request(payload);
        debug!(
            "Calling {} with {} reference image(s)",
            settings.model,
            payload.images.len()
        );

        let resp = self
            .http
            .post(endpoint)
            .header("x-goog-api-key", &settings.api_key)
            .timeout(PROVIDER_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(ProviderError::classify(format!(
                "Gemini API error {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|err| ProviderError::Request(format!("Failed to parse Gemini response: {err}")))?;
        let image = extract_image(parsed, &settings.model)?;
        info!(
            "Gemini returned {} bytes of {}",
            image.bytes.len(),
            image.mime_type
        );
        Ok(image)
    }
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        return ProviderError::Request(format!(
            "Gemini request timed out after {}s",
            PROVIDER_TIMEOUT.as_secs()
        ));
    }
    ProviderError::classify(err.without_url().to_string())
}

fn extract_image(
    response: GenerateContentResponse,
    model: &str,
) -> Result<GeneratedImage, ProviderError> {
    let GenerateContentResponse {
        candidates,
        prompt_feedback,
    } = response;
    let candidate = candidates.into_iter().next().unwrap_or_default();
    let safety = prompt_feedback.or(candidate.safety_ratings);
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let Some(inline) = parts
        .iter()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty())
    else {
        let explanation = parts
            .iter()
            .find_map(|part| part.text.clone().filter(|text| !text.is_empty()))
            .unwrap_or_else(|| "model did not return image data".to_string());
        return Err(ProviderError::NoImageReturned(explanation));
    };

    let bytes = general_purpose::STANDARD
        .decode(inline.data.trim())
        .map_err(|err| ProviderError::Request(format!("Failed to base64-decode image: {err}")))?;
    let mime_type = inline
        .mime_type
        .clone()
        .filter(|mime| !mime.is_empty())
        .or_else(|| {
            image::guess_format(&bytes)
                .ok()
                .map(|format| format.to_mime_type().to_string())
        })
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());

    Ok(GeneratedImage {
        bytes,
        mime_type,
        model_used: model.to_string(),
        safety,
    })
}

impl ImageProvider for GeminiProvider {
    fn generate<'a>(&'a self, payload: &'a GeneratePayload) -> GenerateFuture<'a> {
        Box::pin(self.call(payload))
    }
}
