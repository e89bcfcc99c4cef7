//! Image provider port.

pub mod gemini;

use std::future::Future;
use std::pin::Pin;

use base64::Engine;
use base64::engine::general_purpose;
use serde_json::Value;

use crate::data_url;
use crate::validate::GeneratePayload;

pub use gemini::GeminiProvider;

/// Why a provider call failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderError {
    /// Required configuration is missing
    Config(String),
    /// The provider is pushing back
    RateLimited,
    /// The provider answered without an image; carries its text, if any
    NoImageReturned(String),
    /// Anything else: network, timeout, HTTP status, malformed response
    Request(String),
}

impl ProviderError {
    /// Maps a failure message to [`ProviderError::RateLimited`] when it mentions
    /// `429` or `rate`, otherwise keeps it as an unclassified failure.
    pub fn classify(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("429") || lower.contains("rate") {
            Self::RateLimited
        } else {
            Self::Request(message)
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "GEMINI_CONFIG: {message}"),
            Self::RateLimited => write!(f, "RATE_LIMIT: Gemini rate limited"),
            Self::NoImageReturned(message) => write!(f, "GEMINI_NO_IMAGE: {message}"),
            Self::Request(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// An image produced by a provider or the mock.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: String,
    /// Model that produced it.
    pub model_used: String,
    /// Safety feedback reported alongside the image.
    pub safety: Option<Value>,
}

impl GeneratedImage {
    /// The bytes as standard base64.
    pub fn base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    /// The image as a self-describing data URL.
    pub fn to_data_url(&self) -> String {
        data_url::encode(&self.mime_type, &self.bytes)
    }
}

/// Boxed future type returned by [`ImageProvider::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeneratedImage, ProviderError>> + Send + 'a>>;

/// Generates one image from a validated payload.
pub trait ImageProvider: Send + Sync {
    /// Generate an image for `payload`.
    fn generate<'a>(&'a self, payload: &'a GeneratePayload) -> GenerateFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_are_detected_case_insensitively() {
        assert_eq!(
            ProviderError::classify("Gemini API error 429 Too Many Requests".into()),
            ProviderError::RateLimited
        );
        assert_eq!(
            ProviderError::classify("Quota exceeded: RATE exceeded".into()),
            ProviderError::RateLimited
        );
        assert_eq!(
            ProviderError::classify("connection refused".into()),
            ProviderError::Request("connection refused".into())
        );
    }

    #[test]
    fn data_url_keeps_mime() {
        let image = GeneratedImage {
            bytes: vec![1, 2, 3],
            mime_type: "image/jpeg".into(),
            model_used: "m".into(),
            safety: None,
        };
        assert_eq!(image.base64(), "AQID");
        assert_eq!(image.to_data_url(), "data:image/jpeg;base64,AQID");
    }
}
