//! Config handling

use std::env;
use std::sync::Arc;

use tracing::log::LevelFilter;

use crate::constants::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_IMAGE_MODEL};
use crate::provider::ProviderError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("sqlx", LevelFilter::Warn)
            .with_module_level("sea_orm", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Looks up a configuration value by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads from the process environment, treating blank values as unset.
pub fn process_env() -> EnvLookup {
    Arc::new(|name: &str| {
        env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Provider settings, resolved at call time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderSettings {
    /// API key sent in `x-goog-api-key`.
    pub api_key: String,
    /// Image model name, e.g. `imagen-3.0-generate-001`.
    pub model: String,
    /// API base URL without a trailing slash.
    pub api_base: String,
}

impl ProviderSettings {
    /// Resolves settings through `lookup`; the API key is mandatory.
    pub fn resolve(lookup: &EnvLookup) -> Result<Self, ProviderError> {
        let api_key = lookup("GEMINI_API_KEY")
            .ok_or_else(|| ProviderError::Config("missing env GEMINI_API_KEY".to_string()))?;
        let model =
            lookup("GEMINI_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_IMAGE_MODEL.to_string());
        let api_base = lookup("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string());
        Ok(Self {
            api_key,
            model,
            api_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> EnvLookup {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |name: &str| map.get(name).cloned())
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let err = ProviderSettings::resolve(&lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
        assert_eq!(
            err.to_string(),
            "GEMINI_CONFIG: missing env GEMINI_API_KEY"
        );
    }

    #[test]
    fn defaults_fill_model_and_base() {
        let settings = ProviderSettings::resolve(&lookup_from(&[("GEMINI_API_KEY", "k")]))
            .expect("settings");
        assert_eq!(settings.model, DEFAULT_GEMINI_IMAGE_MODEL);
        assert_eq!(settings.api_base, DEFAULT_GEMINI_API_BASE);
    }

    #[test]
    fn api_base_loses_trailing_slash() {
        let settings = ProviderSettings::resolve(&lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_API_BASE", "http://localhost:1234/v1beta/"),
            ("GEMINI_IMAGE_MODEL", "gemini-image"),
        ]))
        .expect("settings");
        assert_eq!(settings.api_base, "http://localhost:1234/v1beta");
        assert_eq!(settings.model, "gemini-image");
    }
}
