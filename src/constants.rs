//! Shared constants/setters for things
//!

use std::ops::RangeInclusive;
use std::sync::LazyLock;
use std::time::Duration;

/// Key the whole studio document is stored under.
pub const STORAGE_KEY: &str = "vendari_studio_next_mvp_v1";

/// Version tag written into exported documents.
pub const EXPORT_VERSION: &str = "vendari-studio-next-mvp-v1";

/// Longest prompt accepted at the generate boundary, in characters.
pub const MAX_PROMPT_CHARS: usize = 20_000;

/// Reference images forwarded to the provider per request.
pub const MAX_IMAGES: usize = 8;

/// Approximate decoded size limit per reference image.
pub const MAX_IMAGE_BYTES: usize = 6_000_000;

/// Product images accepted in a single add.
pub const MAX_IMAGES_PER_UPLOAD: usize = 8;

/// Product images kept on the form.
pub const MAX_FORM_IMAGES: usize = 12;

/// Request body limit for the JSON API, sized for a full set of base64 images.
pub const MAX_BODY_BYTES: usize = 96 * 1024 * 1024;

/// Hard limit on a single provider call.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Default Gemini endpoint base.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini image model.
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "imagen-3.0-generate-001";

/// MIME type assumed when nothing better is known.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Upper bound (exclusive) for generation seeds.
pub const SEED_RANGE: u32 = 1_000_000;

/// Artificial latency of the mock generator, in milliseconds.
pub const MOCK_DELAY_MS: RangeInclusive<u64> = 650..=1300;

/// Side of the square mock canvas, in pixels.
pub const MOCK_CANVAS_SIZE: u32 = 1200;

/// Results never change once written, so they can be cached for a long time.
pub const RESULT_CACHE_MAX_AGE_SECONDS: u64 = 60 * 60 * 24 * 30;

/// Cache-Control value for result image responses.
pub static RESULT_CACHE_CONTROL: LazyLock<String> = LazyLock::new(|| {
    format!(
        "private, max-age={}, immutable",
        RESULT_CACHE_MAX_AGE_SECONDS
    )
});
