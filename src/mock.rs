//! Offline placeholder images, used when the provider is unavailable.

use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::debug;

use crate::constants::{MOCK_CANVAS_SIZE, MOCK_DELAY_MS};
use crate::provider::GeneratedImage;

/// Renders placeholder images after a simulated delay.
#[derive(Clone, Debug)]
pub struct MockGenerator {
    delay_ms: RangeInclusive<u64>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self {
            delay_ms: MOCK_DELAY_MS,
        }
    }
}

impl MockGenerator {
    /// Generator with a custom delay range, in milliseconds.
    pub fn with_delay(delay_ms: RangeInclusive<u64>) -> Self {
        Self { delay_ms }
    }

    /// Generator that answers immediately.
    pub fn instant() -> Self {
        Self::with_delay(0..=0)
    }

    /// Waits for a random delay, then renders the placeholder for `label` and `seed`.
    pub async fn generate(&self, label: &str, seed: u32) -> GeneratedImage {
        let delay = if self.delay_ms.is_empty() || *self.delay_ms.end() == 0 {
            0
        } else {
            rand::random_range(self.delay_ms.clone())
        };
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        debug!("Rendered mock image for seed {seed} after {delay}ms");
        GeneratedImage {
            bytes: render_placeholder(label, seed).into_bytes(),
            mime_type: "image/svg+xml".to_string(),
            model_used: "mock".to_string(),
            safety: None,
        }
    }
}

/// Builds the placeholder SVG; the same label and seed always give the same document.
pub fn render_placeholder(label: &str, seed: u32) -> String {
    let size = MOCK_CANVAS_SIZE;
    let label: String = label.chars().take(50).collect();
    let label = html_escape::encode_text(&label);

    let mut grid = String::new();
    for offset in (0..=size).step_by(80) {
        grid.push_str(&format!(
            r#"    <line x1="{offset}" y1="0" x2="{offset}" y2="{size}" />
    <line x1="0" y1="{offset}" x2="{size}" y2="{offset}" />
"#
        ));
    }

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">
  <rect x="0" y="0" width="{size}" height="{size}" fill="#0b0f17" />
  <g stroke="#ffffff" stroke-opacity="0.18" stroke-width="1">
{grid}  </g>
  <rect x="80" y="120" width="1040" height="960" rx="40" fill="#ffffff" fill-opacity="0.06" />
  <g font-family="system-ui, -apple-system, Segoe UI, sans-serif">
    <text x="140" y="220" font-size="52" font-weight="700" fill="#ffffff" fill-opacity="0.92">VENDARI STUDIO — MOCK</text>
    <text x="140" y="290" font-size="34" font-weight="500" fill="#ffffff" fill-opacity="0.78">{label}</text>
    <text x="140" y="350" font-size="28" font-weight="500" fill="#ffffff" fill-opacity="0.65">seed: {seed}</text>
  </g>
  <rect x="140" y="420" width="920" height="560" rx="34" fill="#ffffff" fill-opacity="0.10" />
  <text x="240" y="720" font-family="system-ui, sans-serif" font-size="40" font-weight="600" fill="#ffffff" fill-opacity="0.55">(substituir pela imagem gerada)</text>
</svg>"##
    )
}
