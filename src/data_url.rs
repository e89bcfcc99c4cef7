//! Helpers for `data:<mime>;base64,<payload>` strings.

use base64::Engine;
use base64::engine::general_purpose;

const BASE64_MARKER: &str = "base64,";

/// Everything after the first `base64,`, or the input when there is no marker.
pub fn strip_prefix(value: &str) -> &str {
    match value.find(BASE64_MARKER) {
        Some(idx) => &value[idx + BASE64_MARKER.len()..],
        None => value,
    }
}

/// MIME type declared by a data URL prefix, if any.
pub fn mime_type(value: &str) -> Option<&str> {
    let (mime, _) = value.strip_prefix("data:")?.split_once(";base64,")?;
    (!mime.is_empty() && !mime.contains(';')).then_some(mime)
}

/// Decoded size estimate used for limits: `ceil(len * 3 / 4)`, padding included.
pub fn approx_decoded_len(b64: &str) -> usize {
    (b64.len() * 3).div_ceil(4)
}

/// Builds a data URL from raw bytes.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime_type};base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Decodes a data URL (or bare base64) into its MIME type and bytes.
pub fn decode(value: &str) -> Result<(Option<String>, Vec<u8>), base64::DecodeError> {
    let bytes = general_purpose::STANDARD.decode(strip_prefix(value).trim())?;
    Ok((mime_type(value).map(str::to_string), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_when_present() {
        assert_eq!(strip_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_prefix("AAAA"), "AAAA");
    }

    #[test]
    fn sniffs_mime_from_prefix() {
        assert_eq!(mime_type("data:image/webp;base64,AAAA"), Some("image/webp"));
        assert_eq!(mime_type("AAAA"), None);
        assert_eq!(mime_type("data:;base64,AAAA"), None);
        assert_eq!(mime_type("data:image/png;charset=x;base64,AA"), None);
        assert_eq!(mime_type("data:image/png,AAAA"), None);
    }

    #[test]
    fn size_estimate_rounds_up() {
        assert_eq!(approx_decoded_len(""), 0);
        assert_eq!(approx_decoded_len("AAAA"), 3);
        assert_eq!(approx_decoded_len("AAAAA"), 4);
        assert_eq!(approx_decoded_len(&"A".repeat(8_000_000)), 6_000_000);
    }

    #[test]
    fn encode_then_decode_keeps_mime_and_bytes() {
        let url = encode("image/svg+xml", b"<svg/>");
        let (mime, bytes) = decode(&url).expect("decode");
        assert_eq!(mime.as_deref(), Some("image/svg+xml"));
        assert_eq!(bytes, b"<svg/>");
    }
}
