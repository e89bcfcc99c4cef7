//! Downloads of finished results: the decoded image and the prompt text.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::header::{
    CACHE_CONTROL, CONTENT_DISPOSITION, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use axum::http::response::Builder;
use httpdate::{fmt_http_date, parse_http_date};

use super::prelude::*;
use crate::constants::{DEFAULT_IMAGE_MIME, RESULT_CACHE_CONTROL};
use crate::data_url;
use crate::model::GenerationResult;

/// Cache headers derived from a stored result.
#[derive(Clone, Debug)]
pub(crate) struct ResultCacheHeaders {
    etag: Option<HeaderValue>,
    last_modified: Option<HeaderValue>,
    modified_at: SystemTime,
}

impl ResultCacheHeaders {
    /// Results are immutable, so job, step and seed identify the bytes.
    pub(crate) fn from_result(job_id: &str, result: &GenerationResult) -> Self {
        let millis = u64::try_from(result.created_at).unwrap_or_default();
        let modified_at = UNIX_EPOCH + Duration::from_millis(millis);
        let etag = HeaderValue::from_str(&format!(
            "\"{}-{}-{}\"",
            job_id, result.step_id, result.seed
        ))
        .ok();
        let last_modified = HeaderValue::from_str(&fmt_http_date(modified_at)).ok();
        Self {
            etag,
            last_modified,
            modified_at,
        }
    }

    /// Returns the ETag header value, if available.
    pub(crate) fn etag(&self) -> Option<&HeaderValue> {
        self.etag.as_ref()
    }

    /// Returns the Last-Modified header value, if available.
    pub(crate) fn last_modified(&self) -> Option<&HeaderValue> {
        self.last_modified.as_ref()
    }
}

/// Applies result cache headers to a response builder.
pub(crate) fn apply_cache_headers(mut builder: Builder, cache: &ResultCacheHeaders) -> Builder {
    builder = builder.header(CACHE_CONTROL, RESULT_CACHE_CONTROL.as_str());
    if let Some(etag) = cache.etag() {
        builder = builder.header(ETAG, etag.clone());
    }
    if let Some(last_modified) = cache.last_modified() {
        builder = builder.header(LAST_MODIFIED, last_modified.clone());
    }
    builder
}

/// Returns true when the request matches a not-modified response.
pub(crate) fn is_not_modified(headers: &HeaderMap, cache: &ResultCacheHeaders) -> bool {
    if let Some(if_none_match) = headers.get(IF_NONE_MATCH) {
        if let Ok(value) = if_none_match.to_str() {
            let value = value.trim();
            if value == "*" {
                return true;
            }
            if let Some(etag) = cache.etag().and_then(|value| value.to_str().ok())
                && value
                    .split(',')
                    .any(|candidate| candidate.trim().trim_start_matches("W/") == etag)
            {
                return true;
            }
        }
        return false;
    }

    // HTTP dates have second precision.
    let modified_secs = cache
        .modified_at
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    if let Some(if_modified_since) = headers.get(IF_MODIFIED_SINCE)
        && let Ok(value) = if_modified_since.to_str()
        && let Ok(since) = parse_http_date(value)
        && let Ok(since) = since.duration_since(UNIX_EPOCH)
        && modified_secs <= since.as_secs()
    {
        return true;
    }

    false
}

/// Builds a 304 response that preserves cache headers.
pub(crate) fn not_modified_response(cache: &ResultCacheHeaders) -> Result<Response, StudioError> {
    let builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    let builder = apply_cache_headers(builder, cache);
    builder.body(Body::empty()).map_err(StudioError::from)
}

async fn find_result(
    state: &AppState,
    job_id: &str,
    step_id: &str,
) -> Result<GenerationResult, StudioError> {
    let job = state.studio.job(job_id).await?;
    job.results
        .into_iter()
        .find(|result| result.step_id == step_id)
        .ok_or_else(|| StudioError::NotFound(format!("result {step_id} of job {job_id}")))
}

/// File extension for a MIME type, for download names.
fn extension(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}

pub(crate) async fn result_image_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((job_id, step_id)): Path<(String, String)>,
) -> Result<Response, StudioError> {
    let result = find_result(&state, &job_id, &step_id).await?;
    let cache_headers = ResultCacheHeaders::from_result(&job_id, &result);
    if is_not_modified(&headers, &cache_headers) {
        return not_modified_response(&cache_headers);
    }

    let (mime_type, bytes) = data_url::decode(&result.image_data_url).map_err(|err| {
        StudioError::InternalServerError(format!("stored image is not valid base64: {err}"))
    })?;
    let mime_type = mime_type.unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
    let filename = format!(
        "{}_{}.{}",
        result.module.code(),
        result.seed,
        extension(&mime_type)
    );

    let builder = Response::builder()
        .header(CONTENT_TYPE, mime_type)
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        );
    apply_cache_headers(builder, &cache_headers)
        .body(Body::from(bytes))
        .map_err(StudioError::from)
}

pub(crate) async fn result_prompt_handler(
    State(state): State<AppState>,
    Path((job_id, step_id)): Path<(String, String)>,
) -> Result<Response, StudioError> {
    let result = find_result(&state, &job_id, &step_id).await?;
    let filename = format!("prompt_{}_{}.txt", result.module.code(), result.seed);
    Response::builder()
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(result.prompt))
        .map_err(StudioError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Module;

    fn result() -> GenerationResult {
        GenerationResult {
            step_id: "s1_0".into(),
            module: Module::CoverAd,
            prompt: "prompt".into(),
            seed: 42,
            created_at: 1_700_000_000_123,
            image_data_url: "data:image/png;base64,AAAA".into(),
        }
    }

    #[test]
    fn etag_and_last_modified_come_from_the_result() {
        let cache = ResultCacheHeaders::from_result("job_1", &result());
        assert_eq!(
            cache.etag().and_then(|v| v.to_str().ok()),
            Some("\"job_1-s1_0-42\"")
        );
        assert_eq!(
            cache.last_modified().and_then(|v| v.to_str().ok()),
            Some("Tue, 14 Nov 2023 22:13:20 GMT")
        );
    }

    #[test]
    fn conditional_requests() {
        let cache = ResultCacheHeaders::from_result("job_1", &result());

        let mut headers = HeaderMap::new();
        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"job_1-s1_0-42\""));
        assert!(is_not_modified(&headers, &cache));

        let mut headers = HeaderMap::new();
        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"other\""));
        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_static("Tue, 14 Nov 2023 22:13:20 GMT"),
        );
        assert!(!is_not_modified(&headers, &cache));

        let mut headers = HeaderMap::new();
        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_static("Tue, 14 Nov 2023 22:13:20 GMT"),
        );
        assert!(is_not_modified(&headers, &cache));

        let mut headers = HeaderMap::new();
        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_static("Mon, 13 Nov 2023 00:00:00 GMT"),
        );
        assert!(!is_not_modified(&headers, &cache));
    }

    #[test]
    fn extensions() {
        assert_eq!(extension("image/svg+xml"), "svg");
        assert_eq!(extension("image/jpeg"), "jpg");
        assert_eq!(extension("application/octet-stream"), "png");
    }
}
