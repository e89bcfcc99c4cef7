//! JSON endpoints over the studio: form, presets, jobs, export/import, settings.

use axum::http::header::CONTENT_DISPOSITION;
use serde::de::DeserializeOwned;

use super::prelude::*;
use crate::model::{FormState, Job, JobStats, PersistedState, ProductImage};
use crate::presets::{self, Preset};
use crate::studio::NewProductImage;

/// Parses a JSON body, reporting failures in the API's error shape.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, StudioError> {
    serde_json::from_slice(body).map_err(|err| StudioError::BadRequest(format!("invalid body: {err}")))
}

pub(crate) async fn state_handler(State(state): State<AppState>) -> Json<PersistedState> {
    Json(state.studio.snapshot().await)
}

pub(crate) async fn get_form_handler(State(state): State<AppState>) -> Json<FormState> {
    Json(state.studio.form().await)
}

pub(crate) async fn put_form_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FormState>, StudioError> {
    let form = parse_body(&body)?;
    Ok(Json(state.studio.set_form(form).await?))
}

pub(crate) async fn patch_form_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FormState>, StudioError> {
    let patch = parse_body(&body)?;
    Ok(Json(state.studio.patch_form(patch).await?))
}

pub(crate) async fn add_images_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<ProductImage>>, StudioError> {
    let images: Vec<NewProductImage> = parse_body(&body)?;
    Ok(Json(state.studio.add_images(images).await?))
}

pub(crate) async fn remove_image_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProductImage>>, StudioError> {
    Ok(Json(state.studio.remove_image(&id).await?))
}

pub(crate) async fn presets_handler(State(state): State<AppState>) -> Json<Vec<Preset>> {
    Json(presets::all(&state.studio.form().await))
}

pub(crate) async fn steps_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.studio.derived_steps().await)
}

pub(crate) async fn preview_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "prompt": state.studio.preview_prompt().await }))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobsQuery {
    #[serde(default)]
    q: Option<String>,
}

pub(crate) async fn list_jobs_handler(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Json<Vec<Job>> {
    Json(state.studio.jobs(query.q.as_deref()).await)
}

pub(crate) async fn enqueue_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Job>), StudioError> {
    let job = state.studio.enqueue().await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub(crate) async fn get_job_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, StudioError> {
    Ok(Json(state.studio.job(&id).await?))
}

pub(crate) async fn delete_job_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StudioError> {
    state.studio.delete_job(&id).await?;
    Ok(Json(json!({ "ok": true })))
}

pub(crate) async fn stats_handler(State(state): State<AppState>) -> Json<JobStats> {
    Json(state.studio.stats().await)
}

pub(crate) async fn export_handler(State(state): State<AppState>) -> Response {
    let document = state.studio.export().await;
    let filename = format!("vendari-studio-{}.json", document.exported_at);
    (
        [(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )],
        Json(document),
    )
        .into_response()
}

pub(crate) async fn import_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PersistedState>, StudioError> {
    let document: Value = serde_json::from_slice(&body)
        .map_err(|_| StudioError::BadRequest("invalid import: not JSON".to_string()))?;
    Ok(Json(state.studio.import(document).await?))
}

pub(crate) async fn reset_handler(
    State(state): State<AppState>,
) -> Result<Json<PersistedState>, StudioError> {
    Ok(Json(state.studio.reset().await?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForceMockBody {
    enabled: bool,
}

pub(crate) async fn get_force_mock_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "forceMock": state.studio.force_mock() }))
}

pub(crate) async fn set_force_mock_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, StudioError> {
    let ForceMockBody { enabled } = parse_body(&body)?;
    state.studio.set_force_mock(enabled);
    Ok(Json(json!({ "forceMock": enabled })))
}
