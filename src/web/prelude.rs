pub(crate) use crate::error::StudioError;
pub(crate) use crate::web::AppState;
pub(crate) use axum::Json;
pub(crate) use axum::body::Bytes;
pub(crate) use axum::extract::{Path, Query, State};
pub(crate) use axum::http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE};
pub(crate) use axum::response::{IntoResponse, Response};
pub(crate) use serde::Deserialize;
pub(crate) use serde_json::{Value, json};
pub(crate) use tracing::{debug, info};
