//! HTTP surface: the generate gateway and the studio API.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::constants::MAX_BODY_BYTES;
use crate::provider::ImageProvider;
use crate::studio::Studio;

mod api;
mod generate;
mod images;
mod prelude;

#[derive(Clone)]
pub(crate) struct AppState {
    studio: Arc<Studio>,
    provider: Arc<dyn ImageProvider>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("studio", &self.studio)
            .finish_non_exhaustive()
    }
}

impl AppState {
    fn new(studio: Arc<Studio>, provider: Arc<dyn ImageProvider>) -> Self {
        Self { studio, provider }
    }
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(generate::generate_handler))
        .route("/api/state", get(api::state_handler))
        .route(
            "/api/form",
            get(api::get_form_handler)
                .put(api::put_form_handler)
                .patch(api::patch_form_handler),
        )
        .route("/api/form/images", post(api::add_images_handler))
        .route(
            "/api/form/images/{id}",
            axum::routing::delete(api::remove_image_handler),
        )
        .route("/api/presets", get(api::presets_handler))
        .route("/api/steps", get(api::steps_handler))
        .route("/api/preview", get(api::preview_handler))
        .route(
            "/api/jobs",
            get(api::list_jobs_handler).post(api::enqueue_handler),
        )
        .route("/api/jobs/stats", get(api::stats_handler))
        .route(
            "/api/jobs/{id}",
            get(api::get_job_handler).delete(api::delete_job_handler),
        )
        .route(
            "/api/jobs/{id}/results/{step_id}/image",
            get(images::result_image_handler),
        )
        .route(
            "/api/jobs/{id}/results/{step_id}/prompt",
            get(images::result_prompt_handler),
        )
        .route("/api/export", get(api::export_handler))
        .route("/api/import", post(api::import_handler))
        .route("/api/reset", post(api::reset_handler))
        .route(
            "/api/settings/force-mock",
            get(api::get_force_mock_handler).put(api::set_force_mock_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Binds the listener and serves the studio until Ctrl-C.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    studio: Arc<Studio>,
    provider: Arc<dyn ImageProvider>,
) -> Result<(), anyhow::Error> {
    let app = create_router().with_state(AppState::new(studio, provider));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}
