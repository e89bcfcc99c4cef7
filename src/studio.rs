//! The studio state container and its job runner.
//!
//! [`Studio`] owns the form and job list, persists every transition through an
//! injected [`StateStore`], and runs queued jobs one at a time. Each step tries
//! the provider and falls back to the mock generator, so provider failures
//! never fail a job; only errors outside that fallback (persistence) do.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::constants::{EXPORT_VERSION, MAX_FORM_IMAGES, MAX_IMAGES_PER_UPLOAD, SEED_RANGE};
use crate::db::store::{self, StateStore};
use crate::error::StudioError;
use crate::mock::MockGenerator;
use crate::model::{
    FormState, GenerationResult, GenerationStep, Job, JobStats, JobStatus, PersistedState,
    ProductImage, new_id, now_millis,
};
use crate::presets;
use crate::prompt::build_prompt;
use crate::provider::{GeneratedImage, ImageProvider};
use crate::validate::validate_payload;

/// Exported document: the persisted state plus a little metadata.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Export time, ms since the epoch.
    pub exported_at: i64,
    /// Format tag.
    pub version: &'static str,
    /// The form.
    pub form: FormState,
    /// The jobs.
    pub jobs: Vec<Job>,
}

/// A product image as uploaded, before it gets an id.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductImage {
    /// File name.
    pub name: String,
    /// `data:<mime>;base64,...`
    pub data_url: String,
}

/// Explicit state container shared by the HTTP layer and the runner.
pub struct Studio {
    state: RwLock<PersistedState>,
    store: Arc<dyn StateStore>,
    provider: Arc<dyn ImageProvider>,
    mock: MockGenerator,
    force_mock: AtomicBool,
    running: AtomicBool,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("force_mock", &self.force_mock)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Loads the saved state and builds the container.
    ///
    /// Jobs left `running` by a previous process can never finish, so they are
    /// moved to `error`. Call [`Studio::kick`] afterwards to resume the queue.
    pub async fn open(
        store: Arc<dyn StateStore>,
        provider: Arc<dyn ImageProvider>,
        mock: MockGenerator,
    ) -> Result<Arc<Self>, StudioError> {
        let mut state = store::load(store.as_ref()).await?;
        let interrupted = interrupt_running(&mut state);
        if interrupted > 0 {
            warn!("Marked {interrupted} interrupted job(s) as failed");
            store::save(store.as_ref(), &state).await?;
        }
        info!(
            "Loaded studio state with {} job(s), {} queued",
            state.jobs.len(),
            state.stats().queued
        );

        Ok(Arc::new(Self {
            state: RwLock::new(state),
            store,
            provider,
            mock,
            force_mock: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }))
    }

    /// Whether steps skip the provider and go straight to the mock.
    pub fn force_mock(&self) -> bool {
        self.force_mock.load(Ordering::Relaxed)
    }

    /// Sets the force-mock flag.
    pub fn set_force_mock(&self, value: bool) {
        info!("Force mock set to {value}");
        self.force_mock.store(value, Ordering::Relaxed);
    }

    /// Whether a runner pass is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// A copy of the whole state.
    pub async fn snapshot(&self) -> PersistedState {
        self.state.read().await.clone()
    }

    /// A copy of the form.
    pub async fn form(&self) -> FormState {
        self.state.read().await.form.clone()
    }

    /// Replaces the form.
    pub async fn set_form(&self, mut form: FormState) -> Result<FormState, StudioError> {
        check_form_images(&mut form)?;
        let mut state = self.state.write().await;
        state.form = form;
        store::save(self.store.as_ref(), &state).await?;
        Ok(state.form.clone())
    }

    /// Merges the top-level keys of `patch` into the form.
    pub async fn patch_form(&self, patch: Value) -> Result<FormState, StudioError> {
        let Value::Object(patch) = patch else {
            return Err(StudioError::BadRequest(
                "form patch must be a JSON object".into(),
            ));
        };
        let mut state = self.state.write().await;
        let mut merged = serde_json::to_value(&state.form)?;
        if let Value::Object(fields) = &mut merged {
            fields.extend(patch);
        }
        let mut form: FormState = serde_json::from_value(merged)
            .map_err(|err| StudioError::BadRequest(format!("invalid form: {err}")))?;
        check_form_images(&mut form)?;
        state.form = form;
        store::save(self.store.as_ref(), &state).await?;
        Ok(state.form.clone())
    }

    /// Attaches product images: at most a handful per call, and the form keeps
    /// only the first few overall.
    pub async fn add_images(
        &self,
        images: Vec<NewProductImage>,
    ) -> Result<Vec<ProductImage>, StudioError> {
        if let Some(bad) = images.iter().find(|img| !img.data_url.starts_with("data:")) {
            return Err(StudioError::BadRequest(format!(
                "image {} is not a data URL",
                bad.name
            )));
        }
        let mut state = self.state.write().await;
        let added = images
            .into_iter()
            .take(MAX_IMAGES_PER_UPLOAD)
            .map(|img| ProductImage {
                id: new_id("img"),
                name: img.name,
                data_url: img.data_url,
            });
        state.form.product_images.extend(added);
        state.form.product_images.truncate(MAX_FORM_IMAGES);
        store::save(self.store.as_ref(), &state).await?;
        Ok(state.form.product_images.clone())
    }

    /// Detaches a product image.
    pub async fn remove_image(&self, id: &str) -> Result<Vec<ProductImage>, StudioError> {
        let mut state = self.state.write().await;
        let before = state.form.product_images.len();
        state.form.product_images.retain(|img| img.id != id);
        if state.form.product_images.len() == before {
            return Err(StudioError::NotFound(format!("image {id}")));
        }
        store::save(self.store.as_ref(), &state).await?;
        Ok(state.form.product_images.clone())
    }

    /// Steps the current form would enqueue.
    pub async fn derived_steps(&self) -> Vec<GenerationStep> {
        presets::derived_steps(&self.state.read().await.form)
    }

    /// Prompt of the first derived step, for preview.
    pub async fn preview_prompt(&self) -> String {
        let state = self.state.read().await;
        presets::derived_steps(&state.form)
            .first()
            .map(|step| build_prompt(step, &state.form))
            .unwrap_or_default()
    }

    /// Snapshots the derived steps into a new queued job and wakes the runner.
    pub async fn enqueue(self: &Arc<Self>) -> Result<Job, StudioError> {
        let job = {
            let mut state = self.state.write().await;
            let category = if state.form.category.is_empty() {
                "Produto"
            } else {
                state.form.category.as_str()
            };
            let name = format!("{} • {}", category, presets::label(&state.form));
            let steps = presets::derived_steps(&state.form)
                .into_iter()
                .enumerate()
                .map(|(idx, step)| GenerationStep {
                    id: format!("{}_{}", step.id, idx),
                    step: step.step,
                })
                .collect();
            let job = Job {
                id: new_id("job"),
                created_at: now_millis(),
                name,
                status: JobStatus::Queued,
                steps,
                results: Vec::new(),
                error: None,
            };
            state.jobs.insert(0, job.clone());
            info!("Queued job {} ({} step(s))", job.id, job.steps.len());
            store::save(self.store.as_ref(), &state).await?;
            job
        };
        self.kick();
        Ok(job)
    }

    /// Jobs matching `query` (all jobs when blank), newest first.
    pub async fn jobs(&self, query: Option<&str>) -> Vec<Job> {
        let state = self.state.read().await;
        state
            .jobs
            .iter()
            .filter(|job| query.is_none_or(|q| job.matches(q)))
            .cloned()
            .collect()
    }

    /// One job.
    pub async fn job(&self, id: &str) -> Result<Job, StudioError> {
        self.state
            .read()
            .await
            .job(id)
            .cloned()
            .ok_or_else(|| StudioError::NotFound(format!("job {id}")))
    }

    /// Deletes a job; a running job keeps running but its outcome is dropped.
    pub async fn delete_job(&self, id: &str) -> Result<(), StudioError> {
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state.jobs.retain(|job| job.id != id);
        if state.jobs.len() == before {
            return Err(StudioError::NotFound(format!("job {id}")));
        }
        info!("Deleted job {id}");
        store::save(self.store.as_ref(), &state).await
    }

    /// Job counters.
    pub async fn stats(&self) -> JobStats {
        self.state.read().await.stats()
    }

    /// The exportable document.
    pub async fn export(&self) -> ExportDocument {
        let state = self.state.read().await;
        ExportDocument {
            exported_at: now_millis(),
            version: EXPORT_VERSION,
            form: state.form.clone(),
            jobs: state.jobs.clone(),
        }
    }

    /// Replaces the whole state with an exported document.
    ///
    /// Both `form` and `jobs` must be present; other keys are ignored.
    pub async fn import(
        self: &Arc<Self>,
        mut document: Value,
    ) -> Result<PersistedState, StudioError> {
        let form = document.get_mut("form").map(Value::take);
        let jobs = document.get_mut("jobs").map(Value::take);
        let (Some(form), Some(jobs)) = (form, jobs) else {
            return Err(StudioError::BadRequest(
                "invalid import: form and jobs are required".into(),
            ));
        };
        let invalid = |err: serde_json::Error| StudioError::BadRequest(format!("invalid import: {err}"));
        let mut imported = PersistedState {
            form: serde_json::from_value(form).map_err(invalid)?,
            jobs: serde_json::from_value(jobs).map_err(invalid)?,
        };
        // No runner owns a job that was running when the document was exported.
        let interrupted = interrupt_running(&mut imported);
        if interrupted > 0 {
            warn!("Imported {interrupted} running job(s) as failed");
        }
        {
            let mut state = self.state.write().await;
            *state = imported.clone();
            info!("Imported state with {} job(s)", state.jobs.len());
            store::save(self.store.as_ref(), &state).await?;
        }
        self.kick();
        Ok(imported)
    }

    /// Back to the default form and no jobs.
    pub async fn reset(&self) -> Result<PersistedState, StudioError> {
        let mut state = self.state.write().await;
        *state = PersistedState::default();
        info!("Studio reset");
        store::save(self.store.as_ref(), &state).await?;
        Ok(state.clone())
    }

    /// Starts a runner pass unless one is already in flight.
    pub fn kick(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::AcqRel) {
            debug!("Runner already active");
            return;
        }
        let studio = Arc::clone(self);
        tokio::spawn(async move { studio.drain_queue().await });
    }

    /// Runs queued jobs until none is left; the caller holds the latch.
    async fn drain_queue(self: Arc<Self>) {
        loop {
            while let Some(job_id) = self.next_queued().await {
                self.run_job(&job_id).await;
            }
            self.running.store(false, Ordering::Release);
            // Something may have been queued after the last check but before
            // the latch was released.
            if self.next_queued().await.is_none() || self.running.swap(true, Ordering::AcqRel) {
                break;
            }
        }
        debug!("Runner idle");
    }

    async fn next_queued(&self) -> Option<String> {
        self.state
            .read()
            .await
            .next_queued()
            .map(|job| job.id.clone())
    }

    async fn run_job(&self, job_id: &str) {
        if let Err(err) = self.execute(job_id).await {
            error!("Job {job_id} failed: {err}");
            self.fail_job(job_id, err.to_string()).await;
        }
    }

    async fn execute(&self, job_id: &str) -> Result<(), StudioError> {
        let (steps, form) = {
            let mut state = self.state.write().await;
            let Some(job) = state.job_mut(job_id) else {
                return Ok(());
            };
            job.advance(JobStatus::Running)?;
            job.error = None;
            let steps = job.steps.clone();
            let form = state.form.clone();
            store::save(self.store.as_ref(), &state).await?;
            (steps, form)
        };
        info!("Running job {job_id} ({} step(s))", steps.len());

        let images: Vec<String> = form
            .product_images
            .iter()
            .map(|img| img.data_url.clone())
            .collect();
        let mut results = Vec::with_capacity(steps.len());
        for step in &steps {
            let prompt = build_prompt(step, &form);
            let seed = rand::random_range(0..SEED_RANGE);
            let image = self.render_step(&prompt, &images, seed).await;
            debug!(
                "Step {} of job {job_id} rendered by {}",
                step.id, image.model_used
            );
            results.push(GenerationResult {
                step_id: step.id.clone(),
                module: step.module(),
                prompt,
                seed,
                created_at: now_millis(),
                image_data_url: image.to_data_url(),
            });
        }

        let mut state = self.state.write().await;
        let Some(job) = state
            .job_mut(job_id)
            .filter(|job| job.status == JobStatus::Running)
        else {
            warn!("Job {job_id} was deleted or replaced while running, dropping its results");
            return Ok(());
        };
        let unfinished = job.clone();
        job.advance(JobStatus::Done)?;
        job.results = results;
        if let Err(err) = store::save(self.store.as_ref(), &state).await {
            // Only a persisted `done` counts; fail_job takes it from here.
            if let Some(job) = state.job_mut(job_id) {
                *job = unfinished;
            }
            return Err(err);
        }
        info!("Job {job_id} done");
        Ok(())
    }

    /// Provider first, mock on any failure or when forced.
    async fn render_step(&self, prompt: &str, images: &[String], seed: u32) -> GeneratedImage {
        if self.force_mock() {
            debug!("Force mock on, skipping provider");
        } else {
            match self.generate_remote(prompt, images).await {
                Ok(image) => return image,
                Err(err) => warn!("Provider failed, using mock image: {err}"),
            }
        }
        let label = prompt.lines().next().unwrap_or("Vendari");
        self.mock.generate(label, seed).await
    }

    async fn generate_remote(
        &self,
        prompt: &str,
        images: &[String],
    ) -> Result<GeneratedImage, StudioError> {
        let payload = validate_payload(&json!({ "prompt": prompt, "images": images }))?;
        Ok(self.provider.generate(&payload).await?)
    }

    async fn fail_job(&self, job_id: &str, message: String) {
        let mut state = self.state.write().await;
        let Some(job) = state.job_mut(job_id) else {
            return;
        };
        if job.advance(JobStatus::Error).is_err() {
            return;
        }
        job.results.clear();
        job.error = Some(message);
        if let Err(err) = store::save(self.store.as_ref(), &state).await {
            error!("Could not persist failure of job {job_id}: {err}");
        }
    }
}

/// Moves jobs left `running` without a runner to `error`; returns how many.
fn interrupt_running(state: &mut PersistedState) -> usize {
    let mut interrupted = 0;
    for job in state
        .jobs
        .iter_mut()
        .filter(|job| job.status == JobStatus::Running)
    {
        if job.advance(JobStatus::Error).is_ok() {
            job.results.clear();
            job.error =
                Some("interrupted: the studio stopped while this job was running".into());
            interrupted += 1;
        }
    }
    interrupted
}

/// Same rules as [`Studio::add_images`] for forms written wholesale.
fn check_form_images(form: &mut FormState) -> Result<(), StudioError> {
    if let Some(bad) = form
        .product_images
        .iter()
        .find(|img| !img.data_url.starts_with("data:"))
    {
        return Err(StudioError::BadRequest(format!(
            "image {} is not a data URL",
            bad.name
        )));
    }
    form.product_images.truncate(MAX_FORM_IMAGES);
    Ok(())
}
