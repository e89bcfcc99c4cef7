use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use serde_json::json;
use vendari_studio::db::store::SqliteStore;
use vendari_studio::mock::MockGenerator;
use vendari_studio::model::{JobStatus, Module};
use vendari_studio::provider::{
    GenerateFuture, GeneratedImage, ImageProvider, ProviderError,
};
use vendari_studio::studio::Studio;
use vendari_studio::validate::GeneratePayload;

/// Stands in for an unreachable provider.
struct Offline;

impl ImageProvider for Offline {
    fn generate<'a>(&'a self, _payload: &'a GeneratePayload) -> GenerateFuture<'a> {
        Box::pin(async { Err(ProviderError::Request("connection refused".into())) })
    }
}

/// Answers with a fixed PNG-typed payload.
struct Echo;

impl ImageProvider for Echo {
    fn generate<'a>(&'a self, payload: &'a GeneratePayload) -> GenerateFuture<'a> {
        Box::pin(async move {
            Ok(GeneratedImage {
                bytes: payload.prompt.len().to_le_bytes().to_vec(),
                mime_type: "image/png".into(),
                model_used: "echo".into(),
                safety: None,
            })
        })
    }
}

async fn open(path: &str, provider: Arc<dyn ImageProvider>) -> Arc<Studio> {
    let db = vendari_studio::db::connect_db(path)
        .await
        .expect("connect db");
    vendari_studio::db::migrations::Migrator::up(&db, None)
        .await
        .expect("migrate");
    Studio::open(
        Arc::new(SqliteStore::new(db)),
        provider,
        MockGenerator::instant(),
    )
    .await
    .expect("open studio")
}

async fn wait_until_idle(studio: &Arc<Studio>) {
    for _ in 0..500 {
        let stats = studio.stats().await;
        if stats.queued == 0 && stats.running == 0 && !studio.is_running() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("queue never drained");
}

#[tokio::test]
async fn offline_provider_still_completes_jobs_and_state_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("studio.sqlite");
    let path = path.to_string_lossy().to_string();

    let job_id = {
        let studio = open(&path, Arc::new(Offline)).await;
        studio
            .patch_form(json!({
                "category": "tênis",
                "preset": "PACOTE_SHOPEE_PADRAO",
                "mobileLegibilityOn": false,
            }))
            .await
            .expect("patch form");
        let job = studio.enqueue().await.expect("enqueue");
        assert_eq!(job.name, "tênis • Pacote Shopee (Capa + Info + Lifestyle)");
        wait_until_idle(&studio).await;
        job.id
    };

    let studio = open(&path, Arc::new(Offline)).await;
    let job = studio.job(&job_id).await.expect("job persisted");
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.results.len(), 3);
    assert_eq!(
        job.results.iter().map(|r| r.module).collect::<Vec<_>>(),
        vec![Module::CoverAd, Module::PromoInfographic, Module::Lifestyle]
    );
    for result in &job.results {
        assert!(result.image_data_url.starts_with("data:image/svg+xml;base64,"));
        assert!(result.seed < 1_000_000);
        assert!(!result.prompt.contains("MOBILE LEGIBILITY CHECK"));
    }
    assert_eq!(studio.form().await.category, "tênis");
}

#[tokio::test]
async fn search_finds_jobs_by_name_id_and_module() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("studio.sqlite");
    let studio = open(&path.to_string_lossy(), Arc::new(Echo)).await;

    studio
        .patch_form(json!({"category": "Bota", "preset": "CUSTOM", "module": "FUNDO_BRANCO_ML"}))
        .await
        .expect("patch");
    let boot = studio.enqueue().await.expect("enqueue");
    studio
        .patch_form(json!({"category": "Sandália", "preset": "PACOTE_3_CAPAS"}))
        .await
        .expect("patch");
    let sandal = studio.enqueue().await.expect("enqueue");
    wait_until_idle(&studio).await;

    let all = studio.jobs(None).await;
    assert_eq!(
        all.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(),
        vec![sandal.id.as_str(), boot.id.as_str()]
    );

    let by_name = studio.jobs(Some("bOtA")).await;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, boot.id);

    let by_module = studio.jobs(Some("capa_anuncio")).await;
    assert_eq!(by_module.len(), 1);
    assert_eq!(by_module[0].id, sandal.id);

    assert_eq!(studio.jobs(Some(&boot.id)).await.len(), 1);
    assert_eq!(studio.jobs(Some("   ")).await.len(), 2);

    let stats = studio.stats().await;
    assert_eq!((stats.total, stats.done), (2, 2));
}
