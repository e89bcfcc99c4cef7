use std::sync::Arc;

use clap::Parser;
use sea_orm_migration::MigratorTrait;
use tracing::error;
use vendari_studio::config::setup_logging;
use vendari_studio::db::store::SqliteStore;
use vendari_studio::mock::MockGenerator;
use vendari_studio::provider::{GeminiProvider, ImageProvider};
use vendari_studio::studio::Studio;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = vendari_studio::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let db = match vendari_studio::db::connect_db(&cli.database_path).await {
        Ok(db) => db,
        Err(err) => {
            error!("Database connection error: {}", err);
            return;
        }
    };

    if let Err(err) = vendari_studio::db::migrations::Migrator::up(&db, None).await {
        error!("Database migration error: {}", err);
        return;
    }

    let provider: Arc<dyn ImageProvider> = Arc::new(GeminiProvider::new());
    let studio = match Studio::open(
        Arc::new(SqliteStore::new(db)),
        provider.clone(),
        MockGenerator::default(),
    )
    .await
    {
        Ok(studio) => studio,
        Err(err) => {
            error!("Failed to load studio state: {}", err);
            return;
        }
    };
    studio.set_force_mock(cli.force_mock);
    studio.kick();

    if let Err(err) =
        vendari_studio::web::setup_server(&cli.listen_address, cli.port, studio, provider).await
    {
        error!("Application error: {}", err);
    }
}
