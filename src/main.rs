//! Readmit: hospital readmission risk service
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use readmit::adapters::sanitize::SanitizingMakeWriter;
use readmit::adapters::{JsonClassifier, LoadOptions, SqliteStore};
use readmit::api::{api_router, serve, shutdown_signal, RouterOptions};
use readmit::application::{DimensionCatalog, FeatureVectorBuilder, ReadmissionService};
use readmit::config::{Config, LogMode, StoreConfig};

fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize logging.
    let (writer, _guard) = match &config.log_mode {
        LogMode::File(log_file) => {
            if let Some(parent) = log_file.parent() {
                // Best-effort: don't fail startup just because the directory is missing.
                let _ = std::fs::create_dir_all(parent);
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .with_context(|| format!("Cannot open log file {}", log_file.display()))?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stdout => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting readmission service...");

    let builder = FeatureVectorBuilder::default();

    // Model and lookups are loaded before the listener opens; failure is fatal.
    let classifier = JsonClassifier::load(
        &config.model_path,
        builder.schema(),
        LoadOptions {
            require_digest: config.require_model_digest,
        },
    )
    .context("Failed to load classifier")?;

    let store_config = StoreConfig::load(&config.db_config_path)?;
    let store = SqliteStore::from_config(&store_config).context("Failed to open store")?;

    let service = ReadmissionService::initialize(
        Arc::new(classifier),
        Arc::new(store),
        builder,
        DimensionCatalog::default(),
    )
    .context("Failed to load dimension lookups")?;

    let app = api_router(
        Arc::new(service),
        RouterOptions {
            enable_reload: config.enable_reload,
        },
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config.bind_addr, app, shutdown_signal()))?;

    tracing::info!("Readmission service shutdown complete.");
    Ok(())
}
