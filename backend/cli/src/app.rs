//! Wiring config into stores, the vision provider and the services.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use autoinspect_config::{AutoInspectConfig, VisionConfig, VisionProviderKind};
use autoinspect_core::{BlobStore, Repositories, VisionAnalyzer};
use autoinspect_inspection::{InspectionRunner, InspectionService, VehicleService};
use autoinspect_report::{ReportOptions, ReportService};
use autoinspect_store::{FsBlobStore, SqliteStore};
use autoinspect_vision::{MockVisionProvider, OpenAiVisionProvider};

/// Shared application state for API handlers and one-shot commands.
pub struct AppState {
    pub vehicles: VehicleService,
    pub inspections: InspectionService,
    pub reports: ReportService,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        blobs: Arc<dyn BlobStore>,
        analyzer: Arc<dyn VisionAnalyzer>,
        max_concurrency: usize,
        report_options: ReportOptions,
    ) -> Self {
        let runner = InspectionRunner::new(repos.clone(), blobs.clone(), analyzer)
            .with_max_concurrency(max_concurrency);
        Self {
            vehicles: VehicleService::new(repos.clone()),
            inspections: InspectionService::new(repos.clone(), blobs.clone(), runner),
            reports: ReportService::new(repos, blobs).with_options(report_options),
        }
    }

    /// SQLite records, filesystem blobs and the configured provider.
    pub fn from_config(config: &AutoInspectConfig) -> Result<Self> {
        let db_path = config.storage.database_path();
        let store = SqliteStore::open(db_path)
            .with_context(|| format!("Failed to open database at {db_path}"))?;
        let blobs = FsBlobStore::new(config.storage.blob_root());
        let analyzer = build_analyzer(&config.vision)?;

        info!(
            db = %db_path,
            blobs = %blobs.root().display(),
            provider = analyzer.name(),
            "Storage and vision provider ready"
        );

        Ok(Self::new(
            Repositories::from_store(Arc::new(store)),
            Arc::new(blobs),
            analyzer,
            config.vision.max_concurrency(),
            report_options(config),
        ))
    }
}

pub fn build_analyzer(vision: &VisionConfig) -> Result<Arc<dyn VisionAnalyzer>> {
    match vision.provider() {
        VisionProviderKind::Openai => {
            let api_key = vision
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .context("vision.apiKey is required for the openai provider")?;
            let provider = OpenAiVisionProvider::new(api_key)
                .with_base_url(vision.base_url())
                .with_model(vision.model())
                .with_max_tokens(vision.max_tokens())
                .with_temperature(vision.temperature())
                .with_timeout(vision.timeout())?;
            Ok(Arc::new(provider))
        }
        VisionProviderKind::Mock => Ok(Arc::new(MockVisionProvider::new())),
    }
}

fn report_options(config: &AutoInspectConfig) -> ReportOptions {
    let mut options = ReportOptions::default();
    if let Some(title) = &config.report.title {
        options.title = title.clone();
    }
    if let Some(footer) = &config.report.footer {
        options.footer = footer.clone();
    }
    options
}

/// Log directory from config, if any.
pub fn log_dir(config: &AutoInspectConfig) -> Option<&Path> {
    config.logging.dir.as_deref().map(Path::new)
}
