pub mod config;
pub mod serve;
pub mod series;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use seasonwatch_config::{Config, PathManager};
use seasonwatch_core::{JsonSeriesStore, LogEvents, SeriesStore, TrackerEvents, TrackerService};
use seasonwatch_sources::{ContentExtractor, ImdbExtractor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Config file from `--config`, else `$SEASONWATCH_CONFIG`, else the platform config dir
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathManager::default().config_file())
}

pub fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let path = config_path(explicit);
    debug!(path = %path.display(), "Loading configuration");
    Config::load(&path).map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))
}

/// Open the store and wire the tracker service from configuration
pub async fn build_service(config: &Config) -> Result<Arc<TrackerService>> {
    let events: Arc<dyn TrackerEvents> = Arc::new(LogEvents);
    let store = JsonSeriesStore::open_with_events(config.storage.file_path.clone(), Arc::clone(&events))
        .await
        .wrap_err_with(|| format!("Failed to open store at {}", config.storage.file_path.display()))?;
    let extractor = ImdbExtractor::new(&config.scraper).wrap_err("Failed to build IMDb extractor")?;

    let store: Arc<dyn SeriesStore> = Arc::new(store);
    let extractor: Arc<dyn ContentExtractor> = Arc::new(extractor);
    let service = TrackerService::new(store, extractor)
        .with_pacing(config.scraper.rate_limit())
        .with_events(events);

    Ok(Arc::new(service))
}
