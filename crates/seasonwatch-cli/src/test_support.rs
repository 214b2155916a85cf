use async_trait::async_trait;
use seasonwatch_core::{JsonSeriesStore, NoopEvents, SeriesStore, TrackerService};
use seasonwatch_models::EpisodeInfo;
use seasonwatch_sources::{ContentExtractor, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Extractor serving canned pages; unknown seasons answer 404
pub struct StubExtractor {
    pages: HashMap<(String, u32), EpisodeInfo>,
    gate: Option<Arc<Notify>>,
}

impl StubExtractor {
    pub fn new() -> Self {
        Self { pages: HashMap::new(), gate: None }
    }

    pub fn with_page(mut self, show_id: &str, season: u32, info: EpisodeInfo) -> Self {
        self.pages.insert((show_id.to_string(), season), info);
        self
    }

    /// Every fetch waits for one notification before answering
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn gate(&self) -> Arc<Notify> {
        self.gate.clone().unwrap_or_else(|| Arc::new(Notify::new()))
    }
}

#[async_trait]
impl ContentExtractor for StubExtractor {
    fn source_name(&self) -> &str {
        "stub"
    }

    async fn fetch_episode_info(&self, show_id: &str, season: u32) -> Result<EpisodeInfo, SourceError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.pages
            .get(&(show_id.to_string(), season))
            .cloned()
            .ok_or_else(|| SourceError::Status {
                status: 404,
                url: format!("stub://{}/{}", show_id, season),
            })
    }
}

/// Service over a fresh store in a temp dir, with no pacing and silent events
pub async fn service_with_pages(
    extractor: StubExtractor,
) -> (TempDir, Arc<TrackerService>, Arc<JsonSeriesStore>) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonSeriesStore::new(dir.path().join("tracked_series.json")));
    let service = TrackerService::new(
        Arc::clone(&store) as Arc<dyn SeriesStore>,
        Arc::new(extractor),
    )
    .with_pacing(Duration::ZERO)
    .with_events(Arc::new(NoopEvents));
    (dir, Arc::new(service), store)
}
