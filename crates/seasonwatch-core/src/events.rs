use seasonwatch_models::{EpisodeInfo, Series};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::tracker::CheckReport;

/// Receiver for notable tracker and store activity
///
/// Handed to the service, the store and the scheduler at construction so
/// embedders and tests decide where these events go.
pub trait TrackerEvents: Send + Sync {
    fn series_tracked(&self, series: &Series);

    fn add_skipped_announced(&self, show_id: &str, season: u32, info: &EpisodeInfo);

    fn rollback_failed(&self, key: &str, error: &str);

    fn store_loaded(&self, path: &Path, count: usize);

    fn store_saved(&self, path: &Path, count: usize);

    fn check_started(&self, tracked: usize);

    fn check_item_failed(&self, show_id: &str, season: u32, error: &str);

    fn announced(&self, series: &Series, info: &EpisodeInfo);

    fn check_finished(&self, report: &CheckReport);

    fn check_failed(&self, error: &str);

    fn check_skipped(&self, trigger: &str);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEvents;

impl TrackerEvents for LogEvents {
    fn series_tracked(&self, series: &Series) {
        info!(
            operation = "add_series",
            show_id = %series.show_id,
            season = series.season,
            "Now tracking season"
        );
    }

    fn add_skipped_announced(&self, show_id: &str, season: u32, info: &EpisodeInfo) {
        info!(
            operation = "add_series",
            show_id = %show_id,
            season = season,
            title = %info.title,
            "Season already announced, not tracking"
        );
    }

    fn rollback_failed(&self, key: &str, error: &str) {
        warn!(key = %key, error = %error, "Failed to roll back series after save error");
    }

    fn store_loaded(&self, path: &Path, count: usize) {
        info!(path = %path.display(), count = count, "Loaded tracked series");
    }

    fn store_saved(&self, path: &Path, count: usize) {
        debug!(path = %path.display(), count = count, "Saved tracked series");
    }

    fn check_started(&self, tracked: usize) {
        info!(operation = "check_start", tracked = tracked, "Checking tracked seasons");
    }

    fn check_item_failed(&self, show_id: &str, season: u32, error: &str) {
        warn!(
            operation = "check_item_error",
            show_id = %show_id,
            season = season,
            error = %error,
            "Failed to check season, skipping"
        );
    }

    fn announced(&self, series: &Series, info: &EpisodeInfo) {
        info!(
            operation = "new_announcement",
            show_id = %series.show_id,
            season = series.season,
            title = %info.title,
            release_date = %info.release_date,
            "NEW ANNOUNCEMENT: {} season {}",
            series.show_id,
            series.season
        );
    }

    fn check_finished(&self, report: &CheckReport) {
        info!(
            operation = "check_complete",
            tracked = report.tracked,
            checked = report.checked,
            failed = report.failed,
            announced = report.newly_announced.len(),
            duration_ms = report.duration.as_millis() as u64,
            "Check completed"
        );
    }

    fn check_failed(&self, error: &str) {
        error!(operation = "check_error", error = %error, "Check failed");
    }

    fn check_skipped(&self, trigger: &str) {
        warn!(
            operation = "check_skipped",
            trigger = %trigger,
            "Check already in progress, skipping"
        );
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl TrackerEvents for NoopEvents {
    fn series_tracked(&self, _series: &Series) {}
    fn add_skipped_announced(&self, _show_id: &str, _season: u32, _info: &EpisodeInfo) {}
    fn rollback_failed(&self, _key: &str, _error: &str) {}
    fn store_loaded(&self, _path: &Path, _count: usize) {}
    fn store_saved(&self, _path: &Path, _count: usize) {}
    fn check_started(&self, _tracked: usize) {}
    fn check_item_failed(&self, _show_id: &str, _season: u32, _error: &str) {}
    fn announced(&self, _series: &Series, _info: &EpisodeInfo) {}
    fn check_finished(&self, _report: &CheckReport) {}
    fn check_failed(&self, _error: &str) {}
    fn check_skipped(&self, _trigger: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    SeriesTracked { key: String },
    AddSkippedAnnounced { key: String, title: String },
    RollbackFailed { key: String, error: String },
    StoreLoaded { count: usize },
    StoreSaved { count: usize },
    CheckStarted { tracked: usize },
    CheckItemFailed { key: String, error: String },
    Announced { key: String, title: String },
    CheckFinished { checked: usize, failed: usize },
    CheckFailed { error: String },
    CheckSkipped { trigger: String },
}

/// Keeps every event in memory, in order
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<TrackerEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TrackerEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: TrackerEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl TrackerEvents for RecordingEvents {
    fn series_tracked(&self, series: &Series) {
        self.push(TrackerEvent::SeriesTracked { key: series.key() });
    }

    fn add_skipped_announced(&self, show_id: &str, season: u32, info: &EpisodeInfo) {
        self.push(TrackerEvent::AddSkippedAnnounced {
            key: seasonwatch_models::series_key(show_id, season),
            title: info.title.clone(),
        });
    }

    fn rollback_failed(&self, key: &str, error: &str) {
        self.push(TrackerEvent::RollbackFailed { key: key.to_string(), error: error.to_string() });
    }

    fn store_loaded(&self, _path: &Path, count: usize) {
        self.push(TrackerEvent::StoreLoaded { count });
    }

    fn store_saved(&self, _path: &Path, count: usize) {
        self.push(TrackerEvent::StoreSaved { count });
    }

    fn check_started(&self, tracked: usize) {
        self.push(TrackerEvent::CheckStarted { tracked });
    }

    fn check_item_failed(&self, show_id: &str, season: u32, error: &str) {
        self.push(TrackerEvent::CheckItemFailed {
            key: seasonwatch_models::series_key(show_id, season),
            error: error.to_string(),
        });
    }

    fn announced(&self, series: &Series, info: &EpisodeInfo) {
        self.push(TrackerEvent::Announced { key: series.key(), title: info.title.clone() });
    }

    fn check_finished(&self, report: &CheckReport) {
        self.push(TrackerEvent::CheckFinished { checked: report.checked, failed: report.failed });
    }

    fn check_failed(&self, error: &str) {
        self.push(TrackerEvent::CheckFailed { error: error.to_string() });
    }

    fn check_skipped(&self, trigger: &str) {
        self.push(TrackerEvent::CheckSkipped { trigger: trigger.to_string() });
    }
}
