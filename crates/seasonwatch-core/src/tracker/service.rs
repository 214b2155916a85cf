use chrono::Utc;
use seasonwatch_models::{EpisodeInfo, Series, Status};
use seasonwatch_sources::ContentExtractor;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::classifier::is_announced;
use crate::error::TrackerError;
use crate::events::{LogEvents, TrackerEvents};
use crate::store::SeriesStore;

/// Pause between successive page fetches during a check run
pub const DEFAULT_PACING: Duration = Duration::from_secs(2);

/// Result of asking to track a season
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The season still shows placeholder data and is now tracked
    Tracking(Series),
    /// The season is already announced; nothing was stored
    AlreadyAnnounced { show_id: String, season: u32, info: EpisodeInfo },
}

impl AddOutcome {
    pub fn is_tracking(&self) -> bool {
        matches!(self, AddOutcome::Tracking(_))
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOutcome::Tracking(series) => {
                write!(f, "Now tracking {} season {}", series.show_id, series.season)
            }
            AddOutcome::AlreadyAnnounced { show_id, season, info } => write!(
                f,
                "Season {} of {} is already announced:\nTitle: {}\nRelease: {}",
                season, show_id, info.title, info.release_date
            ),
        }
    }
}

/// Summary of one reconciliation run
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Entries in the snapshot taken at the start of the run
    pub tracked: usize,
    pub checked: usize,
    pub failed: usize,
    /// Keys of seasons that moved to announced during this run
    pub newly_announced: Vec<String>,
    pub errors: Vec<String>,
    pub duration: Duration,
}

/// Exclusive right to run a check; the running flag drops before the lock
struct CheckPermit {
    _guard: OwnedMutexGuard<()>,
    running: Arc<AtomicBool>,
}

impl Drop for CheckPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Drives extraction, classification and persistence of tracked seasons
///
/// Holds no mutable state of its own apart from the single-flight guard that
/// keeps reconciliation runs from overlapping.
pub struct TrackerService {
    store: Arc<dyn SeriesStore>,
    extractor: Arc<dyn ContentExtractor>,
    events: Arc<dyn TrackerEvents>,
    pacing: Duration,
    check_guard: Arc<Mutex<()>>,
    running: Arc<AtomicBool>,
}

impl TrackerService {
    pub fn new(store: Arc<dyn SeriesStore>, extractor: Arc<dyn ContentExtractor>) -> Self {
        Self {
            store,
            extractor,
            events: Arc::new(LogEvents),
            pacing: DEFAULT_PACING,
            check_guard: Arc::new(Mutex::new(())),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn TrackerEvents>) -> Self {
        self.events = events;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn events(&self) -> Arc<dyn TrackerEvents> {
        Arc::clone(&self.events)
    }

    /// True while a reconciliation run holds the guard. Never contends for it.
    pub fn is_checking(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn acquire_check(&self) -> Result<CheckPermit, TrackerError> {
        let guard = Arc::clone(&self.check_guard)
            .try_lock_owned()
            .map_err(|_| TrackerError::CheckInProgress)?;
        self.running.store(true, Ordering::SeqCst);
        Ok(CheckPermit {
            _guard: guard,
            running: Arc::clone(&self.running),
        })
    }

    /// Fetch and classify a season, and start tracking it if it is not yet announced.
    ///
    /// The show id is kept verbatim. Nothing is stored when the fetch fails or
    /// the season is already announced. Adding and saving run on their own task,
    /// so a caller that gives up mid-save still ends with the entry either
    /// persisted or rolled back.
    pub async fn add_series(&self, show_id: &str, season: u32) -> Result<AddOutcome, TrackerError> {
        if show_id.trim().is_empty() {
            return Err(TrackerError::InvalidRequest("show_id cannot be empty".to_string()));
        }
        if season == 0 {
            return Err(TrackerError::InvalidRequest("season must be greater than zero".to_string()));
        }

        let info = self.extractor.fetch_episode_info(show_id, season).await?;

        if is_announced(&info) {
            self.events.add_skipped_announced(show_id, season, &info);
            return Ok(AddOutcome::AlreadyAnnounced {
                show_id: show_id.to_string(),
                season,
                info,
            });
        }

        let series = Series::placeholder(show_id, season, Utc::now());
        let persist = tokio::spawn(persist_new(
            Arc::clone(&self.store),
            Arc::clone(&self.events),
            series,
        ));
        let series = persist.await??;

        Ok(AddOutcome::Tracking(series))
    }

    pub async fn get_all(&self) -> Result<Vec<Series>, TrackerError> {
        Ok(self.store.get_all().await?)
    }

    /// Re-check every tracked season once.
    ///
    /// Rejected with [`TrackerError::CheckInProgress`] while another run is active.
    /// Per-item failures are reported through the event sink and skipped; only a
    /// failure to list entries or to save at the end fails the run.
    pub async fn check_all(&self) -> Result<CheckReport, TrackerError> {
        let _permit = self.acquire_check()?;
        self.run_check().await
    }

    /// Entry point for the recurring schedule; same contract as [`check_all`](Self::check_all)
    pub async fn reconcile_now(&self) -> Result<CheckReport, TrackerError> {
        self.check_all().await
    }

    /// Start a check run in the background.
    ///
    /// The guard is taken before spawning, so a second trigger while a run is
    /// active fails immediately. The returned handle may be awaited or dropped;
    /// dropping it does not cancel the run.
    pub fn trigger_check(self: &Arc<Self>) -> Result<JoinHandle<Result<CheckReport, TrackerError>>, TrackerError> {
        let permit = self.acquire_check()?;
        let service = Arc::clone(self);

        Ok(tokio::spawn(async move {
            let _permit = permit;
            service.run_check().await
        }))
    }

    async fn run_check(&self) -> Result<CheckReport, TrackerError> {
        let started = Instant::now();

        let tracked = match self.store.get_all().await {
            Ok(tracked) => tracked,
            Err(e) => {
                self.events.check_failed(&e.to_string());
                return Err(e.into());
            }
        };

        self.events.check_started(tracked.len());
        let mut report = CheckReport {
            tracked: tracked.len(),
            ..CheckReport::default()
        };

        for (index, series) in tracked.into_iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let (show_id, season) = (series.show_id.clone(), series.season);
            match self.check_series(series).await {
                Ok(Some(key)) => {
                    report.checked += 1;
                    report.newly_announced.push(key);
                }
                Ok(None) => report.checked += 1,
                Err(e) => {
                    report.failed += 1;
                    let message = e.to_string();
                    self.events.check_item_failed(&show_id, season, &message);
                    report.errors.push(format!("{}: {}", seasonwatch_models::series_key(&show_id, season), message));
                }
            }
        }

        if let Err(e) = self.store.save().await {
            self.events.check_failed(&e.to_string());
            return Err(e.into());
        }

        report.duration = started.elapsed();
        self.events.check_finished(&report);
        Ok(report)
    }

    /// Fetch, classify and update one entry. Returns the key when the season
    /// transitioned to announced.
    async fn check_series(&self, series: Series) -> Result<Option<String>, TrackerError> {
        let info = self
            .extractor
            .fetch_episode_info(&series.show_id, series.season)
            .await?;

        let previous = series.status;
        let updated = Series {
            last_checked: Utc::now(),
            status: if is_announced(&info) { Status::Announced } else { Status::Placeholder },
            ..series
        };

        self.store.update(updated.clone()).await?;
        debug!(
            key = %updated.key(),
            previous = %previous,
            status = %updated.status,
            "Updated tracked season"
        );

        if !previous.is_announced() && updated.status.is_announced() {
            self.events.announced(&updated, &info);
            return Ok(Some(updated.key()));
        }
        Ok(None)
    }
}

/// Insert and save a new entry, removing it again if the save fails
async fn persist_new(
    store: Arc<dyn SeriesStore>,
    events: Arc<dyn TrackerEvents>,
    series: Series,
) -> Result<Series, TrackerError> {
    store.add(series.clone()).await?;

    if let Err(e) = store.save().await {
        if let Err(rollback) = store.delete(&series.show_id, series.season).await {
            events.rollback_failed(&series.key(), &rollback.to_string());
        }
        return Err(e.into());
    }

    events.series_tracked(&series);
    Ok(series)
}
