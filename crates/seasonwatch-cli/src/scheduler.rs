use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use color_eyre::eyre::{eyre, Result};
use cron::Schedule;
use seasonwatch_config::SchedulerConfig;
use seasonwatch_core::{TrackerError, TrackerService};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};

/// Runs reconciliation on a cron schedule evaluated in the configured timezone
///
/// Each firing is a one-shot job; when it finishes it registers the next
/// firing, so daylight-saving shifts are followed.
pub struct Scheduler {
    scheduler: JobScheduler,
    service: Arc<TrackerService>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(service: Arc<TrackerService>, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| eyre!("Failed to create job scheduler: {:?}", e))?;

        Ok(Self {
            scheduler,
            service,
            config,
        })
    }

    /// Register the recurring job and start firing it.
    ///
    /// Fails on an invalid schedule or timezone before anything runs.
    pub async fn start(&mut self) -> Result<()> {
        let schedule = parse_schedule(&self.config.schedule)?;
        let timezone = parse_timezone(&self.config.timezone)?;

        let job = zoned_job(Arc::new(schedule), timezone, Arc::clone(&self.service), Utc::now())?
            .ok_or_else(|| eyre!("Cron schedule '{}' never fires", self.config.schedule))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| eyre!("Failed to register scheduled check: {:?}", e))?;

        if self.config.run_on_startup {
            info!(operation = "scheduler_startup", "Running initial check on startup");
            match self.service.trigger_check() {
                Ok(_handle) => {}
                Err(TrackerError::CheckInProgress) => self.service.events().check_skipped("startup"),
                Err(e) => return Err(eyre!("Failed to start initial check: {}", e)),
            }
        }

        self.scheduler
            .start()
            .await
            .map_err(|e| eyre!("Failed to start scheduler: {:?}", e))?;

        info!(
            operation = "scheduler_started",
            schedule = %self.config.schedule,
            timezone = %self.config.timezone,
            "Scheduler started"
        );
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| eyre!("Failed to stop scheduler: {:?}", e))?;
        info!(operation = "scheduler_stopped", "Scheduler stopped");
        Ok(())
    }
}

/// One-shot job for the first firing of `schedule` after `after`.
///
/// Returns `None` once the schedule has no further firings.
fn zoned_job(
    schedule: Arc<Schedule>,
    timezone: Tz,
    service: Arc<TrackerService>,
    after: DateTime<Utc>,
) -> Result<Option<Job>> {
    let Some(fire_at) = next_fire(&schedule, timezone, after) else {
        return Ok(None);
    };
    let fire_at_utc = fire_at.with_timezone(&Utc);
    // One-shot jobs are armed with whole-second precision; pad so a run is never early
    let delay = (fire_at_utc - Utc::now()).to_std().unwrap_or(Duration::ZERO) + Duration::from_secs(1);

    let job = Job::new_one_shot_at_instant_async(Instant::now() + delay, move |_id, scheduler| {
        let schedule = Arc::clone(&schedule);
        let service = Arc::clone(&service);
        Box::pin(async move {
            info!(operation = "scheduled_check_start", "Starting scheduled check");
            run_check(&service, "scheduled").await;

            match zoned_job(schedule, timezone, service, fire_at_utc) {
                Ok(Some(next)) => {
                    if let Err(e) = scheduler.add(next).await {
                        error!(operation = "scheduler_error", error = ?e, "Failed to register next scheduled check");
                    }
                }
                Ok(None) => warn!(operation = "scheduler_exhausted", "Cron schedule has no further runs"),
                Err(e) => error!(operation = "scheduler_error", error = %e, "Failed to build next scheduled check"),
            }
        })
    })
    .map_err(|e| eyre!("Failed to build scheduled check: {:?}", e))?;

    debug!(next_run = %fire_at, "Scheduled next check");
    Ok(Some(job))
}

/// First firing strictly after both `after` and the current time, in `timezone`
pub fn next_fire(schedule: &Schedule, timezone: Tz, after: DateTime<Utc>) -> Option<DateTime<Tz>> {
    let from = after.max(Utc::now());
    schedule.after(&from.with_timezone(&timezone)).next()
}

/// Run one reconciliation, reporting an overlap as a skip.
///
/// Other failures were already reported by the service's event sink.
async fn run_check(service: &TrackerService, trigger: &str) {
    match service.reconcile_now().await {
        Ok(report) => debug!(trigger = %trigger, checked = report.checked, "Check run returned"),
        Err(TrackerError::CheckInProgress) => service.events().check_skipped(trigger),
        Err(e) => debug!(trigger = %trigger, error = %e, "Check run returned an error"),
    }
}

/// Accept classic 5-field expressions by adding a leading seconds field
pub fn normalize_cron(expression: &str) -> String {
    let expression = expression.trim();
    if expression.split_whitespace().count() == 5 {
        format!("0 {}", expression)
    } else {
        expression.to_string()
    }
}

pub fn parse_schedule(expression: &str) -> Result<Schedule> {
    Schedule::from_str(&normalize_cron(expression))
        .map_err(|e| eyre!("Invalid cron schedule '{}': {}", expression, e))
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| eyre!("Invalid timezone '{}': {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{service_with_pages, StubExtractor};
    use chrono::TimeZone;
    use seasonwatch_core::SeriesStore;
    use seasonwatch_models::{EpisodeInfo, Series, Status};

    fn config(schedule: &str, timezone: &str, run_on_startup: bool) -> SchedulerConfig {
        SchedulerConfig {
            schedule: schedule.to_string(),
            timezone: timezone.to_string(),
            run_on_startup,
        }
    }

    #[test]
    fn test_normalize_cron() {
        assert_eq!(normalize_cron("0 9 * * *"), "0 0 9 * * *");
        assert_eq!(normalize_cron("  */5 * * * *  "), "0 */5 * * * *");
        assert_eq!(normalize_cron("30 0 9 * * *"), "30 0 9 * * *");
        assert_eq!(normalize_cron("0 0 9 * * * 2030"), "0 0 9 * * * 2030");
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("UTC").unwrap(), Tz::UTC);
        assert_eq!(parse_timezone("Europe/Berlin").unwrap(), Tz::Europe__Berlin);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_timezone() {
        let (_dir, service, _) = service_with_pages(StubExtractor::new()).await;
        let mut scheduler = Scheduler::new(service, config("0 9 * * *", "Nowhere/City", false))
            .await
            .unwrap();
        assert!(scheduler.start().await.is_err());
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_schedule() {
        let (_dir, service, _) = service_with_pages(StubExtractor::new()).await;
        let mut scheduler = Scheduler::new(service, config("every morning", "UTC", false))
            .await
            .unwrap();
        assert!(scheduler.start().await.is_err());
    }

    #[tokio::test]
    async fn test_run_on_startup_triggers_check() {
        let extractor = StubExtractor::new().with_page("tt1", 2, EpisodeInfo::new("The Return", "Mar 3, 2026"));
        let (_dir, service, store) = service_with_pages(extractor).await;
        store.add(Series::placeholder("tt1", 2, Utc::now())).await.unwrap();

        let mut scheduler = Scheduler::new(Arc::clone(&service), config("0 9 * * *", "UTC", true))
            .await
            .unwrap();
        scheduler.start().await.unwrap();
        while service.is_checking() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let stored = store.get("tt1", 2).await.unwrap();
        assert_eq!(stored.status, Status::Announced);
        scheduler.shutdown().await.unwrap();
    }

    #[test]
    fn test_next_fire_follows_timezone_offsets() {
        let schedule = parse_schedule("0 9 * * *").unwrap();
        let berlin = parse_timezone("Europe/Berlin").unwrap();

        let winter = Utc.with_ymd_and_hms(2090, 1, 15, 0, 0, 0).unwrap();
        let fire = next_fire(&schedule, berlin, winter).unwrap();
        assert_eq!(fire.with_timezone(&Utc), Utc.with_ymd_and_hms(2090, 1, 15, 8, 0, 0).unwrap());

        let summer = Utc.with_ymd_and_hms(2090, 7, 15, 0, 0, 0).unwrap();
        let fire = next_fire(&schedule, berlin, summer).unwrap();
        assert_eq!(fire.with_timezone(&Utc), Utc.with_ymd_and_hms(2090, 7, 15, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_next_fire_is_strictly_after_previous_run() {
        let schedule = parse_schedule("0 9 * * *").unwrap();
        let tokyo = parse_timezone("Asia/Tokyo").unwrap();

        let previous = Utc.with_ymd_and_hms(2090, 3, 1, 0, 0, 0).unwrap();
        let fire = next_fire(&schedule, tokyo, previous).unwrap();
        assert_eq!(fire.with_timezone(&Utc), Utc.with_ymd_and_hms(2090, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_exhausted_schedule_has_no_next_fire() {
        let schedule = parse_schedule("0 0 9 1 1 * 2001").unwrap();
        assert!(next_fire(&schedule, Tz::UTC, Utc::now()).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_zoned_schedule_fires_and_rearms() {
        let extractor = StubExtractor::new().with_page("tt1", 2, EpisodeInfo::new("The Return", "Mar 3, 2026"));
        let (_dir, service, store) = service_with_pages(extractor).await;
        store.add(Series::placeholder("tt1", 2, Utc::now())).await.unwrap();
        let added = store.get("tt1", 2).await.unwrap().last_checked;

        let mut scheduler = Scheduler::new(Arc::clone(&service), config("* * * * * *", "Asia/Tokyo", false))
            .await
            .unwrap();
        scheduler.start().await.unwrap();

        let mut runs = Vec::new();
        for _ in 0..100 {
            let current = store.get("tt1", 2).await.unwrap();
            if current.last_checked != added && runs.last() != Some(&current.last_checked) {
                assert_eq!(current.status, Status::Announced);
                runs.push(current.last_checked);
                if runs.len() == 2 {
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        scheduler.shutdown().await.unwrap();

        assert_eq!(runs.len(), 2, "expected the job to fire and re-arm");
    }
}
