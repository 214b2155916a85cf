use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use seasonwatch_config::Config;
use seasonwatch_core::AddOutcome;
use serde_json::json;

use super::build_service;

pub async fn run_add(config: &Config, show_id: &str, season: u32, output: &Output) -> Result<()> {
    let service = build_service(config).await?;

    match service.add_series(show_id, season).await? {
        outcome @ AddOutcome::Tracking(_) => output.success(outcome.message()),
        outcome @ AddOutcome::AlreadyAnnounced { .. } => output.info(outcome.message()),
    }
    Ok(())
}

pub async fn run_list(config: &Config, output: &Output) -> Result<()> {
    let service = build_service(config).await?;
    let series = service.get_all().await?;
    output.series(&series);
    Ok(())
}

pub async fn run_check(config: &Config, output: &Output) -> Result<()> {
    let service = build_service(config).await?;
    let report = service.check_all().await?;

    match output.format() {
        OutputFormat::Human => {
            if report.tracked == 0 {
                output.info("No seasons are being tracked");
                return Ok(());
            }
            output.success(format!(
                "Checked {} of {} seasons in {:.1}s",
                report.checked,
                report.tracked,
                report.duration.as_secs_f64()
            ));
            for key in &report.newly_announced {
                output.info(format!("Newly announced: {}", key));
            }
            for error in &report.errors {
                output.warn(error);
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => output.json(&json!({
            "tracked": report.tracked,
            "checked": report.checked,
            "failed": report.failed,
            "newly_announced": report.newly_announced,
            "errors": report.errors,
            "duration_ms": report.duration.as_millis() as u64,
        })),
    }
    Ok(())
}
