use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use seasonwatch_config::Config;
use std::path::Path;

/// Print the effective configuration (file values plus environment overrides)
pub fn show_config(config: &Config, config_file: &Path, output: &Output) -> Result<()> {
    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if !config_file.exists() {
                output.warn(format!(
                    "Configuration file not found at {}, showing defaults",
                    config_file.display()
                ));
            }
            println!("{}", settings_table(config, config_file));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&serde_json::to_value(config)?);
        }
    }
    Ok(())
}

fn settings_table(config: &Config, config_file: &Path) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        Cell::new("Setting").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    let rows = [
        ("config file", config_file.display().to_string()),
        ("scraper.base_url", config.scraper.base_url.clone()),
        ("scraper.request_timeout_ms", config.scraper.request_timeout_ms.to_string()),
        ("scraper.rate_limit_ms", config.scraper.rate_limit_ms.to_string()),
        ("scraper.user_agent", config.scraper.user_agent.clone()),
        ("scraper.accept_language", config.scraper.accept_language.clone()),
        ("scheduler.schedule", config.scheduler.schedule.clone()),
        ("scheduler.timezone", config.scheduler.timezone.clone()),
        ("scheduler.run_on_startup", config.scheduler.run_on_startup.to_string()),
        ("storage.file_path", config.storage.file_path.display().to_string()),
        ("server.port", config.server.port.to_string()),
        ("server.read_timeout_ms", config.server.read_timeout_ms.to_string()),
        ("server.shutdown_timeout_ms", config.server.shutdown_timeout_ms.to_string()),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    table
}
