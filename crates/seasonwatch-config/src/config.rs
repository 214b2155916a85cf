use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::duration::parse_duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings for the episode page extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Pause between successive page fetches during a check run
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub run_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_file")]
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on a whole request; must exceed `scraper.request_timeout_ms`
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_rate_limit_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_schedule() -> String {
    "0 9 * * *".to_string() // Daily at 09:00
}

fn default_timezone() -> String {
    std::env::var("TZ").unwrap_or_else(|_| "UTC".to_string())
}

fn default_storage_file() -> PathBuf {
    PathBuf::from("data/tracked_series.json")
}

fn default_port() -> u16 {
    8080
}

fn default_read_timeout_ms() -> u64 {
    60_000
}

fn default_shutdown_timeout_ms() -> u64 {
    10_000
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            rate_limit_ms: default_rate_limit_ms(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule: default_schedule(),
            timezone: default_timezone(),
            run_on_startup: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { file_path: default_storage_file() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            read_timeout_ms: default_read_timeout_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Config {
    /// Load config from `path` (defaults when the file is missing), apply
    /// environment overrides, then validate.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Empty values are ignored, as are
    /// numbers and durations that fail to parse.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_duration = |key: &str| {
            let raw = get(key)?;
            let parsed = parse_duration(&raw);
            if parsed.is_none() {
                warn!(variable = key, value = %raw, "Ignoring unparseable duration override");
            }
            parsed
        };

        if let Some(port) = get("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(variable = "PORT", value = %port, "Ignoring invalid port override"),
            }
        }
        if let Some(d) = get_duration("READ_TIMEOUT") {
            self.server.read_timeout_ms = millis(d);
        }
        if let Some(d) = get_duration("SHUTDOWN_TIMEOUT") {
            self.server.shutdown_timeout_ms = millis(d);
        }
        if let Some(url) = get("IMDB_BASE_URL") {
            self.scraper.base_url = url;
        }
        if let Some(d) = get_duration("REQUEST_TIMEOUT") {
            self.scraper.request_timeout_ms = millis(d);
        }
        if let Some(d) = get_duration("RATE_LIMIT") {
            self.scraper.rate_limit_ms = millis(d);
        }
        if let Some(ua) = get("USER_AGENT") {
            self.scraper.user_agent = ua;
        }
        if let Some(lang) = get("ACCEPT_LANGUAGE") {
            self.scraper.accept_language = lang;
        }
        if let Some(schedule) = get("CRON_SCHEDULE") {
            self.scheduler.schedule = schedule;
        }
        if let Some(tz) = get("TIMEZONE") {
            self.scheduler.timezone = tz;
        }
        if let Some(file) = get("STORAGE_FILE") {
            self.storage.file_path = PathBuf::from(file);
        }
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scraper.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("scraper.base_url cannot be empty"));
        }
        if self.scraper.request_timeout_ms == 0 {
            return Err(anyhow::anyhow!("scraper.request_timeout_ms must be greater than zero"));
        }
        if self.server.read_timeout_ms <= self.scraper.request_timeout_ms {
            return Err(anyhow::anyhow!(
                "server.read_timeout_ms ({}) must be greater than scraper.request_timeout_ms ({})",
                self.server.read_timeout_ms,
                self.scraper.request_timeout_ms
            ));
        }
        if self.storage.file_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("storage.file_path cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("server.port must be greater than zero"));
        }

        let fields = self.scheduler.schedule.split_whitespace().count();
        if !(5..=7).contains(&fields) {
            return Err(anyhow::anyhow!(
                "scheduler.schedule must be a cron expression with 5 to 7 fields, got '{}'",
                self.scheduler.schedule
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.scraper.base_url, "https://www.imdb.com");
        assert_eq!(config.scraper.rate_limit(), Duration::from_secs(2));
        assert_eq!(config.scraper.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.scheduler.schedule, "0 9 * * *");
        assert_eq!(config.storage.file_path, PathBuf::from("data/tracked_series.json"));
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "[scraper]\nrate_limit_ms = 500\n\n[storage]\nfile_path = \"/var/lib/seasonwatch/series.json\"\n",
        )
        .unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.scraper.rate_limit_ms, 500);
        assert_eq!(loaded.storage.file_path, PathBuf::from("/var/lib/seasonwatch/series.json"));
    }

    #[test]
    fn test_config_serializes_back_to_toml() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.server.read_timeout_ms, 60_000);
        assert_eq!(parsed.scheduler.schedule, "0 9 * * *");
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[scraper]\nrate_limit_ms = 100\n").unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.scraper.rate_limit_ms, 100);
        assert_eq!(loaded.scraper.request_timeout_ms, 30_000);
        assert_eq!(loaded.server.port, 8080);
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("PORT", "9090"),
            ("RATE_LIMIT", "500ms"),
            ("REQUEST_TIMEOUT", "1m"),
            ("STORAGE_FILE", "/tmp/series.json"),
            ("CRON_SCHEDULE", "0 */6 * * *"),
            ("TIMEZONE", "Europe/Berlin"),
        ]));

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.scraper.rate_limit_ms, 500);
        assert_eq!(config.scraper.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.storage.file_path, PathBuf::from("/tmp/series.json"));
        assert_eq!(config.scheduler.schedule, "0 */6 * * *");
        assert_eq!(config.scheduler.timezone, "Europe/Berlin");
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("PORT", "not-a-port"),
            ("RATE_LIMIT", "fast"),
            ("USER_AGENT", "   "),
        ]));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.scraper.rate_limit_ms, 2000);
        assert_eq!(config.scraper.user_agent, default_user_agent());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        config.scheduler.schedule = "every day".to_string();
        assert!(config.validate().is_err());

        config.scheduler.schedule = "0 0 9 * * *".to_string();
        assert!(config.validate().is_ok());

        config.scraper.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sub_second_duration_overrides_keep_precision() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("READ_TIMEOUT", "1500ms"),
            ("SHUTDOWN_TIMEOUT", "750ms"),
            ("REQUEST_TIMEOUT", "500ms"),
        ]));

        assert_eq!(config.server.read_timeout(), Duration::from_millis(1500));
        assert_eq!(config.server.shutdown_timeout(), Duration::from_millis(750));
        assert_eq!(config.scraper.request_timeout(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_read_timeout_must_exceed_request_timeout() {
        let mut config = Config::default();
        assert!(config.server.read_timeout() > config.scraper.request_timeout());

        config.server.read_timeout_ms = config.scraper.request_timeout_ms;
        assert!(config.validate().is_err());

        config.apply_overrides(lookup_from(&[("READ_TIMEOUT", "15s"), ("REQUEST_TIMEOUT", "30s")]));
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("read_timeout_ms"));
    }
}
