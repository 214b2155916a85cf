use anyhow::Result;
use std::path::PathBuf;

/// Get the config file override from environment variable, if any
pub fn config_file_override() -> Option<PathBuf> {
    std::env::var("SEASONWATCH_CONFIG").ok().map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("seasonwatch");

        Ok(Self { config_dir })
    }

    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self { config_dir: config_dir.into() }
    }

    pub fn config_file(&self) -> PathBuf {
        config_file_override().unwrap_or_else(|| self.config_dir.join("config.toml"))
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // Fall back to the working directory when no platform config dir exists (e.g. minimal containers)
        Self::new().unwrap_or_else(|_| Self::with_config_dir("."))
    }
}
