use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::models::ShowConfig;
use crate::error::ConfigError;
use crate::infra::feed::DEFAULT_FEED_URL;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub magnet_output_path: PathBuf,
    pub log_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub shows: Vec<ShowConfig>,
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl Config {
    fn default_in(dir: &Path) -> Self {
        Self {
            magnet_output_path: dir.join("magnets.txt"),
            log_path: dir.join("downloads.log"),
            database_path: None,
            feed_url: default_feed_url(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            shows: Vec::new(),
        }
    }

    /// Load the config at `path`. A missing file is replaced by a default
    /// one, written to disk and returned.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let config = Config::default_in(dir);
            config.save(path)?;
            println!("Created default config at {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("cannot serialize config: {e}")))?;
        fs::write(path, content).map_err(write_error)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for show in &self.shows {
            if show.name.trim().is_empty() {
                return Err(ConfigError::Invalid("show name cannot be empty".to_string()));
            }
            if !names.insert(show.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "show '{}' is listed more than once",
                    show.name
                )));
            }
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| get_config_dir_path().join("tvshows.db"))
    }
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("tvshow-tracker"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

pub fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}
