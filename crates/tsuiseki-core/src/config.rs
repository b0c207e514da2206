use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tsuiseki_api::ClientSettings;

use crate::error::SyncError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sync: SyncOptions,
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub paths: PathsConfig,
}

/// How list state is allowed to change when an episode is watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    pub set_completed_to_rewatching_on_first_episode: bool,
    pub update_progress_when_rewatching: bool,
    pub set_to_completed_after_last_episode_current: bool,
    pub set_to_completed_after_last_episode_rewatching: bool,
    pub add_entry_if_missing: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            set_completed_to_rewatching_on_first_episode: false,
            update_progress_when_rewatching: true,
            set_to_completed_after_last_episode_current: false,
            set_to_completed_after_last_episode_rewatching: true,
            add_entry_if_missing: false,
        }
    }
}

/// Per-invocation overrides, passed on the command line as JSON with
/// upper-case keys. Absent keys leave the configured value alone.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SyncOptionsPatch {
    pub set_completed_to_rewatching_on_first_episode: Option<bool>,
    pub update_progress_when_rewatching: Option<bool>,
    pub set_to_completed_after_last_episode_current: Option<bool>,
    pub set_to_completed_after_last_episode_rewatching: Option<bool>,
    pub add_entry_if_missing: Option<bool>,
}

impl SyncOptions {
    pub fn apply(&mut self, patch: SyncOptionsPatch) {
        let fields = [
            (
                &mut self.set_completed_to_rewatching_on_first_episode,
                patch.set_completed_to_rewatching_on_first_episode,
            ),
            (
                &mut self.update_progress_when_rewatching,
                patch.update_progress_when_rewatching,
            ),
            (
                &mut self.set_to_completed_after_last_episode_current,
                patch.set_to_completed_after_last_episode_current,
            ),
            (
                &mut self.set_to_completed_after_last_episode_rewatching,
                patch.set_to_completed_after_last_episode_rewatching,
            ),
            (&mut self.add_entry_if_missing, patch.add_entry_if_missing),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }

    /// Apply a JSON object of overrides such as `{"ADD_ENTRY_IF_MISSING": true}`.
    pub fn apply_json(&mut self, json: &str) -> Result<(), SyncError> {
        let patch: SyncOptionsPatch = serde_json::from_str(json)
            .map_err(|e| SyncError::Config(format!("invalid options JSON: {e}")))?;
        self.apply(patch);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub search_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let settings = ClientSettings::default();
        Self {
            url: settings.api_url,
            timeout_secs: settings.timeout.as_secs(),
            search_attempts: settings.search_attempts,
            retry_delay_ms: settings.retry_delay.as_millis() as u64,
        }
    }
}

impl From<&ApiConfig> for ClientSettings {
    fn from(config: &ApiConfig) -> Self {
        Self {
            api_url: config.url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            search_attempts: config.search_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_hours: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_hours: 24 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.ttl_hours))
    }
}

/// Overrides for the data file locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load the user config file, or the built-in defaults if there is none.
    pub fn load() -> Result<Self, SyncError> {
        Self::load_from(&Self::config_path())
    }

    /// Missing sections and keys fall back to their defaults.
    pub fn load_from(path: &Path) -> Result<Self, SyncError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|e| SyncError::Config(e.to_string()))?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            DEFAULT_CONFIG.to_string()
        };
        toml::from_str(&content)
            .map_err(|e| SyncError::Config(format!("{}: {e}", path.display())))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Where the access token is read from.
    pub fn token_path(&self) -> PathBuf {
        self.paths
            .token_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("token.txt"))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.paths
            .cache_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("cache.json"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "tsuiseki")
    }
}
