//! Global piclock configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_TOKEN_EXPIRED_MARKER;
use crate::error::{ClockError, ClockResult};

static DEFAULT_DATA_DIR: &str = "~/calendar";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_events_file() -> PathBuf {
    PathBuf::from("events.txt")
}

fn default_response_file() -> PathBuf {
    PathBuf::from("response.edc")
}

fn default_token_expired_marker() -> String {
    DEFAULT_TOKEN_EXPIRED_MARKER.to_string()
}

/// Configuration at ~/.config/piclock/config.toml
///
/// Every key is optional; a missing file means all defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Working directory of the fetcher, and where its files land
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_events_file")]
    pub events_file: PathBuf,

    #[serde(default = "default_response_file")]
    pub response_file: PathBuf,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default = "default_token_expired_marker")]
    pub token_expired_marker: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            data_dir: default_data_dir(),
            events_file: default_events_file(),
            response_file: default_response_file(),
            fetch: FetchConfig::default(),
            schedule: ScheduleConfig::default(),
            token_expired_marker: default_token_expired_marker(),
        }
    }
}

/// The external fetcher command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            command: "python".to_string(),
            args: vec!["clock.py".to_string()],
        }
    }
}

/// Countdown lengths, in seconds (ticks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Delay before the first fetch after startup
    pub startup_delay: u32,
    /// Countdown value at which the fetcher is launched
    pub pre_fire_offset: u32,
    /// Interval after a successful refresh
    pub refresh_period: u32,
    /// Interval after a failed refresh, while retries remain
    pub retry_interval: u32,
    /// Failures before falling back to `refresh_period`
    pub retry_limit: u32,
    /// Replaces `refresh_period` in test mode
    pub test_refresh_period: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            startup_delay: 25,
            pre_fire_offset: 10,
            refresh_period: 60 * 60,
            retry_interval: 60 * 2,
            retry_limit: 4,
            test_refresh_period: 60,
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> ClockResult<()> {
        let offset = self.pre_fire_offset;
        if offset == 0 {
            return Err(ClockError::Config("pre_fire_offset must be positive".into()));
        }
        let intervals = [
            ("startup_delay", self.startup_delay),
            ("refresh_period", self.refresh_period),
            ("retry_interval", self.retry_interval),
            ("test_refresh_period", self.test_refresh_period),
        ];
        for (name, value) in intervals {
            if value <= offset {
                return Err(ClockError::Config(format!(
                    "{name} ({value}s) must be longer than pre_fire_offset ({offset}s)"
                )));
            }
        }
        if self.retry_limit == 0 {
            return Err(ClockError::Config("retry_limit must be at least 1".into()));
        }
        Ok(())
    }
}

/// Resolved locations of the two files shared with the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPaths {
    pub data_dir: PathBuf,
    pub events: PathBuf,
    pub response: PathBuf,
}

impl ClockConfig {
    pub fn config_path() -> ClockResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ClockError::Config("Could not determine config directory".into()))?
            .join("piclock");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> ClockResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> ClockResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ClockConfig::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ClockError::Config(format!("Could not read config file: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ClockResult<Self> {
        let config: ClockConfig =
            toml::from_str(content).map_err(|e| ClockError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ClockResult<()> {
        if self.token_expired_marker.is_empty() {
            return Err(ClockError::Config(
                "token_expired_marker must not be empty".into(),
            ));
        }
        self.schedule.validate()
    }

    /// Expand `~` in `data_dir` and join the file names onto it.
    pub fn paths(&self) -> ClockResult<FetchPaths> {
        let data_dir = expand_path(&self.data_dir)?;
        Ok(FetchPaths {
            events: data_dir.join(&self.events_file),
            response: data_dir.join(&self.response_file),
            data_dir,
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ClockResult<()> {
        let schedule = ScheduleConfig::default();
        let contents = format!(
            "\
# piclock configuration

# Where the fetcher runs and writes its files:
# data_dir = \"{DEFAULT_DATA_DIR}\"
# events_file = \"events.txt\"
# response_file = \"response.edc\"

# Text in the fetcher's stderr meaning the OAuth token must be renewed:
# token_expired_marker = \"{DEFAULT_TOKEN_EXPIRED_MARKER}\"

# [fetch]
# command = \"python\"
# args = [\"clock.py\"]

# All values in seconds, except retry_limit:
# [schedule]
# startup_delay = {}
# pre_fire_offset = {}
# refresh_period = {}
# retry_interval = {}
# retry_limit = {}
# test_refresh_period = {}
",
            schedule.startup_delay,
            schedule.pre_fire_offset,
            schedule.refresh_period,
            schedule.retry_interval,
            schedule.retry_limit,
            schedule.test_refresh_period,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClockError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ClockError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand_path(path: &Path) -> ClockResult<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| ClockError::Config(format!("Path is not valid UTF-8: {}", path.display())))?;
    let expanded = shellexpand::tilde(raw);
    Ok(PathBuf::from(expanded.as_ref()))
}
