//! Board configuration, read from a RON file.
//!
//! Every field is optional in the file; missing ones take their defaults.
//!
//! ```ron
//! (
//!     jobs_url: "http://127.0.0.1:8000/jobs/",
//!     polling_time_ms: 2000,
//!     exit_when_idle: true,
//! )
//! ```

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use jobboard_engine::{Endpoints, FetchSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "./jobboard.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("could not parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("{field} is not a valid url: {url}")]
    InvalidUrl { field: &'static str, url: String },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub jobs_url: String,
    pub statuses_url: String,
    pub logs_url: String,
    pub polling_time_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_response_bytes: u64,
    /// Stop once every job is terminal and all requests have answered.
    pub exit_when_idle: bool,
    pub log_destination: LogDestination,
    pub verbose: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            jobs_url: "http://127.0.0.1:8000/jobs/".to_string(),
            statuses_url: "http://127.0.0.1:8000/jobs/statuses/".to_string(),
            logs_url: "http://127.0.0.1:8000/jobs/logs/".to_string(),
            polling_time_ms: 1000,
            connect_timeout_ms: fetch.connect_timeout.as_millis() as u64,
            request_timeout_ms: fetch.request_timeout.as_millis() as u64,
            max_response_bytes: fetch.max_bytes,
            exit_when_idle: false,
            log_destination: LogDestination::default(),
            verbose: false,
        }
    }
}

impl BoardConfig {
    /// Reads and validates the file at `path`. A missing file yields `None`.
    pub fn read_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let config = Self::parse(&content).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        Ok(Some(config))
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = ron::from_str(content).map_err(|err| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((field, url)) = self.endpoints().invalid_field() {
            return Err(ConfigError::InvalidUrl {
                field,
                url: url.to_string(),
            });
        }
        let required = [
            ("polling_time_ms", self.polling_time_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("max_response_bytes", self.max_response_bytes),
        ];
        match required.into_iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigError::Zero { field }),
            None => Ok(()),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            jobs_url: self.jobs_url.clone(),
            statuses_url: self.statuses_url.clone(),
            logs_url: self.logs_url.clone(),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_bytes: self.max_response_bytes,
        }
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_time_ms)
    }
}
