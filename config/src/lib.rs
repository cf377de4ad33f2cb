//! Configuration for IdeaScore.
//!
//! The file lives at `~/.ideascore/config.toml`. Every section and every key
//! is optional; [`IdeaScoreConfig::resolve`] fills the gaps with defaults and
//! applies environment overrides, producing fully-typed [`Settings`].
//!
//! String values may reference environment variables as `${VAR}`.

use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use ideascore_types::{DEFAULT_LANGUAGE, DEFAULT_STAGES, canonical_language};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 8_000;
pub const DEFAULT_CADENCE_MS: u64 = 1_000;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_RECORDING_SECS: u64 = 120;
pub const DEFAULT_SESSION: &str = "default";

pub const ENV_API_URL: &str = "IDEASCORE_API_URL";
pub const ENV_API_KEY: &str = "IDEASCORE_API_KEY";
pub const ENV_SESSION: &str = "IDEASCORE_SESSION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid scoring base_url '{value}': {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Default, Deserialize)]
pub struct IdeaScoreConfig {
    pub scoring: Option<ScoringConfig>,
    pub progress: Option<ProgressConfig>,
    pub capture: Option<CaptureConfig>,
    pub session: Option<SessionConfig>,
}

#[derive(Default, Deserialize)]
pub struct ScoringConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Total wait ceiling for one evaluation, across all attempts.
    pub timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ScoringConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &mask(self.api_key.as_ref()))
            .field("timeout_secs", &self.timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .field("max_backoff_ms", &self.max_backoff_ms)
            .finish()
    }
}

fn mask(opt: Option<&String>) -> &'static str {
    if opt.is_some() { "[REDACTED]" } else { "None" }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressConfig {
    pub cadence_ms: Option<u64>,
    pub stages: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CaptureConfig {
    pub max_upload_bytes: Option<u64>,
    pub max_recording_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    pub name: Option<String>,
    pub language: Option<String>,
}

/// Resolved configuration with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub scoring: ScoringSettings,
    pub progress: ProgressSettings,
    pub capture: CaptureSettings,
    pub session: SessionSettings,
}

#[derive(Clone, PartialEq)]
pub struct ScoringSettings {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl std::fmt::Debug for ScoringSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringSettings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &mask(self.api_key.as_ref()))
            .field("timeout", &self.timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff", &self.initial_backoff)
            .field("max_backoff", &self.max_backoff)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSettings {
    pub cadence: Duration,
    pub stages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub max_upload_bytes: u64,
    pub max_recording: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub name: String,
    pub language: String,
}

pub fn expand_env_vars(value: &str) -> String {
    expand_with(value, &|name| env::var(name).ok())
}

fn expand_with(value: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                out.push_str(&lookup(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            _ => {
                // Unclosed or empty reference: keep it literally.
                out.push_str("${");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

impl IdeaScoreConfig {
    /// Load `~/.ideascore/config.toml`. A missing file is not an error.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    /// Apply defaults and overrides from the process environment.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        self.resolve_with(&|name| env::var(name).ok())
    }

    /// Like [`resolve`](Self::resolve), reading variables through `lookup`.
    pub fn resolve_with(
        &self,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Settings, ConfigError> {
        let expand = |value: &String| expand_with(value, lookup);
        let non_empty = |value: String| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        let scoring = self.scoring.as_ref();
        let base_url = lookup(ENV_API_URL)
            .and_then(non_empty)
            .or_else(|| scoring.and_then(|s| s.base_url.as_ref()).map(expand))
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|source| ConfigError::InvalidUrl {
            value: base_url.clone(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "scoring.base_url",
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            });
        }

        let api_key = lookup(ENV_API_KEY)
            .and_then(non_empty)
            .or_else(|| {
                scoring
                    .and_then(|s| s.api_key.as_ref())
                    .map(expand)
                    .and_then(non_empty)
            });

        let pick = |get: fn(&ScoringConfig) -> Option<u64>, default: u64| {
            scoring.and_then(get).unwrap_or(default)
        };
        let timeout_secs = pick(|s| s.timeout_secs, DEFAULT_TIMEOUT_SECS);
        let request_timeout_secs = pick(|s| s.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 || request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "scoring.timeout_secs",
                reason: "timeouts must be greater than zero".to_string(),
            });
        }
        let initial_backoff_ms = pick(|s| s.initial_backoff_ms, DEFAULT_INITIAL_BACKOFF_MS);
        let max_backoff_ms = pick(|s| s.max_backoff_ms, DEFAULT_MAX_BACKOFF_MS).max(initial_backoff_ms);

        let progress = self.progress.as_ref();
        let cadence_ms = progress
            .and_then(|p| p.cadence_ms)
            .unwrap_or(DEFAULT_CADENCE_MS);
        if cadence_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "progress.cadence_ms",
                reason: "cadence must be greater than zero".to_string(),
            });
        }
        let stages: Vec<String> = progress
            .and_then(|p| p.stages.as_ref())
            .map(|stages| {
                stages
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .filter(|stages: &Vec<String>| !stages.is_empty())
            .unwrap_or_else(|| DEFAULT_STAGES.iter().map(|s| (*s).to_string()).collect());

        let capture = self.capture.as_ref();
        let session = self.session.as_ref();

        Ok(Settings {
            scoring: ScoringSettings {
                base_url,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
                request_timeout: Duration::from_secs(request_timeout_secs),
                max_retries: scoring
                    .and_then(|s| s.max_retries)
                    .unwrap_or(DEFAULT_MAX_RETRIES),
                initial_backoff: Duration::from_millis(initial_backoff_ms),
                max_backoff: Duration::from_millis(max_backoff_ms),
            },
            progress: ProgressSettings {
                cadence: Duration::from_millis(cadence_ms),
                stages,
            },
            capture: CaptureSettings {
                max_upload_bytes: capture
                    .and_then(|c| c.max_upload_bytes)
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
                max_recording: Duration::from_secs(
                    capture
                        .and_then(|c| c.max_recording_secs)
                        .unwrap_or(DEFAULT_MAX_RECORDING_SECS),
                ),
            },
            session: SessionSettings {
                name: lookup(ENV_SESSION)
                    .and_then(non_empty)
                    .or_else(|| session.and_then(|s| s.name.clone()).and_then(non_empty))
                    .unwrap_or_else(|| DEFAULT_SESSION.to_string()),
                language: session
                    .and_then(|s| s.language.as_deref())
                    .map_or_else(|| DEFAULT_LANGUAGE.to_string(), canonical_language),
            },
        })
    }
}

pub fn config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

/// `~/.ideascore`, parent of the config file, logs, and session records.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ideascore"))
}
