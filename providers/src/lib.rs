//! Client for the remote idea scoring service.
//!
//! # Architecture
//!
//! - [`ScoringService`] - the seam the evaluation engine talks to. One call
//!   per job, returning either a [`ScoringResponse`] or a classified
//!   [`ScoringError`].
//! - [`HttpScoringClient`] - the production implementation, issuing
//!   `POST {base_url}/api/evaluate/analyze` through [`retry::send_with_retry`].
//! - [`wire`] - request/response JSON shapes.
//!
//! # Error Classification
//!
//! | Response | Error | Retried |
//! |----------|-------|---------|
//! | 401, 403 | `Auth` | no |
//! | other 4xx | `Validation` | no |
//! | 5xx | `Server` | yes, then surfaced |
//! | connect failure | `Connection` | yes, then surfaced |
//! | per-attempt timeout | `Timeout` | yes, then surfaced |
//! | undecodable 2xx body | `Decode` | no |

pub mod retry;
pub mod wire;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use ideascore_types::ErrorKind;

pub use ideascore_types;
pub use retry::RetryConfig;
pub use wire::{ErrorBody, ScoringRequest, ScoringResponse};

/// Path of the analysis endpoint, relative to the service base URL.
pub const ANALYZE_PATH: &str = "api/evaluate/analyze";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

pub type ScoreFut<'a> =
    Pin<Box<dyn Future<Output = Result<ScoringResponse, ScoringError>> + Send + 'a>>;

/// Something that can score an idea.
///
/// Implementations perform their own retries; callers issue exactly one
/// `score` call per evaluation job and bound it with their own deadline.
pub trait ScoringService: Send + Sync {
    fn score(&self, request: ScoringRequest) -> ScoreFut<'_>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("request rejected ({status}): {message}")]
    Validation {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("not authorized ({status}): {message}")]
    Auth { status: u16, message: String },
    #[error("scoring service error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("could not reach scoring service after {attempts} attempt(s): {message}")]
    Connection { attempts: u32, message: String },
    #[error("scoring request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },
    #[error("malformed scoring response: {message}")]
    Decode { message: String },
}

impl ScoringError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Server { .. } | Self::Connection { .. } | Self::Decode { .. } => {
                ErrorKind::Server
            }
        }
    }

    /// Classify a non-2xx response from its status and body.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed = ErrorBody::parse(body);
        let fallback = status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string);
        let message = parsed.describe(&fallback);
        let code = status.as_u16();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth {
                status: code,
                message,
            },
            s if s.is_client_error() => Self::Validation {
                status: code,
                code: parsed.code,
                message,
            },
            _ => Self::Server {
                status: code,
                message,
            },
        }
    }
}

#[derive(Clone)]
pub struct ScoringClientConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    /// Ceiling for a single attempt, including reading the body.
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

// Manual Debug impl to prevent leaking the API key in logs.
impl std::fmt::Debug for ScoringClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ScoringClientConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
            request_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{ANALYZE_PATH}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

/// HTTPS is required except for loopback hosts, which local development
/// and tests use.
fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    http: reqwest::Client,
    endpoint: String,
    config: ScoringClientConfig,
}

impl HttpScoringClient {
    pub fn new(config: ScoringClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .https_only(!is_loopback(&config.base_url))
            .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
            .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint(),
            config,
        })
    }

    async fn analyze(&self, request: ScoringRequest) -> Result<ScoringResponse, ScoringError> {
        let build = || {
            let builder = self.http.post(&self.endpoint).json(&request);
            match &self.config.api_key {
                Some(key) => builder.bearer_auth(key),
                None => builder,
            }
        };

        match retry::send_with_retry(build, &self.config.retry).await {
            retry::RetryOutcome::Success(response) => {
                let bytes = response.bytes().await.map_err(|e| {
                    if e.is_timeout() {
                        ScoringError::Timeout { attempts: 1 }
                    } else {
                        ScoringError::Connection {
                            attempts: 1,
                            message: e.to_string(),
                        }
                    }
                })?;
                serde_json::from_slice(&bytes).map_err(|e| ScoringError::Decode {
                    message: e.to_string(),
                })
            }
            retry::RetryOutcome::HttpError(response) => {
                let status = response.status();
                let body = read_capped_error_body(response).await;
                tracing::warn!(status = %status, "Scoring service returned an error");
                Err(ScoringError::from_status(status, &body))
            }
            retry::RetryOutcome::ConnectionError { attempts, source } => {
                tracing::warn!(attempts, error = %source, "Scoring service unreachable");
                if source.is_timeout() {
                    Err(ScoringError::Timeout { attempts })
                } else {
                    Err(ScoringError::Connection {
                        attempts,
                        message: source.to_string(),
                    })
                }
            }
        }
    }
}

impl ScoringService for HttpScoringClient {
    fn score(&self, request: ScoringRequest) -> ScoreFut<'_> {
        Box::pin(self.analyze(request))
    }
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
