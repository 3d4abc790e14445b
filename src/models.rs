//! Data models and structures
//!
//! Defines the run configuration, the upload plan types, and the JSON wire
//! format of the CDN control-plane API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_BASE: &str = "https://api.qhy04.com/hutaocdn";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const TOKEN_ENV: &str = "SNAP_HUTAO_CDN_TOKEN";

// Control-plane API request/response models
#[derive(Debug, Serialize)]
pub struct KeyRequest<'a> {
    pub token: &'a str,
    pub key: &'a str,
}

/// Envelope shared by every control-plane response. `retcode == 0` means success.
/// `data` stays untyped until the retcode has been checked.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub retcode: i64,
    pub message: Option<String>,
    pub data: Option<serde_json::Value>,
}

/// Cache action performed once after every upload of a run succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostAction {
    #[default]
    None,
    Preheat,
    Refresh,
}

impl PostAction {
    /// Parse a selector string. Unknown selectors fall back to `None` with a warning.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Self::None,
            "preheat" => Self::Preheat,
            "refresh" => Self::Refresh,
            other => {
                warn!(
                    "Unknown post action '{}', expected none, preheat or refresh. Skipping.",
                    other
                );
                Self::None
            }
        }
    }
}

impl fmt::Display for PostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Preheat => "preheat",
            Self::Refresh => "refresh",
        };
        f.write_str(name)
    }
}

/// One file of the upload plan and the CDN key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub key: String,
    pub path: PathBuf,
}

/// Per-key state held by the orchestrator while a file is being written to
/// every destination.
#[derive(Debug)]
pub struct UploadSession {
    pub key: String,
    pub path: PathBuf,
    pub destinations: Vec<String>,
}

/// Outcome of one fully uploaded key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUpload {
    pub key: String,
    pub destinations: usize,
    pub bytes: u64,
}

/// Everything a single run needs besides the configuration.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub key: Option<String>,
    pub post_action: PostAction,
    pub dry_run: bool,
}

impl UploadRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: None,
            post_action: PostAction::None,
            dry_run: false,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_post_action(mut self, post_action: PostAction) -> Self {
        self.post_action = post_action;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub key: String,
    pub files: usize,
    pub destinations: usize,
    pub bytes: u64,
    pub post_action: PostAction,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(token: impl Into<String>) -> crate::Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(crate::Error::Configuration("Token cannot be empty".to_string()));
        }

        Ok(Self {
            token,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Load configuration from the environment and `.env`. An explicit token
    /// takes precedence over `SNAP_HUTAO_CDN_TOKEN`.
    pub fn from_env(token: Option<String>) -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let token = token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                crate::Error::Configuration(format!(
                    "Token is required. Please pass --token or set the {} environment variable",
                    TOKEN_ENV
                ))
            })?;

        let mut config = Self::new(token)?;
        if let Ok(base) = std::env::var("CDN_API_BASE") {
            config = config.with_api_base(base);
        }
        if let Some(timeout) = parse_timeout(std::env::var("CDN_TIMEOUT_SECS").ok().as_deref())? {
            config = config.with_timeout(timeout);
        }

        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_timeout(value: Option<&str>) -> crate::Result<Option<Duration>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(|secs| Some(Duration::from_secs(secs)))
            .ok_or_else(|| {
                crate::Error::Configuration(format!(
                    "CDN_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
                    raw
                ))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_action_selector() {
        assert_eq!(PostAction::from_selector("none"), PostAction::None);
        assert_eq!(PostAction::from_selector(""), PostAction::None);
        assert_eq!(PostAction::from_selector("preheat"), PostAction::Preheat);
        assert_eq!(PostAction::from_selector(" Refresh "), PostAction::Refresh);
        assert_eq!(PostAction::from_selector("purge"), PostAction::None);
    }

    #[test]
    fn test_key_request_serialization() {
        let json = serde_json::to_string(&KeyRequest {
            token: "secret",
            key: "dist/a.txt",
        })
        .unwrap();
        assert_eq!(json, r#"{"token":"secret","key":"dist/a.txt"}"#);
    }

    #[test]
    fn test_api_response_without_data() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"retcode":1,"message":"bad token"}"#).unwrap();
        assert_eq!(resp.retcode, 1);
        assert_eq!(resp.message.as_deref(), Some("bad token"));
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_config_rejects_blank_token() {
        assert!(Config::new("  ").is_err());

        let config = Config::new("token").unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_config_api_base_trims_trailing_slash() {
        let config = Config::new("token")
            .unwrap()
            .with_api_base("http://127.0.0.1:8080/");
        assert_eq!(config.api_base, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(None).unwrap(), None);
        assert_eq!(
            parse_timeout(Some("30")).unwrap(),
            Some(Duration::from_secs(30))
        );
        assert!(parse_timeout(Some("0")).is_err());
        assert!(parse_timeout(Some("soon")).is_err());
    }
}
