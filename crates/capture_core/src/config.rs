use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Root under which every invocation creates its own working directory.
pub const DEFAULT_CAPTURE_ROOT: &str = "/tmp/page-capture";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_ASSETS: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Limits applied by the page-capture engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchLimits {
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub max_assets: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_bytes: DEFAULT_MAX_BYTES,
            max_assets: DEFAULT_MAX_ASSETS,
        }
    }
}

/// Immutable per-process configuration, loaded once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub capture_url: String,
    pub subdir_prefix: String,
    pub bucket: String,
    pub key_prefix: String,
    pub capture_root: PathBuf,
    pub log_level: String,
    pub limits: FetchLimits,
}

impl JobConfig {
    /// Build a configuration from a variable lookup (normally `std::env::var`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let capture_url = required(&lookup, "CAPTURE_URL")?;
        validate_url(&capture_url)?;

        let subdir_prefix = required(&lookup, "SUBDIR_PREFIX")?;
        if subdir_prefix.contains(['/', '\\']) || subdir_prefix == ".." || subdir_prefix == "." {
            return Err(ConfigError::Invalid {
                name: "SUBDIR_PREFIX",
                message: "must be a single folder name".into(),
            });
        }

        let bucket = required(&lookup, "S3_BUCKET_NAME")?;
        // An empty key prefix uploads to the bucket root.
        let key_prefix = lookup("S3_PATH").ok_or(ConfigError::Missing("S3_PATH"))?;

        let capture_root = lookup("CAPTURE_ROOT")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CAPTURE_ROOT));

        let log_level = lookup("CAPTURE_LOG_LEVEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        let defaults = FetchLimits::default();
        let limits = FetchLimits {
            request_timeout: optional_number(&lookup, "CAPTURE_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_bytes: optional_number(&lookup, "CAPTURE_MAX_BYTES")?
                .unwrap_or(defaults.max_bytes),
            max_assets: optional_number(&lookup, "CAPTURE_MAX_ASSETS")?
                .map(|n| n as usize)
                .unwrap_or(defaults.max_assets),
        };

        Ok(Self {
            capture_url,
            subdir_prefix,
            bucket,
            key_prefix,
            capture_root,
            log_level,
            limits,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional_number<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|err| ConfigError::Invalid {
                name,
                message: err.to_string(),
            }),
    }
}

fn validate_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|err| ConfigError::Invalid {
        name: "CAPTURE_URL",
        message: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            name: "CAPTURE_URL",
            message: format!("unsupported scheme {other}"),
        }),
    }
}
