//! Connection settings for the hosted table store.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Default transport timeout applied to every remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const URL_VAR: &str = "CLUBSYNC_URL";
pub const ANON_KEY_VAR: &str = "CLUBSYNC_ANON_KEY";
pub const TIMEOUT_VAR: &str = "CLUBSYNC_TIMEOUT_SECS";

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set.
    Missing(&'static str),
    /// A value is present but unusable.
    Invalid { field: &'static str, message: String },
    /// The JSON document could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "missing configuration: {} is not set", var),
            ConfigError::Invalid { field, message } => {
                write!(f, "invalid configuration for {}: {}", field, message)
            }
            ConfigError::Parse(msg) => write!(f, "configuration parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where the store lives and how to authenticate against it.
///
/// Built once at startup and handed to the REST clients; nothing reads it
/// from global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    url: String,
    anon_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct RawConfig {
    url: String,
    anon_key: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Validate and normalise a base url and key, with the default timeout.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let mut url = url.into().trim().to_string();
        let anon_key = anon_key.into().trim().to_string();

        let parsed = Url::parse(&url).map_err(|e| ConfigError::Invalid {
            field: "url",
            message: format!("{:?} is not a url: {}", url, e),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "url",
                message: format!("expected an http(s) url, got {:?}", url),
            });
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::Invalid {
                field: "url",
                message: "url has no host".into(),
            });
        }
        if anon_key.is_empty() {
            return Err(ConfigError::Invalid {
                field: "anon_key",
                message: "key must not be blank".into(),
            });
        }
        if !url.ends_with('/') {
            url.push('/');
        }

        Ok(Self {
            url,
            anon_key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Replace the transport timeout. Zero is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "timeout",
                message: "timeout must be greater than zero".into(),
            });
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Read `CLUBSYNC_URL`, `CLUBSYNC_ANON_KEY`, and optionally
    /// `CLUBSYNC_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(URL_VAR).ok_or(ConfigError::Missing(URL_VAR))?;
        let anon_key = lookup(ANON_KEY_VAR).ok_or(ConfigError::Missing(ANON_KEY_VAR))?;
        let config = Self::new(url, anon_key)?;

        match lookup(TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    field: "timeout",
                    message: format!("{}: {}", raw, e),
                })?;
                config.with_timeout(Duration::from_secs(secs))
            }
            None => Ok(config),
        }
    }

    /// Parse `{ "url": ..., "anon_key": ..., "timeout_secs": ... }`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = Self::new(raw.url, raw.anon_key)?;
        match raw.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => Ok(config),
        }
    }

    /// Base url, always ending in `/`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
