//! Configuration types for ifsc-ledger

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Placeholder replaced by the lookup code in an endpoint template
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Positional placeholder accepted as an alias for [`CODE_PLACEHOLDER`]
pub const POSITIONAL_PLACEHOLDER: &str = "{}";

/// Main configuration for the resolver and record store
///
/// Every field has a default, so an empty JSON object (`{}`) is a valid
/// configuration file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Lookup endpoints in priority order (first is preferred)
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,

    /// Per-endpoint retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Timeout applied to each individual request (default: 5 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Record store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Code looked up when the caller leaves the input blank (default: "SBIN0000001")
    #[serde(default = "default_code")]
    pub default_code: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            retry: RetryConfig::default(),
            request_timeout: default_request_timeout(),
            store: StoreConfig::default(),
            default_code: default_code(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                format!("cannot read config file {}: {}", path.display(), e),
                "config_file",
            )
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::config(
                format!("invalid config file {}: {}", path.display(), e),
                "config_file",
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(Error::config(
                "at least one lookup endpoint is required",
                "endpoints",
            ));
        }
        for endpoint in &self.endpoints {
            if !endpoint.has_placeholder() {
                return Err(Error::config(
                    format!(
                        "endpoint '{}' has no {} placeholder: {}",
                        endpoint.name, CODE_PLACEHOLDER, endpoint.url_template
                    ),
                    "endpoints",
                ));
            }
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "max_attempts must be at least 1",
                "retry.max_attempts",
            ));
        }
        let multiplier = self.retry.backoff_multiplier;
        if multiplier.is_nan() || multiplier < 1.0 {
            return Err(Error::config(
                "backoff_multiplier must be >= 1.0",
                "retry.backoff_multiplier",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::config(
                "request_timeout must be greater than zero",
                "request_timeout",
            ));
        }
        if self.default_code.trim().is_empty() {
            return Err(Error::config(
                "default_code must not be blank",
                "default_code",
            ));
        }
        Ok(())
    }
}

/// A lookup service reachable over HTTP GET
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Short label used in logs (e.g., "razorpay")
    pub name: String,

    /// URL with a `{code}` (or `{}`) placeholder in a path segment
    pub url_template: String,
}

impl EndpointConfig {
    /// Create an endpoint from a name and URL template
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    /// Whether the template contains a code placeholder
    pub fn has_placeholder(&self) -> bool {
        self.url_template.contains(CODE_PLACEHOLDER)
            || self.url_template.contains(POSITIONAL_PLACEHOLDER)
    }

    /// Substitute an already-encoded code into the template
    pub fn render(&self, encoded_code: &str) -> String {
        self.url_template
            .replace(CODE_PLACEHOLDER, encoded_code)
            .replace(POSITIONAL_PLACEHOLDER, encoded_code)
    }
}

/// Retry configuration for failed lookup tries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total tries per endpoint, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed try (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between tries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Record store configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// CSV file that receives one row per lookup (default: "IFSC_CODE.csv")
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new("razorpay", "https://ifsc.razorpay.com/{code}"),
        EndpointConfig::new("bankifsccode", "https://ifsc.bankifsccode.com/{code}"),
    ]
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_code() -> String {
    "SBIN0000001".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_store_path() -> PathBuf {
    PathBuf::from("IFSC_CODE.csv")
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
