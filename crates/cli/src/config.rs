//! Driver configuration loaded from environment variables.

use domain::{RetryPolicy, UserId};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Driver configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `CART_LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `CART_USER_ID`: owner of the scripted cart (default: `1`)
/// - `CART_MAX_APPEND_ATTEMPTS`: attempts per command on append conflicts (default: `3`)
///
/// Unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub user_id: UserId,
    pub max_append_attempts: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("CART_LOG_FORMAT")
                .and_then(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            user_id: lookup("CART_USER_ID")
                .and_then(|id| id.trim().parse::<u64>().ok())
                .map(UserId::new)
                .unwrap_or(defaults.user_id),
            max_append_attempts: lookup("CART_MAX_APPEND_ATTEMPTS")
                .and_then(|n| n.trim().parse().ok())
                .unwrap_or(defaults.max_append_attempts),
        }
    }

    /// Returns the retry policy for command execution.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_append_attempts)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            user_id: UserId::new(1),
            max_append_attempts: 3,
        }
    }
}
