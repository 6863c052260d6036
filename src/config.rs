//! Application configuration.
//!
//! Values are read with the `config` crate from an optional TOML file and
//! from `TASKBOARD__<SECTION>__<KEY>` environment variables. Every section
//! has serde defaults, so only the token secret must be supplied.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::task::domain::PageLimits;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "TASKBOARD";

/// Shortest accepted token signing secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime (30 days), in seconds.
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or deserialised.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A loaded value is outside its accepted range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration for the task tracker core.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Token signing settings.
    pub auth: AuthConfig,
    /// Page size defaults and limits.
    pub pagination: PaginationConfig,
    /// Notification queue settings.
    pub notifications: NotificationConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Token signing settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign identity tokens.
    pub token_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Issuer claim written into and required from every token.
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: 30 * 60,
            issuer: "taskboard".to_owned(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Page size defaults and limits for task listings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when a request names none.
    pub default_page_size: u32,
    /// Largest page size; larger requests are clamped.
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Returns the limits used when building page requests.
    #[must_use]
    pub const fn limits(&self) -> PageLimits {
        PageLimits::new(self.default_page_size, self.max_page_size)
    }
}

/// Notification queue settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Number of events the queue holds before new events are dropped.
    pub queue_capacity: usize,
    /// Number of delivery workers consuming the queue.
    pub workers: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            workers: 2,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emits JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be deserialised or a
    /// value fails validation.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration from an optional TOML file, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be deserialised or a
    /// value fails validation.
    pub fn load_from(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = path {
            builder = builder.add_source(config::File::from(file).required(true));
        }
        let loaded: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        tracing::debug!(config = ?loaded, "configuration loaded");
        Ok(loaded)
    }

    /// Validates value ranges across all sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.token_secret.len() < MIN_SECRET_LENGTH {
            return Err(invalid(
                "auth.token_secret",
                format!("must be at least {MIN_SECRET_LENGTH} bytes"),
            ));
        }
        if self.auth.token_ttl_secs == 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(invalid(
                "auth.token_ttl_secs",
                format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
            ));
        }
        if self.auth.issuer.trim().is_empty() {
            return Err(invalid("auth.issuer", "must not be empty".to_owned()));
        }
        if self.pagination.default_page_size == 0 {
            return Err(invalid(
                "pagination.default_page_size",
                "must be positive".to_owned(),
            ));
        }
        if self.pagination.default_page_size > self.pagination.max_page_size {
            return Err(invalid(
                "pagination.default_page_size",
                "must not exceed pagination.max_page_size".to_owned(),
            ));
        }
        if self.notifications.queue_capacity == 0 {
            return Err(invalid(
                "notifications.queue_capacity",
                "must be positive".to_owned(),
            ));
        }
        if self.notifications.workers == 0 {
            return Err(invalid(
                "notifications.workers",
                "must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

const fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
