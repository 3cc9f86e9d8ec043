//! Construction-time configuration for the [`Authenticator`](crate::Authenticator).
//!
//! Configuration is fixed when the authenticator is built and never changes
//! afterwards. It can be assembled in code or loaded from environment
//! variables:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `JWT_BEARER_AUDIENCE` | Comma-separated accepted audiences | (required unless skipped) |
//! | `JWT_BEARER_SKIP_AUDIENCE_CHECK` | Disable the audience check | `false` |
//! | `JWT_BEARER_PASS_REQUEST_CONTEXT` | Hand the request context to resolvers | `false` |
//! | `JWT_BEARER_CLOCK_SKEW_SECONDS` | Leeway applied to `exp` and `nbf` | `0` |
//! | `JWT_BEARER_MAX_ASSERTION_BYTES` | Maximum assertion size | `8192` |

use crate::jwt::MAX_ASSERTION_SIZE_BYTES;
use crate::policy::MAX_CLOCK_SKEW;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT bearer authentication requires an audience option")]
    MissingAudience,

    #[error("Clock skew of {0}s exceeds maximum of {max}s", max = MAX_CLOCK_SKEW.as_secs())]
    ClockSkewTooLarge(u64),

    #[error("Maximum assertion size must be greater than zero")]
    InvalidMaxAssertionBytes,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Authenticator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorConfig {
    /// Accepted `aud` values. Required unless `skip_audience_check` is set.
    pub audiences: Vec<String>,

    /// Skip the audience check entirely.
    pub skip_audience_check: bool,

    /// Pass the request context to the resolvers.
    pub pass_request_context: bool,

    /// Leeway applied to `exp` and `nbf`.
    pub clock_skew: Duration,

    /// Assertions longer than this are rejected before decoding.
    pub max_assertion_bytes: usize,
}

impl Default for AuthenticatorConfig {
    fn default() -> Self {
        Self {
            audiences: Vec::new(),
            skip_audience_check: false,
            pass_request_context: false,
            clock_skew: Duration::ZERO,
            max_assertion_bytes: MAX_ASSERTION_SIZE_BYTES,
        }
    }
}

impl AuthenticatorConfig {
    /// Configuration accepting a single audience.
    #[must_use]
    pub fn with_audience(audience: impl Into<String>) -> Self {
        Self::with_audiences([audience])
    }

    /// Configuration accepting any of the given audiences.
    #[must_use]
    pub fn with_audiences<S: Into<String>>(audiences: impl IntoIterator<Item = S>) -> Self {
        Self {
            audiences: audiences.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Configuration that does not check the audience.
    #[must_use]
    pub fn skipping_audience_check() -> Self {
        Self {
            skip_audience_check: true,
            ..Self::default()
        }
    }

    /// Enable or disable passing the request context to resolvers.
    #[must_use]
    pub fn pass_request_context(mut self, enabled: bool) -> Self {
        self.pass_request_context = enabled;
        self
    }

    /// Set the leeway applied to `exp` and `nbf`.
    #[must_use]
    pub fn clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    /// Set the maximum accepted assertion size.
    #[must_use]
    pub fn max_assertion_bytes(mut self, max_bytes: usize) -> Self {
        self.max_assertion_bytes = max_bytes;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatorConfig::from_vars`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparseable values and any
    /// error from [`AuthenticatorConfig::validate`].
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let audiences = vars
            .get("JWT_BEARER_AUDIENCE")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|aud| !aud.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let skip_audience_check = parse_bool(vars, "JWT_BEARER_SKIP_AUDIENCE_CHECK")?;
        let pass_request_context = parse_bool(vars, "JWT_BEARER_PASS_REQUEST_CONTEXT")?;

        let clock_skew = match parse_number::<u64>(vars, "JWT_BEARER_CLOCK_SKEW_SECONDS")? {
            Some(secs) => Duration::from_secs(secs),
            None => Duration::ZERO,
        };

        let max_assertion_bytes = parse_number::<usize>(vars, "JWT_BEARER_MAX_ASSERTION_BYTES")?
            .unwrap_or(MAX_ASSERTION_SIZE_BYTES);

        let config = AuthenticatorConfig {
            audiences,
            skip_audience_check,
            pass_request_context,
            clock_skew,
            max_assertion_bytes,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// - `MissingAudience` - no non-empty audience while the audience check is enabled
    /// - `ClockSkewTooLarge` - clock skew above [`MAX_CLOCK_SKEW`]
    /// - `InvalidMaxAssertionBytes` - maximum assertion size of zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.skip_audience_check && self.audiences.iter().all(String::is_empty) {
            return Err(ConfigError::MissingAudience);
        }

        if self.clock_skew > MAX_CLOCK_SKEW {
            return Err(ConfigError::ClockSkewTooLarge(self.clock_skew.as_secs()));
        }

        if self.max_assertion_bytes == 0 {
            return Err(ConfigError::InvalidMaxAssertionBytes);
        }

        Ok(())
    }
}

fn parse_bool(vars: &HashMap<String, String>, name: &str) -> Result<bool, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(false);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.clone(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, ConfigError> {
    vars.get(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw.clone(),
            })
        })
        .transpose()
}
