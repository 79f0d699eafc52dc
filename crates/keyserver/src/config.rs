//! Configuration loading and validation for the key server.
//!
//! All values are read from environment variables at startup. A missing
//! encryption key is deliberately not a startup failure: the endpoint
//! reports it per request as a misconfiguration, matching the behaviour the
//! client's fallback path expects.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated key server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The symmetric session key released to verified requests. Optional:
    /// when absent, the issuance endpoint answers 500 and the key is never
    /// invented.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// Plaintext verification token the client must present base64-encoded.
    #[serde(default = "default_verification_token")]
    pub verification_token: String,

    /// Maximum allowed clock skew between client and server, in seconds.
    #[serde(default = "default_freshness_window")]
    pub freshness_window_secs: u64,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_verification_token() -> String {
    "yournextdate-app".into()
}
fn default_freshness_window() -> u64 {
    300
}
fn default_port() -> u16 {
    8787
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or
    /// if validation fails.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.verification_token.trim().is_empty() {
            anyhow::bail!("VERIFICATION_TOKEN must not be empty");
        }
        if self.freshness_window_secs == 0 {
            anyhow::bail!("FRESHNESS_WINDOW_SECS must be > 0");
        }
        if let Some(key) = &self.encryption_key {
            if key.trim().is_empty() {
                anyhow::bail!("ENCRYPTION_KEY is set but empty");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            encryption_key: Some("test-key".into()),
            verification_token: default_verification_token(),
            freshness_window_secs: default_freshness_window(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_verification_token(), "yournextdate-app");
        assert_eq!(default_freshness_window(), 300);
        assert_eq!(default_port(), 8787);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn missing_key_is_allowed() {
        let cfg = Config {
            encryption_key: None,
            ..base_config()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_key() {
        let cfg = Config {
            encryption_key: Some("  ".into()),
            ..base_config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_window() {
        let cfg = Config {
            freshness_window_secs: 0,
            ..base_config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_token() {
        let cfg = Config {
            verification_token: "".into(),
            ..base_config()
        };
        assert!(cfg.validate().is_err());
    }
}
