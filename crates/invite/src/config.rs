//! Client configuration for the invitation core.
//!
//! All values are read from environment variables. Remote-store credentials
//! and the key endpoint are optional: their absence degrades the session to
//! demo mode / the fallback key instead of failing startup.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Full URL of the key-issuance endpoint. `None` means the session runs
    /// on the fallback key.
    #[serde(default)]
    pub key_endpoint: Option<String>,

    /// Publicly-known key used when the endpoint is absent or unreachable.
    /// Provides availability, not confidentiality.
    #[serde(default = "default_fallback_key")]
    pub fallback_key: String,

    /// Plaintext verification token sent (base64-encoded) with key requests.
    #[serde(default = "default_verification_token")]
    pub verification_token: String,

    /// Timeout on the key-retrieval request, in seconds.
    #[serde(default = "default_key_request_timeout")]
    pub key_request_timeout_secs: u64,

    /// Supabase project URL. Missing → demo mode.
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Supabase anonymous API key. Missing → demo mode.
    #[serde(default)]
    pub supabase_anon_key: Option<String>,

    /// Directory the local demo backend writes invitation records into.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Retention window for demo-mode and link records, in hours.
    #[serde(default = "default_demo_retention")]
    pub demo_retention_hours: i64,

    /// Retention window for remote-store records, in hours.
    #[serde(default = "default_remote_retention")]
    pub remote_retention_hours: i64,
}

fn default_fallback_key() -> String {
    "yournextdate-default-key-change-this-in-production".into()
}
fn default_verification_token() -> String {
    "yournextdate-app".into()
}
fn default_key_request_timeout() -> u64 {
    10
}
fn default_data_dir() -> String {
    ".yournextdate".into()
}
fn default_demo_retention() -> i64 {
    24
}
fn default_remote_retention() -> i64 {
    168
}

impl ClientConfig {
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

        let c: ClientConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.fallback_key.trim().is_empty() {
            anyhow::bail!("FALLBACK_KEY must not be empty");
        }
        if self.verification_token.trim().is_empty() {
            anyhow::bail!("VERIFICATION_TOKEN must not be empty");
        }
        if self.key_request_timeout_secs == 0 {
            anyhow::bail!("KEY_REQUEST_TIMEOUT_SECS must be > 0");
        }
        if self.demo_retention_hours <= 0 {
            anyhow::bail!("DEMO_RETENTION_HOURS must be > 0");
        }
        if self.remote_retention_hours <= 0 {
            anyhow::bail!("REMOTE_RETENTION_HOURS must be > 0");
        }
        // Credentials only make sense as a pair.
        if self.supabase_url.is_some() != self.supabase_anon_key.is_some() {
            anyhow::bail!("SUPABASE_URL and SUPABASE_ANON_KEY must be set together");
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    /// A demo-mode configuration with no remote endpoints, suitable for tests.
    fn default() -> Self {
        Self {
            key_endpoint: None,
            fallback_key: default_fallback_key(),
            verification_token: default_verification_token(),
            key_request_timeout_secs: default_key_request_timeout(),
            supabase_url: None,
            supabase_anon_key: None,
            data_dir: default_data_dir(),
            demo_retention_hours: default_demo_retention(),
            remote_retention_hours: default_remote_retention(),
        }
    }
}
