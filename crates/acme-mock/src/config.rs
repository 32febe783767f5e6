//! Configuration loading and validation for the mock server.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// How the `authorizations` list is populated on finalize responses.
///
/// Clients differ in what they tolerate here, so the choice is configuration
/// rather than a fixed behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationsMode {
    /// `authorizations` is always the empty list.
    Empty,
    /// `authorizations` carries a single placeholder URL derived from the
    /// order identifier.
    Placeholder,
}

/// Validated mock-server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTPS server listens on.
    #[serde(default = "default_tls_port")]
    pub tls_port: u16,

    /// Filesystem path to the PEM-encoded TLS certificate chain. **Required.**
    pub tls_cert_path: String,

    /// Filesystem path to the PEM-encoded TLS private key. **Required.**
    pub tls_key_path: String,

    /// How finalize responses populate `authorizations`.
    #[serde(default = "default_authorizations_mode")]
    pub finalize_authorizations: AuthorizationsMode,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_tls_port() -> u16 {
    443
}
fn default_authorizations_mode() -> AuthorizationsMode {
    AuthorizationsMode::Empty
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
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
        ensure_non_empty(&self.tls_cert_path, "TLS_CERT_PATH")?;
        ensure_non_empty(&self.tls_key_path, "TLS_KEY_PATH")?;
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
