//! Configuration loading and validation for the vault service.
//!
//! All values are read from `VAULT_`-prefixed environment variables at
//! startup. The process exits with a clear error message if any value is
//! invalid.

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated vault service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Loopback port the message channel listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Path of the JSON storage area that holds the session key.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    7878
}
fn default_storage_path() -> String {
    "vault-storage.json".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("VAULT"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Address the message channel binds to. Always loopback.
    pub fn listen_addr(&self) -> SocketAddr {
        (Ipv4Addr::LOCALHOST, self.listen_port).into()
    }

    fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            anyhow::bail!("VAULT_LISTEN_PORT must be a fixed, non-zero port");
        }
        if self.storage_path.trim().is_empty() {
            anyhow::bail!("VAULT_STORAGE_PATH must not be empty");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            storage_path: default_storage_path(),
            log_level: default_log_level(),
        }
    }
}
