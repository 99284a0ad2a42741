//! Connection settings for the hosted record store.
//!
//! Values come from the environment with logged fallbacks to defaults:
//! - `STORE_URL` (default `http://localhost:54321`)
//! - `STORE_API_KEY` (default empty, which only works against open stores)
//! - `STORE_ACCESS_TOKEN` (optional signed-in user token)
//! - `STORE_TIMEOUT_SECS` (default 10)

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::{Result, StoreError};

pub const DEFAULT_URL: &str = "http://localhost:54321";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            access_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Load and validate settings from the environment.
    pub fn from_env() -> Result<Self> {
        let config = Self::load_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from the environment without validating them, so that
    /// callers can apply overrides before calling [`StoreConfig::validate`].
    pub fn load_env() -> Result<Self> {
        Ok(Self {
            base_url: try_load("STORE_URL", DEFAULT_URL)?,
            api_key: var("STORE_API_KEY").unwrap_or_else(|| {
                warn!("STORE_API_KEY not set, requests will be anonymous");
                String::new()
            }),
            access_token: var("STORE_ACCESS_TOKEN").filter(|t| !t.is_empty()),
            timeout_secs: try_load("STORE_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())?,
        })
    }

    /// Reject settings that can never produce a working client.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "base url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout must be at least one second".into()));
        }
        Ok(())
    }

    /// Base url without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| StoreError::Config(format!("invalid {key} value {raw:?}: {e}")))
}
