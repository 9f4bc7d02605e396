//! Session configuration
//!
//! Controls the session name, the save path handed to `open`, and the
//! attributes of every cookie the lifecycle mints.

use crate::cookie::{CookieDescriptor, CookieOptions, DEFAULT_COOKIE_PATH};
use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional session cookie name
pub const DEFAULT_SESSION_NAME: &str = "SESSID";

/// Save path passed to the handler's `open` when none is configured
pub const DEFAULT_SAVE_PATH: &str = "";

/// Attributes applied to outbound session cookies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieParams {
    /// Cookie lifetime in seconds (0 = until the browser closes)
    #[serde(default)]
    pub lifetime: i64,

    #[serde(default = "default_cookie_path")]
    pub path: String,

    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub secure: bool,

    #[serde(default)]
    pub http_only: bool,
}

fn default_cookie_path() -> String {
    DEFAULT_COOKIE_PATH.to_string()
}

impl Default for CookieParams {
    fn default() -> Self {
        Self {
            lifetime: 0,
            path: default_cookie_path(),
            domain: String::new(),
            secure: false,
            http_only: false,
        }
    }
}

impl CookieParams {
    /// Mint a cookie carrying `value` under `name` with these attributes
    pub fn cookie(&self, name: &str, value: &str) -> Result<CookieDescriptor> {
        CookieDescriptor::create(CookieOptions {
            name: Some(name.to_string()),
            value: Some(value.to_string()),
            expire: Some(self.lifetime),
            path: Some(self.path.clone()),
            domain: Some(self.domain.clone()),
            secure: Some(self.secure),
            http_only: Some(self.http_only),
        })
    }
}

/// Configuration for a session lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Session name, also the outbound cookie name
    #[serde(default = "default_name")]
    pub name: String,

    /// Save path handed to the handler's `open`
    #[serde(default)]
    pub save_path: String,

    /// Outbound cookie attributes
    #[serde(default)]
    pub cookie: CookieParams,
}

fn default_name() -> String {
    DEFAULT_SESSION_NAME.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            save_path: DEFAULT_SAVE_PATH.to_string(),
            cookie: CookieParams::default(),
        }
    }
}

impl SessionConfig {
    /// Default configuration with a custom session name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SessionError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            SessionError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), name = %config.name, "Session config loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SessionError::Config(
                "Session name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
