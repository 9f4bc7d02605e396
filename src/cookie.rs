//! Cookie descriptors handed to the transport layer
//!
//! A `CookieDescriptor` describes a cookie the client must be told to set.
//! The lifecycle mints one whenever a (new) session id has to reach the
//! client; callers normally only read it.

use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};

/// Default cookie path
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// Construction options for a cookie
///
/// Every field except `name` is optional; unset fields take the
/// session-cookie defaults when passed to [`CookieDescriptor::create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Expiry in seconds, 0 for a session-scoped cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
}

impl CookieOptions {
    /// Options with a name and value, everything else defaulted
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

/// A cookie the client should store
///
/// Immutable once built; defaults are applied exactly once in
/// [`CookieDescriptor::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieDescriptor {
    name: String,
    value: Option<String>,
    expire: i64,
    path: String,
    domain: String,
    secure: bool,
    http_only: bool,
}

impl CookieDescriptor {
    /// Build a cookie, applying defaults for every unset option
    ///
    /// Fails with `InvalidArgument` when the name is missing or empty.
    pub fn create(options: CookieOptions) -> Result<Self> {
        let name = options
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SessionError::InvalidArgument("A cookie needs a name.".to_string()))?;

        Ok(Self {
            name,
            value: options.value,
            expire: options.expire.unwrap_or(0),
            path: options
                .path
                .unwrap_or_else(|| DEFAULT_COOKIE_PATH.to_string()),
            domain: options.domain.unwrap_or_default(),
            secure: options.secure.unwrap_or(false),
            http_only: options.http_only.unwrap_or(false),
        })
    }

    /// Shorthand for a name/value cookie with default attributes
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::create(CookieOptions::named(name, value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie value, `None` when the cookie was built without one
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn expire(&self) -> i64 {
        self.expire
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn http_only(&self) -> bool {
        self.http_only
    }

    /// True when the cookie lives only as long as the browser session
    pub fn is_session_scoped(&self) -> bool {
        self.expire == 0
    }
}
