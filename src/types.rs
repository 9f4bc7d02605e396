//! Core session types
//!
//! Session payloads are ordered maps of JSON values so the encoded blob is
//! stable for a given set of entries.

use crate::cookie::CookieDescriptor;
use std::collections::BTreeMap;

/// A single session value
pub type SessionValue = serde_json::Value;

/// The session payload: key → arbitrary value
pub type SessionData = BTreeMap<String, SessionValue>;

/// What the client presented when the request arrived
///
/// Either the full cookie or just the raw id string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundId {
    /// A cookie carrying name and value
    Cookie(CookieDescriptor),
    /// A bare session id
    Raw(String),
}

impl InboundId {
    /// Resolve the session id this inbound value carries for `session_name`
    ///
    /// A cookie only seeds the id when its name matches the session name;
    /// a raw id is taken as-is.
    pub fn id_for(&self, session_name: &str) -> Option<String> {
        match self {
            InboundId::Cookie(cookie) if cookie.name() == session_name => {
                cookie.value().map(str::to_string)
            }
            InboundId::Cookie(_) => None,
            InboundId::Raw(id) => Some(id.clone()),
        }
    }

    /// The inbound cookie, if one was presented
    pub fn cookie(&self) -> Option<&CookieDescriptor> {
        match self {
            InboundId::Cookie(cookie) => Some(cookie),
            InboundId::Raw(_) => None,
        }
    }
}

impl From<CookieDescriptor> for InboundId {
    fn from(cookie: CookieDescriptor) -> Self {
        InboundId::Cookie(cookie)
    }
}

impl From<String> for InboundId {
    fn from(id: String) -> Self {
        InboundId::Raw(id)
    }
}

impl From<&str> for InboundId {
    fn from(id: &str) -> Self {
        InboundId::Raw(id.to_string())
    }
}
