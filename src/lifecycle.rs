//! Session lifecycle — the start / mutate / write-close state machine
//!
//! `SessionLifecycle` owns the session payload, the session id and the
//! decision of when the client must be sent a cookie. Storage goes through
//! an installed [`StorageHandler`], called in a fixed order:
//!
//! - `start`: `open(save_path, name)` then `read(id)`
//! - `write_close`: `write(id, blob)` when the session is new or dirty,
//!   then always `close()`
//! - `regenerate_id(true)` and `destroy_session`: `destroy(id)`
//!
//! A cookie is minted only when the client has to adopt an id it did not
//! present: on the first start without an inbound id, on an explicit
//! `set_session_id`, and on every regeneration. Destroying a session never
//! clears the cookie.

use crate::codec;
use crate::config::SessionConfig;
use crate::cookie::CookieDescriptor;
use crate::error::{Result, SessionError};
use crate::handler::mapped::{MappedHandler, Methods, OperationMap};
use crate::handler::StorageHandler;
use crate::types::{InboundId, SessionData, SessionValue};
use serde::de::DeserializeOwned;
use std::fmt;

type IdGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// Default id generator: 32 lowercase hex chars from a random UUID
fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// One request's view of a server-side session
///
/// Not meant to be shared between threads: each request builds its own
/// lifecycle, drives it, and drops it. Dropping an open lifecycle runs the
/// shutdown hook.
pub struct SessionLifecycle {
    config: SessionConfig,
    data: SessionData,
    dirty: bool,
    is_open: bool,
    is_new: bool,
    load_failed: bool,
    current_id: Option<String>,
    inbound: Option<InboundId>,
    outbound_cookie: Option<CookieDescriptor>,
    handler: Option<Box<dyn StorageHandler>>,
    id_generator: IdGenerator,
}

impl SessionLifecycle {
    /// Create a lifecycle with the given session name and default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(SessionConfig::named(name))
    }

    /// Create a lifecycle from configuration
    ///
    /// The session starts out new, empty, and without an id.
    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            config,
            data: SessionData::new(),
            dirty: false,
            is_open: false,
            is_new: true,
            load_failed: false,
            current_id: None,
            inbound: None,
            outbound_cookie: None,
            handler: None,
            id_generator: Box::new(generate_id),
        }
    }

    /// Seed the session payload
    pub fn with_data(mut self, data: SessionData) -> Self {
        self.data = data;
        self
    }

    /// Record what the client presented
    ///
    /// A cookie named like this session, or a raw id, seeds the session id.
    /// Cookies for other names are kept but carry no id.
    pub fn with_inbound(mut self, inbound: impl Into<InboundId>) -> Self {
        let inbound = inbound.into();
        if let Some(id) = inbound.id_for(&self.config.name).filter(|id| !id.is_empty()) {
            self.current_id = Some(id);
        }
        self.inbound = Some(inbound);
        self
    }

    /// Whether no persisted state is known to exist (defaults to true)
    pub fn with_is_new(mut self, is_new: bool) -> Self {
        self.is_new = is_new;
        self
    }

    /// Replace the id generator
    pub fn with_id_generator(mut self, generator: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.id_generator = Box::new(generator);
        self
    }

    /// Install the storage handler used by every subsequent operation
    pub fn set_storage_handler(&mut self, handler: impl StorageHandler + 'static) {
        self.handler = Some(Box::new(handler));
    }

    /// Validate and install a name-mapped handler
    ///
    /// See [`MappedHandler::with_map`] for the validation rules. On failure
    /// the previously installed handler is kept.
    pub fn set_mapped_handler(&mut self, methods: Methods, map: OperationMap) -> Result<()> {
        let handler = MappedHandler::with_map(methods, map)?;
        self.set_storage_handler(handler);
        Ok(())
    }

    /// Open the session and load its data from the handler
    pub fn start(&mut self) -> Result<()> {
        if self.is_open {
            return Err(SessionError::IllegalState(
                "Session is already started.".to_string(),
            ));
        }
        if self.handler.is_none() {
            return Err(SessionError::IllegalState(
                "No storage handler installed".to_string(),
            ));
        }

        self.is_open = true;
        // cleared once the stored data has been read and decoded
        self.load_failed = true;

        let needs_cookie = !self.session_exists();
        let id = self.resolve_id();

        if needs_cookie {
            self.outbound_cookie = Some(self.mint_cookie(&id)?);
        }

        let handler = self.handler()?;
        handler.open(&self.config.save_path, &self.config.name)?;
        let raw = handler.read(&id)?;
        self.data = codec::decode(&raw)?;
        self.load_failed = false;

        tracing::debug!(
            session = %self.config.name,
            id = %id,
            new_cookie = needs_cookie,
            keys = self.data.len(),
            "Session started"
        );
        Ok(())
    }

    /// Persist (when new or dirty) and close the session
    ///
    /// Closing a session that is not open does nothing.
    pub fn write_close(&mut self) -> Result<()> {
        if !self.is_open {
            return Ok(());
        }

        let id = self.resolve_id();

        if self.load_failed {
            tracing::warn!(
                session = %self.config.name,
                id = %id,
                "Session data was never loaded, write skipped"
            );
        } else if self.is_new || self.dirty {
            let raw = codec::encode(&self.data)?;
            self.handler()?.write(&id, &raw)?;
            tracing::debug!(
                session = %self.config.name,
                id = %id,
                bytes = raw.len(),
                "Session written"
            );
        } else {
            tracing::debug!(session = %self.config.name, id = %id, "Session unchanged, write skipped");
        }

        self.dirty = false;
        self.is_new = false;
        self.load_failed = false;
        self.handler()?.close()?;
        self.is_open = false;

        tracing::debug!(session = %self.config.name, id = %id, "Session closed");
        Ok(())
    }

    /// Replace the session id, optionally destroying the old session's storage
    ///
    /// Data is kept. The session is treated as new so the next write-close
    /// persists it under the new id, and a cookie for the new id is always
    /// minted. Does nothing when the session is not open.
    pub fn regenerate_id(&mut self, destroy: bool) -> Result<()> {
        if !self.is_open {
            return Ok(());
        }

        let old_id = self.resolve_id();
        let new_id = (self.id_generator)();
        if new_id.is_empty() || new_id == old_id {
            return Err(SessionError::IllegalState(format!(
                "Id generator did not produce a fresh id (got '{}')",
                new_id
            )));
        }

        if destroy {
            self.handler()?.destroy(&old_id)?;
        }

        self.current_id = Some(new_id.clone());
        self.is_new = true;
        self.outbound_cookie = Some(self.mint_cookie(&new_id)?);

        tracing::debug!(
            session = %self.config.name,
            old_id = %old_id,
            id = %new_id,
            destroy,
            "Session id regenerated"
        );
        Ok(())
    }

    /// Destroy the session's backing storage
    ///
    /// Returns `false` without touching the handler when the session is not
    /// open. In-memory state, the id and any outbound cookie are left as
    /// they are.
    pub fn destroy_session(&mut self) -> Result<bool> {
        if !self.is_open {
            return Ok(false);
        }

        let id = self.resolve_id();
        self.handler()?.destroy(&id)?;

        tracing::debug!(session = %self.config.name, id = %id, "Session destroyed");
        Ok(true)
    }

    /// End-of-request hook; same as [`write_close`](Self::write_close)
    pub fn on_shutdown(&mut self) -> Result<()> {
        self.write_close()
    }

    /// Set the session id explicitly and mint a cookie for it
    ///
    /// Only allowed while the session is closed; once open, only
    /// [`regenerate_id`](Self::regenerate_id) may change the id.
    pub fn set_session_id(&mut self, id: impl Into<String>) -> Result<()> {
        if self.is_open {
            return Err(SessionError::IllegalState(
                "Session id cannot be changed while the session is open".to_string(),
            ));
        }

        let id = id.into();
        if id.is_empty() {
            return Err(SessionError::InvalidArgument(
                "Session id must not be empty".to_string(),
            ));
        }

        self.outbound_cookie = Some(self.mint_cookie(&id)?);
        self.current_id = Some(id);
        Ok(())
    }

    /// Whether a session id is known, open or not
    pub fn session_exists(&self) -> bool {
        self.current_id.is_some()
    }

    /// The current session id; never generates one
    pub fn session_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Store a value; returns `false` and changes nothing when not open
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SessionValue>) -> bool {
        if !self.is_open {
            return false;
        }

        self.dirty = true;
        self.data.insert(key.into(), value.into());
        true
    }

    /// Look up a value, failing with `KeyNotFound` when absent
    pub fn get(&self, key: &str) -> Result<&SessionValue> {
        self.data
            .get(key)
            .ok_or_else(|| SessionError::KeyNotFound(key.to_string()))
    }

    /// Look up a value and deserialize it into `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.get(key)?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Remove a value; returns `false` when not open or the key is absent
    pub fn remove(&mut self, key: &str) -> bool {
        if !self.is_open || self.data.remove(key).is_none() {
            return false;
        }

        self.dirty = true;
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn save_path(&self) -> &str {
        &self.config.save_path
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// What the client presented at construction
    pub fn inbound(&self) -> Option<&InboundId> {
        self.inbound.as_ref()
    }

    /// The cookie the client must be sent, if any
    pub fn outbound_cookie(&self) -> Option<&CookieDescriptor> {
        self.outbound_cookie.as_ref()
    }

    /// Return the current id, generating one only when none is set
    fn resolve_id(&mut self) -> String {
        match &self.current_id {
            Some(id) => id.clone(),
            None => {
                let id = (self.id_generator)();
                self.current_id = Some(id.clone());
                id
            }
        }
    }

    fn mint_cookie(&self, id: &str) -> Result<CookieDescriptor> {
        self.config.cookie.cookie(&self.config.name, id)
    }

    fn handler(&self) -> Result<&dyn StorageHandler> {
        self.handler
            .as_deref()
            .ok_or_else(|| SessionError::IllegalState("No storage handler installed".to_string()))
    }
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::from_config(SessionConfig::default())
    }
}

impl fmt::Debug for SessionLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLifecycle")
            .field("name", &self.config.name)
            .field("id", &self.current_id)
            .field("is_open", &self.is_open)
            .field("is_new", &self.is_new)
            .field("dirty", &self.dirty)
            .field("keys", &self.data.len())
            .field("outbound_cookie", &self.outbound_cookie)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl Drop for SessionLifecycle {
    fn drop(&mut self) {
        if !self.is_open {
            return;
        }
        if let Err(e) = self.on_shutdown() {
            tracing::warn!(
                session = %self.config.name,
                id = ?self.current_id,
                error = %e,
                "Implicit session shutdown failed"
            );
        }
    }
}
