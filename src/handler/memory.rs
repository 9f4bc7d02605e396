//! In-memory storage handler
//!
//! Keeps session blobs in a map — lost on drop, but useful for tests and
//! single-process hosts.

use crate::error::{Result, SessionError};
use crate::handler::StorageHandler;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// A stored session blob and when it was last written
#[derive(Debug, Clone)]
struct StoredSession {
    data: String,
    updated_at: DateTime<Utc>,
}

/// In-memory handler with open/close bookkeeping
#[derive(Default)]
pub struct MemoryHandler {
    sessions: RwLock<HashMap<String, StoredSession>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

impl MemoryHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a stored blob, as if a previous request had written it
    pub fn insert(&self, id: impl Into<String>, data: impl Into<String>) -> Result<()> {
        self.store(id.into(), data.into(), Utc::now())
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a blob is stored for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.sessions
            .read()
            .map(|s| s.contains_key(id))
            .unwrap_or(false)
    }

    /// How many times `open` has been called
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// How many times `close` has been called
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn store(&self, id: String, data: String, updated_at: DateTime<Utc>) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|e| {
            SessionError::handler("write", format!("Failed to acquire session lock: {}", e))
        })?;
        sessions.insert(id, StoredSession { data, updated_at });
        Ok(())
    }

    fn gc_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut sessions = self.sessions.write().map_err(|e| {
            SessionError::handler("gc", format!("Failed to acquire session lock: {}", e))
        })?;
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

impl StorageHandler for MemoryHandler {
    fn open(&self, save_path: &str, name: &str) -> Result<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(save_path, name, "Memory handler opened");
        Ok(())
    }

    fn read(&self, id: &str) -> Result<String> {
        let sessions = self.sessions.read().map_err(|e| {
            SessionError::handler("read", format!("Failed to acquire session lock: {}", e))
        })?;
        Ok(sessions
            .get(id)
            .map(|s| s.data.clone())
            .unwrap_or_default())
    }

    fn write(&self, id: &str, data: &str) -> Result<()> {
        self.store(id.to_string(), data.to_string(), Utc::now())
    }

    fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn destroy(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|e| {
            SessionError::handler("destroy", format!("Failed to acquire session lock: {}", e))
        })?;
        sessions.remove(id);
        Ok(())
    }

    fn gc(&self, max_lifetime_secs: u64) -> Result<u64> {
        let cutoff = i64::try_from(max_lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_sub_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let removed = self.gc_before(cutoff)?;
        tracing::debug!(removed, max_lifetime_secs, "Memory handler gc");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_is_empty() {
        let handler = MemoryHandler::new();
        assert_eq!(handler.read("nope").unwrap(), "");
        assert!(handler.is_empty());
    }

    #[test]
    fn test_write_read_destroy() {
        let handler = MemoryHandler::new();
        handler.write("abc", "1:a1:1").unwrap();
        assert!(handler.contains("abc"));
        assert_eq!(handler.read("abc").unwrap(), "1:a1:1");

        handler.write("abc", "1:a1:2").unwrap();
        assert_eq!(handler.len(), 1);
        assert_eq!(handler.read("abc").unwrap(), "1:a1:2");

        handler.destroy("abc").unwrap();
        assert!(!handler.contains("abc"));
    }

    #[test]
    fn test_destroy_missing_is_ok() {
        let handler = MemoryHandler::new();
        assert!(handler.destroy("ghost").is_ok());
    }

    #[test]
    fn test_open_close_counters() {
        let handler = MemoryHandler::new();
        handler.open("", "SESSID").unwrap();
        handler.open("", "SESSID").unwrap();
        handler.close().unwrap();

        assert_eq!(handler.open_count(), 2);
        assert_eq!(handler.close_count(), 1);
    }

    #[test]
    fn test_gc_removes_stale_sessions() {
        let handler = MemoryHandler::new();
        handler
            .store(
                "old".to_string(),
                String::new(),
                Utc::now() - Duration::seconds(3600),
            )
            .unwrap();
        handler.insert("fresh", "").unwrap();

        let removed = handler.gc(60).unwrap();
        assert_eq!(removed, 1);
        assert!(!handler.contains("old"));
        assert!(handler.contains("fresh"));
    }

    #[test]
    fn test_gc_with_huge_lifetime_keeps_everything() {
        let handler = MemoryHandler::new();
        handler.insert("a", "").unwrap();
        assert_eq!(handler.gc(u64::MAX).unwrap(), 0);
        assert_eq!(handler.len(), 1);
    }
}
