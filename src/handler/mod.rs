//! Storage handler trait — the pluggable backend contract
//!
//! The lifecycle calls into a `StorageHandler` at fixed points:
//! `open` then `read` on start, `write` (new or dirty only) then `close`
//! on write-close, `destroy` on regenerate-with-destroy and explicit
//! destruction. `gc` is part of the contract but never called by the
//! lifecycle itself.

use crate::error::Result;
use std::fmt;
use std::sync::Arc;

pub mod mapped;
pub mod memory;

/// Core trait for session storage backends
///
/// Implementations manage their own synchronization; every method takes
/// `&self`. Returning an error aborts the lifecycle operation that
/// triggered the call.
pub trait StorageHandler: Send + Sync {
    /// Prepare the backend for a session named `name` under `save_path`
    fn open(&self, save_path: &str, name: &str) -> Result<()>;

    /// Fetch the raw blob for `id`, `""` when nothing is stored
    fn read(&self, id: &str) -> Result<String>;

    /// Persist the raw blob for `id`
    fn write(&self, id: &str, data: &str) -> Result<()>;

    /// Release whatever `open` acquired
    fn close(&self) -> Result<()>;

    /// Remove everything stored for `id`
    fn destroy(&self, id: &str) -> Result<()>;

    /// Remove sessions idle for longer than `max_lifetime_secs`
    ///
    /// Returns the number of sessions removed.
    fn gc(&self, max_lifetime_secs: u64) -> Result<u64>;
}

impl<T: StorageHandler + ?Sized> StorageHandler for Arc<T> {
    fn open(&self, save_path: &str, name: &str) -> Result<()> {
        (**self).open(save_path, name)
    }

    fn read(&self, id: &str) -> Result<String> {
        (**self).read(id)
    }

    fn write(&self, id: &str, data: &str) -> Result<()> {
        (**self).write(id, data)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }

    fn destroy(&self, id: &str) -> Result<()> {
        (**self).destroy(id)
    }

    fn gc(&self, max_lifetime_secs: u64) -> Result<u64> {
        (**self).gc(max_lifetime_secs)
    }
}

impl<T: StorageHandler + ?Sized> StorageHandler for Box<T> {
    fn open(&self, save_path: &str, name: &str) -> Result<()> {
        (**self).open(save_path, name)
    }

    fn read(&self, id: &str) -> Result<String> {
        (**self).read(id)
    }

    fn write(&self, id: &str, data: &str) -> Result<()> {
        (**self).write(id, data)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }

    fn destroy(&self, id: &str) -> Result<()> {
        (**self).destroy(id)
    }

    fn gc(&self, max_lifetime_secs: u64) -> Result<u64> {
        (**self).gc(max_lifetime_secs)
    }
}

/// The six operations every handler must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Open,
    Read,
    Write,
    Close,
    Destroy,
    Gc,
}

impl Operation {
    /// Required operations, in the order handler registration checks them
    pub const REQUIRED: [Operation; 6] = [
        Operation::Read,
        Operation::Close,
        Operation::Gc,
        Operation::Write,
        Operation::Open,
        Operation::Destroy,
    ];

    /// Canonical operation name, also the default method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Close => "close",
            Operation::Destroy => "destroy",
            Operation::Gc => "gc",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::memory::MemoryHandler;

    #[test]
    fn test_required_covers_every_operation_once() {
        let mut ops = Operation::REQUIRED.to_vec();
        ops.sort();
        ops.dedup();
        assert_eq!(ops.len(), 6);
        assert_eq!(Operation::REQUIRED[0], Operation::Read);
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::Gc.to_string(), "gc");
        assert_eq!(Operation::Destroy.as_str(), "destroy");
    }

    #[test]
    fn test_arc_handler_delegates() {
        let inner = Arc::new(MemoryHandler::default());
        let shared: Box<dyn StorageHandler> = Box::new(inner.clone());

        shared.write("id-1", "1:a1:1").unwrap();
        assert_eq!(inner.read("id-1").unwrap(), "1:a1:1");
        shared.destroy("id-1").unwrap();
        assert_eq!(inner.read("id-1").unwrap(), "");
    }
}
