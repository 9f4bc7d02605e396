//! Name-mapped storage handler
//!
//! Adapts a table of named callbacks into a `StorageHandler`. Callers whose
//! backend exposes the six operations under different names supply an
//! operation → method-name map; an empty map means every operation is
//! looked up under its own name.
//!
//! All validation happens when the handler is built, so a `MappedHandler`
//! that exists always serves every operation.

use crate::error::{Result, SessionError};
use crate::handler::{Operation, StorageHandler};
use std::collections::HashMap;
use std::fmt;

type OpenFn = Box<dyn Fn(&str, &str) -> Result<()> + Send + Sync>;
type ReadFn = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;
type WriteFn = Box<dyn Fn(&str, &str) -> Result<()> + Send + Sync>;
type CloseFn = Box<dyn Fn() -> Result<()> + Send + Sync>;
type DestroyFn = Box<dyn Fn(&str) -> Result<()> + Send + Sync>;
type GcFn = Box<dyn Fn(u64) -> Result<u64> + Send + Sync>;

/// A named callback able to serve one kind of operation
pub enum Method {
    Open(OpenFn),
    Read(ReadFn),
    Write(WriteFn),
    Close(CloseFn),
    Destroy(DestroyFn),
    Gc(GcFn),
}

impl Method {
    pub fn open(f: impl Fn(&str, &str) -> Result<()> + Send + Sync + 'static) -> Self {
        Method::Open(Box::new(f))
    }

    pub fn read(f: impl Fn(&str) -> Result<String> + Send + Sync + 'static) -> Self {
        Method::Read(Box::new(f))
    }

    pub fn write(f: impl Fn(&str, &str) -> Result<()> + Send + Sync + 'static) -> Self {
        Method::Write(Box::new(f))
    }

    pub fn close(f: impl Fn() -> Result<()> + Send + Sync + 'static) -> Self {
        Method::Close(Box::new(f))
    }

    pub fn destroy(f: impl Fn(&str) -> Result<()> + Send + Sync + 'static) -> Self {
        Method::Destroy(Box::new(f))
    }

    pub fn gc(f: impl Fn(u64) -> Result<u64> + Send + Sync + 'static) -> Self {
        Method::Gc(Box::new(f))
    }

    /// The operation this callback's signature can serve
    pub fn kind(&self) -> Operation {
        match self {
            Method::Open(_) => Operation::Open,
            Method::Read(_) => Operation::Read,
            Method::Write(_) => Operation::Write,
            Method::Close(_) => Operation::Close,
            Method::Destroy(_) => Operation::Destroy,
            Method::Gc(_) => Operation::Gc,
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method::{}", self.kind())
    }
}

/// Named methods offered by a backend
pub type Methods = HashMap<String, Method>;

/// Operation → method name
pub type OperationMap = HashMap<Operation, String>;

/// Storage handler dispatching to validated, named callbacks
///
/// Holds exactly one callback per operation; a handler that could not
/// serve every operation is never built.
pub struct MappedHandler {
    open: OpenFn,
    read: ReadFn,
    write: WriteFn,
    close: CloseFn,
    destroy: DestroyFn,
    gc: GcFn,
}

impl MappedHandler {
    /// Build with identity mapping (operation name = method name)
    pub fn new(methods: Methods) -> Result<Self> {
        Self::with_map(methods, OperationMap::new())
    }

    /// Build with an explicit operation → method-name map
    ///
    /// An empty map falls back to identity mapping. Fails with
    /// `InvalidArgument` naming the first operation, in
    /// [`Operation::REQUIRED`] order, that the map or the methods cannot
    /// serve.
    pub fn with_map(mut methods: Methods, map: OperationMap) -> Result<Self> {
        let map = if map.is_empty() {
            identity_map()
        } else {
            map
        };
        let mut take = |op: Operation| take_method(&mut methods, &map, op);

        let read = match take(Operation::Read)? {
            (_, Method::Read(f)) => f,
            (name, other) => return Err(wrong_kind(&name, &other, Operation::Read)),
        };
        let close = match take(Operation::Close)? {
            (_, Method::Close(f)) => f,
            (name, other) => return Err(wrong_kind(&name, &other, Operation::Close)),
        };
        let gc = match take(Operation::Gc)? {
            (_, Method::Gc(f)) => f,
            (name, other) => return Err(wrong_kind(&name, &other, Operation::Gc)),
        };
        let write = match take(Operation::Write)? {
            (_, Method::Write(f)) => f,
            (name, other) => return Err(wrong_kind(&name, &other, Operation::Write)),
        };
        let open = match take(Operation::Open)? {
            (_, Method::Open(f)) => f,
            (name, other) => return Err(wrong_kind(&name, &other, Operation::Open)),
        };
        let destroy = match take(Operation::Destroy)? {
            (_, Method::Destroy(f)) => f,
            (name, other) => return Err(wrong_kind(&name, &other, Operation::Destroy)),
        };

        Ok(Self {
            open,
            read,
            write,
            close,
            destroy,
            gc,
        })
    }
}

/// Remove the method mapped to `op`, returning it with its name
fn take_method(methods: &mut Methods, map: &OperationMap, op: Operation) -> Result<(String, Method)> {
    let name = map
        .get(&op)
        .ok_or_else(|| SessionError::InvalidArgument(format!("Missing '{}' from map.", op)))?;

    let method = methods.remove(name).ok_or_else(|| {
        SessionError::InvalidArgument(format!(
            "Missing '{}' from handler for '{}'",
            name, op
        ))
    })?;

    Ok((name.clone(), method))
}

fn wrong_kind(name: &str, method: &Method, op: Operation) -> SessionError {
    SessionError::InvalidArgument(format!(
        "Method '{}' serves '{}' and cannot be used for '{}'",
        name,
        method.kind(),
        op
    ))
}

fn identity_map() -> OperationMap {
    Operation::REQUIRED
        .iter()
        .map(|op| (*op, op.as_str().to_string()))
        .collect()
}

impl fmt::Debug for MappedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedHandler")
            .field("operations", &Operation::REQUIRED)
            .finish()
    }
}

impl StorageHandler for MappedHandler {
    fn open(&self, save_path: &str, name: &str) -> Result<()> {
        (self.open)(save_path, name)
    }

    fn read(&self, id: &str) -> Result<String> {
        (self.read)(id)
    }

    fn write(&self, id: &str, data: &str) -> Result<()> {
        (self.write)(id, data)
    }

    fn close(&self) -> Result<()> {
        (self.close)()
    }

    fn destroy(&self, id: &str) -> Result<()> {
        (self.destroy)(id)
    }

    fn gc(&self, max_lifetime_secs: u64) -> Result<u64> {
        (self.gc)(max_lifetime_secs)
    }
}
