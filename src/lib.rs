//! # a3s-session
//!
//! Deterministic server-side session lifecycle emulation over pluggable
//! storage handlers.
//!
//! ## Overview
//!
//! `a3s-session` reproduces the open / read / mutate / write-close /
//! regenerate / destroy cycle of a server-side session without a live
//! session store or an HTTP layer. Code that depends on session semantics
//! can be tested by installing a `StorageHandler` and checking which calls
//! it received and which cookie the client would have been sent.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_session::{MemoryHandler, SessionLifecycle, StorageHandler};
//! use std::sync::Arc;
//!
//! # fn example() -> a3s_session::Result<()> {
//! let store = Arc::new(MemoryHandler::new());
//!
//! let mut session = SessionLifecycle::new("app");
//! session.set_storage_handler(store.clone());
//! session.start()?;
//!
//! // No id was presented, so the client must be sent one
//! let cookie = session.outbound_cookie().expect("new session sends a cookie");
//! assert_eq!(cookie.value(), session.session_id());
//!
//! session.set("hello", "world");
//! session.write_close()?;
//!
//! assert_eq!(store.read(session.session_id().unwrap_or_default())?, "5:hello7:\"world\"");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Architecture
//!
//! - **SessionLifecycle** — the state machine, id policy and cookie policy
//! - **StorageHandler** trait — the six-operation backend contract
//! - **MemoryHandler** — in-memory backend for tests and single-process use
//! - **MappedHandler** — adapts named callbacks, validating the mapping
//! - **CookieDescriptor** — the cookie a transport layer should set
//! - **codec** — the session blob format handlers store

pub mod codec;
pub mod config;
pub mod cookie;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod types;

// Re-export core types
pub use config::{CookieParams, SessionConfig, DEFAULT_SAVE_PATH, DEFAULT_SESSION_NAME};
pub use cookie::{CookieDescriptor, CookieOptions};
pub use error::{Result, SessionError};
pub use handler::{Operation, StorageHandler};
pub use lifecycle::SessionLifecycle;
pub use types::{InboundId, SessionData, SessionValue};

// Re-export handlers for convenience
pub use handler::mapped::{MappedHandler, Method, Methods, OperationMap};
pub use handler::memory::MemoryHandler;
