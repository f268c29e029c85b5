//! Authentication session management.
//!
//! This module holds the one piece of state shared across every domain: the
//! bearer token. It is restored from durable storage at startup, written on
//! login, and cleared on logout or whenever any call comes back 401.
//!
//! # Architecture
//!
//! - [`SessionHolder`]: shared, watchable [`AuthSession`] plus persistence
//! - [`SessionStorage`]: durable key-value seam ([`FileStorage`], [`MemoryStorage`])
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hrms_portal::session::{MemoryStorage, SessionHolder};
//! use serde_json::json;
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let session = SessionHolder::new(Arc::new(MemoryStorage::new()), "hrms.session");
//! session.login(&json!({ "token": "abc", "role": "employee" })).await.unwrap();
//!
//! let restored = session.restore_session().await;
//! assert!(restored.is_authenticated);
//! # });
//! # }
//! ```

mod holder;
mod storage;

pub use holder::{AuthSession, DEFAULT_SESSION_KEY, PersistedSession, SessionHolder};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
