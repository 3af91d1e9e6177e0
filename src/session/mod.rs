//! Session management and route guarding.
//!
//! # Architecture
//!
//! - [`TokenStore`]: persisted key/value state (tokens, tenant, selections)
//! - [`SessionManager`]: the only module allowed to read, write or clear it
//! - [`SessionGate`]: decides whether a protected page may render
//! - [`SessionContext`]: the per-navigation profile shared with the shell
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hospital_ops::session::{MemoryTokenStore, SessionManager};
//!
//! # async fn example() {
//! let sessions = SessionManager::new(Arc::new(MemoryTokenStore::new()));
//! assert!(sessions.current().await.is_none());
//! # }
//! ```

pub mod context;
pub mod gate;
pub mod manager;
pub mod store;

pub use context::{ProfileState, SessionContext};
pub use gate::{GateDecision, IdentityProvider, LoginError, LoginOutcome, SessionGate};
pub use manager::{Session, SessionManager};
pub use store::{FileTokenStore, MemoryTokenStore, SessionKey, StoreError, TokenStore};
