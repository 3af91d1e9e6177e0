//! Client for the hospital REST backend.
//!
//! The backend owns persistence and authentication; this crate reads what
//! the pages list and writes what they save or delete.
//!
//! - [`BackendClient`]: reqwest-based client with per-area accessors
//! - [`types`]: wire types (tokens, profile, tenant-scoped resources)
//! - [`BackendError`]: failure taxonomy with 401/404 split out

pub mod client;
pub mod error;
pub mod types;

pub use client::BackendClient;
pub use error::{BackendError, GENERIC_FAILURE};
pub use types::{
    Device, Invoice, Patient, RecordId, ResourceKind, Role, Subscription, Supplier, Ticket, TokenPair,
    UserProfile,
};
