//! Hospital operations console.
//!
//! A server-rendered web front end over a hospital REST backend: patients,
//! devices, suppliers, tickets, billing and maintenance, gated by a persisted
//! session.
//!
//! # Architecture
//!
//! - **Server**: Axum router, one handler per page plus a few JSON endpoints
//! - **Session**: token store, session manager and the route gate
//! - **Shell**: the shared page chrome (sidebar, countdown, banners)
//! - **Backend**: reqwest client for the REST backend
//!
//! # Modules
//!
//! - [`backend`]: REST client and wire types
//! - [`session`]: token store, manager, gate, per-request context
//! - [`shell`]: page chrome and HTML helpers
//! - [`pages`]: page and API handlers
//! - [`security`]: cross-site request guard
//! - [`billing`], [`maintenance`], [`nfc`]: feature logic

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod billing;
pub mod config;
pub mod error;
pub mod extract;
pub mod maintenance;
pub mod nfc;
pub mod pages;
pub mod routes;
pub mod security;
pub mod server;
pub mod session;
pub mod shell;
pub mod telemetry;

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::AppConfig;
use crate::nfc::NfcCapability;
use crate::session::{SessionGate, SessionManager, TokenStore};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Route guard; also owns the session manager.
    pub gate: SessionGate,
    pub backend: BackendClient,
    pub nfc: NfcCapability,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn TokenStore>, backend: BackendClient) -> Self {
        let gate = SessionGate::new(
            SessionManager::new(store),
            Arc::new(backend.clone()),
            routes::LOGIN,
        );
        Self {
            nfc: NfcCapability::from_enabled(config.nfc.enabled),
            config,
            gate,
            backend,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        self.gate.sessions()
    }
}
