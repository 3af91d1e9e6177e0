//! Per-navigation session context.
//!
//! Produced once per request by the gate and handed to both the page and the
//! shell, so a page load costs exactly one profile fetch.

use super::manager::Session;
use crate::backend::{Role, UserProfile};

#[derive(Debug, Clone)]
pub enum ProfileState {
    Loaded(UserProfile),
    /// The fetch failed for a reason other than bad credentials.
    Unavailable { reason: String },
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: Session,
    pub profile: ProfileState,
}

impl SessionContext {
    pub fn profile(&self) -> Option<&UserProfile> {
        match &self.profile {
            ProfileState::Loaded(profile) => Some(profile),
            ProfileState::Unavailable { .. } => None,
        }
    }

    /// Role of the loaded profile; `Unknown` while degraded.
    pub fn role(&self) -> Role {
        self.profile().map_or(Role::Unknown, |p| p.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.profile, ProfileState::Unavailable { .. })
    }

    /// Tenant scope, preferring the session's own over the profile's.
    pub fn scope(&self) -> Option<&str> {
        self.session
            .scope()
            .or_else(|| self.profile().and_then(|p| p.tenant_key.as_deref()))
    }
}
