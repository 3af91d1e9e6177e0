//! Single owner of reads, writes and invalidation of the token store.

use std::sync::Arc;

use super::store::{SessionKey, StoreError, TokenStore};
use crate::backend::TokenPair;

/// Snapshot of the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub tenant_key: Option<String>,
    pub selected_hospital: Option<String>,
    pub selected_patient: Option<String>,
}

impl Session {
    /// Tenant path segment for backend calls.
    ///
    /// An explicitly selected hospital takes precedence over the tenant key
    /// learned at login.
    pub fn scope(&self) -> Option<&str> {
        self.selected_hospital
            .as_deref()
            .or(self.tenant_key.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// The current session, or `None` when logged out.
    ///
    /// A missing or blank access token means logged out regardless of what
    /// else is stored.
    pub async fn current(&self) -> Option<Session> {
        let access_token = self
            .store
            .get(SessionKey::AccessToken)
            .await
            .filter(|t| !t.trim().is_empty())?;

        Some(Session {
            access_token,
            refresh_token: self.store.get(SessionKey::RefreshToken).await,
            tenant_key: self.store.get(SessionKey::TenantKey).await,
            selected_hospital: self.store.get(SessionKey::SelectedHospital).await,
            selected_patient: self.store.get(SessionKey::SelectedPatient).await,
        })
    }

    /// Persist freshly issued tokens, and the tenant when known, in one write.
    pub async fn establish(
        &self,
        tokens: &TokenPair,
        tenant_key: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut entries = vec![
            (SessionKey::AccessToken, tokens.access.clone()),
            (SessionKey::RefreshToken, tokens.refresh.clone()),
        ];
        if let Some(tenant) = tenant_key {
            entries.push((SessionKey::TenantKey, tenant.to_string()));
        }
        self.store.set_all(&entries).await
    }

    pub async fn set_tenant(&self, tenant_key: &str) -> Result<(), StoreError> {
        self.store
            .set(SessionKey::TenantKey, tenant_key.to_string())
            .await
    }

    pub async fn select_hospital(&self, hospital_id: &str) -> Result<(), StoreError> {
        self.store
            .set(SessionKey::SelectedHospital, hospital_id.to_string())
            .await
    }

    pub async fn select_patient(&self, patient_id: &str) -> Result<(), StoreError> {
        self.store
            .set(SessionKey::SelectedPatient, patient_id.to_string())
            .await
    }

    /// Forget everything. Called on logout and on any 401.
    pub async fn invalidate(&self) -> Result<(), StoreError> {
        tracing::info!(name: "session.invalidated", "Session cleared");
        self.store.clear().await
    }
}
