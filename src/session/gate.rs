//! Session gate: decides whether a protected page may render.
//!
//! - No access token: redirect to login without touching the network.
//! - Token present: exactly one profile fetch.
//! - 401 on that fetch: clear the store, redirect to login.
//! - Any other failure: admit in degraded mode (no profile).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::context::{ProfileState, SessionContext};
use super::manager::SessionManager;
use super::store::StoreError;
use crate::backend::{BackendClient, BackendError, TokenPair, UserProfile};
use crate::routes;

/// Source of tokens and profiles.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    async fn obtain_token(&self, username: &str, password: &str)
    -> Result<TokenPair, BackendError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, BackendError>;
}

#[async_trait]
impl IdentityProvider for BackendClient {
    async fn obtain_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, BackendError> {
        self.auth().obtain_token(username, password).await
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, BackendError> {
        self.auth().me(access_token).await
    }
}

/// Outcome of [`SessionGate::check`].
#[derive(Debug)]
pub enum GateDecision {
    Admit(Box<SessionContext>),
    Redirect(String),
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoginError {
    /// Text for the login page toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => self.to_string(),
            Self::Backend(e) => e.user_message(),
            Self::Store(_) => "Could not save your session on this device.".to_string(),
        }
    }
}

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    /// `None` when the follow-up profile fetch failed.
    pub profile: Option<UserProfile>,
    pub landing: &'static str,
}

#[derive(Debug, Clone)]
pub struct SessionGate {
    sessions: SessionManager,
    identity: Arc<dyn IdentityProvider>,
    login_route: String,
}

impl SessionGate {
    pub fn new(
        sessions: SessionManager,
        identity: Arc<dyn IdentityProvider>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            identity,
            login_route: login_route.into(),
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Guard a protected page.
    pub async fn check(&self) -> GateDecision {
        let Some(session) = self.sessions.current().await else {
            tracing::debug!(name: "session.gate.redirect", reason = "no_token", "No access token");
            return self.redirect_to_login();
        };

        match self.identity.fetch_profile(&session.access_token).await {
            Ok(profile) => GateDecision::Admit(Box::new(SessionContext {
                session,
                profile: ProfileState::Loaded(profile),
            })),
            Err(BackendError::Unauthorized) => {
                tracing::info!(
                    name: "session.gate.redirect",
                    reason = "unauthorized",
                    "Profile fetch rejected the token"
                );
                self.discard().await;
                self.redirect_to_login()
            }
            Err(e) => {
                tracing::warn!(
                    name: "session.gate.degraded",
                    error = %e,
                    "Profile unavailable, rendering without it"
                );
                GateDecision::Admit(Box::new(SessionContext {
                    session,
                    profile: ProfileState::Unavailable {
                        reason: e.user_message(),
                    },
                }))
            }
        }
    }

    /// Guard an admin-only page. Non-admins land on the default dashboard.
    pub async fn check_admin(&self) -> GateDecision {
        match self.check().await {
            GateDecision::Admit(ctx) if ctx.is_admin() => GateDecision::Admit(ctx),
            GateDecision::Admit(ctx) => {
                tracing::info!(
                    name: "session.gate.forbidden",
                    role = ?ctx.role(),
                    "Admin route refused"
                );
                GateDecision::Redirect(routes::DASHBOARD.to_string())
            }
            redirect @ GateDecision::Redirect(_) => redirect,
        }
    }

    /// Exchange credentials for tokens and decide where to land.
    ///
    /// The profile is fetched before anything is stored, so the tokens and the
    /// tenant key land in the store together or not at all.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, LoginError> {
        let tokens = match self.identity.obtain_token(username, password).await {
            Ok(tokens) => tokens,
            Err(BackendError::Unauthorized) => return Err(LoginError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        let profile = match self.identity.fetch_profile(&tokens.access).await {
            Ok(profile) => Some(profile),
            Err(BackendError::Unauthorized) => {
                self.discard().await;
                return Err(BackendError::Unauthorized.into());
            }
            Err(e) => {
                tracing::warn!(name: "session.login.profile_failed", error = %e, "Signed in without profile");
                None
            }
        };

        let tenant = profile.as_ref().and_then(|p| p.tenant_key.as_deref());
        self.sessions.establish(&tokens, tenant).await?;

        let landing = profile
            .as_ref()
            .map_or(routes::DASHBOARD, |p| routes::landing_route(p.role));
        if let Some(profile) = &profile {
            tracing::info!(
                name: "session.login",
                user_id = %profile.id,
                role = ?profile.role,
                landing,
                "Signed in"
            );
        }
        Ok(LoginOutcome { profile, landing })
    }

    pub async fn logout(&self) -> Result<(), StoreError> {
        self.sessions.invalidate().await
    }

    /// Pass a page's own backend result through, dropping the session on 401.
    pub async fn settle<T>(&self, result: Result<T, BackendError>) -> Result<T, BackendError> {
        if let Err(e) = &result {
            self.observe(e).await;
        }
        result
    }

    /// Drop the session if `err` says the token is no longer accepted.
    pub async fn observe(&self, err: &BackendError) {
        if err.is_unauthorized() {
            self.discard().await;
        }
    }

    fn redirect_to_login(&self) -> GateDecision {
        GateDecision::Redirect(self.login_route.clone())
    }

    async fn discard(&self) {
        if let Err(e) = self.sessions.invalidate().await {
            tracing::error!(name: "session.invalidate_failed", error = %e, "Could not clear token store");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{RecordId, Role};
    use crate::session::store::{MemoryTokenStore, SessionKey, TokenStore};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted identity provider that counts profile requests.
    #[derive(Debug)]
    struct FakeIdentity {
        profile: Mutex<Result<UserProfile, u16>>,
        profile_calls: AtomicUsize,
    }

    impl FakeIdentity {
        fn answering(role: Role) -> Self {
            Self {
                profile: Mutex::new(Ok(UserProfile {
                    id: RecordId::Number(1),
                    first_name: "Grace".into(),
                    last_name: "Mensah".into(),
                    email: "grace@example.org".into(),
                    role,
                    tenant_key: Some("st-marys".into()),
                    subscription: None,
                })),
                profile_calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                profile: Mutex::new(Err(status)),
                profile_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.profile_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn obtain_token(
            &self,
            username: &str,
            password: &str,
        ) -> Result<TokenPair, BackendError> {
            if username == "grace" && password == "pw" {
                Ok(TokenPair {
                    access: "acc".into(),
                    refresh: "ref".into(),
                })
            } else {
                Err(BackendError::Unauthorized)
            }
        }

        async fn fetch_profile(&self, _access_token: &str) -> Result<UserProfile, BackendError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            match &*self.profile.lock().unwrap() {
                Ok(profile) => Ok(profile.clone()),
                Err(401) => Err(BackendError::Unauthorized),
                Err(status) => Err(BackendError::Api {
                    status: *status,
                    message: "upstream down".into(),
                }),
            }
        }
    }

    async fn gate_with(identity: Arc<FakeIdentity>, token: Option<&str>) -> (SessionGate, Arc<MemoryTokenStore>) {
        let store = Arc::new(MemoryTokenStore::new());
        if let Some(token) = token {
            store
                .set(SessionKey::AccessToken, token.to_string())
                .await
                .unwrap();
        }
        let gate = SessionGate::new(SessionManager::new(store.clone()), identity, "/login");
        (gate, store)
    }

    #[tokio::test]
    async fn no_token_redirects_without_fetching() {
        let identity = Arc::new(FakeIdentity::answering(Role::Employee));
        let (gate, _) = gate_with(identity.clone(), None).await;

        assert!(matches!(gate.check().await, GateDecision::Redirect(to) if to == "/login"));
        assert_eq!(identity.calls(), 0);
    }

    #[tokio::test]
    async fn token_costs_exactly_one_fetch() {
        let identity = Arc::new(FakeIdentity::answering(Role::Employee));
        let (gate, _) = gate_with(identity.clone(), Some("acc")).await;

        let GateDecision::Admit(ctx) = gate.check().await else {
            panic!("expected admit");
        };
        assert_eq!(ctx.role(), Role::Employee);
        assert_eq!(identity.calls(), 1);
    }

    #[tokio::test]
    async fn unauthorized_profile_clears_store() {
        let identity = Arc::new(FakeIdentity::failing(401));
        let (gate, store) = gate_with(identity.clone(), Some("expired")).await;
        store
            .set(SessionKey::TenantKey, "st-marys".into())
            .await
            .unwrap();

        assert!(matches!(gate.check().await, GateDecision::Redirect(to) if to == "/login"));
        assert_eq!(store.get(SessionKey::AccessToken).await, None);
        assert_eq!(store.get(SessionKey::TenantKey).await, None);
    }

    #[tokio::test]
    async fn other_failures_admit_degraded() {
        let identity = Arc::new(FakeIdentity::failing(503));
        let (gate, store) = gate_with(identity, Some("acc")).await;

        let GateDecision::Admit(ctx) = gate.check().await else {
            panic!("expected degraded admit");
        };
        assert!(ctx.is_degraded());
        assert!(!ctx.is_admin());
        assert_eq!(store.get(SessionKey::AccessToken).await.as_deref(), Some("acc"));
    }

    #[tokio::test]
    async fn admin_route_refuses_employees() {
        let identity = Arc::new(FakeIdentity::answering(Role::Employee));
        let (gate, _) = gate_with(identity, Some("acc")).await;
        assert!(matches!(
            gate.check_admin().await,
            GateDecision::Redirect(to) if to == routes::DASHBOARD
        ));
    }

    #[tokio::test]
    async fn admin_login_lands_on_admin_dashboard() {
        let identity = Arc::new(FakeIdentity::answering(Role::Admin));
        let (gate, store) = gate_with(identity, None).await;

        let outcome = gate.login("grace", "pw").await.unwrap();
        assert_eq!(outcome.landing, routes::ADMIN_DASHBOARD);
        assert_eq!(store.get(SessionKey::AccessToken).await.as_deref(), Some("acc"));
        assert_eq!(store.get(SessionKey::RefreshToken).await.as_deref(), Some("ref"));
        assert_eq!(store.get(SessionKey::TenantKey).await.as_deref(), Some("st-marys"));
    }

    #[tokio::test]
    async fn bad_credentials_leave_store_untouched() {
        let identity = Arc::new(FakeIdentity::answering(Role::Admin));
        let (gate, store) = gate_with(identity.clone(), None).await;

        let err = gate.login("grace", "wrong").await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
        assert_eq!(store.get(SessionKey::AccessToken).await, None);
        assert_eq!(identity.calls(), 0);
    }

    /// Memory store that refuses every write after the first.
    #[derive(Debug, Default)]
    struct OneWriteStore {
        inner: MemoryTokenStore,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl TokenStore for OneWriteStore {
        async fn get(&self, key: SessionKey) -> Option<String> {
            self.inner.get(key).await
        }

        async fn set_all(&self, entries: &[(SessionKey, String)]) -> Result<(), StoreError> {
            if self.writes.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set_all(entries).await
        }

        async fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
            self.inner.remove(key).await
        }

        async fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn login_stores_tokens_and_tenant_in_one_write() {
        let identity = Arc::new(FakeIdentity::answering(Role::Employee));
        let store = Arc::new(OneWriteStore::default());
        let gate = SessionGate::new(SessionManager::new(store.clone()), identity, "/login");

        let outcome = gate.login("grace", "pw").await.unwrap();
        assert_eq!(outcome.landing, routes::DASHBOARD);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(SessionKey::AccessToken).await.as_deref(), Some("acc"));
        assert_eq!(store.get(SessionKey::TenantKey).await.as_deref(), Some("st-marys"));
    }

    #[tokio::test]
    async fn failed_store_write_leaves_no_tokens() {
        let identity = Arc::new(FakeIdentity::answering(Role::Employee));
        let store = Arc::new(OneWriteStore::default());
        store.writes.store(1, Ordering::SeqCst);
        let gate = SessionGate::new(SessionManager::new(store.clone()), identity, "/login");

        let err = gate.login("grace", "pw").await.unwrap_err();
        assert!(matches!(err, LoginError::Store(_)));
        assert_eq!(store.get(SessionKey::AccessToken).await, None);
    }

    #[tokio::test]
    async fn profile_outage_still_signs_in() {
        let identity = Arc::new(FakeIdentity::failing(503));
        let (gate, store) = gate_with(identity, None).await;

        let outcome = gate.login("grace", "pw").await.unwrap();
        assert!(outcome.profile.is_none());
        assert_eq!(outcome.landing, routes::DASHBOARD);
        assert_eq!(store.get(SessionKey::AccessToken).await.as_deref(), Some("acc"));
        assert_eq!(store.get(SessionKey::TenantKey).await, None);
    }

    #[tokio::test]
    async fn settle_drops_session_on_unauthorized() {
        let identity = Arc::new(FakeIdentity::answering(Role::User));
        let (gate, store) = gate_with(identity, Some("acc")).await;

        let result: Result<(), _> = gate.settle(Err(BackendError::Unauthorized)).await;
        assert!(result.is_err());
        assert_eq!(store.get(SessionKey::AccessToken).await, None);
    }
}
