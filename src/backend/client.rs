//! HTTP client for the hospital REST backend.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use super::{
    error::{BackendError, GENERIC_FAILURE, Result},
    types::{ResourceKind, TokenPair, TokenRequest, UserProfile, error_message},
};
use crate::config::BackendConfig;

/// HTTP client for the backend API.
///
/// # Example
///
/// ```rust,no_run
/// use hospital_ops::backend::BackendClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BackendClient::new("http://localhost:8000")?;
///
/// let tokens = client.auth().obtain_token("nurse.joy", "secret").await?;
/// let me = client.auth().me(&tokens.access).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    http: reqwest::Client,
}

impl BackendClient {
    /// Create a client with default HTTP settings.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::CannotBeABase(base_url.to_string()));
        }
        Ok(Self { base_url, http })
    }

    /// Create a client from the `backend` config section.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(&config.base_url, http)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Token issuance and the current-user profile.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    /// Tenant-scoped CRUD collections.
    pub fn resources(&self) -> ResourceApi<'_> {
        ResourceApi { client: self }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Append percent-encoded segments plus a trailing slash to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::CannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    async fn error_for(response: reqwest::Response) -> BackendError {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
            StatusCode::NOT_FOUND => BackendError::NotFound,
            _ => {
                let body = response.text().await.unwrap_or_default();
                BackendError::Api {
                    status: status.as_u16(),
                    message: error_message(&body).unwrap_or_else(|| GENERIC_FAILURE.to_string()),
                }
            }
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::error_for(response).await)
        }
    }

    async fn handle_empty(response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_for(response).await)
        }
    }
}

// =============================================================================
// Auth API
// =============================================================================

/// Token issuance and profile endpoints.
#[derive(Debug)]
pub struct AuthApi<'a> {
    client: &'a BackendClient,
}

impl AuthApi<'_> {
    /// `POST /api/token/`: exchange credentials for access and refresh tokens.
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<TokenPair> {
        let req = TokenRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .http
            .post(self.client.url(&["api", "token"])?)
            .json(&req)
            .send()
            .await?;
        BackendClient::handle_response(response).await
    }

    /// `GET /api/me/`: the profile behind a bearer token.
    pub async fn me(&self, access_token: &str) -> Result<UserProfile> {
        let response = self
            .client
            .http
            .get(self.client.url(&["api", "me"])?)
            .bearer_auth(access_token)
            .send()
            .await?;
        BackendClient::handle_response(response).await
    }
}

// =============================================================================
// Resource API
// =============================================================================

/// CRUD calls scoped by a tenant path segment.
#[derive(Debug)]
pub struct ResourceApi<'a> {
    client: &'a BackendClient,
}

impl ResourceApi<'_> {
    /// `GET /api/{tenant}/{resource}/`
    pub async fn list<T: DeserializeOwned>(
        &self,
        access_token: &str,
        tenant: &str,
        kind: ResourceKind,
    ) -> Result<Vec<T>> {
        let url = self.client.url(&["api", tenant, kind.segment()])?;
        tracing::debug!(resource = kind.segment(), %tenant, "Listing resources");
        let response = self
            .client
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;
        BackendClient::handle_response(response).await
    }

    /// `GET /api/{tenant}/{resource}/{id}/`
    pub async fn get<T: DeserializeOwned>(
        &self,
        access_token: &str,
        tenant: &str,
        kind: ResourceKind,
        id: &str,
    ) -> Result<T> {
        let url = self.client.url(&["api", tenant, kind.segment(), id])?;
        let response = self
            .client
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;
        BackendClient::handle_response(response).await
    }

    /// `POST /api/{tenant}/{resource}/`
    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        access_token: &str,
        tenant: &str,
        kind: ResourceKind,
        body: &B,
    ) -> Result<T> {
        let url = self.client.url(&["api", tenant, kind.segment()])?;
        let response = self
            .client
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;
        BackendClient::handle_response(response).await
    }

    /// `DELETE /api/{tenant}/{resource}/{id}/`
    pub async fn delete(
        &self,
        access_token: &str,
        tenant: &str,
        kind: ResourceKind,
        id: &str,
    ) -> Result<()> {
        let url = self.client.url(&["api", tenant, kind.segment(), id])?;
        let response = self
            .client
            .http
            .delete(url)
            .bearer_auth(access_token)
            .send()
            .await?;
        BackendClient::handle_empty(response).await
    }
}
