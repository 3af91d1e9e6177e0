//! Handler-level errors and their HTTP rendering.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::backend::{BackendError, GENERIC_FAILURE};
use crate::billing::InvoiceError;
use crate::nfc::{LookupError, NfcError};
use crate::routes;
use crate::session::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    /// The session is gone; the caller is sent to login.
    #[error("unauthorized")]
    Unauthorized,

    #[error("{label} {id} not found")]
    NotFound { label: &'static str, id: String },

    /// Recoverable failure shown to the user as a toast.
    #[error("{message}")]
    Toast { status: StatusCode, message: String },
}

impl AppError {
    pub fn toast(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Toast {
            status,
            message: message.into(),
        }
    }

    pub fn missing_tenant() -> Self {
        Self::toast(
            StatusCode::CONFLICT,
            "No hospital is selected for this account.",
        )
    }

    /// Text for an inline toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => BackendError::Unauthorized.user_message(),
            Self::NotFound { label, .. } => format!("{label} not found."),
            Self::Toast { message, .. } => message.clone(),
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized => Self::Unauthorized,
            BackendError::NotFound => Self::NotFound {
                label: "Record",
                id: String::new(),
            },
            BackendError::Api { status, message } => Self::Toast {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            other => {
                tracing::warn!(name: "backend.request_failed", error = %other, "Backend request failed");
                Self::toast(StatusCode::BAD_GATEWAY, GENERIC_FAILURE)
            }
        }
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        Self::toast(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Tag(NfcError::Unsupported) => {
                Self::toast(StatusCode::NOT_IMPLEMENTED, NfcError::Unsupported.to_string())
            }
            LookupError::Tag(tag) => Self::toast(StatusCode::UNPROCESSABLE_ENTITY, tag.to_string()),
            LookupError::Backend(BackendError::NotFound) => Self::NotFound {
                label: "Device",
                id: String::new(),
            },
            LookupError::Backend(backend) => backend.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(name: "session.store_failed", error = %err, "Token store write failed");
        Self::toast(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not save your session on this device.",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => Redirect::to(routes::LOGIN).into_response(),
            Self::NotFound { .. } => {
                let body = json!({ "toast": self.user_message() });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            Self::Toast { status, message } => {
                (status, Json(json!({ "toast": message }))).into_response()
            }
        }
    }
}
