//! Page and API handlers.
//!
//! Every page has a live handler, gated by [`Authenticated`] or
//! [`AdminOnly`], and a demo twin that renders the same content from
//! [`samples`] without a session.
//!
//! [`Authenticated`]: crate::extract::Authenticated
//! [`AdminOnly`]: crate::extract::AdminOnly

pub mod api;
pub mod auth;
pub mod overview;
pub mod records;
pub mod samples;
pub mod tools;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;

use crate::AppState;
use crate::error::AppError;
use crate::routes;
use crate::shell::PageShell;

/// Render `content` inside the shell.
pub(crate) fn page(state: &AppState, shell: PageShell<'_>, content: &str) -> Html<String> {
    Html(shell.render(content, &state.config.shell, Utc::now()))
}

/// Render a failed page load: redirect when the session is gone, otherwise
/// the shell with a toast (or the inline not-found state) in place of data.
pub(crate) fn failed_page(
    state: &AppState,
    shell: PageShell<'_>,
    err: AppError,
    fallback: &str,
) -> Response {
    match err {
        AppError::Unauthorized => Redirect::to(routes::LOGIN).into_response(),
        AppError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, page(state, shell, fallback)).into_response()
        }
        AppError::Toast { .. } => {
            let message = err.user_message();
            page(state, shell.toast(message), fallback).into_response()
        }
    }
}
