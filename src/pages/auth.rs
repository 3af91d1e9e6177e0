//! Sign in and sign out.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::page;
use crate::AppState;
use crate::routes;
use crate::session::LoginError;
use crate::shell::{PageShell, Viewer, html};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn login_form(username: &str) -> String {
    html::card(
        "Sign in",
        &format!(
            r#"<form method="post" action="{}" class="space-y-4">
    <label class="block">Username
        <input name="username" value="{}" autocomplete="username" required class="w-full rounded-xl border px-3 py-2">
    </label>
    <label class="block">Password
        <input type="password" name="password" autocomplete="current-password" required class="w-full rounded-xl border px-3 py-2">
    </label>
    <button type="submit" class="px-4 py-2 rounded-xl bg-primary text-white">Sign in</button>
</form>
<p class="mt-4 text-sm"><a href="{}" class="text-primary">Explore the demo</a></p>"#,
            routes::LOGIN,
            html::escape(username),
            routes::demo_path(routes::DASHBOARD)
        ),
    )
}

/// GET /login
pub async fn login_page(State(state): State<AppState>) -> impl IntoResponse {
    let shell = PageShell::new("Sign in", Viewer::Anonymous).without_sidebar();
    page(&state, shell, &login_form(""))
}

/// POST /login - store tokens, then land by role.
pub async fn login_submit(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> Response {
    match state
        .gate
        .login(&credentials.username, &credentials.password)
        .await
    {
        Ok(outcome) => Redirect::to(outcome.landing).into_response(),
        Err(err) => {
            let status = match &err {
                LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                LoginError::Backend(_) => StatusCode::BAD_GATEWAY,
                LoginError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::info!(name: "session.login_failed", error = %err, "Sign in failed");
            let shell = PageShell::new("Sign in", Viewer::Anonymous)
                .without_sidebar()
                .toast(err.user_message());
            (status, page(&state, shell, &login_form(&credentials.username))).into_response()
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<AppState>) -> Response {
    if let Err(e) = state.gate.logout().await {
        tracing::error!(name: "session.logout_failed", error = %e, "Could not clear session");
    }
    Redirect::to(routes::LOGIN).into_response()
}
