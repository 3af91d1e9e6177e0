//! Request extractors that run the session gate.
//!
//! Putting the gate in an extractor means a protected handler cannot run
//! before the decision is made, and the rejection is always a redirect.

use axum::{extract::FromRequestParts, http::request::Parts, response::Redirect};

use crate::AppState;
use crate::routes;
use crate::session::{GateDecision, Session, SessionContext};

/// A gated page: session present, profile fetched once.
#[derive(Debug)]
pub struct Authenticated(pub SessionContext);

/// Like [`Authenticated`], restricted to admins.
#[derive(Debug)]
pub struct AdminOnly(pub SessionContext);

/// A token is present. No profile fetch; used by JSON endpoints whose own
/// backend call settles the session.
#[derive(Debug)]
pub struct ActiveSession(pub Session);

fn admit(decision: GateDecision) -> Result<SessionContext, Redirect> {
    match decision {
        GateDecision::Admit(ctx) => Ok(*ctx),
        GateDecision::Redirect(to) => Err(Redirect::to(&to)),
    }
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Redirect;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(state.gate.check().await).map(Self)
    }
}

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = Redirect;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(state.gate.check_admin().await).map(Self)
    }
}

impl FromRequestParts<AppState> for ActiveSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .sessions()
            .current()
            .await
            .map(Self)
            .ok_or_else(|| Redirect::to(routes::LOGIN))
    }
}
