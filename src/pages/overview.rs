//! Dashboards, inventory and analytics.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use super::{page, samples};
use crate::AppState;
use crate::backend::UserProfile;
use crate::error::AppError;
use crate::extract::{AdminOnly, Authenticated};
use crate::routes::{self, Namespace, Page};
use crate::shell::{PageShell, Viewer, html};

// ─────────────────────────────────────────────────────────────────────────────
// Content
// ─────────────────────────────────────────────────────────────────────────────

fn dashboard_content(profile: Option<&UserProfile>, namespace: Namespace) -> String {
    let greeting = profile.map_or_else(
        || "Welcome back.".to_string(),
        |p| format!("Welcome back, {}.", p.display_name()),
    );
    let plan = profile
        .and_then(|p| p.subscription.as_ref())
        .map(|s| format!("Current plan: {}", s.plan))
        .unwrap_or_default();

    let links: String = [Page::Patients, Page::Devices, Page::Tickets, Page::Maintenance]
        .into_iter()
        .map(|p| {
            format!(
                r#"<a href="{}" class="rounded-xl border p-4 hover:bg-surface">{}</a>"#,
                namespace.href(p),
                p.title()
            )
        })
        .collect();

    format!(
        r#"{}
<div class="grid grid-cols-2 md:grid-cols-4 gap-4">{links}</div>"#,
        html::card(
            "Overview",
            &format!(
                r#"<p>{}</p><p class="text-sm text-textMuted">{}</p>"#,
                html::escape(&greeting),
                html::escape(&plan)
            )
        )
    )
}

fn admin_content(current_scope: Option<&str>, namespace: Namespace) -> String {
    let scope = current_scope.unwrap_or("none");
    let form = if namespace.is_demo() {
        r#"<p class="text-sm text-textMuted">Hospital selection is disabled in demo mode.</p>"#
            .to_string()
    } else {
        format!(
            r#"<form method="post" action="{}" class="flex gap-3">
    <input name="hospital_id" placeholder="Hospital key" required class="rounded-xl border px-3 py-2">
    <button type="submit" class="px-4 py-2 rounded-xl bg-primary text-white">Switch hospital</button>
</form>"#,
            ADMIN_HOSPITAL
        )
    };
    html::card(
        "Hospital scope",
        &format!(
            r#"<p class="mb-4">Active hospital: <code>{}</code></p>{form}"#,
            html::escape(scope)
        ),
    )
}

fn inventory_content() -> String {
    let rows = [
        ("Nitrile gloves (box of 100)", "412", "150"),
        ("Sterile gauze 10x10", "1,280", "500"),
        ("IV cannula 20G", "96", "120"),
        ("Syringe 5 ml", "2,040", "800"),
    ]
    .into_iter()
    .map(|(item, on_hand, reorder)| vec![item.to_string(), on_hand.to_string(), reorder.to_string()])
    .collect::<Vec<_>>();
    html::card(
        "Stock levels",
        &html::table(&["Item", "On hand", "Reorder at"], &rows),
    )
}

fn analytics_content() -> String {
    let stats = [
        ("Patients", samples::patients().len()),
        ("Devices", samples::devices().len()),
        ("Open tickets", samples::tickets().len()),
        ("Suppliers", samples::suppliers().len()),
    ];
    let tiles: String = stats
        .into_iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="rounded-xl border p-4"><p class="text-sm text-textMuted">{label}</p><p class="text-2xl font-semibold">{value}</p></div>"#
            )
        })
        .collect();
    html::card(
        "Activity",
        &format!(r#"<div class="grid grid-cols-2 md:grid-cols-4 gap-4">{tiles}</div>"#),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Live handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form target for the admin hospital selector.
pub const ADMIN_HOSPITAL: &str = "/admin/hospital";

/// GET /
pub async fn root() -> Redirect {
    Redirect::to(routes::DASHBOARD)
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> impl IntoResponse {
    let content = dashboard_content(ctx.profile(), Namespace::Live);
    page(&state, PageShell::for_page(Page::Dashboard, Viewer::Session(&ctx)), &content)
}

/// GET /admin/dashboard
pub async fn admin_dashboard(
    State(state): State<AppState>,
    AdminOnly(ctx): AdminOnly,
) -> impl IntoResponse {
    let content = format!(
        "{}{}",
        dashboard_content(ctx.profile(), Namespace::Live),
        admin_content(ctx.scope(), Namespace::Live)
    );
    page(
        &state,
        PageShell::for_page(Page::AdminDashboard, Viewer::Session(&ctx)),
        &content,
    )
}

#[derive(Debug, Deserialize)]
pub struct HospitalSelection {
    pub hospital_id: String,
}

/// POST /admin/hospital - scope the session to another hospital.
pub async fn select_hospital(
    State(state): State<AppState>,
    AdminOnly(_ctx): AdminOnly,
    Form(selection): Form<HospitalSelection>,
) -> Result<Response, AppError> {
    let hospital_id = selection.hospital_id.trim();
    if hospital_id.is_empty() {
        return Err(AppError::missing_tenant());
    }
    state.sessions().select_hospital(hospital_id).await?;
    tracing::info!(name: "session.hospital_selected", hospital_id, "Hospital scope changed");
    Ok(Redirect::to(routes::ADMIN_DASHBOARD).into_response())
}

/// GET /inventory
pub async fn inventory(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> impl IntoResponse {
    page(
        &state,
        PageShell::for_page(Page::Inventory, Viewer::Session(&ctx)),
        &inventory_content(),
    )
}

/// GET /analytics
pub async fn analytics(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> impl IntoResponse {
    page(
        &state,
        PageShell::for_page(Page::Analytics, Viewer::Session(&ctx)),
        &analytics_content(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Demo handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /demo
pub async fn demo_root() -> Redirect {
    Redirect::to(&routes::demo_path(routes::DASHBOARD))
}

pub async fn demo_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let profile = samples::profile(Utc::now());
    let content = dashboard_content(Some(&profile), Namespace::Demo);
    page(&state, PageShell::for_page(Page::Dashboard, Viewer::Demo(&profile)), &content)
}

pub async fn demo_admin_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let profile = samples::profile(Utc::now());
    let content = format!(
        "{}{}",
        dashboard_content(Some(&profile), Namespace::Demo),
        admin_content(profile.tenant_key.as_deref(), Namespace::Demo)
    );
    page(
        &state,
        PageShell::for_page(Page::AdminDashboard, Viewer::Demo(&profile)),
        &content,
    )
}

pub async fn demo_inventory(State(state): State<AppState>) -> impl IntoResponse {
    let profile = samples::profile(Utc::now());
    page(
        &state,
        PageShell::for_page(Page::Inventory, Viewer::Demo(&profile)),
        &inventory_content(),
    )
}

pub async fn demo_analytics(State(state): State<AppState>) -> impl IntoResponse {
    let profile = samples::profile(Utc::now());
    page(
        &state,
        PageShell::for_page(Page::Analytics, Viewer::Demo(&profile)),
        &analytics_content(),
    )
}
