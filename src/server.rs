use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    routing::{get, post},
};
use std::time::Duration;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::backend::{Device, Patient, Supplier, Ticket};
use crate::pages::{api, auth, overview, records, tools};
use crate::routes::{self, Page};
use crate::security;

/// Build the full router: live pages, their demo twins, JSON endpoints and
/// static assets.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/", get(overview::root))
        // Session
        .route(routes::LOGIN, get(auth::login_page).post(auth::login_submit))
        .route(routes::LOGOUT, post(auth::logout))
        // Live pages
        .merge(live_pages())
        .route(overview::ADMIN_HOSPITAL, post(overview::select_hospital))
        .route("/patients/{id}", get(records::patient_detail))
        .route(
            &format!("{}{}", Page::Maintenance.path(), tools::EXPORT_SUFFIX),
            get(tools::export_schedule),
        )
        // Demo namespace
        .nest(routes::DEMO_PREFIX, demo_pages())
        // API
        .route("/api/invoices", post(api::save_invoice))
        .route("/api/invoices/preview", post(api::invoice_preview))
        .route("/api/maintenance/export", post(api::maintenance_export))
        .route("/api/nfc/lookup", post(api::nfc_lookup))
        // Static assets
        .nest_service("/static", ServeDir::new("static"))
        .layer(axum::middleware::from_fn(security::same_origin))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
            tracing::info_span!(
                "request",
                id = %uuid::Uuid::new_v4(),
                method = %req.method(),
                path = %req.uri().path(),
            )
        }))
        .with_state(state)
}

fn live_pages() -> Router<AppState> {
    Router::new()
        .route(Page::Dashboard.path(), get(overview::dashboard))
        .route(Page::AdminDashboard.path(), get(overview::admin_dashboard))
        .route(Page::Inventory.path(), get(overview::inventory))
        .route(Page::Analytics.path(), get(overview::analytics))
        .route(Page::Patients.path(), get(records::live::<Patient>))
        .route(Page::Devices.path(), get(records::live::<Device>))
        .route(Page::Suppliers.path(), get(records::live::<Supplier>))
        .route(Page::Tickets.path(), get(records::live::<Ticket>))
        .route(
            &format!("{}/{{id}}{}", Page::Tickets.path(), records::DELETE_SUFFIX),
            post(records::delete_record::<Ticket>),
        )
        .route(Page::Billing.path(), get(tools::billing))
        .route(Page::Maintenance.path(), get(tools::maintenance))
}

/// Same table as [`live_pages`], no gate, sample data.
fn demo_pages() -> Router<AppState> {
    Router::new()
        .route("/", get(overview::demo_root))
        .route(Page::Dashboard.path(), get(overview::demo_dashboard))
        .route(Page::AdminDashboard.path(), get(overview::demo_admin_dashboard))
        .route(Page::Inventory.path(), get(overview::demo_inventory))
        .route(Page::Analytics.path(), get(overview::demo_analytics))
        .route(Page::Patients.path(), get(records::demo::<Patient>))
        .route("/patients/{id}", get(records::demo_patient_detail))
        .route(Page::Devices.path(), get(records::demo::<Device>))
        .route(Page::Suppliers.path(), get(records::demo::<Supplier>))
        .route(Page::Tickets.path(), get(records::demo::<Ticket>))
        .route(Page::Billing.path(), get(tools::demo_billing))
        .route(Page::Maintenance.path(), get(tools::demo_maintenance))
        .route(
            &format!("{}{}", Page::Maintenance.path(), tools::EXPORT_SUFFIX),
            get(tools::demo_export_schedule),
        )
}

/// Bind and serve until the process is stopped.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    info!(
        name: "backend.configured",
        base_url = %state.backend.base_url(),
        nfc = state.nfc.is_available(),
        "Backend client ready"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
