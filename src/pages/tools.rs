//! Billing and maintenance pages.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};

use super::{page, samples};
use crate::AppState;
use crate::billing::TAX_RATE_PERCENT;
use crate::extract::{ActiveSession, Authenticated};
use crate::maintenance::{self, MaintenanceTask};
use crate::routes::{Namespace, Page};
use crate::shell::{PageShell, Viewer, html};

/// Path of the CSV download, relative to the maintenance page.
pub const EXPORT_SUFFIX: &str = "/export.csv";

fn billing_content(namespace: Namespace) -> String {
    let row = r#"<tr data-line>
        <td><input name="description" class="rounded-xl border px-2 py-1"></td>
        <td><input name="quantity" type="number" min="0" step="1" value="1" class="w-20 rounded-xl border px-2 py-1"></td>
        <td><input name="rate" type="number" min="0" step="0.01" value="0" class="w-28 rounded-xl border px-2 py-1"></td>
    </tr>"#;
    let save = if namespace.is_demo() {
        r#"<button type="submit" class="px-3 py-2 rounded-xl bg-surfaceVariant" disabled>Save invoice</button>
    <span class="text-sm text-textMuted">Sign in to save invoices.</span>"#
    } else {
        r#"<button type="submit" class="px-3 py-2 rounded-xl bg-primary text-white">Save invoice</button>"#
    };
    html::card(
        "New invoice",
        &format!(
            r#"<form data-invoice-form data-endpoint="/api/invoices/preview" data-save-endpoint="/api/invoices" class="space-y-4">
    <table class="w-full text-sm">
        <thead><tr><th class="text-left">Description</th><th class="text-left">Qty</th><th class="text-left">Rate</th></tr></thead>
        <tbody>{row}{row}{row}</tbody>
    </table>
    <label class="block">Insurance coverage (%)
        <input name="coverage_percent" type="number" min="0" max="100" step="1" value="0" class="w-24 rounded-xl border px-2 py-1">
    </label>
    <dl class="invoice-totals grid grid-cols-2 gap-1 text-sm">
        <dt>Subtotal</dt><dd data-total="subtotal">0.00</dd>
        <dt>Tax ({TAX_RATE_PERCENT}%)</dt><dd data-total="tax">0.00</dd>
        <dt>Total</dt><dd data-total="total">0.00</dd>
        <dt>Covered by insurance</dt><dd data-total="covered">0.00</dd>
        <dt>Patient pays</dt><dd data-total="out_of_pocket">0.00</dd>
    </dl>
    <div class="flex items-center gap-3">{save}</div>
</form>"#
        ),
    )
}

fn maintenance_content(tasks: &[MaintenanceTask], namespace: Namespace) -> String {
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.device.clone(),
                t.task.clone(),
                t.scheduled_date.format("%Y-%m-%d").to_string(),
                t.technician.clone().unwrap_or_else(|| "Unassigned".into()),
                t.status.label().to_string(),
            ]
        })
        .collect();
    let export = format!(
        r#"<a href="{}{EXPORT_SUFFIX}" class="inline-flex mb-4 px-3 py-2 rounded-xl bg-primary text-white" download>Export CSV</a>"#,
        namespace.href(Page::Maintenance)
    );
    html::card(
        "Maintenance schedule",
        &format!(
            "{export}{}",
            html::table(
                &["ID", "Device", "Task", "Scheduled", "Technician", "Status"],
                &rows
            )
        ),
    )
}

/// CSV download with the dated file name.
pub(crate) fn csv_attachment(tasks: &[MaintenanceTask], day: NaiveDate) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        maintenance::file_name(day)
    );
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        maintenance::to_csv(tasks),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /billing
pub async fn billing(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> impl IntoResponse {
    page(
        &state,
        PageShell::for_page(Page::Billing, Viewer::Session(&ctx)),
        &billing_content(Namespace::Live),
    )
}

pub async fn demo_billing(State(state): State<AppState>) -> impl IntoResponse {
    let profile = samples::profile(Utc::now());
    page(
        &state,
        PageShell::for_page(Page::Billing, Viewer::Demo(&profile)),
        &billing_content(Namespace::Demo),
    )
}

/// GET /maintenance
pub async fn maintenance(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> impl IntoResponse {
    let tasks = samples::maintenance_tasks(Utc::now().date_naive());
    page(
        &state,
        PageShell::for_page(Page::Maintenance, Viewer::Session(&ctx)),
        &maintenance_content(&tasks, Namespace::Live),
    )
}

pub async fn demo_maintenance(State(state): State<AppState>) -> impl IntoResponse {
    let profile = samples::profile(Utc::now());
    let tasks = samples::maintenance_tasks(Utc::now().date_naive());
    page(
        &state,
        PageShell::for_page(Page::Maintenance, Viewer::Demo(&profile)),
        &maintenance_content(&tasks, Namespace::Demo),
    )
}

/// GET /maintenance/export.csv
pub async fn export_schedule(ActiveSession(_session): ActiveSession) -> Response {
    let today = Utc::now().date_naive();
    csv_attachment(&samples::maintenance_tasks(today), today)
}

/// GET /demo/maintenance/export.csv
pub async fn demo_export_schedule() -> Response {
    let today = Utc::now().date_naive();
    csv_attachment(&samples::maintenance_tasks(today), today)
}
