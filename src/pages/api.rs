//! JSON endpoints behind the billing, maintenance and devices pages.

use axum::{Json, extract::State, http::StatusCode, response::Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::tools::csv_attachment;
use crate::AppState;
use crate::backend::{Device, Invoice, ResourceKind};
use crate::billing::{self, InvoiceTotals, LineItem};
use crate::error::AppError;
use crate::extract::ActiveSession;
use crate::maintenance::MaintenanceTask;
use crate::nfc::{self, LookupError, NfcError, ScannedRecord};

/// Line items and coverage as edited on the billing page.
#[derive(Debug, Deserialize)]
pub struct InvoiceDraft {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub coverage_percent: f64,
}

/// POST /api/invoices/preview
pub async fn invoice_preview(Json(draft): Json<InvoiceDraft>) -> Result<Json<InvoiceTotals>, AppError> {
    let totals = billing::compute_totals(&draft.items, draft.coverage_percent)?;
    Ok(Json(totals))
}

/// Body sent to the backend: the draft plus the totals computed here.
#[derive(Debug, Serialize)]
struct NewInvoice<'a> {
    items: &'a [LineItem],
    coverage_percent: f64,
    #[serde(flatten)]
    totals: InvoiceTotals,
}

#[derive(Debug, Serialize)]
pub struct SavedInvoice {
    pub invoice: Invoice,
    pub totals: InvoiceTotals,
}

/// POST /api/invoices - save the draft to the current hospital.
///
/// Totals are recomputed server-side; the client's figures are never sent.
pub async fn save_invoice(
    State(state): State<AppState>,
    ActiveSession(session): ActiveSession,
    Json(draft): Json<InvoiceDraft>,
) -> Result<(StatusCode, Json<SavedInvoice>), AppError> {
    let totals = billing::compute_totals(&draft.items, draft.coverage_percent)?;
    let tenant = session.scope().ok_or_else(AppError::missing_tenant)?;

    let body = NewInvoice {
        items: &draft.items,
        coverage_percent: draft.coverage_percent,
        totals,
    };
    let result = state
        .backend
        .resources()
        .create::<_, Invoice>(&session.access_token, tenant, ResourceKind::Invoices, &body)
        .await;
    let invoice = state.gate.settle(result).await?;

    tracing::info!(
        name: "invoice.saved",
        id = %invoice.id,
        total = %totals.total,
        "Invoice saved"
    );
    Ok((StatusCode::CREATED, Json(SavedInvoice { invoice, totals })))
}

/// Either a bare task array or `{"tasks": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExportRequest {
    Tasks(Vec<MaintenanceTask>),
    Wrapped { tasks: Vec<MaintenanceTask> },
}

impl ExportRequest {
    fn tasks(&self) -> &[MaintenanceTask] {
        match self {
            Self::Tasks(tasks) | Self::Wrapped { tasks } => tasks,
        }
    }
}

/// POST /api/maintenance/export - CSV of the posted schedule.
pub async fn maintenance_export(Json(req): Json<ExportRequest>) -> Response {
    csv_attachment(req.tasks(), Utc::now().date_naive())
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub device: Device,
}

/// POST /api/nfc/lookup - resolve a scanned tag to a device.
pub async fn nfc_lookup(
    State(state): State<AppState>,
    ActiveSession(session): ActiveSession,
    Json(record): Json<ScannedRecord>,
) -> Result<Json<LookupResponse>, AppError> {
    if !state.nfc.is_available() {
        return Err(LookupError::Tag(NfcError::Unsupported).into());
    }
    let tenant = session.scope().ok_or_else(AppError::missing_tenant)?;

    match nfc::lookup_device(&state.backend, &session.access_token, tenant, &record).await {
        Ok(device) => Ok(Json(LookupResponse { device })),
        Err(LookupError::Backend(e)) => {
            state.gate.observe(&e).await;
            Err(LookupError::Backend(e).into())
        }
        Err(e) => Err(e.into()),
    }
}
