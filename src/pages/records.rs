//! Tenant-scoped record listings: patients, devices, suppliers, tickets.

use std::fmt::Write;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::de::DeserializeOwned;

use super::{failed_page, page, samples};
use crate::AppState;
use crate::backend::{BackendError, Device, Patient, ResourceKind, Supplier, Ticket};
use crate::error::AppError;
use crate::extract::Authenticated;
use crate::routes::{self, Namespace, Page};
use crate::session::SessionContext;
use crate::shell::{PageShell, Viewer, html};

/// A backend collection rendered as a table.
pub trait Listing: DeserializeOwned + Send + Sync + 'static {
    const KIND: ResourceKind;
    const PAGE: Page;
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    fn samples() -> Vec<Self>;

    /// Detail link for a row, if the kind has a detail page.
    fn href(&self, _namespace: Namespace) -> Option<String> {
        None
    }

    /// Per-row action markup, such as a delete form.
    fn action(&self, _namespace: Namespace) -> Option<String> {
        None
    }

    /// Markup placed above the table.
    fn toolbar(_state: &AppState, _namespace: Namespace) -> String {
        String::new()
    }
}

fn or_dash(value: Option<&String>) -> String {
    value.map_or_else(|| "-".to_string(), Clone::clone)
}

impl Listing for Patient {
    const KIND: ResourceKind = ResourceKind::Patients;
    const PAGE: Page = Page::Patients;
    const HEADERS: &'static [&'static str] = &["Name", "Date of birth", "Ward"];

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{} {}", self.first_name, self.last_name),
            or_dash(self.date_of_birth.as_ref()),
            or_dash(self.ward.as_ref()),
        ]
    }

    fn samples() -> Vec<Self> {
        samples::patients()
    }

    fn href(&self, namespace: Namespace) -> Option<String> {
        Some(format!("{}/{}", namespace.href(Page::Patients), self.id))
    }
}

impl Listing for Device {
    const KIND: ResourceKind = ResourceKind::Devices;
    const PAGE: Page = Page::Devices;
    const HEADERS: &'static [&'static str] = &["Name", "Serial number", "Status", "Location"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            or_dash(self.serial_number.as_ref()),
            or_dash(self.status.as_ref()),
            or_dash(self.location.as_ref()),
        ]
    }

    fn samples() -> Vec<Self> {
        samples::devices()
    }

    fn toolbar(state: &AppState, namespace: Namespace) -> String {
        nfc_toolbar(state, namespace)
    }
}

impl Listing for Supplier {
    const KIND: ResourceKind = ResourceKind::Suppliers;
    const PAGE: Page = Page::Suppliers;
    const HEADERS: &'static [&'static str] = &["Name", "Email", "Phone"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            or_dash(self.contact_email.as_ref()),
            or_dash(self.phone.as_ref()),
        ]
    }

    fn samples() -> Vec<Self> {
        samples::suppliers()
    }
}

impl Listing for Ticket {
    const KIND: ResourceKind = ResourceKind::Tickets;
    const PAGE: Page = Page::Tickets;
    const HEADERS: &'static [&'static str] = &["Title", "Status", "Priority"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            or_dash(self.status.as_ref()),
            or_dash(self.priority.as_ref()),
        ]
    }

    fn samples() -> Vec<Self> {
        samples::tickets()
    }

    fn action(&self, namespace: Namespace) -> Option<String> {
        if namespace.is_demo() {
            return None;
        }
        Some(format!(
            r#"<form method="post" action="{}" data-confirm="Delete this ticket?">
    <button type="submit" class="text-sm text-danger">Delete</button>
</form>"#,
            html::escape(&delete_path(Self::PAGE, &self.id.to_string()))
        ))
    }
}

/// Scan action on the devices page. Disabled, with a reason, when this
/// installation cannot scan or the page is a demo.
fn nfc_toolbar(state: &AppState, namespace: Namespace) -> String {
    let disabled_reason = if namespace.is_demo() {
        Some("Sign in to scan device tags.")
    } else if !state.nfc.is_available() {
        Some("NFC scanning is not supported on this device.")
    } else {
        None
    };

    match disabled_reason {
        None => r#"<div class="nfc flex items-center gap-3">
    <button type="button" class="px-3 py-2 rounded-xl bg-primary text-white" data-nfc-scan data-endpoint="/api/nfc/lookup">Scan tag</button>
    <span class="nfc-result text-sm" aria-live="polite"></span>
</div>"#
            .to_string(),
        Some(reason) => format!(
            r#"<div class="nfc flex items-center gap-3">
    <button type="button" class="px-3 py-2 rounded-xl bg-surfaceVariant" disabled>Scan tag</button>
    <span class="text-sm text-textMuted">{reason}</span>
</div>"#
        ),
    }
}

/// Form target that deletes one record of a listed page.
fn delete_path(page: Page, id: &str) -> String {
    format!("{}/{id}{DELETE_SUFFIX}", page.path())
}

/// Path suffix of the delete action, relative to a record.
pub const DELETE_SUFFIX: &str = "/delete";

fn listing_content<T: Listing>(state: &AppState, namespace: Namespace, items: &[T]) -> String {
    let rows: Vec<html::Row> = items
        .iter()
        .map(|item| html::Row {
            href: item.href(namespace),
            cells: item.cells(),
            action: item.action(namespace),
        })
        .collect();
    let table = html::record_table(T::HEADERS, &rows);
    format!("{}{}", T::toolbar(state, namespace), html::card(T::PAGE.title(), &table))
}

async fn fetch_list<T: Listing>(state: &AppState, ctx: &SessionContext) -> Result<Vec<T>, AppError> {
    let tenant = ctx.scope().ok_or_else(AppError::missing_tenant)?;
    let result = state
        .backend
        .resources()
        .list::<T>(&ctx.session.access_token, tenant, T::KIND)
        .await;
    Ok(state.gate.settle(result).await?)
}

/// GET `/patients`, `/devices`, `/suppliers`, `/tickets`
pub async fn live<T: Listing>(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> Response {
    let shell = PageShell::for_page(T::PAGE, Viewer::Session(&ctx));
    match fetch_list::<T>(&state, &ctx).await {
        Ok(items) => page(&state, shell, &listing_content(&state, Namespace::Live, &items))
            .into_response(),
        Err(err) => {
            tracing::warn!(
                name: "page.load_failed",
                resource = T::KIND.segment(),
                error = %err,
                "Listing unavailable"
            );
            let empty = listing_content::<T>(&state, Namespace::Live, &[]);
            failed_page(&state, shell, err, &empty)
        }
    }
}

/// GET `/demo/patients`, ...
pub async fn demo<T: Listing>(State(state): State<AppState>) -> Response {
    let profile = samples::profile(Utc::now());
    let shell = PageShell::for_page(T::PAGE, Viewer::Demo(&profile));
    let content = listing_content(&state, Namespace::Demo, &T::samples());
    page(&state, shell, &content).into_response()
}

/// POST `/tickets/{id}/delete`
///
/// Success returns to the listing. A rejected token ends the session; any
/// other failure re-renders the listing with a toast.
pub async fn delete_record<T: Listing>(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
) -> Response {
    let removed = async {
        let tenant = ctx.scope().ok_or_else(AppError::missing_tenant)?;
        let result = state
            .backend
            .resources()
            .delete(&ctx.session.access_token, tenant, T::KIND, &id)
            .await;
        match state.gate.settle(result).await {
            Ok(()) => Ok::<_, AppError>(()),
            Err(BackendError::NotFound) => Err(AppError::NotFound {
                label: T::KIND.singular(),
                id: id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
    .await;

    match removed {
        Ok(()) => {
            tracing::info!(
                name: "record.deleted",
                resource = T::KIND.segment(),
                id = %id,
                "Record deleted"
            );
            Redirect::to(T::PAGE.path()).into_response()
        }
        Err(AppError::Unauthorized) => Redirect::to(routes::LOGIN).into_response(),
        Err(err) => {
            tracing::warn!(
                name: "record.delete_failed",
                resource = T::KIND.segment(),
                id = %id,
                error = %err,
                "Delete refused"
            );
            let status = match &err {
                AppError::NotFound { .. } => StatusCode::NOT_FOUND,
                AppError::Toast { status, .. } => *status,
                AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            };
            let items = fetch_list::<T>(&state, &ctx).await.unwrap_or_default();
            let shell = PageShell::for_page(T::PAGE, Viewer::Session(&ctx)).toast(err.user_message());
            let content = listing_content(&state, Namespace::Live, &items);
            (status, page(&state, shell, &content)).into_response()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Patient detail
// ─────────────────────────────────────────────────────────────────────────────

fn patient_content(patient: &Patient, namespace: Namespace) -> String {
    let rows = [
        ("Name", format!("{} {}", patient.first_name, patient.last_name)),
        ("Date of birth", or_dash(patient.date_of_birth.as_ref())),
        ("Ward", or_dash(patient.ward.as_ref())),
    ];
    let mut body = String::from(r#"<dl class="grid grid-cols-2 gap-2 text-sm">"#);
    for (label, value) in rows {
        let _ = write!(
            body,
            r#"<dt class="text-textMuted">{}</dt><dd>{}</dd>"#,
            html::escape(label),
            html::escape(&value)
        );
    }
    body.push_str("</dl>");
    let _ = write!(
        body,
        r#"<a href="{}" class="text-primary">Back to patients</a>"#,
        namespace.href(Page::Patients)
    );
    html::card(&format!("Patient {}", patient.id), &body)
}

fn patient_not_found(id: &str, namespace: Namespace) -> String {
    html::not_found(
        ResourceKind::Patients.singular(),
        id,
        &namespace.href(Page::Patients),
    )
}

/// GET `/patients/{id}`
///
/// An unknown id renders the inline not-found state inside the shell.
pub async fn patient_detail(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
) -> Response {
    let here = format!("{}/{id}", Page::Patients.path());
    let shell = PageShell::for_page(Page::Patients, Viewer::Session(&ctx)).at(&here);
    let loaded = async {
        let tenant = ctx.scope().ok_or_else(AppError::missing_tenant)?;
        let result = state
            .backend
            .resources()
            .get::<Patient>(&ctx.session.access_token, tenant, ResourceKind::Patients, &id)
            .await;
        Ok::<_, AppError>(state.gate.settle(result).await?)
    }
    .await;

    match loaded {
        Ok(patient) => {
            if let Err(e) = state.sessions().select_patient(&id).await {
                tracing::warn!(name: "session.select_failed", error = %e, "Could not remember patient");
            }
            page(&state, shell, &patient_content(&patient, Namespace::Live)).into_response()
        }
        Err(err @ AppError::NotFound { .. }) => {
            failed_page(&state, shell, err, &patient_not_found(&id, Namespace::Live))
        }
        Err(err) => failed_page(&state, shell, err, ""),
    }
}

/// GET `/demo/patients/{id}`
pub async fn demo_patient_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let profile = samples::profile(Utc::now());
    let shell = PageShell::for_page(Page::Patients, Viewer::Demo(&profile));
    let found = samples::patients()
        .into_iter()
        .find(|p| p.id.to_string() == id);

    match found {
        Some(patient) => page(&state, shell, &patient_content(&patient, Namespace::Demo))
            .into_response(),
        None => failed_page(
            &state,
            shell,
            AppError::NotFound {
                label: ResourceKind::Patients.singular(),
                id: id.clone(),
            },
            &patient_not_found(&id, Namespace::Demo),
        ),
    }
}

