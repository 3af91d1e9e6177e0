//! In-process stand-in for the hospital REST backend.
//!
//! Tokens understood by `/api/me/`:
//! - `admin-token`, `nurse-token`: valid admin / employee
//! - `half-expired`: valid for `/api/me/`, rejected by resource endpoints
//! - `flaky`: `/api/me/` answers 503
//! - anything else: 401

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use hospital_ops::config::{
    AppConfig, BackendConfig, LogConfig, NfcConfig, ServerConfig, SessionConfig, ShellConfig,
};

pub const TENANT: &str = "st-marys";

#[derive(Clone, Debug, Default)]
pub struct FakeBackend {
    me_calls: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }
}

fn bearer(headers: &HeaderMap) -> &str {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Token is invalid or expired"})),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

async fn token(Json(body): Json<Value>) -> Response {
    let pair = |access: &str, refresh: &str| {
        Json(json!({"access": access, "refresh": refresh})).into_response()
    };
    match (body["username"].as_str(), body["password"].as_str()) {
        (Some("admin"), Some("pw")) => pair("admin-token", "admin-refresh"),
        (Some("nurse"), Some("pw")) => pair("nurse-token", "nurse-refresh"),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response(),
    }
}

async fn me(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    backend.me_calls.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers) {
        "admin-token" => Json(json!({
            "id": 1,
            "first_name": "Ada",
            "last_name": "Okafor",
            "email": "ada@example.org",
            "type": "admin",
            "instance_key": TENANT,
            "subscription": {"plan_name": "Pro", "end_date": "2099-01-01"}
        }))
        .into_response(),
        "nurse-token" | "half-expired" => Json(json!({
            "id": 2,
            "first_name": "Joy",
            "last_name": "Mensah",
            "email": "joy@example.org",
            "type": "employee",
            "hospital_key": TENANT
        }))
        .into_response(),
        "flaky" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"detail": "Profile service is down"})),
        )
            .into_response(),
        _ => unauthorized(),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    matches!(bearer(headers), "admin-token" | "nurse-token" | "flaky")
}

fn records(resource: &str) -> Option<Value> {
    match resource {
        "patients" => Some(json!([
            {"id": 1, "first_name": "Amara", "last_name": "Bello", "ward": "ICU"},
            {"id": 2, "first_name": "Tomasz", "last_name": "Nowak"}
        ])),
        "devices" => Some(json!([
            {"id": "DEV-0042", "name": "Infusion pump", "location": "Ward 3"}
        ])),
        "tickets" => Some(json!([
            {"id": 201, "title": "Leaking tap in Ward 3", "status": "open", "priority": "low"}
        ])),
        "suppliers" | "invoices" => Some(json!([])),
        _ => None,
    }
}

async fn list(
    Path((tenant, resource)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if tenant != TENANT {
        return not_found();
    }
    records(&resource).map_or_else(not_found, |v| Json(v).into_response())
}

async fn create(
    Path((tenant, resource)): Path<(String, String)>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if tenant != TENANT || records(&resource).is_none() {
        return not_found();
    }
    if body.get("name").and_then(Value::as_str) == Some("") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"name": ["This field may not be blank."], "detail": ["Name is required."]})),
        )
            .into_response();
    }
    let no_lines = body
        .get("items")
        .and_then(Value::as_array)
        .is_some_and(Vec::is_empty);
    if resource == "invoices" && no_lines {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "An invoice needs at least one line item."})),
        )
            .into_response();
    }
    body["id"] = json!(99);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn detail(
    Path((tenant, resource, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if tenant != TENANT {
        return not_found();
    }
    let found = records(&resource)
        .and_then(|list| list.as_array().cloned())
        .and_then(|items| {
            items.into_iter().find(|item| match &item["id"] {
                Value::Number(n) => n.to_string() == id,
                Value::String(s) => *s == id,
                _ => false,
            })
        });
    found.map_or_else(not_found, |v| Json(v).into_response())
}

async fn remove(
    Path((tenant, _resource, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if tenant != TENANT || id == "missing" {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Serve the fake backend on an ephemeral port; returns its base URL.
pub async fn spawn_backend() -> (String, FakeBackend) {
    let backend = FakeBackend::default();
    let app = Router::new()
        .route("/api/token/", post(token))
        .route("/api/me/", get(me))
        .route("/api/{tenant}/{resource}/", get(list).post(create))
        .route("/api/{tenant}/{resource}/{id}/", get(detail).delete(remove))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

pub fn config(base_url: &str) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".into(),
            request_timeout_secs: 10,
        },
        backend: BackendConfig {
            base_url: base_url.into(),
            timeout_secs: 5,
        },
        session: SessionConfig {
            store_path: "unused-session.json".into(),
        },
        shell: ShellConfig {
            upgrade_threshold_days: 5,
            placeholder_days: 30,
        },
        nfc: NfcConfig { enabled: true },
        log: LogConfig { json: false },
    }
}
