//! Wire types exchanged with the REST backend.
//!
//! Only the fields the pages read are modeled; unknown fields are ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Authentication
// =============================================================================

/// Body of `POST /api/token/`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Tokens issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(alias = "refresh_token")]
    pub refresh: String,
}

// =============================================================================
// Profile
// =============================================================================

/// Identifier that the backend may send as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Role carried in the profile's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    /// End-user of the platform.
    User,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

/// Subscription attached to the user's organization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, alias = "plan_name")]
    pub plan: String,
    /// RFC 3339 timestamp or plain `YYYY-MM-DD` date.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

/// The authenticated user as returned by `GET /api/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: RecordId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub role: Role,
    #[serde(default, alias = "instance_key", alias = "hospital_key")]
    pub tenant_key: Option<String>,
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

impl UserProfile {
    /// Name for the header; falls back to the email address.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

// =============================================================================
// Tenant-scoped resources
// =============================================================================

/// Per-feature CRUD collections under `/api/{tenant}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Patients,
    Devices,
    Tickets,
    Suppliers,
    Invoices,
}

impl ResourceKind {
    /// Path segment on the backend.
    pub fn segment(self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Devices => "devices",
            Self::Tickets => "tickets",
            Self::Suppliers => "suppliers",
            Self::Invoices => "invoices",
        }
    }

    /// Singular label used in "not found" states.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Patients => "Patient",
            Self::Devices => "Device",
            Self::Tickets => "Ticket",
            Self::Suppliers => "Supplier",
            Self::Invoices => "Invoice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: RecordId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// A saved invoice as the backend echoes it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: RecordId,
    #[serde(default)]
    pub status: Option<String>,
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `detail`, `message` and `error`, in that order. A `detail`
/// given as a list contributes its first string.
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"].iter().find_map(|key| {
        match value.get(*key)? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => items
                .iter()
                .find_map(|item| item.as_str().map(str::to_string)),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_type_maps_to_role() {
        let json = r#"{"id": 7, "first_name": "Ada", "last_name": "Okafor",
            "email": "ada@example.org", "type": "admin", "instance_key": "st-marys"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(profile.id, RecordId::Number(7));
        assert_eq!(profile.tenant_key.as_deref(), Some("st-marys"));
        assert_eq!(profile.display_name(), "Ada Okafor");
    }

    #[test]
    fn unrecognised_or_missing_type_is_unknown() {
        let odd: UserProfile =
            serde_json::from_str(r#"{"id": "u-1", "type": "superuser"}"#).unwrap();
        assert_eq!(odd.role, Role::Unknown);

        let missing: UserProfile =
            serde_json::from_str(r#"{"id": "u-2", "email": "x@example.org"}"#).unwrap();
        assert_eq!(missing.role, Role::Unknown);
        assert_eq!(missing.display_name(), "x@example.org");
    }

    #[test]
    fn token_pair_accepts_long_field_names() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access_token": "a", "refresh_token": "r"}"#).unwrap();
        assert_eq!(pair.access, "a");
        assert_eq!(pair.refresh, "r");
    }

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(
            error_message(r#"{"detail": "Given token not valid", "message": "x"}"#).as_deref(),
            Some("Given token not valid")
        );
        assert_eq!(
            error_message(r#"{"error": "Serial number already registered"}"#).as_deref(),
            Some("Serial number already registered")
        );
        assert_eq!(
            error_message(r#"{"detail": ["first", "second"]}"#).as_deref(),
            Some("first")
        );
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"detail": "  "}"#), None);
    }
}
