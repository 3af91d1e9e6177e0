//! Maintenance schedule CSV export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed column order of the export.
pub const COLUMNS: [&str; 7] = [
    "ID",
    "Device",
    "Task",
    "Scheduled Date",
    "Technician",
    "Status",
    "Notes",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub id: String,
    pub device: String,
    pub task: String,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub technician: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
        }
    }
}

/// Render tasks as CSV text. The header row is always present.
pub fn to_csv(tasks: &[MaintenanceTask]) -> String {
    let mut out = String::new();
    push_row(&mut out, COLUMNS.iter().copied());
    for task in tasks {
        let date = task.scheduled_date.format("%Y-%m-%d").to_string();
        push_row(
            &mut out,
            [
                task.id.as_str(),
                task.device.as_str(),
                task.task.as_str(),
                date.as_str(),
                task.technician.as_deref().unwrap_or(""),
                task.status.label(),
                task.notes.as_str(),
            ],
        );
    }
    out
}

/// Download file name for an export taken on `day`.
pub fn file_name(day: NaiveDate) -> String {
    format!("maintenance-schedule-{}.csv", day.format("%Y-%m-%d"))
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

/// Quote only when the field would otherwise break the row.
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
