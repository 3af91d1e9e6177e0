//! Maintenance scheduling.

pub mod export;

pub use export::{MaintenanceTask, TaskStatus, file_name, to_csv};
