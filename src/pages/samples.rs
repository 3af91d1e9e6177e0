//! Static sample data for the demo namespace and the maintenance board.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::backend::{
    Device, Patient, RecordId, Role, Subscription, Supplier, Ticket, UserProfile,
};
use crate::maintenance::{MaintenanceTask, TaskStatus};

/// Profile shown in demo mode. The plan runs out in three days, so the
/// countdown and upgrade action are both visible.
pub fn profile(now: DateTime<Utc>) -> UserProfile {
    UserProfile {
        id: RecordId::Text("demo".into()),
        first_name: "Demo".into(),
        last_name: "Administrator".into(),
        email: "demo@hospital.example".into(),
        role: Role::Admin,
        tenant_key: Some("demo-general".into()),
        subscription: Some(Subscription {
            plan: "Trial".into(),
            end_date: Some((now + Duration::days(3)).to_rfc3339()),
            payment_status: Some("trialing".into()),
        }),
    }
}

pub fn patients() -> Vec<Patient> {
    [
        (1, "Amara", "Bello", "1984-02-11", "Cardiology"),
        (2, "Tomasz", "Nowak", "1959-07-30", "Oncology"),
        (3, "Lucía", "Fernández", "2011-12-03", "Paediatrics"),
    ]
    .into_iter()
    .map(|(id, first, last, dob, ward)| Patient {
        id: RecordId::Number(id),
        first_name: first.into(),
        last_name: last.into(),
        date_of_birth: Some(dob.into()),
        ward: Some(ward.into()),
    })
    .collect()
}

pub fn devices() -> Vec<Device> {
    [
        (101, "Infusion pump", "IP-44821", "in_service", "Ward 3"),
        (102, "Ventilator", "VN-10233", "maintenance", "ICU"),
        (103, "ECG monitor", "EC-77310", "in_service", "Cardiology"),
    ]
    .into_iter()
    .map(|(id, name, serial, status, location)| Device {
        id: RecordId::Number(id),
        name: name.into(),
        serial_number: Some(serial.into()),
        status: Some(status.into()),
        location: Some(location.into()),
    })
    .collect()
}

pub fn suppliers() -> Vec<Supplier> {
    [
        (11, "MedSupply Co.", "orders@medsupply.example", "+1 555 0100"),
        (12, "Northwind Surgical", "sales@northwind.example", "+1 555 0142"),
    ]
    .into_iter()
    .map(|(id, name, email, phone)| Supplier {
        id: RecordId::Number(id),
        name: name.into(),
        contact_email: Some(email.into()),
        phone: Some(phone.into()),
    })
    .collect()
}

pub fn tickets() -> Vec<Ticket> {
    [
        (201, "Ventilator alarm sounds intermittently", "open", "high"),
        (202, "Replace printer toner in admissions", "closed", "low"),
    ]
    .into_iter()
    .map(|(id, title, status, priority)| Ticket {
        id: RecordId::Number(id),
        title: title.into(),
        status: Some(status.into()),
        priority: Some(priority.into()),
    })
    .collect()
}

/// Maintenance schedule around `today`.
pub fn maintenance_tasks(today: NaiveDate) -> Vec<MaintenanceTask> {
    vec![
        MaintenanceTask {
            id: "MT-001".into(),
            device: "Ventilator VN-10233".into(),
            task: "Filter replacement".into(),
            scheduled_date: today - Duration::days(2),
            technician: Some("J. Okoye".into()),
            status: TaskStatus::Overdue,
            notes: "Awaiting parts, see ticket 201".into(),
        },
        MaintenanceTask {
            id: "MT-002".into(),
            device: "Infusion pump IP-44821".into(),
            task: "Calibration".into(),
            scheduled_date: today,
            technician: Some("M. Chen".into()),
            status: TaskStatus::InProgress,
            notes: String::new(),
        },
        MaintenanceTask {
            id: "MT-003".into(),
            device: "ECG monitor EC-77310".into(),
            task: "Annual safety check".into(),
            scheduled_date: today + Duration::days(14),
            technician: None,
            status: TaskStatus::Scheduled,
            notes: "Lead set, \"type B\"".into(),
        },
    ]
}

