mod common;

use serde_json::json;

use common::{TENANT, spawn_backend};
use hospital_ops::backend::{
    BackendClient, BackendError, Device, Patient, RecordId, ResourceKind, Role, Supplier,
};

#[tokio::test]
async fn token_then_profile() {
    let (url, _) = spawn_backend().await;
    let client = BackendClient::new(&url).unwrap();

    let tokens = client.auth().obtain_token("admin", "pw").await.unwrap();
    assert_eq!(tokens.access, "admin-token");

    let me = client.auth().me(&tokens.access).await.unwrap();
    assert_eq!(me.role, Role::Admin);
    assert_eq!(me.tenant_key.as_deref(), Some(TENANT));
    assert_eq!(me.subscription.unwrap().plan, "Pro");
}

#[tokio::test]
async fn rejected_credentials_are_unauthorized() {
    let (url, _) = spawn_backend().await;
    let client = BackendClient::new(&url).unwrap();

    let err = client.auth().obtain_token("admin", "nope").await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn list_and_get_are_tenant_scoped() {
    let (url, _) = spawn_backend().await;
    let client = BackendClient::new(&url).unwrap();

    let patients: Vec<Patient> = client
        .resources()
        .list("nurse-token", TENANT, ResourceKind::Patients)
        .await
        .unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[1].ward, None);

    let device: Device = client
        .resources()
        .get("nurse-token", TENANT, ResourceKind::Devices, "DEV-0042")
        .await
        .unwrap();
    assert_eq!(device.id, RecordId::Text("DEV-0042".into()));

    let other = client
        .resources()
        .list::<Patient>("nurse-token", "elsewhere", ResourceKind::Patients)
        .await
        .unwrap_err();
    assert!(matches!(other, BackendError::NotFound));
}

#[tokio::test]
async fn create_surfaces_payload_message() {
    let (url, _) = spawn_backend().await;
    let client = BackendClient::new(&url).unwrap();

    let created: Supplier = client
        .resources()
        .create(
            "admin-token",
            TENANT,
            ResourceKind::Suppliers,
            &json!({"name": "MedSupply Co."}),
        )
        .await
        .unwrap();
    assert_eq!(created.id, RecordId::Number(99));
    assert_eq!(created.name, "MedSupply Co.");

    let err = client
        .resources()
        .create::<_, Supplier>(
            "admin-token",
            TENANT,
            ResourceKind::Suppliers,
            &json!({"name": ""}),
        )
        .await
        .unwrap_err();
    assert!(matches!(&err, BackendError::Api { status: 400, .. }));
    assert_eq!(err.user_message(), "Name is required.");
}

#[tokio::test]
async fn delete_reports_missing_records() {
    let (url, _) = spawn_backend().await;
    let client = BackendClient::new(&url).unwrap();

    client
        .resources()
        .delete("admin-token", TENANT, ResourceKind::Tickets, "201")
        .await
        .unwrap();

    let err = client
        .resources()
        .delete("admin-token", TENANT, ResourceKind::Tickets, "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::NotFound));

    let err = client
        .resources()
        .delete("expired", TENANT, ResourceKind::Tickets, "201")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}
