mod common;

use anyhow::Result;
use axum::http::Method;
use serde_json::{json, Value};

use common::{Declined, MockBackend, PASSWORD};
use risk_console::error::{ApiError, ClientError};
use risk_console::models::{Department, RiskDraft, RiskField, RiskStatus, Role, UserDraft};
use risk_console::pipeline::RequestDescriptor;
use risk_console::region::{Region, RegionSelection};

async fn signed_in(backend: &MockBackend) -> Result<risk_console::client::ApiClient> {
    let client = backend.client(Declined);
    client
        .login("ada@acme.test", PASSWORD, RegionSelection::Fixed(Region::Us))
        .await?;
    Ok(client)
}

#[tokio::test]
async fn root_sees_only_own_organization() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = signed_in(&backend).await?;

    assert_eq!(client.list_risks().await?.len(), 2);

    let visible = client.visible_risks().await?;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].risk_id, "R-1");

    let departments: Vec<Department> = client.session_departments().await?;
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].name, "Finance");

    assert_eq!(client.visible_users().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn created_risk_carries_recomputed_score() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = signed_in(&backend).await?;

    let mut draft = RiskDraft::new();
    draft.risk_id = "R-10".to_string();
    draft.risk_description = "Ransomware".to_string();
    draft.department = "d1".to_string();
    draft.set(RiskField::Confidentiality, "abc");
    draft.set(RiskField::Integrity, Value::Null);
    draft.set(RiskField::Availability, 2);
    draft.set(RiskField::Likelihood, 3);

    client.create_risk(&mut draft).await?;

    let seen = backend.last();
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.path, "/risks");
    assert_eq!(seen.body["confidentiality"], 0);
    assert_eq!(seen.body["integrity"], 0);
    assert_eq!(seen.body["impact"], 2);
    assert_eq!(seen.body["riskScore"], 6);
    assert_eq!(seen.body["riskLevel"], "Medium");
    assert_eq!(seen.body["status"], "Open");
    Ok(())
}

#[tokio::test]
async fn updating_a_risk_reseeds_and_puts() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = signed_in(&backend).await?;

    let risk = client.get_risk("r1").await?;
    assert_eq!(risk.deadline().map(|d| d.to_string()).as_deref(), Some("2025-06-30"));

    let mut draft = RiskDraft::from_risk(&risk);
    draft.status = RiskStatus::Wip;
    draft.set(RiskField::Likelihood, 5);
    client.update_risk("r1", &mut draft).await?;

    let seen = backend.last();
    assert_eq!(seen.method, Method::PUT);
    assert_eq!(seen.path, "/risks/r1");
    // Stored integrity of 0 is seeded with 1 by the form
    assert_eq!(seen.body["integrity"], 1);
    assert_eq!(seen.body["impact"], 2);
    assert_eq!(seen.body["riskScore"], 10);
    assert_eq!(seen.body["riskLevel"], "High");
    assert_eq!(seen.body["status"], "WIP");
    assert_eq!(seen.body["deadlineDate"], "2025-06-30");
    Ok(())
}

#[tokio::test]
async fn missing_risk_maps_to_not_found() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = signed_in(&backend).await?;

    let err = client.get_risk("missing").await.unwrap_err();
    assert_eq!(err.api(), Some(&ApiError::NotFound("Risk not found".to_string())));
    assert_eq!(err.error_code(), "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn user_payloads_follow_role_rules() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = signed_in(&backend).await?;

    let draft = UserDraft {
        name: "Bo".to_string(),
        email: "Bo@Acme.test".to_string(),
        password: Some("pw".to_string()),
        role: Role::RiskIdentifier,
        department_id: Some("d1".to_string()),
        organization: Some("acme".to_string()),
    };
    client.create_user(&draft).await?;

    let seen = backend.last();
    assert_eq!((seen.method.clone(), seen.path.as_str()), (Method::POST, "/users"));
    assert_eq!(
        seen.body,
        json!({
            "name": "Bo",
            "email": "bo@acme.test",
            "role": "risk_identifier",
            "departmentId": "d1",
            "password": "pw"
        })
    );

    client.update_user("u2", &draft).await?;
    let seen = backend.last();
    assert_eq!((seen.method.clone(), seen.path.as_str()), (Method::PUT, "/users/u2"));
    assert!(seen.body.get("password").is_none());
    assert_eq!(seen.body["departmentId"], "d1");

    let mut admin = client.list_users().await?.remove(0);
    admin.role = Role::SuperAdmin;
    admin.department_id = Some("d1".to_string());
    client.update_user_row(&admin).await?;

    let seen = backend.last();
    assert_eq!(seen.path, "/users/u1");
    assert_eq!(seen.body["departmentId"], Value::Null);
    assert_eq!(seen.body["role"], "super_admin");
    Ok(())
}

#[tokio::test]
async fn directory_resources_use_their_paths() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = signed_in(&backend).await?;

    client.create_department("  Audit ").await?;
    assert_eq!(backend.last().body, json!({ "name": "Audit" }));

    client.update_department("d1", "Treasury").await?;
    assert_eq!((backend.last().method, backend.last().path), (Method::PUT, "/users/departments/d1".to_string()));

    client.delete_department("d1").await?;
    client.create_organization("Initech").await?;
    client.delete_organization("globex").await?;
    client.delete_risk("r2").await?;
    client.delete_user("u2").await?;

    let calls: Vec<(Method, String)> = backend
        .requests()
        .into_iter()
        .skip(3)
        .map(|r| (r.method, r.path))
        .collect();
    assert_eq!(
        calls,
        vec![
            (Method::DELETE, "/users/departments/d1".to_string()),
            (Method::POST, "/users/organizations".to_string()),
            (Method::DELETE, "/users/organizations/globex".to_string()),
            (Method::DELETE, "/risks/r2".to_string()),
            (Method::DELETE, "/users/u2".to_string()),
        ]
    );

    assert_eq!(client.list_organizations().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn non_array_list_is_empty() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = backend.client(Declined);

    let items: Vec<Department> = client.call_list(RequestDescriptor::get("/wrapped")).await?;
    assert!(items.is_empty());
    Ok(())
}

#[tokio::test]
async fn local_validation_sends_nothing() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = backend.client(Declined);

    let mut draft = RiskDraft::new();
    assert!(matches!(client.create_risk(&mut draft).await, Err(ClientError::Validation(_))));
    assert!(client.create_organization(" ").await.is_err());
    assert!(backend.requests().is_empty());
    Ok(())
}
