mod common;

use anyhow::Result;
use serde_json::json;

use common::{At, Declined, MockBackend, PASSWORD, TOKEN};
use risk_console::error::{ApiError, ClientError};
use risk_console::models::Role;
use risk_console::region::{Region, RegionSelection};
use risk_console::session::{SessionContext, SessionHandle};

#[tokio::test]
async fn login_establishes_session() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = backend.client(Declined);

    let outcome = client
        .login("ada@acme.test", PASSWORD, RegionSelection::Fixed(Region::Eu))
        .await?;

    let user = outcome.user.expect("login returns the profile");
    assert_eq!(user.role, Role::Root);
    assert_eq!(outcome.region, Some(Region::Eu));

    let ctx = client.session().snapshot().await;
    assert_eq!(ctx.credential.as_deref(), Some(TOKEN));
    assert_eq!(ctx.organization.as_deref(), Some("acme"));
    assert_eq!(ctx.region, Some(Region::Eu));
    assert!(ctx.established_at.is_some());

    let login = backend.last();
    assert_eq!(login.body, json!({ "email": "ada@acme.test", "password": PASSWORD }));
    Ok(())
}

#[tokio::test]
async fn failed_login_clears_session() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let session = SessionHandle::new(SessionContext {
        credential: Some("stale".to_string()),
        organization: Some("globex".to_string()),
        region: Some(Region::India),
        ..SessionContext::default()
    });
    let client = backend.client_with_session(Declined, session);

    let err = client
        .login("ada@acme.test", "wrong", RegionSelection::Fixed(Region::Eu))
        .await
        .unwrap_err();

    match err {
        ClientError::Api(ApiError::Unauthorized(message)) => assert_eq!(message, "Invalid credentials"),
        other => panic!("unexpected error: {:?}", other),
    }

    // The stale credential never reached the backend
    assert_eq!(backend.last().header("authorization"), None);
    assert_eq!(client.session().snapshot().await, SessionContext::default());
    Ok(())
}

#[tokio::test]
async fn logout_forgets_credential_and_region() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = backend.client(At(40.7, -74.0));

    client
        .login("ada@acme.test", PASSWORD, RegionSelection::Fixed(Region::Eu))
        .await?;
    client.logout().await;

    client.list_risks().await?;
    let seen = backend.last();
    assert_eq!(seen.header("authorization"), None);
    assert_eq!(seen.header("x-org"), None);
    // A fresh session resolves its region again
    assert_eq!(seen.header("x-region"), Some("US"));
    Ok(())
}

#[tokio::test]
async fn change_password_requires_matching_confirmation() -> Result<()> {
    let backend = MockBackend::spawn().await?;
    let client = backend.client(Declined);

    let err = client.change_password("old", "new-1", "new-2").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(backend.requests().is_empty());

    client.change_password("old", "new-1", "new-1").await?;
    let seen = backend.last();
    assert_eq!(seen.path, "/users/change-password");
    assert_eq!(seen.body, json!({ "oldPassword": "old", "newPassword": "new-1" }));
    Ok(())
}
