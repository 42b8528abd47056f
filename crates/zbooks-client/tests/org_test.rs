//! Organization operation tests.

use std::sync::Arc;

use mockito::Matcher;
use zbooks_client::{
    ApiClient, ApiError, ClientConfig, MemorySessionStore, NewOrganization, Session, SessionStore,
};

fn authed_client(server: &mockito::ServerGuard) -> ApiClient {
    let store = Arc::new(MemorySessionStore::with_session(Session::new("A1", "R1")));
    let config = ClientConfig::default().with_base_url(server.url());
    ApiClient::new(config, store as Arc<dyn SessionStore>).unwrap()
}

#[tokio::test]
async fn switch_updates_current_organization() {
    let mut server = mockito::Server::new_async().await;

    let switch = server
        .mock("POST", "/organizations/7/switch/")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"current_organization": {"id": 7, "name": "Second Books"}}"#)
        .expect(1)
        .create_async()
        .await;

    let me = server
        .mock("GET", "/auth/me/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": 1,
                "email": "a@b.com",
                "current_organization": {"id": 7, "name": "Second Books"},
                "organizations": [
                    {"id": 10, "organization": {"id": 5, "name": "Acme Traders"}, "is_default": true},
                    {"id": 11, "organization": {"id": 7, "name": "Second Books"}, "is_default": false}
                ]
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = authed_client(&server);
    let user = client.switch_organization(7).await.unwrap();

    assert_eq!(user.current_organization.unwrap().id, 7);
    assert_eq!(user.organizations.len(), 2);

    switch.assert_async().await;
    me.assert_async().await;
}

#[tokio::test]
async fn rejected_switch_changes_nothing() {
    let mut server = mockito::Server::new_async().await;

    let switch = server
        .mock("POST", "/organizations/9/switch/")
        .with_status(403)
        .with_body(r#"{"detail": "You are not a member of this organization"}"#)
        .expect(1)
        .create_async()
        .await;

    // The profile is never re-fetched on rejection.
    let me = server.mock("GET", "/auth/me/").expect(0).create_async().await;

    let client = authed_client(&server);
    let err = client.switch_organization(9).await.unwrap_err();

    match err {
        ApiError::Api { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(
                body.summary("Failed to switch organization"),
                "You are not a member of this organization"
            );
        }
        other => panic!("expected Api error, got: {other:?}"),
    }

    switch.assert_async().await;
    me.assert_async().await;
}

#[tokio::test]
async fn lists_memberships() {
    let mut server = mockito::Server::new_async().await;

    let list = server
        .mock("GET", "/organizations/my/")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {
                    "id": 10,
                    "organization": {"id": 5, "name": "Acme Traders", "currency": "INR"},
                    "role": "owner",
                    "is_default": true,
                    "created_at": "2024-01-01T00:00:00Z"
                }
            ]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = authed_client(&server);
    let memberships = client.list_organizations().await.unwrap();

    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].organization.name, "Acme Traders");
    assert_eq!(memberships[0].organization.currency.as_deref(), Some("INR"));
    assert!(memberships[0].is_default);

    list.assert_async().await;
}

#[tokio::test]
async fn creates_an_organization() {
    let mut server = mockito::Server::new_async().await;

    let create = server
        .mock("POST", "/organizations/")
        .match_body(Matcher::Json(serde_json::json!({
            "name": "Acme Traders",
            "gst_number": "27AAPFU0939F1ZV"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 5, "name": "Acme Traders", "gst_number": "27AAPFU0939F1ZV"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = authed_client(&server);
    let organization = client
        .create_organization(&NewOrganization {
            name: "Acme Traders".to_string(),
            gst_number: Some("27AAPFU0939F1ZV".to_string()),
            ..NewOrganization::default()
        })
        .await
        .unwrap();

    assert_eq!(organization.id, 5);
    create.assert_async().await;
}
