//! End-to-end auth operation tests against a mock server.

use std::sync::Arc;

use mockito::Matcher;
use zbooks_client::{
    ApiClient, ApiError, ClientConfig, MemorySessionStore, RegisterForm, Session, SessionStore,
};

fn client_for(server: &mockito::ServerGuard, store: &Arc<MemorySessionStore>) -> ApiClient {
    let config = ClientConfig::default().with_base_url(server.url());
    ApiClient::new(config, Arc::clone(store) as Arc<dyn SessionStore>).unwrap()
}

const ME_BODY: &str = r#"{
    "id": 1,
    "email": "a@b.com",
    "full_name": "Asha Rao",
    "current_organization": {"id": 5, "name": "Acme Traders"},
    "organizations": [
        {"id": 10, "organization": {"id": 5, "name": "Acme Traders"}, "role": "owner", "is_default": true}
    ]
}"#;

#[tokio::test]
async fn login_stores_token_pair_and_fetches_profile() {
    let mut server = mockito::Server::new_async().await;

    let login = server
        .mock("POST", "/auth/login/")
        .match_body(Matcher::Json(
            serde_json::json!({ "email": "a@b.com", "password": "x" }),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A1", "refresh": "R1"}"#)
        .expect(1)
        .create_async()
        .await;

    let me = server
        .mock("GET", "/auth/me/")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ME_BODY)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_for(&server, &store);

    let outcome = client.login("a@b.com", "x").await.unwrap();
    assert_eq!(outcome.user.id, 1);
    assert_eq!(outcome.user.email, "a@b.com");
    assert_eq!(outcome.user.current_organization.as_ref().unwrap().id, 5);

    login.assert_async().await;
    me.assert_async().await;

    let session = store.load().await.unwrap().unwrap();
    assert_eq!(session.access_token, "A1");
    assert_eq!(session.refresh_token, "R1");
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn rejected_login_leaves_store_unchanged() {
    let mut server = mockito::Server::new_async().await;

    let login = server
        .mock("POST", "/auth/login/")
        .with_status(401)
        .with_body(r#"{"detail": "No active account found with the given credentials"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_for(&server, &store);

    let err = client.login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(
        err.display_message("Login failed"),
        "No active account found with the given credentials"
    );

    login.assert_async().await;
    assert!(store.load().await.unwrap().is_none());
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn register_normalizes_payload_then_logs_in() {
    let mut server = mockito::Server::new_async().await;

    let register = server
        .mock("POST", "/auth/register/")
        .match_body(Matcher::Json(serde_json::json!({
            "email": "a@b.com",
            "password": "x",
            "full_name": "Asha Rao",
            "company_name": "Acme Traders",
            "phone_cc": "+91",
            "phone": "9876543210",
            "country": "India",
            "state": "Maharashtra"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "email": "a@b.com"}"#)
        .expect(1)
        .create_async()
        .await;

    let login = server
        .mock("POST", "/auth/login/")
        .match_body(Matcher::Json(
            serde_json::json!({ "email": "a@b.com", "password": "x" }),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A1", "refresh": "R1"}"#)
        .expect(1)
        .create_async()
        .await;

    let me = server
        .mock("GET", "/auth/me/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ME_BODY)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_for(&server, &store);

    // Legacy combined phone string, old organization_name field.
    let form = RegisterForm {
        email: "a@b.com".to_string(),
        password: "x".to_string(),
        full_name: Some("Asha Rao".to_string()),
        organization_name: Some("Acme Traders".to_string()),
        organization_phone: Some("+91 9876543210".to_string()),
        ..RegisterForm::default()
    };

    let outcome = client.register(&form).await.unwrap();
    assert_eq!(outcome.user.id, 1);

    register.assert_async().await;
    login.assert_async().await;
    me.assert_async().await;

    let session = store.load().await.unwrap().unwrap();
    assert_eq!(session.access_token, "A1");
    assert_eq!(session.refresh_token, "R1");
}

#[tokio::test]
async fn rejected_registration_stores_nothing_and_keeps_the_form() {
    let mut server = mockito::Server::new_async().await;

    let register = server
        .mock("POST", "/auth/register/")
        .with_status(400)
        .with_body(r#"{"email": ["user with this email already exists."]}"#)
        .expect(1)
        .create_async()
        .await;

    let login = server
        .mock("POST", "/auth/login/")
        .expect(0)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_for(&server, &store);

    let form = RegisterForm {
        email: "a@b.com".to_string(),
        password: "x".to_string(),
        company_name: Some("Acme Traders".to_string()),
        ..RegisterForm::default()
    };

    let err = client.register(&form).await.unwrap_err();
    assert_eq!(
        err.display_message("Registration failed"),
        "email: user with this email already exists."
    );

    register.assert_async().await;
    login.assert_async().await;

    assert!(store.load().await.unwrap().is_none());
    // The form was only borrowed; the caller still has its values.
    assert_eq!(form.company_name.as_deref(), Some("Acme Traders"));
}

#[tokio::test]
async fn logout_clears_tokens_even_when_server_errors() {
    let mut server = mockito::Server::new_async().await;

    let logout = server
        .mock("POST", "/auth/logout/")
        .match_body(Matcher::Json(serde_json::json!({ "refresh_token": "R1" })))
        .with_status(500)
        .with_body(r#"{"detail": "internal error"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::with_session(Session::new("A1", "R1")));
    let client = client_for(&server, &store);

    client.logout().await;

    logout.assert_async().await;
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn logout_without_a_session_still_succeeds() {
    let mut server = mockito::Server::new_async().await;

    let logout = server
        .mock("POST", "/auth/logout/")
        .with_status(200)
        .with_body(r#"{"detail": "ok"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_for(&server, &store);

    client.logout().await;

    logout.assert_async().await;
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn otp_verification_stores_the_bundled_grant() {
    let mut server = mockito::Server::new_async().await;

    let request = server
        .mock("POST", "/auth/otp/request/")
        .match_body(Matcher::Json(
            serde_json::json!({ "destination": "a@b.com" }),
        ))
        .with_status(200)
        .with_body(r#"{"detail": "sent"}"#)
        .expect(1)
        .create_async()
        .await;

    let verify = server
        .mock("POST", "/auth/otp/verify/")
        .match_body(Matcher::Json(
            serde_json::json!({ "destination": "a@b.com", "code": "123456" }),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"access": "A9", "refresh": "R9", "user": {"id": 1, "email": "a@b.com", "organizations": []}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_for(&server, &store);

    client.request_otp("a@b.com").await.unwrap();
    let outcome = client.verify_otp("a@b.com", "123456").await.unwrap();
    assert_eq!(outcome.user.email, "a@b.com");

    request.assert_async().await;
    verify.assert_async().await;

    let session = store.load().await.unwrap().unwrap();
    assert_eq!(session.access_token, "A9");
    assert_eq!(session.refresh_token, "R9");
}

#[tokio::test]
async fn profile_fetch_failure_after_login_keeps_the_session() {
    let mut server = mockito::Server::new_async().await;

    let login = server
        .mock("POST", "/auth/login/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A1", "refresh": "R1"}"#)
        .expect(1)
        .create_async()
        .await;

    let me = server
        .mock("GET", "/auth/me/")
        .with_status(500)
        .with_body(r#"{"detail": "internal error"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let client = client_for(&server, &store);

    let err = client.login("a@b.com", "x").await.unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 500, .. }), "got: {err:?}");

    login.assert_async().await;
    me.assert_async().await;

    // Tokens were persisted before the profile fetch; they stay.
    let session = store.load().await.unwrap().unwrap();
    assert_eq!(session.access_token, "A1");
}
