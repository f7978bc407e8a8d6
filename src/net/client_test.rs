use super::*;
use crate::config::RetryPolicy;
use crate::net::test_helpers::FakeTransport;
use crate::state::auth::{Identity, LoginInput, Role};
use crate::state::test_helpers::{FakeBackend, session_with, store_with};

fn client(transport: &Rc<FakeTransport>) -> ApiClient {
    let transport: Rc<dyn Transport> = transport.clone();
    ApiClient::new("https://bank.test/", transport)
}

#[test]
fn url_joins_base_without_double_slash() {
    let transport = FakeTransport::new();
    assert_eq!(client(&transport).url("/api/v1/auth/login"), "https://bank.test/api/v1/auth/login");
}

#[test]
fn build_without_session_has_no_authorization() {
    let transport = FakeTransport::new();
    let request = client(&transport).build(Method::Get, "/api/v1/users/me", None);
    assert_eq!(request.header("authorization"), None);
    assert_eq!(request.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn session_credential_is_attached_to_every_request() {
    let transport = FakeTransport::new();
    transport.respond(200, r#"{"username":"alice","role":"TELLER"}"#);
    transport.respond(200, "ok");
    let backend = FakeBackend::new();
    let session = session_with(&store_with(None), &backend, RetryPolicy::Manual);
    let identity = Identity { username: "alice".to_owned(), role: Role::Teller };
    session.login(LoginInput::KnownIdentity(Credential::new("tok-1"), identity.clone())).await;
    let api = client(&transport).with_session(session.clone());

    let me: Identity = api.get_json("/api/v1/users/me").await.unwrap();
    api.request_unit(Method::Post, "/api/v1/ping", None).await.unwrap();

    assert_eq!(me, identity);
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.header("Authorization") == Some("Bearer tok-1")));
}

#[tokio::test]
async fn header_tracks_session_changes() {
    let transport = FakeTransport::new();
    transport.respond(200, "ok");
    transport.respond(200, "ok");
    let backend = FakeBackend::new();
    let session = session_with(&store_with(Some("old")), &backend, RetryPolicy::Manual);
    let api = client(&transport).with_session(session.clone());

    api.request_unit(Method::Get, "/a", None).await.unwrap();
    session.logout(crate::state::session::LogoutOptions { revoke: false }).await;
    api.request_unit(Method::Get, "/b", None).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].header("Authorization"), Some("Bearer old"));
    assert_eq!(requests[1].header("Authorization"), None);
}

#[tokio::test]
async fn transport_failure_normalizes_to_network_error() {
    let transport = FakeTransport::new();
    transport.fail();
    let err = client(&transport).request_unit(Method::Get, "/a", None).await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.status, 0);
}

#[tokio::test]
async fn error_status_normalizes_body() {
    let transport = FakeTransport::new();
    transport.respond(422, r#"{"code":"ERR_RULE","message":"Insufficient funds","errors":[{"field":"amount","message":"too large"}]}"#);
    let err = client(&transport).get_json::<serde_json::Value>("/a").await.unwrap_err();
    assert_eq!(err.status, 422);
    assert_eq!(err.code, "ERR_RULE");
    assert_eq!(err.message, "Insufficient funds");
    assert_eq!(err.violation("amount"), Some("too large"));
}

#[tokio::test]
async fn undecodable_success_body_is_a_decode_error() {
    let transport = FakeTransport::new();
    transport.respond(200, "not json");
    let err = client(&transport).get_json::<Identity>("/a").await.unwrap_err();
    assert_eq!(err.status, 200);
    assert_eq!(err.code, crate::net::error::DECODE_ERROR_CODE);
}

#[tokio::test]
async fn post_json_serializes_body() {
    let transport = FakeTransport::new();
    transport.respond(200, r#"{"ok":true}"#);
    let body = serde_json::json!({ "username": "alice" });
    let resp: serde_json::Value = client(&transport).post_json("/a", &body).await.unwrap();
    assert_eq!(resp, serde_json::json!({ "ok": true }));
    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.body, Some(body));
}
