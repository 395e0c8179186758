#![allow(clippy::unwrap_used)]
// Login handshake and session lifecycle against a mock service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eero_api::{
    ApiClient, ApiConfig, CredentialStore, Error, MemoryCredentialStore, RetryPolicy, SessionState,
    endpoints,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(store: &Arc<MemoryCredentialStore>) -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let config = ApiConfig {
        retry: RetryPolicy::new(3, Duration::from_millis(1)),
        ..ApiConfig::default()
    }
    .with_base_url(format!("{}/2.2/", server.uri()));
    let client = ApiClient::new(config, Arc::clone(store) as Arc<dyn CredentialStore>).unwrap();
    (server, client)
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "code": 200 }, "data": data }))
}

fn rejected(status: u16, error: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .set_body_json(json!({ "meta": { "code": status, "error": error } }))
}

async fn mount_login(server: &MockServer, handle: &str) {
    Mock::given(method("POST"))
        .and(path("/2.2/login"))
        .respond_with(ok(json!({ "user_token": handle })))
        .mount(server)
        .await;
}

// ── Handshake ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_login_and_cache_scenario() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (server, client) = setup(&store).await;

    Mock::given(method("POST"))
        .and(path("/2.2/login"))
        .and(body_json(json!({ "login": "user@example.com" })))
        .respond_with(ok(json!({ "user_token": "handle-1" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/2.2/login/verify"))
        .and(body_json(json!({ "code": "000000" })))
        .respond_with(rejected(401, "error.verification.invalid"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/2.2/login/verify"))
        .and(header("cookie", "s=handle-1"))
        .and(body_json(json!({ "code": "123456" })))
        .respond_with(ok(json!({ "email": { "value": "user@example.com" } })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .and(header("cookie", "s=handle-1"))
        .respond_with(ok(json!({ "count": 1, "data": [{ "url": "/2.2/networks/42", "name": "Home" }] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks/42/devices"))
        .respond_with(ok(json!([{ "url": "/2.2/networks/42/devices/abc", "mac": "aa:bb" }])))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/2.2/networks/42/devices/abc"))
        .and(body_json(json!({ "blocked": true })))
        .respond_with(ok(json!({ "blocked": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.start_login("user@example.com").await.unwrap();
    assert_eq!(client.session_state(), SessionState::LoginPending);

    let err = client.verify("000000").await.unwrap_err();
    assert!(
        matches!(err, Error::Verification { .. }),
        "expected Verification error, got: {err:?}"
    );
    assert_eq!(client.session_state(), SessionState::LoginPending);
    assert_eq!(store.save_count(), 0);

    client.verify("123456").await.unwrap();
    assert_eq!(client.session_state(), SessionState::Authenticated);
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.peek().as_deref(), Some("handle-1"));

    let first = client.execute(&endpoints::networks()).await.unwrap();
    let second = client.execute(&endpoints::networks()).await.unwrap();
    assert_eq!(first, second);

    client.execute(&endpoints::devices("42")).await.unwrap();
    client.execute(&endpoints::devices("42")).await.unwrap();
    client
        .execute(&endpoints::set_device_blocked("42", "abc", true))
        .await
        .unwrap();
    // Device list evicted; the network list is still cached.
    client.execute(&endpoints::devices("42")).await.unwrap();
    client.execute(&endpoints::networks()).await.unwrap();
}

#[tokio::test]
async fn test_expired_handle_resets_login() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (server, client) = setup(&store).await;
    mount_login(&server, "handle-x").await;

    Mock::given(method("POST"))
        .and(path("/2.2/login/verify"))
        .respond_with(rejected(410, "error.login.expired"))
        .mount(&server)
        .await;

    client.start_login("user@example.com").await.unwrap();
    let err = client.verify("123456").await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got: {err:?}");
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_verify_is_never_retried() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (server, client) = setup(&store).await;
    mount_login(&server, "handle-x").await;

    Mock::given(method("POST"))
        .and(path("/2.2/login/verify"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    client.start_login("user@example.com").await.unwrap();
    let err = client.verify("123456").await.unwrap_err();
    assert!(matches!(err, Error::Transport { attempts: 1, .. }), "got: {err:?}");
    assert_eq!(client.session_state(), SessionState::LoginPending);
}

#[tokio::test]
async fn test_login_without_handle_is_auth_error() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (server, client) = setup(&store).await;

    Mock::given(method("POST"))
        .and(path("/2.2/login"))
        .respond_with(ok(json!({})))
        .mount(&server)
        .await;

    let err = client.start_login("user@example.com").await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got: {err:?}");
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_resend_code_uses_pending_handle() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (server, client) = setup(&store).await;
    mount_login(&server, "handle-r").await;

    Mock::given(method("POST"))
        .and(path("/2.2/login/resend"))
        .and(header("cookie", "s=handle-r"))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    client.start_login("user@example.com").await.unwrap();
    client.resend_code().await.unwrap();
    assert_eq!(client.session_state(), SessionState::LoginPending);
}

// ── Logout & expiry ─────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_survives_remote_failure() {
    let store = Arc::new(MemoryCredentialStore::with_token("tok"));
    let (server, client) = setup(&store).await;

    Mock::given(method("POST"))
        .and(path("/2.2/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
    assert!(store.peek().is_none());

    // Second logout has nothing to end remotely.
    client.logout().await.unwrap();
}

#[tokio::test]
async fn test_401_expires_session() {
    let store = Arc::new(MemoryCredentialStore::with_token("stale"));
    let (server, client) = setup(&store).await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .respond_with(rejected(401, "error.session.invalid"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.execute(&endpoints::networks()).await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired), "got: {err:?}");
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
    assert!(store.peek().is_none());

    let err = client.execute(&endpoints::networks()).await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn test_envelope_401_expires_session() {
    let store = Arc::new(MemoryCredentialStore::with_token("stale"));
    let (server, client) = setup(&store).await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "meta": { "code": 401, "error": "error.session.invalid" } })),
        )
        .mount(&server)
        .await;

    let err = client.execute(&endpoints::networks()).await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired), "got: {err:?}");
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_hydrated_session_sends_persisted_cookie() {
    let store = Arc::new(MemoryCredentialStore::with_token("persisted"));
    let (server, client) = setup(&store).await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .and(header("cookie", "s=persisted"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.session_state(), SessionState::Authenticated);
    client.execute(&endpoints::networks()).await.unwrap();
}

#[tokio::test]
async fn test_401_on_mutation_expires_session() {
    // PUT: idempotent but mutating. A cached read from another family
    // must not survive the expiry.
    let store = Arc::new(MemoryCredentialStore::with_token("stale"));
    let (server, client) = setup(&store).await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/2.2/networks/1/devices/d1"))
        .respond_with(rejected(401, "error.session.invalid"))
        .expect(1)
        .mount(&server)
        .await;

    client.execute(&endpoints::networks()).await.unwrap();
    assert_eq!(client.cache().len(), 1);

    let err = client
        .execute(&endpoints::set_device_blocked("1", "d1", true))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionExpired), "got: {err:?}");
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
    assert!(store.peek().is_none());
    assert_eq!(client.cache().len(), 0);

    // POST: non-idempotent, sent exactly once.
    let store = Arc::new(MemoryCredentialStore::with_token("stale"));
    let (server, client) = setup(&store).await;

    Mock::given(method("POST"))
        .and(path("/2.2/networks/1/eeros/e1/reboot"))
        .respond_with(rejected(401, "error.session.invalid"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .execute(&endpoints::reboot_eero("1", "e1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionExpired), "got: {err:?}");
    assert_eq!(client.session_state(), SessionState::Unauthenticated);
    assert!(store.peek().is_none());
}

#[tokio::test]
async fn test_refused_verify_keeps_cache() {
    let store = Arc::new(MemoryCredentialStore::with_token("live"));
    let (server, client) = setup(&store).await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.execute(&endpoints::networks()).await.unwrap();

    // Already authenticated: no login in progress to verify.
    let err = client.verify("123456").await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got: {err:?}");
    assert_eq!(client.session_state(), SessionState::Authenticated);
    assert_eq!(client.cache().len(), 1);

    client.execute(&endpoints::networks()).await.unwrap();
}

#[tokio::test]
async fn test_refresh_session_rotates_token() {
    let store = Arc::new(MemoryCredentialStore::with_token("old"));
    let (server, client) = setup(&store).await;

    Mock::given(method("POST"))
        .and(path("/2.2/account/refresh"))
        .and(header("cookie", "s=old"))
        .respond_with(ok(json!({ "user_token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .and(header("cookie", "s=old"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2.2/networks"))
        .and(header("cookie", "s=fresh"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.execute(&endpoints::networks()).await.unwrap();
    client.refresh_session().await.unwrap();
    assert_eq!(store.peek().as_deref(), Some("fresh"));
    assert_eq!(client.cache().len(), 0);

    client.execute(&endpoints::networks()).await.unwrap();
}

#[tokio::test]
async fn test_refresh_session_never_logs_in() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (server, client) = setup(&store).await;

    let err = client.refresh_session().await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
