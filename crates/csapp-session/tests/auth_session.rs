//! Session transitions against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use csapp_client::{ApiClient, MemoryTokenStore, SharedTokenStore, TokenStore};
use csapp_session::{AuthSession, AuthState, RecordingNavigator};
use csapp_types::{LoginRequest, TokenPair, UserRole};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn me_json(role: &str) -> Value {
    json!({
        "id": "u-7",
        "company_id": "c-1",
        "role": role,
        "full_name": "Bruno Lima",
        "email": "bruno@example.com",
        "phone": "",
        "cpf_cnpj": ""
    })
}

struct Harness {
    server: MockServer,
    store: Arc<MemoryTokenStore>,
    nav: Arc<RecordingNavigator>,
    session: AuthSession,
}

async fn harness(store: MemoryTokenStore) -> Harness {
    let server = MockServer::start().await;
    let store = Arc::new(store);
    let shared: SharedTokenStore = store.clone();
    let client = ApiClient::builder()
        .base_url(format!("{}/api/v1", server.uri()))
        .token_store(shared)
        .build()
        .unwrap();
    let nav = Arc::new(RecordingNavigator::new());
    let session = AuthSession::new(client, nav.clone());
    Harness {
        server,
        store,
        nav,
        session,
    }
}

async fn mount_login(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a-1",
            "refresh_token": "r-1",
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer a-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_json(role)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_initialize_with_valid_session() {
    let h = harness(MemoryTokenStore::with_tokens(&TokenPair::new("a-1", "r-1"))).await;
    mount_login(&h.server, "super_admin").await;

    assert_eq!(h.session.state(), AuthState::Loading);
    let state = h.session.initialize().await;

    assert!(state.is_authenticated());
    assert!(h.session.is_admin());
    assert!(h.session.is_super_admin());
}

#[tokio::test]
async fn test_initialize_without_tokens_is_unauthenticated() {
    let h = harness(MemoryTokenStore::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let state = h.session.initialize().await;

    assert_eq!(state, AuthState::Unauthenticated);
    assert!(h.session.user().is_none());
    assert!(!h.session.is_admin());
}

#[tokio::test]
async fn test_resolved_waits_for_profile() {
    let h = harness(MemoryTokenStore::with_tokens(&TokenPair::new("a-1", "r-1"))).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(me_json("client"))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&h.server)
        .await;

    let (resolved, _) = tokio::join!(h.session.resolved(), h.session.initialize());

    assert_eq!(resolved.user().map(|me| me.role), Some(UserRole::Client));
}

#[tokio::test]
async fn test_login_honors_redirect_in_own_area() {
    let h = harness(MemoryTokenStore::new()).await;
    mount_login(&h.server, "company_admin").await;

    let destination = h
        .session
        .login(
            &LoginRequest::new("bruno@example.com", "secret"),
            Some("/admin/clients"),
        )
        .await
        .unwrap();

    assert_eq!(destination, "/admin/clients");
    assert_eq!(h.nav.last().as_deref(), Some("/admin/clients"));
    assert!(h.session.is_admin());
}

#[tokio::test]
async fn test_client_login_discards_admin_redirect() {
    let h = harness(MemoryTokenStore::new()).await;
    mount_login(&h.server, "client").await;

    let destination = h
        .session
        .login(
            &LoginRequest::new("bruno@example.com", "secret"),
            Some("/admin/clients"),
        )
        .await
        .unwrap();

    assert_eq!(destination, "/portal/dashboard");
    assert!(!h.session.is_admin());
}

#[tokio::test]
async fn test_failed_login_keeps_state() {
    let h = harness(MemoryTokenStore::new()).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&h.server)
        .await;

    let err = h
        .session
        .login(&LoginRequest::new("bruno@example.com", "wrong"), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(h.nav.last().is_none());
    assert!(!h.session.state().is_authenticated());
}

#[tokio::test]
async fn test_logout_completes_when_backend_unreachable() {
    let store = MemoryTokenStore::with_tokens(&TokenPair::new("a-1", "r-1"));
    let h = harness(store).await;
    mount_login(&h.server, "client").await;
    h.session.initialize().await;
    assert!(h.session.state().is_authenticated());

    // No logout mock: the backend answers 404.
    h.session.logout().await;

    assert_eq!(h.session.state(), AuthState::Unauthenticated);
    assert!(!h.store.has_session());
    assert_eq!(h.nav.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_session_expiry_drops_user() {
    let h = harness(MemoryTokenStore::with_tokens(&TokenPair::new("a-1", "r-1"))).await;
    mount_login(&h.server, "client").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/client/lots"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    h.session.initialize().await;

    let err = h.session.client().portal().lots().await.unwrap_err();
    assert!(h.session.handle_error(&err));

    assert_eq!(h.session.state(), AuthState::Unauthenticated);
    assert_eq!(h.nav.last().as_deref(), Some("/login"));
    assert!(!h.store.has_session());
}
