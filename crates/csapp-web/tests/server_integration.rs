//! Gateway integration tests.
//!
//! A real gateway runs in front of a mock backend; requests go over HTTP
//! with redirects left unfollowed so each hop can be inspected.

mod common;

use anyhow::Result;
use common::{TestServer, location, me_json, set_cookies, tokens_json};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_me(server: &TestServer, access: &str, role: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", format!("Bearer {}", access).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_json(role)))
        .mount(&server.backend)
        .await;
}

async fn mount_expired(server: &TestServer, access: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", format!("Bearer {}", access).as_str()))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})),
        )
        .mount(&server.backend)
        .await;
}

#[tokio::test]
async fn test_server_health_returns_version() -> Result<()> {
    let server = TestServer::start().await?;

    let resp = server.get("/health", None).await?;
    assert!(resp.status().is_success());

    let body: Value = resp.json().await?;
    assert_eq!(body["status"], "ok");
    assert!(body.get("version").is_some());

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Sign-in and sign-out
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_sets_cookies_and_honors_redirect() -> Result<()> {
    let server = TestServer::start().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "ana@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_json("a-1", "r-1")))
        .expect(1)
        .mount(&server.backend)
        .await;
    mount_me(&server, "a-1", "company_admin").await;

    let resp = server
        .post(
            "/login?redirect=%2Fadmin%2Flots",
            &json!({"email": "ana@example.com", "password": "pw"}),
            None,
        )
        .await?;

    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(location(&resp), "/admin/lots");

    let cookies = set_cookies(&resp);
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with("access_token=a-1;"));
    assert!(cookies[1].starts_with("refresh_token=r-1;"));

    Ok(())
}

#[tokio::test]
async fn test_login_ignores_redirect_outside_role_area() -> Result<()> {
    let server = TestServer::start().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_json("a-1", "r-1")))
        .mount(&server.backend)
        .await;
    mount_me(&server, "a-1", "client").await;

    let resp = server
        .post(
            "/login?redirect=%2Fadmin%2Fclients",
            &json!({"email": "ana@example.com", "password": "pw"}),
            None,
        )
        .await?;

    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(location(&resp), "/portal/dashboard");

    Ok(())
}

#[tokio::test]
async fn test_login_bad_credentials_passes_detail() -> Result<()> {
    let server = TestServer::start().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_json("x", "y")))
        .expect(0)
        .mount(&server.backend)
        .await;

    let resp = server
        .post(
            "/login",
            &json!({"email": "ana@example.com", "password": "nope"}),
            None,
        )
        .await?;

    assert_eq!(resp.status().as_u16(), 401);
    assert!(set_cookies(&resp).is_empty());

    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "api_error");
    assert_eq!(body["detail"], "Invalid credentials");

    Ok(())
}

#[tokio::test]
async fn test_signup_validation_errors_are_preserved() -> Result<()> {
    let server = TestServer::start().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "company_slug"], "msg": "already taken", "type": "value_error"}
            ]
        })))
        .mount(&server.backend)
        .await;

    let resp = server
        .post(
            "/signup",
            &json!({
                "company_name": "Loteadora Sol",
                "company_slug": "sol",
                "full_name": "Ana Souza",
                "email": "ana@example.com",
                "password": "pw",
                "cpf_cnpj": "12345678000199",
                "phone": "11999990000"
            }),
            None,
        )
        .await?;

    assert_eq!(resp.status().as_u16(), 422);

    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["detail"][0]["loc"][1], "company_slug");
    assert_eq!(body["detail"][0]["msg"], "already taken");

    Ok(())
}

#[tokio::test]
async fn test_logout_clears_cookies_when_backend_fails() -> Result<()> {
    let server = TestServer::start().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server.backend)
        .await;

    let resp = server
        .post(
            "/logout",
            &json!({}),
            Some("access_token=a-1; refresh_token=r-1"),
        )
        .await?;

    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(location(&resp), "/login");

    let cookies = set_cookies(&resp);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));

    Ok(())
}

#[tokio::test]
async fn test_logout_with_only_refresh_cookie_clears_both() -> Result<()> {
    let server = TestServer::start().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server.backend)
        .await;

    let resp = server
        .post("/logout", &json!({}), Some("refresh_token=r-1"))
        .await?;

    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(location(&resp), "/login");

    let cookies = set_cookies(&resp);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("access_token=;")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=;")));
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));

    Ok(())
}

#[tokio::test]
async fn test_login_runs_with_stale_access_cookie() -> Result<()> {
    let server = TestServer::start().await?;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_json("a-1", "r-1")))
        .expect(1)
        .mount(&server.backend)
        .await;
    mount_me(&server, "a-1", "client").await;

    let resp = server
        .post(
            "/login",
            &json!({"email": "ana@example.com", "password": "pw"}),
            Some("access_token=stale"),
        )
        .await?;

    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(location(&resp), "/portal/dashboard");
    assert!(
        set_cookies(&resp)
            .iter()
            .any(|c| c.starts_with("access_token=a-1;"))
    );

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Navigation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_anonymous_area_request_goes_to_login() -> Result<()> {
    let server = TestServer::start().await?;

    let resp = server.get("/admin/clients", None).await?;
    assert_eq!(resp.status().as_u16(), 307);
    assert_eq!(location(&resp), "/login?redirect=%2Fadmin%2Fclients");

    Ok(())
}

#[tokio::test]
async fn test_root_dispatches_by_role() -> Result<()> {
    let server = TestServer::start().await?;
    mount_me(&server, "admin-token", "super_admin").await;
    mount_me(&server, "client-token", "client").await;

    let resp = server.get("/", Some("access_token=admin-token")).await?;
    assert_eq!(resp.status().as_u16(), 307);
    assert_eq!(location(&resp), "/admin/dashboard");

    let resp = server.get("/", Some("access_token=client-token")).await?;
    assert_eq!(location(&resp), "/portal/dashboard");

    let resp = server.get("/", None).await?;
    assert_eq!(location(&resp), "/login");

    Ok(())
}

#[tokio::test]
async fn test_admin_area_renders_shell_for_admin() -> Result<()> {
    let server = TestServer::start().await?;
    mount_me(&server, "a-1", "company_admin").await;

    let resp = server.get("/admin/clients/42", Some("access_token=a-1")).await?;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await?;
    assert_eq!(body["area"], "admin");
    assert_eq!(body["path"], "/admin/clients/42");
    assert_eq!(body["user"]["role"], "company_admin");

    Ok(())
}

#[tokio::test]
async fn test_client_in_admin_area_goes_to_portal() -> Result<()> {
    let server = TestServer::start().await?;
    mount_me(&server, "a-1", "client").await;

    let resp = server.get("/admin", Some("access_token=a-1")).await?;
    assert_eq!(resp.status().as_u16(), 307);
    assert_eq!(location(&resp), "/portal/dashboard");

    let resp = server.get("/portal/invoices", Some("access_token=a-1")).await?;
    assert_eq!(resp.status().as_u16(), 200);

    Ok(())
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_into_cookies() -> Result<()> {
    let server = TestServer::start().await?;
    mount_expired(&server, "stale").await;
    mount_me(&server, "fresh", "client").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_json("fresh", "r-2")))
        .expect(1)
        .mount(&server.backend)
        .await;

    let resp = server
        .get(
            "/portal/dashboard",
            Some("access_token=stale; refresh_token=r-1"),
        )
        .await?;

    assert_eq!(resp.status().as_u16(), 200);

    let cookies = set_cookies(&resp);
    assert!(cookies.iter().any(|c| c.starts_with("access_token=fresh;")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=r-2;")));

    Ok(())
}

#[tokio::test]
async fn test_failed_refresh_clears_cookies_and_redirects() -> Result<()> {
    let server = TestServer::start().await?;
    mount_expired(&server, "stale").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server.backend)
        .await;

    let resp = server
        .get(
            "/admin/lots",
            Some("access_token=stale; refresh_token=r-1"),
        )
        .await?;

    assert_eq!(resp.status().as_u16(), 307);
    assert_eq!(location(&resp), "/login");
    assert!(set_cookies(&resp).iter().all(|c| c.contains("Max-Age=0")));
    assert_eq!(set_cookies(&resp).len(), 2);

    Ok(())
}
