//! Edge guard middleware.
//!
//! Runs before any handler and decides from cookie presence alone whether
//! a navigation may proceed. Role checks happen later, in the layout
//! guard, once the session has been resolved against the backend.
//!
//! Only `GET` and `HEAD` are navigations. Form submissions (sign-in,
//! signup, sign-out) go straight to their handlers, which resolve the
//! session themselves and must run whatever cookies the browser holds.

use axum::{
    body::Body,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use csapp_session::{EdgeDecision, edge_guard};

use crate::cookies::has_access_cookie;

/// Edge guard middleware function.
pub async fn edge_guard_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method();
    if *method != Method::GET && *method != Method::HEAD {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let has_token = has_access_cookie(request.headers());

    match edge_guard(&path, has_token) {
        EdgeDecision::Allow => next.run(request).await,
        EdgeDecision::Redirect(target) => {
            tracing::debug!(path = %path, target = %target, has_token, "Edge redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        http::{StatusCode, header},
        middleware,
        routing::{get, post},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "root" }))
            .route("/login", get(|| async { "login" }).post(|| async { "signed in" }))
            .route("/logout", post(|| async { "signed out" }))
            .route("/admin/clients", get(|| async { "clients" }))
            .route("/health", get(|| async { "ok" }))
            .layer(middleware::from_fn(edge_guard_middleware))
    }

    async fn get_with(uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_protected_path_redirects_to_login() {
        let response = get_with("/admin/clients", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login?redirect=%2Fadmin%2Fclients");
    }

    #[tokio::test]
    async fn test_signed_in_login_redirects_to_root() {
        let response = get_with("/login", Some("access_token=t")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_pass_through() {
        assert_eq!(get_with("/", None).await.status(), StatusCode::OK);
        assert_eq!(get_with("/health", None).await.status(), StatusCode::OK);
        assert_eq!(
            get_with("/admin/clients", Some("access_token=t")).await.status(),
            StatusCode::OK
        );
    }

    async fn post_with(uri: &str, cookie: &str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        app().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_form_posts_bypass_guard() {
        // Stale access cookie must not bounce a sign-in attempt to "/".
        let response = post_with("/login", "access_token=stale").await;
        assert_eq!(response.status(), StatusCode::OK);

        // Refresh-only session must still reach sign-out.
        let response = post_with("/logout", "refresh_token=r1").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_cookie_is_anonymous() {
        let response = get_with("/admin/clients", Some("access_token=")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }
}
