//! Browser gateway for the CSApp front end.
//!
//! Hosts the navigation guards in front of the page renderer:
//!
//! - an edge guard over every request, deciding from cookies alone
//! - a root dispatcher sending each role to its landing page
//! - layout guards on the admin and portal areas
//! - sign-in, signup and sign-out handlers that keep the token pair in
//!   cookies
//!
//! # Example
//!
//! ```ignore
//! use csapp_client::ApiClient;
//! use csapp_web::{Server, ServerConfig};
//!
//! let client = ApiClient::builder()
//!     .base_url("http://localhost:8000/api/v1")
//!     .build()?;
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:3000".parse()?);
//!
//! Server::new(client, config).run().await?;
//! ```

pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{DEFAULT_BIND_ADDRESS, ServerConfig};
pub use cookies::{CookiePolicy, CookieTokenStore};
pub use error::{Result, ServerError};
pub use middleware::edge_guard_middleware;
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use csapp_client::ApiClient;
use csapp_config::CsappConfig;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The gateway server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given backend client and configuration.
    pub fn new(client: ApiClient, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(client, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build client and server settings from the loaded configuration.
    pub fn from_config(config: &CsappConfig) -> Result<Self> {
        let client = ApiClient::builder()
            .base_url(config.api_base_url())
            .timeout(config.api_timeout())
            .build()?;
        Ok(Self::new(client, ServerConfig::from_config(config)?))
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::{get, post};

        Router::new()
            .merge(routes::health_routes())
            .route("/", get(routes::root_handler))
            .route(
                "/login",
                get(routes::login_page).post(routes::login_handler),
            )
            .route(
                "/signup",
                get(routes::signup_page).post(routes::signup_handler),
            )
            .route("/logout", post(routes::logout_handler))
            .route("/admin", get(routes::admin_handler))
            .route("/admin/{*page}", get(routes::admin_handler))
            .route("/portal", get(routes::portal_handler))
            .route("/portal/{*page}", get(routes::portal_handler))
            // Edge guard sees every request before routing
            .layer(axum::middleware::from_fn(edge_guard_middleware))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        info!(
            addr = %addr,
            api = %self.state.client.base_url(),
            "Starting gateway"
        );

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    fn test_server() -> Server {
        // Port 9 is discard; nothing in these tests reaches the backend.
        let client = ApiClient::builder()
            .base_url("http://127.0.0.1:9/api/v1")
            .build()
            .unwrap();
        Server::new(client, ServerConfig::new())
    }

    async fn get(uri: &str) -> axum::response::Response {
        test_server()
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_server_health_endpoint() {
        assert_eq!(get("/health").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_without_cookies_goes_to_login() {
        let response = get("/").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_login_page_is_public() {
        let response = get("/login").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_area_preserves_path() {
        let response = get("/portal/invoices").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?redirect=%2Fportal%2Finvoices"
        );
    }

    #[test]
    fn test_server_config_builder() {
        let server = Server::new(
            ApiClient::builder()
                .base_url("http://localhost:8000/api/v1")
                .build()
                .unwrap(),
            ServerConfig::new().with_bind_address("0.0.0.0:9000".parse().unwrap()),
        );
        assert_eq!(server.bind_address().port(), 9000);
    }
}
