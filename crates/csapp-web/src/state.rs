//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::HeaderMap;
use csapp_client::{ApiClient, SharedTokenStore};
use csapp_session::{AuthSession, RecordingNavigator};

use crate::config::ServerConfig;
use crate::cookies::CookieTokenStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backend client; derived per request with the caller's cookies.
    pub client: ApiClient,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(client: ApiClient, config: ServerConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Build the session for one browser request.
    pub fn request_session(&self, headers: &HeaderMap) -> RequestSession {
        let cookies = CookieTokenStore::from_headers(headers, self.config.cookies);
        let tokens: SharedTokenStore = cookies.clone();
        let navigator = Arc::new(RecordingNavigator::new());
        let session = AuthSession::new(self.client.with_token_store(tokens), navigator.clone());
        RequestSession {
            session,
            cookies,
            navigator,
        }
    }
}

/// Session bound to one request's cookies.
#[derive(Debug)]
pub struct RequestSession {
    pub session: AuthSession,
    pub cookies: Arc<CookieTokenStore>,
    pub navigator: Arc<RecordingNavigator>,
}
