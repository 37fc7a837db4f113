//! Auth session context.
//!
//! One `AuthSession` is built at startup and handed to everything that needs
//! the current user. Its state moves through
//! `Loading -> Authenticated | Unauthenticated` and is published on a
//! `watch` channel so views can wait for it to resolve.

use std::sync::Arc;

use csapp_client::{ApiClient, Error, Result};
use csapp_types::{LoginRequest, Me, SignupRequest};
use tokio::sync::watch;

use crate::guards::{LOGIN_PATH, resolve_login_redirect};
use crate::navigation::Navigator;

/// Resolution state of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Profile fetch in flight.
    Loading,
    Authenticated(Me),
    Unauthenticated,
}

impl AuthState {
    pub fn user(&self) -> Option<&Me> {
        match self {
            AuthState::Authenticated(me) => Some(me),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Current user and sign-in/sign-out flows.
#[derive(Debug)]
pub struct AuthSession {
    client: ApiClient,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<AuthState>,
}

impl AuthSession {
    /// Create a session in the `Loading` state.
    pub fn new(client: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            client,
            navigator,
            state,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<Me> {
        self.state.borrow().user().cloned()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Wait until the state is no longer `Loading`.
    pub async fn resolved(&self) -> AuthState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => AuthState::Unauthenticated,
        }
    }

    /// Whether the current user may enter the admin area.
    pub fn is_admin(&self) -> bool {
        self.state
            .borrow()
            .user()
            .is_some_and(|me| me.can_access_admin())
    }

    pub fn is_super_admin(&self) -> bool {
        self.state
            .borrow()
            .user()
            .is_some_and(|me| me.role.is_super_admin())
    }

    fn publish(&self, state: AuthState) {
        self.state.send_replace(state);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve the initial state by fetching the profile.
    pub async fn initialize(&self) -> AuthState {
        self.publish(AuthState::Loading);
        self.refresh_user().await;
        self.state()
    }

    /// Re-fetch the profile. Any failure leaves the session unauthenticated.
    pub async fn refresh_user(&self) -> Option<Me> {
        match self.client.auth().me().await {
            Ok(me) => {
                tracing::debug!(user_id = %me.id, role = %me.role, "Session resolved");
                self.publish(AuthState::Authenticated(me.clone()));
                Some(me)
            }
            Err(e) => {
                tracing::debug!(error = %e, "No active session");
                self.publish(AuthState::Unauthenticated);
                None
            }
        }
    }

    /// Sign in and navigate to the validated destination.
    ///
    /// `redirect` is honored only when it lies in the user's own area.
    pub async fn login(&self, credentials: &LoginRequest, redirect: Option<&str>) -> Result<String> {
        let me = self.client.auth().login(credentials).await?;
        let destination = resolve_login_redirect(me.role, redirect);
        tracing::info!(user_id = %me.id, role = %me.role, destination = %destination, "Signed in");

        self.publish(AuthState::Authenticated(me));
        self.navigator.replace(&destination);
        Ok(destination)
    }

    /// Register a company and land its first admin on their home page.
    pub async fn signup(&self, request: &SignupRequest) -> Result<String> {
        let me = self.client.auth().signup(request).await?;
        let destination = me.default_landing().to_string();
        tracing::info!(user_id = %me.id, "Signed up");

        self.publish(AuthState::Authenticated(me));
        self.navigator.replace(&destination);
        Ok(destination)
    }

    /// Sign out. Never fails: the backend is notified best-effort, tokens
    /// are cleared and navigation goes to the login page regardless.
    pub async fn logout(&self) {
        self.publish(AuthState::Unauthenticated);
        self.client.auth().logout().await;
        tracing::info!("Signed out");
        self.navigator.replace(LOGIN_PATH);
    }

    /// Apply an API error to the session.
    ///
    /// A session expiry drops the user and sends them to login; returns
    /// whether that happened.
    pub fn handle_error(&self, error: &Error) -> bool {
        if !error.is_session_expired() {
            return false;
        }
        tracing::info!("Session expired");
        self.publish(AuthState::Unauthenticated);
        self.navigator.replace(LOGIN_PATH);
        true
    }
}
