//! Token cookies.
//!
//! The browser holds the token pair in two cookies. Each request seeds a
//! [`CookieTokenStore`] from its `Cookie` header; whatever the request does
//! to the pair (refresh, login, logout, expiry) is written back as
//! `Set-Cookie` headers on the response.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use csapp_client::TokenStore;
use csapp_client::token_store::{ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
use csapp_types::TokenPair;
use parking_lot::Mutex;

/// Cookie name for the access token (1 hour).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (7 days).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header, percent-decoded.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for part in raw.split(';') {
            if let Some((key, value)) = part.trim().split_once('=')
                && key.trim() == name
            {
                let value = value.trim();
                return Some(
                    urlencoding::decode(value)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| value.to_string()),
                );
            }
        }
    }
    None
}

/// Whether the request carries a non-empty access token cookie.
pub fn has_access_cookie(headers: &HeaderMap) -> bool {
    get_cookie(headers, ACCESS_COOKIE_NAME).is_some_and(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Cookie policy
// ─────────────────────────────────────────────────────────────────────────────

/// Attributes applied to token cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Add the `Secure` attribute (site served over https).
    pub secure: bool,
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            secure: false,
            access_max_age: ACCESS_TOKEN_TTL,
            refresh_max_age: REFRESH_TOKEN_TTL,
        }
    }
}

impl CookiePolicy {
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Render a `Set-Cookie` value.
    pub fn render(&self, name: &str, value: &str, max_age: Duration) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; SameSite=Lax; Max-Age={}",
            name,
            urlencoding::encode(value),
            max_age.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` values storing both tokens.
    pub fn set_pair(&self, tokens: &TokenPair) -> [String; 2] {
        [
            self.render(ACCESS_COOKIE_NAME, &tokens.access_token, self.access_max_age),
            self.render(
                REFRESH_COOKIE_NAME,
                &tokens.refresh_token,
                self.refresh_max_age,
            ),
        ]
    }

    /// `Set-Cookie` values removing both tokens.
    pub fn clear_pair(&self) -> [String; 2] {
        [
            self.render(ACCESS_COOKIE_NAME, "", Duration::ZERO),
            self.render(REFRESH_COOKIE_NAME, "", Duration::ZERO),
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CookieTokenStore
// ─────────────────────────────────────────────────────────────────────────────

/// Last write made to the pair during this request.
#[derive(Debug, Clone, Default)]
enum PendingWrite {
    #[default]
    None,
    Set(TokenPair),
    Cleared,
}

#[derive(Default)]
struct CookieJar {
    access: Option<String>,
    refresh: Option<String>,
    pending: PendingWrite,
}

/// Per-request token store backed by the browser's cookies.
pub struct CookieTokenStore {
    policy: CookiePolicy,
    jar: Mutex<CookieJar>,
}

impl fmt::Debug for CookieTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let jar = self.jar.lock();
        f.debug_struct("CookieTokenStore")
            .field("policy", &self.policy)
            .field("has_access", &jar.access.is_some())
            .field("has_refresh", &jar.refresh.is_some())
            .field("pending", &jar.pending)
            .finish()
    }
}

impl CookieTokenStore {
    /// Seed from the request's cookies.
    pub fn from_headers(headers: &HeaderMap, policy: CookiePolicy) -> Arc<Self> {
        let non_empty = |name| get_cookie(headers, name).filter(|v| !v.is_empty());
        Arc::new(Self {
            policy,
            jar: Mutex::new(CookieJar {
                access: non_empty(ACCESS_COOKIE_NAME),
                refresh: non_empty(REFRESH_COOKIE_NAME),
                pending: PendingWrite::None,
            }),
        })
    }

    /// `Set-Cookie` values for the writes made so far.
    pub fn set_cookie_values(&self) -> Vec<String> {
        match &self.jar.lock().pending {
            PendingWrite::None => Vec::new(),
            PendingWrite::Set(tokens) => self.policy.set_pair(tokens).to_vec(),
            PendingWrite::Cleared => self.policy.clear_pair().to_vec(),
        }
    }

    /// Append pending `Set-Cookie` headers to a response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for value in self.set_cookie_values() {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(e) => tracing::warn!(error = %e, "Dropping unencodable cookie"),
            }
        }
    }
}

impl TokenStore for CookieTokenStore {
    fn set_tokens(&self, tokens: &TokenPair) {
        let mut jar = self.jar.lock();
        jar.access = Some(tokens.access_token.clone());
        jar.refresh = Some(tokens.refresh_token.clone());
        jar.pending = PendingWrite::Set(tokens.clone());
    }

    fn access_token(&self) -> Option<String> {
        self.jar.lock().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.jar.lock().refresh.clone()
    }

    fn clear_tokens(&self) {
        let mut jar = self.jar.lock();
        jar.access = None;
        jar.refresh = None;
        jar.pending = PendingWrite::Cleared;
    }
}
