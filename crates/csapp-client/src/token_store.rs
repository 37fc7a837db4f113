//! Token storage.
//!
//! A token store holds the access/refresh pair between requests. Every
//! implementation writes and clears both tokens together so no reader can
//! observe one new and one old token. Each token carries its own expiry and
//! reads of an expired token return `None`, the same way a browser drops a
//! cookie whose max-age has passed.
//!
//! Stores never fail: storage problems are logged and the store degrades to
//! "no session".

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use csapp_types::TokenPair;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Default token file name within the csapp config directory.
pub const TOKEN_FILE: &str = "session.json";

/// Lifetime of an access token (1 hour).
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Lifetime of a refresh token (7 days).
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(604_800);

// ============================================================================
// TokenStore Trait
// ============================================================================

/// Storage for the session's token pair.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Replace both tokens.
    fn set_tokens(&self, tokens: &TokenPair);

    /// Current access token, if present and not expired.
    fn access_token(&self) -> Option<String>;

    /// Current refresh token, if present and not expired.
    fn refresh_token(&self) -> Option<String>;

    /// Remove both tokens. Safe to call on an empty store.
    fn clear_tokens(&self);

    /// Whether any usable token is stored.
    fn has_session(&self) -> bool {
        self.access_token().is_some() || self.refresh_token().is_some()
    }
}

/// Shared token store for use across async contexts.
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// Independent lifetimes for the two tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: ACCESS_TOKEN_TTL,
            refresh: REFRESH_TOKEN_TTL,
        }
    }
}

// ============================================================================
// Stored representation
// ============================================================================

/// A token value with its expiry.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl StoredToken {
    fn issue(value: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(3650));
        Self {
            value: value.to_string(),
            expires_at: now + ttl,
        }
    }

    fn live_value(&self, now: DateTime<Utc>) -> Option<String> {
        (now < self.expires_at).then(|| self.value.clone())
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Both token slots. Always written as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access: Option<StoredToken>,
    pub refresh: Option<StoredToken>,
}

impl StoredTokens {
    /// Stamp a fresh pair with its expiries.
    pub fn issue(tokens: &TokenPair, lifetimes: TokenLifetimes, now: DateTime<Utc>) -> Self {
        Self {
            access: Some(StoredToken::issue(&tokens.access_token, lifetimes.access, now)),
            refresh: Some(StoredToken::issue(
                &tokens.refresh_token,
                lifetimes.refresh,
                now,
            )),
        }
    }

    pub fn access_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.access.as_ref().and_then(|t| t.live_value(now))
    }

    pub fn refresh_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.refresh.as_ref().and_then(|t| t.live_value(now))
    }
}

// ============================================================================
// MemoryTokenStore
// ============================================================================

/// In-process token store. Both slots sit behind one lock.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slots: RwLock<StoredTokens>,
    lifetimes: TokenLifetimes,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lifetimes(lifetimes: TokenLifetimes) -> Self {
        Self {
            slots: RwLock::new(StoredTokens::default()),
            lifetimes,
        }
    }

    /// Create a store that already holds a pair.
    pub fn with_tokens(tokens: &TokenPair) -> Self {
        let store = Self::new();
        store.set_tokens(tokens);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn set_tokens(&self, tokens: &TokenPair) {
        let issued = StoredTokens::issue(tokens, self.lifetimes, Utc::now());
        *self.slots.write() = issued;
    }

    fn access_token(&self) -> Option<String> {
        self.slots.read().access_at(Utc::now())
    }

    fn refresh_token(&self) -> Option<String> {
        self.slots.read().refresh_at(Utc::now())
    }

    fn clear_tokens(&self) {
        *self.slots.write() = StoredTokens::default();
    }
}

// ============================================================================
// FileTokenStore
// ============================================================================

/// File-backed token store for command-line use.
///
/// The pair is persisted as one JSON document and replaced through a
/// temporary file and rename, so a crash never leaves half a pair on disk.
#[derive(Debug)]
pub struct FileTokenStore {
    token_path: PathBuf,
    lifetimes: TokenLifetimes,
    cache: RwLock<Option<StoredTokens>>,
}

impl FileTokenStore {
    /// Create a store in the given data directory.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(TOKEN_FILE))
    }

    /// Create with a custom token path.
    pub fn with_path(token_path: PathBuf) -> Self {
        Self {
            token_path,
            lifetimes: TokenLifetimes::default(),
            cache: RwLock::new(None),
        }
    }

    /// Get the token file path.
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Expiry of the stored tokens, for status display.
    pub fn expiries(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let tokens = self.snapshot();
        (
            tokens.access.as_ref().map(StoredToken::expires_at),
            tokens.refresh.as_ref().map(StoredToken::expires_at),
        )
    }

    fn snapshot(&self) -> StoredTokens {
        if let Some(cached) = self.cache.read().as_ref() {
            return cached.clone();
        }

        let mut cache = self.cache.write();
        if let Some(cached) = cache.as_ref() {
            return cached.clone();
        }
        let loaded = self.load();
        *cache = Some(loaded.clone());
        loaded
    }

    fn load(&self) -> StoredTokens {
        let content = match std::fs::read_to_string(&self.token_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoredTokens::default(),
            Err(e) => {
                tracing::warn!(path = %self.token_path.display(), error = %e, "Failed to read token file");
                return StoredTokens::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %self.token_path.display(), error = %e, "Ignoring unreadable token file");
            StoredTokens::default()
        })
    }

    fn persist(&self, tokens: &StoredTokens) -> std::io::Result<()> {
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(tokens)?;
        let tmp = self.token_path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.token_path)
    }
}

impl TokenStore for FileTokenStore {
    fn set_tokens(&self, tokens: &TokenPair) {
        let issued = StoredTokens::issue(tokens, self.lifetimes, Utc::now());
        let mut cache = self.cache.write();
        if let Err(e) = self.persist(&issued) {
            tracing::warn!(path = %self.token_path.display(), error = %e, "Failed to write token file");
        } else {
            tracing::debug!(path = %self.token_path.display(), "Tokens saved");
        }
        *cache = Some(issued);
    }

    fn access_token(&self) -> Option<String> {
        self.snapshot().access_at(Utc::now())
    }

    fn refresh_token(&self) -> Option<String> {
        self.snapshot().refresh_at(Utc::now())
    }

    fn clear_tokens(&self) {
        let mut cache = self.cache.write();
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => tracing::debug!(path = %self.token_path.display(), "Tokens removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.token_path.display(), error = %e, "Failed to delete token file");
            }
        }
        *cache = Some(StoredTokens::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pair(tag: &str) -> TokenPair {
        TokenPair::new(format!("access-{}", tag), format!("refresh-{}", tag))
    }

    #[test]
    fn test_memory_set_and_read() {
        let store = MemoryTokenStore::new();
        assert!(store.access_token().is_none());
        assert!(!store.has_session());

        store.set_tokens(&pair("1"));
        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_memory_replaces_both_tokens() {
        let store = MemoryTokenStore::with_tokens(&pair("old"));
        store.set_tokens(&pair("new"));

        assert_eq!(store.access_token().as_deref(), Some("access-new"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-new"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = MemoryTokenStore::with_tokens(&pair("1"));
        store.clear_tokens();
        store.clear_tokens();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());

        let empty = MemoryTokenStore::new();
        empty.clear_tokens();
        assert!(!empty.has_session());
    }

    #[test]
    fn test_expired_access_token_is_hidden() {
        let store = MemoryTokenStore::with_lifetimes(TokenLifetimes {
            access: Duration::ZERO,
            refresh: REFRESH_TOKEN_TTL,
        });
        store.set_tokens(&pair("1"));

        assert!(store.access_token().is_none());
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
        assert!(store.has_session());
    }

    #[test]
    fn test_stored_tokens_expiry_boundaries() {
        let now = Utc::now();
        let tokens = StoredTokens::issue(&pair("1"), TokenLifetimes::default(), now);

        assert!(tokens.access_at(now + chrono::Duration::minutes(59)).is_some());
        assert!(tokens.access_at(now + chrono::Duration::minutes(61)).is_none());
        assert!(tokens.refresh_at(now + chrono::Duration::days(6)).is_some());
        assert!(tokens.refresh_at(now + chrono::Duration::days(8)).is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        store.set_tokens(&pair("1"));
        assert!(store.token_path().exists());

        let reopened = FileTokenStore::new(temp.path());
        assert_eq!(reopened.access_token().as_deref(), Some("access-1"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_file_store_clear() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        store.set_tokens(&pair("1"));

        store.clear_tokens();
        store.clear_tokens();
        assert!(!store.token_path().exists());
        assert!(store.access_token().is_none());
        assert!(FileTokenStore::new(temp.path()).refresh_token().is_none());
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join(TOKEN_FILE), "{not json").unwrap();

        let store = FileTokenStore::new(temp.path());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_file_store_never_leaks_values_in_debug() {
        let temp = tempdir().unwrap();
        let store = FileTokenStore::new(temp.path());
        store.set_tokens(&pair("secret"));

        let printed = format!("{:?}", store);
        assert!(!printed.contains("access-secret"));
    }
}
