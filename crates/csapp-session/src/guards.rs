//! Route guards.
//!
//! Two layers decide where a navigation may land:
//!
//! - the edge guard runs before any page is produced and only knows whether
//!   an access token is present;
//! - the layout guard runs once the session has resolved and checks the
//!   user's role against the requested area.
//!
//! Both return decisions; hosts turn them into redirects or page renders.

use csapp_types::{Me, PORTAL_HOME, UserRole};
use url::form_urlencoded;

use crate::context::AuthState;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";

/// Paths reachable without a session.
pub const PUBLIC_PATHS: [&str; 3] = [ROOT_PATH, LOGIN_PATH, SIGNUP_PATH];

/// Path prefixes the edge guard never inspects.
const EXEMPT_PREFIXES: [&str; 4] = ["/static", "/assets", "/api", "/health"];

/// Exact paths the edge guard never inspects.
const EXEMPT_FILES: [&str; 2] = ["/favicon.ico", "/manifest.json"];

// ─────────────────────────────────────────────────────────────────────────────
// Areas
// ─────────────────────────────────────────────────────────────────────────────

/// Protected section of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// Back office for super and company admins.
    Admin,
    /// Client self-service portal.
    Portal,
}

impl Area {
    pub fn prefix(self) -> &'static str {
        match self {
            Area::Admin => "/admin",
            Area::Portal => "/portal",
        }
    }

    /// Area a role lands in by default.
    pub fn for_role(role: UserRole) -> Self {
        if role.can_access_admin() {
            Area::Admin
        } else {
            Area::Portal
        }
    }

    /// Area containing `path`, if any.
    pub fn of(path: &str) -> Option<Self> {
        [Area::Admin, Area::Portal]
            .into_iter()
            .find(|area| area.contains(path))
    }

    /// Whether `path` lies in this area. Matches whole segments only, so
    /// `/administrator` is not part of `/admin`.
    pub fn contains(self, path: &str) -> bool {
        has_segment_prefix(strip_query(path), self.prefix())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Area::Admin => "admin",
            Area::Portal => "portal",
        }
    }
}

fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// Whether any segment is `.` or `..`, literal or percent-encoded.
fn has_dot_segment(path: &str) -> bool {
    strip_query(path).split('/').any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

/// Whether the edge guard skips `path` entirely.
pub fn is_exempt(path: &str) -> bool {
    EXEMPT_FILES.contains(&path)
        || EXEMPT_PREFIXES
            .iter()
            .any(|prefix| has_segment_prefix(path, prefix))
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Login URL that returns to `path` after sign-in.
pub fn login_url_for(path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", path)
        .finish();
    format!("{}?{}", LOGIN_PATH, query)
}

// ─────────────────────────────────────────────────────────────────────────────
// Edge guard
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    Allow,
    Redirect(String),
}

/// Decide a navigation from token presence alone.
///
/// Signed-in users asking for login or signup are sent to the root
/// dispatcher; anonymous users asking for a protected path are sent to login
/// with the original path preserved.
pub fn edge_guard(path: &str, has_access_token: bool) -> EdgeDecision {
    if is_exempt(path) {
        return EdgeDecision::Allow;
    }

    if is_public(path) {
        if has_access_token && (path == LOGIN_PATH || path == SIGNUP_PATH) {
            return EdgeDecision::Redirect(ROOT_PATH.to_string());
        }
        return EdgeDecision::Allow;
    }

    if !has_access_token {
        return EdgeDecision::Redirect(login_url_for(path));
    }

    EdgeDecision::Allow
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout guard and root dispatch
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutDecision {
    /// Session still resolving: show a neutral placeholder.
    Loading,
    /// Render the area for this user.
    Render(Me),
    Redirect(String),
}

/// Decide whether the resolved session may see `area`.
pub fn layout_guard(area: Area, state: &AuthState) -> LayoutDecision {
    match state {
        AuthState::Loading => LayoutDecision::Loading,
        AuthState::Unauthenticated => LayoutDecision::Redirect(LOGIN_PATH.to_string()),
        AuthState::Authenticated(me) => match area {
            Area::Admin if !me.can_access_admin() => {
                LayoutDecision::Redirect(PORTAL_HOME.to_string())
            }
            _ => LayoutDecision::Render(me.clone()),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootDecision {
    Loading,
    Redirect(String),
}

/// Landing page for the application root.
pub fn dispatch_root(state: &AuthState) -> RootDecision {
    match state {
        AuthState::Loading => RootDecision::Loading,
        AuthState::Unauthenticated => RootDecision::Redirect(LOGIN_PATH.to_string()),
        AuthState::Authenticated(me) => RootDecision::Redirect(me.default_landing().to_string()),
    }
}

/// Destination after a successful login.
///
/// A requested redirect is honored only inside the role's own area and
/// never through a dot segment; anything else falls back to the role's
/// landing page.
pub fn resolve_login_redirect(role: UserRole, requested: Option<&str>) -> String {
    match requested {
        Some(target) if Area::for_role(role).contains(target) && !has_dot_segment(target) => {
            target.to_string()
        }
        _ => role.default_landing().to_string(),
    }
}
