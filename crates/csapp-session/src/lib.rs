//! Session state and route guards.
//!
//! - [`AuthSession`]: explicitly constructed session context that owns the
//!   API client and publishes [`AuthState`] changes
//! - [`guards`]: edge guard, layout guard, root dispatch and login-redirect
//!   validation as pure decisions
//! - [`Navigator`]: sink for navigation requested by the session

mod context;
pub mod guards;
mod navigation;

pub use context::{AuthSession, AuthState};
pub use guards::{
    Area, EdgeDecision, LayoutDecision, RootDecision, dispatch_root, edge_guard, layout_guard,
    login_url_for, resolve_login_redirect,
};
pub use navigation::{Navigator, RecordingNavigator};
