//! Gateway routes.

pub mod auth;
pub mod health;
pub mod pages;

pub use auth::{LoginParams, login_handler, logout_handler, signup_handler};
pub use health::health_routes;
pub use pages::{
    PageShell, PublicPage, admin_handler, login_page, portal_handler, root_handler, signup_page,
};
