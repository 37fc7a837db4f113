//! Typed endpoint groups.
//!
//! Each group is a thin wrapper that names paths and body types; all calls
//! go through the client's authenticated request wrapper.

mod auth;
mod clients;
mod dashboard;
mod developments;
mod financial;
mod lots;
mod portal;
mod services;

pub use auth::AuthApi;
pub use clients::ClientsApi;
pub use dashboard::{ActivityQuery, DashboardApi, RevenueQuery};
pub use developments::DevelopmentsApi;
pub use financial::FinancialApi;
pub use lots::LotsApi;
pub use portal::PortalApi;
pub use services::ServicesApi;
