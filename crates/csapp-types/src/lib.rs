//! Wire types for the CSApp lot-sales API.
//!
//! Everything here mirrors the backend's JSON contract. The auth types are
//! the ones the session layer reasons about; the domain types are consumed
//! verbatim and carry no behavior beyond (de)serialization.

pub mod auth;
pub mod domain;
pub mod validation;

pub use auth::{
    ADMIN_HOME, LoginRequest, Me, PORTAL_HOME, RefreshRequest, SignupRequest, TokenPair,
    TokenResponse, UnknownRole, UserRole,
};
pub use domain::*;
pub use validation::{FieldError, LocSegment};
