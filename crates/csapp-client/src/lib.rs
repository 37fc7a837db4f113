//! Authenticated HTTP client for the CSApp lot-sales API.
//!
//! All calls pass through one request wrapper that attaches the stored
//! bearer token, refreshes the token pair once on a 401 and retries once,
//! and normalizes error bodies into [`Error`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use csapp_client::{ApiClient, MemoryTokenStore, Result};
//! use csapp_types::LoginRequest;
//!
//! # async fn example() -> Result<()> {
//! let client = ApiClient::builder()
//!     .base_url("http://localhost:8000/api/v1")
//!     .token_store(Arc::new(MemoryTokenStore::new()))
//!     .build()?;
//!
//! let me = client
//!     .auth()
//!     .login(&LoginRequest::new("admin@example.com", "secret"))
//!     .await?;
//! println!("Signed in as {} ({})", me.full_name, me.role);
//!
//! let dashboard = client.dashboard().stats().await?;
//! println!("{} active clients", dashboard.active_clients);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
mod refresh;
pub mod request;
pub mod token_store;

pub use api::{ActivityQuery, RevenueQuery};
pub use client::{ApiClient, ClientBuilder, DEFAULT_TIMEOUT};
pub use error::{Error, ErrorDetail, Result};
pub use request::{ApiRequest, FilePart, RequestBody};
pub use token_store::{
    FileTokenStore, MemoryTokenStore, SharedTokenStore, TokenLifetimes, TokenStore,
};
