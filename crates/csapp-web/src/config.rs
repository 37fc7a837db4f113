//! Gateway configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use csapp_config::CsappConfig;

use crate::cookies::CookiePolicy;
use crate::error::Result;

/// Default bind address (localhost, port 3000).
pub const DEFAULT_BIND_ADDRESS: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Attributes for token cookies.
    pub cookies: CookiePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS,
            cookies: CookiePolicy::default(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[web]` section of the loaded configuration.
    pub fn from_config(config: &CsappConfig) -> Result<Self> {
        Ok(Self {
            bind_address: config.bind_address()?,
            cookies: CookiePolicy::default().with_secure(config.secure_cookies()),
        })
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Force the `Secure` cookie attribute on or off.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookies.secure = secure;
        self
    }
}
