//! Authentication payloads and the current-user profile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Default landing page for admin-capable roles.
pub const ADMIN_HOME: &str = "/admin/dashboard";

/// Default landing page for client users.
pub const PORTAL_HOME: &str = "/portal/dashboard";

// ─────────────────────────────────────────────────────────────────────────────
// Tokens
// ─────────────────────────────────────────────────────────────────────────────

/// An access/refresh token pair. Always stored and replaced as a unit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Token values must never end up in logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Token response returned by login, signup and refresh.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

impl From<TokenResponse> for TokenPair {
    fn from(response: TokenResponse) -> Self {
        TokenPair {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        }
    }
}

/// Body of `POST /auth/refresh`. The refresh token travels in the body,
/// never as a bearer credential.
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Credentials for `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Company signup for `POST /auth/signup`. Creates the company and its first
/// admin account in one step.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub company_name: String,
    pub company_slug: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub cpf_cnpj: String,
    pub phone: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("company_slug", &self.company_slug)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

/// Tenant role of the authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    CompanyAdmin,
    Client,
}

impl UserRole {
    /// Roles allowed into the admin console.
    pub const ADMIN_CAPABLE: [UserRole; 2] = [UserRole::SuperAdmin, UserRole::CompanyAdmin];

    /// Whether this role may enter the admin console.
    ///
    /// Every admin-access decision goes through this predicate.
    pub fn can_access_admin(self) -> bool {
        Self::ADMIN_CAPABLE.contains(&self)
    }

    pub fn is_super_admin(self) -> bool {
        self == UserRole::SuperAdmin
    }

    /// Landing page for this role when no other destination applies.
    pub fn default_landing(self) -> &'static str {
        if self.can_access_admin() {
            ADMIN_HOME
        } else {
            PORTAL_HOME
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::CompanyAdmin => "company_admin",
            UserRole::Client => "client",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is outside the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "super_admin" => Ok(UserRole::SuperAdmin),
            "company_admin" => Ok(UserRole::CompanyAdmin),
            "client" => Ok(UserRole::Client),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

// Role names are matched case-insensitively.
impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Current user
// ─────────────────────────────────────────────────────────────────────────────

/// Profile returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Me {
    pub id: String,
    /// `None` for super admins, who are not bound to a company.
    pub company_id: Option<String>,
    pub role: UserRole,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub cpf_cnpj: String,
}

impl Me {
    pub fn can_access_admin(&self) -> bool {
        self.role.can_access_admin()
    }

    pub fn default_landing(&self) -> &'static str {
        self.role.default_landing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_capable_roles() {
        assert!(UserRole::SuperAdmin.can_access_admin());
        assert!(UserRole::CompanyAdmin.can_access_admin());
        assert!(!UserRole::Client.can_access_admin());
        assert!(UserRole::SuperAdmin.is_super_admin());
        assert!(!UserRole::CompanyAdmin.is_super_admin());
    }

    #[test]
    fn test_default_landing() {
        assert_eq!(UserRole::CompanyAdmin.default_landing(), "/admin/dashboard");
        assert_eq!(UserRole::Client.default_landing(), "/portal/dashboard");
    }

    #[test]
    fn test_role_parses_case_insensitively() {
        let role: UserRole = serde_json::from_str("\"COMPANY_ADMIN\"").unwrap();
        assert_eq!(role, UserRole::CompanyAdmin);
        assert_eq!("Client".parse::<UserRole>().unwrap(), UserRole::Client);
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_me_deserializes_without_company() {
        let me: Me = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "company_id": null,
            "role": "super_admin",
            "full_name": "Root",
            "email": "root@example.com",
            "phone": "",
            "cpf_cnpj": ""
        }))
        .unwrap();
        assert!(me.company_id.is_none());
        assert!(me.can_access_admin());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let printed = format!("{:?}", pair);
        assert!(!printed.contains("secret"));

        let login = LoginRequest::new("a@b.com", "hunter2");
        assert!(!format!("{:?}", login).contains("hunter2"));
    }

    #[test]
    fn test_token_response_default_type() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(response.token_type, "bearer");
        let pair: TokenPair = response.into();
        assert_eq!(pair, TokenPair::new("a", "r"));
    }
}
