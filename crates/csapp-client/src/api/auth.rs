//! Auth API.

use csapp_types::{LoginRequest, Me, SignupRequest, TokenPair, TokenResponse};

use crate::client::ApiClient;
use crate::error::Result;
use crate::request::ApiRequest;

/// Auth API client.
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in, store the returned token pair and fetch the profile.
    ///
    /// A 401 here means bad credentials and is returned as-is.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Me> {
        let request = ApiRequest::post("auth/login")
            .json(credentials)?
            .without_refresh();
        self.establish(request).await
    }

    /// Register a company and its first admin, then sign in as that admin.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Me> {
        let request = ApiRequest::post("auth/signup")
            .json(request)?
            .without_refresh();
        self.establish(request).await
    }

    /// Fetch the signed-in user's profile.
    pub async fn me(&self) -> Result<Me> {
        self.client.get("auth/me").await
    }

    /// Notify the backend and clear local tokens.
    ///
    /// The backend call is best-effort; tokens are cleared whatever it returns.
    pub async fn logout(&self) {
        let request = ApiRequest::post("auth/logout").without_refresh();
        if let Err(e) = self.client.execute(request).await {
            tracing::debug!(error = %e, "Logout notification failed");
        }
        self.client.token_store().clear_tokens();
    }

    /// Exchange the stored refresh token for a new pair.
    pub async fn refresh(&self) -> bool {
        self.client.try_refresh().await
    }

    async fn establish(&self, request: ApiRequest) -> Result<Me> {
        let response: TokenResponse = self.client.send(request).await?;
        self.client
            .token_store()
            .set_tokens(&TokenPair::from(response));
        self.me().await
    }
}
