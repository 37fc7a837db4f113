//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{
    AuthApi, ClientsApi, DashboardApi, DevelopmentsApi, FinancialApi, LotsApi, PortalApi,
    ServicesApi,
};
use crate::error::{Error, Result, parse_error_detail};
use crate::refresh::RefreshCoordinator;
use crate::request::{ApiRequest, FilePart, RequestBody};
use crate::token_store::{MemoryTokenStore, SharedTokenStore};

/// Default timeout for requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Refresh endpoint, relative to the API base URL.
const REFRESH_PATH: &str = "auth/refresh";

/// CSApp API client.
///
/// Every call goes through [`ApiClient::execute`], which attaches the stored
/// access token and, on a 401, refreshes the token pair once and retries the
/// call once with the new token.
///
/// # Example
///
/// ```no_run
/// use csapp_client::ApiClient;
///
/// # async fn example() -> csapp_client::Result<()> {
/// let client = ApiClient::builder()
///     .base_url("http://localhost:8000/api/v1")
///     .build()?;
///
/// let clients = client.clients().list(&Default::default()).await?;
/// println!("{} clients", clients.total);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
    tokens: SharedTokenStore,
    refresher: Arc<RefreshCoordinator>,
}

/// Inner client state (shared across clones and derived clients).
pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) refresh_url: Url,
    pub(crate) timeout: Duration,
}

impl ApiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Token store this client reads and writes.
    pub fn token_store(&self) -> &SharedTokenStore {
        &self.tokens
    }

    /// Derive a client bound to another token store.
    ///
    /// The connection pool and settings are shared; refresh coordination is
    /// per store.
    pub fn with_token_store(&self, tokens: SharedTokenStore) -> Self {
        let refresher = RefreshCoordinator::new(
            self.inner.http.clone(),
            self.inner.refresh_url.clone(),
            self.inner.timeout,
            tokens.clone(),
        );
        Self {
            inner: self.inner.clone(),
            tokens,
            refresher: Arc::new(refresher),
        }
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Returns `false` on any failure and leaves the store untouched.
    pub async fn try_refresh(&self) -> bool {
        self.refresher.try_refresh().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the admin clients API.
    pub fn clients(&self) -> ClientsApi {
        ClientsApi::new(self.clone())
    }

    /// Access the admin developments API.
    pub fn developments(&self) -> DevelopmentsApi {
        DevelopmentsApi::new(self.clone())
    }

    /// Access the admin lots API.
    pub fn lots(&self) -> LotsApi {
        LotsApi::new(self.clone())
    }

    /// Access the admin services API.
    pub fn services(&self) -> ServicesApi {
        ServicesApi::new(self.clone())
    }

    /// Access the admin financial API.
    pub fn financial(&self) -> FinancialApi {
        FinancialApi::new(self.clone())
    }

    /// Access the admin dashboard API.
    pub fn dashboard(&self) -> DashboardApi {
        DashboardApi::new(self.clone())
    }

    /// Access the client portal API.
    pub fn portal(&self) -> PortalApi {
        PortalApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request wrapper
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request and return the successful response.
    ///
    /// A 401 triggers one refresh and one retry with the refreshed token; the
    /// retry's outcome is final. When the refresh fails the token store is
    /// cleared and the call fails with [`Error::SessionExpired`]. Requests
    /// built with [`ApiRequest::without_refresh`] treat a 401 like any other
    /// error status.
    pub async fn execute(&self, request: ApiRequest) -> Result<Response> {
        let token = self.tokens.access_token();
        let response = self.dispatch(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !request.refresh_on_unauthorized {
            return ensure_success(response).await;
        }

        tracing::debug!(method = %request.method, path = %request.path, "Access token rejected");

        if !self.refresher.refresh_after(token.as_deref()).await {
            tracing::info!(path = %request.path, "Session expired, clearing tokens");
            self.tokens.clear_tokens();
            return Err(Error::SessionExpired);
        }

        let token = self.tokens.access_token();
        let response = self.dispatch(&request, token.as_deref()).await?;
        ensure_success(response).await
    }

    /// Send a request and decode the JSON response.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        decode(response).await
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(ApiRequest::get(path).query(query)?).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    /// Make a POST request without a body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::post(path)).await
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    /// Make a PATCH request.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::patch(path).json(body)?).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Upload a file as multipart form data.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, file: FilePart) -> Result<T> {
        self.send(ApiRequest::post(path).file(file)).await
    }

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let url = self.url(&request.path)?;

        let mut headers = request.headers.clone();
        if token.is_some() {
            headers.remove(AUTHORIZATION);
        }

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .timeout(self.inner.timeout)
            .headers(headers);

        if let Some(query) = &request.query {
            builder = builder.query(query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(file) => builder.multipart(file.to_form()?),
        };

        Ok(builder.send().await?)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("tokens", &self.tokens)
            .finish()
    }
}

/// Turn a non-2xx response into an [`Error::Api`].
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let detail = parse_error_detail(status, &body);
    tracing::debug!(status = status.as_u16(), detail = %detail, "API request failed");
    Err(Error::Api {
        status: status.as_u16(),
        detail,
    })
}

/// Decode a successful response. No content decodes as JSON `null`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(T::deserialize(serde_json::Value::Null)?);
    }

    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::deserialize(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Builder for creating an ApiClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    token_store: Option<SharedTokenStore>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            token_store: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the API base URL, including any version prefix.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the token store. Defaults to an empty in-memory store.
    pub fn token_store(mut self, store: SharedTokenStore) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Normalize so relative joins keep the version prefix
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let refresh_url = base_url.join(REFRESH_PATH)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("csapp-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        let tokens = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let refresher = RefreshCoordinator::new(
            http.clone(),
            refresh_url.clone(),
            self.timeout,
            tokens.clone(),
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                refresh_url,
                timeout: self.timeout,
            }),
            tokens,
            refresher: Arc::new(refresher),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csapp_types::TokenPair;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let result = ClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000/api/v1")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/v1/");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);

        let client = ClientBuilder::new()
            .base_url("http://localhost:8000/api/v1/")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/v1/");
    }

    #[test]
    fn test_url_building_keeps_prefix() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000/api/v1")
            .build()
            .unwrap();

        let url = client.url("auth/me").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/auth/me");

        let url = client.url("/admin/clients/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/admin/clients/");
    }

    #[test]
    fn test_with_token_store_shares_settings() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8000/api/v1")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        let store: SharedTokenStore =
            Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("a", "r")));

        let derived = client.with_token_store(store);
        assert_eq!(derived.base_url(), client.base_url());
        assert_eq!(derived.timeout(), Duration::from_secs(3));
        assert_eq!(derived.token_store().access_token().as_deref(), Some("a"));
        assert!(client.token_store().access_token().is_none());
    }
}
