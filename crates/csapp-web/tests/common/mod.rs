//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use csapp_client::ApiClient;
use csapp_web::{Server, ServerConfig};
use reqwest::{Client, Response, redirect};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use wiremock::MockServer;

/// A gateway running in the background against a mock backend.
pub struct TestServer {
    /// The gateway's address.
    pub addr: SocketAddr,
    /// HTTP client that never follows redirects.
    pub client: Client,
    /// Mock backend API.
    pub backend: MockServer,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a gateway in front of a fresh mock backend.
    pub async fn start() -> Result<Self> {
        let backend = MockServer::start().await;
        let addr = find_available_port().await?;

        let api = ApiClient::builder()
            .base_url(format!("{}/api/v1", backend.uri()))
            .timeout(Duration::from_secs(5))
            .build()?;
        let config = ServerConfig::new().with_bind_address(addr);

        let server = Server::new(api, config);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            backend,
            _handle: handle,
        })
    }

    /// Get the base URL for the gateway.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// GET with an optional `Cookie` header.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<Response> {
        let mut request = self.client.get(format!("{}{}", self.base_url(), path));
        if let Some(cookie) = cookie {
            request = request.header("cookie", cookie);
        }
        Ok(request.send().await?)
    }

    /// POST a JSON body with an optional `Cookie` header.
    pub async fn post(&self, path: &str, body: &Value, cookie: Option<&str>) -> Result<Response> {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body);
        if let Some(cookie) = cookie {
            request = request.header("cookie", cookie);
        }
        Ok(request.send().await?)
    }
}

/// `Location` header of a redirect.
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Every `Set-Cookie` header on a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub fn me_json(role: &str) -> Value {
    json!({
        "id": "u-1",
        "company_id": "c-1",
        "role": role,
        "full_name": "Ana Souza",
        "email": "ana@example.com"
    })
}

pub fn tokens_json(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer"
    })
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
