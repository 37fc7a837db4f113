//! Admin developments API.

use csapp_types::{Development, DevelopmentRequest};

use crate::client::ApiClient;
use crate::error::Result;

/// Admin developments API client.
pub struct DevelopmentsApi {
    client: ApiClient,
}

impl DevelopmentsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Development>> {
        self.client.get("admin/developments/").await
    }

    pub async fn get(&self, id: &str) -> Result<Development> {
        self.client
            .get(&format!("admin/developments/{}", id))
            .await
    }

    pub async fn create(&self, request: &DevelopmentRequest) -> Result<Development> {
        self.client.post("admin/developments/", request).await
    }

    pub async fn update(&self, id: &str, request: &DevelopmentRequest) -> Result<Development> {
        self.client
            .put(&format!("admin/developments/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("admin/developments/{}", id))
            .await
    }
}
