//! Admin lots API.

use csapp_types::{AssignLotRequest, ClientLot, CreateLotRequest, Lot, PageQuery, UpdateLotRequest};

use crate::client::ApiClient;
use crate::error::Result;

/// Admin lots API client.
pub struct LotsApi {
    client: ApiClient,
}

impl LotsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PageQuery) -> Result<Vec<Lot>> {
        self.client.get_with_query("admin/lots/", query).await
    }

    pub async fn get(&self, id: &str) -> Result<Lot> {
        self.client.get(&format!("admin/lots/{}", id)).await
    }

    pub async fn create(&self, request: &CreateLotRequest) -> Result<Lot> {
        self.client.post("admin/lots/", request).await
    }

    pub async fn update(&self, id: &str, request: &UpdateLotRequest) -> Result<Lot> {
        self.client.put(&format!("admin/lots/{}", id), request).await
    }

    /// Sell a lot to a client, creating its installment plan.
    pub async fn assign(&self, request: &AssignLotRequest) -> Result<ClientLot> {
        self.client.post("admin/lots/assign", request).await
    }
}
