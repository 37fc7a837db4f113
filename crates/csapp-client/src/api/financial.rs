//! Admin financial API.
//!
//! Summary and receivables reports are returned as raw JSON; their layout is
//! owned by the backend's reporting module.

use csapp_types::{Defaulter, PageQuery};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Result;

/// Admin financial API client.
pub struct FinancialApi {
    client: ApiClient,
}

impl FinancialApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn summary(&self) -> Result<Value> {
        self.client.get("admin/financial/summary").await
    }

    pub async fn receivables(&self, query: &PageQuery) -> Result<Value> {
        self.client
            .get_with_query("admin/financial/receivables", query)
            .await
    }

    /// Clients with overdue installments.
    pub async fn defaulters(&self) -> Result<Vec<Defaulter>> {
        self.client.get("admin/financial/defaulters").await
    }
}
