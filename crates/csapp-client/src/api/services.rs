//! Admin services API.

use csapp_types::{
    CreateServiceTypeRequest, PageQuery, Paginated, ServiceOrder, ServiceOrderStatus, ServiceType,
    UpdateServiceOrderStatus,
};

use crate::client::ApiClient;
use crate::error::Result;

/// Admin services API client.
pub struct ServicesApi {
    client: ApiClient,
}

impl ServicesApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_types(&self) -> Result<Vec<ServiceType>> {
        self.client.get("admin/services/types").await
    }

    pub async fn create_type(&self, request: &CreateServiceTypeRequest) -> Result<ServiceType> {
        self.client.post("admin/services/types", request).await
    }

    pub async fn list_orders(&self, query: &PageQuery) -> Result<Paginated<ServiceOrder>> {
        self.client
            .get_with_query("admin/services/orders", query)
            .await
    }

    /// Move a service order to a new status.
    pub async fn update_order_status(
        &self,
        id: &str,
        status: ServiceOrderStatus,
    ) -> Result<ServiceOrder> {
        self.client
            .patch(
                &format!("admin/services/orders/{}/status", id),
                &UpdateServiceOrderStatus { status },
            )
            .await
    }
}
