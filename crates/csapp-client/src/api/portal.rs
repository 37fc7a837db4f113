//! Client portal API.
//!
//! Endpoints under `/client/*` are scoped by the backend to the signed-in
//! client; no ids are passed for the caller's own records.

use csapp_types::{
    ClientDashboard, ClientLot, CreateReferralRequest, CreateServiceOrderRequest, Document,
    Invoice, PageQuery, Paginated, Referral, ReferralList, ServiceOrder, ServiceType,
};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Result;
use crate::request::FilePart;

/// Client portal API client.
pub struct PortalApi {
    client: ApiClient,
}

impl PortalApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self) -> Result<ClientDashboard> {
        self.client.get("client/dashboard").await
    }

    pub async fn invoices(&self, query: &PageQuery) -> Result<Paginated<Invoice>> {
        self.client.get_with_query("client/invoices", query).await
    }

    pub async fn invoice(&self, id: &str) -> Result<Invoice> {
        self.client.get(&format!("client/invoices/{}", id)).await
    }

    pub async fn lots(&self) -> Result<Vec<ClientLot>> {
        self.client.get("client/lots").await
    }

    pub async fn service_types(&self) -> Result<Vec<ServiceType>> {
        self.client.get("client/services/types").await
    }

    pub async fn service_orders(&self, query: &PageQuery) -> Result<Paginated<ServiceOrder>> {
        self.client
            .get_with_query("client/services/orders", query)
            .await
    }

    pub async fn request_service(&self, request: &CreateServiceOrderRequest) -> Result<ServiceOrder> {
        self.client.post("client/services/orders", request).await
    }

    pub async fn referrals(&self) -> Result<ReferralList> {
        self.client.get("client/referrals").await
    }

    pub async fn refer(&self, request: &CreateReferralRequest) -> Result<Referral> {
        self.client.post("client/referrals", request).await
    }

    /// Documents attached to the client and their lots.
    pub async fn documents(&self) -> Result<Value> {
        self.client.get("client/documents").await
    }

    pub async fn upload_document(&self, file: FilePart) -> Result<Document> {
        self.client.upload("client/documents", file).await
    }
}
