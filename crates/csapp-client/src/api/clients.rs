//! Admin clients API.

use csapp_types::{
    Client, ClientLot, CreateClientRequest, Document, Invoice, PageQuery, Paginated,
    UpdateClientRequest,
};

use crate::client::ApiClient;
use crate::error::Result;
use crate::request::FilePart;

/// Admin clients API client.
pub struct ClientsApi {
    client: ApiClient,
}

impl ClientsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List clients, optionally filtered by status or search term.
    pub async fn list(&self, query: &PageQuery) -> Result<Paginated<Client>> {
        self.client.get_with_query("admin/clients/", query).await
    }

    pub async fn get(&self, id: &str) -> Result<Client> {
        self.client.get(&format!("admin/clients/{}", id)).await
    }

    pub async fn create(&self, request: &CreateClientRequest) -> Result<Client> {
        self.client.post("admin/clients/", request).await
    }

    pub async fn update(&self, id: &str, request: &UpdateClientRequest) -> Result<Client> {
        self.client
            .put(&format!("admin/clients/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("admin/clients/{}", id)).await
    }

    /// Installments billed to a client.
    pub async fn invoices(&self, id: &str) -> Result<Vec<Invoice>> {
        self.client
            .get(&format!("admin/clients/{}/invoices", id))
            .await
    }

    /// Lots purchased by a client.
    pub async fn lots(&self, id: &str) -> Result<Vec<ClientLot>> {
        self.client.get(&format!("admin/clients/{}/lots", id)).await
    }

    /// Attach a document to a client's file.
    pub async fn upload_document(&self, id: &str, file: FilePart) -> Result<Document> {
        self.client
            .upload(&format!("admin/clients/{}/documents", id), file)
            .await
    }
}
