//! Backend-owned domain records.
//!
//! These types mirror the API's request and response bodies. Monetary values
//! and areas are decimal strings exactly as the backend serializes them;
//! dates are ISO 8601 strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// Paginated list envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
}

/// Common page selection for list endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Companies
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    Active,
    Suspended,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub settings: Option<Value>,
    pub status: CompanyStatus,
    pub created_at: String,
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Clients
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
    Defaulter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub company_id: String,
    pub profile_id: Option<String>,
    pub email: String,
    pub full_name: String,
    pub cpf_cnpj: String,
    pub phone: String,
    pub address: Option<Value>,
    pub documents: Option<Vec<Value>>,
    pub status: ClientStatus,
    pub asaas_customer_id: Option<String>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub email: String,
    pub full_name: String,
    pub cpf_cnpj: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    /// Also create a portal login for the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf_cnpj: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClientStatus>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Developments and lots
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Development {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub documents: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevelopmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Available,
    Reserved,
    Sold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub id: String,
    pub company_id: String,
    pub development_id: String,
    pub lot_number: String,
    pub block: Option<String>,
    pub area_m2: String,
    pub price: String,
    pub status: LotStatus,
    pub documents: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLotRequest {
    pub development_id: String,
    pub lot_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    pub area_m2: f64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLotRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LotStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Value>,
}

/// Installment plan attached to a lot sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_value: Option<f64>,
}

/// Sell a lot to a client (`POST /admin/lots/assign`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignLotRequest {
    pub client_id: String,
    pub lot_id: String,
    pub purchase_date: String,
    pub total_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<PaymentPlan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientLotStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientLot {
    pub id: String,
    pub company_id: String,
    pub client_id: String,
    pub lot_id: String,
    pub purchase_date: String,
    pub total_value: String,
    pub payment_plan: Option<Value>,
    pub status: ClientLotStatus,
    pub created_at: String,
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Invoices
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

/// One installment (boleto) of a lot sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub company_id: String,
    pub client_lot_id: String,
    pub due_date: String,
    pub amount: String,
    pub installment_number: u32,
    pub status: InvoiceStatus,
    pub asaas_payment_id: Option<String>,
    pub barcode: Option<String>,
    pub payment_url: Option<String>,
    pub paid_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Services
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub description: Option<String>,
    pub base_price: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateServiceTypeRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOrderStatus {
    Requested,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: String,
    pub company_id: String,
    pub client_id: String,
    pub lot_id: Option<String>,
    pub service_type_id: String,
    pub requested_date: String,
    pub execution_date: Option<String>,
    pub status: ServiceOrderStatus,
    pub cost: String,
    pub revenue: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceOrderRequest {
    pub service_type_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `PATCH /admin/services/orders/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateServiceOrderStatus {
    pub status: ServiceOrderStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Referrals
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    Pending,
    Contacted,
    Converted,
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    pub company_id: String,
    pub referrer_client_id: String,
    pub referred_name: String,
    pub referred_phone: String,
    pub referred_email: Option<String>,
    pub status: ReferralStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Envelope of `GET /client/referrals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralList {
    pub referrals: Vec<Referral>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReferralRequest {
    pub referred_name: String,
    pub referred_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_email: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboards and reports
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_clients: u64,
    pub active_clients: u64,
    pub defaulter_clients: u64,
    pub open_service_orders: u64,
    pub completed_service_orders: u64,
    pub total_lots: u64,
    pub available_lots: u64,
    pub sold_lots: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialOverview {
    pub total_receivable: String,
    pub total_received: String,
    pub total_overdue: String,
    pub overdue_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub month: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaulter {
    pub client_id: String,
    pub client_name: String,
    pub overdue_months: u32,
    pub overdue_amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingInvoice {
    pub id: String,
    pub installment_number: u32,
    pub due_date: String,
    pub amount: String,
    pub status: String,
}

/// Summary shown on the client portal home.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientDashboard {
    pub lots_count: u64,
    pub pending_invoices: u64,
    pub overdue_invoices: u64,
    pub active_services: u64,
    #[serde(default)]
    pub next_invoices: Vec<UpcomingInvoice>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Documents
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub url: String,
    pub content_type: String,
    pub size: u64,
    pub uploaded_by: String,
    pub client_id: String,
    pub created_at: String,
}
