//! Admin dashboard API.

use csapp_types::{AdminStats, FinancialOverview, RecentActivity, RevenuePoint};
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::Result;

/// Query parameters for the revenue chart.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RevenueQuery {
    pub months: u32,
}

impl Default for RevenueQuery {
    fn default() -> Self {
        Self { months: 12 }
    }
}

/// Query parameters for the activity feed.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActivityQuery {
    pub limit: u32,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Admin dashboard API client.
pub struct DashboardApi {
    client: ApiClient,
}

impl DashboardApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<AdminStats> {
        self.client.get("admin/dashboard/stats").await
    }

    pub async fn financial_overview(&self) -> Result<FinancialOverview> {
        self.client.get("admin/dashboard/financial-overview").await
    }

    pub async fn revenue_chart(&self, query: RevenueQuery) -> Result<Vec<RevenuePoint>> {
        self.client
            .get_with_query("admin/dashboard/charts/revenue", &query)
            .await
    }

    pub async fn recent_activities(&self, query: ActivityQuery) -> Result<Vec<RecentActivity>> {
        self.client
            .get_with_query("admin/dashboard/recent-activities", &query)
            .await
    }
}
