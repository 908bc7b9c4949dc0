use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::Order;

/// Body of `POST /api/orders` and `PUT /api/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderInput {
    pub po_number: String,
    pub po_date: NaiveDate,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub weight_kg: f64,
    /// Per-kg price; the configured default applies when absent.
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// Explicit total overrides `weight_kg * unit_price`.
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    5
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub pending_mvr: f64,
    pub pending_usd: f64,
    pub earned_mvr: f64,
    pub earned_usd: f64,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub orders: Vec<Order>,
}
