use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::{LineItem, Order, Statement};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PeriodQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct YearQuery {
    #[serde(default)]
    pub year: Option<i32>,
}

/// Body of `POST /api/statements`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Date printed on the statement; business today when absent.
    #[serde(default)]
    pub issued_on: Option<NaiveDate>,
    /// Subset of the period's invoiced orders; all of them when absent.
    #[serde(default)]
    pub order_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementPreview {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub orders: Vec<Order>,
    pub period_total: f64,
    pub previous_outstanding: f64,
    pub last_statement: Option<Statement>,
    pub next_statement_number: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementList {
    pub years: Vec<String>,
    pub statements: Vec<Statement>,
}

/// Body of `POST /api/statements/{id}/email`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementEmailRequest {
    pub to: String,
    /// Rendered PDF from the client; the SVG document is attached when absent.
    #[serde(default)]
    pub pdf_base64: Option<String>,
}

/// Body of `POST`/`PUT` on `/api/general-invoices`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralInvoiceInput {
    pub date: NaiveDate,
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Also remember the customer in the address book.
    #[serde(default = "default_true")]
    pub save_contact: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextNumber {
    pub year: i32,
    pub number: i64,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactLookup {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterUpdate {
    pub value: i64,
}
