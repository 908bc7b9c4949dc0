use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::TradebookError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Currency {
    Mvr,
    Usd,
}

impl FromStr for Currency {
    type Err = TradebookError;

    /// Accepts loose input (`" usd"`); an empty string means the home currency.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "MVR" => Ok(Currency::Mvr),
            "USD" => Ok(Currency::Usd),
            other => Err(TradebookError::validation(format!(
                "unsupported currency `{other}`"
            ))),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Mvr => f.write_str("MVR"),
            Currency::Usd => f.write_str("USD"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn toggled(self) -> Self {
        match self {
            PaymentStatus::Paid => PaymentStatus::Unpaid,
            PaymentStatus::Unpaid => PaymentStatus::Paid,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
pub enum DeliveryStatus {
    Pending,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Order {
    pub id: i64,
    pub po_number: String,
    pub po_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub currency: Currency,
    pub total_amount: f64,
    pub weight_kg: f64,
    pub description: Option<String>,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub delivery_note_number: Option<i64>,
    pub invoice_number: Option<i64>,
    pub invoice_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_delivered(&self) -> bool {
        self.delivery_status == DeliveryStatus::Delivered
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Price per kg implied by the stored total; `None` when no weight was recorded.
    pub fn unit_price(&self) -> Option<f64> {
        (self.weight_kg > 0.0).then(|| self.total_amount / self.weight_kg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub description: String,
    #[serde(default)]
    pub sub_description: Option<String>,
    pub quantity: f64,
    pub price: f64,
}

impl LineItem {
    pub fn amount(&self) -> f64 {
        self.quantity * self.price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct GeneralInvoice {
    pub id: i64,
    pub invoice_number: i64,
    pub year: String,
    pub date: NaiveDate,
    pub customer_name: String,
    pub customer_address: Option<String>,
    #[sqlx(json)]
    pub items: Vec<LineItem>,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Statement {
    pub id: i64,
    pub statement_number: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub issued_on: NaiveDate,
    pub total_amount: f64,
    pub previous_balance: f64,
    pub previous_statement_number: Option<String>,
    #[sqlx(json)]
    pub order_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct EmailLog {
    pub id: i64,
    pub recipient: String,
    pub subject: String,
    pub attachment_name: Option<String>,
    #[sqlx(json)]
    pub attachments: Vec<String>,
    pub document_type: Option<String>,
    pub document_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for `email_logs`.
#[derive(Debug, Clone, Default)]
pub struct NewEmailLog {
    pub recipient: String,
    pub subject: String,
    pub attachment_name: Option<String>,
    pub attachments: Vec<String>,
    pub document_type: Option<String>,
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct EmailGroup {
    pub id: i64,
    pub name: String,
    #[sqlx(json)]
    #[serde(rename = "to")]
    pub to_list: Vec<String>,
    #[sqlx(json)]
    #[serde(rename = "cc")]
    pub cc_list: Vec<String>,
    #[sqlx(json)]
    #[serde(rename = "bcc")]
    pub bcc_list: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Singleton counters kept in `settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Counter {
    #[serde(rename = "next_invoice_number")]
    InvoiceNumber,
    #[serde(rename = "next_delivery_note")]
    DeliveryNote,
    #[serde(rename = "next_statement_number")]
    StatementNumber,
}

impl Counter {
    pub const ALL: [Counter; 3] = [
        Counter::InvoiceNumber,
        Counter::DeliveryNote,
        Counter::StatementNumber,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Counter::InvoiceNumber => "next_invoice_number",
            Counter::DeliveryNote => "next_delivery_note",
            Counter::StatementNumber => "next_statement_number",
        }
    }
}

impl FromStr for Counter {
    type Err = TradebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Counter::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| TradebookError::validation(format!("unknown counter `{s}`")))
    }
}
