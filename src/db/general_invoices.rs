use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use tracing::info;

use crate::db::models::{GeneralInvoice, LineItem};
use crate::db::sqlite::Store;
use crate::error::TradebookError;

const INVOICE_COLUMNS: &str = "id, invoice_number, year, date, customer_name, customer_address, \
     items, total_amount, status, created_at";

/// Validated field set for a general (non-order) invoice.
#[derive(Debug, Clone)]
pub struct GeneralInvoiceDraft {
    pub date: NaiveDate,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub items: Vec<LineItem>,
}

impl GeneralInvoiceDraft {
    pub fn total(&self) -> f64 {
        self.items.iter().map(LineItem::amount).sum()
    }
}

impl Store {
    /// Number the next general invoice of `year` would get.
    pub async fn next_general_invoice_number(&self, year: i32) -> Result<i64, TradebookError> {
        let rec: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(invoice_number), 0) + 1 FROM general_invoices WHERE year = ?",
        )
        .bind(year.to_string())
        .fetch_one(self.pool())
        .await?;
        Ok(rec.0)
    }

    /// Store the invoice under the next number of `year`.
    ///
    /// The number is picked inside the INSERT itself, so SQLite takes the write
    /// lock before reading the year's highest number.
    pub async fn insert_general_invoice(
        &self,
        year: i32,
        draft: &GeneralInvoiceDraft,
    ) -> Result<GeneralInvoice, TradebookError> {
        let year = year.to_string();
        let rec: (i64, i64) = sqlx::query_as(
            r#"
            INSERT INTO general_invoices (
                invoice_number, year, date, customer_name, customer_address,
                items, total_amount, status, created_at
            ) VALUES (
                (SELECT COALESCE(MAX(invoice_number), 0) + 1 FROM general_invoices WHERE year = ?),
                ?, ?, ?, ?, ?, ?, 'Pending', ?
            )
            RETURNING id, invoice_number
            "#,
        )
        .bind(&year)
        .bind(&year)
        .bind(draft.date)
        .bind(&draft.customer_name)
        .bind(&draft.customer_address)
        .bind(Json(&draft.items))
        .bind(draft.total())
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;
        info!(id = rec.0, invoice_number = rec.1, year = %year, "general invoice created");
        self.get_general_invoice(rec.0).await
    }

    pub async fn update_general_invoice(
        &self,
        id: i64,
        draft: &GeneralInvoiceDraft,
    ) -> Result<GeneralInvoice, TradebookError> {
        let res = sqlx::query(
            r#"UPDATE general_invoices SET
                date = ?,
                customer_name = ?,
                customer_address = ?,
                items = ?,
                total_amount = ?
              WHERE id = ?"#,
        )
        .bind(draft.date)
        .bind(&draft.customer_name)
        .bind(&draft.customer_address)
        .bind(Json(&draft.items))
        .bind(draft.total())
        .bind(id)
        .execute(self.pool())
        .await?;
        if res.rows_affected() == 0 {
            return Err(TradebookError::NotFound("general invoice"));
        }
        self.get_general_invoice(id).await
    }

    pub async fn get_general_invoice(&self, id: i64) -> Result<GeneralInvoice, TradebookError> {
        sqlx::query_as::<_, GeneralInvoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM general_invoices WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(TradebookError::NotFound("general invoice"))
    }

    pub async fn list_general_invoices(&self) -> Result<Vec<GeneralInvoice>, TradebookError> {
        let rows = sqlx::query_as::<_, GeneralInvoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM general_invoices ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
