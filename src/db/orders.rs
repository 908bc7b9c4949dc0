use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};
use tracing::info;

use crate::db::models::{Counter, Currency, Order, PaymentStatus};
use crate::db::sqlite::{Store, claim_counter};
use crate::error::TradebookError;

const ORDER_COLUMNS: &str = "id, po_number, po_date, delivery_date, currency, total_amount, \
     weight_kg, description, payment_status, delivery_status, delivery_note_number, \
     invoice_number, invoice_date, created_at";

/// Validated field set for creating or editing an order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub po_number: String,
    pub po_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub currency: Currency,
    pub total_amount: f64,
    pub weight_kg: f64,
    pub description: Option<String>,
}

/// Year / month window on `po_date`. A month without a year is ignored.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PeriodFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl PeriodFilter {
    pub fn bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, TradebookError> {
        let Some(year) = self.year else {
            return Ok(None);
        };
        let invalid = || TradebookError::validation("invalid year/month filter");
        let bounds = match self.month {
            Some(month) => {
                let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                }
                .ok_or_else(invalid)?;
                (start, next.pred_opt().ok_or_else(invalid)?)
            }
            None => (
                NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?,
                NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?,
            ),
        };
        Ok(Some(bounds))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceTab {
    /// Delivered but not yet invoiced.
    #[default]
    Pending,
    /// Already invoiced.
    History,
}

impl Store {
    pub async fn insert_order(&self, draft: &OrderDraft) -> Result<Order, TradebookError> {
        let rec: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO orders (
                po_number, po_date, delivery_date, currency, total_amount,
                weight_kg, description, payment_status, delivery_status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 'Unpaid', 'Pending', ?)
            RETURNING id
            "#,
        )
        .bind(&draft.po_number)
        .bind(draft.po_date)
        .bind(draft.delivery_date)
        .bind(draft.currency)
        .bind(draft.total_amount)
        .bind(draft.weight_kg)
        .bind(&draft.description)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;
        info!(id = rec.0, po_number = %draft.po_number, "order recorded");
        self.get_order(rec.0).await
    }

    /// Edits the commercial fields only; statuses and issued numbers stay put.
    pub async fn update_order(&self, id: i64, draft: &OrderDraft) -> Result<Order, TradebookError> {
        let res = sqlx::query(
            r#"UPDATE orders SET
                po_number = ?,
                po_date = ?,
                delivery_date = ?,
                currency = ?,
                total_amount = ?,
                weight_kg = ?,
                description = ?
              WHERE id = ?"#,
        )
        .bind(&draft.po_number)
        .bind(draft.po_date)
        .bind(draft.delivery_date)
        .bind(draft.currency)
        .bind(draft.total_amount)
        .bind(draft.weight_kg)
        .bind(&draft.description)
        .bind(id)
        .execute(self.pool())
        .await?;
        if res.rows_affected() == 0 {
            return Err(TradebookError::NotFound("order"));
        }
        self.get_order(id).await
    }

    pub async fn delete_order(&self, id: i64) -> Result<(), TradebookError> {
        let res = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if res.rows_affected() == 0 {
            return Err(TradebookError::NotFound("order"));
        }
        info!(id, "order deleted");
        Ok(())
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, TradebookError> {
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(TradebookError::NotFound("order"))
    }

    pub async fn recent_orders(&self, limit: i64) -> Result<Vec<Order>, TradebookError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Distinct `po_date` years, newest first.
    pub async fn order_years(&self) -> Result<Vec<String>, TradebookError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT strftime('%Y', po_date) AS y FROM orders \
             WHERE po_date IS NOT NULL ORDER BY y DESC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    pub async fn dashboard_orders(&self, filter: PeriodFilter) -> Result<Vec<Order>, TradebookError> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1 = 1"));
        push_po_date_window(&mut qb, filter.bounds()?);
        qb.push(" ORDER BY po_date DESC, invoice_number DESC, id DESC");
        let rows = qb.build_query_as::<Order>().fetch_all(self.pool()).await?;
        Ok(rows)
    }

    pub async fn invoice_tab_orders(
        &self,
        tab: InvoiceTab,
        year: Option<i32>,
    ) -> Result<Vec<Order>, TradebookError> {
        let filter = PeriodFilter { year, month: None };
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1 = 1"));
        push_po_date_window(&mut qb, filter.bounds()?);
        match tab {
            InvoiceTab::Pending => qb.push(
                " AND delivery_status = 'Delivered' AND invoice_number IS NULL \
                 ORDER BY delivery_date ASC, id ASC",
            ),
            InvoiceTab::History => {
                qb.push(" AND invoice_number IS NOT NULL ORDER BY po_date DESC, invoice_number DESC")
            }
        };
        let rows = qb.build_query_as::<Order>().fetch_all(self.pool()).await?;
        Ok(rows)
    }

    pub async fn orders_for_delivery_date(&self, date: NaiveDate) -> Result<Vec<Order>, TradebookError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE delivery_date = ? ORDER BY po_number ASC"
        ))
        .bind(date)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Invoiced orders with `po_date` in `[start, end]`, oldest first.
    pub async fn invoiced_orders_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Order>, TradebookError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE po_date >= ? AND po_date <= ? AND invoice_number IS NOT NULL \
             ORDER BY po_date ASC, id ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Unpaid invoiced value dated before `start`.
    pub async fn outstanding_before(&self, start: NaiveDate) -> Result<f64, TradebookError> {
        let rec: (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_amount), 0.0) FROM orders \
             WHERE po_date < ? AND payment_status != 'Paid' AND invoice_number IS NOT NULL",
        )
        .bind(start)
        .fetch_one(self.pool())
        .await?;
        Ok(rec.0)
    }

    pub async fn orders_by_ids(&self, ids: &[i64]) -> Result<Vec<Order>, TradebookError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id IN ("));
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
        qb.push(") ORDER BY po_date ASC, id ASC");
        let rows = qb.build_query_as::<Order>().fetch_all(self.pool()).await?;
        Ok(rows)
    }

    pub async fn set_payment_status(
        &self,
        id: i64,
        status: PaymentStatus,
    ) -> Result<Order, TradebookError> {
        sqlx::query("UPDATE orders SET payment_status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(self.pool())
            .await?;
        info!(id, status = ?status, "payment status changed");
        self.get_order(id).await
    }

    /// Flag the order delivered on `today` and give it the next delivery note number.
    /// Already delivered orders are returned unchanged.
    pub async fn mark_delivered(&self, id: i64, today: NaiveDate) -> Result<Order, TradebookError> {
        let mut tx = self.pool().begin().await?;
        let res = sqlx::query(
            "UPDATE orders SET delivery_status = 'Delivered', delivery_date = ? \
             WHERE id = ? AND delivery_status != 'Delivered'",
        )
        .bind(today)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() == 0 {
            tx.rollback().await?;
            return self.get_order(id).await;
        }
        let dn = claim_counter(&mut *tx, Counter::DeliveryNote).await?;
        sqlx::query("UPDATE orders SET delivery_note_number = ? WHERE id = ?")
            .bind(dn)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!(id, delivery_note = dn, "order delivered");
        self.get_order(id).await
    }

    /// Issue the next invoice number, dated on the delivery (or PO) date.
    pub async fn assign_invoice_number(&self, id: i64) -> Result<Order, TradebookError> {
        let mut tx = self.pool().begin().await?;
        let res = sqlx::query(
            "UPDATE orders SET invoice_date = COALESCE(delivery_date, po_date) \
             WHERE id = ? AND invoice_number IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() == 0 {
            tx.rollback().await?;
            let order = self.get_order(id).await?;
            return Err(TradebookError::Conflict(format!(
                "order {} already carries invoice #{}",
                order.po_number,
                order.invoice_number.unwrap_or_default()
            )));
        }
        let number = claim_counter(&mut *tx, Counter::InvoiceNumber).await?;
        sqlx::query("UPDATE orders SET invoice_number = ? WHERE id = ?")
            .bind(number)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!(id, invoice_number = number, "invoice issued");
        self.get_order(id).await
    }
}

fn push_po_date_window(qb: &mut QueryBuilder<'_, Sqlite>, bounds: Option<(NaiveDate, NaiveDate)>) {
    if let Some((start, end)) = bounds {
        qb.push(" AND po_date >= ");
        qb.push_bind(start);
        qb.push(" AND po_date <= ");
        qb.push_bind(end);
    }
}
