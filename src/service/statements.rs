//! Statement preview, issue and ledger building.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Store;
use crate::db::models::{Counter, Order, Statement};
use crate::db::statements::StatementDraft;
use crate::error::TradebookError;
use crate::numbering;
use crate::service::digest::business_today;
use crate::types::billing::{StatementPreview, StatementRequest};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedgerRow {
    pub date: Option<NaiveDate>,
    pub reference: String,
    pub description: String,
    pub amount: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatementLedger {
    pub rows: Vec<LedgerRow>,
    pub total_due: f64,
}

fn opening_description(statement: &Statement) -> String {
    match statement.previous_statement_number.as_deref() {
        Some(prev) => {
            let number = match prev.trim().parse::<i64>() {
                Ok(n) => format!("{n:04}"),
                Err(_) => prev.trim().to_string(),
            };
            format!(
                "Outstanding From Previous Statement {number}/{}",
                numbering::year_suffix(statement.start_date)
            )
        }
        None => "Opening Balance Brought Forward".to_string(),
    }
}

/// Running balance over the carried-forward amount and the statement's orders.
pub fn ledger(statement: &Statement, orders: &[Order]) -> StatementLedger {
    let mut rows = Vec::with_capacity(orders.len() + 1);
    let mut balance = 0.0;

    if statement.previous_balance > 0.0 {
        balance += statement.previous_balance;
        rows.push(LedgerRow {
            date: None,
            reference: String::new(),
            description: opening_description(statement),
            amount: statement.previous_balance,
            balance,
        });
    }

    for order in orders {
        balance += order.total_amount;
        let reference = order
            .invoice_number
            .map(|n| numbering::order_invoice_number(n, order.po_date))
            .unwrap_or_else(|| "PENDING".to_string());
        rows.push(LedgerRow {
            date: Some(order.po_date),
            reference,
            description: format!("PO: {}", order.po_number),
            amount: order.total_amount,
            balance,
        });
    }

    StatementLedger {
        rows,
        total_due: balance,
    }
}

pub async fn load_ledger(store: &Store, statement: &Statement) -> Result<StatementLedger, TradebookError> {
    let orders = store.orders_by_ids(&statement.order_ids).await?;
    Ok(ledger(statement, &orders))
}

fn check_period(start: NaiveDate, end: NaiveDate) -> Result<(), TradebookError> {
    if end < start {
        return Err(TradebookError::validation("end date is before start date"));
    }
    Ok(())
}

pub async fn preview(store: &Store, start: NaiveDate, end: NaiveDate) -> Result<StatementPreview, TradebookError> {
    check_period(start, end)?;
    let (orders, previous_outstanding, last_statement, next_statement_number) = futures::try_join!(
        store.invoiced_orders_between(start, end),
        store.outstanding_before(start),
        store.statement_before(start),
        store.peek_counter(Counter::StatementNumber),
    )?;
    Ok(StatementPreview {
        start_date: start,
        end_date: end,
        period_total: orders.iter().map(|o| o.total_amount).sum(),
        orders,
        previous_outstanding,
        last_statement,
        next_statement_number,
    })
}

/// Issue a statement for the selected invoiced orders of the period.
pub async fn generate(
    store: &Store,
    req: StatementRequest,
    utc_offset_hours: i32,
) -> Result<Statement, TradebookError> {
    let preview = preview(store, req.start_date, req.end_date).await?;

    let selected: Vec<&Order> = match req.order_ids.as_ref() {
        None => preview.orders.iter().collect(),
        Some(ids) => {
            let wanted: HashSet<i64> = ids.iter().copied().collect();
            let candidates: HashSet<i64> = preview.orders.iter().map(|o| o.id).collect();
            if let Some(stray) = wanted.iter().find(|id| !candidates.contains(*id)) {
                return Err(TradebookError::validation(format!(
                    "order {stray} is not an invoiced order of this period"
                )));
            }
            preview.orders.iter().filter(|o| wanted.contains(&o.id)).collect()
        }
    };

    let selected_total: f64 = selected.iter().map(|o| o.total_amount).sum();
    let draft = StatementDraft {
        start_date: req.start_date,
        end_date: req.end_date,
        issued_on: req.issued_on.unwrap_or_else(|| business_today(utc_offset_hours)),
        total_amount: selected_total + preview.previous_outstanding,
        previous_balance: preview.previous_outstanding,
        previous_statement_number: preview
            .last_statement
            .as_ref()
            .map(|s| s.statement_number.to_string()),
        order_ids: selected.iter().map(|o| o.id).collect(),
    };
    store.insert_statement(&draft).await
}
