//! Order workflow: intake, delivery, invoicing and payment.

use tracing::info;

use crate::config::CompanyConfig;
use crate::db::Store;
use crate::db::models::{Currency, Order};
use crate::db::orders::{OrderDraft, PeriodFilter};
use crate::error::TradebookError;
use crate::service::digest::business_today;
use crate::types::orders::{DashboardStats, DashboardView, OrderInput};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normalise raw input into a storable draft.
pub fn draft_from_input(input: OrderInput, company: &CompanyConfig) -> Result<OrderDraft, TradebookError> {
    let po_number = input.po_number.trim().to_string();
    if po_number.is_empty() {
        return Err(TradebookError::validation("po_number is required"));
    }
    if input.weight_kg < 0.0 {
        return Err(TradebookError::validation("weight_kg cannot be negative"));
    }
    let currency: Currency = input.currency.as_deref().unwrap_or_default().parse()?;
    let unit_price = input.unit_price.unwrap_or(company.default_unit_price);
    let total_amount = match input.total_amount {
        Some(total) => total,
        None => round2(input.weight_kg * unit_price),
    };
    Ok(OrderDraft {
        po_number,
        po_date: input.po_date,
        delivery_date: input.delivery_date.unwrap_or(input.po_date),
        currency,
        total_amount,
        weight_kg: input.weight_kg,
        description: input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    })
}

/// Weight shown on the dashboard; USD orders carry no reliable weight so it is
/// estimated from the amount.
pub fn effective_weight(order: &Order, company: &CompanyConfig) -> f64 {
    match order.currency {
        Currency::Usd if company.usd_per_kg > 0.0 => order.total_amount / company.usd_per_kg,
        Currency::Usd => 0.0,
        Currency::Mvr => order.weight_kg,
    }
}

pub fn dashboard_stats(orders: &[Order], company: &CompanyConfig) -> DashboardStats {
    orders.iter().fold(DashboardStats::default(), |mut acc, order| {
        acc.weight_kg += effective_weight(order, company);
        let bucket = match (order.is_paid(), order.currency) {
            (true, Currency::Mvr) => &mut acc.earned_mvr,
            (true, Currency::Usd) => &mut acc.earned_usd,
            (false, Currency::Mvr) => &mut acc.pending_mvr,
            (false, Currency::Usd) => &mut acc.pending_usd,
        };
        *bucket += order.total_amount;
        acc
    })
}

pub async fn dashboard(
    store: &Store,
    filter: PeriodFilter,
    company: &CompanyConfig,
) -> Result<DashboardView, TradebookError> {
    let orders = store.dashboard_orders(filter).await?;
    let stats = dashboard_stats(&orders, company);
    Ok(DashboardView { stats, orders })
}

pub async fn deliver(store: &Store, id: i64, utc_offset_hours: i32) -> Result<Order, TradebookError> {
    store.mark_delivered(id, business_today(utc_offset_hours)).await
}

pub async fn toggle_payment(store: &Store, id: i64) -> Result<Order, TradebookError> {
    let order = store.get_order(id).await?;
    if order.invoice_number.is_none() {
        return Err(TradebookError::validation("Generate an invoice first!"));
    }
    store.set_payment_status(id, order.payment_status.toggled()).await
}

/// Removing an order can free the highest issued numbers, so counters are re-derived.
pub async fn remove(store: &Store, id: i64) -> Result<(), TradebookError> {
    store.delete_order(id).await?;
    store.sync_counters().await?;
    info!(id, "order removed and counters re-synchronised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::db::models::{DeliveryStatus, PaymentStatus};

    fn input() -> OrderInput {
        OrderInput {
            po_number: " PO-7 ".into(),
            po_date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
            delivery_date: None,
            currency: Some(" usd".into()),
            weight_kg: 10.0,
            unit_price: None,
            total_amount: None,
            description: Some("  ".into()),
        }
    }

    fn order(currency: Currency, amount: f64, weight: f64, paid: bool) -> Order {
        Order {
            id: 1,
            po_number: "PO".into(),
            po_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            delivery_date: None,
            currency,
            total_amount: amount,
            weight_kg: weight,
            description: None,
            payment_status: if paid { PaymentStatus::Paid } else { PaymentStatus::Unpaid },
            delivery_status: DeliveryStatus::Pending,
            delivery_note_number: None,
            invoice_number: None,
            invoice_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn draft_applies_defaults() {
        let draft = draft_from_input(input(), &CompanyConfig::default()).unwrap();
        assert_eq!(draft.po_number, "PO-7");
        assert_eq!(draft.currency, Currency::Usd);
        assert_eq!(draft.delivery_date, draft.po_date);
        assert_eq!(draft.total_amount, 1696.2);
        assert_eq!(draft.description, None);
    }

    #[test]
    fn explicit_total_wins() {
        let mut raw = input();
        raw.total_amount = Some(50.0);
        let draft = draft_from_input(raw, &CompanyConfig::default()).unwrap();
        assert_eq!(draft.total_amount, 50.0);
    }

    #[test]
    fn stats_split_by_currency_and_payment() {
        let orders = vec![
            order(Currency::Mvr, 100.0, 4.0, true),
            order(Currency::Mvr, 50.0, 2.0, false),
            order(Currency::Usd, 110.0, 0.0, false),
        ];
        let stats = dashboard_stats(&orders, &CompanyConfig::default());
        assert_eq!(stats.earned_mvr, 100.0);
        assert_eq!(stats.pending_mvr, 50.0);
        assert_eq!(stats.pending_usd, 110.0);
        assert_eq!(stats.earned_usd, 0.0);
        assert!((stats.weight_kg - 16.0).abs() < 1e-9);
    }
}
