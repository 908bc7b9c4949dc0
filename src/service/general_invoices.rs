use chrono::Datelike;

use crate::db::Store;
use crate::db::general_invoices::GeneralInvoiceDraft;
use crate::db::models::{GeneralInvoice, LineItem};
use crate::error::TradebookError;
use crate::numbering;
use crate::service::digest::business_today;
use crate::types::billing::{GeneralInvoiceInput, NextNumber};

fn draft_from_input(input: &GeneralInvoiceInput) -> Result<GeneralInvoiceDraft, TradebookError> {
    let customer_name = input.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(TradebookError::validation("customer_name is required"));
    }
    let items: Vec<LineItem> = input
        .items
        .iter()
        .filter(|i| !i.description.trim().is_empty())
        .cloned()
        .collect();
    if items.is_empty() {
        return Err(TradebookError::validation("at least one line item is required"));
    }
    if items.iter().any(|i| i.quantity < 0.0 || i.price < 0.0) {
        return Err(TradebookError::validation("quantity and price cannot be negative"));
    }
    Ok(GeneralInvoiceDraft {
        date: input.date,
        customer_name,
        customer_address: input
            .customer_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        items,
    })
}

async fn remember_customer(store: &Store, draft: &GeneralInvoiceDraft) -> Result<(), TradebookError> {
    store
        .upsert_contact(&draft.customer_name, draft.customer_address.as_deref(), None)
        .await?;
    Ok(())
}

/// Invoices are numbered within the business calendar year.
fn numbering_year(utc_offset_hours: i32) -> i32 {
    business_today(utc_offset_hours).year()
}

pub async fn next_number(store: &Store, utc_offset_hours: i32) -> Result<NextNumber, TradebookError> {
    let year = numbering_year(utc_offset_hours);
    let number = store.next_general_invoice_number(year).await?;
    Ok(NextNumber {
        year,
        number,
        label: numbering::general_invoice_number(number, &year.to_string()),
    })
}

pub async fn create(
    store: &Store,
    input: GeneralInvoiceInput,
    utc_offset_hours: i32,
) -> Result<GeneralInvoice, TradebookError> {
    let draft = draft_from_input(&input)?;
    let invoice = store
        .insert_general_invoice(numbering_year(utc_offset_hours), &draft)
        .await?;
    if input.save_contact {
        remember_customer(store, &draft).await?;
    }
    Ok(invoice)
}

pub async fn update(
    store: &Store,
    id: i64,
    input: GeneralInvoiceInput,
) -> Result<GeneralInvoice, TradebookError> {
    let draft = draft_from_input(&input)?;
    let invoice = store.update_general_invoice(id, &draft).await?;
    if input.save_contact {
        remember_customer(store, &draft).await?;
    }
    Ok(invoice)
}
