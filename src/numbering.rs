//! Human-facing document numbers and file names.
//!
//! Counters are plain integers in storage; everything printed on paper or used as
//! a download name carries a two-digit year suffix taken from the document's date.

use chrono::{Datelike, NaiveDate};

use crate::db::models::{GeneralInvoice, Order, Statement};

pub fn year_suffix(date: NaiveDate) -> String {
    format!("{:02}", date.year().rem_euclid(100))
}

/// `0042/26`
pub fn order_invoice_number(number: i64, date: NaiveDate) -> String {
    format!("{number:04}/{}", year_suffix(date))
}

/// `07/26`
pub fn delivery_note_number(number: i64, date: NaiveDate) -> String {
    format!("{number:02}/{}", year_suffix(date))
}

/// `0003/26`
pub fn statement_number(number: i64, issued_on: NaiveDate) -> String {
    format!("{number:04}/{}", year_suffix(issued_on))
}

/// `NT 05 / 26`; `year` is the stored four-digit year string.
pub fn general_invoice_number(number: i64, year: &str) -> String {
    format!("NT {number:02} / {}", short_year(year))
}

fn short_year(year: &str) -> &str {
    year.get(year.len().saturating_sub(2)..).unwrap_or(year)
}

/// Date an order invoice is numbered against: the invoice date, else the PO date.
pub fn invoice_basis_date(order: &Order) -> NaiveDate {
    order.invoice_date.unwrap_or(order.po_date)
}

/// Date a delivery note is numbered against: the delivery date, else the PO date.
pub fn delivery_basis_date(order: &Order) -> NaiveDate {
    order.delivery_date.unwrap_or(order.po_date)
}

pub fn invoice_label(order: &Order) -> Option<String> {
    order
        .invoice_number
        .map(|n| order_invoice_number(n, invoice_basis_date(order)))
}

pub fn delivery_note_label(order: &Order) -> Option<String> {
    order
        .delivery_note_number
        .map(|n| delivery_note_number(n, delivery_basis_date(order)))
}

/// Short DN reference printed on an invoice (`007`, or `000` when none was issued).
pub fn delivery_note_ref(order: &Order) -> String {
    format!("{:03}", order.delivery_note_number.unwrap_or(0))
}

/// Download name of an order invoice; the year always comes from the PO date.
pub fn invoice_file_stem(order: &Order) -> String {
    format!(
        "Invoice-{:04}-{}",
        order.invoice_number.unwrap_or(0),
        year_suffix(order.po_date)
    )
}

pub fn delivery_note_file_stem(order: &Order) -> String {
    match order.delivery_note_number {
        Some(n) => format!("DN-{n}"),
        None => format!("DN-{}", order.po_number),
    }
}

pub fn general_invoice_file_stem(invoice: &GeneralInvoice) -> String {
    format!(
        "Invoice-NT-{:04}-{}",
        invoice.invoice_number,
        short_year(&invoice.year)
    )
}

pub fn statement_label(statement: &Statement) -> String {
    statement_number(statement.statement_number, statement.issued_on)
}

pub fn statement_file_stem(statement: &Statement) -> String {
    format!("Statement-{}", statement_label(statement).replace('/', "-"))
}
