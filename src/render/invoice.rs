//! Order-backed documents: the sales invoice and its delivery note.

use crate::db::models::{Currency, Order};
use crate::numbering;
use crate::render::Document;
use crate::render::format::{date_gb, money};
use crate::render::svg::{A4_WIDTH, ACCENT, INK, SHADE_EVEN, Style, SvgPage};

const TABLE_Y: f64 = 384.9;
const ROW_HEIGHT: f64 = 58.7;

/// Columns: description, quantity, unit price, amount.
const COLS: [f64; 4] = [40.0, 330.0, 430.0, A4_WIDTH - 40.0];

fn line_description(order: &Order) -> String {
    order
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("Supply as per purchase order {}", order.po_number))
}

fn unit_price_text(order: &Order) -> String {
    order
        .unit_price()
        .map(|p| format!("{p:.2}"))
        .unwrap_or_else(|| "0.00".to_string())
}

/// `MVR 1,234.5` or `$1,234.5`.
fn total_text(order: &Order) -> String {
    match order.currency {
        Currency::Usd => format!("${}", money(order.total_amount)),
        Currency::Mvr => format!("MVR {}", money(order.total_amount)),
    }
}

fn item_table(page: &mut SvgPage, order: &Order) {
    page.rect(0.0, TABLE_Y - 30.0, A4_WIDTH, 30.0, ACCENT);
    let head = Style::bold(14.0).fill("#fff");
    page.text(COLS[0], TABLE_Y - 10.0, head, "DESCRIPTION");
    page.text(COLS[1], TABLE_Y - 10.0, head.middle(), "QTY (KG)");
    page.text(COLS[2], TABLE_Y - 10.0, head.middle(), "UNIT PRICE");
    page.text(COLS[3], TABLE_Y - 10.0, head.end(), "AMOUNT");

    page.rect(0.0, TABLE_Y, A4_WIDTH, ROW_HEIGHT, SHADE_EVEN);
    let y = TABLE_Y + 34.0;
    page.text(COLS[0], y, Style::plain(11.1), &line_description(order));
    page.text(COLS[1], y, Style::plain(11.1).middle(), &format!("{}", order.weight_kg));
    page.text(COLS[2], y, Style::plain(11.1).middle(), &unit_price_text(order));
    page.text(COLS[3], y, Style::bold(14.0).end(), &money(order.total_amount));
}

fn total_block(page: &mut SvgPage, order: &Order, y: f64) {
    page.line(330.0, y, A4_WIDTH - 40.0, y, INK);
    page.text(330.0, y + 24.0, Style::bold(16.0), "TOTAL");
    page.text(A4_WIDTH - 40.0, y + 24.0, Style::bold(16.0).end().fill(ACCENT), &total_text(order));
}

/// Sales invoice for an order that has been given an invoice number.
pub fn order_invoice(order: &Order, company: &str) -> Document {
    let mut page = SvgPage::a4();
    page.header(company, "INVOICE");

    let invoice_no = numbering::invoice_label(order).unwrap_or_else(|| "PENDING".to_string());
    let invoice_date = order
        .invoice_date
        .or(order.delivery_date)
        .unwrap_or(order.po_date);

    page.text(40.0, 160.0, Style::bold(9.0).fill(ACCENT), "BILL TO");
    page.text(40.0, 178.0, Style::bold(14.0), "Customer");
    page.text(40.0, 196.0, Style::plain(11.1), &format!("Purchase order {}", order.po_number));

    page.field(330.0, 160.0, "INVOICE NO", &invoice_no);
    page.field(460.0, 160.0, "INVOICE DATE", &date_gb(invoice_date));
    page.field(330.0, 210.0, "PO NUMBER", &order.po_number);
    page.field(460.0, 210.0, "DELIVERY NOTE", &numbering::delivery_note_ref(order));
    page.field(
        330.0,
        260.0,
        "DELIVERY DATE",
        &date_gb(numbering::delivery_basis_date(order)),
    );
    page.field(460.0, 260.0, "CURRENCY", &order.currency.to_string());

    item_table(&mut page, order);
    total_block(&mut page, order, TABLE_Y + ROW_HEIGHT + 30.0);

    page.text(40.0, 760.0, Style::plain(9.0), "Thank you for your business.");

    Document::svg(numbering::invoice_file_stem(order), page.finish())
}

/// Delivery note confirming the goods of an order were handed over.
pub fn delivery_note(order: &Order, company: &str) -> Document {
    let mut page = SvgPage::a4();
    page.header(company, "DELIVERY NOTE");

    let dn = numbering::delivery_note_number(
        order.delivery_note_number.unwrap_or(0),
        numbering::delivery_basis_date(order),
    );
    let delivered_on = order.delivery_date.map(date_gb).unwrap_or_default();

    page.field(40.0, 160.0, "DN NUMBER", &dn);
    page.field(200.0, 160.0, "PO NUMBER", &order.po_number);
    page.field(360.0, 160.0, "DELIVERY DATE", &delivered_on);

    item_table(&mut page, order);
    total_block(&mut page, order, TABLE_Y + ROW_HEIGHT + 30.0);

    let sign_y = 700.0;
    page.line(40.0, sign_y, 240.0, sign_y, INK);
    page.line(A4_WIDTH - 240.0, sign_y, A4_WIDTH - 40.0, sign_y, INK);
    page.text(40.0, sign_y + 16.0, Style::plain(9.0), "Delivered by");
    page.text(A4_WIDTH - 240.0, sign_y + 16.0, Style::plain(9.0), "Received by (name, signature, stamp)");

    Document::svg(numbering::delivery_note_file_stem(order), page.finish())
}
