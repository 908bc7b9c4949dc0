use crate::db::models::GeneralInvoice;
use crate::numbering;
use crate::render::Document;
use crate::render::format::{date_gb_short, money, money2};
use crate::render::svg::{A4_HEIGHT, A4_WIDTH, ACCENT, INK, SHADE_EVEN, SHADE_ODD, Style, SvgPage};

const TABLE_Y: f64 = 384.9;
const ROW_HEIGHT: f64 = 35.0;
const TEXT_OFFSET_Y: f64 = 20.0;
const MIN_FOOTER_Y: f64 = 590.0;
const FOOTER_GAP: f64 = 40.0;
const FOOTER_HEIGHT: f64 = 250.0;

/// Where the footer starts and how tall the page must be for `rows` line items.
/// The page only grows past A4 when the table pushes the footer down.
pub fn layout(rows: usize) -> (f64, f64) {
    let table_end = TABLE_Y + rows as f64 * ROW_HEIGHT;
    let footer_y = MIN_FOOTER_Y.max(table_end + FOOTER_GAP);
    let height = A4_HEIGHT.max(footer_y + FOOTER_HEIGHT);
    (footer_y, height)
}

pub fn general_invoice(invoice: &GeneralInvoice, company: &str) -> Document {
    let (footer_y, height) = layout(invoice.items.len());
    let mut page = SvgPage::new(height);
    page.header(company, "INVOICE");

    page.text(40.0, 160.0, Style::bold(9.0).fill(ACCENT), "BILL TO");
    page.text(40.0, 178.0, Style::bold(14.0), &invoice.customer_name);
    if let Some(address) = invoice.customer_address.as_deref() {
        for (i, line) in address.lines().take(4).enumerate() {
            page.text(40.0, 196.0 + i as f64 * 14.0, Style::plain(11.1), line);
        }
    }

    page.field(
        360.0,
        160.0,
        "INVOICE NO",
        &numbering::general_invoice_number(invoice.invoice_number, &invoice.year),
    );
    page.field(480.0, 160.0, "DATE", &date_gb_short(invoice.date));

    let head = Style::bold(14.0).fill("#fff");
    page.rect(0.0, TABLE_Y - 30.0, A4_WIDTH, 30.0, ACCENT);
    page.text(40.0, TABLE_Y - 10.0, head, "DESCRIPTION");
    page.text(360.0, TABLE_Y - 10.0, head.middle(), "QTY");
    page.text(450.0, TABLE_Y - 10.0, head.middle(), "PRICE");
    page.text(A4_WIDTH - 40.0, TABLE_Y - 10.0, head.end(), "AMOUNT");

    for (i, item) in invoice.items.iter().enumerate() {
        let y = TABLE_Y + i as f64 * ROW_HEIGHT;
        let shade = if i % 2 == 0 { SHADE_EVEN } else { SHADE_ODD };
        page.rect(0.0, y, A4_WIDTH, ROW_HEIGHT, shade);

        let text_y = y + TEXT_OFFSET_Y;
        page.text(40.0, text_y - 3.0, Style::bold(11.1), &item.description);
        if let Some(sub) = item.sub_description.as_deref().filter(|s| !s.is_empty()) {
            page.text(40.0, text_y + 9.0, Style::plain(8.0).fill("#000"), sub);
        }
        page.text(360.0, text_y, Style::plain(11.1).middle(), &format!("{}", item.quantity));
        page.text(450.0, text_y, Style::plain(11.1).middle(), &money2(item.price));
        page.text(A4_WIDTH - 40.0, text_y, Style::bold(11.1).end(), &money2(item.amount()));
    }

    page.line(330.0, footer_y, A4_WIDTH - 40.0, footer_y, INK);
    page.text(330.0, footer_y + 24.0, Style::bold(16.0), "TOTAL");
    page.text(
        A4_WIDTH - 40.0,
        footer_y + 24.0,
        Style::bold(16.0).end().fill(ACCENT),
        &format!("MVR {}", money(invoice.total_amount)),
    );
    page.text(40.0, footer_y + 200.0, Style::plain(9.0), "Thank you for your business.");

    Document::svg(numbering::general_invoice_file_stem(invoice), page.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::db::models::LineItem;

    #[test]
    fn short_tables_keep_a4() {
        let (footer, height) = layout(3);
        assert_eq!(footer, MIN_FOOTER_Y);
        assert_eq!(height, A4_HEIGHT);
    }

    #[test]
    fn long_tables_push_footer_and_grow_page() {
        let (footer, height) = layout(10);
        assert!((footer - (TABLE_Y + 350.0 + FOOTER_GAP)).abs() < 1e-9);
        assert!((height - (footer + FOOTER_HEIGHT)).abs() < 1e-9);
    }

    #[test]
    fn line_prices_always_show_two_decimals() {
        let invoice = GeneralInvoice {
            id: 1,
            invoice_number: 3,
            year: "2026".into(),
            date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            customer_name: "Ocean Foods".into(),
            customer_address: None,
            items: vec![LineItem {
                description: "Yellowfin".into(),
                sub_description: None,
                quantity: 10.0,
                price: 12.5,
            }],
            total_amount: 125.0,
            status: "Pending".into(),
            created_at: Utc::now(),
        };
        let doc = general_invoice(&invoice, "Nila Thundi Investment");
        assert!(doc.body.contains(">12.50<"));
        assert!(doc.body.contains(">125.00<"));
        assert!(doc.body.contains("MVR 125.0<"));
    }
}
