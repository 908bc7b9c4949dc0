use crate::db::models::Statement;
use crate::numbering;
use crate::render::Document;
use crate::render::format::{date_gb, money2};
use crate::render::svg::{A4_HEIGHT, A4_WIDTH, ACCENT, INK, SHADE_EVEN, SHADE_ODD, Style, SvgPage};
use crate::service::statements::StatementLedger;

const TEXT_START_Y: f64 = 400.4;
const RECT_START_Y: f64 = 384.9;
const ROW_HEIGHT: f64 = 23.35;
const RECT_HEIGHT: f64 = 22.9;

const COL_DATE: f64 = 30.0;
const COL_INVOICE: f64 = 110.0;
const COL_DESC: f64 = 190.0;
const COL_AMOUNT: f64 = 470.0;
const COL_BALANCE: f64 = A4_WIDTH - 25.0;

pub fn statement(statement: &Statement, ledger: &StatementLedger, company: &str) -> Document {
    let rows_end = RECT_START_Y + ledger.rows.len() as f64 * ROW_HEIGHT;
    let total_y = rows_end + 40.0;
    let mut page = SvgPage::new(A4_HEIGHT.max(total_y + 160.0));
    page.header(company, "STATEMENT");

    page.field(40.0, 160.0, "STATEMENT NO", &numbering::statement_label(statement));
    page.field(200.0, 160.0, "DATE", &date_gb(statement.issued_on));
    page.field(
        360.0,
        160.0,
        "PERIOD",
        &format!(
            "{} - {}",
            date_gb(statement.start_date),
            date_gb(statement.end_date)
        ),
    );

    let head = Style::bold(14.0).fill("#fff");
    page.rect(0.0, RECT_START_Y - 30.0, A4_WIDTH, 30.0, ACCENT);
    page.text(COL_DATE, RECT_START_Y - 10.0, head, "DATE");
    page.text(COL_INVOICE, RECT_START_Y - 10.0, head, "INVOICE");
    page.text(COL_DESC, RECT_START_Y - 10.0, head, "DESCRIPTION");
    page.text(COL_AMOUNT, RECT_START_Y - 10.0, head.end(), "AMOUNT");
    page.text(COL_BALANCE, RECT_START_Y - 10.0, head.end(), "BALANCE");

    for (i, row) in ledger.rows.iter().enumerate() {
        let shade = if i % 2 == 0 { SHADE_EVEN } else { SHADE_ODD };
        page.rect(0.0, RECT_START_Y + i as f64 * ROW_HEIGHT, A4_WIDTH, RECT_HEIGHT, shade);

        let y = TEXT_START_Y + i as f64 * ROW_HEIGHT;
        let body = Style::plain(11.1);
        if let Some(date) = row.date {
            page.text(COL_DATE, y, body, &date_gb(date));
        }
        page.text(COL_INVOICE, y, body, &row.reference);
        page.text(COL_DESC, y, body, &row.description);
        page.text(COL_AMOUNT, y, body.end(), &money2(row.amount));
        page.text(COL_BALANCE, y, Style::bold(11.1).end(), &money2(row.balance));
    }

    page.line(330.0, total_y, COL_BALANCE, total_y, INK);
    page.text(330.0, total_y + 24.0, Style::bold(16.0), "TOTAL DUE");
    page.text(
        COL_BALANCE,
        total_y + 24.0,
        Style::bold(16.0).end().fill(ACCENT),
        &format!("MVR {}", money2(ledger.total_due)),
    );

    Document::svg(numbering::statement_file_stem(statement), page.finish())
}
