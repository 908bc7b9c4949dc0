//! HTML bodies for outbound mail.

use std::fmt::Write;

use crate::render::format::{amount, escape};
use crate::service::digest::DeliveryDigest;

const CELL: &str = "padding: 10px; border: 1px solid #ddd;";

/// Delivery schedule table sent by the daily job.
pub fn delivery_digest_html(digest: &DeliveryDigest) -> String {
    let mut rows = String::new();
    for line in &digest.lines {
        let _ = write!(
            rows,
            r#"<tr style="border-bottom: 1px solid #eee;"><td style="{CELL}">{po}</td><td style="{CELL}">{qty} kg</td><td style="{CELL} font-weight: bold; color: #2563eb;">#{dn}</td><td style="{CELL} text-align: right;">{value}</td></tr>"#,
            po = escape(&line.po_number),
            qty = line.weight_kg,
            dn = line.predicted_dn,
            value = amount(line.total_amount, 0, 2),
        );
        rows.push('\n');
    }
    let _ = write!(
        rows,
        r#"<tr style="background-color: #f9fafb; font-weight: bold;"><td style="{CELL}">TOTAL</td><td style="{CELL}">{qty:.1} kg</td><td style="{CELL}">-</td><td style="{CELL} text-align: right;">{value}</td></tr>"#,
        qty = digest.total_qty,
        value = amount(digest.total_value, 0, 2),
    );

    format!(
        r#"<div style="font-family: Arial, sans-serif; color: #333;">
<h2 style="color: #000;">Delivery Schedule</h2>
<p><b>Date:</b> {date} (Today)</p>
<p>Here is the list of orders scheduled for delivery today:</p>
<table style="border-collapse: collapse; width: 100%; max-width: 600px; font-size: 14px;">
<thead><tr style="background-color: #000; color: #fff;"><th style="padding: 10px; text-align: left;">PO #</th><th style="padding: 10px; text-align: left;">Qty</th><th style="padding: 10px; text-align: left;">Predicted DN</th><th style="padding: 10px; text-align: right;">Amount</th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
<p style="margin-top: 20px; font-size: 12px; color: #666;">This is an automated message from the back-office system.</p>
</div>"#,
        date = digest.date,
    )
}

/// Plain-text schedule the mailroom loads into the composer.
pub fn delivery_reminder_text(digest: &DeliveryDigest, signature: &str) -> String {
    let mut body = format!(
        "Dear Team,\n\nHere is the delivery schedule for {}:\n\n",
        digest.date.format("%d/%m/%Y")
    );
    let lines: Vec<String> = digest
        .lines
        .iter()
        .map(|l| {
            format!(
                "PO: {} | Qty: {}kg | DN: {} (Predicted)",
                l.po_number, l.weight_kg, l.predicted_dn
            )
        })
        .collect();
    body.push_str(&lines.join("\n"));
    let _ = write!(body, "\n\nRegards,\n{signature}");
    body
}

pub fn statement_notice_html(statement_label: &str, company: &str) -> String {
    let label = escape(statement_label);
    let company = escape(company);
    format!(
        r#"<div style="font-family: sans-serif;"><h2>Billing Statement Available</h2><p>Please find attached statement #{label}.</p><p>Regards,<br>{company}</p></div>"#
    )
}

/// Free text from the composer, escaped, with line breaks preserved.
pub fn message_html(message: &str) -> String {
    let body = escape(message).replace("\r\n", "\n").replace('\n', "<br>");
    format!(r#"<div style="font-family: Arial; white-space: pre-wrap;">{body}</div>"#)
}
