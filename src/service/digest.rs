//! Delivery schedule: the daily automated digest and the mailroom reminder preview.

use chrono::{Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::db::models::{Counter, NewEmailLog, Order};
use crate::error::TradebookError;
use crate::render::email::{delivery_digest_html, delivery_reminder_text};
use crate::service::mailer::{MailClient, OutgoingMail};

const REMINDER_SIGNATURE: &str = "Nila Thundi";

/// The calendar date at the business location, which sits at a fixed offset from UTC.
pub fn business_today(utc_offset_hours: i32) -> NaiveDate {
    match FixedOffset::east_opt(utc_offset_hours * 3600) {
        Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
        None => Utc::now().date_naive(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DigestLine {
    pub order_id: i64,
    pub po_number: String,
    pub weight_kg: f64,
    pub total_amount: f64,
    /// Number this order would get if delivered in list order.
    pub predicted_dn: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryDigest {
    pub date: NaiveDate,
    pub next_dn: i64,
    pub lines: Vec<DigestLine>,
    pub total_qty: f64,
    pub total_value: f64,
}

impl DeliveryDigest {
    pub fn from_orders(date: NaiveDate, next_dn: i64, orders: &[Order]) -> Self {
        let lines: Vec<DigestLine> = orders
            .iter()
            .zip(next_dn..)
            .map(|(o, dn)| DigestLine {
                order_id: o.id,
                po_number: o.po_number.clone(),
                weight_kg: o.weight_kg,
                total_amount: o.total_amount,
                predicted_dn: dn,
            })
            .collect();
        Self {
            date,
            next_dn,
            total_qty: lines.iter().map(|l| l.weight_kg).sum(),
            total_value: lines.iter().map(|l| l.total_amount).sum(),
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub async fn load_digest(store: &Store, date: NaiveDate) -> Result<DeliveryDigest, TradebookError> {
    let (orders, next_dn) = futures::try_join!(
        store.orders_for_delivery_date(date),
        store.peek_counter(Counter::DeliveryNote),
    )?;
    Ok(DeliveryDigest::from_orders(date, next_dn, &orders))
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderPreview {
    #[serde(flatten)]
    pub digest: DeliveryDigest,
    pub subject: String,
    pub body: String,
}

/// Composer text for the schedule on `date`, defaulting to tomorrow's business date.
pub async fn reminder_preview(
    store: &Store,
    date: Option<NaiveDate>,
    cfg: &Config,
) -> Result<ReminderPreview, TradebookError> {
    let date = date.unwrap_or_else(|| business_today(cfg.digest.utc_offset_hours) + Duration::days(1));
    let digest = load_digest(store, date).await?;
    let subject = format!("Delivery Schedule - {}", date.format("%d/%m/%Y"));
    let body = if digest.is_empty() {
        String::new()
    } else {
        delivery_reminder_text(&digest, REMINDER_SIGNATURE)
    };
    Ok(ReminderPreview { digest, subject, body })
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DigestOutcome {
    Empty { message: &'static str },
    Sent { success: bool, count: usize },
}

/// Mail today's schedule to the configured recipients and log it.
pub async fn send_daily_digest(
    store: &Store,
    mailer: &MailClient,
    cfg: &Config,
) -> Result<DigestOutcome, TradebookError> {
    let today = business_today(cfg.digest.utc_offset_hours);
    info!(date = %today, "checking deliveries for digest");
    let digest = load_digest(store, today).await?;
    if digest.is_empty() {
        info!(date = %today, "no deliveries scheduled, digest skipped");
        return Ok(DigestOutcome::Empty {
            message: "No orders found for today.",
        });
    }

    let recipients = cfg.digest.recipient_list();
    let subject = format!("[AUTO] Delivery Schedule - {today}");
    let mail = OutgoingMail {
        from: cfg.digest.sender.clone(),
        to: recipients.clone(),
        subject: subject.clone(),
        html: delivery_digest_html(&digest),
        ..OutgoingMail::default()
    };
    mailer.send(&mail).await?;

    store
        .insert_email_log(&NewEmailLog {
            recipient: recipients.join(", "),
            subject,
            attachment_name: Some("Automated Report".to_string()),
            ..NewEmailLog::default()
        })
        .await?;
    info!(date = %today, count = digest.lines.len(), "delivery digest sent");
    Ok(DigestOutcome::Sent {
        success: true,
        count: digest.lines.len(),
    })
}
