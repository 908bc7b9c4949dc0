use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentPayload {
    pub filename: String,
    /// Base64, optionally as a `data:` URL.
    pub content: String,
}

/// Body of `POST /api/mail/batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchMailRequest {
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub subject: String,
    /// Plain text from the composer; ignored when `html` is given.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
    #[serde(default)]
    pub document_ids: Vec<String>,
}

/// Body of `POST /api/mail/document`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentMailRequest {
    pub to: String,
    pub subject: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    pub attachment: AttachmentPayload,
    pub document_type: String,
    pub document_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailReceipt {
    pub success: bool,
    pub id: String,
    pub attachment_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailGroupInput {
    pub name: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReminderQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}
