//! Office mail: batch sends from the composer, single documents, statements and
//! recipient groups. Every accepted message is written to the mail log.

use tracing::info;

use crate::db::Store;
use crate::db::models::{EmailGroup, NewEmailLog, Statement};
use crate::error::TradebookError;
use crate::numbering;
use crate::render;
use crate::render::email::{message_html, statement_notice_html};
use crate::service::mailer::{Attachment, MailClient};
use crate::service::statements::load_ledger;
use crate::types::mail::{BatchMailRequest, DocumentMailRequest, EmailGroupInput, MailReceipt};

/// Split comma separated entries, trim and drop blanks.
pub fn normalize_recipients(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn body_html(html: Option<String>, message: Option<String>) -> String {
    match html.filter(|h| !h.trim().is_empty()) {
        Some(html) => html,
        None => message_html(message.as_deref().unwrap_or_default()),
    }
}

pub async fn send_batch(
    store: &Store,
    mailer: &MailClient,
    req: BatchMailRequest,
) -> Result<MailReceipt, TradebookError> {
    let to = normalize_recipients(&req.to);
    if to.is_empty() {
        return Err(TradebookError::validation("Please enter a recipient."));
    }
    let attachments = req
        .attachments
        .iter()
        .map(|a| Attachment::from_base64(a.filename.clone(), &a.content))
        .collect::<Result<Vec<_>, _>>()?;
    let names: Vec<String> = attachments.iter().map(|a| a.filename.clone()).collect();

    let mut mail = mailer.office_mail();
    mail.to = to;
    mail.cc = normalize_recipients(&req.cc);
    mail.bcc = normalize_recipients(&req.bcc);
    mail.subject = req.subject;
    mail.html = body_html(req.html, req.message);
    mail.attachments = attachments;

    let id = mailer.send(&mail).await?;
    store
        .insert_email_log(&NewEmailLog {
            recipient: mail.to.join(", "),
            subject: mail.subject.clone(),
            attachment_name: Some(format!("{} Files", names.len())),
            attachments: names.clone(),
            document_type: Some("batch".to_string()),
            document_id: Some(req.document_ids.join(",")),
        })
        .await?;
    info!(id = %id, files = names.len(), "batch mail logged");
    Ok(MailReceipt {
        success: true,
        id,
        attachment_names: names,
    })
}

/// One recipient, one attachment; logged against the document it carries.
pub async fn send_document(
    store: &Store,
    mailer: &MailClient,
    req: DocumentMailRequest,
) -> Result<MailReceipt, TradebookError> {
    let to = req.to.trim().to_string();
    if to.is_empty() {
        return Err(TradebookError::validation("Please enter a recipient."));
    }
    let attachment = Attachment::from_base64(req.attachment.filename.clone(), &req.attachment.content)?;
    deliver_document(
        store,
        mailer,
        to,
        req.subject,
        body_html(req.html, req.message),
        attachment,
        &req.document_type,
        &req.document_id,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn deliver_document(
    store: &Store,
    mailer: &MailClient,
    to: String,
    subject: String,
    html: String,
    attachment: Attachment,
    document_type: &str,
    document_id: &str,
) -> Result<MailReceipt, TradebookError> {
    let file_name = attachment.filename.clone();
    let mut mail = mailer.office_mail();
    mail.to = vec![to.clone()];
    mail.subject = subject;
    mail.html = html;
    mail.attachments = vec![attachment];

    let id = mailer.send(&mail).await?;
    store
        .insert_email_log(&NewEmailLog {
            recipient: to,
            subject: mail.subject.clone(),
            attachment_name: Some(file_name.clone()),
            attachments: vec![file_name.clone()],
            document_type: Some(document_type.to_string()),
            document_id: Some(document_id.to_string()),
        })
        .await?;
    info!(id = %id, document_type, document_id, "document mail logged");
    Ok(MailReceipt {
        success: true,
        id,
        attachment_names: vec![file_name],
    })
}

/// Mail a statement. A client-rendered PDF is attached when supplied, otherwise
/// the server-rendered SVG goes out.
pub async fn send_statement(
    store: &Store,
    mailer: &MailClient,
    statement: &Statement,
    to: &str,
    pdf_base64: Option<&str>,
    company: &str,
) -> Result<MailReceipt, TradebookError> {
    let to = to.trim().to_string();
    if to.is_empty() {
        return Err(TradebookError::validation("Please enter a recipient."));
    }
    let label = numbering::statement_label(statement);
    let attachment = match pdf_base64.filter(|p| !p.trim().is_empty()) {
        Some(pdf) => Attachment::from_base64(format!("Statement-{}.pdf", label.replace('/', "-")), pdf)?,
        None => {
            let ledger = load_ledger(store, statement).await?;
            let doc = render::statement::statement(statement, &ledger, company);
            Attachment::from_bytes(doc.file_name(), doc.body.as_bytes())
        }
    };
    deliver_document(
        store,
        mailer,
        to,
        format!("Statement #{label} - {company}"),
        statement_notice_html(&label, company),
        attachment,
        "statement",
        "one-click-send",
    )
    .await
}

fn group_fields(input: EmailGroupInput) -> Result<(String, Vec<String>, Vec<String>, Vec<String>), TradebookError> {
    let name = input.name.trim().to_string();
    let to = normalize_recipients(&input.to);
    if name.is_empty() || to.is_empty() {
        return Err(TradebookError::validation(
            "Group name and at least one TO recipient are required",
        ));
    }
    Ok((name, to, normalize_recipients(&input.cc), normalize_recipients(&input.bcc)))
}

pub async fn create_group(store: &Store, input: EmailGroupInput) -> Result<EmailGroup, TradebookError> {
    let (name, to, cc, bcc) = group_fields(input)?;
    store.insert_email_group(&name, &to, &cc, &bcc).await
}

pub async fn update_group(store: &Store, id: i64, input: EmailGroupInput) -> Result<EmailGroup, TradebookError> {
    let (name, to, cc, bcc) = group_fields(input)?;
    store.update_email_group(id, &name, &to, &cc, &bcc).await
}
