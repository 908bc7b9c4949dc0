use chrono::Utc;
use sqlx::types::Json;

use crate::db::models::{EmailLog, NewEmailLog};
use crate::db::sqlite::Store;
use crate::error::TradebookError;

impl Store {
    pub async fn insert_email_log(&self, log: &NewEmailLog) -> Result<i64, TradebookError> {
        let rec: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO email_logs (
                recipient, subject, attachment_name, attachments,
                document_type, document_id, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, 'sent', ?)
            RETURNING id
            "#,
        )
        .bind(&log.recipient)
        .bind(&log.subject)
        .bind(&log.attachment_name)
        .bind(Json(&log.attachments))
        .bind(&log.document_type)
        .bind(&log.document_id)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;
        Ok(rec.0)
    }

    pub async fn recent_email_logs(&self, limit: i64) -> Result<Vec<EmailLog>, TradebookError> {
        let rows = sqlx::query_as::<_, EmailLog>(
            r#"SELECT id, recipient, subject, attachment_name, attachments,
               document_type, document_id, status, created_at
               FROM email_logs ORDER BY created_at DESC, id DESC LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
