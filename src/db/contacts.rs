use chrono::Utc;
use sqlx::types::Json;

use crate::db::models::{Contact, EmailGroup};
use crate::db::sqlite::Store;
use crate::error::TradebookError;

impl Store {
    /// Insert or refresh a contact keyed by its unique name.
    pub async fn upsert_contact(
        &self,
        name: &str,
        address: Option<&str>,
        email: Option<&str>,
    ) -> Result<Contact, TradebookError> {
        sqlx::query(
            r#"
            INSERT INTO contacts (name, address, email, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                address = excluded.address,
                email = COALESCE(excluded.email, contacts.email)
            "#,
        )
        .bind(name)
        .bind(address)
        .bind(email)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        sqlx::query_as::<_, Contact>(
            "SELECT id, name, address, email, created_at FROM contacts WHERE name = ?",
        )
        .bind(name)
        .fetch_one(self.pool())
        .await
        .map_err(Into::into)
    }

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, TradebookError> {
        let rows = sqlx::query_as::<_, Contact>(
            "SELECT id, name, address, email, created_at FROM contacts ORDER BY name ASC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Case-insensitive exact match on the name.
    pub async fn find_contact(&self, name: &str) -> Result<Option<Contact>, TradebookError> {
        let row = sqlx::query_as::<_, Contact>(
            "SELECT id, name, address, email, created_at FROM contacts \
             WHERE lower(name) = lower(?) LIMIT 1",
        )
        .bind(name.trim())
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn list_email_groups(&self) -> Result<Vec<EmailGroup>, TradebookError> {
        let rows = sqlx::query_as::<_, EmailGroup>(
            "SELECT id, name, to_list, cc_list, bcc_list, created_at FROM email_groups ORDER BY id",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn insert_email_group(
        &self,
        name: &str,
        to: &[String],
        cc: &[String],
        bcc: &[String],
    ) -> Result<EmailGroup, TradebookError> {
        let rec: (i64,) = sqlx::query_as(
            "INSERT INTO email_groups (name, to_list, cc_list, bcc_list, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(Json(to))
        .bind(Json(cc))
        .bind(Json(bcc))
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;
        self.get_email_group(rec.0).await
    }

    pub async fn update_email_group(
        &self,
        id: i64,
        name: &str,
        to: &[String],
        cc: &[String],
        bcc: &[String],
    ) -> Result<EmailGroup, TradebookError> {
        let res = sqlx::query(
            "UPDATE email_groups SET name = ?, to_list = ?, cc_list = ?, bcc_list = ? WHERE id = ?",
        )
        .bind(name)
        .bind(Json(to))
        .bind(Json(cc))
        .bind(Json(bcc))
        .bind(id)
        .execute(self.pool())
        .await?;
        if res.rows_affected() == 0 {
            return Err(TradebookError::NotFound("email group"));
        }
        self.get_email_group(id).await
    }

    pub async fn delete_email_group(&self, id: i64) -> Result<(), TradebookError> {
        let res = sqlx::query("DELETE FROM email_groups WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if res.rows_affected() == 0 {
            return Err(TradebookError::NotFound("email group"));
        }
        Ok(())
    }

    async fn get_email_group(&self, id: i64) -> Result<EmailGroup, TradebookError> {
        sqlx::query_as::<_, EmailGroup>(
            "SELECT id, name, to_list, cc_list, bcc_list, created_at FROM email_groups WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(TradebookError::NotFound("email group"))
    }
}
