use chrono::{Datelike, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite};
use tracing::{info, warn};

use crate::db::models::{Counter, Statement};
use crate::db::sqlite::{Store, claim_counter};
use crate::error::TradebookError;
use crate::numbering;

const STATEMENT_COLUMNS: &str = "id, statement_number, start_date, end_date, issued_on, \
     total_amount, previous_balance, previous_statement_number, order_ids, created_at";

#[derive(Debug, Clone)]
pub struct StatementDraft {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub issued_on: NaiveDate,
    pub total_amount: f64,
    pub previous_balance: f64,
    pub previous_statement_number: Option<String>,
    pub order_ids: Vec<i64>,
}

impl Store {
    /// Claim the next statement number and store the statement.
    ///
    /// Fails with a conflict (and leaves the counter untouched) when a statement
    /// with that number already exists in the issue year.
    pub async fn insert_statement(&self, draft: &StatementDraft) -> Result<Statement, TradebookError> {
        let mut tx = self.pool().begin().await?;
        let number = claim_counter(&mut *tx, Counter::StatementNumber).await?;
        let year = draft.issued_on.year();

        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM statements WHERE statement_number = ? AND strftime('%Y', issued_on) = ?",
        )
        .bind(number)
        .bind(format!("{year:04}"))
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            tx.rollback().await?;
            let label = numbering::statement_number(number, draft.issued_on);
            warn!(statement = %label, "refusing to issue duplicate statement number");
            return Err(TradebookError::Conflict(format!(
                "Statement #{label} already exists. Delete the old one first if you want to \
                 replace it, or check the statement counter."
            )));
        }

        let rec: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO statements (
                statement_number, start_date, end_date, issued_on, total_amount,
                previous_balance, previous_statement_number, order_ids, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(number)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.issued_on)
        .bind(draft.total_amount)
        .bind(draft.previous_balance)
        .bind(&draft.previous_statement_number)
        .bind(Json(&draft.order_ids))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        info!(id = rec.0, statement_number = number, total = draft.total_amount, "statement issued");
        self.get_statement(rec.0).await
    }

    pub async fn get_statement(&self, id: i64) -> Result<Statement, TradebookError> {
        sqlx::query_as::<_, Statement>(&format!(
            "SELECT {STATEMENT_COLUMNS} FROM statements WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(TradebookError::NotFound("statement"))
    }

    /// Newest first, optionally limited to statements issued in `year`.
    pub async fn list_statements(&self, year: Option<i32>) -> Result<Vec<Statement>, TradebookError> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {STATEMENT_COLUMNS} FROM statements"));
        if let Some(year) = year {
            qb.push(" WHERE strftime('%Y', issued_on) = ");
            qb.push_bind(format!("{year:04}"));
        }
        qb.push(" ORDER BY issued_on DESC, id DESC");
        let rows = qb.build_query_as::<Statement>().fetch_all(self.pool()).await?;
        Ok(rows)
    }

    /// Distinct issue years, newest first.
    pub async fn statement_years(&self) -> Result<Vec<String>, TradebookError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT strftime('%Y', issued_on) AS y FROM statements ORDER BY y DESC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    pub async fn delete_statement(&self, id: i64) -> Result<(), TradebookError> {
        let res = sqlx::query("DELETE FROM statements WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if res.rows_affected() == 0 {
            return Err(TradebookError::NotFound("statement"));
        }
        info!(id, "statement deleted");
        Ok(())
    }

    /// The latest statement whose period started before `start`.
    pub async fn statement_before(&self, start: NaiveDate) -> Result<Option<Statement>, TradebookError> {
        let row = sqlx::query_as::<_, Statement>(&format!(
            "SELECT {STATEMENT_COLUMNS} FROM statements WHERE start_date < ? \
             ORDER BY start_date DESC, id DESC LIMIT 1"
        ))
        .bind(start)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }
}
