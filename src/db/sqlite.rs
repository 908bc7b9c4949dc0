use crate::db::models::Counter;
use crate::db::schema::SQLITE_INIT;
use crate::error::TradebookError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, info};

pub type SqlitePool = Pool<Sqlite>;

/// Handle over the back-office database. Cheap to clone; all entity queries hang off it.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, TradebookError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_opts = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            // every connection to :memory: is a fresh database; pin exactly one
            pool_opts = pool_opts
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_opts.connect_with(connect_opts).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        info!(database_url = %database_url, "store ready");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), TradebookError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Current value of a counter, i.e. the number the next document would receive.
    pub async fn peek_counter(&self, counter: Counter) -> Result<i64, TradebookError> {
        let rec: (i64,) = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(counter.key())
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn list_counters(&self) -> Result<BTreeMap<String, i64>, TradebookError> {
        let rows: Vec<(String, i64)> = sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn set_counter(&self, counter: Counter, value: i64) -> Result<(), TradebookError> {
        if value < 1 {
            return Err(TradebookError::validation("counter value must be at least 1"));
        }
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(value)
            .bind(counter.key())
            .execute(&self.pool)
            .await?;
        info!(counter = counter.key(), value, "counter set manually");
        Ok(())
    }

    /// Reset every counter to one past the highest number actually issued.
    pub async fn sync_counters(&self) -> Result<(), TradebookError> {
        let mut tx = self.pool.begin().await?;
        for (counter, source) in [
            (
                Counter::InvoiceNumber,
                "SELECT COALESCE(MAX(invoice_number), 0) + 1 FROM orders",
            ),
            (
                Counter::DeliveryNote,
                "SELECT COALESCE(MAX(delivery_note_number), 0) + 1 FROM orders",
            ),
            (
                Counter::StatementNumber,
                "SELECT COALESCE(MAX(statement_number), 0) + 1 FROM statements",
            ),
        ] {
            sqlx::query(&format!("UPDATE settings SET value = ({source}) WHERE key = ?"))
                .bind(counter.key())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        debug!("counters synchronised with issued documents");
        Ok(())
    }
}

/// Take the next number from `counter` and advance it, inside the caller's transaction.
pub(crate) async fn claim_counter(
    conn: &mut SqliteConnection,
    counter: Counter,
) -> Result<i64, TradebookError> {
    let rec: (i64,) =
        sqlx::query_as("UPDATE settings SET value = value + 1 WHERE key = ? RETURNING value - 1")
            .bind(counter.key())
            .fetch_one(&mut *conn)
            .await?;
    debug!(counter = counter.key(), issued = rec.0, "counter claimed");
    Ok(rec.0)
}
