//! Database module: models, schema and queries for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the `Store` handle, schema bootstrap and document counters
//! - one file per entity with its queries, each an `impl Store` block

pub mod contacts;
pub mod email_logs;
pub mod general_invoices;
pub mod models;
pub mod orders;
pub mod schema;
pub mod sqlite;
pub mod statements;

pub use models::{
    Contact, Counter, Currency, DeliveryStatus, EmailGroup, EmailLog, GeneralInvoice, LineItem,
    NewEmailLog, Order, PaymentStatus, Statement,
};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, Store};
