//! SQL DDL for initializing the back-office store.
//! SQLite-first design; dates are stored as ISO-8601 TEXT so range filters compare lexically.

/// Tables:
/// - `orders`: purchase orders and their delivery/invoice/payment state
/// - `general_invoices`: free-form invoices numbered per calendar year
/// - `statements`: periodic billing summaries with carried-forward balance
/// - `settings`: singleton integer counters for sequential document numbers
/// - `contacts`, `email_logs`, `email_groups`: mailroom support
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    po_number TEXT NOT NULL,
    po_date TEXT NOT NULL,
    delivery_date TEXT NULL,
    currency TEXT NOT NULL DEFAULT 'MVR',
    total_amount REAL NOT NULL DEFAULT 0,
    weight_kg REAL NOT NULL DEFAULT 0,
    description TEXT NULL,
    payment_status TEXT NOT NULL DEFAULT 'Unpaid',
    delivery_status TEXT NOT NULL DEFAULT 'Pending',
    delivery_note_number INTEGER NULL,
    invoice_number INTEGER NULL,
    invoice_date TEXT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_po_date ON orders(po_date);
CREATE INDEX IF NOT EXISTS idx_orders_delivery_date ON orders(delivery_date);

CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    address TEXT NULL,
    email TEXT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS general_invoices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    invoice_number INTEGER NOT NULL,
    year TEXT NOT NULL,
    date TEXT NOT NULL,
    customer_name TEXT NOT NULL,
    customer_address TEXT NULL,
    items TEXT NOT NULL, -- JSON array of line items
    total_amount REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'Pending',
    created_at TEXT NOT NULL,
    UNIQUE (year, invoice_number)
);

CREATE TABLE IF NOT EXISTS statements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    statement_number INTEGER NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    issued_on TEXT NOT NULL,
    total_amount REAL NOT NULL DEFAULT 0,
    previous_balance REAL NOT NULL DEFAULT 0,
    previous_statement_number TEXT NULL,
    order_ids TEXT NOT NULL, -- JSON array of order ids
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);

INSERT OR IGNORE INTO settings (key, value) VALUES ('next_invoice_number', 1);
INSERT OR IGNORE INTO settings (key, value) VALUES ('next_delivery_note', 1);
INSERT OR IGNORE INTO settings (key, value) VALUES ('next_statement_number', 1);

CREATE TABLE IF NOT EXISTS email_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recipient TEXT NOT NULL,
    subject TEXT NOT NULL,
    attachment_name TEXT NULL,
    attachments TEXT NOT NULL, -- JSON array of file names
    document_type TEXT NULL,
    document_id TEXT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS email_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    to_list TEXT NOT NULL,
    cc_list TEXT NOT NULL,
    bcc_list TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;
