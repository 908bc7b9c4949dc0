use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_extractor_with_state,
    routing::{get, post, put},
};

use crate::config::Config;
use crate::db::Store;
use crate::handlers::{directory, invoices, mail, orders, statements};
use crate::middleware::RequireKeyAuth;
use crate::service::mailer::MailClient;

#[derive(Clone)]
pub struct TradebookState {
    pub store: Store,
    pub mailer: MailClient,
    pub config: Arc<Config>,
}

impl TradebookState {
    pub fn new(store: Store, mailer: MailClient, config: Arc<Config>) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }
}

pub fn tradebook_router(state: TradebookState) -> Router {
    let body_limit = state.config.basic.body_limit_mb.max(1) * 1024 * 1024;

    // routes carrying base64 attachments
    let outbound = Router::new()
        .route("/mail/batch", post(mail::send_batch))
        .route("/mail/document", post(mail::send_document))
        .route("/statements/{id}/email", post(statements::email_statement))
        .layer(DefaultBodyLimit::max(body_limit));

    let api = Router::new()
        .route("/dashboard", get(orders::dashboard))
        .route("/orders", post(orders::create_order))
        .route("/orders/recent", get(orders::recent_orders))
        .route("/orders/years", get(orders::order_years))
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/{id}/deliver", post(orders::deliver_order))
        .route("/orders/{id}/invoice", post(orders::invoice_order))
        .route("/orders/{id}/payment", post(orders::toggle_payment))
        .route("/orders/{id}/documents/invoice", get(orders::invoice_document))
        .route(
            "/orders/{id}/documents/delivery-note",
            get(orders::delivery_note_document),
        )
        .route("/invoices", get(invoices::invoice_tab))
        .route(
            "/general-invoices",
            get(invoices::list_general_invoices).post(invoices::create_general_invoice),
        )
        .route("/general-invoices/next-number", get(invoices::next_general_number))
        .route(
            "/general-invoices/{id}",
            get(invoices::get_general_invoice).put(invoices::update_general_invoice),
        )
        .route(
            "/general-invoices/{id}/document",
            get(invoices::general_invoice_document),
        )
        .route(
            "/statements",
            get(statements::list_statements).post(statements::create_statement),
        )
        .route("/statements/preview", get(statements::preview_statement))
        .route(
            "/statements/{id}",
            get(statements::get_statement).delete(statements::delete_statement),
        )
        .route("/statements/{id}/document", get(statements::statement_document))
        .route(
            "/contacts",
            get(directory::list_contacts).post(directory::upsert_contact),
        )
        .route("/contacts/lookup", get(directory::lookup_contact))
        .route("/settings/counters", get(directory::list_counters))
        .route("/settings/counters/sync", post(directory::sync_counters))
        .route("/settings/counters/{key}", put(directory::set_counter))
        .route("/mail/logs", get(mail::email_logs))
        .route("/mail/groups", get(mail::list_groups).post(mail::create_group))
        .route(
            "/mail/groups/{id}",
            put(mail::update_group).delete(mail::delete_group),
        )
        .route("/mail/reminders", get(mail::reminder_preview))
        .merge(outbound)
        .route_layer(from_extractor_with_state::<RequireKeyAuth, TradebookState>(
            state.clone(),
        ))
        // authenticated by its own bearer secret
        .route("/cron/delivery-reminder", get(mail::delivery_reminder_cron));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(state)
}
