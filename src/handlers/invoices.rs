use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::db::models::{GeneralInvoice, Order};
use crate::db::orders::InvoiceTab;
use crate::error::TradebookError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::render::{self, Document};
use crate::router::TradebookState;
use crate::service::general_invoices;
use crate::types::billing::{GeneralInvoiceInput, NextNumber};

#[derive(Debug, Deserialize)]
pub struct InvoiceTabQuery {
    #[serde(default)]
    pub tab: InvoiceTab,
    #[serde(default)]
    pub year: Option<i32>,
}

pub async fn invoice_tab(
    State(state): State<TradebookState>,
    WithRejection(Query(q), _): ApiQuery<InvoiceTabQuery>,
) -> Result<Json<Vec<Order>>, TradebookError> {
    Ok(Json(state.store.invoice_tab_orders(q.tab, q.year).await?))
}

pub async fn list_general_invoices(
    State(state): State<TradebookState>,
) -> Result<Json<Vec<GeneralInvoice>>, TradebookError> {
    Ok(Json(state.store.list_general_invoices().await?))
}

pub async fn next_general_number(State(state): State<TradebookState>) -> Result<Json<NextNumber>, TradebookError> {
    Ok(Json(general_invoices::next_number(&state.store, state.config.digest.utc_offset_hours).await?))
}

pub async fn create_general_invoice(
    State(state): State<TradebookState>,
    WithRejection(Json(input), _): ApiJson<GeneralInvoiceInput>,
) -> Result<(StatusCode, Json<GeneralInvoice>), TradebookError> {
    let invoice = general_invoices::create(&state.store, input, state.config.digest.utc_offset_hours).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn get_general_invoice(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Json<GeneralInvoice>, TradebookError> {
    Ok(Json(state.store.get_general_invoice(id).await?))
}

pub async fn update_general_invoice(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
    WithRejection(Json(input), _): ApiJson<GeneralInvoiceInput>,
) -> Result<Json<GeneralInvoice>, TradebookError> {
    Ok(Json(general_invoices::update(&state.store, id, input).await?))
}

pub async fn general_invoice_document(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Document, TradebookError> {
    let invoice = state.store.get_general_invoice(id).await?;
    Ok(render::general_invoice::general_invoice(
        &invoice,
        &state.config.company.name,
    ))
}
