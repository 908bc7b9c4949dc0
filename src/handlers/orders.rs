use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::db::models::Order;
use crate::db::orders::PeriodFilter;
use crate::error::TradebookError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::render::{self, Document};
use crate::router::TradebookState;
use crate::service::orders as workflow;
use crate::types::orders::{DashboardView, OrderInput, RecentQuery};

pub async fn dashboard(
    State(state): State<TradebookState>,
    WithRejection(Query(filter), _): ApiQuery<PeriodFilter>,
) -> Result<Json<DashboardView>, TradebookError> {
    let view = workflow::dashboard(&state.store, filter, &state.config.company).await?;
    Ok(Json(view))
}

pub async fn create_order(
    State(state): State<TradebookState>,
    WithRejection(Json(input), _): ApiJson<OrderInput>,
) -> Result<(StatusCode, Json<Order>), TradebookError> {
    let draft = workflow::draft_from_input(input, &state.config.company)?;
    let order = state.store.insert_order(&draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Json<Order>, TradebookError> {
    Ok(Json(state.store.get_order(id).await?))
}

pub async fn update_order(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
    WithRejection(Json(input), _): ApiJson<OrderInput>,
) -> Result<Json<Order>, TradebookError> {
    let draft = workflow::draft_from_input(input, &state.config.company)?;
    Ok(Json(state.store.update_order(id, &draft).await?))
}

pub async fn delete_order(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<StatusCode, TradebookError> {
    workflow::remove(&state.store, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn recent_orders(
    State(state): State<TradebookState>,
    WithRejection(Query(q), _): ApiQuery<RecentQuery>,
) -> Result<Json<Vec<Order>>, TradebookError> {
    Ok(Json(state.store.recent_orders(q.limit.clamp(1, 100)).await?))
}

pub async fn order_years(State(state): State<TradebookState>) -> Result<Json<Vec<String>>, TradebookError> {
    Ok(Json(state.store.order_years().await?))
}

pub async fn deliver_order(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Json<Order>, TradebookError> {
    let order = workflow::deliver(&state.store, id, state.config.digest.utc_offset_hours).await?;
    Ok(Json(order))
}

pub async fn invoice_order(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Json<Order>, TradebookError> {
    Ok(Json(state.store.assign_invoice_number(id).await?))
}

pub async fn toggle_payment(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Json<Order>, TradebookError> {
    Ok(Json(workflow::toggle_payment(&state.store, id).await?))
}

pub async fn invoice_document(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Document, TradebookError> {
    let order = state.store.get_order(id).await?;
    Ok(render::invoice::order_invoice(&order, &state.config.company.name))
}

pub async fn delivery_note_document(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Document, TradebookError> {
    let order = state.store.get_order(id).await?;
    Ok(render::invoice::delivery_note(&order, &state.config.company.name))
}
