use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::db::models::Statement;
use crate::error::TradebookError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::render::{self, Document};
use crate::router::TradebookState;
use crate::service::{mailroom, statements};
use crate::types::billing::{PeriodQuery, StatementEmailRequest, StatementList, StatementPreview, StatementRequest, YearQuery};
use crate::types::mail::MailReceipt;

pub async fn list_statements(
    State(state): State<TradebookState>,
    WithRejection(Query(q), _): ApiQuery<YearQuery>,
) -> Result<Json<StatementList>, TradebookError> {
    let (years, statements) = futures::try_join!(
        state.store.statement_years(),
        state.store.list_statements(q.year),
    )?;
    Ok(Json(StatementList { years, statements }))
}

pub async fn preview_statement(
    State(state): State<TradebookState>,
    WithRejection(Query(q), _): ApiQuery<PeriodQuery>,
) -> Result<Json<StatementPreview>, TradebookError> {
    Ok(Json(statements::preview(&state.store, q.start, q.end).await?))
}

pub async fn create_statement(
    State(state): State<TradebookState>,
    WithRejection(Json(req), _): ApiJson<StatementRequest>,
) -> Result<(StatusCode, Json<Statement>), TradebookError> {
    let statement =
        statements::generate(&state.store, req, state.config.digest.utc_offset_hours).await?;
    Ok((StatusCode::CREATED, Json(statement)))
}

pub async fn get_statement(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Json<Statement>, TradebookError> {
    Ok(Json(state.store.get_statement(id).await?))
}

pub async fn delete_statement(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<StatusCode, TradebookError> {
    state.store.delete_statement(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn statement_document(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Document, TradebookError> {
    let statement = state.store.get_statement(id).await?;
    let ledger = statements::load_ledger(&state.store, &statement).await?;
    Ok(render::statement::statement(
        &statement,
        &ledger,
        &state.config.company.name,
    ))
}

pub async fn email_statement(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
    WithRejection(Json(req), _): ApiJson<StatementEmailRequest>,
) -> Result<Json<MailReceipt>, TradebookError> {
    let statement = state.store.get_statement(id).await?;
    let receipt = mailroom::send_statement(
        &state.store,
        &state.mailer,
        &statement,
        &req.to,
        req.pdf_base64.as_deref(),
        &state.config.company.name,
    )
    .await?;
    Ok(Json(receipt))
}
