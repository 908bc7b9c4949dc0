use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use tracing::error;

use crate::db::models::{EmailGroup, EmailLog};
use crate::error::TradebookError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireCronSecret;
use crate::router::TradebookState;
use crate::service::digest::{self, ReminderPreview};
use crate::service::mailroom;
use crate::types::mail::{BatchMailRequest, DocumentMailRequest, EmailGroupInput, MailReceipt, ReminderQuery};

const LOG_HISTORY: i64 = 20;

pub async fn email_logs(State(state): State<TradebookState>) -> Result<Json<Vec<EmailLog>>, TradebookError> {
    Ok(Json(state.store.recent_email_logs(LOG_HISTORY).await?))
}

pub async fn send_batch(
    State(state): State<TradebookState>,
    WithRejection(Json(req), _): ApiJson<BatchMailRequest>,
) -> Result<Json<MailReceipt>, TradebookError> {
    Ok(Json(mailroom::send_batch(&state.store, &state.mailer, req).await?))
}

pub async fn send_document(
    State(state): State<TradebookState>,
    WithRejection(Json(req), _): ApiJson<DocumentMailRequest>,
) -> Result<Json<MailReceipt>, TradebookError> {
    Ok(Json(mailroom::send_document(&state.store, &state.mailer, req).await?))
}

pub async fn list_groups(State(state): State<TradebookState>) -> Result<Json<Vec<EmailGroup>>, TradebookError> {
    Ok(Json(state.store.list_email_groups().await?))
}

pub async fn create_group(
    State(state): State<TradebookState>,
    WithRejection(Json(input), _): ApiJson<EmailGroupInput>,
) -> Result<(StatusCode, Json<EmailGroup>), TradebookError> {
    let group = mailroom::create_group(&state.store, input).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn update_group(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
    WithRejection(Json(input), _): ApiJson<EmailGroupInput>,
) -> Result<Json<EmailGroup>, TradebookError> {
    Ok(Json(mailroom::update_group(&state.store, id, input).await?))
}

pub async fn delete_group(
    State(state): State<TradebookState>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<StatusCode, TradebookError> {
    state.store.delete_email_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reminder_preview(
    State(state): State<TradebookState>,
    WithRejection(Query(q), _): ApiQuery<ReminderQuery>,
) -> Result<Json<ReminderPreview>, TradebookError> {
    Ok(Json(digest::reminder_preview(&state.store, q.date, &state.config).await?))
}

/// Scheduled daily digest. Failures surface as a plain-text 500 for the scheduler's log.
pub async fn delivery_reminder_cron(
    _secret: RequireCronSecret,
    State(state): State<TradebookState>,
) -> Response {
    match digest::send_daily_digest(&state.store, &state.mailer, &state.config).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            error!(error = %e, "delivery digest failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
