use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TradebookError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Invalid attachment encoding: {0}")]
    AttachmentDecode(#[from] base64::DecodeError),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    #[error(transparent)]
    QueryString(#[from] QueryRejection),

    #[error(transparent)]
    PathParam(#[from] PathRejection),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Mail provider rejected the message ({status}): {message}")]
    MailProvider { status: StatusCode, message: String },
}

impl TradebookError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Only failures where the provider cannot have taken the message are retried:
    /// refused connections and provider 5xx. Timeouts may already have been accepted.
    pub fn is_retryable(&self) -> bool {
        match self {
            TradebookError::Reqwest(e) => e.is_connect(),
            TradebookError::MailProvider { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

impl IntoResponse for TradebookError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            TradebookError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            TradebookError::JsonBody(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                rejection.body_text(),
            ),
            TradebookError::JsonBody(rejection) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
            }
            TradebookError::QueryString(rejection) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
            }
            TradebookError::PathParam(rejection) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
            }
            TradebookError::AttachmentDecode(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_ATTACHMENT", self.to_string())
            }
            TradebookError::NotFound(_) | TradebookError::DatabaseError(SqlxError::RowNotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            TradebookError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            TradebookError::MissingConfig(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MISSING_CONFIG",
                self.to_string(),
            ),
            TradebookError::MailProvider { message, .. } => {
                (StatusCode::BAD_GATEWAY, "MAIL_REJECTED", message.clone())
            }
            TradebookError::Reqwest(_) | TradebookError::UrlParse(_) => (
                StatusCode::BAD_GATEWAY,
                "BAD_GATEWAY",
                "Mail provider is unavailable.".to_string(),
            ),
            TradebookError::DatabaseError(_) | TradebookError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred.".to_string(),
            ),
        };
        let body = ApiErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Error payload returned by the transactional mail provider.
#[derive(Deserialize, Debug)]
pub struct MailProviderError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
