use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::{ApiErrorBody, ApiErrorResponse};
use crate::router::TradebookState;

fn key_matches(candidate: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
}

/// Ensure the inbound request carries the office key.
/// Accepts either:
/// - Header: `x-office-key: ...`
/// - Header: `Authorization: Bearer ...`
/// - Query string: `?key=...`
///
/// With no key configured every request is refused.
pub fn ensure_authorized(
    headers: &HeaderMap,
    query: Option<&str>,
    expected: Option<&str>,
) -> Result<(), Response> {
    let Some(expected) = expected else {
        warn!("office api call rejected: no office key configured");
        return Err(unauthorized_json());
    };

    if let Some(hv) = headers.get("x-office-key").and_then(|v| v.to_str().ok())
        && key_matches(hv.trim(), expected)
    {
        return Ok(());
    }

    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && key_matches(token.trim(), expected)
        {
            return Ok(());
        }
    }

    if let Some(qs) = query {
        for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
            if k == "key" && key_matches(&v, expected) {
                return Ok(());
            }
        }
    }

    Err(unauthorized_json())
}

fn unauthorized_json() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiErrorResponse {
            error: ApiErrorBody {
                code: "UNAUTHORIZED".to_string(),
                message: "invalid or missing office key".to_string(),
            },
        }),
    )
        .into_response()
}

/// Gate for the office API.
#[derive(Debug, Clone, Copy)]
pub struct RequireKeyAuth;

impl FromRequestParts<TradebookState> for RequireKeyAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &TradebookState,
    ) -> Result<Self, Self::Rejection> {
        ensure_authorized(
            &parts.headers,
            parts.uri.query(),
            state.config.basic.office_key.as_deref(),
        )?;
        Ok(Self)
    }
}

/// Gate for the scheduler hitting the cron endpoint: `Authorization: Bearer <cron secret>`.
/// With no secret configured nothing gets through.
#[derive(Debug, Clone, Copy)]
pub struct RequireCronSecret;

impl FromRequestParts<TradebookState> for RequireCronSecret {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &TradebookState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        let Some(secret) = state.config.digest.cron_secret.as_deref() else {
            warn!("cron call rejected: no cron secret configured");
            return Err(unauthorized());
        };
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| unauthorized())?;
        if key_matches(bearer.token(), secret) {
            Ok(Self)
        } else {
            warn!("cron call rejected: bad secret");
            Err(unauthorized())
        }
    }
}
