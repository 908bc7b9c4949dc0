//! Address book and document counters.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;

use crate::db::models::{Contact, Counter};
use crate::error::TradebookError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::router::TradebookState;
use crate::types::billing::{ContactInput, ContactLookup, CounterUpdate};

pub async fn list_contacts(State(state): State<TradebookState>) -> Result<Json<Vec<Contact>>, TradebookError> {
    Ok(Json(state.store.list_contacts().await?))
}

pub async fn upsert_contact(
    State(state): State<TradebookState>,
    WithRejection(Json(input), _): ApiJson<ContactInput>,
) -> Result<Json<Contact>, TradebookError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(TradebookError::validation("name is required"));
    }
    let contact = state
        .store
        .upsert_contact(
            name,
            input.address.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            input.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        )
        .await?;
    Ok(Json(contact))
}

pub async fn lookup_contact(
    State(state): State<TradebookState>,
    WithRejection(Query(q), _): ApiQuery<ContactLookup>,
) -> Result<Json<Contact>, TradebookError> {
    state
        .store
        .find_contact(&q.name)
        .await?
        .map(Json)
        .ok_or(TradebookError::NotFound("contact"))
}

pub async fn list_counters(
    State(state): State<TradebookState>,
) -> Result<Json<BTreeMap<String, i64>>, TradebookError> {
    Ok(Json(state.store.list_counters().await?))
}

pub async fn set_counter(
    State(state): State<TradebookState>,
    WithRejection(Path(key), _): ApiPath<String>,
    WithRejection(Json(body), _): ApiJson<CounterUpdate>,
) -> Result<Json<BTreeMap<String, i64>>, TradebookError> {
    let counter: Counter = key.parse()?;
    state.store.set_counter(counter, body.value).await?;
    Ok(Json(state.store.list_counters().await?))
}

pub async fn sync_counters(
    State(state): State<TradebookState>,
) -> Result<Json<BTreeMap<String, i64>>, TradebookError> {
    state.store.sync_counters().await?;
    Ok(Json(state.store.list_counters().await?))
}
