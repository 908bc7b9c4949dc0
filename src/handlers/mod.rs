use axum::{
    Json,
    extract::{Path, Query},
};
use axum_extra::extract::WithRejection;

use crate::error::TradebookError;

pub mod directory;
pub mod invoices;
pub mod mail;
pub mod orders;
pub mod statements;

// Extractors whose rejections answer with the API error envelope.
pub type ApiJson<T> = WithRejection<Json<T>, TradebookError>;
pub type ApiQuery<T> = WithRejection<Query<T>, TradebookError>;
pub type ApiPath<T> = WithRejection<Path<T>, TradebookError>;
