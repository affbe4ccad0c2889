//! HTTP handlers

mod articles;
mod auth;
mod health;

pub use articles::{create_article, delete_article, get_article, list_articles, update_article};
pub use auth::{login, register};
pub use health::{health, ready};

use folio_core::metrics::OperationTimer;

use crate::error::ApiResult;

/// Record an operation's duration labelled with its outcome
fn record_op<T>(timer: OperationTimer, result: &ApiResult<T>) {
    let label = match result {
        Ok(_) => "ok",
        Err(e) => e.error_code(),
    };
    timer.finish(label);
}
