//! Product catalog service: filtered and ranked product listings, paginated
//! results and review-driven product ratings over a relational store.

pub mod api;
pub mod catalog;
pub mod config;
pub mod entities;
pub mod middleware;

use axum::{middleware::from_fn, Router};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::middleware::{auth::TokenKeys, logging::logging_middleware};

/// Opens the pool. In-memory SQLite is pinned to one connection, since each
/// connection would otherwise see its own empty database.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);
    if database_url.starts_with("sqlite") && database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    Database::connect(options).await
}

pub fn build_app(db: DatabaseConnection, keys: TokenKeys) -> Router {
    create_api_router(Arc::new(db), Arc::new(keys))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
