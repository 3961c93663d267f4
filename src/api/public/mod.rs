pub mod auth;
pub mod category;
pub mod product;
pub mod review;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::auth::TokenKeys;

use auth::auth_router;
use category::category_router;
use product::product_router;
use review::review_router;

/// Reads are open; writes on the same paths sit behind the bearer guard and
/// the catalog decides what the caller's role allows.
pub fn public_api_router(db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    Router::new()
        .merge(auth_router(db.clone(), keys.clone()))
        .merge(category_router(db.clone()))
        .merge(product_router(db.clone(), keys.clone()))
        .merge(review_router(db, keys))
}
