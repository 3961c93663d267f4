pub mod category;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use category::admin_category_router;

use crate::api::auth_state;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, TokenKeys};

pub fn admin_api_router(db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    Router::new()
        .merge(admin_category_router(db.clone()))
        .layer(from_fn_with_state(
            auth_state(&db, &keys, Some(Role::Admin)),
            auth_middleware,
        ))
}
