pub mod admin;
pub mod public;

use axum::{http::StatusCode, response::Response, Json, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::{fmt, sync::Arc};

use crate::catalog::{CatalogError, ErrorKind};
use crate::entities::user::Role;
use crate::middleware::auth::{AuthState, TokenKeys};
use crate::middleware::logging::{to_response, ApiError};

use admin::admin_api_router;
use public::public_api_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    Router::new()
        .nest("/api", public_api_router(shared_db.clone(), keys.clone()))
        .nest("/api/admin", admin_api_router(shared_db, keys))
}

pub(crate) fn auth_state(db: &Arc<DatabaseConnection>, keys: &Arc<TokenKeys>, role: Option<Role>) -> AuthState {
    AuthState {
        db: db.clone(),
        keys: keys.clone(),
        role,
    }
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidRange | ErrorKind::InvalidPagination | ErrorKind::InvalidInput => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::ProductNotFound | ErrorKind::ReviewNotFound | ErrorKind::CategoryNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorKind::ForbiddenRole | ErrorKind::ForbiddenOwnership => StatusCode::FORBIDDEN,
        ErrorKind::DuplicateReview => StatusCode::CONFLICT,
        ErrorKind::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Failure body used by every route: `{"error": message, "kind": kind}`.
pub(crate) fn error_body(kind: impl fmt::Display, message: &str) -> Json<Value> {
    Json(json!({ "error": message, "kind": kind.to_string() }))
}

pub(crate) fn error_response(err: CatalogError) -> Response {
    let kind = err.kind();
    let body = match kind {
        // Driver details stay in the log.
        ErrorKind::StoreUnavailable => error_body(kind, "Internal server error"),
        _ => error_body(kind, &err.detail()),
    };
    to_response((status_for(kind), body), Err(ApiError::Catalog(err)))
}

/// Serializes a catalog result with `status` on success.
pub(crate) fn respond<T: Serialize>(status: StatusCode, result: Result<T, CatalogError>) -> Response {
    match result {
        Ok(value) => to_response((status, Json(value)), Ok(())),
        Err(err) => error_response(err),
    }
}

/// Success body for operations that return nothing.
pub(crate) fn respond_message(result: Result<(), CatalogError>, message: &str) -> Response {
    respond(StatusCode::OK, result.map(|_| json!({ "message": message })))
}
