use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{fmt, time::Instant};
use tracing::{error, info, warn};

use crate::catalog::CatalogError;

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    match response.extensions().get::<Result<(), ApiError>>() {
        Some(Ok(_)) => info!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request"
        ),
        Some(Err(value)) => error!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            value = %value,
            "Failed to process request"
        ),
        None => warn!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request, but no Response extension is set"
        ),
    }

    response
}

#[derive(Clone, Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    Unauthorized(String),
    Conflict(String),
    PasswordHashFailed(String),
    TokenGenerationFailed(String),
    DbError(String),
    ValidationFail(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Catalog(err) => write!(f, "{}: {}", err.kind(), err),
            ApiError::Unauthorized(value) => write!(f, "Unauthorized: {value}"),
            ApiError::Conflict(value) => write!(f, "Conflict: {value}"),
            ApiError::PasswordHashFailed(value) => write!(f, "Failed to hash password {value}"),
            ApiError::TokenGenerationFailed(value) => write!(f, "Failed to generate token: {value}"),
            ApiError::DbError(value) => write!(f, "Database error: {value}"),
            ApiError::ValidationFail(value) => write!(f, "Failed to validate: {value}"),
        }
    }
}

pub fn to_response<T: IntoResponse>(
    response: T,               //The response that we are sending + StatusCode
    ext: Result<(), ApiError>, //The extension, that we want to give logging middleware
) -> Response {
    let mut response = response.into_response();

    response.extensions_mut().insert(ext);

    response
}
