use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

/// Enumerable failure kind, stable across the detail text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRange,
    InvalidPagination,
    InvalidInput,
    ProductNotFound,
    ReviewNotFound,
    CategoryNotFound,
    ForbiddenRole,
    ForbiddenOwnership,
    DuplicateReview,
    StoreUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::InvalidRange => "invalid_range",
            Self::InvalidPagination => "invalid_pagination",
            Self::InvalidInput => "invalid_input",
            Self::ProductNotFound => "product_not_found",
            Self::ReviewNotFound => "review_not_found",
            Self::CategoryNotFound => "category_not_found",
            Self::ForbiddenRole => "forbidden_role",
            Self::ForbiddenOwnership => "forbidden_ownership",
            Self::DuplicateReview => "duplicate_review",
            Self::StoreUnavailable => "store_unavailable",
        };
        f.write_str(value)
    }
}

#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Invalid price range: {0}")]
    InvalidRange(String),
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    ProductNotFound(String),
    #[error("{0}")]
    ReviewNotFound(String),
    #[error("{0}")]
    CategoryNotFound(String),
    #[error("{0}")]
    ForbiddenRole(String),
    #[error("{0}")]
    ForbiddenOwnership(String),
    #[error("{0}")]
    DuplicateReview(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRange(_) => ErrorKind::InvalidRange,
            Self::InvalidPagination(_) => ErrorKind::InvalidPagination,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ProductNotFound(_) => ErrorKind::ProductNotFound,
            Self::ReviewNotFound(_) => ErrorKind::ReviewNotFound,
            Self::CategoryNotFound(_) => ErrorKind::CategoryNotFound,
            Self::ForbiddenRole(_) => ErrorKind::ForbiddenRole,
            Self::ForbiddenOwnership(_) => ErrorKind::ForbiddenOwnership,
            Self::DuplicateReview(_) => ErrorKind::DuplicateReview,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }

    pub fn detail(&self) -> String {
        self.to_string()
    }

    pub(crate) fn product_not_found(id: i32) -> Self {
        Self::ProductNotFound(format!("No product with {id} id was found"))
    }

    pub(crate) fn category_not_found(id: i32) -> Self {
        Self::CategoryNotFound(format!("No category with {id} id was found"))
    }

    pub(crate) fn review_not_found(id: i32) -> Self {
        Self::ReviewNotFound(format!("No review with {id} id was found"))
    }
}

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        // The partial unique index on reviews is the only unique constraint a
        // catalog operation can trip.
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::DuplicateReview(format!(
                "You have already made a review about this product ({detail})"
            ));
        }
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        Self::InvalidInput(errors.to_string())
    }
}
