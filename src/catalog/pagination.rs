use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::error::CatalogError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Validate)]
pub struct PageRequest {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: i64,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Validated window as `(offset, limit)`.
    pub fn window(&self) -> Result<(u64, u64), CatalogError> {
        self.validate()
            .map_err(|err| CatalogError::InvalidPagination(err.to_string()))?;

        let offset = (self.page - 1)
            .checked_mul(self.page_size)
            .ok_or_else(|| CatalogError::InvalidPagination(format!("page {} is out of range", self.page)))?;

        Ok((offset as u64, self.page_size as u64))
    }
}

/// One window of results plus the size of the filtered universe.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
