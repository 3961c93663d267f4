//! Catalog core: product listing (filters, full-text ranking, pagination),
//! category and product maintenance, and reviews with rating aggregation.
//!
//! Every operation takes the store handle explicitly; mutating operations also
//! take the caller's [`Principal`].

pub mod access;
pub mod categories;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod products;
pub mod rating;
pub mod reviews;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

pub use access::{Capability, Principal};
pub use error::{CatalogError, ErrorKind};
pub use filter::ProductFilter;
pub use pagination::{Page, PageRequest};
pub use products::ProductQuery;
