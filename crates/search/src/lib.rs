//! Filtering, sorting and pagination for the Seoul services list.
//!
//! This crate provides:
//! - Category filtering where an empty selection means "show nothing"
//! - Distance, name and date ordering, all stable
//! - Korean-aware name collation
//! - Prefix pagination and the list view state that ties it together

mod collation;
mod error;
mod paginate;
mod sort;

#[cfg(feature = "wasm")]
mod wasm;

pub use collation::korean_cmp;
pub use error::{Result, SearchError};
pub use paginate::{ListView, Paginator, DEFAULT_PAGE_SIZE};
pub use seoul_services_catalog::CategorySet;
pub use sort::{compare_date, filter_and_sort, SortBy};
