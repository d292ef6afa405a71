//! # Filtering, Ordering & Pagination
//!
//! List and export endpoints read their query string through this module.
//!
//! ## Filters
//!
//! Any key naming a column filters on it. A `__lookup` suffix picks the comparison:
//!
//! ```text
//! GET /posts?published=true
//! GET /posts?title__icontains=rust
//! GET /posts?views__gte=10&views__lt=100
//! GET /posts?author_id__in=1,2,3
//! GET /posts?body__isnull=true
//! ```
//!
//! Supported lookups: `exact`, `iexact`, `contains`, `icontains`, `startswith`,
//! `endswith`, `gt`, `gte`, `lt`, `lte`, `ne`, `in`, `isnull`. All filters are ANDed.
//!
//! ## Ordering
//!
//! ```text
//! GET /posts?order_by=published_desc,title
//! GET /posts?order_by=-views
//! ```
//!
//! ## Pagination
//!
//! `page` (1-based) and `size`, bounded by [`ApiConfig`](crate::ApiConfig).

pub mod conditions;
pub mod pagination;
pub mod sort;

pub use conditions::{Lookup, RESERVED_PARAMS, apply_filters};
pub use pagination::{Pageable, calculate_content_range, parse_pagination};
pub use sort::parse_order_by;
