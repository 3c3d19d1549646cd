//! # spatio-rewrite-types
//!
//! Data types shared by the Spatio query rewriter and its callers.
//!
//! - **Coordinate**: `Coordinate`, a latitude/longitude pair backed by `geo::Point`
//! - **Query types**: `Query`, `Filter`, `MemberFilter`, `FilterOperator`
//! - **Context**: `SecurityContext`, passed through untouched
//!
//! Query types serialize to the camelCase JSON used by the analytics engine,
//! so a query can be deserialized, rewritten and handed back without losing
//! fields the rewriter does not know about.
//!
//! ## Examples
//!
//! ```rust
//! use spatio_rewrite_types::coordinate::Coordinate;
//! use spatio_rewrite_types::query::{Filter, FilterOperator, Query};
//!
//! let sf = Coordinate::new(37.7749, -122.4194);
//! assert_eq!(sf.latitude(), 37.7749);
//!
//! let query = Query::new(vec![Filter::member(
//!     "Orders.location",
//!     FilterOperator::Equals,
//!     ["37.7749, -122.4194"],
//! )]);
//! assert_eq!(query.filters.len(), 1);
//! ```

pub mod coordinate;
pub mod query;
