//! Hierarchical cell codec and query filter rewriter for proximity-bucketed analytics.
//!
//! Queries filtering a location member for equality with `"lat, lon"` strings
//! are rewritten to filter a precomputed bucket column instead, so records can
//! be grouped and joined by coarse spatial proximity.
//!
//! ```rust
//! use spatio_rewrite::prelude::*;
//!
//! let rewriter = RewriterBuilder::new()
//!     .map_field("Orders.location", "Orders.h3_5")
//!     .build()?;
//!
//! let query = Query::new(vec![
//!     Filter::member("Orders.location", FilterOperator::Equals, ["37.7749, -122.4194"]),
//!     Filter::member("Orders.title", FilterOperator::Equals, ["Widget"]),
//! ]);
//!
//! let rewritten = rewriter.rewrite(&query, &SecurityContext::anonymous())?;
//! assert_eq!(rewritten.member_filters()[0].member, "Orders.h3_5");
//! assert_eq!(rewritten.filters[1], query.filters[1]);
//! # Ok::<(), spatio_rewrite::RewriteError>(())
//! ```

pub mod builder;
pub mod codec;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod grid;
pub mod ingest;
pub mod rewriter;
pub mod validation;

pub use builder::RewriterBuilder;
pub use codec::{
    BucketWindow, CellCodec, CellIdentifier, JOIN_RESOLUTION, JOIN_WINDOW, ProximityBucket,
    REWRITE_RESOLUTION, REWRITE_WINDOW, canonical_len, encode, truncate_to_bucket,
};
pub use config::{JoinKeyRule, RewriteConfig, RewriteRule};
pub use coordinate::parse_coordinate;
pub use error::{Result, RewriteError};
pub use grid::GridScheme;
pub use ingest::IndexColumns;
pub use rewriter::{FilterRewriter, QueryRewrite};

pub use spatio_rewrite_types::coordinate::Coordinate;
pub use spatio_rewrite_types::query;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{FilterRewriter, QueryRewrite, Result, RewriteError, RewriterBuilder};

    pub use crate::{BucketWindow, CellCodec, CellIdentifier, Coordinate, GridScheme};

    pub use crate::{IndexColumns, JoinKeyRule, RewriteConfig, RewriteRule};

    pub use crate::query::{
        Filter, FilterOperator, MemberFilter, MemberKey, Query, SecurityContext,
    };
}
