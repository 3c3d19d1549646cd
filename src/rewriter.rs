//! Filter rewriter turning coordinate-equality filters into bucket-equality filters.
//!
//! For every member filter whose member is a configured coordinate field and
//! whose operator is `equals`, the member becomes the rule's index field and
//! each `"lat, lon"` value becomes the proximity bucket of that coordinate.
//! Everything else in the query is copied unchanged.
//!
//! Rewriting never mutates the caller's query. Either every matching filter
//! is rewritten and a new query is returned, or an error is returned and no
//! query exists to execute.

use crate::codec::{CellCodec, ProximityBucket};
use crate::config::{RewriteConfig, RewriteRule};
use crate::coordinate::parse_coordinate;
use crate::error::Result;
use rustc_hash::FxHashMap;
use spatio_rewrite_types::query::{Filter, FilterOperator, MemberFilter, Query, SecurityContext};

/// Hook the analytics engine calls before executing a query.
pub trait QueryRewrite: Send + Sync {
    /// Return the query to execute, or an error if it must be rejected.
    fn rewrite(&self, query: &Query, context: &SecurityContext) -> Result<Query>;
}

/// Rewrites coordinate-equality filters according to a [`RewriteConfig`].
///
/// # Examples
///
/// ```
/// use spatio_rewrite::{FilterRewriter, QueryRewrite, RewriteConfig};
/// use spatio_rewrite::query::{Filter, FilterOperator, Query, SecurityContext};
///
/// let rewriter = FilterRewriter::new(RewriteConfig::orders())?;
/// let query = Query::new(vec![Filter::member(
///     "Orders.location",
///     FilterOperator::Equals,
///     ["37.7749, -122.4194"],
/// )]);
///
/// let rewritten = rewriter.rewrite(&query, &SecurityContext::anonymous())?;
/// let filter = rewritten.member_filters()[0];
/// assert_eq!(filter.member, "Orders.h3_5");
/// assert_eq!(filter.values[0].len(), 6);
/// # Ok::<(), spatio_rewrite::RewriteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FilterRewriter {
    config: RewriteConfig,
    codec: CellCodec,
    rules: FxHashMap<String, RewriteRule>,
}

impl FilterRewriter {
    /// Validate `config` and build a rewriter from it.
    pub fn new(config: RewriteConfig) -> Result<Self> {
        config.validate()?;

        let rules = config
            .rules
            .iter()
            .map(|rule| (rule.coordinate_field.clone(), rule.clone()))
            .collect();

        Ok(Self {
            codec: CellCodec::new(config.scheme),
            config,
            rules,
        })
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    pub fn codec(&self) -> CellCodec {
        self.codec
    }

    /// Rule applying to equality filters on `member`, if any.
    pub fn rule_for(&self, member: &str) -> Option<&RewriteRule> {
        self.rules.get(member)
    }

    /// Bucket a single `"lat, lon"` filter value under `rule`.
    pub fn bucket_for_value(&self, rule: &RewriteRule, value: &str) -> Result<ProximityBucket> {
        let coordinate = parse_coordinate(value)?;
        self.codec.bucket(&coordinate, rule.resolution, rule.window())
    }

    /// Rewrite `query` into a new query. The input is left untouched.
    pub fn rewrite_query(&self, query: &Query) -> Result<Query> {
        log::debug!("Query before rewrite: {:?}", query);

        let filters = query
            .filters
            .iter()
            .map(|filter| self.rewrite_filter(filter))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| log::debug!("Rejecting query rewrite: {}", e))?;

        let rewritten = Query {
            filters,
            other: query.other.clone(),
        };

        log::debug!("Query after rewrite: {:?}", rewritten);
        Ok(rewritten)
    }

    fn rewrite_filter(&self, filter: &Filter) -> Result<Filter> {
        match filter {
            Filter::Member(member) => self.rewrite_member(member).map(Filter::Member),
            Filter::And { and } => Ok(Filter::And {
                and: self.rewrite_children(and)?,
            }),
            Filter::Or { or } => Ok(Filter::Or {
                or: self.rewrite_children(or)?,
            }),
        }
    }

    fn rewrite_children(&self, children: &[Filter]) -> Result<Vec<Filter>> {
        children
            .iter()
            .map(|child| self.rewrite_filter(child))
            .collect()
    }

    fn rewrite_member(&self, filter: &MemberFilter) -> Result<MemberFilter> {
        let rule = match self.rules.get(&filter.member) {
            Some(rule) if filter.operator == FilterOperator::Equals => rule,
            _ => return Ok(filter.clone()),
        };

        let values = filter
            .values
            .iter()
            .map(|value| {
                self.bucket_for_value(rule, value)
                    .map(ProximityBucket::into_string)
            })
            .collect::<Result<Vec<_>>>()?;

        log::trace!(
            "Rewrote {} -> {} ({} values)",
            filter.member,
            rule.index_field,
            values.len()
        );

        Ok(MemberFilter {
            member: rule.index_field.clone(),
            values,
            ..filter.clone()
        })
    }
}

impl QueryRewrite for FilterRewriter {
    fn rewrite(&self, query: &Query, _context: &SecurityContext) -> Result<Query> {
        self.rewrite_query(query)
    }
}
