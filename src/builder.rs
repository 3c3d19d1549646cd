//! Rewriter builder for flexible configuration
//!
//! Collects a grid scheme, rewrite rules and join keys, validates them once
//! and produces a [`FilterRewriter`].

use crate::config::{JoinKeyRule, RewriteConfig, RewriteRule};
use crate::error::Result;
use crate::grid::GridScheme;
use crate::ingest::IndexColumns;
use crate::rewriter::FilterRewriter;

/// Builder for a [`FilterRewriter`] and its matching [`IndexColumns`].
#[derive(Debug, Clone)]
pub struct RewriterBuilder {
    config: RewriteConfig,
}

impl RewriterBuilder {
    /// Create a builder with no rules on the default grid.
    pub fn new() -> Self {
        Self {
            config: RewriteConfig::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: RewriteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scheme(mut self, scheme: GridScheme) -> Self {
        self.config.scheme = scheme;
        self
    }

    /// Add a rewrite rule.
    pub fn rule(mut self, rule: RewriteRule) -> Self {
        self.config.rules.push(rule);
        self
    }

    /// Map `coordinate_field` to `index_field` with the default resolution and window.
    pub fn map_field<C, I>(self, coordinate_field: C, index_field: I) -> Self
    where
        C: Into<String>,
        I: Into<String>,
    {
        self.rule(RewriteRule::new(coordinate_field, index_field))
    }

    /// Add a join key column.
    pub fn join_key(mut self, join_key: JoinKeyRule) -> Self {
        self.config.join_keys.push(join_key);
        self
    }

    /// Build the rewriter. Fails if the configuration is inconsistent.
    pub fn build(self) -> Result<FilterRewriter> {
        FilterRewriter::new(self.config)
    }

    /// Build the rewriter together with the ingestion columns for the same
    /// configuration.
    pub fn build_with_columns(self) -> Result<(FilterRewriter, IndexColumns)> {
        let columns = IndexColumns::new(&self.config)?;
        let rewriter = FilterRewriter::new(self.config)?;
        Ok((rewriter, columns))
    }
}

impl Default for RewriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
