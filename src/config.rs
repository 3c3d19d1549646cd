//! Rewrite configuration: which coordinate fields map to which index columns.
//!
//! Ingestion and query rewriting must read the same configuration. A bucket
//! computed with a different scheme, resolution or window than the one stored
//! in the index column silently matches nothing.

use crate::codec::{
    BucketWindow, JOIN_RESOLUTION, JOIN_WINDOW, REWRITE_RESOLUTION, REWRITE_WINDOW,
};
use crate::error::{Result, RewriteError};
use crate::grid::GridScheme;
use crate::validation::validate_window;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Maps a coordinate member to the bucket column its equality filters use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RewriteRule {
    /// Member holding raw `"lat, lon"` strings, e.g. `Orders.location`.
    pub coordinate_field: String,
    /// Member holding precomputed buckets, e.g. `Orders.h3_5`.
    pub index_field: String,
    #[serde(default = "RewriteRule::default_resolution")]
    pub resolution: u8,
    #[serde(default = "RewriteRule::default_offset")]
    pub truncate_offset: usize,
    #[serde(default = "RewriteRule::default_length")]
    pub truncate_length: usize,
}

impl RewriteRule {
    const fn default_resolution() -> u8 {
        REWRITE_RESOLUTION
    }

    const fn default_offset() -> usize {
        REWRITE_WINDOW.offset
    }

    const fn default_length() -> usize {
        REWRITE_WINDOW.length
    }

    /// Rule with the default rewrite resolution and window.
    pub fn new<C: Into<String>, I: Into<String>>(coordinate_field: C, index_field: I) -> Self {
        Self {
            coordinate_field: coordinate_field.into(),
            index_field: index_field.into(),
            resolution: Self::default_resolution(),
            truncate_offset: Self::default_offset(),
            truncate_length: Self::default_length(),
        }
    }

    pub fn with_resolution(mut self, resolution: u8) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_window(mut self, window: BucketWindow) -> Self {
        self.truncate_offset = window.offset;
        self.truncate_length = window.length;
        self
    }

    pub fn window(&self) -> BucketWindow {
        BucketWindow::new(self.truncate_offset, self.truncate_length)
    }

    pub fn validate(&self, scheme: GridScheme) -> Result<()> {
        if self.coordinate_field.trim().is_empty() || self.index_field.trim().is_empty() {
            return Err(RewriteError::InvalidConfig(
                "Rewrite rule field names cannot be empty".into(),
            ));
        }
        if self.coordinate_field == self.index_field {
            return Err(RewriteError::InvalidConfig(format!(
                "Rewrite rule for '{}' cannot target itself",
                self.coordinate_field
            )));
        }
        if self.truncate_length == 0 {
            return Err(RewriteError::InvalidConfig(format!(
                "Rewrite rule for '{}' has an empty truncation window",
                self.coordinate_field
            )));
        }
        validate_window(scheme, self.resolution, self.window())
    }
}

/// Identifier column used for approximate proximity joins.
///
/// The column stores full identifiers at `resolution`; the join compares the
/// `truncate_offset`/`truncate_length` window of both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JoinKeyRule {
    /// Column name, e.g. `h3_9`.
    pub column: String,
    #[serde(default = "JoinKeyRule::default_resolution")]
    pub resolution: u8,
    #[serde(default = "JoinKeyRule::default_offset")]
    pub truncate_offset: usize,
    #[serde(default = "JoinKeyRule::default_length")]
    pub truncate_length: usize,
}

impl JoinKeyRule {
    const fn default_resolution() -> u8 {
        JOIN_RESOLUTION
    }

    const fn default_offset() -> usize {
        JOIN_WINDOW.offset
    }

    const fn default_length() -> usize {
        JOIN_WINDOW.length
    }

    pub fn new<C: Into<String>>(column: C) -> Self {
        Self {
            column: column.into(),
            resolution: Self::default_resolution(),
            truncate_offset: Self::default_offset(),
            truncate_length: Self::default_length(),
        }
    }

    pub fn with_resolution(mut self, resolution: u8) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_window(mut self, window: BucketWindow) -> Self {
        self.truncate_offset = window.offset;
        self.truncate_length = window.length;
        self
    }

    pub fn window(&self) -> BucketWindow {
        BucketWindow::new(self.truncate_offset, self.truncate_length)
    }

    pub fn validate(&self, scheme: GridScheme) -> Result<()> {
        if self.column.trim().is_empty() {
            return Err(RewriteError::InvalidConfig(
                "Join key column name cannot be empty".into(),
            ));
        }
        if self.truncate_length == 0 {
            return Err(RewriteError::InvalidConfig(format!(
                "Join key '{}' has an empty truncation window",
                self.column
            )));
        }
        validate_window(scheme, self.resolution, self.window())
    }
}

/// Complete rewrite configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RewriteConfig {
    #[serde(default)]
    pub scheme: GridScheme,

    #[serde(default)]
    pub rules: Vec<RewriteRule>,

    #[serde(default)]
    pub join_keys: Vec<JoinKeyRule>,
}

impl RewriteConfig {
    /// Empty configuration on the default grid.
    pub fn new() -> Self {
        Self {
            scheme: GridScheme::default(),
            rules: Vec::new(),
            join_keys: Vec::new(),
        }
    }

    /// The orders/vendors mapping on H3: `Orders.location` rewrites to the
    /// resolution-5 bucket column `Orders.h3_5` and vendors join on `h3_9`.
    pub fn orders() -> Self {
        Self::new()
            .with_rule(RewriteRule::new("Orders.location", "Orders.h3_5"))
            .with_join_key(JoinKeyRule::new("h3_9"))
    }

    pub fn with_scheme(mut self, scheme: GridScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_rule(mut self, rule: RewriteRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_join_key(mut self, join_key: JoinKeyRule) -> Self {
        self.join_keys.push(join_key);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut coordinate_fields = FxHashSet::default();
        for rule in &self.rules {
            rule.validate(self.scheme)?;
            if !coordinate_fields.insert(rule.coordinate_field.as_str()) {
                return Err(RewriteError::InvalidConfig(format!(
                    "Duplicate rewrite rule for '{}'",
                    rule.coordinate_field
                )));
            }
        }

        let mut columns = FxHashSet::default();
        for join_key in &self.join_keys {
            join_key.validate(self.scheme)?;
            if !columns.insert(join_key.column.as_str()) {
                return Err(RewriteError::InvalidConfig(format!(
                    "Duplicate join key column '{}'",
                    join_key.column
                )));
            }
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: RewriteConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: RewriteConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RewriteError::ConfigParse(e.to_string()))
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self::orders()
    }
}
