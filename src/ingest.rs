//! Index column derivation for ingestion.
//!
//! Rows must carry the same buckets the rewriter produces at query time. This
//! module computes them from the same [`RewriteConfig`], so an ETL job and the
//! query hook cannot drift apart as long as they share one config.

use crate::codec::{CellCodec, CellIdentifier, ProximityBucket};
use crate::config::{JoinKeyRule, RewriteConfig};
use crate::coordinate::parse_coordinate;
use crate::error::{Result, RewriteError};
use crate::validation::validate_coordinates;
use spatio_rewrite_types::coordinate::Coordinate;

/// Computes index column values for raw coordinates.
///
/// # Examples
///
/// ```
/// use spatio_rewrite::{IndexColumns, RewriteConfig};
///
/// let columns = IndexColumns::new(&RewriteConfig::orders())?;
/// let row = columns.columns_for_str("37.7749, -122.4194")?;
///
/// assert_eq!(row[0].0, "Orders.h3_5");
/// assert_eq!(row[0].1.len(), 6);
/// assert_eq!(row[1].0, "h3_9");
/// assert_eq!(row[1].1.len(), 15);
/// # Ok::<(), spatio_rewrite::RewriteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IndexColumns {
    config: RewriteConfig,
    codec: CellCodec,
}

impl IndexColumns {
    pub fn new(config: &RewriteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            codec: CellCodec::new(config.scheme),
        })
    }

    /// Column names in the order [`columns_for`](Self::columns_for) yields them.
    pub fn column_names(&self) -> Vec<&str> {
        self.config
            .rules
            .iter()
            .map(|rule| rule.index_field.as_str())
            .chain(self.config.join_keys.iter().map(|key| key.column.as_str()))
            .collect()
    }

    /// Bucket columns for every rewrite rule, then identifier columns for
    /// every join key.
    pub fn columns_for(&self, coordinate: &Coordinate) -> Result<Vec<(String, String)>> {
        let mut columns = Vec::with_capacity(self.config.rules.len() + self.config.join_keys.len());

        for rule in &self.config.rules {
            let bucket = self.codec.bucket(coordinate, rule.resolution, rule.window())?;
            columns.push((rule.index_field.clone(), bucket.into_string()));
        }

        for join_key in &self.config.join_keys {
            let cell = self.codec.encode(coordinate, join_key.resolution)?;
            columns.push((join_key.column.clone(), cell.into_string()));
        }

        Ok(columns)
    }

    /// Same as [`columns_for`](Self::columns_for) for a `"lat, lon"` string.
    pub fn columns_for_str(&self, value: &str) -> Result<Vec<(String, String)>> {
        self.columns_for(&parse_coordinate(value)?)
    }

    /// Columns for a batch of rows. Fails before encoding anything if any
    /// coordinate is invalid.
    pub fn columns_for_all(
        &self,
        coordinates: &[Coordinate],
    ) -> Result<Vec<Vec<(String, String)>>> {
        validate_coordinates(coordinates)?;
        coordinates.iter().map(|c| self.columns_for(c)).collect()
    }

    /// Join key for a stored identifier of the join column `column`.
    pub fn join_key(&self, column: &str, identifier: &str) -> Result<ProximityBucket> {
        let rule = self.join_rule(column)?;
        let cell = CellIdentifier::parse(self.config.scheme, identifier)?;
        if cell.resolution() != rule.resolution {
            return Err(RewriteError::InvalidResolution {
                scheme: self.config.scheme,
                resolution: cell.resolution(),
                min: rule.resolution,
                max: rule.resolution,
            });
        }
        cell.truncate(rule.window())
    }

    /// Whether two coordinates fall into the same join bucket of `column`.
    ///
    /// Approximate: a `true` does not bound the distance between the points
    /// and neighbours across a bucket edge report `false`.
    pub fn is_nearby(&self, column: &str, a: &Coordinate, b: &Coordinate) -> Result<bool> {
        let rule = self.join_rule(column)?;
        let bucket_a = self.codec.bucket(a, rule.resolution, rule.window())?;
        let bucket_b = self.codec.bucket(b, rule.resolution, rule.window())?;
        Ok(bucket_a == bucket_b)
    }

    fn join_rule(&self, column: &str) -> Result<&JoinKeyRule> {
        self.config
            .join_keys
            .iter()
            .find(|key| key.column == column)
            .ok_or_else(|| {
                RewriteError::InvalidConfig(format!(
                    "No join key configured for column '{}'",
                    column
                ))
            })
    }
}
