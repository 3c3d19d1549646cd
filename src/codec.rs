//! Cell index codec: coordinate to cell identifier, identifier to proximity bucket.
//!
//! A canonical cell identifier is a two-character resolution header followed
//! by the grid scheme's body:
//!
//! ```text
//! h3:       8r hhhhhhhhhhhhh      the H3 index itself: mode digit, resolution digit, 13 hex digits
//! s2:       rr hhhhhhhhhhhhhhhh   2 hex digits of level + 16 hex digits of the S2 cell id
//! geohash:  rr gggg...            2 hex digits of length + the geohash itself
//! ```
//!
//! Offset 2 skips the header. With H3 the next characters are the base cell
//! and the coarsest aperture-7 digits; with S2 they are the cube face and the
//! coarsest quadtree digits. Cells sharing an ancestor share those leading
//! body characters, which is what makes fixed-window truncation usable as a
//! proximity bucket. Windows are only meaningful for the layout above;
//! switching schemes means re-deriving them (see [`canonical_len`]).

use crate::error::{Result, RewriteError};
use crate::grid::GridScheme;
use crate::validation::validate_coordinate;
use serde::{Deserialize, Serialize};
use spatio_rewrite_types::coordinate::Coordinate;
use std::fmt;

/// Width of the resolution header.
pub const HEADER_LEN: usize = 2;

/// Resolution used when rewriting coordinate-equality filters.
pub const REWRITE_RESOLUTION: u8 = 5;

/// Bucket window applied to rewrite-resolution identifiers.
pub const REWRITE_WINDOW: BucketWindow = BucketWindow::new(2, 6);

/// Resolution of the identifier columns used for proximity joins.
pub const JOIN_RESOLUTION: u8 = 9;

/// Bucket window applied to join-resolution identifiers.
pub const JOIN_WINDOW: BucketWindow = BucketWindow::new(0, 4);

/// Shortest fixed-width identifier, the H3 index.
const MIN_FIXED_CANONICAL_LEN: usize = 15;

const _: () = assert!(REWRITE_WINDOW.end() <= MIN_FIXED_CANONICAL_LEN);
const _: () = assert!(JOIN_WINDOW.end() <= MIN_FIXED_CANONICAL_LEN);

/// Length of every canonical identifier of `scheme` at `resolution`.
pub fn canonical_len(scheme: GridScheme, resolution: u8) -> usize {
    HEADER_LEN + scheme.body_len(resolution)
}

/// Character window `[offset, offset + length)` cut from an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketWindow {
    pub offset: usize,
    pub length: usize,
}

impl BucketWindow {
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Exclusive end of the window.
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Canonical identifier of one grid cell at one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellIdentifier {
    scheme: GridScheme,
    resolution: u8,
    token: String,
}

impl CellIdentifier {
    fn from_body(scheme: GridScheme, resolution: u8, body: &str) -> Self {
        Self {
            scheme,
            resolution,
            token: format!("{}{}", scheme.header(resolution), body),
        }
    }

    /// Parse a stored canonical identifier, checking header and body agree.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatio_rewrite::{CellCodec, CellIdentifier, Coordinate, GridScheme};
    ///
    /// let codec = CellCodec::new(GridScheme::H3);
    /// let cell = codec.encode(&Coordinate::new(37.7749, -122.4194), 9)?;
    ///
    /// let parsed = CellIdentifier::parse(GridScheme::H3, cell.as_str())?;
    /// assert_eq!(parsed, cell);
    /// assert!(CellIdentifier::parse(GridScheme::H3, "89zz").is_err());
    /// # Ok::<(), spatio_rewrite::RewriteError>(())
    /// ```
    pub fn parse(scheme: GridScheme, token: &str) -> Result<Self> {
        let malformed = |reason: &str| RewriteError::InvalidConfig(format!(
            "'{}' is not a canonical {} cell identifier: {}",
            token, scheme, reason
        ));

        let (header, body) = token
            .split_at_checked(HEADER_LEN)
            .ok_or_else(|| malformed("too short"))?;
        let resolution = scheme
            .header_resolution(header)
            .ok_or_else(|| malformed("bad resolution header"))?;
        scheme.validate_resolution(resolution)?;

        if !scheme.body_matches(resolution, body) {
            return Err(malformed("body does not match header resolution"));
        }

        Ok(Self::from_body(scheme, resolution, body))
    }

    pub fn scheme(&self) -> GridScheme {
        self.scheme
    }

    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// The scheme-specific part after the header.
    pub fn body(&self) -> &str {
        &self.token[HEADER_LEN..]
    }

    pub fn into_string(self) -> String {
        self.token
    }

    /// Ancestor of this cell at a coarser (or equal) resolution.
    pub fn parent(&self, resolution: u8) -> Result<CellIdentifier> {
        self.scheme.validate_resolution(resolution)?;
        if resolution > self.resolution {
            return Err(RewriteError::InvalidResolution {
                scheme: self.scheme,
                resolution,
                min: *self.scheme.resolution_range().start(),
                max: self.resolution,
            });
        }

        let body = self
            .scheme
            .parent_body(self.resolution, self.body(), resolution)
            .ok_or_else(|| RewriteError::InvalidConfig(format!(
                "cannot derive parent of '{}'",
                self.token
            )))?;
        Ok(Self::from_body(self.scheme, resolution, &body))
    }

    /// Cut a proximity bucket out of this identifier.
    pub fn truncate(&self, window: BucketWindow) -> Result<ProximityBucket> {
        truncate_to_bucket(self, window.offset, window.length)
    }
}

impl fmt::Display for CellIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl AsRef<str> for CellIdentifier {
    fn as_ref(&self) -> &str {
        &self.token
    }
}

/// Coarse grouping key cut from a cell identifier.
///
/// Equal buckets mean "nearby" for join purposes only. Points on either side
/// of a bucket edge can be metres apart and still get different buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProximityBucket(String);

impl ProximityBucket {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ProximityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ProximityBucket> for String {
    fn from(bucket: ProximityBucket) -> Self {
        bucket.0
    }
}

/// Encodes coordinates into cell identifiers for one grid scheme.
///
/// Holds no state besides the scheme; share freely across threads.
///
/// # Examples
///
/// ```
/// use spatio_rewrite::{CellCodec, Coordinate, GridScheme, REWRITE_WINDOW};
///
/// let codec = CellCodec::new(GridScheme::H3);
/// let sf = Coordinate::new(37.7749, -122.4194);
///
/// let cell = codec.encode(&sf, 5)?;
/// assert_eq!(cell.as_str().len(), 15);
/// assert!(cell.as_str().starts_with("85"));
///
/// let bucket = codec.bucket(&sf, 5, REWRITE_WINDOW)?;
/// assert_eq!(bucket.len(), 6);
/// # Ok::<(), spatio_rewrite::RewriteError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellCodec {
    scheme: GridScheme,
}

impl CellCodec {
    pub fn new(scheme: GridScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> GridScheme {
        self.scheme
    }

    /// Encode a coordinate at `resolution`.
    pub fn encode(&self, coordinate: &Coordinate, resolution: u8) -> Result<CellIdentifier> {
        validate_coordinate(coordinate)?;
        self.scheme.validate_resolution(resolution)?;

        let body = self.scheme.encode_body(coordinate, resolution)?;
        Ok(CellIdentifier::from_body(self.scheme, resolution, &body))
    }

    /// Encode and truncate in one step.
    pub fn bucket(
        &self,
        coordinate: &Coordinate,
        resolution: u8,
        window: BucketWindow,
    ) -> Result<ProximityBucket> {
        self.encode(coordinate, resolution)?.truncate(window)
    }

    pub fn canonical_len(&self, resolution: u8) -> usize {
        canonical_len(self.scheme, resolution)
    }
}

/// Encode a coordinate on the default H3 grid.
pub fn encode(coordinate: &Coordinate, resolution: u8) -> Result<CellIdentifier> {
    CellCodec::default().encode(coordinate, resolution)
}

/// Extract `length` characters starting at `offset` from a cell identifier.
///
/// # Examples
///
/// ```
/// use spatio_rewrite::codec::{encode, truncate_to_bucket};
/// use spatio_rewrite::Coordinate;
///
/// let cell = encode(&Coordinate::new(37.7749, -122.4194), 5)?;
/// let bucket = truncate_to_bucket(&cell, 2, 6)?;
/// assert_eq!(bucket.as_str(), &cell.as_str()[2..8]);
///
/// assert!(truncate_to_bucket(&cell, 12, 6).is_err());
/// # Ok::<(), spatio_rewrite::RewriteError>(())
/// ```
pub fn truncate_to_bucket(
    cell: &CellIdentifier,
    offset: usize,
    length: usize,
) -> Result<ProximityBucket> {
    let token = cell.as_str();
    offset
        .checked_add(length)
        .and_then(|end| token.get(offset..end))
        .map(|slice| ProximityBucket(slice.to_string()))
        .ok_or(RewriteError::TruncationRangeError {
            offset,
            length,
            available: token.len(),
        })
}
