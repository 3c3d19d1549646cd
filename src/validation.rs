//! Validation for coordinates and truncation windows.

use crate::codec::{BucketWindow, canonical_len};
use crate::error::{Result, RewriteError};
use crate::grid::GridScheme;
use spatio_rewrite_types::coordinate::Coordinate;

/// Validates a coordinate has finite latitude and longitude inside legal ranges.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
///
/// # Examples
///
/// ```
/// use spatio_rewrite::validation::validate_coordinate;
/// use spatio_rewrite::Coordinate;
///
/// let sf = Coordinate::new(37.7749, -122.4194);
/// assert!(validate_coordinate(&sf).is_ok());
///
/// // Latitude out of range
/// let invalid = Coordinate::new(200.0, 50.0);
/// assert!(validate_coordinate(&invalid).is_err());
/// ```
pub fn validate_coordinate(coordinate: &Coordinate) -> Result<()> {
    let (lat, lon) = (coordinate.latitude(), coordinate.longitude());

    let reason = if !lat.is_finite() {
        format!("Latitude must be finite, got: {}", lat)
    } else if !lon.is_finite() {
        format!("Longitude must be finite, got: {}", lon)
    } else if !(-90.0..=90.0).contains(&lat) {
        format!("Latitude out of range [-90.0, 90.0]: {}", lat)
    } else if !(-180.0..=180.0).contains(&lon) {
        format!("Longitude out of range [-180.0, 180.0]: {}", lon)
    } else {
        return Ok(());
    };

    Err(RewriteError::InvalidCoordinate {
        latitude: lat,
        longitude: lon,
        reason,
    })
}

/// Validates multiple coordinates, reporting the index of the first bad one.
pub fn validate_coordinates(coordinates: &[Coordinate]) -> Result<()> {
    for (idx, coordinate) in coordinates.iter().enumerate() {
        validate_coordinate(coordinate).map_err(|e| match e {
            RewriteError::InvalidCoordinate {
                latitude,
                longitude,
                reason,
            } => RewriteError::InvalidCoordinate {
                latitude,
                longitude,
                reason: format!("Coordinate at index {}: {}", idx, reason),
            },
            other => other,
        })?;
    }
    Ok(())
}

/// Validates that `window` fits every identifier produced at `resolution`.
///
/// Identifiers have a fixed length per (scheme, resolution), so checking the
/// window once here means truncation of encoded identifiers cannot fail later.
///
/// # Examples
///
/// ```
/// use spatio_rewrite::validation::validate_window;
/// use spatio_rewrite::{BucketWindow, GridScheme};
///
/// assert!(validate_window(GridScheme::H3, 5, BucketWindow::new(2, 6)).is_ok());
///
/// // A resolution-5 geohash identifier is only 7 characters long
/// assert!(validate_window(GridScheme::Geohash, 5, BucketWindow::new(2, 6)).is_err());
/// ```
pub fn validate_window(scheme: GridScheme, resolution: u8, window: BucketWindow) -> Result<()> {
    scheme.validate_resolution(resolution)?;

    let available = canonical_len(scheme, resolution);
    match window.offset.checked_add(window.length) {
        Some(end) if end <= available => Ok(()),
        _ => Err(RewriteError::TruncationRangeError {
            offset: window.offset,
            length: window.length,
            available,
        }),
    }
}
