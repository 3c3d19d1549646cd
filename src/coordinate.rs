//! Parsing of delimited coordinate strings supplied in filter values.

use crate::error::{Result, RewriteError};
use spatio_rewrite_types::coordinate::Coordinate;

/// Separator between latitude and longitude in filter values.
pub const COORDINATE_SEPARATOR: char = ',';

/// Parse a `"latitude, longitude"` string.
///
/// Splits on a comma, trims both parts and parses each as a number. Range
/// checks are left to the codec, so `"200, 50"` parses fine and is rejected
/// when encoded.
///
/// # Examples
///
/// ```
/// use spatio_rewrite::coordinate::parse_coordinate;
///
/// let c = parse_coordinate(" 37.7749 ,-122.4194 ").unwrap();
/// assert_eq!(c.latitude(), 37.7749);
/// assert_eq!(c.longitude(), -122.4194);
///
/// assert!(parse_coordinate("not-a-number, 12").is_err());
/// ```
pub fn parse_coordinate(value: &str) -> Result<Coordinate> {
    let parts: Vec<&str> = value.split(COORDINATE_SEPARATOR).map(str::trim).collect();

    let [lat, lon] = parts.as_slice() else {
        return Err(RewriteError::MalformedCoordinateString {
            value: value.to_string(),
            reason: format!("expected 2 comma-separated parts, found {}", parts.len()),
        });
    };

    let latitude = parse_component(value, lat, "latitude")?;
    let longitude = parse_component(value, lon, "longitude")?;

    Ok(Coordinate::new(latitude, longitude))
}

fn parse_component(value: &str, part: &str, name: &str) -> Result<f64> {
    part.parse::<f64>()
        .map_err(|e| RewriteError::MalformedCoordinateString {
            value: value.to_string(),
            reason: format!("{} '{}' is not a number: {}", name, part, e),
        })
}
