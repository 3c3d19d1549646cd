use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic coordinate with latitude and longitude in degrees.
///
/// Stored as a `geo::Point` with x = longitude and y = latitude, the same
/// axis order the rest of the `geo` ecosystem uses. Construction does not
/// validate ranges; the codec rejects out-of-range values when encoding.
///
/// # Examples
///
/// ```
/// use spatio_rewrite_types::coordinate::Coordinate;
///
/// let nyc = Coordinate::new(40.7128, -74.0060);
/// assert_eq!(nyc.latitude(), 40.7128);
/// assert_eq!(nyc.longitude(), -74.0060);
/// assert_eq!(nyc.point().x(), -74.0060);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    point: Point<f64>,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            point: Point::new(longitude, latitude),
        }
    }

    /// Create a coordinate from a `geo::Point` (x = longitude, y = latitude).
    pub fn from_point(point: Point<f64>) -> Self {
        Self { point }
    }

    pub fn latitude(&self) -> f64 {
        self.point.y()
    }

    pub fn longitude(&self) -> f64 {
        self.point.x()
    }

    /// Get the underlying point.
    pub fn point(&self) -> Point<f64> {
        self.point
    }

    /// Both components are finite and inside the legal degree ranges.
    pub fn is_valid(&self) -> bool {
        let (lat, lon) = (self.latitude(), self.longitude());
        lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon)
    }

    /// Great-circle distance to another coordinate in meters.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatio_rewrite_types::coordinate::Coordinate;
    ///
    /// let sf = Coordinate::new(37.7749, -122.4194);
    /// let oakland = Coordinate::new(37.8044, -122.2712);
    /// let meters = sf.haversine_distance(&oakland);
    /// assert!(meters > 10_000.0 && meters < 20_000.0);
    /// ```
    pub fn haversine_distance(&self, other: &Coordinate) -> f64 {
        Haversine.distance(self.point, other.point)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self::from_point(point)
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.point
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude(), self.longitude())
    }
}
