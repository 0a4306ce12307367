//! Great-circle distances between catalog positions.

use geo::{Coord, Distance, Geodesic, Point};

/// Geodesic distance between two `(longitude, latitude)` coordinates in
/// kilometres, measured on the WGS84 ellipsoid.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use haven_matcher::geodesic_km;
///
/// let london = Coord { x: -0.1278, y: 51.5074 };
/// let paris = Coord { x: 2.3522, y: 48.8566 };
/// let km = geodesic_km(london, paris);
/// assert!((km - 344.0).abs() < 3.0);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "metre to kilometre conversion")]
pub fn geodesic_km(from: Coord<f64>, to: Coord<f64>) -> f64 {
    Geodesic.distance(Point::from(from), Point::from(to)) / 1000.0
}
