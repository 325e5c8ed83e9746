use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Mean earth radius used by every distance in the engine, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude pair in degrees.
///
/// Equality is exact: two points are the same place only when both
/// components compare equal. Use [`PointKey`] when a point has to index a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn key(&self) -> PointKey {
        PointKey(OrderedFloat(self.lat), OrderedFloat(self.lon))
    }
}

/// Hashable form of a [`Point`]. Agrees with `Point`'s exact equality for
/// every non-NaN coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey(OrderedFloat<f64>, OrderedFloat<f64>);

impl From<PointKey> for Point {
    fn from(key: PointKey) -> Self {
        Point::new(key.0.into_inner(), key.1.into_inner())
    }
}

// geo_types stores x = longitude, y = latitude
impl From<Point> for geo_types::Point<f64> {
    fn from(p: Point) -> Self {
        geo_types::Point::new(p.lon, p.lat)
    }
}

impl From<geo_types::Point<f64>> for Point {
    fn from(p: geo_types::Point<f64>) -> Self {
        Point::new(p.y(), p.x())
    }
}

/// Haversine distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`].
///
/// Identical points return exactly 0. Antipodal points stay finite because
/// `a` is clamped into `[0, 1]` before the square roots.
pub fn haversine_km(start: &Point, end: &Point) -> f64 {
    let lat1 = start.lat.to_radians();
    let lat2 = end.lat.to_radians();
    let d_lat = (end.lat - start.lat).to_radians();
    let d_lon = (end.lon - start.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
