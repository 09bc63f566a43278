//! Great-circle distance and nearest-station selection.

/// Earth radius used for distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6373.0;

/// Error returned when a coordinate pair is out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinates ({lat}, {lon}): {reason}")]
pub struct InvalidPoint {
    lat: f64,
    lon: f64,
    reason: &'static str,
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    /// Build a point from trusted coordinates.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a point from user input, rejecting non-finite or out-of-range
    /// coordinates.
    pub fn parse(lat: f64, lon: f64) -> Result<Self, InvalidPoint> {
        let invalid = |reason| InvalidPoint { lat, lon, reason };

        if !lat.is_finite() || !lon.is_finite() {
            return Err(invalid("coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(invalid("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(invalid("longitude must be within [-180, 180]"));
        }

        Ok(Self { lat, lon })
    }

    /// Distance to `other` in kilometres.
    pub fn distance_km(&self, other: Point) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Haversine great-circle distance in kilometres between two points given
/// in degrees.
///
/// ```
/// use velo_server::geo::haversine_km;
///
/// assert_eq!(haversine_km(48.8566, 2.3522, 48.8566, 2.3522), 0.0);
///
/// // Rennes to Paris is a little over 300 km
/// let d = haversine_km(48.1173, -1.6778, 48.8566, 2.3522);
/// assert!((300.0..320.0).contains(&d));
/// ```
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );

    // Halved deltas are taken as absolute values so that swapping the
    // points yields bit-identical results.
    let half_dlat = ((lat2 - lat1) / 2.0).abs();
    let half_dlon = ((lon2 - lon1) / 2.0).abs();

    let d = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    2.0 * EARTH_RADIUS_KM * d.clamp(0.0, 1.0).sqrt().asin()
}

/// The closest item to a point.
#[derive(Debug)]
pub struct Nearest<'a, T> {
    pub item: &'a T,
    /// Position of `item` in the input slice.
    pub index: usize,
    pub distance_km: f64,
}

/// Find the item closest to `origin`.
///
/// Ties go to the earliest item. Items whose distance is not a number are
/// skipped. Returns `None` for an empty slice.
pub fn nearest<T>(
    items: &[T],
    origin: Point,
    position: impl Fn(&T) -> Point,
) -> Option<Nearest<'_, T>> {
    let mut best: Option<Nearest<'_, T>> = None;

    for (index, item) in items.iter().enumerate() {
        let distance_km = origin.distance_km(position(item));
        if distance_km.is_nan() {
            continue;
        }
        if best.as_ref().is_none_or(|b| distance_km < b.distance_km) {
            best = Some(Nearest {
                item,
                index,
                distance_km,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: Point = Point::new(48.8566, 2.3522);
    const RENNES: Point = Point::new(48.1173, -1.6778);
    const LYON: Point = Point::new(45.7640, 4.8357);

    #[test]
    fn coincident_points() {
        assert_eq!(haversine_km(48.8566, 2.3522, 48.8566, 2.3522), 0.0);
        assert_eq!(PARIS.distance_km(PARIS), 0.0);
    }

    #[test]
    fn known_distances() {
        // Paris to Lyon is about 392 km as the crow flies
        let d = PARIS.distance_km(LYON);
        assert!((390.0..395.0).contains(&d), "got {d}");

        // A quarter of the equator
        let d = haversine_km(0.0, 0.0, 0.0, 90.0);
        let expected = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_KM;
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn antipodes() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn parse_valid_points() {
        assert!(Point::parse(48.8566, 2.3522).is_ok());
        assert!(Point::parse(-90.0, -180.0).is_ok());
        assert!(Point::parse(90.0, 180.0).is_ok());
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert!(Point::parse(90.1, 0.0).is_err());
        assert!(Point::parse(0.0, -180.5).is_err());
        assert!(Point::parse(f64::NAN, 0.0).is_err());
        assert!(Point::parse(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn nearest_picks_minimum() {
        let cities = [("Paris", PARIS), ("Rennes", RENNES), ("Lyon", LYON)];
        let near_rennes = Point::new(48.11, -1.68);

        let found = nearest(&cities, near_rennes, |(_, p)| *p).unwrap();
        assert_eq!(found.item.0, "Rennes");
        assert_eq!(found.index, 1);
        assert!(found.distance_km < 1.0);
    }

    #[test]
    fn nearest_ties_go_to_first() {
        let points = [
            ("a", Point::new(1.0, 0.0)),
            ("b", Point::new(-1.0, 0.0)),
            ("c", Point::new(1.0, 0.0)),
        ];
        let found = nearest(&points, Point::new(0.0, 0.0), |(_, p)| *p).unwrap();
        assert_eq!(found.item.0, "a");
    }

    #[test]
    fn nearest_skips_nan() {
        let points = [Point::new(f64::NAN, 0.0), Point::new(10.0, 10.0)];
        let found = nearest(&points, Point::new(0.0, 0.0), |p| *p).unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn nearest_of_nothing() {
        let points: [Point; 0] = [];
        assert!(nearest(&points, PARIS, |p| *p).is_none());
    }
}
