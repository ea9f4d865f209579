use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the distance filter.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Great-circle distance between two points in miles (haversine formula).
#[must_use]
pub fn haversine_miles(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const KATY: GeoPoint = GeoPoint {
        lat: 29.7858,
        lng: -95.8244,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert!(haversine_miles(KATY, KATY).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let houston = GeoPoint {
            lat: 29.7604,
            lng: -95.3698,
        };
        let there = haversine_miles(KATY, houston);
        let back = haversine_miles(houston, KATY);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn katy_to_downtown_houston_is_about_27_miles() {
        let houston = GeoPoint {
            lat: 29.7604,
            lng: -95.3698,
        };
        let miles = haversine_miles(KATY, houston);
        assert!((26.0..29.0).contains(&miles), "got {miles}");
    }

    #[test]
    fn one_degree_of_latitude_matches_arc_length() {
        let north = GeoPoint {
            lat: KATY.lat + 1.0,
            lng: KATY.lng,
        };
        let expected = EARTH_RADIUS_MILES * 1.0_f64.to_radians();
        assert!((haversine_miles(KATY, north) - expected).abs() < 1e-6);
    }
}
