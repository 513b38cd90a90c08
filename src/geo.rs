//! Great-circle distance

use crate::feeds::GeoPoint;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometers.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint { lat: 39.0, lon: 35.0 };
        assert!(distance_km(p, p) < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = GeoPoint { lat: 39.0, lon: 35.0 };
        let b = GeoPoint { lat: 40.0, lon: 35.0 };
        let d = distance_km(a, b);
        assert!((d - 111.19).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn symmetric() {
        let a = GeoPoint { lat: 39.0, lon: 35.0 };
        let b = GeoPoint { lat: 38.4, lon: 27.1 };
        let ab = distance_km(a, b);
        let ba = distance_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }
}
