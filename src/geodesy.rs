//! Default geodesy provider: a perfect sphere
//!
//! Uses the same earth radius as the Google Maps spherical geometry library,
//! so distances agree with what a map view built on it shows the player.

use crate::puzzle::{GeoPoint, Geodesy};

/// WGS84 equatorial radius in meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy)]
pub struct SphericalGeodesy {
    pub radius_m: f64,
}

impl Default for SphericalGeodesy {
    fn default() -> Self {
        Self {
            radius_m: EARTH_RADIUS_M,
        }
    }
}

impl Geodesy for SphericalGeodesy {
    /// Haversine great-circle distance
    fn distance(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        let lat1 = a.lat.to_radians();
        let lat2 = b.lat.to_radians();
        let d_lat = lat2 - lat1;
        let d_lng = (b.lng - a.lng).to_radians();

        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * self.radius_m * h.sqrt().min(1.0).asin()
    }

    fn destination(&self, origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        let delta = distance_m / self.radius_m;
        let theta = bearing_deg.to_radians();
        let lat1 = origin.lat.to_radians();
        let lng1 = origin.lng.to_radians();

        let sin_lat2 = lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos();
        let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
        let lng2 = lng1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * sin_lat2);

        GeoPoint::new(lat2.to_degrees(), normalize_lng(lng2.to_degrees()))
    }
}

/// Wrap a longitude into [-180, 180)
#[inline]
pub fn normalize_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}
