//! Geographic value types and the geodesy capability the engine consumes

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A point on the globe in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True if both coordinates are finite and within [-90,90] x [-180,180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Reject out-of-range points before they reach the evaluator
    pub fn validated(self) -> Result<Self, EngineError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(EngineError::InvalidGuess {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// Great-circle math supplied by a collaborator.
///
/// Implementations must be deterministic: the same inputs always produce
/// bit-identical outputs, otherwise ladders stop being reproducible.
pub trait Geodesy {
    /// Distance between two points in meters
    fn distance(&self, a: GeoPoint, b: GeoPoint) -> f64;

    /// Point reached by travelling `distance_m` from `origin` on initial
    /// bearing `bearing_deg` (degrees clockwise from north)
    fn destination(&self, origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint;
}

/// Circular candidate area: "the answer is believed to lie in here"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl Region {
    pub const fn new(center: GeoPoint, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    /// North/east/south/west extents, for fitting a map view to the circle
    pub fn bounds(&self, geodesy: &dyn Geodesy) -> Bounds {
        Bounds {
            north: geodesy.destination(self.center, 0.0, self.radius_m).lat,
            east: geodesy.destination(self.center, 90.0, self.radius_m).lng,
            south: geodesy.destination(self.center, 180.0, self.radius_m).lat,
            west: geodesy.destination(self.center, 270.0, self.radius_m).lng,
        }
    }
}

/// Lat/lng bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl Bounds {
    /// Box centred on `center` that reaches out to `point` on every side,
    /// so a map fitted to it shows both
    pub fn mirrored(center: GeoPoint, point: GeoPoint) -> Self {
        let d_lat = (point.lat - center.lat).abs();
        let d_lng = (point.lng - center.lng).abs();
        Self {
            north: center.lat + d_lat,
            east: center.lng + d_lng,
            south: center.lat - d_lat,
            west: center.lng - d_lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::SphericalGeodesy;

    #[test]
    fn test_point_validation() {
        assert!(GeoPoint::new(59.95, 10.75).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.1).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_validated_reports_coordinates() {
        let err = GeoPoint::new(120.0, 5.0).validated().unwrap_err();
        match err {
            EngineError::InvalidGuess { lat, lng } => {
                assert_eq!(lat, 120.0);
                assert_eq!(lng, 5.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mirrored_bounds_center_on_answer() {
        let answer = GeoPoint::new(59.95, 10.75);
        let b = Bounds::mirrored(answer, GeoPoint::new(60.5, 10.5));
        assert!((b.north - 60.5).abs() < 1e-9);
        assert!((b.south - 59.4).abs() < 1e-9);
        assert!((b.east - 11.0).abs() < 1e-9);
        assert!((b.west - 10.5).abs() < 1e-9);

        // Same box whichever side the guess landed on
        let flipped = Bounds::mirrored(answer, GeoPoint::new(59.4, 11.0));
        assert!((b.north - flipped.north).abs() < 1e-9);
        assert!((b.west - flipped.west).abs() < 1e-9);
    }

    #[test]
    fn test_region_bounds_surround_center() {
        let geo = SphericalGeodesy::default();
        let region = Region::new(GeoPoint::new(59.95, 10.5), 600_000.0);
        let b = region.bounds(&geo);
        assert!(b.north > region.center.lat);
        assert!(b.south < region.center.lat);
        assert!(b.east > region.center.lng);
        assert!(b.west < region.center.lng);
        // ~5.4 degrees of latitude per 600 km
        assert!((b.north - region.center.lat - 5.39).abs() < 0.05);
    }
}
