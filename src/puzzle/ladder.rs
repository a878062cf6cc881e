//! Region ladder generation
//!
//! Rung 0 is a fixed world-scale circle. Every later rung shrinks the radius
//! (`r' = r ^ decay`) and re-centres the circle at a seeded random offset from
//! the answer, so nested circles wobble around the target instead of zooming
//! in concentrically.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geo::{GeoPoint, Geodesy, Region};
use crate::settings::LadderSettings;

/// Seeded generator owned by a single ladder build.
///
/// The string seed is hashed with BLAKE3 so the stream is identical on every
/// platform and independent of any other RNG in the program.
pub struct LadderRng {
    rng: Pcg32,
}

impl LadderRng {
    pub fn from_seed_str(seed: &str) -> Self {
        let digest = blake3::hash(seed.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest.as_bytes()[..16]);
        Self {
            rng: Pcg32::from_seed(bytes),
        }
    }

    /// Uniform draw in [0, 1)
    pub fn draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Ordered rungs, strictly decreasing in radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionLadder {
    rungs: Vec<Region>,
}

impl RegionLadder {
    pub fn get(&self, index: usize) -> Option<&Region> {
        self.rungs.get(index)
    }

    /// Rung at `index`, or the smallest rung if `index` runs past the end
    pub fn at_or_last(&self, index: usize) -> &Region {
        &self.rungs[index.min(self.last_index())]
    }

    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    /// Never true: rung 0 always exists
    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.rungs.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.rungs.iter()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.rungs
    }

    /// Rungs whose circle does not contain the answer (data-quality check)
    pub fn misses(&self, geodesy: &dyn Geodesy, answer: GeoPoint) -> Vec<usize> {
        self.rungs
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, r)| geodesy.distance(r.center, answer) > r.radius_m)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Build the day's ladder.
///
/// Stops once a radius drops below the floor (that rung is still kept) or the
/// ladder holds `max_rungs` entries, whichever comes first.
pub fn build_ladder(
    answer: GeoPoint,
    seed: &str,
    settings: &LadderSettings,
    max_rungs: usize,
    geodesy: &dyn Geodesy,
) -> RegionLadder {
    let mut rng = LadderRng::from_seed_str(seed);
    let mut rungs = vec![Region::new(settings.world_center, settings.world_radius_m)];

    let mut radius = settings.world_radius_m;
    while radius >= settings.radius_floor_m && rungs.len() < max_rungs {
        radius = radius.powf(settings.decay_exponent);

        // sqrt keeps the offset uniform over the disc's area
        let offset = radius * (rng.draw() * settings.jitter_scale).sqrt();
        let bearing = rng.draw() * 360.0;
        let center = geodesy.destination(answer, bearing, offset);

        rungs.push(Region::new(center, radius));
    }

    log::debug!(
        "Built {}-rung ladder for seed {:?} (smallest radius {:.1} m)",
        rungs.len(),
        seed,
        radius
    );

    RegionLadder { rungs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::SphericalGeodesy;
    use proptest::prelude::*;

    const ANSWER: GeoPoint = GeoPoint::new(59.95, 10.75);

    fn ladder(answer: GeoPoint, seed: &str) -> RegionLadder {
        build_ladder(
            answer,
            seed,
            &LadderSettings::default(),
            6,
            &SphericalGeodesy::default(),
        )
    }

    #[test]
    fn test_rng_is_reproducible() {
        let mut a = LadderRng::from_seed_str("100circles");
        let mut b = LadderRng::from_seed_str("100circles");
        let mut c = LadderRng::from_seed_str("101circles");
        let xs: Vec<f64> = (0..8).map(|_| a.draw()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.draw()).collect();
        let zs: Vec<f64> = (0..8).map(|_| c.draw()).collect();
        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
        assert!(xs.iter().all(|x| (0.0..1.0).contains(x)));
    }

    #[test]
    fn test_first_rung_is_world() {
        let l = ladder(ANSWER, "100circles");
        let world = l.get(0).unwrap();
        assert_eq!(world.center, GeoPoint::new(59.95, 10.5));
        assert_eq!(world.radius_m, 600_000.0);
    }

    #[test]
    fn test_canonical_radii() {
        let l = ladder(ANSWER, "100circles");
        let radii: Vec<f64> = l.iter().map(|r| r.radius_m).collect();
        // 600000 -> ~21558 -> ~1779 -> ~274 -> ~67.3 -> ~23.5 (below floor, kept)
        assert_eq!(radii.len(), 6);
        assert!((radii[1] - 21_558.0).abs() < 5.0, "{radii:?}");
        assert!((radii[2] - 1_779.0).abs() < 5.0, "{radii:?}");
        assert!(radii[5] < 25.0);
    }

    #[test]
    fn test_stops_at_floor_before_cap() {
        let l = build_ladder(
            ANSWER,
            "1circles",
            &LadderSettings::default(),
            50,
            &SphericalGeodesy::default(),
        );
        assert_eq!(l.len(), 6);
        assert!(l.as_slice()[l.last_index()].radius_m < 25.0);
    }

    #[test]
    fn test_stops_at_cap_before_floor() {
        let settings = LadderSettings {
            decay_exponent: 0.95,
            ..LadderSettings::default()
        };
        let l = build_ladder(ANSWER, "1circles", &settings, 6, &SphericalGeodesy::default());
        assert_eq!(l.len(), 6);
        assert!(l.as_slice()[5].radius_m > 25.0);
    }

    #[test]
    fn test_at_or_last() {
        let l = ladder(ANSWER, "3circles");
        assert_eq!(l.at_or_last(99), &l.as_slice()[l.last_index()]);
        assert_eq!(l.at_or_last(1), &l.as_slice()[1]);
    }

    #[test]
    fn test_answer_inside_every_rung() {
        let geo = SphericalGeodesy::default();
        for day in 0..200 {
            let l = ladder(ANSWER, &format!("{day}circles"));
            assert!(l.misses(&geo, ANSWER).is_empty(), "day {day}");
        }
    }

    proptest! {
        #[test]
        fn prop_radii_strictly_decrease(
            lat in -80.0f64..80.0,
            lng in -179.0f64..179.0,
            day in 0i64..100_000,
        ) {
            let l = ladder(GeoPoint::new(lat, lng), &format!("{day}circles"));
            prop_assert!(l.len() >= 2 && l.len() <= 8);
            for pair in l.as_slice().windows(2) {
                prop_assert!(pair[0].radius_m > pair[1].radius_m);
            }
        }

        #[test]
        fn prop_deterministic(
            lat in -80.0f64..80.0,
            lng in -179.0f64..179.0,
            seed in "[0-9]{1,6}circles",
        ) {
            let answer = GeoPoint::new(lat, lng);
            prop_assert_eq!(ladder(answer, &seed), ladder(answer, &seed));
        }

        #[test]
        fn prop_centers_within_radius(
            lat in -80.0f64..80.0,
            lng in -179.0f64..179.0,
            day in 0i64..100_000,
        ) {
            let answer = GeoPoint::new(lat, lng);
            let l = ladder(answer, &format!("{day}circles"));
            prop_assert!(l.misses(&SphericalGeodesy::default(), answer).is_empty());
        }
    }
}
