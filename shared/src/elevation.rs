//! Ground height over the XZ plane.
//!
//! Bridges rise along a smoothstep ramp at each end and stay flat in the middle; parks
//! get gentle sine hills that fade out toward their edges. Everything else is flat.
//! Queries are stateless, so the field can be rebuilt cheaply on a map swap.

use nalgebra::Vector2;

use crate::{
    constants::SLOPE_SAMPLE_DISTANCE,
    map::{BridgeDef, Bounds, MapConfig},
    utils::smoothstep,
};

/// Fraction of a bridge's length taken by each ramp.
pub const RAMP_FRAC: f32 = 0.28;

/// Bridge influence extends this far past each end, in units of bridge length.
const BRIDGE_T_MARGIN: f32 = 0.05;

/// Extra lateral reach beyond the deck half-width.
const BRIDGE_LATERAL_MARGIN: f32 = 3.0;

/// Hills start this far inside a park.
const PARK_INSET: f32 = 10.0;

/// Distance from the park edge over which hills fade in.
const PARK_FADE_DISTANCE: f32 = 30.0;

/// Anything that can report a ground height.
pub trait HeightField {
    fn height_at(&self, x: f32, z: f32) -> f32;

    /// Pitch of the ground along `heading`, sampled a short step ahead.
    fn slope_angle(&self, x: f32, z: f32, heading: f32) -> f32 {
        let (sin, cos) = heading.sin_cos();
        let here = self.height_at(x, z);
        let ahead = self.height_at(
            x + sin * SLOPE_SAMPLE_DISTANCE,
            z + cos * SLOPE_SAMPLE_DISTANCE,
        );
        (ahead - here).atan2(SLOPE_SAMPLE_DISTANCE)
    }
}

#[derive(Clone, Debug)]
struct BridgeProfile {
    start: Vector2<f32>,
    delta: Vector2<f32>,
    length_sq: f32,
    /// Unit vector perpendicular to the deck.
    perp: Vector2<f32>,
    half_width: f32,
    height: f32,
}

impl BridgeProfile {
    fn new(def: &BridgeDef) -> Option<Self> {
        let delta = def.delta();
        let length = delta.norm();
        if length <= f32::EPSILON {
            return None;
        }
        Some(Self {
            start: def.start,
            delta,
            length_sq: length * length,
            perp: Vector2::new(-delta.y / length, delta.x / length),
            half_width: def.width / 2.0 + BRIDGE_LATERAL_MARGIN,
            height: def.height,
        })
    }

    fn elevation(&self, x: f32, z: f32) -> f32 {
        let rel = Vector2::new(x, z) - self.start;
        let t = rel.dot(&self.delta) / self.length_sq;
        if !(-BRIDGE_T_MARGIN..=1.0 + BRIDGE_T_MARGIN).contains(&t) {
            return 0.0;
        }
        if rel.dot(&self.perp).abs() > self.half_width {
            return 0.0;
        }
        ramp_profile(t.clamp(0.0, 1.0), self.height)
    }
}

/// Height along a bridge at fraction `t`: smoothstep up, flat top, smoothstep down.
pub fn ramp_profile(t: f32, max_height: f32) -> f32 {
    if t < RAMP_FRAC {
        max_height * smoothstep(t / RAMP_FRAC)
    } else if t > 1.0 - RAMP_FRAC {
        max_height * smoothstep((1.0 - t) / RAMP_FRAC)
    } else {
        max_height
    }
}

fn park_hills(bounds: &Bounds, x: f32, z: f32) -> f32 {
    let edge = (x - bounds.min_x)
        .min(bounds.max_x - x)
        .min(z - bounds.min_z)
        .min(bounds.max_z - z);
    let fade = smoothstep((edge / PARK_FADE_DISTANCE).min(1.0));
    let h1 = (x * 0.04).sin() * (z * 0.03).cos() * 1.5;
    let h2 = (x * 0.08 + 1.7).sin() * (z * 0.06 + 0.9).cos() * 0.8;
    ((h1 + h2) * fade).max(0.0)
}

/// Elevation for one map: bridge decks and park hills.
#[derive(Clone, Debug, Default)]
pub struct ElevationField {
    bridges: Vec<BridgeProfile>,
    parks: Vec<Bounds>,
}

impl ElevationField {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            bridges: config.bridges.iter().filter_map(BridgeProfile::new).collect(),
            parks: config.parks.iter().map(|p| p.bounds).collect(),
        }
    }

    /// Flat world, for tests and menus.
    pub fn flat() -> Self {
        Self::default()
    }

    /// Height at `(x, z)`. The first bridge with positive elevation wins, then the
    /// first park whose inset interior contains the point.
    pub fn get_elevation(&self, x: f32, z: f32) -> f32 {
        if let Some(h) = self
            .bridges
            .iter()
            .map(|b| b.elevation(x, z))
            .find(|h| *h > 0.0)
        {
            return h;
        }
        if let Some(park) = self.parks.iter().find(|p| p.inset(PARK_INSET).contains(x, z)) {
            return park_hills(park, x, z);
        }
        0.0
    }
}

impl HeightField for ElevationField {
    #[inline]
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.get_elevation(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{nyc, tokyo};

    #[test]
    fn bridge_profile_is_continuous_at_ramp_ends() {
        let h = 12.0;
        for t in [RAMP_FRAC, 1.0 - RAMP_FRAC] {
            let below = ramp_profile(t - 1.0e-4, h);
            let above = ramp_profile(t + 1.0e-4, h);
            assert!((below - above).abs() < 1.0e-2, "t={t}: {below} vs {above}");
        }
        assert_eq!(ramp_profile(0.0, h), 0.0);
        assert_eq!(ramp_profile(1.0, h), 0.0);
        assert_eq!(ramp_profile(0.5, h), h);
    }

    #[test]
    fn bridge_elevation_is_continuous_in_world_space() {
        let field = ElevationField::new(&nyc::config());
        // Williamsburg: x -540..-250 at z = 0.
        let (start, length) = (-540.0_f32, 290.0_f32);
        for t in [RAMP_FRAC, 1.0 - RAMP_FRAC] {
            let centre = start + length * t;
            for i in -100..100 {
                let x = centre + i as f32 * 0.01;
                let a = field.get_elevation(x, 0.0);
                let b = field.get_elevation(x + 0.01, 0.0);
                assert!((a - b).abs() < 1.0e-2, "x={x}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn nyc_bridge_deck_heights() {
        let field = ElevationField::new(&nyc::config());
        // Williamsburg runs x -540..-250 at z = 0, height 10.
        assert!((field.get_elevation(-395.0, 0.0) - 10.0).abs() < 1.0e-4);
        assert!((field.get_elevation(-395.0, 9.5) - 10.0).abs() < 1.0e-4);
        // Past the lateral margin (7 + 3).
        assert_eq!(field.get_elevation(-395.0, 10.5), 0.0);
        // Ends are at ground level, and halfway up the ramp is halfway up.
        assert!(field.get_elevation(-540.0, 0.0).abs() < 1.0e-4);
        let mid_ramp = -540.0 + 290.0 * RAMP_FRAC * 0.5;
        assert!((field.get_elevation(mid_ramp, 0.0) - 5.0).abs() < 1.0e-2);
        // Well past the end.
        assert_eq!(field.get_elevation(-600.0, 0.0), 0.0);
        // Brooklyn bridge is taller.
        assert!((field.get_elevation(-395.0, -600.0) - 12.0).abs() < 1.0e-4);
    }

    #[test]
    fn park_hills_are_non_negative_and_fade_at_edges() {
        let config = nyc::config();
        let field = ElevationField::new(&config);
        let park = config.parks[0].bounds;
        let mut any_positive = false;
        for i in 0..40 {
            for j in 0..40 {
                let x = park.min_x + park.width() * (i as f32 + 0.5) / 40.0;
                let z = park.min_z + park.depth() * (j as f32 + 0.5) / 40.0;
                let h = field.get_elevation(x, z);
                assert!(h >= 0.0);
                assert!(h <= 2.3 + 1.0e-4);
                any_positive |= h > 0.0;
            }
        }
        assert!(any_positive);
        // Inside the inset band the ground is flat.
        assert_eq!(field.get_elevation(park.min_x + 5.0, park.center().y), 0.0);
    }

    #[test]
    fn slope_is_zero_on_flat_ground_and_positive_up_a_ramp() {
        let flat = ElevationField::flat();
        assert_eq!(flat.slope_angle(0.0, 0.0, 1.0), 0.0);

        let field = ElevationField::new(&nyc::config());
        // Heading +X up the Williamsburg ramp.
        let up = field.slope_angle(-520.0, 0.0, std::f32::consts::FRAC_PI_2);
        assert!(up > 0.0);
        let down = field.slope_angle(-520.0, 0.0, -std::f32::consts::FRAC_PI_2);
        assert!(down < 0.0);
    }

    #[test]
    fn tokyo_has_no_bridges() {
        let field = ElevationField::new(&tokyo::config());
        assert_eq!(field.get_elevation(0.0, -250.0), 0.0);
    }
}
