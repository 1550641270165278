use nalgebra::Vector2;

use crate::palette::Color;

/// Axis-aligned XZ rectangle used by map data (zones, parks, water, map extent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Bounds {
    pub const fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// Strict containment; points on the edge are outside.
    #[inline]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x > self.min_x && x < self.max_x && z > self.min_z && z < self.max_z
    }

    #[inline]
    pub fn center(&self) -> Vector2<f32> {
        Vector2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_z + self.max_z) * 0.5,
        )
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    pub fn is_inverted(&self) -> bool {
        !(self.min_x < self.max_x && self.min_z < self.max_z)
    }

    /// Shrink by `margin` on every side.
    pub fn inset(&self, margin: f32) -> Self {
        Self::new(
            self.min_x + margin,
            self.max_x - margin,
            self.min_z + margin,
            self.max_z - margin,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreetKind {
    Avenue,
    Street,
    Broadway,
    /// Drawn by the bridge builder with elevation, not by the flat road pass.
    Bridge,
}

/// One straight road centerline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreetSegment {
    pub kind: StreetKind,
    pub start: Vector2<f32>,
    pub end: Vector2<f32>,
    pub width: f32,
}

impl StreetSegment {
    pub fn new(kind: StreetKind, start: (f32, f32), end: (f32, f32), width: f32) -> Self {
        Self {
            kind,
            start: Vector2::new(start.0, start.1),
            end: Vector2::new(end.0, end.1),
            width,
        }
    }

    #[inline]
    pub fn delta(&self) -> Vector2<f32> {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.delta().norm()
    }

    /// Yaw that points a +Z-facing object along the segment.
    #[inline]
    pub fn angle(&self) -> f32 {
        let d = self.delta();
        d.x.atan2(d.y)
    }

    #[inline]
    pub fn midpoint(&self) -> Vector2<f32> {
        (self.start + self.end) * 0.5
    }

    /// Point at fraction `t` along the segment.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vector2<f32> {
        self.start + self.delta() * t
    }

    /// Unit normal to the left of the direction of travel, `None` for zero-length segments.
    pub fn left_normal(&self) -> Option<Vector2<f32>> {
        let d = self.delta();
        let len = d.norm();
        (len > 0.0).then(|| Vector2::new(-d.y / len, d.x / len))
    }

    pub fn is_bridge(&self) -> bool {
        self.kind == StreetKind::Bridge
    }
}

/// Buildable rectangle between roads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    pub center: Vector2<f32>,
    pub width: f32,
    pub depth: f32,
}

impl Block {
    pub fn new(cx: f32, cz: f32, width: f32, depth: f32) -> Self {
        Self {
            center: Vector2::new(cx, cz),
            width,
            depth,
        }
    }
}

/// Building style and density of a district.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistrictConfig {
    pub name: &'static str,
    pub height_min: f32,
    pub height_max: f32,
    /// Probability that a block (and each of its sub-blocks) gets buildings.
    pub density: f32,
    pub neon_sign_chance: f32,
    pub neon_signs_per_face: u32,
    pub window_lit_chance: f32,
    pub ground_color: Color,
    pub building_tint: Color,
    pub roof_color: Color,
}

/// Ranked district rectangle. `district: None` marks a no-build zone (parks).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistrictZone {
    pub id: &'static str,
    pub bounds: Bounds,
    pub district: Option<DistrictConfig>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterZone {
    pub id: &'static str,
    pub bounds: Bounds,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeStyle {
    Truss,
    Suspension,
    Gothic,
}

/// Per-style member colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeColors {
    pub deck: Color,
    pub barrier: Color,
    pub tower: Color,
    pub cable: Color,
}

impl BridgeStyle {
    pub fn colors(self) -> BridgeColors {
        use crate::palette::ROAD;
        match self {
            BridgeStyle::Gothic => BridgeColors {
                deck: Color::hex(0x555544),
                barrier: Color::hex(0x7b7060),
                tower: Color::hex(0x8b8070),
                cable: Color::hex(0x666655),
            },
            BridgeStyle::Suspension => BridgeColors {
                deck: ROAD,
                barrier: Color::hex(0x4466aa),
                tower: Color::hex(0x5577aa),
                cable: Color::hex(0x334488),
            },
            BridgeStyle::Truss => BridgeColors {
                deck: ROAD,
                barrier: Color::hex(0x7a3328),
                tower: Color::hex(0x8b3a2e),
                cable: Color::hex(0x6a2a20),
            },
        }
    }
}

/// Elevated road crossing, usually over water.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub start: Vector2<f32>,
    pub end: Vector2<f32>,
    pub width: f32,
    /// Deck height at the flat middle section.
    pub height: f32,
    pub style: BridgeStyle,
}

impl BridgeDef {
    #[inline]
    pub fn delta(&self) -> Vector2<f32> {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.delta().norm()
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Vector2<f32> {
        self.start + self.delta() * t
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParkZone {
    pub id: &'static str,
    pub bounds: Bounds,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    pub x: f32,
    pub z: f32,
    pub heading: f32,
}

/// Diagonal avenue that cuts through the grid; buildings keep clear of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Broadway {
    pub start: Vector2<f32>,
    pub end: Vector2<f32>,
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadWidths {
    pub avenue: f32,
    pub street: f32,
}

/// Hand-built set pieces attached to a map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Landmark {
    CentralPark(Bounds),
    TimesSquare(Bounds),
    YoyogiPark(Bounds),
    ShibuyaCrossing(Bounds),
}

impl Landmark {
    pub fn name(&self) -> &'static str {
        match self {
            Landmark::CentralPark(_) => "Central Park",
            Landmark::TimesSquare(_) => "Times Square",
            Landmark::YoyogiPark(_) => "Yoyogi Park",
            Landmark::ShibuyaCrossing(_) => "Shibuya Crossing",
        }
    }

    pub fn bounds(&self) -> Bounds {
        match *self {
            Landmark::CentralPark(b)
            | Landmark::TimesSquare(b)
            | Landmark::YoyogiPark(b)
            | Landmark::ShibuyaCrossing(b) => b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_containment_is_strict() {
        let b = Bounds::new(0.0, 10.0, 0.0, 10.0);
        assert!(b.contains(5.0, 5.0));
        assert!(!b.contains(0.0, 5.0));
        assert!(!b.contains(5.0, 10.0));
        assert!(!b.is_inverted());
        assert!(Bounds::new(1.0, 1.0, 0.0, 2.0).is_inverted());
    }

    #[test]
    fn segment_geometry() {
        let seg = StreetSegment::new(StreetKind::Street, (0.0, 0.0), (10.0, 0.0), 8.0);
        assert_eq!(seg.length(), 10.0);
        assert!((seg.angle() - std::f32::consts::FRAC_PI_2).abs() < 1.0e-6);
        let n = seg.left_normal().unwrap();
        assert!((n - Vector2::new(0.0, 1.0)).norm() < 1.0e-6);
        let zero = StreetSegment::new(StreetKind::Street, (1.0, 1.0), (1.0, 1.0), 8.0);
        assert!(zero.left_normal().is_none());
    }
}
