/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data exchanged between:
- broad (spatial hash and candidate gathering)
- narrow_phase (separating-axis test of the car rectangle against a body)
- resolver (the `CollisionWorld` that owns bodies and pushes the car out)

All collision happens in the XZ plane. Height only enters through the optional
vertical band on a [`StaticBody`], which lets the car drive over or under bridge
barriers and bank walls.
*/

use nalgebra as na;

use super::settings::VERTICAL_MARGIN;

/// Common math aliases for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;

/// Axis-aligned rectangle in the XZ plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb2 {
    pub min_x: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_z: f32,
}

impl Aabb2 {
    #[inline]
    pub const fn new(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Self {
        Self {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    /// Rectangle centered on `(cx, cz)` with the given half extents.
    #[inline]
    pub fn from_center(cx: f32, cz: f32, half_x: f32, half_z: f32) -> Self {
        Self::new(cx - half_x, cz - half_z, cx + half_x, cz + half_z)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
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

    /// Strict overlap: touching edges do not count.
    #[inline]
    pub fn overlaps(&self, other: &Aabb2) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_z < other.max_z
            && self.max_z > other.min_z
    }

    /// True when `(x, z)` is strictly inside.
    #[inline]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x > self.min_x && x < self.max_x && z > self.min_z && z < self.max_z
    }

    /// Non-finite or inverted bounds. Zero-area rectangles are allowed; they never overlap anything.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.min_x.is_finite()
            && self.min_z.is_finite()
            && self.max_x.is_finite()
            && self.max_z.is_finite())
            || self.min_x > self.max_x
            || self.min_z > self.max_z
    }

    /// Corners in counter-clockwise order starting at `(min_x, min_z)`.
    #[inline]
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min_x, self.min_z),
            Vec2::new(self.max_x, self.min_z),
            Vec2::new(self.max_x, self.max_z),
            Vec2::new(self.min_x, self.max_z),
        ]
    }

    /// Smallest rectangle containing every point.
    pub fn from_points(points: &[Vec2]) -> Self {
        points.iter().fold(
            Self::new(f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            |acc, p| {
                Self::new(
                    acc.min_x.min(p.x),
                    acc.min_z.min(p.y),
                    acc.max_x.max(p.x),
                    acc.max_z.max(p.y),
                )
            },
        )
    }
}

/// Immutable world obstacle registered by world generation.
///
/// `min_y..max_y` is the vertical band the body blocks; the default band is unbounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticBody {
    pub bounds: Aabb2,
    pub min_y: f32,
    pub max_y: f32,
}

impl StaticBody {
    /// Body blocking every height.
    #[inline]
    pub fn new(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Self {
        Self {
            bounds: Aabb2::new(min_x, min_z, max_x, max_z),
            min_y: f32::NEG_INFINITY,
            max_y: f32::INFINITY,
        }
    }

    /// Restrict the body to a vertical band.
    #[inline]
    pub fn with_vertical_band(mut self, min_y: f32, max_y: f32) -> Self {
        self.min_y = min_y;
        self.max_y = max_y;
        self
    }

    /// Does the body block a car whose ride height is `y`?
    ///
    /// The band is widened by [`VERTICAL_MARGIN`] on both ends.
    #[inline]
    pub fn blocks_height(&self, y: f32) -> bool {
        y >= self.min_y - VERTICAL_MARGIN && y <= self.max_y + VERTICAL_MARGIN
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.bounds.is_degenerate() || self.min_y.is_nan() || self.max_y.is_nan()
    }
}

/// Oriented rectangle for the car, rebuilt from the heading on every query.
#[derive(Clone, Copy, Debug)]
pub struct Obb2 {
    pub center: Vec2,
    /// Unit vector along the car's length.
    pub forward: Vec2,
    /// Unit vector along the car's width.
    pub right: Vec2,
    pub half_width: f32,
    pub half_length: f32,
}

impl Obb2 {
    #[inline]
    pub fn new(center: Vec2, heading: f32, width: f32, length: f32) -> Self {
        let (sin, cos) = heading.sin_cos();
        Self {
            center,
            forward: Vec2::new(sin, cos),
            right: Vec2::new(cos, -sin),
            half_width: width * 0.5,
            half_length: length * 0.5,
        }
    }

    /// Corners: front-left, front-right, rear-right, rear-left.
    #[inline]
    pub fn corners(&self) -> [Vec2; 4] {
        let f = self.forward * self.half_length;
        let r = self.right * self.half_width;
        [
            self.center + f - r,
            self.center + f + r,
            self.center - f + r,
            self.center - f - r,
        ]
    }

    #[inline]
    pub fn aabb(&self) -> Aabb2 {
        Aabb2::from_points(&self.corners())
    }
}

/// Closed interval of projections onto an axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Project `points` onto `axis`.
    #[inline]
    pub fn project(points: &[Vec2], axis: &Vec2) -> Self {
        points.iter().fold(
            Self {
                min: f32::INFINITY,
                max: f32::NEG_INFINITY,
            },
            |acc, p| {
                let d = p.dot(axis);
                Self {
                    min: acc.min.min(d),
                    max: acc.max.max(d),
                }
            },
        )
    }

    /// Signed overlap length; zero or negative means the intervals are separated.
    #[inline]
    pub fn overlap(&self, other: &Interval) -> f32 {
        (self.max - other.min).min(other.max - self.min)
    }
}

/// Minimum translation that separates the car from one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    /// Unit axis of least overlap, signed to point from the body toward the car.
    pub normal: Vec2,
    /// Overlap along `normal` (world units, > 0).
    pub depth: f32,
}

impl Penetration {
    /// Translation to apply to the car.
    #[inline]
    pub fn push(&self) -> Vec2 {
        self.normal * self.depth
    }
}
