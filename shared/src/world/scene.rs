//! Engine-agnostic scene description produced by world generation.
//!
//! Nothing here knows about a renderer. A client walks [`GeneratedWorld`](super::GeneratedWorld)
//! and turns each entry into whatever its engine draws with.

use nalgebra::{Unit, UnitQuaternion, Vector2, Vector3};

use crate::palette::Color;

/// Shape of a mesh in its local frame.
///
/// Flat shapes (`Plane`, `Disc`, `Ring`) lie in the local XZ plane facing +Y. Round
/// solids (`Cylinder`, `Cone`) run along local +Y and are centred on the origin.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Box {
        size: Vector3<f32>,
    },
    Plane {
        width: f32,
        depth: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    Cone {
        radius: f32,
        height: f32,
        segments: u32,
    },
    Sphere {
        radius: f32,
    },
    Disc {
        radius: f32,
    },
    Ring {
        inner: f32,
        outer: f32,
        segments: u32,
    },
    /// Closed outline in local XZ extruded upward by `height`.
    Prism {
        outline: Vec<Vector2<f32>>,
        height: f32,
    },
    /// Quad strip between two polylines of equal length, in world space.
    Strip {
        a: Vec<Vector3<f32>>,
        b: Vec<Vector3<f32>>,
    },
}

impl Primitive {
    pub fn cuboid(x: f32, y: f32, z: f32) -> Self {
        Primitive::Box {
            size: Vector3::new(x, y, z),
        }
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        Primitive::Cylinder {
            radius_top,
            radius_bottom,
            height,
            segments,
        }
    }

    pub fn plane(width: f32, depth: f32) -> Self {
        Primitive::Plane { width, depth }
    }
}

/// Surface description. Everything is unlit; glow comes from bloom on bright colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Base color; alpha below 255 means the surface is blended.
    pub color: Color,
    /// Index into [`GeneratedWorld::textures`](super::GeneratedWorld::textures).
    pub texture: Option<usize>,
    /// Whether distance fog applies.
    pub fog: bool,
    pub double_sided: bool,
}

impl Material {
    pub const fn solid(color: Color) -> Self {
        Self {
            color,
            texture: None,
            fog: true,
            double_sided: false,
        }
    }

    pub fn translucent(color: Color, opacity: f32) -> Self {
        Self::solid(color.with_alpha(opacity))
    }

    pub fn with_texture(mut self, texture: usize) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn without_fog(mut self) -> Self {
        self.fog = false;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.color.a < u8::MAX
    }
}

/// Placement of a mesh or instance in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0)
    }
}

impl Transform {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Rotate about +Y. Positive yaw turns +Z toward +X.
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw);
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Frame centred between `a` and `b` whose local `axis` points from `a` to `b`.
    ///
    /// Returns the transform and the distance. Used for cables and rails, which are
    /// built as unit-aligned primitives stretched along one axis.
    pub fn spanning(a: Vector3<f32>, b: Vector3<f32>, axis: Vector3<f32>) -> (Self, f32) {
        let delta = b - a;
        let length = delta.norm();
        let mid = (a + b) * 0.5;
        let rotation = if length > f32::EPSILON {
            UnitQuaternion::rotation_between(&axis, &delta).unwrap_or_else(|| {
                // Antiparallel: half turn about any perpendicular axis.
                let helper = if axis.x.abs() < 0.9 {
                    Vector3::x()
                } else {
                    Vector3::y()
                };
                let perp = Unit::new_normalize(axis.cross(&helper));
                UnitQuaternion::from_axis_angle(&perp, std::f32::consts::PI)
            })
        } else {
            UnitQuaternion::identity()
        };
        (Self::at(mid.x, mid.y, mid.z).with_rotation(rotation), length)
    }
}

/// Coarse grouping, used by clients for draw ordering and by tests for counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Sky,
    Ground,
    Road,
    Water,
    Bridge,
    Building,
    Sign,
    Prop,
    Landmark,
    Vehicle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneMesh {
    pub layer: Layer,
    pub primitive: Primitive,
    pub material: Material,
    pub transform: Transform,
}

/// One shape drawn many times with a shared material.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceBatch {
    pub name: &'static str,
    pub layer: Layer,
    pub primitive: Primitive,
    pub material: Material,
    pub instances: Vec<Transform>,
}

impl InstanceBatch {
    pub fn new(name: &'static str, layer: Layer, primitive: Primitive, material: Material) -> Self {
        Self {
            name,
            layer,
            primitive,
            material,
            instances: Vec::new(),
        }
    }

    pub fn push(&mut self, x: f32, y: f32, z: f32) {
        self.instances.push(Transform::at(x, y, z));
    }
}

/// RGBA8 facade texture, row-major from the top-left. Sampled with nearest filtering
/// and repeat wrapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl WindowTexture {
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let pixels = [color.r, color.g, color.b, color.a]
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Paint a rectangle, alpha-blending `color` over what is there. Clipped to the image.
    pub fn blend_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        for py in y..y.saturating_add(h).min(self.height) {
            for px in x..x.saturating_add(w).min(self.width) {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Alpha-blend `color` over one pixel, leaving it opaque. Ignored outside the image.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let alpha = color.opacity();
        let i = ((y * self.width + x) * 4) as usize;
        for (c, s) in [color.r, color.g, color.b].into_iter().enumerate() {
            let dst = self.pixels[i + c] as f32;
            self.pixels[i + c] = (s as f32 * alpha + dst * (1.0 - alpha)).round() as u8;
        }
        self.pixels[i + 3] = u8::MAX;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

/// A box-shaped tower with textured walls and a flat roof.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Building {
    pub center: Vector2<f32>,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub district: &'static str,
    /// Texture for the +Z and -Z faces (width × height).
    pub front_texture: usize,
    /// Texture for the +X and -X faces (depth × height).
    pub side_texture: usize,
    pub roof: Color,
}

/// Point sprites on the sky dome.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StarField {
    pub positions: Vec<Vector3<f32>>,
    pub sizes: Vec<f32>,
    pub color: Color,
}

/// Background and distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atmosphere {
    pub background: Color,
    pub fog_color: Color,
    /// Exponential-squared fog density.
    pub fog_density: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanning_aligns_axis_with_segment() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(1.0, 2.0, 13.0);
        let (t, len) = Transform::spanning(a, b, Vector3::y());
        assert!((len - 10.0).abs() < 1.0e-5);
        assert!((t.translation - Vector3::new(1.0, 2.0, 8.0)).norm() < 1.0e-5);
        let axis = t.rotation * Vector3::y();
        assert!((axis - Vector3::z()).norm() < 1.0e-5);

        let (flipped, _) = Transform::spanning(b, a, Vector3::z());
        assert!((flipped.rotation * Vector3::z() + Vector3::z()).norm() < 1.0e-5);
    }

    #[test]
    fn window_texture_blending() {
        let mut tex = WindowTexture::filled(4, 4, Color::hex(0x000000));
        tex.blend_rect(1, 1, 2, 2, Color::rgba(200, 100, 50, 255));
        assert_eq!(tex.pixel(1, 1), Some([200, 100, 50, 255]));
        assert_eq!(tex.pixel(0, 0), Some([0, 0, 0, 255]));
        tex.blend_rect(3, 3, 5, 5, Color::hex(0xffffff).with_alpha(0.5));
        assert_eq!(tex.pixel(3, 3), Some([128, 128, 128, 255]));
        assert_eq!(tex.pixel(4, 0), None);
    }

    #[test]
    fn empty_star_field_defaults_to_black() {
        let stars = StarField::default();
        assert!(stars.positions.is_empty());
        assert_eq!(stars.color, Color::hex(0x000000));
    }
}
