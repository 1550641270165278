/*!
Collision root module.

Static-world collision for the car: a uniform spatial hash for the broad phase and a
separating-axis test of the car's oriented rectangle against axis-aligned bodies for
the narrow phase. Everything is resolved in the XZ plane; bodies may carry a vertical
band so the car can pass over or under them. The code is split for clarity:

- types:        shared data types (Aabb2, StaticBody, Obb2, Interval, Penetration)
- settings:     grid size, crash response and tolerance constants
- broad:        spatial hash and deduplicated candidate gathering
- narrow_phase: separating-axis test
- resolver:     `CollisionWorld`, owner of bodies and the per-step push-out
*/

pub mod broad;
pub mod narrow_phase;
pub mod resolver;
pub mod settings;
pub mod types;

// Re-export commonly used types and functions.
pub use narrow_phase::{escape_pushes, obb_vs_aabb};
pub use resolver::CollisionWorld;
pub use types::{Aabb2, Obb2, Penetration, StaticBody, Vec2, Vec3};

/// Convenience: body from a center point and half extents, blocking every height.
#[inline]
pub fn body_from_center(cx: f32, cz: f32, half_x: f32, half_z: f32) -> StaticBody {
    StaticBody::new(cx - half_x, cz - half_z, cx + half_x, cz + half_z)
}

/// Convenience: body for a box rotated by a multiple of 90 degrees about Y.
///
/// A quarter turn swaps the extents; other angles fall back to the rotated box's bounds.
pub fn body_from_rotated_box(cx: f32, cz: f32, width: f32, depth: f32, yaw: f32) -> StaticBody {
    let (sin, cos) = yaw.sin_cos();
    let half_x = (width * cos.abs() + depth * sin.abs()) * 0.5;
    let half_z = (width * sin.abs() + depth * cos.abs()) * 0.5;
    body_from_center(cx, cz, half_x, half_z)
}
