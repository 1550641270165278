//! Renderer-free parts of the player's car.
//!
//! The placeholder body is shown until a glTF model loads (or forever, if it fails).
//! The glow parts ride along with whichever body is visible and are sized from its
//! bounds, so they sit on the model's nose rather than the collision box's.

use std::f32::consts::FRAC_PI_2;

use nalgebra::{UnitQuaternion, Vector3};

use crate::{
    constants::{CAR_HEIGHT, CAR_LENGTH, CAR_WIDTH},
    palette,
    world::{Layer, Material, Primitive, SceneMesh, Transform},
};

const WHEEL_RADIUS: f32 = 0.35;
const WHEEL_WIDTH: f32 = 0.25;
const WHEEL_SEGMENTS: u32 = 8;
/// Wheels stick out this far past the body sides.
const WHEEL_OUTSET: f32 = 0.1;

const HEADLIGHT_RADIUS: f32 = 0.07;
const BEAM_RADIUS: f32 = 3.0;
const BEAM_LENGTH: f32 = 15.0;
const BEAM_OPACITY: f32 = 0.09;
const UNDERGLOW_RADIUS: f32 = 1.5;
const UNDERGLOW_OPACITY: f32 = 0.15;

/// Size of the visible car body in its local frame (+Z forward, wheels at y = 0).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarBounds {
    pub half_width: f32,
    pub half_length: f32,
    pub height: f32,
}

impl CarBounds {
    /// The collision footprint, used for the placeholder.
    pub fn footprint() -> Self {
        Self::from_size(CAR_WIDTH, CAR_HEIGHT, CAR_LENGTH)
    }

    pub fn from_size(width: f32, height: f32, length: f32) -> Self {
        Self {
            half_width: width / 2.0,
            half_length: length / 2.0,
            height,
        }
    }
}

fn part(primitive: Primitive, material: Material, transform: Transform) -> SceneMesh {
    SceneMesh {
        layer: Layer::Vehicle,
        primitive,
        material,
        transform,
    }
}

/// Body, cabin and four wheels at the collision footprint.
pub fn placeholder_parts() -> Vec<SceneMesh> {
    let mut parts = vec![
        part(
            Primitive::cuboid(CAR_WIDTH, CAR_HEIGHT * 0.5, CAR_LENGTH),
            Material::solid(palette::CAR_BODY),
            Transform::at(0.0, CAR_HEIGHT * 0.35, 0.0),
        ),
        part(
            Primitive::cuboid(CAR_WIDTH * 0.85, CAR_HEIGHT * 0.4, CAR_LENGTH * 0.45),
            Material::solid(palette::CAR_ACCENT),
            Transform::at(0.0, CAR_HEIGHT * 0.7, -CAR_LENGTH * 0.05),
        ),
    ];

    // Cylinders stand on +Y; a quarter turn about Z lays the axle along X.
    let axle = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
    let x = CAR_WIDTH / 2.0 + WHEEL_OUTSET;
    let z = CAR_LENGTH * 0.3;
    for (x, z) in [(-x, z), (x, z), (-x, -z), (x, -z)] {
        parts.push(part(
            Primitive::cylinder(WHEEL_RADIUS, WHEEL_RADIUS, WHEEL_WIDTH, WHEEL_SEGMENTS),
            Material::solid(palette::TIRE),
            Transform::at(x, WHEEL_RADIUS, z).with_rotation(axle),
        ));
    }
    parts
}

/// Two headlight glows on the nose, a faint beam cone ahead and an underglow disc.
pub fn light_parts(bounds: CarBounds) -> Vec<SceneMesh> {
    let CarBounds {
        half_width,
        half_length,
        height,
    } = bounds;

    let mut parts: Vec<SceneMesh> = [-1.0, 1.0]
        .into_iter()
        .map(|side| {
            part(
                Primitive::Sphere {
                    radius: HEADLIGHT_RADIUS,
                },
                Material::solid(palette::HEADLIGHT),
                Transform::at(half_width * 0.55 * side, height * 0.35, half_length),
            )
        })
        .collect();

    // Cone tip turned from +Y to +Z, out in front of the car.
    let ahead = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
    parts.push(part(
        Primitive::Cone {
            radius: BEAM_RADIUS,
            height: BEAM_LENGTH,
            segments: 8,
        },
        Material::translucent(palette::HEADLIGHT, BEAM_OPACITY).double_sided(),
        Transform::at(0.0, 0.3, half_length + BEAM_LENGTH / 2.0 - 0.5).with_rotation(ahead),
    ));

    parts.push(part(
        Primitive::Disc {
            radius: UNDERGLOW_RADIUS,
        },
        Material::translucent(palette::UNDERGLOW, UNDERGLOW_OPACITY).double_sided(),
        Transform::at(0.0, 0.05, 0.0),
    ));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_body_cabin_and_wheels() {
        let parts = placeholder_parts();
        assert_eq!(parts.len(), 6);
        let wheels: Vec<_> = parts
            .iter()
            .filter(|p| matches!(p.primitive, Primitive::Cylinder { .. }))
            .collect();
        assert_eq!(wheels.len(), 4);
        for wheel in wheels {
            // Resting on the ground, outside the body.
            assert!((wheel.transform.translation.y - WHEEL_RADIUS).abs() < 1.0e-6);
            assert!(wheel.transform.translation.x.abs() > CAR_WIDTH / 2.0);
            let axle = wheel.transform.rotation * Vector3::y();
            assert!(axle.x.abs() > 0.99);
        }
        assert!(parts.iter().all(|p| p.layer == Layer::Vehicle));
    }

    #[test]
    fn lights_follow_the_body_bounds() {
        let bounds = CarBounds::from_size(1.8, 1.2, 4.0);
        let parts = light_parts(bounds);
        let glows: Vec<_> = parts
            .iter()
            .filter(|p| matches!(p.primitive, Primitive::Sphere { .. }))
            .collect();
        assert_eq!(glows.len(), 2);
        for glow in &glows {
            assert_eq!(glow.transform.translation.z, 2.0);
            assert!((glow.transform.translation.x.abs() - 0.9 * 0.55).abs() < 1.0e-6);
            assert_eq!(glow.material.color, palette::HEADLIGHT);
        }

        let Some(beam) = parts
            .iter()
            .find(|p| matches!(p.primitive, Primitive::Cone { .. }))
        else {
            panic!("no beam");
        };
        assert!(beam.material.is_transparent());
        assert!(beam.material.double_sided);
        // The tip points forward.
        let tip = beam.transform.rotation * Vector3::y();
        assert!(tip.z > 0.99);
        assert!(beam.transform.translation.z > bounds.half_length);

        let Some(underglow) = parts
            .iter()
            .find(|p| matches!(p.primitive, Primitive::Disc { .. }))
        else {
            panic!("no underglow");
        };
        assert_eq!(underglow.material.color.r, palette::UNDERGLOW.r);
        assert!(underglow.material.is_transparent());
    }

    #[test]
    fn footprint_matches_collision_size() {
        let bounds = CarBounds::footprint();
        assert_eq!(bounds.half_width * 2.0, CAR_WIDTH);
        assert_eq!(bounds.half_length * 2.0, CAR_LENGTH);
        assert_eq!(bounds.height, CAR_HEIGHT);
    }
}
