use nalgebra::{Vector2, Vector3};

use crate::{
    constants::{CAR_LENGTH, CAR_WIDTH, KMH_PER_UNIT},
    utils::forward_from_heading,
};

/// Kinematic state of the player's car.
///
/// Only the physics step and the collision resolver mutate this.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleState {
    pub position: Vector3<f32>,
    /// Radians; 0 faces +Z, positive turns toward +X.
    pub heading: f32,
    /// Signed scalar speed along `forward` (world units per second).
    pub speed: f32,
    /// Pitch of the ground under the car from the last step (radians, positive = uphill).
    pub slope_angle: f32,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl VehicleState {
    /// Car at rest at ground level.
    pub fn new(x: f32, z: f32, heading: f32) -> Self {
        Self {
            position: Vector3::new(x, 0.0, z),
            heading,
            speed: 0.0,
            slope_angle: 0.0,
        }
    }

    /// Teleport to `(x, 0, z)` facing `heading`, at rest.
    pub fn reset(&mut self, x: f32, z: f32, heading: f32) {
        *self = Self::new(x, z, heading);
    }

    #[inline]
    pub fn forward(&self) -> Vector3<f32> {
        forward_from_heading(self.heading)
    }

    #[inline]
    pub fn planar_position(&self) -> Vector2<f32> {
        Vector2::new(self.position.x, self.position.z)
    }

    /// HUD speed: `round(|speed| * 3.6)`.
    pub fn speed_kmh(&self) -> u32 {
        (self.speed.abs() * KMH_PER_UNIT).round() as u32
    }
}

/// A selectable car body. The model is cosmetic; every car drives the same.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarModel {
    pub key: &'static str,
    pub name: &'static str,
    /// glTF scene path relative to the asset root.
    pub asset: &'static str,
}

pub static CAR_MODELS: [CarModel; 1] = [CarModel {
    key: "skyline-r34",
    name: "Skyline R34",
    asset: "models/skyline-r34.glb",
}];

pub const DEFAULT_CAR_MODEL: &str = "skyline-r34";

pub fn car_model(key: &str) -> Option<&'static CarModel> {
    CAR_MODELS.iter().find(|m| m.key == key)
}

/// Uniform scale that fits a model of the given footprint inside the car's
/// collision footprint. `None` for degenerate sizes.
pub fn fit_model_scale(size_x: f32, size_z: f32) -> Option<f32> {
    if !(size_x > f32::EPSILON && size_z > f32::EPSILON) {
        return None;
    }
    Some((CAR_WIDTH / size_x).min(CAR_LENGTH / size_z))
}
