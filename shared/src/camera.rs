//! Third-person chase camera.
//!
//! The camera trails a point behind and above the car, easing toward it with an
//! exponential smoothing factor, and never lags more than
//! [`ChaseCameraSettings::max_lag`] behind that point.

use nalgebra::Vector3;

use crate::{
    constants::{
        CAMERA_FAR, CAMERA_FOLLOW_DISTANCE, CAMERA_FOLLOW_HEIGHT, CAMERA_FOV_DEGREES,
        CAMERA_LOOK_AHEAD, CAMERA_LOOK_HEIGHT, CAMERA_MAX_LAG, CAMERA_NEAR, CAMERA_SMOOTH_SPEED,
    },
    utils::smoothing_factor,
    vehicle::VehicleState,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChaseCameraSettings {
    pub follow_distance: f32,
    pub follow_height: f32,
    pub look_ahead: f32,
    pub look_height: f32,
    /// Exponential approach rate (1/s).
    pub smooth_speed: f32,
    pub max_lag: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ChaseCameraSettings {
    fn default() -> Self {
        Self {
            follow_distance: CAMERA_FOLLOW_DISTANCE,
            follow_height: CAMERA_FOLLOW_HEIGHT,
            look_ahead: CAMERA_LOOK_AHEAD,
            look_height: CAMERA_LOOK_HEIGHT,
            smooth_speed: CAMERA_SMOOTH_SPEED,
            max_lag: CAMERA_MAX_LAG,
            fov_degrees: CAMERA_FOV_DEGREES,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

impl ChaseCameraSettings {
    /// Where the camera wants to be for `car`.
    pub fn target(&self, car: &VehicleState) -> Vector3<f32> {
        let f = car.forward();
        Vector3::new(
            car.position.x - f.x * self.follow_distance,
            car.position.y + self.follow_height,
            car.position.z - f.z * self.follow_distance,
        )
    }

    /// Point the camera looks at, ahead of the car.
    pub fn look_target(&self, car: &VehicleState) -> Vector3<f32> {
        let f = car.forward();
        Vector3::new(
            car.position.x + f.x * self.look_ahead,
            car.position.y + self.look_height,
            car.position.z + f.z * self.look_ahead,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChaseCamera {
    pub settings: ChaseCameraSettings,
    position: Vector3<f32>,
    look_at: Vector3<f32>,
}

impl ChaseCamera {
    /// Camera already in place behind `car`.
    pub fn new(settings: ChaseCameraSettings, car: &VehicleState) -> Self {
        let mut camera = Self {
            settings,
            position: Vector3::zeros(),
            look_at: Vector3::zeros(),
        };
        camera.snap_to(car);
        camera
    }

    #[inline]
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    #[inline]
    pub fn look_at(&self) -> Vector3<f32> {
        self.look_at
    }

    /// Ease toward the follow point, then clamp the remaining lag.
    pub fn update(&mut self, dt_seconds: f32, car: &VehicleState) {
        let target = self.settings.target(car);
        let t = smoothing_factor(self.settings.smooth_speed, dt_seconds);
        self.position = self.position.lerp(&target, t);

        let lag = self.position - target;
        let distance = lag.norm();
        if distance > self.settings.max_lag {
            self.position = target + lag * (self.settings.max_lag / distance);
        }

        self.look_at = self.settings.look_target(car);
    }

    /// Jump straight to the follow point. Used on spawn, respawn and map swap.
    pub fn snap_to(&mut self, car: &VehicleState) {
        self.position = self.settings.target(car);
        self.look_at = self.settings.look_target(car);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn snaps_behind_and_above() {
        let car = VehicleState::new(10.0, 20.0, 0.0);
        let camera = ChaseCamera::new(ChaseCameraSettings::default(), &car);
        assert_eq!(
            camera.position(),
            Vector3::new(10.0, CAMERA_FOLLOW_HEIGHT, 20.0 - CAMERA_FOLLOW_DISTANCE)
        );
        assert_eq!(
            camera.look_at(),
            Vector3::new(10.0, CAMERA_LOOK_HEIGHT, 20.0 + CAMERA_LOOK_AHEAD)
        );
    }

    #[test]
    fn lag_is_clamped() {
        let settings = ChaseCameraSettings::default();
        let mut car = VehicleState::new(0.0, 0.0, 0.0);
        let mut camera = ChaseCamera::new(settings, &car);

        // Teleport far away; one small step would leave the camera far behind.
        car.position.x = 100.0;
        camera.update(1.0 / 60.0, &car);
        let lag = (camera.position() - settings.target(&car)).norm();
        assert!(lag <= settings.max_lag + 1.0e-4, "lag {lag}");
        assert!(lag > settings.max_lag - 1.0e-3);
    }

    #[test]
    fn converges_on_a_still_car() {
        let settings = ChaseCameraSettings::default();
        let car = VehicleState::new(0.0, 0.0, FRAC_PI_2);
        let mut camera = ChaseCamera::new(settings, &VehicleState::new(0.0, 0.5, 0.0));
        let mut last = f32::INFINITY;
        for _ in 0..120 {
            camera.update(1.0 / 60.0, &car);
            let lag = (camera.position() - settings.target(&car)).norm();
            assert!(lag <= last + 1.0e-6);
            last = lag;
        }
        assert!(last < 0.01);
    }

    #[test]
    fn follows_car_height() {
        let settings = ChaseCameraSettings::default();
        let mut car = VehicleState::new(0.0, 0.0, 0.0);
        car.position.y = 12.0;
        let camera = ChaseCamera::new(settings, &car);
        assert!((camera.position().y - (12.0 + CAMERA_FOLLOW_HEIGHT)).abs() < 1.0e-5);
        assert!((camera.look_at().y - (12.0 + CAMERA_LOOK_HEIGHT)).abs() < 1.0e-5);
    }
}
