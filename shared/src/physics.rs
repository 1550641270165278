use crate::{
    constants::{
        ACCELERATION, BRAKING, FRICTION, HANDBRAKE_FACTOR, MAX_SPEED, MIN_TURN_SPEED,
        REVERSE_ACCEL_FRACTION, REVERSE_SPEED_FRACTION, SLOPE_GRAVITY, SPEED_EPS, TURN_SPEED,
        TURN_SPEED_FACTOR,
    },
    elevation::HeightField,
    input::DriveIntent,
    vehicle::VehicleState,
};

/// Handling constants for one car. `Default` is the stock tune.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveTuning {
    pub max_speed: f32,
    pub acceleration: f32,
    pub braking: f32,
    /// Fraction of `acceleration` used when reversing from rest.
    pub reverse_accel_fraction: f32,
    /// Fraction of `max_speed` allowed in reverse.
    pub reverse_speed_fraction: f32,
    pub handbrake_factor: f32,
    pub friction: f32,
    pub turn_speed: f32,
    pub turn_speed_factor: f32,
    pub min_turn_speed: f32,
    pub speed_eps: f32,
    pub slope_gravity: f32,
}

impl Default for DriveTuning {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            acceleration: ACCELERATION,
            braking: BRAKING,
            reverse_accel_fraction: REVERSE_ACCEL_FRACTION,
            reverse_speed_fraction: REVERSE_SPEED_FRACTION,
            handbrake_factor: HANDBRAKE_FACTOR,
            friction: FRICTION,
            turn_speed: TURN_SPEED,
            turn_speed_factor: TURN_SPEED_FACTOR,
            min_turn_speed: MIN_TURN_SPEED,
            speed_eps: SPEED_EPS,
            slope_gravity: SLOPE_GRAVITY,
        }
    }
}

impl DriveTuning {
    #[inline]
    pub fn max_reverse_speed(&self) -> f32 {
        self.max_speed * self.reverse_speed_fraction
    }

    /// Turn rate at `speed`: full lock at rest, reduced by `turn_speed_factor` at top speed.
    #[inline]
    pub fn turn_rate(&self, speed: f32) -> f32 {
        let ratio = (speed.abs() / self.max_speed).min(1.0);
        self.turn_speed * (1.0 - ratio * self.turn_speed_factor)
    }
}

/// Advance the car by one fixed step.
///
/// Behavior
/// - Throttle, reverse/brake and handbrake adjust the scalar speed, then friction applies.
/// - With a height field, gravity along the ground pitch slows climbs and speeds descents.
/// - Speed is clamped to `[-max_reverse, max]` and snapped to zero below `speed_eps`.
/// - Steering only turns a moving car and inverts while reversing.
/// - The car moves along its new heading and sits on the ground height.
///
/// Collision is not applied here; run the resolver afterwards.
pub fn step_vehicle(
    state: &mut VehicleState,
    intent: DriveIntent,
    dt_seconds: f32,
    tuning: &DriveTuning,
    ground: Option<&dyn HeightField>,
) {
    let dt = dt_seconds.max(0.0);

    // 1) Longitudinal input.
    if intent.forward() {
        state.speed += tuning.acceleration * dt;
    }
    if intent.backward() {
        if state.speed > 0.0 {
            state.speed -= tuning.braking * dt;
        } else {
            state.speed -= tuning.acceleration * tuning.reverse_accel_fraction * dt;
        }
    }
    if intent.brake() {
        state.speed *= tuning.handbrake_factor;
    }

    // 2) Rolling resistance, every step.
    state.speed *= tuning.friction;

    // 3) Gravity along the slope under the car.
    if let Some(ground) = ground {
        let slope = ground.slope_angle(state.position.x, state.position.z, state.heading);
        state.slope_angle = slope;
        state.speed -= slope.sin() * tuning.slope_gravity * dt;
    }

    // 4) Clamp and snap.
    state.speed = state
        .speed
        .clamp(-tuning.max_reverse_speed(), tuning.max_speed);
    if state.speed.abs() < tuning.speed_eps {
        state.speed = 0.0;
    }

    // 5) Steering. A stationary car cannot turn; reversing inverts the wheel.
    if state.speed.abs() > tuning.min_turn_speed {
        let turn = tuning.turn_rate(state.speed) * dt * state.speed.signum();
        if intent.left() {
            state.heading += turn;
        }
        if intent.right() {
            state.heading -= turn;
        }
    }

    // 6) Integrate position along the new heading.
    let forward = state.forward();
    state.position.x += forward.x * state.speed * dt;
    state.position.z += forward.z * state.speed * dt;
    if let Some(ground) = ground {
        state.position.y = ground.height_at(state.position.x, state.position.z);
    }
}
