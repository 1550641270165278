/// Simulation step in seconds. Physics and collision always advance by exactly this much.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Upper bound on a single frame's wall-clock delta fed to the accumulator (seconds).
///
/// A backgrounded tab or a long hitch would otherwise queue hundreds of fixed steps.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Top forward speed in world units per second.
pub const MAX_SPEED: f32 = 60.0;

/// Reverse speed is capped at this fraction of [`MAX_SPEED`].
pub const REVERSE_SPEED_FRACTION: f32 = 0.3;

/// Forward acceleration while throttle is held (units/s^2).
pub const ACCELERATION: f32 = 30.0;

/// Deceleration while braking from forward motion (units/s^2).
pub const BRAKING: f32 = 50.0;

/// Reverse acceleration is this fraction of [`ACCELERATION`].
pub const REVERSE_ACCEL_FRACTION: f32 = 0.5;

/// Per-step speed multiplier applied while the handbrake is held.
pub const HANDBRAKE_FACTOR: f32 = 0.95;

/// Per-step passive speed multiplier, applied regardless of input.
pub const FRICTION: f32 = 0.99;

/// Full-lock turn rate at rest (radians per second).
pub const TURN_SPEED: f32 = 2.5;

/// How much of the turn rate is lost at top speed (0 = none, 1 = all).
pub const TURN_SPEED_FACTOR: f32 = 0.7;

/// Below this absolute speed the car cannot steer.
pub const MIN_TURN_SPEED: f32 = 0.5;

/// Absolute speeds below this snap to zero so the car never creeps.
pub const SPEED_EPS: f32 = 0.1;

/// Gravity along the slope, applied as `sin(slope) * SLOPE_GRAVITY * dt`.
///
/// Tunable; the default is the same magnitude as [`ACCELERATION`] so a steep ramp
/// roughly cancels the throttle.
pub const SLOPE_GRAVITY: f32 = 30.0;

/// Forward offset used to sample the elevation gradient (world units).
pub const SLOPE_SAMPLE_DISTANCE: f32 = 0.5;

/// Conversion from world units per second to the km/h shown on the HUD.
pub const KMH_PER_UNIT: f32 = 3.6;

/// Car footprint, used for the oriented collision rectangle.
pub const CAR_WIDTH: f32 = 2.0;
pub const CAR_LENGTH: f32 = 4.5;
pub const CAR_HEIGHT: f32 = 1.4;

/// Chase camera tuning.
pub const CAMERA_FOLLOW_DISTANCE: f32 = 4.5;
pub const CAMERA_FOLLOW_HEIGHT: f32 = 2.2;
pub const CAMERA_LOOK_AHEAD: f32 = 3.0;
pub const CAMERA_LOOK_HEIGHT: f32 = 1.5;
pub const CAMERA_SMOOTH_SPEED: f32 = 5.0;
pub const CAMERA_MAX_LAG: f32 = 1.5;
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.5;
pub const CAMERA_FAR: f32 = 500.0;

/// Post-processing defaults.
pub const BLOOM_STRENGTH: f32 = 1.5;
pub const BLOOM_RADIUS: f32 = 0.4;
pub const BLOOM_THRESHOLD: f32 = 0.6;
pub const PIXEL_SIZE: f32 = 3.0;
pub const SCANLINE_INTENSITY: f32 = 0.15;
pub const VIGNETTE_STRENGTH: f32 = 0.4;
pub const CHROMATIC_ABERRATION: f32 = 0.003;
pub const CRT_CURVATURE: f32 = 0.02;

/// Exponential fog density for the night sky.
pub const FOG_DENSITY: f32 = 0.012;

/// Street lamp tuning.
pub const LAMP_HEIGHT: f32 = 6.0;
pub const LAMP_SPACING: f32 = 20.0;

/// Seed used when a session is created without an explicit one.
pub const DEFAULT_WORLD_SEED: u64 = 0x5932_4B52_4143_4552;
