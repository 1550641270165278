//! One play session: the selected map and car, the generated city, and the
//! fixed-timestep loop that drives them.
//!
//! A frame hands its wall-clock delta and the sampled [`DriveIntent`] to
//! [`GameSession::advance`]. The delta is clamped, banked in an accumulator and
//! drained in [`FIXED_TIMESTEP`] steps (integrate, then resolve collisions). The chase
//! camera moves once per frame after the last step.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::{
    camera::{ChaseCamera, ChaseCameraSettings},
    collision::CollisionWorld,
    constants::{FIXED_TIMESTEP, MAX_FRAME_DELTA},
    elevation::ElevationField,
    input::DriveIntent,
    map::{MapConfig, MapConfigError},
    physics::{DriveTuning, step_vehicle},
    vehicle::{CAR_MODELS, CarModel, DEFAULT_CAR_MODEL, VehicleState, car_model},
    world::{GeneratedWorld, WorldGenerator},
};

/// What happened during one [`GameSession::advance`] call; enough to drive a HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Fixed steps run this frame.
    pub steps: u32,
    /// Whether any step ended in a collision.
    pub collided: bool,
    pub speed_kmh: u32,
    pub position: Vector3<f32>,
    pub heading: f32,
    pub slope_angle: f32,
}

impl FrameReport {
    fn idle(vehicle: &VehicleState) -> Self {
        Self {
            steps: 0,
            collided: false,
            speed_kmh: vehicle.speed_kmh(),
            position: vehicle.position,
            heading: vehicle.heading,
            slope_angle: vehicle.slope_angle,
        }
    }
}

pub struct GameSession {
    config: MapConfig,
    seed: u64,
    elevation: ElevationField,
    collision: CollisionWorld,
    world: GeneratedWorld,
    vehicle: VehicleState,
    camera: ChaseCamera,
    tuning: DriveTuning,
    car: &'static CarModel,
    accumulator: f32,
    elapsed: f32,
    paused: bool,
    /// Bumped every time the world is rebuilt.
    generation: u64,
}

impl GameSession {
    /// Validate `config`, generate its city from `seed` and park the car on the spawn.
    pub fn new(config: MapConfig, seed: u64) -> Result<Self, MapConfigError> {
        Self::with_settings(
            config,
            seed,
            DriveTuning::default(),
            ChaseCameraSettings::default(),
        )
    }

    /// Like [`GameSession::new`], with custom handling and camera.
    pub fn with_settings(
        config: MapConfig,
        seed: u64,
        tuning: DriveTuning,
        camera: ChaseCameraSettings,
    ) -> Result<Self, MapConfigError> {
        config.validate()?;
        let elevation = ElevationField::new(&config);
        let mut collision = CollisionWorld::new();
        let world = generate(&config, &elevation, &mut collision, seed);
        let vehicle = spawn_vehicle(&config);
        let camera = ChaseCamera::new(camera, &vehicle);

        Ok(Self {
            config,
            seed,
            elevation,
            collision,
            world,
            vehicle,
            camera,
            tuning,
            car: car_model(DEFAULT_CAR_MODEL).unwrap_or(&CAR_MODELS[0]),
            accumulator: 0.0,
            elapsed: 0.0,
            paused: false,
            generation: 0,
        })
    }

    /// Run one rendered frame. Paused sessions do nothing.
    pub fn advance(&mut self, frame_dt: f32, intent: DriveIntent) -> FrameReport {
        if self.paused {
            return FrameReport::idle(&self.vehicle);
        }

        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        self.elapsed += dt;
        self.accumulator += dt;

        let mut steps = 0;
        let mut collided = false;
        while self.accumulator >= FIXED_TIMESTEP {
            step_vehicle(
                &mut self.vehicle,
                intent,
                FIXED_TIMESTEP,
                &self.tuning,
                Some(&self.elevation),
            );
            collided |= self.collision.resolve(&mut self.vehicle);
            self.accumulator -= FIXED_TIMESTEP;
            steps += 1;
        }

        self.camera.update(dt, &self.vehicle);

        FrameReport {
            steps,
            collided,
            ..FrameReport::idle(&self.vehicle)
        }
    }

    /// Tear down the current city and build `config` in its place. An invalid config
    /// is refused and the current map is kept.
    pub fn swap_map(&mut self, config: MapConfig) -> Result<(), MapConfigError> {
        config.validate()?;
        tracing::debug!(from = self.config.id, to = config.id, "swapping map");

        self.world.dispose();
        self.collision.clear();
        self.elevation = ElevationField::new(&config);
        self.world = generate(&config, &self.elevation, &mut self.collision, self.seed);
        self.config = config;
        self.generation += 1;
        self.respawn();
        Ok(())
    }

    /// Switch the cosmetic car model and put the car back on the spawn. Unknown keys
    /// keep the current model.
    pub fn swap_car_model(&mut self, key: &str) -> &'static CarModel {
        match car_model(key) {
            Some(model) => self.car = model,
            None => tracing::warn!(key, current = self.car.key, "unknown car model"),
        }
        self.respawn();
        self.car
    }

    /// Car back to the spawn point, at rest, with the camera snapped behind it.
    pub fn respawn(&mut self) {
        self.vehicle = spawn_vehicle(&self.config);
        self.camera.snap_to(&self.vehicle);
        self.accumulator = 0.0;
    }

    pub fn pause(&mut self) {
        if !self.paused {
            tracing::debug!(elapsed = self.elapsed, "paused");
        }
        self.paused = true;
    }

    /// Resume without replaying the paused time.
    pub fn resume(&mut self) {
        if self.paused {
            tracing::debug!(elapsed = self.elapsed, "resumed");
        }
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn world(&self) -> &GeneratedWorld {
        &self.world
    }

    pub fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    pub fn elevation(&self) -> &ElevationField {
        &self.elevation
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn camera(&self) -> &ChaseCamera {
        &self.camera
    }

    pub fn tuning(&self) -> &DriveTuning {
        &self.tuning
    }

    pub fn car_model(&self) -> &'static CarModel {
        self.car
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Unsimulated time banked for the next frame, in seconds.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Simulated wall-clock time, excluding pauses.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("map", &self.config.id)
            .field("seed", &self.seed)
            .field("car", &self.car.key)
            .field("vehicle", &self.vehicle)
            .field("paused", &self.paused)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

fn generate(
    config: &MapConfig,
    elevation: &ElevationField,
    collision: &mut CollisionWorld,
    seed: u64,
) -> GeneratedWorld {
    let mut rng = Pcg32::seed_from_u64(seed);
    WorldGenerator::build(config, elevation, collision, &mut rng)
}

fn spawn_vehicle(config: &MapConfig) -> VehicleState {
    let spawn = config.spawn;
    VehicleState::new(spawn.x, spawn.z, spawn.heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::DriveFlag,
        map::{nyc, tokyo},
    };

    fn session() -> GameSession {
        GameSession::new(nyc::config(), 42).expect("nyc validates")
    }

    #[test]
    fn invalid_maps_are_refused() {
        let mut config = nyc::config();
        config.streets.clear();
        let err = GameSession::new(config.clone(), 1).err();
        assert_eq!(err, Some(MapConfigError::NoStreets { map: nyc::MAP_ID }));

        let mut session = session();
        let bodies = session.collision().len();
        assert!(session.swap_map(config).is_err());
        assert_eq!(session.config().id, nyc::MAP_ID);
        assert_eq!(session.collision().len(), bodies);
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut session = session();
        let report = session.advance(5.0, DriveIntent::NONE);
        // 0.1 s of simulation, not 5 s.
        assert!((5..=6).contains(&report.steps), "steps {}", report.steps);
        assert!(session.accumulator() < FIXED_TIMESTEP);
        assert!((session.elapsed() - MAX_FRAME_DELTA).abs() < 1.0e-6);

        let report = session.advance(f32::NAN, DriveIntent::NONE);
        assert_eq!(report.steps, 0);
        let report = session.advance(-1.0, DriveIntent::NONE);
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn small_frames_bank_time() {
        let mut session = session();
        let report = session.advance(FIXED_TIMESTEP * 0.5, DriveIntent::NONE);
        assert_eq!(report.steps, 0);
        let report = session.advance(FIXED_TIMESTEP * 0.75, DriveIntent::NONE);
        assert_eq!(report.steps, 1);
        assert!((session.accumulator() - FIXED_TIMESTEP * 0.25).abs() < 1.0e-5);
    }

    #[test]
    fn paused_sessions_stand_still() {
        let mut session = session();
        let throttle = DriveIntent::NONE.with(DriveFlag::Forward);
        session.advance(0.05, throttle);
        let before = *session.vehicle();
        let banked = session.accumulator();

        session.pause();
        assert!(session.is_paused());
        for _ in 0..30 {
            let report = session.advance(0.05, throttle);
            assert_eq!(report.steps, 0);
        }
        assert_eq!(*session.vehicle(), before);
        assert_eq!(session.accumulator(), banked);

        session.resume();
        // The paused half second is not replayed.
        let report = session.advance(0.0, throttle);
        assert_eq!(report.steps, 0);

        session.toggle_pause();
        assert!(session.is_paused());
        session.toggle_pause();
        assert!(!session.is_paused());
    }

    #[test]
    fn throttle_moves_the_car_and_camera_follows() {
        let mut session = session();
        let start = session.vehicle().position;
        let throttle = DriveIntent::NONE.with(DriveFlag::Forward);
        for _ in 0..29 {
            session.advance(1.0 / 60.0, throttle);
        }
        let report = session.advance(1.0 / 60.0, throttle);
        assert!(session.vehicle().speed > 0.0);
        assert_ne!(session.vehicle().position, start);
        assert_eq!(report.speed_kmh, session.vehicle().speed_kmh());
        assert_eq!(report.position, session.vehicle().position);

        let settings = session.camera().settings;
        let lag = (session.camera().position() - settings.target(session.vehicle())).norm();
        assert!(lag <= settings.max_lag + 1.0e-4);
    }

    #[test]
    fn custom_tuning_and_camera_are_used() {
        let tuning = DriveTuning {
            max_speed: 5.0,
            ..DriveTuning::default()
        };
        let camera = ChaseCameraSettings {
            fov_degrees: 90.0,
            ..ChaseCameraSettings::default()
        };
        let mut session =
            GameSession::with_settings(nyc::config(), 42, tuning, camera).expect("nyc validates");
        assert_eq!(session.camera().settings.fov_degrees, 90.0);

        let throttle = DriveIntent::NONE.with(DriveFlag::Forward);
        for _ in 0..120 {
            session.advance(1.0 / 60.0, throttle);
            assert!(session.vehicle().speed <= 5.0 + 1.0e-4);
        }
        assert_eq!(session.tuning().max_speed, 5.0);
    }

    #[test]
    fn swapping_maps_rebuilds_identically() {
        let mut session = session();
        let bodies = session.collision().len();
        let buildings = session.world().stats.buildings;

        session.swap_map(tokyo::config()).expect("tokyo validates");
        assert_eq!(session.world().map_id, tokyo::MAP_ID);
        assert_eq!(session.generation(), 1);
        let spawn = tokyo::config().spawn;
        assert_eq!(
            session.vehicle().planar_position(),
            nalgebra::Vector2::new(spawn.x, spawn.z)
        );

        session.swap_map(nyc::config()).expect("nyc validates");
        assert_eq!(session.collision().len(), bodies);
        assert_eq!(session.world().stats.buildings, buildings);
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn car_swaps_respawn() {
        let mut session = session();
        let throttle = DriveIntent::NONE.with(DriveFlag::Forward);
        for _ in 0..20 {
            session.advance(1.0 / 60.0, throttle);
        }
        let model = session.swap_car_model(DEFAULT_CAR_MODEL);
        assert_eq!(model.key, DEFAULT_CAR_MODEL);
        assert_eq!(session.vehicle().speed, 0.0);

        let model = session.swap_car_model("no-such-car");
        assert_eq!(model.key, DEFAULT_CAR_MODEL);
        assert_eq!(session.car_model().key, DEFAULT_CAR_MODEL);
    }
}
