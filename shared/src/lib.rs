pub mod bitmask_flags;
pub mod camera;
pub mod car_rig;
pub mod cell;
pub mod collision;
pub mod constants;
pub mod elevation;
pub mod input;
pub mod map;
pub mod minimap;
pub mod palette;
pub mod physics;
pub mod postfx;
pub mod session;
pub mod utils;
pub mod vehicle;
pub mod world;

pub use camera::{ChaseCamera, ChaseCameraSettings};
pub use collision::{CollisionWorld, StaticBody};
pub use constants::{FIXED_TIMESTEP, MAX_FRAME_DELTA};
pub use elevation::{ElevationField, HeightField};
pub use input::{DriveFlag, DriveIntent};
pub use map::{MapConfig, MapConfigError, get_map_config, map_list, next_map_id};
pub use physics::{DriveTuning, step_vehicle};
pub use postfx::{Pass, PostFxChain, PostFxSettings};
pub use session::{FrameReport, GameSession};
pub use vehicle::{CAR_MODELS, CarModel, VehicleState};
pub use world::{GeneratedWorld, WorldGenerator};
