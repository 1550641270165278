/*!
Collision settings and tolerances.

These constants centralize the parameters used by the spatial hash, the
separating-axis test and the crash response. Keeping them together makes tuning
easier and keeps every caller on the same grid.

Notes
- Distances are in world units (roughly meters).
- The hash cell is much larger than the car, so a 3x3 neighbourhood always covers it.
*/

/// Side length of one spatial hash cell (world units).
pub const HASH_CELL_SIZE: f32 = 50.0;

/// Speed multiplier applied for every body the car is pushed out of.
pub const COLLISION_SPEED_FACTOR: f32 = 0.3;

/// Extra height tolerance on both ends of a body's vertical band.
pub const VERTICAL_MARGIN: f32 = 1.0;

/// Most hash cells a single body may cover (a square roughly 6.4 km on a side).
/// Larger bodies are refused rather than registered cell by cell.
pub const MAX_CELLS_PER_BODY: u64 = 128 * 128;

/// Extra push-out passes after the first, for contacts created by an earlier push.
pub const MAX_RESOLVE_PASSES: usize = 3;

/// Longest push along a non-minimal axis when the minimal one would land the car in a
/// neighbouring body.
pub const MAX_SIDESTEP: f32 = 2.0;

/// Overlap below this depth counts as touching.
pub const PENETRATION_TOLERANCE: f32 = 1.0e-4;

/// Number of axes tested by the separating-axis test (car forward/right, world X/Z).
pub const SAT_AXIS_COUNT: usize = 4;

/// Initial capacity of the candidate scratch buffer. Grows if a neighbourhood is denser.
pub const CANDIDATE_SCRATCH_CAPACITY: usize = 256;
