use tracing::{debug, trace};

use crate::{
    cell::CellCoord,
    constants::{CAR_LENGTH, CAR_WIDTH},
    vehicle::VehicleState,
};

use super::{
    broad::{CandidateScratch, SpatialHash, gather_candidates},
    narrow_phase::{escape_pushes, obb_vs_aabb},
    settings::{
        CANDIDATE_SCRATCH_CAPACITY, COLLISION_SPEED_FACTOR, MAX_RESOLVE_PASSES, MAX_SIDESTEP,
        PENETRATION_TOLERANCE,
    },
    types::{Obb2, Penetration, StaticBody, Vec2},
};

/// Owner of every static obstacle in the current map.
///
/// World generation fills it; the fixed step calls [`CollisionWorld::resolve`] once
/// after integrating the car. A map swap calls [`CollisionWorld::clear`] and rebuilds.
pub struct CollisionWorld {
    bodies: Vec<StaticBody>,
    hash: SpatialHash,
    scratch: CandidateScratch,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            hash: SpatialHash::new(),
            scratch: CandidateScratch::with_capacity(CANDIDATE_SCRATCH_CAPACITY),
        }
    }

    /// Register a body. Degenerate bodies, and bodies covering more than
    /// [`MAX_CELLS_PER_BODY`](super::settings::MAX_CELLS_PER_BODY) hash cells, are skipped and `None` is returned.
    pub fn add_static_body(&mut self, body: StaticBody) -> Option<usize> {
        if body.is_degenerate() {
            debug!(?body, "skipping degenerate static body");
            return None;
        }
        let index = self.bodies.len();
        if self.hash.insert(index, &body.bounds).is_none() {
            debug!(?body, "skipping oversized static body");
            return None;
        }
        self.bodies.push(body);
        Some(index)
    }

    /// Drop every body and cell registration.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.hash.clear();
        self.scratch.reset();
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> &[StaticBody] {
        &self.bodies
    }

    /// Bodies registered in one hash cell.
    pub fn query_cell(&self, coord: CellCoord) -> impl Iterator<Item = &StaticBody> + '_ {
        self.hash
            .cell(coord)
            .iter()
            .filter_map(|&i| self.bodies.get(i))
    }

    pub fn occupied_cells(&self) -> usize {
        self.hash.occupied_cells()
    }

    /// Oriented rectangle of the car at its current pose.
    pub fn car_shape(&self, car: &VehicleState) -> Obb2 {
        Obb2::new(
            car.planar_position(),
            car.heading,
            CAR_WIDTH,
            CAR_LENGTH,
        )
    }

    /// Push the car out of every body it overlaps.
    ///
    /// Each contact moves the car by the minimum translation, unless that would leave
    /// it inside a neighbouring body; then the shortest push along another axis (up to
    /// [`MAX_SIDESTEP`]) that leaves the least overlap behind is used instead. Pushes
    /// can open new contacts, so up to [`MAX_RESOLVE_PASSES`] further passes run
    /// until one finds nothing. Every contact in the first pass scales speed by
    /// [`COLLISION_SPEED_FACTOR`]. Returns whether any contact occurred.
    pub fn resolve(&mut self, car: &mut VehicleState) -> bool {
        if self.bodies.is_empty() {
            return false;
        }

        gather_candidates(
            &self.hash,
            self.bodies.len(),
            car.position.x,
            car.position.z,
            &mut self.scratch,
        );

        let mut hit = false;
        for pass in 0..=MAX_RESOLVE_PASSES {
            let mut moved = false;
            for slot in 0..self.scratch.candidates.len() {
                let index = self.scratch.candidates[slot];
                let Some(body) = self.bodies.get(index) else {
                    continue;
                };
                if !body.blocks_height(car.position.y) {
                    continue;
                }

                // Rebuilt per body so later tests see the corrected pose.
                let shape = self.car_shape(car);
                if !shape.aabb().overlaps(&body.bounds) {
                    continue;
                }
                let Some(contact) = obb_vs_aabb(&shape, &body.bounds) else {
                    continue;
                };

                let push = self.choose_push(&shape, body, contact, car.position.y);
                car.position.x += push.x;
                car.position.z += push.y;
                if pass == 0 {
                    car.speed *= COLLISION_SPEED_FACTOR;
                }
                hit = true;
                moved = true;
                trace!(index, pass, depth = contact.depth, "car pushed out of static body");
            }
            if !moved {
                break;
            }
        }
        hit
    }

    /// Push for one contact: the minimum translation if it leaves the car clear of the
    /// other candidates, otherwise whichever escape leaves the least overlap.
    fn choose_push(&self, shape: &Obb2, body: &StaticBody, contact: Penetration, y: f32) -> Vec2 {
        let primary = contact.push();
        let mut best = (primary, self.overlap_after(shape, primary, y));
        if best.1 <= PENETRATION_TOLERANCE {
            return primary;
        }

        let Some(mut escapes) = escape_pushes(shape, &body.bounds) else {
            return primary;
        };
        escapes.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        for escape in escapes.iter().filter(|e| e.depth <= MAX_SIDESTEP) {
            let push = escape.push();
            let overlap = self.overlap_after(shape, push, y);
            if overlap < best.1 {
                best = (push, overlap);
            }
            if overlap <= PENETRATION_TOLERANCE {
                break;
            }
        }
        best.0
    }

    /// Summed overlap depth with the current candidates once the car moves by `push`.
    fn overlap_after(&self, shape: &Obb2, push: Vec2, y: f32) -> f32 {
        let moved = Obb2 {
            center: shape.center + push,
            ..*shape
        };
        let aabb = moved.aabb();
        self.scratch
            .candidates
            .iter()
            .filter_map(|&i| self.bodies.get(i))
            .filter(|b| b.blocks_height(y) && aabb.overlaps(&b.bounds))
            .filter_map(|b| obb_vs_aabb(&moved, &b.bounds))
            .map(|c| c.depth)
            .filter(|&depth| depth > PENETRATION_TOLERANCE)
            .sum()
    }

    /// Does the car currently overlap any body at its height? Does not move the car.
    pub fn is_penetrating(&self, car: &VehicleState) -> bool {
        let shape = self.car_shape(car);
        let aabb = shape.aabb();
        self.bodies.iter().any(|body| {
            body.blocks_height(car.position.y)
                && aabb.overlaps(&body.bounds)
                && obb_vs_aabb(&shape, &body.bounds).is_some_and(|c| c.depth > PENETRATION_TOLERANCE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::cell_of;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    fn building(cx: f32, cz: f32, hx: f32, hz: f32) -> StaticBody {
        StaticBody::new(cx - hx, cz - hz, cx + hx, cz + hz)
    }

    #[test]
    fn degenerate_bodies_are_skipped() {
        let mut world = CollisionWorld::new();
        assert!(world.add_static_body(StaticBody::new(5.0, 0.0, 1.0, 1.0)).is_none());
        assert!(
            world
                .add_static_body(StaticBody::new(0.0, 0.0, f32::INFINITY, 1.0))
                .is_none()
        );
        assert_eq!(world.len(), 0);
        assert_eq!(world.add_static_body(building(0.0, 0.0, 1.0, 1.0)), Some(0));
    }

    #[test]
    fn head_on_contact_pushes_back_and_bleeds_speed() {
        let mut world = CollisionWorld::new();
        world.add_static_body(StaticBody::new(-5.0, 10.0, 5.0, 20.0));

        // Front bumper at z = 10.25, 0.25 inside the wall.
        let mut car = VehicleState::new(0.0, 8.0, 0.0);
        car.speed = 40.0;
        assert!(world.resolve(&mut car));
        assert!((car.speed - 12.0).abs() < 1.0e-4);
        assert!((car.position.z - 7.75).abs() < 1.0e-4);
        assert!(car.position.x.abs() < 1.0e-6);
        assert!(!world.is_penetrating(&car));

        // Nothing left to resolve.
        assert!(!world.resolve(&mut car));
        assert!((car.speed - 12.0).abs() < 1.0e-4);
    }

    #[test]
    fn bodies_outside_vertical_band_are_ignored() {
        let mut world = CollisionWorld::new();
        world.add_static_body(building(0.0, 0.0, 3.0, 3.0).with_vertical_band(-1.0, 1.5));

        let mut car = VehicleState::new(0.0, 1.0, 0.0);
        car.position.y = 10.0;
        car.speed = 20.0;
        assert!(!world.resolve(&mut car));
        assert_eq!(car.speed, 20.0);

        car.position.y = 0.0;
        assert!(world.resolve(&mut car));
    }

    #[test]
    fn query_cell_returns_body_in_all_overlapped_cells() {
        let mut world = CollisionWorld::new();
        world.add_static_body(StaticBody::new(-10.0, -10.0, 110.0, 10.0));
        for x in [-5.0, 25.0, 75.0, 105.0] {
            for z in [-5.0, 5.0] {
                assert_eq!(world.query_cell(cell_of(x, z)).count(), 1, "x={x} z={z}");
            }
        }
        assert_eq!(world.occupied_cells(), 8);
        world.clear();
        assert!(world.is_empty());
        assert_eq!(world.query_cell(cell_of(0.0, 0.0)).count(), 0);
    }

    #[test]
    fn every_overlapping_body_is_found_by_the_hash() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut world = CollisionWorld::new();
        for _ in 0..300 {
            let cx = rng.random_range(-400.0..400.0);
            let cz = rng.random_range(-400.0..400.0);
            let hx = rng.random_range(0.5..20.0);
            let hz = rng.random_range(0.5..20.0);
            world.add_static_body(building(cx, cz, hx, hz));
        }

        for _ in 0..500 {
            let car = VehicleState::new(
                rng.random_range(-400.0..400.0),
                rng.random_range(-400.0..400.0),
                rng.random_range(-3.1..3.1),
            );
            let shape = world.car_shape(&car);
            let brute: Vec<usize> = world
                .bodies()
                .iter()
                .enumerate()
                .filter(|(_, b)| obb_vs_aabb(&shape, &b.bounds).is_some())
                .map(|(i, _)| i)
                .collect();

            gather_candidates(
                &world.hash,
                world.bodies.len(),
                car.position.x,
                car.position.z,
                &mut world.scratch,
            );
            for i in brute {
                assert!(world.scratch.candidates.contains(&i));
            }
        }
    }

    fn resolved(bodies: &[StaticBody]) -> (bool, VehicleState, bool) {
        let mut world = CollisionWorld::new();
        for body in bodies {
            world.add_static_body(*body);
        }
        let mut car = VehicleState::new(0.0, 0.0, 0.0);
        car.speed = 10.0;
        let hit = world.resolve(&mut car);
        let penetrating = world.is_penetrating(&car);
        (hit, car, penetrating)
    }

    #[test]
    fn corner_push_does_not_land_in_a_neighbouring_wall() {
        // The car spans x in [-1, 1] and z in [-2.25, 2.25]. Leaving the box by its
        // west face (0.3) would put the car 0.2 into the wall; the south face (0.5)
        // clears both.
        let wall = StaticBody::new(-10.0, -10.0, -1.1, 10.0);
        let boxed = StaticBody::new(0.7, 1.75, 10.0, 10.0);
        for bodies in [[wall, boxed], [boxed, wall]] {
            let (hit, car, penetrating) = resolved(&bodies);
            assert!(hit);
            assert!(!penetrating, "car left at {:?}", car.position);
            assert!((car.position.z + 0.5).abs() < 1.0e-4);
            assert!(car.position.x.abs() < 1.0e-4);
            assert!((car.speed - 3.0).abs() < 1.0e-4);
        }
    }

    #[test]
    fn three_adjacent_bodies_are_all_cleared() {
        let wall = StaticBody::new(-10.0, -10.0, -1.1, 10.0);
        let north = StaticBody::new(0.7, 1.75, 10.0, 10.0);
        let south = StaticBody::new(0.9, -10.0, 10.0, -1.0);
        let orders = [
            [wall, north, south],
            [wall, south, north],
            [north, south, wall],
            [south, north, wall],
        ];
        for bodies in orders {
            let (hit, car, penetrating) = resolved(&bodies);
            assert!(hit);
            assert!(!penetrating, "car left at {:?}", car.position);
        }
    }

    #[test]
    fn push_into_an_earlier_body_is_undone_on_a_later_pass() {
        // Two walls closer together than the car is wide cannot both be cleared; the
        // resolver still stops after its bounded passes.
        let west = StaticBody::new(-10.0, -10.0, -0.8, 10.0);
        let east = StaticBody::new(0.8, -10.0, 10.0, 10.0);
        let (hit, car, _) = resolved(&[west, east]);
        assert!(hit);
        assert!(car.position.x.is_finite());
    }

    #[test]
    fn single_body_never_penetrates_after_resolve() {
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..500 {
            let mut world = CollisionWorld::new();
            world.add_static_body(building(0.0, 0.0, rng.random_range(1.0..15.0), rng.random_range(1.0..15.0)));
            let mut car = VehicleState::new(
                rng.random_range(-16.0..16.0),
                rng.random_range(-16.0..16.0),
                rng.random_range(-3.1..3.1),
            );
            car.speed = 30.0;
            let before = car.speed;
            let hit = world.resolve(&mut car);
            assert!(!world.is_penetrating(&car));
            if hit {
                assert!((car.speed - before * COLLISION_SPEED_FACTOR).abs() < 1.0e-4);
            } else {
                assert_eq!(car.speed, before);
            }
        }
    }
}
