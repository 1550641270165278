use super::{
    settings::SAT_AXIS_COUNT,
    types::{Aabb2, Interval, Obb2, Penetration, Vec2},
};

/// Separating-axis test of the car rectangle against an axis-aligned body.
///
/// Tested axes: car forward, car right, world X, world Z. If any axis shows zero or
/// negative overlap the shapes are apart and `None` is returned. Otherwise the axis of
/// least overlap gives the push, signed so it points from the body's center toward the car's.
pub fn obb_vs_aabb(car: &Obb2, body: &Aabb2) -> Option<Penetration> {
    let car_corners = car.corners();
    let body_corners = body.corners();

    let mut best: Option<Penetration> = None;
    for axis in sat_axes(car) {
        let a = Interval::project(&car_corners, &axis);
        let b = Interval::project(&body_corners, &axis);
        let overlap = a.overlap(&b);
        if overlap <= 0.0 {
            return None;
        }
        if best.is_none_or(|p| overlap < p.depth) {
            best = Some(Penetration {
                normal: axis,
                depth: overlap,
            });
        }
    }

    best.map(|mut p| {
        let separation = car.center - body.center();
        if separation.dot(&p.normal) < 0.0 {
            p.normal = -p.normal;
        }
        p
    })
}

/// The shortest way out of `body` along each tested axis, in [`obb_vs_aabb`]'s axis
/// order. Unlike the minimum push these are signed by the nearer face, so every entry
/// separates the shapes on its own. `None` when the shapes are apart.
pub fn escape_pushes(car: &Obb2, body: &Aabb2) -> Option<[Penetration; SAT_AXIS_COUNT]> {
    let car_corners = car.corners();
    let body_corners = body.corners();

    let mut pushes = [Penetration {
        normal: Vec2::zeros(),
        depth: 0.0,
    }; SAT_AXIS_COUNT];
    for (slot, axis) in pushes.iter_mut().zip(sat_axes(car)) {
        let a = Interval::project(&car_corners, &axis);
        let b = Interval::project(&body_corners, &axis);
        let along = b.max - a.min;
        let against = a.max - b.min;
        if along.min(against) <= 0.0 {
            return None;
        }
        *slot = if against < along {
            Penetration {
                normal: -axis,
                depth: against,
            }
        } else {
            Penetration {
                normal: axis,
                depth: along,
            }
        };
    }
    Some(pushes)
}

/// Car forward, car right, world X, world Z.
#[inline]
fn sat_axes(car: &Obb2) -> [Vec2; SAT_AXIS_COUNT] {
    [car.forward, car.right, Vec2::x(), Vec2::y()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn car_at(x: f32, z: f32, heading: f32) -> Obb2 {
        Obb2::new(Vec2::new(x, z), heading, 2.0, 4.5)
    }

    #[test]
    fn separated_shapes_do_not_collide() {
        let body = Aabb2::new(10.0, 10.0, 20.0, 20.0);
        assert!(obb_vs_aabb(&car_at(0.0, 0.0, 0.0), &body).is_none());
    }

    #[test]
    fn touching_edges_do_not_collide() {
        // Car spans x in [-1, 1]; body starts exactly at x = 1.
        let body = Aabb2::new(1.0, -5.0, 5.0, 5.0);
        assert!(obb_vs_aabb(&car_at(0.0, 0.0, 0.0), &body).is_none());
    }

    #[test]
    fn push_picks_least_overlap_and_points_away_from_body() {
        // Car overlaps the west face by 0.5 on X; Z overlap is much larger.
        let body = Aabb2::new(0.5, -10.0, 10.0, 10.0);
        let hit = obb_vs_aabb(&car_at(0.0, 0.0, 0.0), &body).unwrap();
        assert!((hit.depth - 0.5).abs() < 1.0e-5);
        assert!(hit.normal.x < -0.99);
        assert!(hit.normal.y.abs() < 1.0e-5);
    }

    #[test]
    fn rotated_car_gap_on_own_axis_is_detected() {
        // At 45 degrees the world-axis AABBs of car and body overlap, but the car's own
        // axis separates them.
        let car = car_at(0.0, 0.0, FRAC_PI_4);
        let body = Aabb2::new(1.2, -2.8, 2.8, -1.2);
        assert!(car.aabb().overlaps(&body));
        assert!(obb_vs_aabb(&car, &body).is_none());
    }

    #[test]
    fn escapes_leave_the_body_through_the_nearer_face() {
        // Car spans x in [-1, 1] and z in [-2.25, 2.25].
        let body = Aabb2::new(0.7, 1.75, 10.0, 10.0);
        let car = car_at(0.0, 0.0, 0.0);
        let pushes = escape_pushes(&car, &body).unwrap();

        // World X: out through the west face.
        assert!((pushes[2].depth - 0.3).abs() < 1.0e-5);
        assert!(pushes[2].normal.x < -0.99);
        // World Z: out through the south face.
        assert!((pushes[3].depth - 0.5).abs() < 1.0e-5);
        assert!(pushes[3].normal.y < -0.99);

        for push in pushes {
            let moved = Obb2::new(car.center + push.push(), 0.0, 2.0, 4.5);
            assert!(obb_vs_aabb(&moved, &body).is_none_or(|c| c.depth < 1.0e-4));
        }
        assert!(escape_pushes(&car_at(50.0, 0.0, 0.0), &body).is_none());
    }

    #[test]
    fn push_sign_follows_center_offset_from_north() {
        let body = Aabb2::new(-5.0, -5.0, 5.0, 1.0);
        let hit = obb_vs_aabb(&car_at(0.0, 2.5, 0.0), &body).unwrap();
        assert!(hit.normal.y > 0.99);
        assert!((hit.depth - 0.75).abs() < 1.0e-5);
    }
}
