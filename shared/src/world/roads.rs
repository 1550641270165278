use super::{Builder, InstanceBatch, Layer, Material, Primitive, Transform};
use crate::palette;

const DASH_LENGTH: f32 = 3.0;
const DASH_GAP: f32 = 25.0;
const DASH_WIDTH: f32 = 0.1;
const CENTRE_LINE_WIDTH: f32 = 0.15;
const CURB_HEIGHT: f32 = 0.15;

/// Segments shorter than this are skipped.
const MIN_ROAD_LENGTH: f32 = 1.0;

/// Flat roads. Bridge segments are drawn by the bridge pass with elevation.
pub(super) fn build(b: &mut Builder<'_>) {
    let config = b.config;
    let sidewalk = config.sidewalk_width;
    let mut dashes = InstanceBatch::new(
        "lane_dash",
        Layer::Road,
        Primitive::plane(DASH_WIDTH, DASH_LENGTH),
        Material::solid(palette::ROAD_LINE),
    );
    let dash_step = DASH_LENGTH + DASH_GAP;

    for seg in &config.streets {
        if seg.is_bridge() {
            continue;
        }
        let length = seg.length();
        if length < MIN_ROAD_LENGTH {
            tracing::trace!(start = ?seg.start, end = ?seg.end, "skipping degenerate road segment");
            continue;
        }
        let Some(perp) = seg.left_normal() else {
            continue;
        };
        let angle = seg.angle();
        let mid = seg.midpoint();
        let dir = seg.delta() / length;

        b.mesh(
            Layer::Road,
            Primitive::plane(seg.width, length),
            Material::solid(palette::ROAD),
            Transform::at(mid.x, 0.01, mid.y).with_yaw(angle),
        );
        b.mesh(
            Layer::Road,
            Primitive::plane(CENTRE_LINE_WIDTH, length),
            Material::solid(palette::ROAD_LINE),
            Transform::at(mid.x, 0.02, mid.y).with_yaw(angle),
        );

        let dash_count = (length / dash_step).floor() as usize;
        for lane in [-seg.width / 4.0, seg.width / 4.0] {
            let offset = perp * lane;
            for d in 0..dash_count {
                let t = (d as f32 * dash_step + DASH_LENGTH / 2.0) / length - 0.5;
                let p = mid + dir * (t * length) + offset;
                dashes
                    .instances
                    .push(Transform::at(p.x, 0.025, p.y).with_yaw(angle));
            }
        }

        let curb_offset = seg.width / 2.0 + sidewalk / 2.0;
        for side in [-1.0, 1.0] {
            let p = mid + perp * (curb_offset * side);
            b.mesh(
                Layer::Road,
                Primitive::cuboid(sidewalk, CURB_HEIGHT, length),
                Material::solid(palette::SIDEWALK),
                Transform::at(p.x, CURB_HEIGHT / 2.0, p.y).with_yaw(angle),
            );
        }
    }

    b.batch(dashes);
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        collision::CollisionWorld,
        elevation::ElevationField,
        map::{MapConfig, StreetKind, StreetSegment, tokyo},
        world::GeneratedWorld,
    };

    fn roads_for(config: &MapConfig) -> GeneratedWorld {
        let elevation = ElevationField::flat();
        let mut collision = CollisionWorld::new();
        let mut rng = Pcg32::seed_from_u64(0);
        let mut b = Builder {
            config,
            elevation: &elevation,
            collision: &mut collision,
            rng: &mut rng,
            out: GeneratedWorld::empty(config.id),
        };
        build(&mut b);
        b.out
    }

    #[test]
    fn each_road_gets_surface_line_and_curbs() {
        let mut config = tokyo::config();
        config.streets = vec![
            StreetSegment::new(StreetKind::Avenue, (0.0, 0.0), (0.0, 100.0), 14.0),
            StreetSegment::new(StreetKind::Bridge, (50.0, 0.0), (50.0, 100.0), 14.0),
            StreetSegment::new(StreetKind::Street, (5.0, 5.0), (5.0, 5.5), 8.0),
        ];
        let world = roads_for(&config);
        assert_eq!(world.meshes.len(), 4);

        // 100 / 28 -> 3 dashes per lane, two lanes.
        let dashes = world.batch("lane_dash").map(|b| b.instances.len());
        assert_eq!(dashes, Some(6));

        let curbs: Vec<_> = world
            .meshes
            .iter()
            .filter(|m| matches!(m.primitive, Primitive::Box { .. }))
            .collect();
        assert_eq!(curbs.len(), 2);
        for curb in curbs {
            assert!((curb.transform.translation.x.abs() - 8.0).abs() < 1.0e-4);
        }
    }
}
