//! Ground plane and street furniture.

use super::{Builder, InstanceBatch, Layer, Material, Primitive, Transform};
use crate::{
    constants::{LAMP_HEIGHT, LAMP_SPACING},
    map::Bounds,
    palette::{self, Color},
};

/// Ground extends this far past the map bounds.
const GROUND_PAD: f32 = 100.0;

const CONE_ATTEMPTS: usize = 40;
const CONE_LATERAL_SPREAD: f32 = 0.6;

pub(super) fn build_ground(b: &mut Builder<'_>) {
    let outer = b.config.bounds.inset(-GROUND_PAD);
    let rects = match b.config.water_zones.first() {
        Some(water) => ground_around(&outer, &water.bounds),
        None => vec![outer],
    };
    for r in rects {
        let c = r.center();
        b.mesh(
            Layer::Ground,
            Primitive::plane(r.width(), r.depth()),
            Material::solid(palette::GROUND),
            Transform::at(c.x, 0.0, c.y),
        );
    }
}

/// Up to four rectangles covering `outer` minus the `hole`: full-height strips west and
/// east of it, and strips north and south between them. Empty pieces are dropped.
pub(super) fn ground_around(outer: &Bounds, hole: &Bounds) -> Vec<Bounds> {
    [
        Bounds::new(outer.min_x, hole.min_x, outer.min_z, outer.max_z),
        Bounds::new(hole.max_x, outer.max_x, outer.min_z, outer.max_z),
        Bounds::new(hole.min_x, hole.max_x, hole.max_z, outer.max_z),
        Bounds::new(hole.min_x, hole.max_x, outer.min_z, hole.min_z),
    ]
    .into_iter()
    .filter(|r| r.width() > 0.0 && r.depth() > 0.0)
    .collect()
}

/// Lamps every `2 * LAMP_SPACING` along each road, alternating sides, raised onto
/// bridge decks.
pub(super) fn build_lamps(b: &mut Builder<'_>) {
    let config = b.config;
    let elevation = b.elevation;
    let spacing = LAMP_SPACING * 2.0;

    let mut poles = InstanceBatch::new(
        "lamp_pole",
        Layer::Prop,
        Primitive::cylinder(0.08, 0.1, LAMP_HEIGHT, 5),
        Material::solid(palette::LAMP_POLE),
    );
    let mut heads = InstanceBatch::new(
        "lamp_head",
        Layer::Prop,
        Primitive::Sphere { radius: 0.25 },
        Material::solid(palette::STREET_LAMP),
    );
    let mut glows = InstanceBatch::new(
        "lamp_glow",
        Layer::Prop,
        Primitive::Disc { radius: 3.0 },
        Material::translucent(palette::STREET_LAMP, 0.08),
    );

    for seg in &config.streets {
        let length = seg.length();
        if length < spacing {
            continue;
        }
        let Some(perp) = seg.left_normal() else {
            continue;
        };
        let dir = seg.delta() / length;
        let curb_offset = seg.width / 2.0 + config.sidewalk_width / 2.0;
        let mut side = 1.0;

        let mut d = 0.0;
        while d < length {
            let p = seg.start + dir * d;
            let lamp = p + perp * (curb_offset * side);
            let base_y = if seg.is_bridge() {
                elevation.get_elevation(p.x, p.y)
            } else {
                0.0
            };
            poles.push(lamp.x, base_y + LAMP_HEIGHT / 2.0, lamp.y);
            heads.push(lamp.x, base_y + LAMP_HEIGHT, lamp.y);
            glows.push(lamp.x, base_y + 0.02, lamp.y);
            side = -side;
            d += spacing;
        }
    }

    b.out.stats.lamps += poles.instances.len();
    b.batch(poles);
    b.batch(heads);
    b.batch(glows);
}

/// A few cones dropped at random points on random flat roads.
pub(super) fn build_cones(b: &mut Builder<'_>) {
    let config = b.config;
    let mut cones = InstanceBatch::new(
        "cone",
        Layer::Prop,
        Primitive::Cone {
            radius: 0.2,
            height: 0.6,
            segments: 6,
        },
        Material::solid(palette::NEON_ORANGE),
    );
    let mut stripes = InstanceBatch::new(
        "cone_stripe",
        Layer::Prop,
        Primitive::cylinder(0.18, 0.15, 0.08, 6),
        Material::solid(Color::hex(0xffffff)),
    );

    for _ in 0..CONE_ATTEMPTS {
        let Some(i) = b.index(config.streets.len()) else {
            break;
        };
        let seg = &config.streets[i];
        if seg.is_bridge() {
            continue;
        }
        let t = b.random();
        let offset = (b.random() - 0.5) * seg.width * CONE_LATERAL_SPREAD;
        let Some(perp) = seg.left_normal() else {
            continue;
        };
        if seg.length() < 1.0 {
            continue;
        }
        let p = seg.point_at(t) + perp * offset;
        cones.push(p.x, 0.3, p.y);
        stripes.push(p.x, 0.35, p.y);
    }

    b.out.stats.cones += cones.instances.len();
    b.batch(cones);
    b.batch(stripes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_wraps_the_river() {
        let outer = Bounds::new(-950.0, 1250.0, -1100.0, 1100.0);
        let river = Bounds::new(-500.0, -300.0, -900.0, 500.0);
        let pieces = ground_around(&outer, &river);
        assert_eq!(pieces.len(), 4);

        let area: f32 = pieces.iter().map(|r| r.width() * r.depth()).sum();
        let expected = outer.width() * outer.depth() - river.width() * river.depth();
        assert!((area - expected).abs() < 1.0);
        for p in &pieces {
            assert!(!p.contains(-400.0, 0.0));
        }
    }

    #[test]
    fn ground_pieces_with_no_area_are_dropped() {
        let outer = Bounds::new(0.0, 100.0, 0.0, 100.0);
        // Hole flush with the west and south edges.
        let hole = Bounds::new(0.0, 50.0, 0.0, 50.0);
        let pieces = ground_around(&outer, &hole);
        assert_eq!(pieces.len(), 2);
    }
}
