//! Rivers: a dark translucent surface, bloom highlights, and bank walls the car cannot
//! cross except where a bridge lands.

use super::{Builder, Layer, Material, Primitive, Transform};
use crate::{
    collision::StaticBody,
    map::{BridgeDef, Bounds},
    palette::Color,
};

const WATER_COLOR: Color = Color::hex(0x0a1525);
const WATER_OPACITY: f32 = 0.9;
const WATER_Y: f32 = -0.5;
const HIGHLIGHT_COLOR: Color = Color::hex(0x1a3555);
const HIGHLIGHT_COUNT: usize = 60;
const BANK_COLOR: Color = Color::hex(0x1a1a2a);
const BANK_HEIGHT: f32 = 1.5;
const BANK_THICKNESS: f32 = 0.4;
/// Bottom of the bank walls' vertical band.
const BANK_FLOOR: f32 = -1.0;
/// Bank gaps are this much wider than half a bridge deck.
const GAP_MARGIN: f32 = 3.0;

pub(super) fn build(b: &mut Builder<'_>) {
    let config = b.config;
    for zone in &config.water_zones {
        let bounds = zone.bounds;
        let c = bounds.center();
        let (w, d) = (bounds.width(), bounds.depth());

        b.mesh(
            Layer::Water,
            Primitive::plane(w, d),
            Material::translucent(WATER_COLOR, WATER_OPACITY),
            Transform::at(c.x, WATER_Y, c.y),
        );

        for _ in 0..HIGHLIGHT_COUNT {
            let size = b.range(1.0, 5.0);
            let depth = size * b.range(0.3, 1.0);
            let x = bounds.min_x + b.random() * w;
            let z = bounds.min_z + b.random() * d;
            b.mesh(
                Layer::Water,
                Primitive::plane(size, depth),
                Material::translucent(HIGHLIGHT_COLOR, 0.15),
                Transform::at(x, WATER_Y + 0.02, z),
            );
        }

        bank_walls(b, &bounds);
        bank_collision(b, &bounds, &config.bridges);
    }
}

fn bank_walls(b: &mut Builder<'_>, bounds: &Bounds) {
    let c = bounds.center();
    let y = BANK_HEIGHT / 2.0 + WATER_Y;
    let ns = Primitive::cuboid(BANK_THICKNESS, BANK_HEIGHT, bounds.depth());
    let ew = Primitive::cuboid(bounds.width(), BANK_HEIGHT, BANK_THICKNESS);
    let placements = [
        (ns.clone(), bounds.min_x, c.y),
        (ns, bounds.max_x, c.y),
        (ew.clone(), c.x, bounds.min_z),
        (ew, c.x, bounds.max_z),
    ];
    for (shape, x, z) in placements {
        b.mesh(
            Layer::Water,
            shape,
            Material::solid(BANK_COLOR),
            Transform::at(x, y, z),
        );
    }
}

fn bank_collision(b: &mut Builder<'_>, bounds: &Bounds, bridges: &[BridgeDef]) {
    let t = BANK_THICKNESS;
    let gaps: Vec<(f32, f32)> = bridges
        .iter()
        .filter(|br| {
            br.start.x.min(br.end.x) <= bounds.max_x && br.start.x.max(br.end.x) >= bounds.min_x
        })
        .map(|br| (br.start.y, br.width / 2.0 + GAP_MARGIN))
        .collect();

    for wall_x in [bounds.min_x, bounds.max_x] {
        for (z0, z1) in wall_spans_with_gaps(bounds.min_z, bounds.max_z, &gaps) {
            b.solid(
                StaticBody::new(wall_x - t, z0, wall_x + t, z1)
                    .with_vertical_band(BANK_FLOOR, BANK_HEIGHT),
            );
        }
    }
    for wall_z in [bounds.min_z, bounds.max_z] {
        b.solid(
            StaticBody::new(bounds.min_x, wall_z - t, bounds.max_x, wall_z + t)
                .with_vertical_band(BANK_FLOOR, BANK_HEIGHT),
        );
    }
}

/// Solid spans of a wall running `min..max` once each `(center, half_width)` gap is
/// cut out. Gaps are processed in order of their start; overlapping gaps merge.
pub fn wall_spans_with_gaps(min: f32, max: f32, gaps: &[(f32, f32)]) -> Vec<(f32, f32)> {
    let mut sorted: Vec<(f32, f32)> = gaps.iter().map(|(c, h)| (c - h, c + h)).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut spans = Vec::with_capacity(sorted.len() + 1);
    let mut cursor = min;
    for (start, end) in sorted {
        if cursor < start {
            spans.push((cursor, start.min(max)));
        }
        cursor = cursor.max(end);
        if cursor >= max {
            break;
        }
    }
    if cursor < max {
        spans.push((cursor, max));
    }
    spans.retain(|(a, b)| b > a);
    spans
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        collision::CollisionWorld, elevation::ElevationField, map::nyc, vehicle::VehicleState,
        world::GeneratedWorld,
    };

    #[test]
    fn gaps_are_cut_in_order() {
        // Unsorted input, one gap per bridge.
        let gaps = [(0.0, 10.0), (-600.0, 10.0), (-350.0, 10.0)];
        let spans = wall_spans_with_gaps(-900.0, 500.0, &gaps);
        assert_eq!(
            spans,
            vec![
                (-900.0, -610.0),
                (-590.0, -360.0),
                (-340.0, -10.0),
                (10.0, 500.0)
            ]
        );
    }

    #[test]
    fn gap_edge_cases() {
        assert_eq!(wall_spans_with_gaps(0.0, 100.0, &[]), vec![(0.0, 100.0)]);
        // Gap touching the start.
        assert_eq!(wall_spans_with_gaps(0.0, 100.0, &[(0.0, 5.0)]), vec![(5.0, 100.0)]);
        // Overlapping gaps merge.
        assert_eq!(
            wall_spans_with_gaps(0.0, 100.0, &[(20.0, 5.0), (27.0, 5.0)]),
            vec![(0.0, 15.0), (32.0, 100.0)]
        );
        // Gap covering everything.
        assert!(wall_spans_with_gaps(0.0, 100.0, &[(50.0, 80.0)]).is_empty());
    }

    #[test]
    fn bridges_pass_through_the_banks() {
        let config = nyc::config();
        let elevation = ElevationField::new(&config);
        let mut collision = CollisionWorld::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut b = Builder {
            config: &config,
            elevation: &elevation,
            collision: &mut collision,
            rng: &mut rng,
            out: GeneratedWorld::empty(config.id),
        };
        build(&mut b);
        // Three bridges leave four spans on each of west and east, plus north and south.
        assert_eq!(b.out.stats.static_bodies, 10);

        let river = config.water_zones[0].bounds;
        // At ground level on the williamsburg approach the car is inside the gap.
        let mut car = VehicleState::new(river.max_x, 0.0, std::f32::consts::FRAC_PI_2);
        assert!(!collision.resolve(&mut car));

        // Away from any bridge the bank blocks.
        let mut car = VehicleState::new(river.max_x, 200.0, std::f32::consts::FRAC_PI_2);
        assert!(collision.resolve(&mut car));

        // Raised on a deck the bank is below the car.
        let mut car = VehicleState::new(river.max_x, 200.0, 0.0);
        car.position.y = 10.0;
        assert!(!collision.resolve(&mut car));
    }
}
