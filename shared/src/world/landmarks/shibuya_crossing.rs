//! Scramble crossing: zebra rows both ways, two diagonals, big screens on poles and
//! neon glow strips.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::{
    Billboard, BillboardStyle, Builder, GlowStrips, InstanceBatch, Layer, Material, Primitive,
    Transform, billboard, steps,
};
use crate::{
    map::Bounds,
    palette::{Color, NEON_BLUE, NEON_PINK},
};

const STYLE: BillboardStyle = BillboardStyle {
    frame: Color::hex(0x1a1a1a),
    frame_pad: 0.6,
    frame_depth: 0.4,
    pole: Color::hex(0x222222),
    pole_radius: 0.25,
    base: (12.0, 37.0),
    face_offset: 0.25,
    stripe_offset: 0.3,
    min_stripes: 3,
    extra_stripes: 3,
    stripe_height: (0.6, 2.6),
    stripe_width: (0.2, 0.8),
    stripe_band: (0.15, 0.7),
};

const ZEBRA: Color = Color::hex(0xffffff);
const ZEBRA_Y: f32 = 0.03;
const ROW_START: f32 = 20.0;
const ROW_SPACING: f32 = 30.0;
/// Bars inside a row start this far in from the edge.
const BAR_INSET: f32 = 5.0;
const BAR_PITCH: f32 = 4.0;
const DIAGONAL_BARS: usize = 12;
/// Diagonals cover this share of the plaza on each axis.
const DIAGONAL_REACH: f32 = 0.6;

pub(super) fn build(b: &mut Builder<'_>, bounds: &Bounds) {
    crosswalks(b, bounds);
    for board in billboards(bounds) {
        billboard(b, &STYLE, board);
    }
    GlowStrips {
        name: "shibuya_strip",
        color: NEON_PINK,
        opacity: 0.15,
        start: 8.0,
        spacing: 15.0,
        thickness: 1.2,
        y: 0.04,
    }
    .east_west(b, bounds);
    GlowStrips {
        name: "shibuya_accent",
        color: NEON_BLUE,
        opacity: 0.1,
        start: 15.0,
        spacing: 20.0,
        thickness: 0.8,
        y: 0.045,
    }
    .north_south(b, bounds);
}

fn crosswalks(b: &mut Builder<'_>, bounds: &Bounds) {
    let zebra = Material::translucent(ZEBRA, 0.18);
    let mut east_west = InstanceBatch::new(
        "crosswalk_ew",
        Layer::Landmark,
        Primitive::plane(2.5, 0.8),
        zebra,
    );
    for z in steps(bounds.min_z + ROW_START, bounds.max_z, ROW_SPACING) {
        for x in steps(bounds.min_x + BAR_INSET, bounds.max_x - BAR_INSET, BAR_PITCH) {
            east_west.push(x, ZEBRA_Y, z);
        }
    }
    let mut north_south = InstanceBatch::new(
        "crosswalk_ns",
        Layer::Landmark,
        Primitive::plane(0.8, 2.5),
        zebra,
    );
    for x in steps(bounds.min_x + ROW_START, bounds.max_x, ROW_SPACING) {
        for z in steps(bounds.min_z + BAR_INSET, bounds.max_z - BAR_INSET, BAR_PITCH) {
            north_south.push(x, ZEBRA_Y, z);
        }
    }
    b.batch(east_west);
    b.batch(north_south);

    let c = bounds.center();
    let (w, d) = (bounds.width(), bounds.depth());
    let diagonal = Material::translucent(ZEBRA, 0.12);
    for i in 0..DIAGONAL_BARS {
        let t = (i as f32 + 0.5) / DIAGONAL_BARS as f32 - 0.5;
        let dx = t * w * DIAGONAL_REACH;
        let dz = t * d * DIAGONAL_REACH;
        for (z, yaw) in [(c.y + dz, FRAC_PI_4), (c.y - dz, -FRAC_PI_4)] {
            b.mesh(
                Layer::Landmark,
                Primitive::plane(0.6, 3.0),
                diagonal,
                Transform::at(c.x + dx, ZEBRA_Y + 0.005, z).with_yaw(yaw),
            );
        }
    }
}

fn billboards(bounds: &Bounds) -> [Billboard; 8] {
    let Bounds {
        min_x,
        max_x,
        min_z,
        max_z,
    } = *bounds;
    let c = bounds.center();
    let board = |x, z, yaw, width, height| Billboard {
        x,
        z,
        yaw,
        width,
        height,
    };
    [
        board(min_x + 10.0, min_z + 30.0, 0.0, 22.0, 14.0),
        board(max_x - 10.0, min_z + 60.0, PI, 24.0, 16.0),
        board(min_x + 20.0, max_z - 20.0, 0.0, 18.0, 12.0),
        board(max_x - 15.0, max_z - 40.0, PI, 20.0, 14.0),
        board(c.x, min_z + 10.0, FRAC_PI_2, 16.0, 10.0),
        board(c.x + 20.0, max_z - 10.0, -FRAC_PI_2, 18.0, 12.0),
        board(min_x + 5.0, c.y, PI * 0.1, 14.0, 10.0),
        board(max_x - 5.0, c.y, PI * 0.9, 16.0, 12.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        map::tokyo::{self, SHIBUYA_CROSSING},
        world::landmarks::test_support,
    };

    #[test]
    fn scramble_pattern() {
        let config = tokyo::config();
        let (world, _) = test_support::run(&config, 4, build, SHIBUYA_CROSSING);

        // Six rows each way, 48 bars per row.
        let ew = world.batch("crosswalk_ew").map(|b| b.instances.len());
        let ns = world.batch("crosswalk_ns").map(|b| b.instances.len());
        assert_eq!(ew, Some(6 * 48));
        assert_eq!(ns, Some(6 * 48));

        let diagonals = world
            .meshes_in(Layer::Landmark)
            .filter(|m| m.primitive == Primitive::plane(0.6, 3.0))
            .count();
        assert_eq!(diagonals, DIAGONAL_BARS * 2);
    }

    #[test]
    fn eight_screens() {
        let config = tokyo::config();
        let (world, _) = test_support::run(&config, 4, build, SHIBUYA_CROSSING);
        assert_eq!(world.stats.signs, 8);
        assert_eq!(world.stats.static_bodies, 0);
    }
}
