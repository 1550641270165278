use std::f32::consts::{FRAC_PI_2, PI};

use nalgebra::Vector2;

use super::{
    Billboard, BillboardStyle, Builder, GlowStrips, Layer, Material, Primitive, Transform,
    billboard,
};
use crate::{
    map::Bounds,
    palette::{Color, NEON_BLUE, NEON_PINK},
};

const STYLE: BillboardStyle = BillboardStyle {
    frame: Color::hex(0x222222),
    frame_pad: 0.5,
    frame_depth: 0.3,
    pole: Color::hex(0x333333),
    pole_radius: 0.3,
    base: (15.0, 35.0),
    face_offset: 0.2,
    stripe_offset: 0.25,
    min_stripes: 2,
    extra_stripes: 3,
    stripe_height: (0.8, 2.3),
    stripe_width: (0.3, 0.8),
    stripe_band: (0.2, 0.6),
};

const ISLAND_SIZE: f32 = 8.0;
/// Island sits this far north of the square's centre, where Broadway crosses.
const ISLAND_OFFSET: f32 = 30.0;

pub(super) fn build(b: &mut Builder<'_>, bounds: &Bounds) {
    GlowStrips {
        name: "times_square_strip",
        color: NEON_PINK,
        opacity: 0.15,
        start: 10.0,
        spacing: 20.0,
        thickness: 1.5,
        y: 0.03,
    }
    .east_west(b, bounds);
    GlowStrips {
        name: "times_square_accent",
        color: NEON_BLUE,
        opacity: 0.1,
        start: 20.0,
        spacing: 30.0,
        thickness: 1.0,
        y: 0.035,
    }
    .north_south(b, bounds);

    for board in billboards(bounds) {
        billboard(b, &STYLE, board);
    }

    let c = bounds.center();
    traffic_island(b, Vector2::new(c.x, c.y + ISLAND_OFFSET));
}

fn billboards(bounds: &Bounds) -> [Billboard; 6] {
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
        board(min_x + 15.0, min_z + 40.0, 0.0, 18.0, 10.0),
        board(max_x - 15.0, min_z + 80.0, PI, 20.0, 12.0),
        board(min_x + 30.0, max_z - 30.0, 0.0, 16.0, 8.0),
        board(max_x - 20.0, max_z - 50.0, PI, 22.0, 14.0),
        board(c.x, min_z + 15.0, FRAC_PI_2, 14.0, 8.0),
        board(c.x - 30.0, c.y, -0.3, 18.0, 10.0),
    ]
}

/// Raised concrete triangle with a neon ring around it.
fn traffic_island(b: &mut Builder<'_>, at: Vector2<f32>) {
    let s = ISLAND_SIZE;
    let outline = vec![
        Vector2::new(0.0, s),
        Vector2::new(-s * 0.7, -s * 0.5),
        Vector2::new(s * 0.7, -s * 0.5),
    ];
    b.mesh(
        Layer::Landmark,
        Primitive::Prism {
            outline,
            height: 0.3,
        },
        Material::solid(Color::hex(0x3a3a4e)),
        Transform::at(at.x, 0.1, at.y),
    );
    b.mesh(
        Layer::Landmark,
        Primitive::Ring {
            inner: s * 0.8,
            outer: s * 0.9,
            segments: 3,
        },
        Material::translucent(NEON_PINK, 0.6).double_sided(),
        Transform::at(at.x, 0.15, at.y),
    );
}
