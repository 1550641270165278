//! Shared park layout: lawn, gravel paths, a pond, scattered trees with trunk
//! collision, path lamps and a faint moonlight wash.

use std::f32::consts::PI;

use nalgebra::Vector2;

use super::{Builder, InstanceBatch, Layer, Material, Primitive, Transform, steps};
use crate::{collision::body_from_center, map::Bounds, palette::Color};

const LAWN: Color = Color::hex(0x1a3a1a);
const POND: Color = Color::hex(0x0a2035);
const POND_GLOW: Color = Color::hex(0x2a4a6a);
const TRUNK: Color = Color::hex(0x3a2a1a);
const MOONLIGHT: Color = Color::hex(0x223344);
const LANTERN: Color = Color::hex(0xffaa44);

const LAWN_Y: f32 = 0.005;
const WASH_Y: f32 = 0.008;
const POND_Y: f32 = 0.01;
const PATH_Y: f32 = 0.015;

/// Half extent of a trunk's collision box.
const TRUNK_HALF: f32 = 0.5;

pub(super) struct Trail {
    pub steps: usize,
    pub inset_x: f32,
    pub inset_z: f32,
    /// Number of half waves across the park.
    pub waves: f32,
    pub amplitude: f32,
    pub width: f32,
}

pub(super) struct Pond {
    /// Offset from the park centre.
    pub offset: Vector2<f32>,
    pub width: f32,
    pub depth: f32,
    pub glows: usize,
    pub glow_size: (f32, f32),
    pub glow_aspect: f32,
    /// Glow scatter, full width and depth around the pond centre.
    pub glow_spread: (f32, f32),
}

pub(super) struct Canopy {
    pub color: Color,
    pub radius: f32,
    /// Height of the canopy centre above the trunk top.
    pub lift: f32,
}

pub(super) struct Trees {
    pub count: usize,
    pub attempts: usize,
    pub margin: f32,
    /// Half width kept clear around the main and cross paths.
    pub main_path_clear: f32,
    pub cross_path_clear: f32,
    /// Half extents kept clear around the pond.
    pub pond_clear: (f32, f32),
    pub small: Canopy,
    pub large: Canopy,
    /// Blossom canopies and their share of the trees, if any.
    pub blossom: Option<(f32, Canopy, Canopy)>,
}

pub(super) enum LampHead {
    Globe(f32),
    Lantern(f32, f32),
}

pub(super) struct Lamps {
    pub height: f32,
    pub pole: Color,
    pub pole_radii: (f32, f32),
    pub head: LampHead,
    pub glow_radius: f32,
    pub glow_opacity: f32,
    pub main_inset: f32,
    pub main_spacing: f32,
    pub main_offset: f32,
    pub cross_inset: f32,
    pub cross_spacing: f32,
    /// Cross path lamps this close to the main path are skipped.
    pub cross_skip: f32,
    pub cross_offset: f32,
}

/// Everything that differs between two parks.
pub(super) struct ParkLayout {
    pub gravel: Color,
    pub main_path_width: f32,
    /// Distance of the outer cross paths from the north and south edges.
    pub cross_inset: f32,
    pub cross_width: f32,
    pub trail: Trail,
    pub pond: Pond,
    pub trees: Trees,
    pub lamps: Lamps,
}

impl ParkLayout {
    pub fn cross_path_z(&self, bounds: &Bounds) -> [f32; 3] {
        [
            bounds.min_z + self.cross_inset,
            bounds.center().y,
            bounds.max_z - self.cross_inset,
        ]
    }

    pub fn pond_center(&self, bounds: &Bounds) -> Vector2<f32> {
        bounds.center() + self.pond.offset
    }
}

/// Lay out the shared park features. `keep_out` lists extra areas trees avoid.
pub(super) fn build(b: &mut Builder<'_>, bounds: &Bounds, layout: &ParkLayout, keep_out: &[Bounds]) {
    let c = bounds.center();
    b.mesh(
        Layer::Landmark,
        Primitive::plane(bounds.width(), bounds.depth()),
        Material::solid(LAWN),
        Transform::at(c.x, LAWN_Y, c.y),
    );
    paths(b, bounds, layout);
    pond(b, bounds, layout);
    trees(b, bounds, layout, keep_out);
    lamps(b, bounds, layout);
    b.mesh(
        Layer::Landmark,
        Primitive::plane(bounds.width(), bounds.depth()),
        Material::translucent(MOONLIGHT, 0.06),
        Transform::at(c.x, WASH_Y, c.y),
    );
}

fn paths(b: &mut Builder<'_>, bounds: &Bounds, layout: &ParkLayout) {
    let c = bounds.center();
    let gravel = Material::solid(layout.gravel);
    b.mesh(
        Layer::Landmark,
        Primitive::plane(layout.main_path_width, bounds.depth() - 20.0),
        gravel,
        Transform::at(c.x, PATH_Y, c.y),
    );
    for z in layout.cross_path_z(bounds) {
        b.mesh(
            Layer::Landmark,
            Primitive::plane(bounds.width() - 20.0, layout.cross_width),
            gravel,
            Transform::at(c.x, PATH_Y, z),
        );
    }

    let trail = &layout.trail;
    let points: Vec<Vector2<f32>> = (0..=trail.steps)
        .map(|i| {
            let t = i as f32 / trail.steps as f32;
            let x = bounds.min_x + trail.inset_x + (bounds.width() - 2.0 * trail.inset_x) * t;
            let z = bounds.min_z
                + trail.inset_z
                + (bounds.depth() - 2.0 * trail.inset_z) * t
                + (t * PI * trail.waves).sin() * trail.amplitude;
            Vector2::new(x, z)
        })
        .collect();
    for pair in points.windows(2) {
        let delta = pair[1] - pair[0];
        let mid = (pair[0] + pair[1]) * 0.5;
        b.mesh(
            Layer::Landmark,
            Primitive::plane(trail.width, delta.norm()),
            gravel,
            Transform::at(mid.x, PATH_Y, mid.y).with_yaw(delta.x.atan2(delta.y)),
        );
    }
}

fn pond(b: &mut Builder<'_>, bounds: &Bounds, layout: &ParkLayout) {
    let pond = &layout.pond;
    let p = layout.pond_center(bounds);
    b.mesh(
        Layer::Landmark,
        Primitive::plane(pond.width, pond.depth),
        Material::translucent(POND, 0.85),
        Transform::at(p.x, POND_Y, p.y),
    );
    for _ in 0..pond.glows {
        let size = b.range(pond.glow_size.0, pond.glow_size.1);
        let x = p.x + (b.random() - 0.5) * pond.glow_spread.0;
        let z = p.y + (b.random() - 0.5) * pond.glow_spread.1;
        b.mesh(
            Layer::Landmark,
            Primitive::plane(size, size * pond.glow_aspect),
            Material::translucent(POND_GLOW, 0.2),
            Transform::at(x, PATH_Y, z),
        );
    }
}

struct CanopyBatches {
    small: InstanceBatch,
    large: InstanceBatch,
    small_lift: f32,
    large_lift: f32,
}

impl CanopyBatches {
    fn new(small_name: &'static str, large_name: &'static str, small: &Canopy, large: &Canopy) -> Self {
        let batch = |name, canopy: &Canopy| {
            InstanceBatch::new(
                name,
                Layer::Landmark,
                Primitive::Sphere {
                    radius: canopy.radius,
                },
                Material::solid(canopy.color),
            )
        };
        Self {
            small: batch(small_name, small),
            large: batch(large_name, large),
            small_lift: small.lift,
            large_lift: large.lift,
        }
    }

    fn push(&mut self, x: f32, trunk_top: f32, z: f32, large: bool) {
        if large {
            self.large.push(x, trunk_top + self.large_lift, z);
        } else {
            self.small.push(x, trunk_top + self.small_lift, z);
        }
    }
}

fn trees(b: &mut Builder<'_>, bounds: &Bounds, layout: &ParkLayout, keep_out: &[Bounds]) {
    let rules = &layout.trees;
    let c = bounds.center();
    let pond = layout.pond_center(bounds);

    let mut clear = vec![
        Bounds::new(
            c.x - rules.main_path_clear,
            c.x + rules.main_path_clear,
            bounds.min_z,
            bounds.max_z,
        ),
        Bounds::new(
            pond.x - rules.pond_clear.0,
            pond.x + rules.pond_clear.0,
            pond.y - rules.pond_clear.1,
            pond.y + rules.pond_clear.1,
        ),
    ];
    clear.extend(layout.cross_path_z(bounds).map(|z| {
        Bounds::new(
            bounds.min_x,
            bounds.max_x,
            z - rules.cross_path_clear,
            z + rules.cross_path_clear,
        )
    }));
    clear.extend_from_slice(keep_out);

    let trunk = |name, height| {
        InstanceBatch::new(
            name,
            Layer::Landmark,
            Primitive::cylinder(0.3, 0.4, height, 5),
            Material::solid(TRUNK),
        )
    };
    let mut short_trunks = trunk("park_trunk", 3.0);
    let mut tall_trunks = trunk("park_trunk_tall", 4.0);
    let mut green = CanopyBatches::new("park_canopy", "park_canopy_large", &rules.small, &rules.large);
    let mut blossom = rules.blossom.as_ref().map(|(share, small, large)| {
        (
            *share,
            CanopyBatches::new("park_blossom", "park_blossom_large", small, large),
        )
    });

    let area = bounds.inset(rules.margin);
    let mut placed = 0;
    for _ in 0..rules.attempts {
        if placed >= rules.count {
            break;
        }
        let x = area.min_x + b.random() * area.width();
        let z = area.min_z + b.random() * area.depth();
        if clear.iter().any(|r| r.contains(x, z)) {
            continue;
        }

        let canopies = match blossom.as_mut() {
            Some((share, batches)) => {
                let share = *share;
                if b.chance(share) { batches } else { &mut green }
            }
            None => &mut green,
        };
        let large = b.random() > 0.5;
        let trunk_height = if large { 4.0 } else { 3.0 };
        if large {
            tall_trunks.push(x, trunk_height / 2.0, z);
        } else {
            short_trunks.push(x, trunk_height / 2.0, z);
        }
        canopies.push(x, trunk_height, z, large);

        b.solid(body_from_center(x, z, TRUNK_HALF, TRUNK_HALF));
        placed += 1;
    }
    b.out.stats.trees += placed;

    b.batch(short_trunks);
    b.batch(tall_trunks);
    for batches in std::iter::once(green).chain(blossom.map(|(_, batches)| batches)) {
        b.batch(batches.small);
        b.batch(batches.large);
    }
}

fn lamps(b: &mut Builder<'_>, bounds: &Bounds, layout: &ParkLayout) {
    let rules = &layout.lamps;
    let c = bounds.center();

    let mut poles = InstanceBatch::new(
        "park_lamp_pole",
        Layer::Landmark,
        Primitive::cylinder(rules.pole_radii.0, rules.pole_radii.1, rules.height, 5),
        Material::solid(rules.pole),
    );
    let head = match rules.head {
        LampHead::Globe(radius) => Primitive::Sphere { radius },
        LampHead::Lantern(side, height) => Primitive::cuboid(side, height, side),
    };
    let mut heads = InstanceBatch::new(
        "park_lamp_head",
        Layer::Landmark,
        head,
        Material::solid(LANTERN),
    );
    let mut glows = InstanceBatch::new(
        "park_lamp_glow",
        Layer::Landmark,
        Primitive::Disc {
            radius: rules.glow_radius,
        },
        Material::translucent(LANTERN, rules.glow_opacity),
    );
    let mut lamp = |x: f32, z: f32| {
        poles.push(x, rules.height / 2.0, z);
        heads.push(x, rules.height, z);
        glows.push(x, 0.02, z);
    };

    for z in steps(
        bounds.min_z + rules.main_inset,
        bounds.max_z - rules.main_inset,
        rules.main_spacing,
    ) {
        for side in [-1.0, 1.0] {
            lamp(c.x + side * rules.main_offset, z);
        }
    }
    for z in layout.cross_path_z(bounds) {
        for x in steps(
            bounds.min_x + rules.cross_inset,
            bounds.max_x - rules.cross_inset,
            rules.cross_spacing,
        ) {
            if (x - c.x).abs() < rules.cross_skip {
                continue;
            }
            let side = if ((x / rules.cross_spacing) as i32) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            lamp(x, z + side * rules.cross_offset);
        }
    }

    b.out.stats.lamps += poles.instances.len();
    b.batch(poles);
    b.batch(heads);
    b.batch(glows);
}
