//! Elevated bridges: deck, sidewalks and barriers follow the elevation profile; towers
//! and cables or trusses depend on the bridge style.

use nalgebra::{Vector2, Vector3};

use super::{Builder, Layer, Material, Primitive, Transform};
use crate::{
    collision::body_from_rotated_box,
    map::{BridgeColors, BridgeDef, BridgeStyle},
    palette,
};

const DECK_SEGMENTS: usize = 40;
const BARRIER_HEIGHT: f32 = 1.2;
const BARRIER_CHUNKS: usize = 5;
const TOWER_FRACS: [f32; 2] = [0.33, 0.67];
const CABLE_POINTS: usize = 30;
const SUSPENDERS: usize = 15;
const TRUSS_HEIGHT: f32 = 6.0;
const TRUSS_BAYS: usize = 12;
const TRUSS_OFFSET: f32 = 0.3;

/// Frame along one bridge: unit direction, unit left-hand perpendicular.
struct Frame<'d> {
    def: &'d BridgeDef,
    length: f32,
    dir: Vector2<f32>,
    perp: Vector2<f32>,
    /// Deck half-width including sidewalks.
    half_width: f32,
    yaw: f32,
}

impl Frame<'_> {
    fn centre(&self, t: f32) -> Vector2<f32> {
        self.def.point_at(t)
    }

    /// Point at fraction `t` along the bridge, `offset` to the left of the centreline.
    fn beside(&self, t: f32, offset: f32) -> Vector2<f32> {
        self.centre(t) + self.perp * offset
    }
}

pub(super) fn build(b: &mut Builder<'_>) {
    let config = b.config;
    for def in &config.bridges {
        let length = def.length();
        if length <= f32::EPSILON {
            tracing::debug!(bridge = def.id, "skipping zero-length bridge");
            continue;
        }
        let delta = def.delta();
        let frame = Frame {
            def,
            length,
            dir: delta / length,
            perp: Vector2::new(-delta.y / length, delta.x / length),
            half_width: def.width / 2.0 + config.sidewalk_width,
            yaw: delta.x.atan2(delta.y),
        };
        let colors = def.style.colors();

        deck(b, &frame, colors);
        sidewalks(b, &frame);
        barriers(b, &frame, colors);
        towers(b, &frame, colors);
        match def.style {
            BridgeStyle::Gothic | BridgeStyle::Suspension => cables(b, &frame, colors),
            BridgeStyle::Truss => truss(b, &frame, colors),
        }
    }
}

fn elevation_at(b: &Builder<'_>, p: Vector2<f32>) -> f32 {
    b.elevation.get_elevation(p.x, p.y)
}

/// Two polylines sampled at every deck segment boundary.
fn sample_strip(
    b: &Builder<'_>,
    frame: &Frame<'_>,
    edge_a: (f32, f32),
    edge_b: (f32, f32),
) -> (Vec<Vector3<f32>>, Vec<Vector3<f32>>) {
    (0..=DECK_SEGMENTS)
        .map(|i| {
            let t = i as f32 / DECK_SEGMENTS as f32;
            let y = elevation_at(b, frame.centre(t));
            let a = frame.beside(t, edge_a.0);
            let c = frame.beside(t, edge_b.0);
            (
                Vector3::new(a.x, y + edge_a.1, a.y),
                Vector3::new(c.x, y + edge_b.1, c.y),
            )
        })
        .unzip()
}

fn deck(b: &mut Builder<'_>, frame: &Frame<'_>, colors: BridgeColors) {
    let hw = frame.half_width;
    let (a, c) = sample_strip(b, frame, (hw, 0.02), (-hw, 0.02));
    b.mesh(
        Layer::Bridge,
        Primitive::Strip { a, b: c },
        Material::solid(colors.deck).double_sided(),
        Transform::default(),
    );
}

fn sidewalks(b: &mut Builder<'_>, frame: &Frame<'_>) {
    let road_hw = frame.def.width / 2.0;
    for side in [-1.0, 1.0] {
        let (a, c) = sample_strip(
            b,
            frame,
            (road_hw * side, 0.08),
            (frame.half_width * side, 0.08),
        );
        b.mesh(
            Layer::Bridge,
            Primitive::Strip { a, b: c },
            Material::solid(palette::SIDEWALK).double_sided(),
            Transform::default(),
        );
    }
}

fn barriers(b: &mut Builder<'_>, frame: &Frame<'_>, colors: BridgeColors) {
    let hw = frame.half_width;
    for side in [-1.0, 1.0] {
        let (bottom, top) = sample_strip(b, frame, (hw * side, 0.0), (hw * side, BARRIER_HEIGHT));
        b.mesh(
            Layer::Bridge,
            Primitive::Strip { a: bottom, b: top },
            Material::solid(colors.barrier).double_sided(),
            Transform::default(),
        );
    }

    // Collision in chunks so each one's vertical band hugs the local deck height.
    let chunk_len = frame.length / BARRIER_CHUNKS as f32;
    for chunk in 0..BARRIER_CHUNKS {
        let t0 = chunk as f32 / BARRIER_CHUNKS as f32;
        let t1 = (chunk + 1) as f32 / BARRIER_CHUNKS as f32;
        let e0 = elevation_at(b, frame.centre(t0));
        let e1 = elevation_at(b, frame.centre(t1));
        let min_y = e0.min(e1) - 1.0;
        let max_y = e0.max(e1) + BARRIER_HEIGHT + 1.0;
        let tc = (t0 + t1) / 2.0;
        for side in [-1.0, 1.0] {
            let p = frame.beside(tc, hw * side);
            let body = body_from_rotated_box(p.x, p.y, 1.0, chunk_len + 2.0, frame.yaw)
                .with_vertical_band(min_y, max_y);
            b.solid(body);
        }
    }
}

fn towers(b: &mut Builder<'_>, frame: &Frame<'_>, colors: BridgeColors) {
    let def = frame.def;
    let material = Material::solid(colors.tower);
    let side_offset = frame.half_width + 0.5;

    for t in TOWER_FRACS {
        let base_y = elevation_at(b, frame.centre(t));
        match def.style {
            BridgeStyle::Gothic => {
                let tower_h = def.height + 18.0;
                for side in [-1.0, 1.0] {
                    let s = frame.beside(t, side_offset * side);
                    for along in [-1.8, 1.8] {
                        let p = s + frame.dir * along;
                        b.mesh(
                            Layer::Bridge,
                            Primitive::cuboid(0.8, tower_h, 1.5),
                            material,
                            Transform::at(p.x, base_y + tower_h / 2.0, p.y).with_yaw(frame.yaw),
                        );
                    }
                    b.mesh(
                        Layer::Bridge,
                        Primitive::cuboid(0.8, 3.0, 5.0),
                        material,
                        Transform::at(s.x, base_y + tower_h - 1.5, s.y).with_yaw(frame.yaw),
                    );
                    b.mesh(
                        Layer::Bridge,
                        Primitive::Cone {
                            radius: 1.5,
                            height: 4.0,
                            segments: 4,
                        },
                        material,
                        Transform::at(s.x, base_y + tower_h + 2.0, s.y).with_yaw(frame.yaw),
                    );
                }
            }
            BridgeStyle::Suspension => {
                let tower_h = def.height + 15.0;
                for side in [-1.0, 1.0] {
                    let s = frame.beside(t, side_offset * side);
                    b.mesh(
                        Layer::Bridge,
                        Primitive::cuboid(2.0, tower_h, 3.0),
                        material,
                        Transform::at(s.x, base_y + tower_h / 2.0, s.y).with_yaw(frame.yaw),
                    );
                }
                let c = frame.centre(t);
                b.mesh(
                    Layer::Bridge,
                    Primitive::cuboid(frame.half_width * 2.0 + 1.0, 1.5, 1.0),
                    material,
                    Transform::at(c.x, base_y + tower_h - 2.0, c.y).with_yaw(frame.yaw),
                );
            }
            BridgeStyle::Truss => {
                let tower_h = def.height + 10.0;
                for side in [-1.0, 1.0] {
                    let s = frame.beside(t, side_offset * side);
                    b.mesh(
                        Layer::Bridge,
                        Primitive::cuboid(1.5, tower_h, 2.0),
                        material,
                        Transform::at(s.x, base_y + tower_h / 2.0, s.y).with_yaw(frame.yaw),
                    );
                }
            }
        }
    }
}

/// Main cable height above the deck at fraction `t`: rises from the deck to the first
/// tower top, sags parabolically between towers, and descends after the second.
pub(crate) fn cable_rise(t: f32, tower_top: f32) -> f32 {
    let [first, second] = TOWER_FRACS;
    if t < first {
        let lt = t / first;
        2.0 + (tower_top - 2.0) * lt
    } else if t > second {
        let lt = (t - second) / (1.0 - second);
        tower_top - (tower_top - 2.0) * lt
    } else {
        let lt = (t - first) / (second - first);
        let sag = 4.0 * lt * (1.0 - lt) * (tower_top * 0.3);
        tower_top - sag
    }
}

/// Stretch a unit primitive along `axis` between two points.
fn member(
    b: &mut Builder<'_>,
    from: Vector3<f32>,
    to: Vector3<f32>,
    material: Material,
    shape: impl Fn(f32) -> Primitive,
    axis: Vector3<f32>,
) {
    let (transform, length) = Transform::spanning(from, to, axis);
    if length <= f32::EPSILON {
        return;
    }
    b.mesh(Layer::Bridge, shape(length), material, transform);
}

fn cables(b: &mut Builder<'_>, frame: &Frame<'_>, colors: BridgeColors) {
    let tower_top = match frame.def.style {
        BridgeStyle::Gothic => frame.def.height + 18.0,
        _ => frame.def.height + 15.0,
    };
    let material = Material::solid(colors.cable);
    let hw = frame.half_width;

    for side in [-1.0, 1.0] {
        let points: Vec<Vector3<f32>> = (0..=CABLE_POINTS)
            .map(|i| {
                let t = i as f32 / CABLE_POINTS as f32;
                let deck_y = elevation_at(b, frame.centre(t));
                let p = frame.beside(t, hw * side);
                Vector3::new(p.x, deck_y + cable_rise(t, tower_top), p.y)
            })
            .collect();
        for pair in points.windows(2) {
            member(
                b,
                pair[0],
                pair[1],
                material,
                |len| Primitive::cylinder(0.08, 0.08, len, 3),
                Vector3::y(),
            );
        }

        for i in 1..SUSPENDERS {
            let t = i as f32 / SUSPENDERS as f32;
            if !(0.1..=0.9).contains(&t) {
                continue;
            }
            let deck_y = elevation_at(b, frame.centre(t));
            let len = cable_rise(t, tower_top) - BARRIER_HEIGHT;
            if len < 1.0 {
                continue;
            }
            let p = frame.beside(t, hw * side);
            b.mesh(
                Layer::Bridge,
                Primitive::cylinder(0.03, 0.03, len, 3),
                material,
                Transform::at(p.x, deck_y + BARRIER_HEIGHT + len / 2.0, p.y),
            );
        }
    }
}

fn truss(b: &mut Builder<'_>, frame: &Frame<'_>, colors: BridgeColors) {
    let material = Material::solid(colors.tower);
    let offset = frame.half_width + TRUSS_OFFSET;
    let inside = |t: f32| (0.05..=0.95).contains(&t);

    for side in [-1.0, 1.0] {
        for i in 0..=TRUSS_BAYS {
            let t = i as f32 / TRUSS_BAYS as f32;
            if !inside(t) {
                continue;
            }
            let base_y = elevation_at(b, frame.centre(t));
            let p = frame.beside(t, offset * side);
            b.mesh(
                Layer::Bridge,
                Primitive::cuboid(0.3, TRUSS_HEIGHT, 0.3),
                material,
                Transform::at(p.x, base_y + TRUSS_HEIGHT / 2.0, p.y),
            );
        }

        let rail: Vec<Vector3<f32>> = (0..=DECK_SEGMENTS)
            .map(|i| i as f32 / DECK_SEGMENTS as f32)
            .filter(|t| inside(*t))
            .map(|t| {
                let p = frame.beside(t, offset * side);
                Vector3::new(p.x, elevation_at(b, frame.centre(t)) + TRUSS_HEIGHT, p.y)
            })
            .collect();
        for pair in rail.windows(2) {
            member(
                b,
                pair[0],
                pair[1],
                material,
                |len| Primitive::cuboid(0.2, 0.2, len),
                Vector3::z(),
            );
        }

        for i in 0..TRUSS_BAYS {
            let t0 = i as f32 / TRUSS_BAYS as f32;
            let t1 = (i + 1) as f32 / TRUSS_BAYS as f32;
            if t0 < 0.05 || t1 > 0.95 {
                continue;
            }
            let p0 = frame.beside(t0, offset * side);
            let p1 = frame.beside(t1, offset * side);
            let y0 = elevation_at(b, frame.centre(t0));
            let y1 = elevation_at(b, frame.centre(t1));
            member(
                b,
                Vector3::new(p0.x, y0 + BARRIER_HEIGHT, p0.y),
                Vector3::new(p1.x, y1 + TRUSS_HEIGHT, p1.y),
                material,
                |len| Primitive::cuboid(0.15, 0.15, len),
                Vector3::z(),
            );
        }
    }
}
