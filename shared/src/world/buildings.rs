//! City blocks to towers.
//!
//! Each block resolves to a district. Blocks are cut into roughly 40-unit sub-blocks,
//! each sub-block into one to four footprints, and each surviving footprint becomes a
//! textured tower with a collision body and, sometimes, neon signs.

use std::f32::consts::FRAC_PI_2;

use nalgebra::Vector2;
use rand::Rng;

use super::{Builder, Building, Layer, Material, Primitive, Transform, WindowTexture};
use crate::{
    collision::body_from_center,
    map::{Block, DistrictConfig},
    palette::{Color, NEON_COLORS},
    utils::dist_to_segment,
};

/// Preferred sub-block edge length.
const SUB_BLOCK_TARGET: f32 = 40.0;
/// Footprints narrower than this after padding are dropped.
const MIN_FOOTPRINT: f32 = 4.0;
/// Extra setback beyond the sidewalk.
const SETBACK: f32 = 0.5;
const PAIR_GAP: f32 = 1.0;
const QUAD_GAP: f32 = 0.5;
/// Chance that the fourth lot of a quad split is built.
const QUAD_FOURTH_CHANCE: f32 = 0.7;

/// Window grid cell size in texels; each window is 2×2 inside a 4×4 cell.
const WINDOW_CELL: u32 = 4;
const WINDOW_SIZE: u32 = 2;

const SIGN_DEPTH: f32 = 0.2;
const SIGN_OFFSET: f32 = 0.15;
/// Extra sign roll, as a fraction of the district's sign chance.
const BONUS_SIGN_FACTOR: f32 = 0.3;

/// One lot inside a sub-block, relative to the sub-block centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub offset_x: f32,
    pub offset_z: f32,
    pub width: f32,
    pub depth: f32,
}

/// Cut a block into an even grid of sub-blocks close to 40 units on a side.
pub fn split_block(block: &Block) -> Vec<Block> {
    let nx = (block.width / SUB_BLOCK_TARGET).round().max(1.0) as usize;
    let nz = (block.depth / SUB_BLOCK_TARGET).round().max(1.0) as usize;
    let sub_w = block.width / nx as f32;
    let sub_d = block.depth / nz as f32;

    let mut out = Vec::with_capacity(nx * nz);
    for ix in 0..nx {
        for iz in 0..nz {
            let ox = (ix as f32 - (nx as f32 - 1.0) / 2.0) * sub_w;
            let oz = (iz as f32 - (nz as f32 - 1.0) / 2.0) * sub_d;
            out.push(Block::new(
                block.center.x + ox,
                block.center.y + oz,
                sub_w,
                sub_d,
            ));
        }
    }
    out
}

/// Split a lot into one, two or three-to-four footprints.
///
/// Two-way splits cut the longer axis at 35–65 %. Four-way splits are quadrants with the
/// last one kept at random.
pub fn subdivide(width: f32, depth: f32, rng: &mut impl Rng) -> Vec<Footprint> {
    let count = 1 + (rng.random::<f32>() * 3.0).floor() as u32;
    match count {
        1 => vec![Footprint {
            offset_x: 0.0,
            offset_z: 0.0,
            width,
            depth,
        }],
        2 => {
            let split = 0.35 + rng.random::<f32>() * 0.3;
            if width > depth {
                let (w1, w2) = (width * split, width * (1.0 - split));
                vec![
                    Footprint {
                        offset_x: -(w2 + PAIR_GAP) / 2.0,
                        offset_z: 0.0,
                        width: w1 - PAIR_GAP,
                        depth,
                    },
                    Footprint {
                        offset_x: (w1 + PAIR_GAP) / 2.0,
                        offset_z: 0.0,
                        width: w2 - PAIR_GAP,
                        depth,
                    },
                ]
            } else {
                let (d1, d2) = (depth * split, depth * (1.0 - split));
                vec![
                    Footprint {
                        offset_x: 0.0,
                        offset_z: -(d2 + PAIR_GAP) / 2.0,
                        width,
                        depth: d1 - PAIR_GAP,
                    },
                    Footprint {
                        offset_x: 0.0,
                        offset_z: (d1 + PAIR_GAP) / 2.0,
                        width,
                        depth: d2 - PAIR_GAP,
                    },
                ]
            }
        }
        _ => {
            let (hw, hd) = (width / 2.0, depth / 2.0);
            let quad = |sx: f32, sz: f32| Footprint {
                offset_x: sx * hw / 2.0,
                offset_z: sz * hd / 2.0,
                width: hw - QUAD_GAP,
                depth: hd - QUAD_GAP,
            };
            let mut out = vec![quad(-1.0, -1.0), quad(1.0, -1.0), quad(-1.0, 1.0)];
            if rng.random::<f32>() < QUAD_FOURTH_CHANCE {
                out.push(quad(1.0, 1.0));
            }
            out
        }
    }
}

/// Facade texture: a grid of 2×2 windows, some lit warm or cool, the rest dark.
pub(super) fn window_texture(
    width: f32,
    height: f32,
    district: &DistrictConfig,
    rng: &mut impl Rng,
) -> WindowTexture {
    let cols = ((width / 3.0).floor() as u32).max(2);
    let rows = ((height / 4.0).floor() as u32).max(3);
    let mut tex = WindowTexture::filled(
        cols * WINDOW_CELL,
        rows * WINDOW_CELL,
        district.building_tint,
    );

    for r in 0..rows {
        for c in 0..cols {
            let color = if rng.random::<f32>() < district.window_lit_chance {
                if rng.random::<f32>() > 0.5 {
                    Color::rgba(255, 230, 150, 255).with_alpha(0.5 + rng.random::<f32>() * 0.5)
                } else {
                    Color::rgba(200, 220, 255, 255).with_alpha(0.4 + rng.random::<f32>() * 0.4)
                }
            } else {
                Color::rgba(20, 20, 40, 255).with_alpha(0.8 + rng.random::<f32>() * 0.2)
            };
            tex.blend_rect(
                c * WINDOW_CELL + 1,
                r * WINDOW_CELL + 1,
                WINDOW_SIZE,
                WINDOW_SIZE,
                color,
            );
        }
    }
    tex
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Face {
    Front,
    Back,
    Left,
    Right,
}

const FACES: [Face; 4] = [Face::Front, Face::Back, Face::Left, Face::Right];

fn neon_sign(b: &mut Builder<'_>, building: &Building, face: Face) {
    let color = b.index(NEON_COLORS.len()).map_or(NEON_COLORS[0], |i| NEON_COLORS[i]);
    let width = b.range(2.0, 6.0);
    let height = b.range(0.8, 2.0);
    let y = building.height * b.range(0.3, 0.8);

    let c = building.center;
    let (hw, hd) = (building.width / 2.0, building.depth / 2.0);
    let transform = match face {
        Face::Front => Transform::at(c.x, y, c.y + hd + SIGN_OFFSET),
        Face::Back => Transform::at(c.x, y, c.y - hd - SIGN_OFFSET),
        Face::Left => Transform::at(c.x - hw - SIGN_OFFSET, y, c.y).with_yaw(FRAC_PI_2),
        Face::Right => Transform::at(c.x + hw + SIGN_OFFSET, y, c.y).with_yaw(FRAC_PI_2),
    };
    b.mesh(
        Layer::Sign,
        Primitive::cuboid(width, height, SIGN_DEPTH),
        Material::solid(color),
        transform,
    );
    b.out.stats.signs += 1;
}

fn random_face(b: &mut Builder<'_>) -> Face {
    b.index(FACES.len()).map_or(Face::Front, |i| FACES[i])
}

fn place_building(
    b: &mut Builder<'_>,
    center: Vector2<f32>,
    width: f32,
    depth: f32,
    district: &DistrictConfig,
) {
    let height = b.range(district.height_min, district.height_max);
    let front = window_texture(width, height, district, &mut *b.rng);
    let side = window_texture(depth, height, district, &mut *b.rng);
    let building = Building {
        center,
        width,
        depth,
        height,
        district: district.name,
        front_texture: b.texture(front),
        side_texture: b.texture(side),
        roof: district.roof_color,
    };
    b.out.buildings.push(building);
    b.out.stats.buildings += 1;
    b.solid(body_from_center(center.x, center.y, width / 2.0, depth / 2.0));

    let chance = district.neon_sign_chance;
    if b.chance(chance) {
        for _ in 0..district.neon_signs_per_face.max(1) {
            let face = random_face(b);
            neon_sign(b, &building, face);
        }
    }
    if b.chance(chance * BONUS_SIGN_FACTOR) {
        let face = random_face(b);
        neon_sign(b, &building, face);
    }
}

pub(super) fn build(b: &mut Builder<'_>) {
    let config = b.config;
    let padding = config.sidewalk_width + SETBACK;

    for block in &config.blocks {
        let Some(district) = config.district_at(block.center.x, block.center.y) else {
            continue;
        };
        if b.random() > district.density {
            continue;
        }
        for sub in split_block(block) {
            if b.random() > district.density {
                continue;
            }
            for fp in subdivide(sub.width, sub.depth, &mut *b.rng) {
                let center =
                    Vector2::new(sub.center.x + fp.offset_x, sub.center.y + fp.offset_z);
                if let Some(bw) = &config.broadway {
                    let clearance = bw.width / 2.0 + fp.width.max(fp.depth) / 2.0;
                    if dist_to_segment(center, bw.start, bw.end) < clearance {
                        continue;
                    }
                }
                let (w, d) = (fp.width - padding, fp.depth - padding);
                if w < MIN_FOOTPRINT || d < MIN_FOOTPRINT {
                    tracing::trace!(w, d, "footprint too small after padding");
                    continue;
                }
                place_building(b, center, w, d, district);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::map::nyc;

    #[test]
    fn split_block_tiles_the_block() {
        let block = Block::new(100.0, -50.0, 130.0, 35.0);
        let subs = split_block(&block);
        // round(130 / 40) = 3, round(35 / 40) = 1.
        assert_eq!(subs.len(), 3);
        let total: f32 = subs.iter().map(|s| s.width * s.depth).sum();
        assert!((total - 130.0 * 35.0).abs() < 1.0e-2);
        let mean_x = subs.iter().map(|s| s.center.x).sum::<f32>() / 3.0;
        assert!((mean_x - 100.0).abs() < 1.0e-4);
        assert!(subs.iter().all(|s| s.center.y == -50.0));

        // Tiny blocks still yield one sub-block.
        assert_eq!(split_block(&Block::new(0.0, 0.0, 12.0, 9.0)).len(), 1);
    }

    #[test]
    fn subdivide_stays_inside_the_lot() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let (w, d) = (rng.random_range(10.0..60.0), rng.random_range(10.0..60.0));
            let fps = subdivide(w, d, &mut rng);
            seen[fps.len()] = true;
            assert!((1..=4).contains(&fps.len()));
            for fp in &fps {
                assert!(fp.width > 0.0 && fp.depth > 0.0);
                assert!(fp.offset_x.abs() + fp.width / 2.0 <= w / 2.0 + 1.0e-3);
                assert!(fp.offset_z.abs() + fp.depth / 2.0 <= d / 2.0 + 1.0e-3);
            }
            if fps.len() == 2 {
                // Split along the longer axis.
                let along_x = fps[0].offset_z == 0.0;
                assert_eq!(along_x, w > d);
            }
        }
        assert!(seen[1] && seen[2] && seen[3] && seen[4]);
    }

    #[test]
    fn window_grid_dimensions() {
        let mut rng = Pcg32::seed_from_u64(1);
        let district = nyc::config().fallback_district;
        let tex = window_texture(10.0, 30.0, &district, &mut rng);
        // cols = max(2, 3) = 3, rows = max(3, 7) = 7.
        assert_eq!((tex.width, tex.height), (12, 28));
        let small = window_texture(1.0, 1.0, &district, &mut rng);
        assert_eq!((small.width, small.height), (8, 12));
        // Texel (0, 0) is wall, never window.
        let tint = district.building_tint;
        assert_eq!(tex.pixel(0, 0), Some([tint.r, tint.g, tint.b, 255]));
    }

    #[test]
    fn fully_lit_districts_light_every_window() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut district = nyc::config().fallback_district;
        district.building_tint = Color::hex(0x000000);
        district.window_lit_chance = 1.0;
        let tex = window_texture(9.0, 12.0, &district, &mut rng);
        for r in 0..3 {
            for c in 0..3 {
                let [red, ..] = tex.pixel(c * 4 + 1, r * 4 + 1).unwrap_or([0; 4]);
                // Warm windows blend at least half of 255, cool ones at least 40% of 200.
                assert!(red >= 80, "window ({c}, {r}) is dark");
            }
        }
    }
}
