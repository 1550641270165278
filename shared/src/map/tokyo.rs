//! Tokyo: a dense grid of avenues and side streets around Yoyogi Park, with the
//! Shibuya scramble crossing near spawn.

use super::{
    MapConfig,
    types::{
        Block, Bounds, DistrictConfig, DistrictZone, Landmark, ParkZone, RoadWidths, SpawnPoint,
        StreetKind, StreetSegment,
    },
};
use crate::palette::Color;

pub const MAP_ID: &str = "tokyo";

const AVENUE_WIDTH: f32 = 14.0;
const STREET_WIDTH: f32 = 8.0;
const SIDEWALK_WIDTH: f32 = 2.0;
const MIN_BLOCK_SIDE: f32 = 8.0;

/// Roads stop this far from the map edge.
const ROAD_EXTENT: f32 = 780.0;

pub const YOYOGI_PARK: Bounds = Bounds::new(-700.0, -200.0, -50.0, 500.0);
pub const SHIBUYA_CROSSING: Bounds = Bounds::new(-100.0, 100.0, -350.0, -150.0);
const MAP_BOUNDS: Bounds = Bounds::new(-800.0, 800.0, -800.0, 800.0);

const NS_AVENUES: [f32; 8] = [-700.0, -500.0, -300.0, -100.0, 100.0, 300.0, 500.0, 700.0];
const EW_AVENUES: [f32; 8] = NS_AVENUES;
const NS_STREETS: [f32; 7] = [-600.0, -400.0, -200.0, 0.0, 200.0, 400.0, 600.0];

const SHINJUKU: DistrictConfig = DistrictConfig {
    name: "Shinjuku",
    height_min: 50.0,
    height_max: 120.0,
    density: 0.95,
    neon_sign_chance: 0.5,
    neon_signs_per_face: 1,
    window_lit_chance: 0.5,
    ground_color: Color::hex(0x111122),
    building_tint: Color::hex(0x0f0f1a),
    roof_color: Color::hex(0x1a1a2a),
};

const KABUKICHO: DistrictConfig = DistrictConfig {
    name: "Kabukicho",
    height_min: 20.0,
    height_max: 55.0,
    density: 1.0,
    neon_sign_chance: 1.0,
    neon_signs_per_face: 3,
    window_lit_chance: 0.65,
    ground_color: Color::hex(0x110818),
    building_tint: Color::hex(0x120a1a),
    roof_color: Color::hex(0x1a1228),
};

const HARAJUKU: DistrictConfig = DistrictConfig {
    name: "Harajuku",
    height_min: 12.0,
    height_max: 40.0,
    density: 0.85,
    neon_sign_chance: 0.45,
    neon_signs_per_face: 1,
    window_lit_chance: 0.35,
    ground_color: Color::hex(0x101020),
    building_tint: Color::hex(0x121225),
    roof_color: Color::hex(0x1a1a2a),
};

const SHIBUYA: DistrictConfig = DistrictConfig {
    name: "Shibuya",
    height_min: 25.0,
    height_max: 70.0,
    density: 0.95,
    neon_sign_chance: 0.7,
    neon_signs_per_face: 2,
    window_lit_chance: 0.5,
    ground_color: Color::hex(0x0f0f1a),
    building_tint: Color::hex(0x0f0f1a),
    roof_color: Color::hex(0x181828),
};

const SHIBUYA_CROSSING_DISTRICT: DistrictConfig = DistrictConfig {
    name: "Shibuya Crossing",
    height_min: 30.0,
    height_max: 75.0,
    density: 1.0,
    neon_sign_chance: 1.0,
    neon_signs_per_face: 3,
    window_lit_chance: 0.6,
    ground_color: Color::hex(0x111122),
    building_tint: Color::hex(0x0f0f1a),
    roof_color: Color::hex(0x1a1a2a),
};

fn district_zones() -> Vec<DistrictZone> {
    vec![
        DistrictZone {
            id: "shibuyaCrossing",
            bounds: SHIBUYA_CROSSING,
            district: Some(SHIBUYA_CROSSING_DISTRICT),
        },
        DistrictZone {
            id: "yoyogiPark",
            bounds: YOYOGI_PARK,
            district: None,
        },
        DistrictZone {
            id: "kabukicho",
            bounds: Bounds::new(-200.0, 300.0, 500.0, 800.0),
            district: Some(KABUKICHO),
        },
        DistrictZone {
            id: "shinjuku",
            bounds: Bounds::new(-800.0, 800.0, 300.0, 800.0),
            district: Some(SHINJUKU),
        },
        DistrictZone {
            id: "harajuku",
            bounds: Bounds::new(-800.0, 800.0, -100.0, 300.0),
            district: Some(HARAJUKU),
        },
        DistrictZone {
            id: "shibuya",
            bounds: Bounds::new(-800.0, 800.0, -800.0, -100.0),
            district: Some(SHIBUYA),
        },
    ]
}

/// E-W side streets every 50 units, minus those within 10 of an avenue.
fn ew_streets() -> Vec<f32> {
    (0..)
        .map(|i| -750.0 + 50.0 * i as f32)
        .take_while(|z| *z <= 750.0)
        .filter(|z| !EW_AVENUES.iter().any(|a| (z - a).abs() < 10.0))
        .collect()
}

/// Full-length road, or two pieces stopping at the park edge when it crosses the park.
fn push_line(
    out: &mut Vec<StreetSegment>,
    kind: StreetKind,
    width: f32,
    crosses_park: bool,
    park_span: (f32, f32),
    make: impl Fn(f32, f32) -> ((f32, f32), (f32, f32)),
) {
    let spans = if crosses_park {
        vec![(-ROAD_EXTENT, park_span.0), (park_span.1, ROAD_EXTENT)]
    } else {
        vec![(-ROAD_EXTENT, ROAD_EXTENT)]
    };
    for (a, b) in spans {
        let (start, end) = make(a, b);
        out.push(StreetSegment::new(kind, start, end, width));
    }
}

fn streets() -> Vec<StreetSegment> {
    let park = YOYOGI_PARK;
    let in_park_x = |x: f32| x > park.min_x && x < park.max_x;
    let in_park_z = |z: f32| z > park.min_z && z < park.max_z;
    let mut out = Vec::new();

    for x in NS_AVENUES {
        push_line(
            &mut out,
            StreetKind::Avenue,
            AVENUE_WIDTH,
            in_park_x(x),
            (park.min_z, park.max_z),
            |a, b| ((x, a), (x, b)),
        );
    }
    for z in EW_AVENUES {
        push_line(
            &mut out,
            StreetKind::Avenue,
            AVENUE_WIDTH,
            in_park_z(z),
            (park.min_x, park.max_x),
            |a, b| ((a, z), (b, z)),
        );
    }
    for x in NS_STREETS {
        push_line(
            &mut out,
            StreetKind::Street,
            STREET_WIDTH,
            in_park_x(x),
            (park.min_z, park.max_z),
            |a, b| ((x, a), (x, b)),
        );
    }
    for z in ew_streets() {
        push_line(
            &mut out,
            StreetKind::Street,
            STREET_WIDTH,
            in_park_z(z),
            (park.min_x, park.max_x),
            |a, b| ((a, z), (b, z)),
        );
    }
    out
}

fn road_width_at(avenues: &[f32], position: f32) -> f32 {
    if avenues.contains(&position) {
        AVENUE_WIDTH
    } else {
        STREET_WIDTH
    }
}

fn blocks() -> Vec<Block> {
    let mut all_ns: Vec<f32> = NS_AVENUES.iter().chain(NS_STREETS.iter()).copied().collect();
    all_ns.sort_by(f32::total_cmp);
    let mut all_ew: Vec<f32> = EW_AVENUES.iter().copied().chain(ew_streets()).collect();
    all_ew.sort_by(f32::total_cmp);

    let mut out = Vec::new();
    for xs in all_ns.windows(2) {
        let left = xs[0] + road_width_at(&NS_AVENUES, xs[0]) / 2.0;
        let right = xs[1] - road_width_at(&NS_AVENUES, xs[1]) / 2.0;
        let width = right - left;
        if width < MIN_BLOCK_SIDE {
            continue;
        }
        for zs in all_ew.windows(2) {
            let bottom = zs[0] + road_width_at(&EW_AVENUES, zs[0]) / 2.0;
            let top = zs[1] - road_width_at(&EW_AVENUES, zs[1]) / 2.0;
            let depth = top - bottom;
            if depth < MIN_BLOCK_SIDE {
                continue;
            }
            let cx = (left + right) / 2.0;
            let cz = (bottom + top) / 2.0;
            if YOYOGI_PARK.contains(cx, cz) {
                continue;
            }
            out.push(Block::new(cx, cz, width, depth));
        }
    }
    out
}

pub fn config() -> MapConfig {
    MapConfig {
        id: MAP_ID,
        name: "Tokyo",
        subtitle: "Shibuya \u{2022} Harajuku \u{2022} Shinjuku",
        music_track: None,
        spawn: SpawnPoint {
            x: 0.0,
            z: -250.0,
            heading: 0.0,
        },
        bounds: MAP_BOUNDS,
        road_widths: RoadWidths {
            avenue: AVENUE_WIDTH,
            street: STREET_WIDTH,
        },
        sidewalk_width: SIDEWALK_WIDTH,
        streets: streets(),
        blocks: blocks(),
        district_zones: district_zones(),
        fallback_district: SHIBUYA,
        water_zones: Vec::new(),
        bridges: Vec::new(),
        parks: vec![ParkZone {
            id: "yoyogiPark",
            bounds: YOYOGI_PARK,
        }],
        broadway: None,
        landmarks: vec![
            Landmark::YoyogiPark(YOYOGI_PARK),
            Landmark::ShibuyaCrossing(SHIBUYA_CROSSING),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_streets_skip_avenue_rows() {
        let zs = ew_streets();
        assert_eq!(zs.len(), 31 - 8);
        assert!(!zs.contains(&-700.0));
        assert!(zs.contains(&-750.0));
        assert!(zs.contains(&-650.0));
    }

    #[test]
    fn roads_through_yoyogi_are_split() {
        let streets = streets();
        // x = -500 and x = -300 avenues plus x = -600 and -400 streets cross the park.
        let pieces_at = |x: f32| streets.iter().filter(|s| s.start.x == x && s.end.x == x).count();
        assert_eq!(pieces_at(-500.0), 2);
        assert_eq!(pieces_at(-400.0), 2);
        assert_eq!(pieces_at(100.0), 1);
        assert!(streets.iter().all(|s| !s.is_bridge()));
    }

    #[test]
    fn blocks_avoid_the_park() {
        let blocks = blocks();
        assert!(!blocks.is_empty());
        assert!(
            blocks
                .iter()
                .all(|b| !YOYOGI_PARK.contains(b.center.x, b.center.y))
        );
    }
}
