//! New York: Manhattan grid with Broadway and Central Park, the East River, three
//! bridges and a smaller Brooklyn grid.

use super::{
    MapConfig,
    types::{
        Block, Bounds, BridgeDef, BridgeStyle, Broadway, DistrictConfig, DistrictZone, Landmark,
        ParkZone, RoadWidths, SpawnPoint, StreetKind, StreetSegment, WaterZone,
    },
};
use crate::palette::Color;
use nalgebra::Vector2;

pub const MAP_ID: &str = "nyc";

const AVENUE_WIDTH: f32 = 14.0;
const STREET_WIDTH: f32 = 10.0;
const BROADWAY_WIDTH: f32 = 16.0;
const BRIDGE_WIDTH: f32 = 14.0;
const SIDEWALK_WIDTH: f32 = 2.0;

/// Smallest block side kept between roads.
const MIN_BLOCK_SIDE: f32 = 10.0;

pub const CENTRAL_PARK: Bounds = Bounds::new(150.0, 520.0, 200.0, 700.0);
pub const TIMES_SQUARE: Bounds = Bounds::new(330.0, 470.0, 30.0, 200.0);
const EAST_RIVER: Bounds = Bounds::new(-500.0, -300.0, -900.0, 500.0);
const MAP_BOUNDS: Bounds = Bounds::new(-850.0, 1150.0, -1000.0, 1000.0);

const MH_AVENUES: [f32; 11] = [
    -250.0, -120.0, 10.0, 140.0, 270.0, 400.0, 530.0, 660.0, 790.0, 920.0, 1050.0,
];
const MH_LOWER_Z: [f32; 4] = [-850.0, -760.0, -670.0, -580.0];
const MH_AVENUE_SPAN: (f32, f32) = (-900.0, 900.0);

const BK_AVENUES: [f32; 3] = [-780.0, -660.0, -540.0];
const BK_AVENUE_SPAN: (f32, f32) = (-750.0, 370.0);
const BK_BLOCK_SPAN: (f32, f32) = (-800.0, 420.0);

const MIDTOWN: DistrictConfig = DistrictConfig {
    name: "Midtown Manhattan",
    height_min: 40.0,
    height_max: 100.0,
    density: 0.95,
    neon_sign_chance: 0.6,
    neon_signs_per_face: 1,
    window_lit_chance: 0.4,
    ground_color: Color::hex(0x111122),
    building_tint: Color::hex(0x0f0f1a),
    roof_color: Color::hex(0x1a1a2a),
};

const DOWNTOWN: DistrictConfig = DistrictConfig {
    name: "Lower Manhattan",
    height_min: 25.0,
    height_max: 75.0,
    density: 0.9,
    neon_sign_chance: 0.3,
    neon_signs_per_face: 1,
    window_lit_chance: 0.35,
    ground_color: Color::hex(0x0f0f1a),
    building_tint: Color::hex(0x0f0f1a),
    roof_color: Color::hex(0x181828),
};

const UPTOWN: DistrictConfig = DistrictConfig {
    name: "Upper Manhattan",
    height_min: 15.0,
    height_max: 50.0,
    density: 0.75,
    neon_sign_chance: 0.25,
    neon_signs_per_face: 1,
    window_lit_chance: 0.25,
    ground_color: Color::hex(0x101020),
    building_tint: Color::hex(0x121225),
    roof_color: Color::hex(0x1a1a2a),
};

const TIMES_SQUARE_DISTRICT: DistrictConfig = DistrictConfig {
    name: "Times Square",
    height_min: 35.0,
    height_max: 80.0,
    density: 1.0,
    neon_sign_chance: 1.0,
    neon_signs_per_face: 2,
    window_lit_chance: 0.6,
    ground_color: Color::hex(0x111122),
    building_tint: Color::hex(0x0f0f1a),
    roof_color: Color::hex(0x1a1a2a),
};

const BROOKLYN: DistrictConfig = DistrictConfig {
    name: "Brooklyn",
    height_min: 8.0,
    height_max: 28.0,
    density: 0.8,
    neon_sign_chance: 0.15,
    neon_signs_per_face: 1,
    window_lit_chance: 0.2,
    ground_color: Color::hex(0x0e0e1c),
    building_tint: Color::hex(0x151528),
    roof_color: Color::hex(0x1c1c2e),
};

fn district_zones() -> Vec<DistrictZone> {
    vec![
        DistrictZone {
            id: "timesSquare",
            bounds: TIMES_SQUARE,
            district: Some(TIMES_SQUARE_DISTRICT),
        },
        DistrictZone {
            id: "centralPark",
            bounds: CENTRAL_PARK,
            district: None,
        },
        DistrictZone {
            id: "uptown",
            bounds: Bounds::new(-300.0, 1100.0, 400.0, 950.0),
            district: Some(UPTOWN),
        },
        DistrictZone {
            id: "midtown",
            bounds: Bounds::new(-300.0, 1100.0, -200.0, 400.0),
            district: Some(MIDTOWN),
        },
        DistrictZone {
            id: "downtown",
            bounds: Bounds::new(-300.0, 1100.0, -950.0, -200.0),
            district: Some(DOWNTOWN),
        },
        DistrictZone {
            id: "brooklyn",
            bounds: Bounds::new(-830.0, -500.0, -800.0, 420.0),
            district: Some(BROOKLYN),
        },
    ]
}

fn bridge(
    id: &'static str,
    name: &'static str,
    z: f32,
    height: f32,
    style: BridgeStyle,
) -> BridgeDef {
    BridgeDef {
        id,
        name,
        start: Vector2::new(-540.0, z),
        end: Vector2::new(-250.0, z),
        width: BRIDGE_WIDTH,
        height,
        style,
    }
}

fn bridges() -> Vec<BridgeDef> {
    vec![
        bridge("williamsburg", "Williamsburg Bridge", 0.0, 10.0, BridgeStyle::Truss),
        bridge(
            "manhattan-bridge",
            "Manhattan Bridge",
            -350.0,
            10.0,
            BridgeStyle::Suspension,
        ),
        bridge("brooklyn-bridge", "Brooklyn Bridge", -600.0, 12.0, BridgeStyle::Gothic),
    ]
}

fn broadway() -> Broadway {
    Broadway {
        start: Vector2::new(650.0, 850.0),
        end: Vector2::new(150.0, -850.0),
        width: BROADWAY_WIDTH,
    }
}

/// Every Manhattan cross-street z, south to north.
fn manhattan_cross_z() -> Vec<f32> {
    let mut zs: Vec<f32> = MH_LOWER_Z.to_vec();
    zs.extend((0..).map(|i| -500.0 + 55.0 * i as f32).take_while(|z| *z <= 875.0));
    zs.sort_by(f32::total_cmp);
    zs
}

fn brooklyn_cross_z() -> Vec<f32> {
    (0..)
        .map(|i| -750.0 + 80.0 * i as f32)
        .take_while(|z| *z <= 370.0)
        .collect()
}

/// Push one road, or two pieces that stop at a park edge when `split` is given.
fn push_split(
    out: &mut Vec<StreetSegment>,
    kind: StreetKind,
    width: f32,
    span: (f32, f32),
    split: Option<(f32, f32)>,
    make: impl Fn(f32, f32) -> ((f32, f32), (f32, f32)),
) {
    let mut push = |a: f32, b: f32| {
        let (start, end) = make(a, b);
        out.push(StreetSegment::new(kind, start, end, width));
    };
    match split {
        Some((lo, hi)) => {
            push(span.0, lo);
            push(hi, span.1);
        }
        None => push(span.0, span.1),
    }
}

fn streets() -> Vec<StreetSegment> {
    let mut out = Vec::new();
    let park = CENTRAL_PARK;

    for x in MH_AVENUES {
        let through_park = x > park.min_x && x < park.max_x;
        push_split(
            &mut out,
            StreetKind::Avenue,
            AVENUE_WIDTH,
            MH_AVENUE_SPAN,
            through_park.then_some((park.min_z, park.max_z)),
            |a, b| ((x, a), (x, b)),
        );
    }

    let x_span = (MH_AVENUES[0], MH_AVENUES[MH_AVENUES.len() - 1]);
    for z in manhattan_cross_z() {
        let through_park = z > park.min_z && z < park.max_z;
        push_split(
            &mut out,
            StreetKind::Street,
            STREET_WIDTH,
            x_span,
            through_park.then_some((park.min_x, park.max_x)),
            |a, b| ((a, z), (b, z)),
        );
    }

    let bw = broadway();
    out.push(StreetSegment {
        kind: StreetKind::Broadway,
        start: bw.start,
        end: bw.end,
        width: bw.width,
    });

    for x in BK_AVENUES {
        out.push(StreetSegment::new(
            StreetKind::Avenue,
            (x, BK_AVENUE_SPAN.0),
            (x, BK_AVENUE_SPAN.1),
            AVENUE_WIDTH,
        ));
    }
    // Brooklyn cross streets are as wide as avenues.
    for z in brooklyn_cross_z() {
        out.push(StreetSegment::new(
            StreetKind::Street,
            (BK_AVENUES[0], z),
            (BK_AVENUES[BK_AVENUES.len() - 1], z),
            AVENUE_WIDTH,
        ));
    }

    for b in bridges() {
        out.push(StreetSegment {
            kind: StreetKind::Bridge,
            start: b.start,
            end: b.end,
            width: b.width,
        });
    }

    out
}

/// Blocks between consecutive road lines, skipping slivers and anything whose center is excluded.
fn grid_blocks(xs: &[f32], zs: &[f32], excluded: &[Bounds], out: &mut Vec<Block>) {
    for pair_x in xs.windows(2) {
        let left = pair_x[0] + AVENUE_WIDTH / 2.0;
        let right = pair_x[1] - AVENUE_WIDTH / 2.0;
        let width = right - left;
        if width < MIN_BLOCK_SIDE {
            continue;
        }
        for pair_z in zs.windows(2) {
            let bottom = pair_z[0] + STREET_WIDTH / 2.0;
            let top = pair_z[1] - STREET_WIDTH / 2.0;
            let depth = top - bottom;
            if depth < MIN_BLOCK_SIDE {
                continue;
            }
            let cx = (left + right) / 2.0;
            let cz = (bottom + top) / 2.0;
            if excluded.iter().any(|b| b.contains(cx, cz)) {
                continue;
            }
            out.push(Block::new(cx, cz, width, depth));
        }
    }
}

fn blocks() -> Vec<Block> {
    let mut out = Vec::new();
    grid_blocks(
        &MH_AVENUES,
        &manhattan_cross_z(),
        &[CENTRAL_PARK, EAST_RIVER],
        &mut out,
    );

    let mut bk_z = vec![BK_BLOCK_SPAN.0];
    bk_z.extend(brooklyn_cross_z());
    bk_z.push(BK_BLOCK_SPAN.1);
    grid_blocks(&BK_AVENUES, &bk_z, &[], &mut out);
    out
}

pub fn config() -> MapConfig {
    MapConfig {
        id: MAP_ID,
        name: "New York City",
        subtitle: "Manhattan & Brooklyn",
        music_track: Some("mall grab - new york.mp3"),
        spawn: SpawnPoint {
            x: 400.0,
            z: 105.0,
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
        fallback_district: MIDTOWN,
        water_zones: vec![WaterZone {
            id: "east-river",
            bounds: EAST_RIVER,
        }],
        bridges: bridges(),
        parks: vec![ParkZone {
            id: "centralPark",
            bounds: CENTRAL_PARK,
        }],
        broadway: Some(broadway()),
        landmarks: vec![
            Landmark::CentralPark(CENTRAL_PARK),
            Landmark::TimesSquare(TIMES_SQUARE),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_cross_streets_are_sorted_and_complete() {
        let zs = manhattan_cross_z();
        assert_eq!(zs.first(), Some(&-850.0));
        assert_eq!(zs.last(), Some(&875.0));
        assert_eq!(zs.len(), 4 + 26);
        assert!(zs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn avenues_through_the_park_are_split() {
        let streets = streets();
        let at_270: Vec<_> = streets
            .iter()
            .filter(|s| s.kind == StreetKind::Avenue && s.start.x == 270.0)
            .collect();
        assert_eq!(at_270.len(), 2);
        assert_eq!(at_270[0].end.y, CENTRAL_PARK.min_z);
        assert_eq!(at_270[1].start.y, CENTRAL_PARK.max_z);

        let bridges = streets.iter().filter(|s| s.is_bridge()).count();
        assert_eq!(bridges, 3);
        assert_eq!(
            streets.iter().filter(|s| s.kind == StreetKind::Broadway).count(),
            1
        );
    }

    #[test]
    fn no_block_center_in_park_or_river() {
        let blocks = blocks();
        assert!(!blocks.is_empty());
        for b in &blocks {
            assert!(!CENTRAL_PARK.contains(b.center.x, b.center.y));
            assert!(!EAST_RIVER.contains(b.center.x, b.center.y));
            assert!(b.width >= MIN_BLOCK_SIDE && b.depth >= MIN_BLOCK_SIDE);
        }
    }
}
