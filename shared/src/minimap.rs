//! Round minimap gauge, turned so the car always points up.
//!
//! The road network, water and parks are rasterised once per map. Each frame
//! [`Minimap::render`] samples that layer around the car into a small RGBA8 square:
//! transparent outside the gauge, map inside, the car marker in the middle and a neon
//! rim on top.

use std::f32::consts::PI;

use nalgebra::Vector2;

use crate::{
    map::{Bounds, MapConfig, StreetKind, StreetSegment},
    palette::Color,
    utils::dist_to_segment,
    world::WindowTexture,
};

/// Edge of the rendered square, in pixels.
pub const MINIMAP_SIZE: u32 = 200;

const CENTER: f32 = MINIMAP_SIZE as f32 / 2.0;
const RADIUS: f32 = 83.0;
/// World units between the car and the rim.
const VIEW_RADIUS: f32 = 350.0;
/// Pixels per world unit.
const SCALE: f32 = RADIUS / VIEW_RADIUS;
const RIM_WIDTH: f32 = 7.0;
/// The map stops this far inside the rim.
const MAP_INSET: f32 = 4.0;

const LAND: Color = Color::hex(0x0f0f19);
const WATER: Color = Color::hex(0x0a1932);
const PARK: Color = Color::hex(0x0f2814);
const FACE_CENTER: Color = Color::rgba(30, 30, 50, 242);
const FACE_RIM: Color = Color::rgba(5, 5, 15, 250);
const CAR_MARKER: Color = Color::hex(0xff3c00);
const RIM: Color = Color::rgba(0x00, 0xf0, 0xff, 153);

/// Marker triangle around the centre, pointing up.
const MARKER: [(f32, f32); 3] = [(0.0, -7.0), (-4.5, 5.0), (4.5, 5.0)];

pub struct Minimap {
    layer: WindowTexture,
    /// World position of the layer's top-left pixel corner.
    origin: Vector2<f32>,
}

impl Minimap {
    /// Rasterise `config`'s water, parks and streets.
    pub fn new(config: &MapConfig) -> Self {
        let map = config.bounds;
        let width = (map.width() * SCALE).ceil().max(1.0) as u32;
        let height = (map.depth() * SCALE).ceil().max(1.0) as u32;
        let mut layer = WindowTexture::filled(width, height, LAND);

        for water in &config.water_zones {
            fill_zone(&mut layer, &map, &water.bounds, WATER);
        }
        for park in &config.parks {
            fill_zone(&mut layer, &map, &park.bounds, PARK);
        }
        for street in &config.streets {
            draw_street(&mut layer, &map, street);
        }

        tracing::debug!(map = config.id, width, height, "minimap layer rasterised");
        Self {
            layer,
            origin: Vector2::new(map.min_x, map.min_z),
        }
    }

    /// Draw the gauge for a car at `(x, z)` facing `heading` into `pixels`, an RGBA8
    /// buffer of [`MINIMAP_SIZE`] squared pixels. Returns `false`, drawing nothing,
    /// when the buffer has the wrong length.
    pub fn render(&self, x: f32, z: f32, heading: f32, pixels: &mut [u8]) -> bool {
        let size = MINIMAP_SIZE as usize;
        if pixels.len() != size * size * 4 {
            return false;
        }

        let view = View::new(x, z, heading);
        for (i, out) in pixels.chunks_exact_mut(4).enumerate() {
            let sx = (i % size) as f32 + 0.5 - CENTER;
            let sy = (i / size) as f32 + 0.5 - CENTER;
            let r = sx.hypot(sy);

            let mut color = [0, 0, 0, 0];
            if r <= RADIUS - 1.0 {
                color = lerp(FACE_CENTER, FACE_RIM, r / RADIUS);
            }
            if r < RADIUS - MAP_INSET {
                let (wx, wz) = view.world(sx, sy);
                color = self.sample(wx, wz);
            }
            if in_marker(sx, sy) {
                color = rgba(CAR_MARKER);
            }
            if (r - RADIUS).abs() <= RIM_WIDTH / 2.0 {
                color = over(color, RIM);
            }
            out.copy_from_slice(&color);
        }
        true
    }

    /// Layer color at a world position; land outside the map.
    fn sample(&self, x: f32, z: f32) -> [u8; 4] {
        let px = ((x - self.origin.x) * SCALE).floor();
        let py = ((z - self.origin.y) * SCALE).floor();
        if px < 0.0 || py < 0.0 {
            return rgba(LAND);
        }
        self.layer
            .pixel(px as u32, py as u32)
            .unwrap_or(rgba(LAND))
    }
}

/// Screen offset from the gauge centre to world position, for one car pose.
struct View {
    car: Vector2<f32>,
    sin: f32,
    cos: f32,
}

impl View {
    fn new(x: f32, z: f32, heading: f32) -> Self {
        let (sin, cos) = (heading - PI).sin_cos();
        Self {
            car: Vector2::new(x, z),
            sin,
            cos,
        }
    }

    /// Screen `y` grows downward; up on screen is the car's forward.
    fn world(&self, sx: f32, sy: f32) -> (f32, f32) {
        let mx = self.cos * sx + self.sin * sy;
        let my = -self.sin * sx + self.cos * sy;
        (self.car.x + mx / SCALE, self.car.y + my / SCALE)
    }
}

fn fill_zone(layer: &mut WindowTexture, map: &Bounds, zone: &Bounds, color: Color) {
    let x0 = ((zone.min_x - map.min_x) * SCALE).max(0.0);
    let y0 = ((zone.min_z - map.min_z) * SCALE).max(0.0);
    let x1 = ((zone.max_x - map.min_x) * SCALE).max(0.0);
    let y1 = ((zone.max_z - map.min_z) * SCALE).max(0.0);
    layer.blend_rect(
        x0.round() as u32,
        y0.round() as u32,
        (x1 - x0).round() as u32,
        (y1 - y0).round() as u32,
        color,
    );
}

/// Round-capped line, brighter for bigger roads.
fn draw_street(layer: &mut WindowTexture, map: &Bounds, street: &StreetSegment) {
    let opacity = match street.kind {
        StreetKind::Bridge => 0.35,
        StreetKind::Avenue | StreetKind::Broadway => 0.25,
        StreetKind::Street => 0.15,
    };
    let color = Color::hex(0xffffff).with_alpha(opacity);
    let to_px = |p: Vector2<f32>| Vector2::new((p.x - map.min_x) * SCALE, (p.y - map.min_z) * SCALE);
    let (a, b) = (to_px(street.start), to_px(street.end));
    let half = (street.width * SCALE).max(1.0) / 2.0;

    let x0 = (a.x.min(b.x) - half).floor().max(0.0) as u32;
    let y0 = (a.y.min(b.y) - half).floor().max(0.0) as u32;
    let x1 = (a.x.max(b.x) + half).ceil().max(0.0) as u32;
    let y1 = (a.y.max(b.y) + half).ceil().max(0.0) as u32;
    for py in y0..y1.min(layer.height) {
        for px in x0..x1.min(layer.width) {
            let centre = Vector2::new(px as f32 + 0.5, py as f32 + 0.5);
            if dist_to_segment(centre, a, b) <= half {
                layer.blend_pixel(px, py, color);
            }
        }
    }
}

fn in_marker(x: f32, y: f32) -> bool {
    let [a, b, c] = MARKER;
    let edge = |(x0, y0): (f32, f32), (x1, y1): (f32, f32)| (x1 - x0) * (y - y0) - (y1 - y0) * (x - x0);
    let (d0, d1, d2) = (edge(a, b), edge(b, c), edge(c, a));
    (d0 >= 0.0 && d1 >= 0.0 && d2 >= 0.0) || (d0 <= 0.0 && d1 <= 0.0 && d2 <= 0.0)
}

fn rgba(color: Color) -> [u8; 4] {
    [color.r, color.g, color.b, color.a]
}

fn lerp(from: Color, to: Color, t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    [
        mix(from.r, to.r),
        mix(from.g, to.g),
        mix(from.b, to.b),
        mix(from.a, to.a),
    ]
}

/// Straight-alpha "source over".
fn over(dst: [u8; 4], src: Color) -> [u8; 4] {
    let sa = src.opacity();
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mix = |s: u8, d: u8| {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round() as u8
    };
    [
        mix(src.r, dst[0]),
        mix(src.g, dst[1]),
        mix(src.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::nyc;

    fn frame(minimap: &Minimap, x: f32, z: f32, heading: f32) -> Vec<u8> {
        let mut pixels = vec![0; (MINIMAP_SIZE * MINIMAP_SIZE * 4) as usize];
        assert!(minimap.render(x, z, heading, &mut pixels));
        pixels
    }

    fn at(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * MINIMAP_SIZE + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    #[test]
    fn up_on_screen_is_the_car_forward() {
        let up = (0.0, -10.0);
        let (x, z) = View::new(5.0, 7.0, 0.0).world(up.0, up.1);
        assert!((x - 5.0).abs() < 1.0e-3);
        assert!((z - (7.0 + 10.0 / SCALE)).abs() < 1.0e-3);

        // Facing +X, up is +X and right on screen is +Z, as seen from the chase camera.
        let view = View::new(0.0, 0.0, std::f32::consts::FRAC_PI_2);
        let (x, z) = view.world(up.0, up.1);
        assert!((x - 10.0 / SCALE).abs() < 1.0e-3);
        assert!(z.abs() < 1.0e-3);
        let (x, z) = view.world(10.0, 0.0);
        assert!(x.abs() < 1.0e-3);
        assert!((z - 10.0 / SCALE).abs() < 1.0e-3);
    }

    #[test]
    fn layer_shows_water_parks_and_streets() {
        let config = nyc::config();
        let minimap = Minimap::new(&config);
        assert_eq!(minimap.sample(-400.0, 300.0), rgba(WATER));
        let park = config.parks[0].bounds.center();
        assert_eq!(minimap.sample(park.x, park.y), rgba(PARK));

        // On a Manhattan avenue, away from parks and water.
        let Some(avenue) = config
            .streets
            .iter()
            .find(|s| s.kind == StreetKind::Avenue && s.start.x > 0.0)
        else {
            panic!("nyc has avenues");
        };
        let mid = (avenue.start + avenue.end) / 2.0;
        let road = minimap.sample(mid.x, mid.y);
        assert!(road[0] > LAND.r && road[1] > LAND.g);

        assert_eq!(minimap.sample(-5000.0, 0.0), rgba(LAND));
    }

    #[test]
    fn gauge_layout() {
        let minimap = Minimap::new(&nyc::config());
        let pixels = frame(&minimap, -400.0, 300.0, 0.0);
        let c = MINIMAP_SIZE / 2;

        // Transparent corners, marker in the middle, water just ahead of it.
        assert_eq!(at(&pixels, 0, 0)[3], 0);
        assert_eq!(at(&pixels, c, c), rgba(CAR_MARKER));
        assert_eq!(at(&pixels, c, c - 12), rgba(WATER));

        let rim = at(&pixels, c + RADIUS as u32, c);
        assert!(rim[3] > 0);
        assert!(rim[2] > rim[0]);
    }

    #[test]
    fn wrong_buffer_size_is_refused() {
        let minimap = Minimap::new(&nyc::config());
        let mut pixels = vec![7; 16];
        assert!(!minimap.render(0.0, 0.0, 0.0, &mut pixels));
        assert!(pixels.iter().all(|p| *p == 7));
    }

    #[test]
    fn over_onto_transparent_keeps_source() {
        assert_eq!(over([0, 0, 0, 0], RIM), rgba(RIM));
        let onto_opaque = over(rgba(LAND), RIM);
        assert_eq!(onto_opaque[3], 255);
    }
}
