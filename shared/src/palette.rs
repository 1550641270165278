//! Colors used by the generated world.
//!
//! Everything is stored as sRGB bytes; the renderer decides how to convert.

/// sRGB color with a straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque color from `0xRRGGBB`.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
            a: 0xFF,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha from a `0..=1` opacity.
    pub fn with_alpha(self, opacity: f32) -> Self {
        Self {
            a: (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Channels as `0..=1` floats, sRGB encoded.
    pub fn to_srgb_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }
}

/// Opaque black.
impl Default for Color {
    fn default() -> Self {
        Self::hex(0x000000)
    }
}

pub const ROAD: Color = Color::hex(0x1a1a2e);
pub const ROAD_LINE: Color = Color::hex(0xe0e0e0);
pub const BUILDING: Color = Color::hex(0x0f0f1a);
pub const ROOF: Color = Color::hex(0x1a1a2a);
pub const SIDEWALK: Color = Color::hex(0x2a2a3e);
pub const GROUND: Color = Color::hex(0x111122);
pub const SKY: Color = Color::hex(0x050510);
pub const FOG: Color = Color::hex(0x0d0015);
pub const CAR_BODY: Color = Color::hex(0xcc0000);
pub const CAR_ACCENT: Color = Color::hex(0x222222);
pub const TIRE: Color = Color::hex(0x111111);
pub const HEADLIGHT: Color = Color::hex(0xffffcc);
pub const UNDERGLOW: Color = Color::hex(0x6600ff);
pub const STREET_LAMP: Color = Color::hex(0xffaa44);
pub const LAMP_POLE: Color = Color::hex(0x333344);

pub const NEON_PINK: Color = Color::hex(0xff006e);
pub const NEON_BLUE: Color = Color::hex(0x00f0ff);
pub const NEON_GREEN: Color = Color::hex(0x39ff14);
pub const NEON_ORANGE: Color = Color::hex(0xff6600);
pub const NEON_PURPLE: Color = Color::hex(0xb300ff);

/// Pool for signs and billboards.
pub const NEON_COLORS: [Color; 5] = [NEON_PINK, NEON_BLUE, NEON_GREEN, NEON_ORANGE, NEON_PURPLE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(NEON_PINK, Color::rgba(0xff, 0x00, 0x6e, 0xff));
        assert_eq!(STREET_LAMP.with_alpha(0.5).a, 128);
        assert_eq!(GROUND.with_alpha(2.0).a, 255);
    }

    #[test]
    fn default_is_opaque_black() {
        assert_eq!(Color::default(), Color::rgba(0, 0, 0, 255));
    }
}
