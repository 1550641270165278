//! Screen-space effect chain: scene render, bloom, pixelation, CRT.
//!
//! [`PostFxChain`] is the renderer-independent description of the chain. It owns the
//! settings, tracks the output size and the CRT clock, and knows the size of the
//! low-resolution target the pixelation step renders into. Renderers own the GPU
//! side and release it once [`PostFxChain::is_disposed`] reports true.

use crate::constants::{
    BLOOM_RADIUS, BLOOM_STRENGTH, BLOOM_THRESHOLD, CHROMATIC_ABERRATION, CRT_CURVATURE,
    PIXEL_SIZE, SCANLINE_INTENSITY, VIGNETTE_STRENGTH,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    Render,
    Bloom,
    Pixelate,
    Crt,
}

/// Passes in the order they run.
pub const PASSES: [Pass; 4] = [Pass::Render, Pass::Bloom, Pass::Pixelate, Pass::Crt];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomSettings {
    pub strength: f32,
    pub radius: f32,
    /// Luminance below which nothing blooms.
    pub threshold: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrtSettings {
    pub scanline_intensity: f32,
    pub vignette_strength: f32,
    /// Horizontal red/blue split in UV units.
    pub chromatic_aberration: f32,
    pub curvature: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostFxSettings {
    pub bloom: BloomSettings,
    /// Edge of one output pixel block, in screen pixels.
    pub pixel_size: f32,
    pub crt: CrtSettings,
}

impl Default for PostFxSettings {
    fn default() -> Self {
        Self {
            bloom: BloomSettings {
                strength: BLOOM_STRENGTH,
                radius: BLOOM_RADIUS,
                threshold: BLOOM_THRESHOLD,
            },
            pixel_size: PIXEL_SIZE,
            crt: CrtSettings {
                scanline_intensity: SCANLINE_INTENSITY,
                vignette_strength: VIGNETTE_STRENGTH,
                chromatic_aberration: CHROMATIC_ABERRATION,
                curvature: CRT_CURVATURE,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PostFxChain {
    pub settings: PostFxSettings,
    width: u32,
    height: u32,
    time: f32,
    disposed: bool,
}

impl PostFxChain {
    /// Chain for an output of `width × height`. Zero sizes are bumped to 1.
    pub fn new(settings: PostFxSettings, width: u32, height: u32) -> Self {
        Self {
            settings,
            width: width.max(1),
            height: height.max(1),
            time: 0.0,
            disposed: false,
        }
    }

    pub fn passes(&self) -> &'static [Pass] {
        &PASSES
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Follow the output size. Zero sizes (minimized windows) are ignored; returns
    /// whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring zero-sized resize");
            return false;
        }
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    /// Size of the target the scene is rendered into before upscaling, one texel per
    /// pixel block.
    pub fn low_res_size(&self) -> (u32, u32) {
        let block = self.settings.pixel_size.max(1.0);
        (
            ((self.width as f32 / block).ceil() as u32).max(1),
            ((self.height as f32 / block).ceil() as u32).max(1),
        )
    }

    /// Advance the CRT clock to `time` seconds.
    pub fn update(&mut self, time: f32) {
        self.time = time;
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Release the chain. Safe to call more than once.
    pub fn dispose(&mut self) {
        if !self.disposed {
            tracing::debug!("post-processing chain disposed");
        }
        self.disposed = true;
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_run_in_order() {
        let chain = PostFxChain::new(PostFxSettings::default(), 1280, 720);
        assert_eq!(
            chain.passes(),
            &[Pass::Render, Pass::Bloom, Pass::Pixelate, Pass::Crt]
        );
    }

    #[test]
    fn zero_sizes_are_ignored() {
        let mut chain = PostFxChain::new(PostFxSettings::default(), 1280, 720);
        assert!(!chain.resize(0, 720));
        assert!(!chain.resize(1280, 0));
        assert_eq!(chain.size(), (1280, 720));
        assert!(chain.resize(800, 600));
        assert_eq!(chain.size(), (800, 600));
        assert!(!chain.resize(800, 600));
    }

    #[test]
    fn low_res_target_rounds_up() {
        let mut chain = PostFxChain::new(PostFxSettings::default(), 1280, 720);
        assert_eq!(chain.low_res_size(), (427, 240));
        chain.resize(2, 2);
        assert_eq!(chain.low_res_size(), (1, 1));
    }

    #[test]
    fn clock_and_dispose() {
        let mut chain = PostFxChain::new(PostFxSettings::default(), 640, 480);
        chain.update(12.5);
        assert_eq!(chain.time(), 12.5);
        chain.dispose();
        chain.dispose();
        assert!(chain.is_disposed());
    }
}
