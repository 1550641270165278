//! Hand-built set pieces layered over the generated grid.
//!
//! Each [`Landmark`] in the map config gets one builder. Builders only add meshes,
//! batches and collision bodies; they never touch the building textures.

mod central_park;
mod park;
mod shibuya_crossing;
mod times_square;
mod yoyogi_park;

use nalgebra::Vector2;

use super::{Builder, InstanceBatch, Layer, Material, Primitive, Transform};
use crate::{
    map::{Bounds, Landmark},
    palette::{Color, NEON_COLORS},
};

pub(super) fn build(b: &mut Builder<'_>) {
    let config = b.config;
    for landmark in &config.landmarks {
        let bounds = landmark.bounds();
        match landmark {
            Landmark::CentralPark(_) => central_park::build(b, &bounds),
            Landmark::TimesSquare(_) => times_square::build(b, &bounds),
            Landmark::YoyogiPark(_) => yoyogi_park::build(b, &bounds),
            Landmark::ShibuyaCrossing(_) => shibuya_crossing::build(b, &bounds),
        }
        tracing::debug!(landmark = landmark.name(), "landmark built");
    }
}

/// `start, start + step, ...` while below `end`.
pub(super) fn steps(start: f32, end: f32, step: f32) -> impl Iterator<Item = f32> {
    std::iter::successors(Some(start), move |v| Some(v + step)).take_while(move |v| *v < end)
}

/// Parallel translucent strips laid across a plaza, one batch per direction.
pub(super) struct GlowStrips {
    pub name: &'static str,
    pub color: Color,
    pub opacity: f32,
    /// First strip's distance from the min edge.
    pub start: f32,
    pub spacing: f32,
    pub thickness: f32,
    pub y: f32,
}

impl GlowStrips {
    /// Strips running east-west, stepping north.
    pub fn east_west(&self, b: &mut Builder<'_>, bounds: &Bounds) {
        let mut batch = self.batch(Primitive::plane(bounds.width(), self.thickness));
        let x = bounds.center().x;
        for z in steps(bounds.min_z + self.start, bounds.max_z, self.spacing) {
            batch.push(x, self.y, z);
        }
        b.batch(batch);
    }

    /// Strips running north-south, stepping east.
    pub fn north_south(&self, b: &mut Builder<'_>, bounds: &Bounds) {
        let mut batch = self.batch(Primitive::plane(self.thickness, bounds.depth()));
        let z = bounds.center().y;
        for x in steps(bounds.min_x + self.start, bounds.max_x, self.spacing) {
            batch.push(x, self.y, z);
        }
        b.batch(batch);
    }

    fn batch(&self, primitive: Primitive) -> InstanceBatch {
        InstanceBatch::new(
            self.name,
            Layer::Landmark,
            primitive,
            Material::translucent(self.color, self.opacity),
        )
    }
}

/// Look of a plaza's freestanding billboards.
pub(super) struct BillboardStyle {
    pub frame: Color,
    pub frame_pad: f32,
    pub frame_depth: f32,
    pub pole: Color,
    pub pole_radius: f32,
    /// Range of the board's bottom edge height.
    pub base: (f32, f32),
    /// Face and stripe distances in front of the frame centre.
    pub face_offset: f32,
    pub stripe_offset: f32,
    pub min_stripes: usize,
    pub extra_stripes: usize,
    pub stripe_height: (f32, f32),
    /// Stripe width as a fraction of the board width.
    pub stripe_width: (f32, f32),
    /// Stripe centres fall in `height * (lo .. lo + span)` above the base.
    pub stripe_band: (f32, f32),
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Billboard {
    pub x: f32,
    pub z: f32,
    pub yaw: f32,
    pub width: f32,
    pub height: f32,
}

const PANEL_DEPTH: f32 = 0.02;

fn neon(b: &mut Builder<'_>) -> Color {
    b.index(NEON_COLORS.len()).map_or(NEON_COLORS[0], |i| NEON_COLORS[i])
}

/// Framed neon board on a pole, with a few stripes standing in for content.
pub(super) fn billboard(b: &mut Builder<'_>, style: &BillboardStyle, board: Billboard) {
    let base = b.range(style.base.0, style.base.1);
    let forward = Vector2::new(board.yaw.sin(), board.yaw.cos());
    let at = |offset: f32, y: f32| {
        let p = Vector2::new(board.x, board.z) + forward * offset;
        Transform::at(p.x, y, p.y).with_yaw(board.yaw)
    };
    let centre_y = base + board.height / 2.0;

    b.mesh(
        Layer::Sign,
        Primitive::cuboid(
            board.width + style.frame_pad,
            board.height + style.frame_pad,
            style.frame_depth,
        ),
        Material::solid(style.frame),
        at(0.0, centre_y),
    );
    let face = neon(b);
    b.mesh(
        Layer::Sign,
        Primitive::cuboid(board.width, board.height, PANEL_DEPTH),
        Material::solid(face),
        at(style.face_offset, centre_y),
    );

    let stripes = style.min_stripes + b.index(style.extra_stripes).unwrap_or(0);
    for _ in 0..stripes {
        let color = neon(b);
        let height = b.range(style.stripe_height.0, style.stripe_height.1);
        let width = board.width * b.range(style.stripe_width.0, style.stripe_width.1);
        let (lo, span) = style.stripe_band;
        let y = base + board.height * lo + b.random() * board.height * span;
        b.mesh(
            Layer::Sign,
            Primitive::cuboid(width, height, PANEL_DEPTH),
            Material::solid(color),
            at(style.stripe_offset, y),
        );
    }

    b.mesh(
        Layer::Sign,
        Primitive::cylinder(style.pole_radius, style.pole_radius, base, 5),
        Material::solid(style.pole),
        Transform::at(board.x, base / 2.0, board.z),
    );
    b.out.stats.signs += 1;
}

#[cfg(test)]
pub(super) mod test_support {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use crate::{
        collision::CollisionWorld,
        elevation::ElevationField,
        map::{Bounds, MapConfig},
        world::{Builder, GeneratedWorld},
    };

    /// Run one landmark builder against a fresh world.
    pub fn run(
        config: &MapConfig,
        seed: u64,
        build: impl FnOnce(&mut Builder<'_>, &Bounds),
        bounds: Bounds,
    ) -> (GeneratedWorld, CollisionWorld) {
        let elevation = ElevationField::new(config);
        let mut collision = CollisionWorld::new();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut b = Builder {
            config,
            elevation: &elevation,
            collision: &mut collision,
            rng: &mut rng,
            out: GeneratedWorld::empty(config.id),
        };
        build(&mut b, &bounds);
        let out = b.out;
        (out, collision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_stop_before_the_end() {
        let v: Vec<f32> = steps(0.0, 10.0, 4.0).collect();
        assert_eq!(v, vec![0.0, 4.0, 8.0]);
        assert_eq!(steps(5.0, 5.0, 1.0).count(), 0);
    }
}
