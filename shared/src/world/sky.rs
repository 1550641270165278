use std::f32::consts::{PI, TAU};

use nalgebra::Vector3;

use super::{Builder, Layer, Material, Primitive, Transform};
use crate::palette::Color;

const STAR_COUNT: usize = 800;
const STAR_RADIUS: f32 = 500.0;
const STAR_LIFT: f32 = 100.0;
/// Stars only fill the top 40% of the dome.
const STAR_MAX_POLAR: f32 = PI * 0.4;

const MOON_POSITION: [f32; 3] = [-150.0, 380.0, -200.0];

/// Star field and a bloom-bright moon. Fog and background come with the world defaults.
pub(super) fn build(b: &mut Builder<'_>) {
    let mut positions = Vec::with_capacity(STAR_COUNT);
    let mut sizes = Vec::with_capacity(STAR_COUNT);
    for _ in 0..STAR_COUNT {
        let theta = b.random() * TAU;
        let phi = b.random() * STAR_MAX_POLAR;
        positions.push(Vector3::new(
            STAR_RADIUS * phi.sin() * theta.cos(),
            STAR_RADIUS * phi.cos() + STAR_LIFT,
            STAR_RADIUS * phi.sin() * theta.sin(),
        ));
        sizes.push(b.range(0.5, 2.0));
    }
    b.out.stars.positions = positions;
    b.out.stars.sizes = sizes;
    b.out.stars.color = Color::hex(0xffffff).with_alpha(0.7);

    let [x, y, z] = MOON_POSITION;
    let layers = [
        (30.0, Material::solid(Color::hex(0xffffff))),
        (50.0, Material::translucent(Color::hex(0xccddff), 0.2)),
        (80.0, Material::translucent(Color::hex(0x8899bb), 0.08)),
    ];
    for (radius, material) in layers {
        b.mesh(
            Layer::Sky,
            Primitive::Sphere { radius },
            material.without_fog(),
            Transform::at(x, y, z),
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        collision::CollisionWorld, elevation::ElevationField, map::nyc, world::GeneratedWorld,
    };

    #[test]
    fn stars_sit_on_the_upper_dome() {
        let config = nyc::config();
        let elevation = ElevationField::flat();
        let mut collision = CollisionWorld::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut b = Builder {
            config: &config,
            elevation: &elevation,
            collision: &mut collision,
            rng: &mut rng,
            out: GeneratedWorld::empty(config.id),
        };
        build(&mut b);

        let stars = &b.out.stars;
        assert_eq!(stars.positions.len(), STAR_COUNT);
        assert_eq!(stars.sizes.len(), STAR_COUNT);
        let min_y = STAR_RADIUS * STAR_MAX_POLAR.cos() + STAR_LIFT;
        for p in &stars.positions {
            assert!(p.y >= min_y - 1.0e-3);
            let r = Vector3::new(p.x, p.y - STAR_LIFT, p.z).norm();
            assert!((r - STAR_RADIUS).abs() < 1.0e-2);
        }
        assert!(stars.sizes.iter().all(|s| (0.5..2.0).contains(s)));
        assert!(b.out.meshes.iter().all(|m| !m.material.fog));
    }
}
