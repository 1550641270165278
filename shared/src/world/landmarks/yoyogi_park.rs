//! Yoyogi: the shared park layout with blossom trees, a torii gate at the south
//! entrance and a small shrine east of the centre.

use nalgebra::Vector2;

use super::{
    Builder, Layer, Material, Primitive, Transform,
    park::{self, Canopy, LampHead, Lamps, ParkLayout, Pond, Trail, Trees},
};
use crate::{collision::body_from_center, map::Bounds, palette::Color};

const TORII_RED: Color = Color::hex(0xcc3333);
const SHRINE_WALL: Color = Color::hex(0x3a2a1a);
const SHRINE_ROOF: Color = Color::hex(0x1a1a2a);
const OFFERING_BOX: Color = Color::hex(0x2a2a2a);
const LANTERN: Color = Color::hex(0xffaa44);

const GATE_INSET: f32 = 15.0;
const PILLAR_HEIGHT: f32 = 8.0;
const PILLAR_SPREAD: f32 = 4.0;
const SHRINE_OFFSET: (f32, f32) = (30.0, 40.0);

fn layout() -> ParkLayout {
    ParkLayout {
        gravel: Color::hex(0x4a4a3a),
        main_path_width: 5.0,
        cross_inset: 80.0,
        cross_width: 4.0,
        trail: Trail {
            steps: 15,
            inset_x: 30.0,
            inset_z: 40.0,
            waves: 2.0,
            amplitude: 25.0,
            width: 3.5,
        },
        pond: Pond {
            offset: Vector2::new(-50.0, -30.0),
            width: 35.0,
            depth: 20.0,
            glows: 10,
            glow_size: (2.0, 7.0),
            glow_aspect: 0.5,
            glow_spread: (28.0, 16.0),
        },
        trees: Trees {
            count: 150,
            attempts: 600,
            margin: 8.0,
            main_path_clear: 4.0,
            cross_path_clear: 3.5,
            pond_clear: (22.0, 15.0),
            small: Canopy {
                color: Color::hex(0x1a4a1a),
                radius: 2.0,
                lift: 1.8,
            },
            large: Canopy {
                color: Color::hex(0x1a5a1a),
                radius: 3.0,
                lift: 2.5,
            },
            blossom: Some((
                0.35,
                Canopy {
                    color: Color::hex(0xe8a0b0),
                    radius: 2.2,
                    lift: 2.0,
                },
                Canopy {
                    color: Color::hex(0xd4899c),
                    radius: 3.2,
                    lift: 2.8,
                },
            )),
        },
        lamps: Lamps {
            height: 3.5,
            pole: Color::hex(0x2a2a2a),
            pole_radii: (0.05, 0.07),
            head: LampHead::Lantern(0.5, 0.6),
            glow_radius: 3.0,
            glow_opacity: 0.08,
            main_inset: 20.0,
            main_spacing: 25.0,
            main_offset: 3.5,
            cross_inset: 15.0,
            cross_spacing: 30.0,
            cross_skip: 6.0,
            cross_offset: 3.0,
        },
    }
}

pub(super) fn build(b: &mut Builder<'_>, bounds: &Bounds) {
    let c = bounds.center();
    let shrine = c + Vector2::new(SHRINE_OFFSET.0, SHRINE_OFFSET.1);
    let keep_out = [
        Bounds::new(shrine.x - 10.0, shrine.x + 10.0, shrine.y - 10.0, shrine.y + 10.0),
        Bounds::new(c.x - 7.0, c.x + 7.0, bounds.min_z, bounds.min_z + 25.0),
    ];
    park::build(b, bounds, &layout(), &keep_out);
    torii(b, Vector2::new(c.x, bounds.min_z + GATE_INSET));
    shrine_hall(b, shrine);
}

fn torii(b: &mut Builder<'_>, gate: Vector2<f32>) {
    let red = Material::solid(TORII_RED);
    for side in [-1.0, 1.0] {
        let x = gate.x + side * PILLAR_SPREAD;
        b.mesh(
            Layer::Landmark,
            Primitive::cylinder(0.4, 0.5, PILLAR_HEIGHT, 6),
            red,
            Transform::at(x, PILLAR_HEIGHT / 2.0, gate.y),
        );
        b.solid(body_from_center(x, gate.y, 0.5, 0.5));
    }
    // kasagi, then nuki
    b.mesh(
        Layer::Landmark,
        Primitive::cuboid(12.0, 0.6, 0.8),
        red,
        Transform::at(gate.x, PILLAR_HEIGHT + 0.3, gate.y),
    );
    b.mesh(
        Layer::Landmark,
        Primitive::cuboid(9.0, 0.4, 0.5),
        red,
        Transform::at(gate.x, PILLAR_HEIGHT * 0.7, gate.y),
    );
}

fn shrine_hall(b: &mut Builder<'_>, at: Vector2<f32>) {
    let roof = Material::solid(SHRINE_ROOF);
    let parts = [
        (Primitive::cuboid(12.0, 5.0, 8.0), Material::solid(SHRINE_WALL), 2.5, 0.0),
        (Primitive::cuboid(14.0, 0.5, 10.0), roof, 5.25, 0.0),
        (Primitive::cuboid(10.0, 2.0, 7.0), roof, 6.5, 0.0),
        (Primitive::cuboid(12.0, 0.4, 8.0), roof, 7.7, 0.0),
        (Primitive::cuboid(3.0, 1.5, 2.0), Material::solid(OFFERING_BOX), 0.75, -6.0),
    ];
    for (shape, material, y, dz) in parts {
        b.mesh(Layer::Landmark, shape, material, Transform::at(at.x, y, at.y + dz));
    }
    for side in [-1.0, 1.0] {
        b.mesh(
            Layer::Landmark,
            Primitive::cuboid(0.8, 2.0, 0.8),
            Material::solid(LANTERN),
            Transform::at(at.x + side * 5.0, 1.0, at.y - 5.0),
        );
    }
    b.solid(body_from_center(at.x, at.y, 6.0, 4.0));
    b.solid(body_from_center(at.x, at.y - 6.0, 1.5, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        map::tokyo::{self, YOYOGI_PARK},
        vehicle::VehicleState,
        world::landmarks::test_support,
    };

    #[test]
    fn mixes_blossom_and_green_trees() {
        let config = tokyo::config();
        let (world, _) = test_support::run(&config, 11, build, YOYOGI_PARK);
        assert_eq!(world.stats.trees, 150);
        // Trees plus two torii pillars, the hall and the offering box.
        assert_eq!(world.stats.static_bodies, 154);

        let canopies = |names: [&str; 2]| -> usize {
            names
                .iter()
                .filter_map(|n| world.batch(n))
                .map(|batch| batch.instances.len())
                .sum()
        };
        let blossom = canopies(["park_blossom", "park_blossom_large"]);
        let green = canopies(["park_canopy", "park_canopy_large"]);
        assert_eq!(blossom + green, 150);
        assert!(blossom > 20 && green > blossom);
    }

    #[test]
    fn torii_pillars_are_solid() {
        let config = tokyo::config();
        let (_, mut collision) = test_support::run(&config, 11, build, YOYOGI_PARK);
        let c = YOYOGI_PARK.center();
        let mut car = VehicleState::new(c.x + PILLAR_SPREAD, YOYOGI_PARK.min_z + GATE_INSET, 0.0);
        assert!(collision.resolve(&mut car));
        // Between the pillars is open.
        let mut car = VehicleState::new(c.x, YOYOGI_PARK.min_z + GATE_INSET, 0.0);
        assert!(!collision.resolve(&mut car));
    }
}
