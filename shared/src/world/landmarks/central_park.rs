use nalgebra::Vector2;

use super::{
    Builder,
    park::{self, Canopy, LampHead, Lamps, ParkLayout, Pond, Trail, Trees},
};
use crate::{map::Bounds, palette::Color};

fn layout() -> ParkLayout {
    ParkLayout {
        gravel: Color::hex(0x3a3a2a),
        main_path_width: 6.0,
        cross_inset: 100.0,
        cross_width: 5.0,
        trail: Trail {
            steps: 20,
            inset_x: 30.0,
            inset_z: 50.0,
            waves: 3.0,
            amplitude: 30.0,
            width: 4.0,
        },
        pond: Pond {
            offset: Vector2::new(-40.0, 60.0),
            width: 30.0,
            depth: 18.0,
            glows: 8,
            glow_size: (2.0, 6.0),
            glow_aspect: 0.6,
            glow_spread: (24.0, 14.0),
        },
        trees: Trees {
            count: 120,
            attempts: 500,
            margin: 10.0,
            main_path_clear: 5.0,
            cross_path_clear: 4.0,
            pond_clear: (20.0, 14.0),
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
            blossom: None,
        },
        lamps: Lamps {
            height: 5.0,
            pole: Color::hex(0x333344),
            pole_radii: (0.06, 0.08),
            head: LampHead::Globe(0.2),
            glow_radius: 4.0,
            glow_opacity: 0.1,
            main_inset: 20.0,
            main_spacing: 30.0,
            main_offset: 4.0,
            cross_inset: 20.0,
            cross_spacing: 35.0,
            cross_skip: 8.0,
            cross_offset: 3.5,
        },
    }
}

/// Lawn, pond and tree-lined paths; no extra set pieces.
pub(super) fn build(b: &mut Builder<'_>, bounds: &Bounds) {
    park::build(b, bounds, &layout(), &[]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        map::nyc::{self, CENTRAL_PARK},
        vehicle::VehicleState,
        world::landmarks::test_support,
    };

    #[test]
    fn plants_every_tree_clear_of_the_paths() {
        let config = nyc::config();
        let (world, mut collision) = test_support::run(&config, 3, build, CENTRAL_PARK);
        assert_eq!(world.stats.trees, 120);
        assert_eq!(world.stats.static_bodies, 120);

        let layout = layout();
        let c = CENTRAL_PARK.center();
        let cross = layout.cross_path_z(&CENTRAL_PARK);
        let trunks = ["park_trunk", "park_trunk_tall"]
            .iter()
            .filter_map(|name| world.batch(name))
            .flat_map(|batch| batch.instances.iter());
        let mut count = 0;
        for t in trunks {
            let p = t.translation;
            assert!((p.x - c.x).abs() >= 5.0);
            assert!(cross.iter().all(|z| (p.z - z).abs() >= 4.0));
            assert!(CENTRAL_PARK.contains(p.x, p.z));
            count += 1;
        }
        assert_eq!(count, 120);

        // A car parked on a trunk gets pushed off it.
        let tree = world.batch("park_trunk").or(world.batch("park_trunk_tall"));
        let p = tree.map(|batch| batch.instances[0].translation);
        let p = p.expect("at least one trunk batch");
        let mut car = VehicleState::new(p.x + 0.2, p.z, 0.0);
        assert!(collision.resolve(&mut car));
    }

    #[test]
    fn lamps_line_the_main_path_in_pairs() {
        let config = nyc::config();
        let (world, _) = test_support::run(&config, 3, build, CENTRAL_PARK);
        let poles = world.batch("park_lamp_pole").expect("lamp poles");
        let c = CENTRAL_PARK.center();
        let on_main: Vec<_> = poles
            .instances
            .iter()
            .filter(|t| (t.translation.x - c.x).abs() < 4.5)
            .collect();
        // 200 + 20 up to 700 - 20, every 30: 16 stops, two sides each.
        assert_eq!(on_main.len(), 32);
        assert_eq!(world.stats.lamps, poles.instances.len());
    }
}
