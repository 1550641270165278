/*!
Procedural city generation.

[`WorldGenerator::build`] turns a [`MapConfig`] into a renderer-independent
[`GeneratedWorld`] and registers every solid thing on the [`CollisionWorld`]. All
randomness comes from the caller's seeded RNG, so the same config and seed always
produce the same city.

Build order:

- sky:       star field, moon, fog
- roads:     surfaces, centre lines, lane dashes, sidewalks (bridges excluded)
- bridges:   decks, barriers, towers, cables or trusses
- props:     ground around water, street lamps, traffic cones
- water:     river surface, highlights, bank walls with gaps under bridges
- landmarks: parks and squares
- buildings: districts, sub-blocks, facades, neon signs
*/

mod bridges;
mod buildings;
mod landmarks;
mod props;
mod roads;
pub mod scene;
mod sky;
mod water;

use rand::Rng;
use rand_pcg::Pcg32;

use crate::{
    collision::{CollisionWorld, StaticBody},
    elevation::ElevationField,
    map::MapConfig,
    palette,
};

pub use buildings::{Footprint, split_block, subdivide};
pub use scene::{
    Atmosphere, Building, InstanceBatch, Layer, Material, Primitive, SceneMesh, StarField,
    Transform, WindowTexture,
};
pub use water::wall_spans_with_gaps;

/// Tallies gathered while building, logged once and shown by debug overlays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub buildings: usize,
    pub signs: usize,
    pub static_bodies: usize,
    pub lamps: usize,
    pub cones: usize,
    pub trees: usize,
    pub meshes: usize,
    pub instances: usize,
}

/// Everything a renderer needs to draw one map.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedWorld {
    pub map_id: &'static str,
    pub meshes: Vec<SceneMesh>,
    pub batches: Vec<InstanceBatch>,
    pub buildings: Vec<Building>,
    pub textures: Vec<WindowTexture>,
    pub stars: StarField,
    pub atmosphere: Atmosphere,
    pub stats: WorldStats,
}

impl GeneratedWorld {
    fn empty(map_id: &'static str) -> Self {
        Self {
            map_id,
            meshes: Vec::new(),
            batches: Vec::new(),
            buildings: Vec::new(),
            textures: Vec::new(),
            stars: StarField::default(),
            atmosphere: Atmosphere {
                background: palette::SKY,
                fog_color: palette::FOG,
                fog_density: crate::constants::FOG_DENSITY,
            },
            stats: WorldStats::default(),
        }
    }

    /// Release every descriptor. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.meshes = Vec::new();
        self.batches = Vec::new();
        self.buildings = Vec::new();
        self.textures = Vec::new();
        self.stars = StarField::default();
        self.stats = WorldStats::default();
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
            && self.batches.is_empty()
            && self.buildings.is_empty()
            && self.textures.is_empty()
    }

    pub fn meshes_in(&self, layer: Layer) -> impl Iterator<Item = &SceneMesh> + '_ {
        self.meshes.iter().filter(move |m| m.layer == layer)
    }

    pub fn batch(&self, name: &str) -> Option<&InstanceBatch> {
        self.batches.iter().find(|b| b.name == name)
    }
}

/// Shared state threaded through every build pass.
pub(crate) struct Builder<'a> {
    pub config: &'a MapConfig,
    pub elevation: &'a ElevationField,
    collision: &'a mut CollisionWorld,
    rng: &'a mut Pcg32,
    pub out: GeneratedWorld,
}

impl<'a> Builder<'a> {
    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform in `[lo, hi)`.
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.random() * (hi - lo)
    }

    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.random() < p
    }

    /// Uniform index below `len`; `None` when `len` is zero.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }

    pub fn mesh(
        &mut self,
        layer: Layer,
        primitive: Primitive,
        material: Material,
        transform: Transform,
    ) {
        self.out.meshes.push(SceneMesh {
            layer,
            primitive,
            material,
            transform,
        });
    }

    /// Keep a batch only if something was placed in it.
    pub fn batch(&mut self, batch: InstanceBatch) {
        if !batch.instances.is_empty() {
            self.out.batches.push(batch);
        }
    }

    pub fn solid(&mut self, body: StaticBody) {
        if self.collision.add_static_body(body).is_some() {
            self.out.stats.static_bodies += 1;
        }
    }

    pub fn texture(&mut self, texture: WindowTexture) -> usize {
        self.out.textures.push(texture);
        self.out.textures.len() - 1
    }
}

/// Builds a [`GeneratedWorld`] from a map config.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorldGenerator;

impl WorldGenerator {
    /// Generate the whole city. Collision bodies go into `collision`; call
    /// [`CollisionWorld::clear`] first when replacing a map.
    pub fn build(
        config: &MapConfig,
        elevation: &ElevationField,
        collision: &mut CollisionWorld,
        rng: &mut Pcg32,
    ) -> GeneratedWorld {
        let mut b = Builder {
            config,
            elevation,
            collision,
            rng,
            out: GeneratedWorld::empty(config.id),
        };

        sky::build(&mut b);
        roads::build(&mut b);
        bridges::build(&mut b);
        props::build_ground(&mut b);
        water::build(&mut b);
        landmarks::build(&mut b);
        buildings::build(&mut b);
        props::build_lamps(&mut b);
        props::build_cones(&mut b);

        let mut world = b.out;
        world.stats.meshes = world.meshes.len();
        world.stats.instances = world.batches.iter().map(|b| b.instances.len()).sum();
        let s = world.stats;
        tracing::info!(
            map = config.id,
            buildings = s.buildings,
            signs = s.signs,
            bodies = s.static_bodies,
            lamps = s.lamps,
            trees = s.trees,
            meshes = s.meshes,
            instances = s.instances,
            "world generated"
        );
        world
    }
}
