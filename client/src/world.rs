//! Turns the session's [`GeneratedWorld`] into entities, and rebuilds them whenever
//! the session swaps maps.

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;
use racer_shared::{
    palette,
    world::{Building, GeneratedWorld, Material as SceneMaterial, Primitive},
};

use crate::{
    convert, mesh,
    session::{Session, SessionSystems},
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<SpawnedGeneration>();
    app.insert_resource(ClearColor(Color::BLACK));
    app.add_systems(Update, sync_world.in_set(SessionSystems));
}

/// Tags everything spawned from the generated world so a swap can clear it.
#[derive(Component)]
pub struct WorldEntity;

/// Facade textures carry their own colors; the base color only multiplies them.
const FACADE_TINT: palette::Color = palette::Color::hex(0xffffff);

/// Session generation currently on screen.
#[derive(Resource, Default)]
struct SpawnedGeneration(Option<u64>);

fn sync_world(
    mut commands: Commands,
    session: Res<Session>,
    mut spawned: ResMut<SpawnedGeneration>,
    existing: Query<Entity, With<WorldEntity>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut clear_color: ResMut<ClearColor>,
    mut fog: Query<&mut DistanceFog>,
) {
    let generation = session.generation();
    if spawned.0 == Some(generation) {
        return;
    }
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let world = session.world();
    let mut assets = WorldAssets {
        meshes: &mut meshes,
        materials: &mut materials,
        textures: world
            .textures
            .iter()
            .map(|t| images.add(convert::window_image(t)))
            .collect(),
    };
    let count = spawn_world(&mut commands, &mut assets, world);

    clear_color.0 = convert::color(world.atmosphere.background);
    for mut fog in &mut fog {
        fog.color = convert::color(world.atmosphere.fog_color);
        fog.falloff = FogFalloff::ExponentialSquared {
            density: world.atmosphere.fog_density,
        };
    }

    info!(map = world.map_id, generation, entities = count, "world spawned");
    spawned.0 = Some(generation);
}

struct WorldAssets<'a> {
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
    /// Uploaded facade textures, indexed like `GeneratedWorld::textures`.
    textures: Vec<Handle<Image>>,
}

impl WorldAssets<'_> {
    fn material(&mut self, material: &SceneMaterial) -> Handle<StandardMaterial> {
        let texture = material.texture.and_then(|i| self.textures.get(i).cloned());
        self.materials.add(convert::standard_material(material, texture))
    }
}

/// Spawn every mesh, instance, building and star. Returns the number of entities.
fn spawn_world(
    commands: &mut Commands,
    assets: &mut WorldAssets<'_>,
    world: &GeneratedWorld,
) -> usize {
    let mut count = 0;

    for scene_mesh in &world.meshes {
        commands.spawn((
            WorldEntity,
            Mesh3d(assets.meshes.add(mesh::build(&scene_mesh.primitive))),
            MeshMaterial3d(assets.material(&scene_mesh.material)),
            convert::transform(&scene_mesh.transform),
        ));
        count += 1;
    }

    for batch in &world.batches {
        let shape = assets.meshes.add(mesh::build(&batch.primitive));
        let material = assets.material(&batch.material);
        for instance in &batch.instances {
            commands.spawn((
                WorldEntity,
                Mesh3d(shape.clone()),
                MeshMaterial3d(material.clone()),
                convert::transform(instance),
            ));
        }
        count += batch.instances.len();
    }

    for building in &world.buildings {
        count += spawn_building(commands, assets, building);
    }

    let star = assets.meshes.add(mesh::build(&Primitive::Sphere { radius: 1.0 }));
    let star_material = assets.material(&SceneMaterial::solid(world.stars.color).without_fog());
    for (position, size) in world.stars.positions.iter().zip(&world.stars.sizes) {
        commands.spawn((
            WorldEntity,
            Mesh3d(star.clone()),
            MeshMaterial3d(star_material.clone()),
            Transform::from_translation(convert::vec3(*position)).with_scale(Vec3::splat(*size)),
        ));
    }
    count + world.stars.positions.len()
}

/// Four textured walls and a roof. Walls sit on the ground with their textures
/// stretched over the whole face.
fn spawn_building(
    commands: &mut Commands,
    assets: &mut WorldAssets<'_>,
    building: &Building,
) -> usize {
    let (w, d, h) = (building.width, building.depth, building.height);
    let (cx, cz) = (building.center.x, building.center.y);
    let textured = |index: usize| SceneMaterial::solid(FACADE_TINT).with_texture(index);

    let front = assets.meshes.add(Rectangle::new(w, h));
    let side = assets.meshes.add(Rectangle::new(d, h));
    let front_material = assets.material(&textured(building.front_texture));
    let side_material = assets.material(&textured(building.side_texture));
    let roof_material = assets.material(&SceneMaterial::solid(building.roof));

    // Rectangles face +Z; yaw turns each toward its side.
    let walls = [
        (&front, &front_material, Vec3::new(cx, h / 2.0, cz + d / 2.0), 0.0),
        (&front, &front_material, Vec3::new(cx, h / 2.0, cz - d / 2.0), PI),
        (&side, &side_material, Vec3::new(cx + w / 2.0, h / 2.0, cz), FRAC_PI_2),
        (&side, &side_material, Vec3::new(cx - w / 2.0, h / 2.0, cz), -FRAC_PI_2),
    ];
    for (shape, material, at, yaw) in walls {
        commands.spawn((
            WorldEntity,
            Mesh3d(shape.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(at).with_rotation(Quat::from_rotation_y(yaw)),
        ));
    }

    commands.spawn((
        WorldEntity,
        Mesh3d(assets.meshes.add(Plane3d::default().mesh().size(w, d))),
        MeshMaterial3d(roof_material),
        Transform::from_xyz(cx, h, cz),
    ));
    walls.len() + 1
}
