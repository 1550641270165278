//! The player's car: a box placeholder that is swapped for the selected glTF model
//! once it loads. A model that fails to load leaves the placeholder in place.
//! Headlights, beam and underglow are refitted to whichever body is showing.

use bevy::{
    asset::LoadState,
    gltf::{Gltf, GltfMesh},
    prelude::*,
};
use racer_shared::{
    CarModel,
    car_rig::{CarBounds, light_parts, placeholder_parts},
    vehicle::fit_model_scale,
    world::SceneMesh,
};

use crate::{
    convert, mesh,
    session::{Session, SessionSystems},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_car);
    app.add_systems(
        Update,
        (request_model, finish_model_load)
            .chain()
            .in_set(SessionSystems),
    );
    app.add_systems(PostUpdate, follow_vehicle.in_set(SessionSystems));
}

#[derive(Component)]
pub struct PlayerCar;

#[derive(Component)]
struct Placeholder;

/// Parent of the glow parts, child of [`PlayerCar`].
#[derive(Component)]
struct CarLights;

/// Root of the spawned glTF scene, child of [`PlayerCar`].
#[derive(Component)]
struct ModelScene;

/// The model currently requested for the car.
#[derive(Component)]
struct ModelLoad {
    key: &'static str,
    handle: Handle<Gltf>,
    phase: LoadPhase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadPhase {
    Pending,
    Shown,
    Failed,
}

fn spawn_car(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let car = commands
        .spawn((PlayerCar, Transform::default(), Visibility::default()))
        .id();
    let placeholder = commands
        .spawn((Placeholder, Transform::default(), Visibility::default(), ChildOf(car)))
        .id();
    spawn_parts(
        &mut commands,
        placeholder,
        &placeholder_parts(),
        &mut meshes,
        &mut materials,
    );
    spawn_lights(
        &mut commands,
        car,
        CarBounds::footprint(),
        &mut meshes,
        &mut materials,
    );
}

fn spawn_parts(
    commands: &mut Commands,
    parent: Entity,
    parts: &[SceneMesh],
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    for part in parts {
        commands.spawn((
            Mesh3d(meshes.add(mesh::build(&part.primitive))),
            MeshMaterial3d(materials.add(convert::standard_material(&part.material, None))),
            convert::transform(&part.transform),
            ChildOf(parent),
        ));
    }
}

fn spawn_lights(
    commands: &mut Commands,
    car: Entity,
    bounds: CarBounds,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let lights = commands
        .spawn((CarLights, Transform::default(), Visibility::default(), ChildOf(car)))
        .id();
    spawn_parts(commands, lights, &light_parts(bounds), meshes, materials);
}

/// Start loading the session's car model whenever it changes.
fn request_model(
    mut commands: Commands,
    session: Res<Session>,
    asset_server: Res<AssetServer>,
    car: Single<(Entity, Option<&ModelLoad>), With<PlayerCar>>,
    scenes: Query<Entity, With<ModelScene>>,
    lights: Query<Entity, With<CarLights>>,
    mut placeholder: Single<&mut Visibility, With<Placeholder>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let model: &'static CarModel = session.car_model();
    let (car, load) = *car;
    if load.is_some_and(|l| l.key == model.key) {
        return;
    }

    for scene in &scenes {
        commands.entity(scene).despawn();
    }
    // Only a shown model moved the lights off the placeholder.
    if load.is_some_and(|l| l.phase == LoadPhase::Shown) {
        for entity in &lights {
            commands.entity(entity).despawn();
        }
        spawn_lights(
            &mut commands,
            car,
            CarBounds::footprint(),
            &mut meshes,
            &mut materials,
        );
    }
    **placeholder = Visibility::Inherited;
    debug!(car = model.key, asset = model.asset, "loading car model");
    commands.entity(car).insert(ModelLoad {
        key: model.key,
        handle: asset_server.load(model.asset),
        phase: LoadPhase::Pending,
    });
}

fn finish_model_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    gltf_meshes: Res<Assets<GltfMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut car: Single<(Entity, &mut ModelLoad), With<PlayerCar>>,
    mut placeholder: Single<&mut Visibility, With<Placeholder>>,
    lights: Query<Entity, With<CarLights>>,
) {
    let (car, load) = &mut *car;
    if load.phase != LoadPhase::Pending {
        return;
    }

    match asset_server.load_state(&load.handle) {
        LoadState::Failed(err) => {
            warn!(car = load.key, "car model failed to load, keeping placeholder: {err}");
            load.phase = LoadPhase::Failed;
        }
        LoadState::Loaded => {
            let Some(gltf) = gltfs.get(&load.handle) else {
                return;
            };
            let Some(scene) = gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned())
            else {
                warn!(car = load.key, "car model has no scene, keeping placeholder");
                load.phase = LoadPhase::Failed;
                return;
            };
            let Some((bounds, fit)) = model_bounds(gltf, &gltf_meshes, &meshes)
                .and_then(|b| Some((b, fit_transform(b)?)))
            else {
                warn!(car = load.key, "car model has no usable bounds, keeping placeholder");
                load.phase = LoadPhase::Failed;
                return;
            };

            commands.entity(*car).with_child((ModelScene, SceneRoot(scene), fit));
            **placeholder = Visibility::Hidden;
            for entity in &lights {
                commands.entity(entity).despawn();
            }
            spawn_lights(
                &mut commands,
                *car,
                fitted_bounds(bounds, fit.scale.x),
                &mut meshes,
                &mut materials,
            );
            load.phase = LoadPhase::Shown;
            info!(car = load.key, scale = fit.scale.x, "car model loaded");
        }
        _ => {}
    }
}

/// Union of the model's mesh bounds in its own space, as `(min, max)`.
fn model_bounds(
    gltf: &Gltf,
    gltf_meshes: &Assets<GltfMesh>,
    meshes: &Assets<Mesh>,
) -> Option<(Vec3, Vec3)> {
    gltf.meshes
        .iter()
        .filter_map(|handle| gltf_meshes.get(handle))
        .flat_map(|mesh| &mesh.primitives)
        .filter_map(|primitive| meshes.get(&primitive.mesh))
        .filter_map(|mesh| mesh.attribute(Mesh::ATTRIBUTE_POSITION)?.as_float3())
        .flatten()
        .map(|p| Vec3::from_array(*p))
        .fold(None, |bounds, p| match bounds {
            None => Some((p, p)),
            Some((min, max)) => Some((p.min(min), p.max(max))),
        })
}

/// Scale the model into the car's footprint, centred on the origin with its wheels on
/// the ground.
fn fit_transform((min, max): (Vec3, Vec3)) -> Option<Transform> {
    let size = max - min;
    let scale = fit_model_scale(size.x, size.z)?;
    let centre = (min + max) / 2.0;
    Some(
        Transform::from_xyz(-centre.x * scale, -min.y * scale, -centre.z * scale)
            .with_scale(Vec3::splat(scale)),
    )
}

/// Body size once the model is scaled by `scale`.
fn fitted_bounds((min, max): (Vec3, Vec3), scale: f32) -> CarBounds {
    let size = (max - min) * scale;
    CarBounds::from_size(size.x, size.y, size.z)
}

fn follow_vehicle(session: Res<Session>, mut car: Single<&mut Transform, With<PlayerCar>>) {
    let vehicle = session.vehicle();
    car.translation = convert::vec3(vehicle.position);
    car.rotation = convert::vehicle_rotation(vehicle.heading, vehicle.slope_angle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitted_model_fills_the_footprint() {
        // A model twice as big as the car, sitting below its origin.
        let min = Vec3::new(-2.0, -1.0, -4.5);
        let max = Vec3::new(2.0, 1.8, 4.5);
        let Some(t) = fit_transform((min, max)) else {
            panic!("bounds are usable");
        };
        assert!((t.scale.x - 0.5).abs() < 1.0e-6);
        assert!((t.translation.y - 0.5).abs() < 1.0e-6);
        assert_eq!(t.translation.x, 0.0);
    }

    #[test]
    fn lights_are_sized_from_the_fitted_model() {
        let bounds = (Vec3::new(-2.0, -1.0, -4.5), Vec3::new(2.0, 1.8, 4.5));
        let lights = fitted_bounds(bounds, 0.5);
        assert!((lights.half_width - 1.0).abs() < 1.0e-6);
        assert!((lights.half_length - 2.25).abs() < 1.0e-6);
        assert!((lights.height - 1.4).abs() < 1.0e-6);
    }

    #[test]
    fn flat_models_are_refused() {
        assert!(fit_transform((Vec3::ZERO, Vec3::new(0.0, 1.0, 4.0))).is_none());
    }
}
