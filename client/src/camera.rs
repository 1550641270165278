use bevy::{
    camera::Exposure, core_pipeline::tonemapping::Tonemapping, prelude::*, render::view::Hdr,
};
use racer_shared::{ChaseCameraSettings, PostFxSettings, palette};

use crate::{
    convert, postfx,
    session::{Session, SessionSystems},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(PostUpdate, follow_chase_camera.in_set(SessionSystems));
}

fn add_camera(mut commands: Commands) {
    let settings = ChaseCameraSettings::default();
    commands.spawn((
        Camera3d::default(),
        Hdr,
        Exposure::BLENDER,
        Tonemapping::AcesFitted,
        postfx::bloom(&PostFxSettings::default().bloom),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.fov_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
            ..default()
        }),
        // Replaced with the map's atmosphere when the world spawns.
        DistanceFog {
            color: convert::color(palette::FOG),
            falloff: FogFalloff::ExponentialSquared {
                density: racer_shared::constants::FOG_DENSITY,
            },
            ..default()
        },
        Transform::default(),
    ));
}

/// Copy the session's chase camera onto the scene camera.
fn follow_chase_camera(session: Res<Session>, mut camera: Single<&mut Transform, With<Camera3d>>) {
    let chase = session.camera();
    **camera = Transform::from_translation(convert::vec3(chase.position()))
        .looking_at(convert::vec3(chase.look_at()), Vec3::Y);
}
