//! Debug/performance tooling for native dev builds.
//!
//! This plugin is compiled/used only when the caller gates it behind `dev_native`
//! (`#[cfg(feature = "dev_native")] mod debug_tools;` in `main.rs`).
//!
//! F3 toggles collision outlines for the static bodies around the car.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::input::common_conditions::input_just_pressed;
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;
use racer_shared::{collision::Aabb2, palette};

use crate::{
    convert,
    session::{Session, SessionSystems},
};

/// Bodies further than this from the car are not outlined.
const OUTLINE_RADIUS: f32 = 80.0;
const OUTLINE_LIFT: f32 = 0.1;

/// Add debug/perf tooling (intended for `dev_native` builds only).
pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.init_resource::<ShowCollision>();
    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(
        Update,
        (
            toggle_collision.run_if(input_just_pressed(KeyCode::F3)),
            draw_collision
                .run_if(|show: Res<ShowCollision>| show.0)
                .in_set(SessionSystems),
        ),
    );
}

#[derive(Resource, Default)]
struct ShowCollision(bool);

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn toggle_collision(mut show: ResMut<ShowCollision>) {
    show.0 = !show.0;
    debug!(visible = show.0, "collision outlines");
}

fn draw_collision(session: Res<Session>, mut gizmos: Gizmos) {
    let car = session.vehicle();
    let collision = session.collision();
    let reach = Aabb2::from_center(
        car.position.x,
        car.position.z,
        OUTLINE_RADIUS,
        OUTLINE_RADIUS,
    );

    let body_color = convert::color(palette::NEON_GREEN);
    for body in collision.bodies().iter().filter(|b| b.bounds.overlaps(&reach)) {
        let y = body.min_y.max(0.0) + OUTLINE_LIFT;
        outline(&mut gizmos, body.bounds.corners().map(|c| (c.x, c.y)), y, body_color);
    }

    let car_y = car.position.y + OUTLINE_LIFT;
    let shape = collision.car_shape(car);
    let car_color = convert::color(palette::NEON_ORANGE);
    outline(&mut gizmos, shape.corners().map(|c| (c.x, c.y)), car_y, car_color);
}

/// Closed loop through `corners` (x, z) at height `y`.
fn outline(gizmos: &mut Gizmos, corners: [(f32, f32); 4], y: f32, color: Color) {
    let points = corners.map(|(x, z)| Vec3::new(x, y, z));
    gizmos.linestrip(points.into_iter().chain([points[0]]), color);
}
