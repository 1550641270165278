//! Owns the [`GameSession`] and steps it once per rendered frame.

use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use racer_shared::{
    CAR_MODELS, FrameReport, GameSession, constants::DEFAULT_WORLD_SEED, get_map_config,
    map::nyc, next_map_id,
};

use crate::input::{DriveAction, drive_intent};

/// Systems that need a live session. Skipped if the start map was refused.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionSystems;

#[derive(Resource, Deref, DerefMut)]
pub struct Session(pub GameSession);

/// Result of the latest [`GameSession::advance`], read by the HUD.
#[derive(Resource, Default, Deref)]
pub struct LastFrame(pub Option<FrameReport>);

pub(super) fn plugin(app: &mut App) {
    match GameSession::new(get_map_config(nyc::MAP_ID), DEFAULT_WORLD_SEED) {
        Ok(session) => {
            info!(map = session.config().id, seed = session.seed(), "session started");
            app.insert_resource(Session(session));
        }
        Err(err) => {
            error!("cannot start session: {err}");
            app.add_systems(Startup, |mut exit: MessageWriter<AppExit>| {
                exit.write(AppExit::error());
            });
        }
    }
    app.init_resource::<LastFrame>();

    app.configure_sets(Update, SessionSystems.run_if(resource_exists::<Session>));
    app.configure_sets(PostUpdate, SessionSystems.run_if(resource_exists::<Session>));

    app.add_systems(
        Update,
        (handle_session_keys, advance).chain().in_set(SessionSystems),
    );
}

fn advance(
    mut session: ResMut<Session>,
    mut last: ResMut<LastFrame>,
    actions: Res<ActionState<DriveAction>>,
    time: Res<Time>,
) {
    let report = session.advance(time.delta_secs(), drive_intent(&actions));
    last.0 = Some(report);
}

fn handle_session_keys(mut session: ResMut<Session>, actions: Res<ActionState<DriveAction>>) {
    if actions.just_pressed(&DriveAction::Pause) {
        session.toggle_pause();
    }
    // Swaps and respawns wait until the game is running again.
    if session.is_paused() {
        return;
    }

    if actions.just_pressed(&DriveAction::Respawn) {
        session.respawn();
    }
    if actions.just_pressed(&DriveAction::NextMap) {
        let next = get_map_config(next_map_id(session.config().id));
        match session.swap_map(next) {
            Ok(()) => info!(map = session.config().id, "map loaded"),
            Err(err) => warn!("map swap refused: {err}"),
        }
    }
    if actions.just_pressed(&DriveAction::NextCar) {
        let key = next_car_key(session.car_model().key);
        let model = session.swap_car_model(key);
        info!(car = model.name, "car selected");
    }
}

/// Key of the car after `current` in [`CAR_MODELS`], wrapping around.
fn next_car_key(current: &str) -> &'static str {
    let index = CAR_MODELS
        .iter()
        .position(|m| m.key == current)
        .map_or(0, |i| (i + 1) % CAR_MODELS.len());
    CAR_MODELS[index].key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_cycle_wraps() {
        let first = CAR_MODELS[0].key;
        let last = CAR_MODELS[CAR_MODELS.len() - 1].key;
        assert_eq!(next_car_key(last), first);
        assert_eq!(next_car_key("no-such-car"), first);
    }
}
