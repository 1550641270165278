use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use racer_shared::{DriveFlag, DriveIntent};

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriveAction {
    Forward,
    Backward,
    Left,
    Right,
    Brake,
    Pause,
    Respawn,
    NextMap,
    NextCar,
}

impl DriveAction {
    /// Held actions that feed the simulation, paired with the flag each one sets.
    const DRIVE: [(DriveAction, DriveFlag); 5] = [
        (DriveAction::Forward, DriveFlag::Forward),
        (DriveAction::Backward, DriveFlag::Backward),
        (DriveAction::Left, DriveFlag::Left),
        (DriveAction::Right, DriveFlag::Right),
        (DriveAction::Brake, DriveFlag::Brake),
    ];
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<DriveAction>::default());

    app.register_type::<DriveAction>();

    app.insert_resource(default_input_map());
    app.insert_resource(ActionState::<DriveAction>::default());
}

fn default_input_map() -> InputMap<DriveAction> {
    let mut input_map = InputMap::<DriveAction>::default();
    input_map.insert(DriveAction::Forward, KeyCode::KeyW);
    input_map.insert(DriveAction::Forward, KeyCode::ArrowUp);
    input_map.insert(DriveAction::Backward, KeyCode::KeyS);
    input_map.insert(DriveAction::Backward, KeyCode::ArrowDown);
    input_map.insert(DriveAction::Left, KeyCode::KeyA);
    input_map.insert(DriveAction::Left, KeyCode::ArrowLeft);
    input_map.insert(DriveAction::Right, KeyCode::KeyD);
    input_map.insert(DriveAction::Right, KeyCode::ArrowRight);
    input_map.insert(DriveAction::Brake, KeyCode::Space);
    input_map.insert(DriveAction::Pause, KeyCode::Escape);
    input_map.insert(DriveAction::Respawn, KeyCode::KeyR);
    input_map.insert(DriveAction::NextMap, KeyCode::KeyM);
    input_map.insert(DriveAction::NextCar, KeyCode::KeyC);
    input_map
}

/// Snapshot of the held driving keys.
pub(crate) fn drive_intent(actions: &ActionState<DriveAction>) -> DriveIntent {
    let mut intent = DriveIntent::NONE;
    for (action, flag) in DriveAction::DRIVE {
        intent.set(flag, actions.pressed(&action));
    }
    intent
}
