//! Engine, wind and tire loops driven by the car, crash one-shots and per-map music.
//!
//! Loops start silent and are shaped every frame from the car's speed. Sounds that
//! fail to load never get an [`AudioSink`], so their systems simply skip them.

use bevy::{
    audio::{AudioSinkPlayback, Volume},
    prelude::*,
};
use leafwing_input_manager::prelude::ActionState;
use racer_shared::utils::smoothstep;

use crate::{
    input::DriveAction,
    session::{LastFrame, Session, SessionSystems},
};

const ENGINE_SOUND: &str = "sounds/engine-loop.mp3";
const WIND_SOUND: &str = "sounds/wind-loop.mp3";
const SCREECH_SOUND: &str = "sounds/tire-screech.mp3";
const CRASH_SOUND: &str = "sounds/collision.mp3";
const MUSIC_DIR: &str = "sounds/music";

const ENGINE_VOLUME: f32 = 0.5;
const ENGINE_MIN_PITCH: f32 = 0.6;
const ENGINE_MAX_PITCH: f32 = 2.0;
const WIND_MAX_VOLUME: f32 = 0.35;
/// Speed ratio below which there is no wind.
const WIND_THRESHOLD: f32 = 0.15;
const SCREECH_VOLUME: f32 = 0.4;
/// Braking below this speed (units/s) is silent.
const SCREECH_MIN_SPEED: f32 = 8.0;
const CRASH_VOLUME: f32 = 0.6;
const CRASH_MIN_SPEED: f32 = 1.4;
const CRASH_COOLDOWN: f32 = 1.0;
const MUSIC_VOLUME: f32 = 0.35;
const MUSIC_PAUSED_VOLUME: f32 = 0.1;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CrashCooldown>();
    app.add_systems(Startup, spawn_loops);
    app.add_systems(
        Update,
        (sync_music, (shape_loops, play_crash, duck_music))
            .chain()
            .in_set(SessionSystems),
    );
}

#[derive(Component)]
struct EngineSound;

#[derive(Component)]
struct WindSound;

#[derive(Component)]
struct ScreechSound;

/// Background track for the map built at `generation`.
#[derive(Component)]
struct MusicTrack {
    generation: u64,
}

/// Earliest time (seconds since startup) the next crash may play.
#[derive(Resource, Default)]
struct CrashCooldown {
    ready_at: f32,
}

impl CrashCooldown {
    /// Whether a crash at `speed` should sound at time `now`; arms the cooldown if so.
    fn try_fire(&mut self, now: f32, speed: f32) -> bool {
        if speed.abs() <= CRASH_MIN_SPEED || now < self.ready_at {
            return false;
        }
        self.ready_at = now + CRASH_COOLDOWN;
        true
    }
}

fn spawn_loops(mut commands: Commands, assets: Res<AssetServer>) {
    let silent = PlaybackSettings::LOOP.with_volume(Volume::Linear(0.0));
    commands.spawn((
        Name::new("Engine sound"),
        EngineSound,
        AudioPlayer::new(assets.load(ENGINE_SOUND)),
        silent,
    ));
    commands.spawn((
        Name::new("Wind sound"),
        WindSound,
        AudioPlayer::new(assets.load(WIND_SOUND)),
        silent,
    ));
    commands.spawn((
        Name::new("Tire screech"),
        ScreechSound,
        AudioPlayer::new(assets.load(SCREECH_SOUND)),
        silent,
    ));
}

/// Share of top speed, either direction.
fn speed_ratio(speed: f32, max_speed: f32) -> f32 {
    if max_speed <= 0.0 {
        return 0.0;
    }
    (speed.abs() / max_speed).clamp(0.0, 1.0)
}

fn engine_pitch(ratio: f32) -> f32 {
    ENGINE_MIN_PITCH + (ENGINE_MAX_PITCH - ENGINE_MIN_PITCH) * ratio
}

fn engine_volume(ratio: f32) -> f32 {
    ENGINE_VOLUME * (0.7 + 0.3 * ratio)
}

/// Quadratic fade in above [`WIND_THRESHOLD`].
fn wind_volume(ratio: f32) -> f32 {
    if ratio <= WIND_THRESHOLD {
        return 0.0;
    }
    let t = (ratio - WIND_THRESHOLD) / (1.0 - WIND_THRESHOLD);
    WIND_MAX_VOLUME * t * t
}

fn screech_volume(braking: bool, speed: f32) -> f32 {
    if braking && speed.abs() > SCREECH_MIN_SPEED {
        // Fades in over the first few units past the threshold.
        SCREECH_VOLUME * smoothstep(((speed.abs() - SCREECH_MIN_SPEED) / 4.0).min(1.0))
    } else {
        0.0
    }
}

fn music_volume(paused: bool) -> f32 {
    if paused {
        MUSIC_PAUSED_VOLUME
    } else {
        MUSIC_VOLUME
    }
}

fn shape_loops(
    session: Res<Session>,
    actions: Res<ActionState<DriveAction>>,
    mut engine: Query<&mut AudioSink, (With<EngineSound>, Without<WindSound>, Without<ScreechSound>)>,
    mut wind: Query<&mut AudioSink, (With<WindSound>, Without<EngineSound>, Without<ScreechSound>)>,
    mut screech: Query<&mut AudioSink, (With<ScreechSound>, Without<EngineSound>, Without<WindSound>)>,
) {
    let paused = session.is_paused();
    let speed = session.vehicle().speed;
    let ratio = speed_ratio(speed, session.tuning().max_speed);
    let braking = actions.pressed(&DriveAction::Brake)
        || (actions.pressed(&DriveAction::Backward) && speed > 0.0);

    let muted = |volume: f32| Volume::Linear(if paused { 0.0 } else { volume });
    for mut sink in &mut engine {
        sink.set_speed(engine_pitch(ratio));
        sink.set_volume(muted(engine_volume(ratio)));
    }
    for mut sink in &mut wind {
        sink.set_volume(muted(wind_volume(ratio)));
    }
    for mut sink in &mut screech {
        sink.set_volume(muted(screech_volume(braking, speed)));
    }
}

fn play_crash(
    mut commands: Commands,
    assets: Res<AssetServer>,
    session: Res<Session>,
    last: Res<LastFrame>,
    mut cooldown: ResMut<CrashCooldown>,
    time: Res<Time>,
) {
    let Some(report) = **last else {
        return;
    };
    if !report.collided || session.is_paused() {
        return;
    }
    if cooldown.try_fire(time.elapsed_secs(), session.vehicle().speed) {
        commands.spawn((
            Name::new("Crash sound"),
            AudioPlayer::new(assets.load(CRASH_SOUND)),
            PlaybackSettings::DESPAWN.with_volume(Volume::Linear(CRASH_VOLUME)),
        ));
    }
}

/// Swap the music when the map changes.
fn sync_music(
    mut commands: Commands,
    assets: Res<AssetServer>,
    session: Res<Session>,
    playing: Query<(Entity, &MusicTrack)>,
    mut started: Local<Option<u64>>,
) {
    let generation = session.generation();
    if *started == Some(generation) {
        return;
    }
    *started = Some(generation);

    for (entity, track) in &playing {
        if track.generation != generation {
            commands.entity(entity).despawn();
        }
    }

    let config = session.config();
    let Some(file) = config.music_track else {
        debug!(map = config.id, "map has no music");
        return;
    };
    info!(map = config.id, track = file, "music started");
    commands.spawn((
        Name::new("Music"),
        MusicTrack { generation },
        AudioPlayer::new(assets.load(format!("{MUSIC_DIR}/{file}"))),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(music_volume(session.is_paused()))),
    ));
}

fn duck_music(session: Res<Session>, mut music: Query<&mut AudioSink, With<MusicTrack>>) {
    let volume = Volume::Linear(music_volume(session.is_paused()));
    for mut sink in &mut music {
        sink.set_volume(volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_pitch_follows_speed() {
        assert_eq!(engine_pitch(speed_ratio(0.0, 50.0)), ENGINE_MIN_PITCH);
        assert!((engine_pitch(speed_ratio(-50.0, 50.0)) - ENGINE_MAX_PITCH).abs() < 1.0e-6);
        assert!((engine_pitch(speed_ratio(500.0, 50.0)) - ENGINE_MAX_PITCH).abs() < 1.0e-6);
        assert!((engine_pitch(0.5) - 1.3).abs() < 1.0e-6);
        assert!(engine_volume(1.0) > engine_volume(0.0));
        assert_eq!(speed_ratio(10.0, 0.0), 0.0);
    }

    #[test]
    fn wind_and_screech_need_speed() {
        assert_eq!(wind_volume(0.1), 0.0);
        assert!(wind_volume(0.5) > 0.0);
        assert!((wind_volume(1.0) - WIND_MAX_VOLUME).abs() < 1.0e-6);

        assert_eq!(screech_volume(true, 5.0), 0.0);
        assert_eq!(screech_volume(false, 30.0), 0.0);
        assert!((screech_volume(true, -30.0) - SCREECH_VOLUME).abs() < 1.0e-6);
    }

    #[test]
    fn music_ducks_while_paused() {
        assert!(music_volume(true) < music_volume(false));
    }

    #[test]
    fn crashes_respect_speed_and_cooldown() {
        let mut cooldown = CrashCooldown::default();
        assert!(!cooldown.try_fire(0.0, 1.0));
        assert!(cooldown.try_fire(0.0, 5.0));
        assert!(!cooldown.try_fire(0.5, 5.0));
        assert!(cooldown.try_fire(1.0, -5.0));
    }
}
