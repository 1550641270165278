//! Speedometer, map title, minimap and pause overlay.

use bevy::{
    asset::RenderAssetUsages,
    image::ImageSampler,
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};
use racer_shared::{
    minimap::{MINIMAP_SIZE, Minimap},
    palette,
};

use crate::{
    convert,
    session::{LastFrame, Session, SessionSystems},
};

const HUD_FONT_SIZE: f32 = 20.0;
const SPEED_FONT_SIZE: f32 = 48.0;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_hud);
    app.add_systems(
        Update,
        (
            update_speed,
            update_map_title,
            update_pause_overlay,
            (refresh_minimap_layer, draw_minimap).chain(),
        )
            .in_set(SessionSystems),
    );
}

/// Prerendered map layer, tagged with the session generation it was built for.
#[derive(Resource)]
struct MinimapLayer {
    minimap: Minimap,
    generation: u64,
}

#[derive(Resource)]
struct MinimapImage(Handle<Image>);

#[derive(Component)]
struct SpeedText;

#[derive(Component)]
struct MapTitle;

#[derive(Component)]
struct DebugReadout;

#[derive(Component)]
struct PauseOverlay;

fn spawn_hud(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let neon = convert::color(palette::NEON_PINK);

    let minimap = images.add(minimap_image());
    commands.insert_resource(MinimapImage(minimap.clone()));
    commands.spawn((
        ImageNode::new(minimap),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(16.0),
            left: Val::Px(16.0),
            width: Val::Px(MINIMAP_SIZE as f32),
            height: Val::Px(MINIMAP_SIZE as f32),
            ..default()
        },
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(16.0),
            flex_direction: FlexDirection::Column,
            ..default()
        },
        children![
            (
                MapTitle,
                Text::default(),
                TextFont::from_font_size(HUD_FONT_SIZE),
                TextColor(neon),
            ),
            (
                DebugReadout,
                Text::default(),
                TextFont::from_font_size(HUD_FONT_SIZE * 0.7),
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.6)),
            ),
        ],
    ));

    commands.spawn((
        SpeedText,
        Text::new("0 km/h"),
        TextFont::from_font_size(SPEED_FONT_SIZE),
        TextColor(neon),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(24.0),
            right: Val::Px(32.0),
            ..default()
        },
    ));

    commands.spawn((
        PauseOverlay,
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        Visibility::Hidden,
        children![(
            Text::new("PAUSED"),
            TextFont::from_font_size(SPEED_FONT_SIZE),
            TextColor(neon),
        )],
    ));
}

fn update_speed(
    last: Res<LastFrame>,
    mut speed: Single<&mut Text, (With<SpeedText>, Without<DebugReadout>)>,
    mut readout: Single<&mut Text, (With<DebugReadout>, Without<SpeedText>)>,
) {
    let Some(report) = **last else {
        return;
    };
    speed.0 = format!("{} km/h", report.speed_kmh);
    readout.0 = format!(
        "x {:.1}  y {:.1}  z {:.1}  heading {:.0}°  slope {:.1}°",
        report.position.x,
        report.position.y,
        report.position.z,
        report.heading.to_degrees().rem_euclid(360.0),
        report.slope_angle.to_degrees(),
    );
}

fn update_map_title(
    session: Res<Session>,
    mut title: Single<&mut Text, With<MapTitle>>,
) {
    let config = session.config();
    let text = format!(
        "{} | {}  [{}]",
        config.name,
        config.subtitle,
        session.car_model().name
    );
    if title.0 != text {
        title.0 = text;
    }
}

/// Transparent RGBA square the minimap is drawn into on the CPU.
fn minimap_image() -> Image {
    let mut image = Image::new_fill(
        Extent3d {
            width: MINIMAP_SIZE,
            height: MINIMAP_SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.sampler = ImageSampler::nearest();
    image
}

fn refresh_minimap_layer(
    mut commands: Commands,
    session: Res<Session>,
    layer: Option<Res<MinimapLayer>>,
) {
    let generation = session.generation();
    if layer.is_some_and(|layer| layer.generation == generation) {
        return;
    }
    debug!(map = session.config().id, generation, "minimap rebuilt");
    commands.insert_resource(MinimapLayer {
        minimap: Minimap::new(session.config()),
        generation,
    });
}

fn draw_minimap(
    session: Res<Session>,
    layer: Option<Res<MinimapLayer>>,
    target: Res<MinimapImage>,
    mut images: ResMut<Assets<Image>>,
) {
    let Some(layer) = layer else {
        return;
    };
    let car = session.vehicle();
    if let Some(data) = images.get_mut(&target.0).and_then(|image| image.data.as_mut()) {
        layer
            .minimap
            .render(car.position.x, car.position.z, car.heading, data);
    }
}

fn update_pause_overlay(
    session: Res<Session>,
    mut overlay: Single<&mut Visibility, With<PauseOverlay>>,
) {
    let wanted = if session.is_paused() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    if **overlay != wanted {
        **overlay = wanted;
    }
}
