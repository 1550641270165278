//! Bloom, pixelation and CRT on top of the 3D scene.
//!
//! The HDR scene camera (with bloom) renders into a low-resolution image sized by
//! [`PostFxChain::low_res_size`]. A second camera draws that image full-screen with
//! nearest sampling through [`CrtMaterial`], which adds the CRT look.

use bevy::{
    asset::RenderAssetUsages,
    camera::RenderTarget,
    image::ImageSampler,
    post_process::bloom::{Bloom, BloomPrefilter},
    prelude::*,
    render::render_resource::{
        AsBindGroup, Extent3d, TextureDimension, TextureFormat, TextureUsages,
    },
    shader::ShaderRef,
    window::{PrimaryWindow, WindowResized},
};
use racer_shared::{
    PostFxChain, PostFxSettings,
    postfx::{BloomSettings, CrtSettings},
};

const CRT_SHADER: &str = "shaders/crt.wgsl";

/// Bevy's bloom intensity for a chain strength of 1.
const BLOOM_INTENSITY_PER_STRENGTH: f32 = 0.1;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(UiMaterialPlugin::<CrtMaterial>::default());
    app.add_systems(PostStartup, setup_chain);
    app.add_systems(Update, (resize_chain, tick_chain).chain());
    app.add_systems(Last, dispose_on_exit);
}

#[derive(Resource)]
pub struct PostFx {
    pub chain: PostFxChain,
    target: Handle<Image>,
    material: Handle<CrtMaterial>,
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct CrtMaterial {
    /// Scanline intensity, vignette strength, chromatic aberration, curvature.
    #[uniform(0)]
    params: Vec4,
    /// CRT clock, output height in pixels.
    #[uniform(1)]
    frame: Vec4,
    #[texture(2)]
    #[sampler(3)]
    screen: Handle<Image>,
}

impl CrtMaterial {
    fn new(crt: &CrtSettings, screen: Handle<Image>) -> Self {
        Self {
            params: Vec4::new(
                crt.scanline_intensity,
                crt.vignette_strength,
                crt.chromatic_aberration,
                crt.curvature,
            ),
            frame: Vec4::ZERO,
            screen,
        }
    }
}

impl UiMaterial for CrtMaterial {
    fn fragment_shader() -> ShaderRef {
        CRT_SHADER.into()
    }
}

/// Bloom component for the scene camera.
pub fn bloom(settings: &BloomSettings) -> Bloom {
    Bloom {
        intensity: settings.strength * BLOOM_INTENSITY_PER_STRENGTH,
        prefilter: BloomPrefilter {
            threshold: settings.threshold,
            threshold_softness: settings.radius,
        },
        ..Bloom::NATURAL
    }
}

/// Point the scene camera at the low-resolution target and put the CRT quad on screen.
fn setup_chain(
    mut commands: Commands,
    window: Single<&Window, With<PrimaryWindow>>,
    mut scene_camera: Single<&mut Camera, With<Camera3d>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<CrtMaterial>>,
) {
    let chain = PostFxChain::new(
        PostFxSettings::default(),
        window.physical_width(),
        window.physical_height(),
    );
    let (width, height) = chain.low_res_size();
    let target = images.add(target_image(width, height));

    scene_camera.target = RenderTarget::Image(target.clone().into());
    scene_camera.order = -1;

    let mut crt = CrtMaterial::new(&chain.settings.crt, target.clone());
    crt.frame.y = chain.size().1 as f32;
    let material = materials.add(crt);

    commands.spawn((Camera2d, IsDefaultUiCamera));
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        MaterialNode(material.clone()),
        GlobalZIndex(-1),
    ));

    debug!(
        passes = ?chain.passes(),
        width,
        height,
        "post-processing chain ready"
    );
    commands.insert_resource(PostFx {
        chain,
        target,
        material,
    });
}

/// Render target for the scene: one texel per pixel block, sampled nearest.
fn target_image(width: u32, height: u32) -> Image {
    let mut image = Image::new_fill(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 255],
        TextureFormat::Bgra8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.texture_descriptor.usage =
        TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST | TextureUsages::RENDER_ATTACHMENT;
    image.sampler = ImageSampler::nearest();
    image
}

fn resize_chain(
    mut resized: MessageReader<WindowResized>,
    window: Single<&Window, With<PrimaryWindow>>,
    postfx: Option<ResMut<PostFx>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<CrtMaterial>>,
) {
    if resized.read().count() == 0 {
        return;
    }
    let Some(mut postfx) = postfx else {
        return;
    };
    if !postfx
        .chain
        .resize(window.physical_width(), window.physical_height())
    {
        return;
    }

    let (width, height) = postfx.chain.low_res_size();
    if let Some(image) = images.get_mut(&postfx.target) {
        image.resize(Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        });
    }
    if let Some(material) = materials.get_mut(&postfx.material) {
        material.frame.y = postfx.chain.size().1 as f32;
    }
    debug!(width, height, "post-processing target resized");
}

fn tick_chain(
    time: Res<Time<Real>>,
    postfx: Option<ResMut<PostFx>>,
    mut materials: ResMut<Assets<CrtMaterial>>,
) {
    let Some(mut postfx) = postfx else {
        return;
    };
    postfx.chain.update(time.elapsed_secs());
    if let Some(material) = materials.get_mut(&postfx.material) {
        material.frame.x = postfx.chain.time();
    }
}

fn dispose_on_exit(
    mut exit: MessageReader<AppExit>,
    postfx: Option<ResMut<PostFx>>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<CrtMaterial>>,
) {
    if exit.read().count() == 0 {
        return;
    }
    if let Some(mut postfx) = postfx {
        release(&mut postfx, &mut images, &mut materials);
    }
}

/// Dispose the chain and drop its render target and CRT material. Runs once.
fn release(postfx: &mut PostFx, images: &mut Assets<Image>, materials: &mut Assets<CrtMaterial>) {
    if postfx.chain.is_disposed() {
        return;
    }
    postfx.chain.dispose();
    images.remove(&postfx.target);
    materials.remove(&postfx.material);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bloom_follows_chain_settings() {
        let settings = PostFxSettings::default();
        let bloom = bloom(&settings.bloom);
        assert!((bloom.intensity - 0.15).abs() < 1.0e-6);
        assert_eq!(bloom.prefilter.threshold, settings.bloom.threshold);
    }

    #[test]
    fn target_is_renderable_and_pixelated() {
        let image = target_image(427, 240);
        assert_eq!(image.width(), 427);
        assert_eq!(image.height(), 240);
        assert!(
            image
                .texture_descriptor
                .usage
                .contains(TextureUsages::RENDER_ATTACHMENT)
        );
        assert!(matches!(image.sampler, ImageSampler::Descriptor(_)));
    }

    #[test]
    fn dispose_releases_target_and_material() {
        let mut images = Assets::<Image>::default();
        let mut materials = Assets::<CrtMaterial>::default();
        let chain = PostFxChain::new(PostFxSettings::default(), 12, 12);
        let target = images.add(target_image(4, 4));
        let material = materials.add(CrtMaterial::new(&chain.settings.crt, target.clone()));
        let mut postfx = PostFx {
            chain,
            target: target.clone(),
            material: material.clone(),
        };

        release(&mut postfx, &mut images, &mut materials);
        assert!(postfx.chain.is_disposed());
        assert!(images.get(&target).is_none());
        assert!(materials.get(&material).is_none());

        // A second exit message finds nothing left to release.
        release(&mut postfx, &mut images, &mut materials);
        assert!(postfx.chain.is_disposed());
    }
}
