//! Shared-crate value types to their Bevy counterparts.

use bevy::{
    asset::RenderAssetUsages,
    image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor},
    prelude::*,
    render::render_resource::{Extent3d, Face, TextureDimension, TextureFormat},
};
use nalgebra::{UnitQuaternion, Vector3};
use racer_shared::{
    palette,
    world::{Material, WindowTexture, scene},
};

pub fn vec3(v: Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn quat(q: UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

pub fn color(c: palette::Color) -> Color {
    Color::srgba_u8(c.r, c.g, c.b, c.a)
}

pub fn transform(t: &scene::Transform) -> Transform {
    Transform {
        translation: vec3(t.translation),
        rotation: quat(t.rotation),
        scale: vec3(t.scale),
    }
}

/// Vehicle pose: yaw from `heading`, then nose up by `slope` radians.
pub fn vehicle_rotation(heading: f32, slope: f32) -> Quat {
    Quat::from_rotation_y(heading) * Quat::from_rotation_x(-slope)
}

/// Unlit surface. `texture` is the already-uploaded image for `material.texture`.
pub fn standard_material(material: &Material, texture: Option<Handle<Image>>) -> StandardMaterial {
    StandardMaterial {
        base_color: color(material.color),
        base_color_texture: texture,
        unlit: true,
        fog_enabled: material.fog,
        double_sided: material.double_sided,
        cull_mode: if material.double_sided {
            None
        } else {
            Some(Face::Back)
        },
        alpha_mode: if material.is_transparent() {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        ..default()
    }
}

/// Facade texture with nearest filtering and repeat wrapping.
pub fn window_image(texture: &WindowTexture) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: texture.width.max(1),
            height: texture.height.max(1),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        texture.pixels.clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    );
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        ..ImageSamplerDescriptor::nearest()
    });
    image
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use racer_shared::world::Transform as SceneTransform;

    use super::*;

    #[test]
    fn yaw_matches_scene_convention() {
        let t = transform(&SceneTransform::at(1.0, 2.0, 3.0).with_yaw(FRAC_PI_2));
        assert_eq!(t.translation, Vec3::new(1.0, 2.0, 3.0));
        let forward = t.rotation * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1.0e-5);
    }

    #[test]
    fn vehicle_nose_follows_heading_and_slope() {
        let nose = vehicle_rotation(FRAC_PI_2, 0.0) * Vec3::Z;
        assert!((nose - Vec3::X).length() < 1.0e-5);
        let uphill = vehicle_rotation(0.0, 0.2) * Vec3::Z;
        assert!(uphill.y > 0.0 && uphill.z > 0.0);
    }

    #[test]
    fn translucent_materials_blend() {
        let glass = Material::translucent(palette::NEON_PINK, 0.3).without_fog();
        let m = standard_material(&glass, None);
        assert!(matches!(m.alpha_mode, AlphaMode::Blend));
        assert!(!m.fog_enabled);
        assert!(m.unlit);
        let solid = standard_material(&Material::solid(palette::ROAD), None);
        assert!(matches!(solid.alpha_mode, AlphaMode::Opaque));
    }
}
