//! [`Primitive`] to Bevy [`Mesh`].
//!
//! Built-in shapes come from Bevy's primitive mesh builders, rotated where their
//! native plane differs from ours. Prisms and strips are assembled by hand.

use std::f32::consts::FRAC_PI_2;

use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
};
use nalgebra::Vector2;
use racer_shared::world::Primitive;

use crate::convert::vec3;

const SPHERE_SECTORS: u32 = 24;
const SPHERE_STACKS: u32 = 16;
const DISC_RESOLUTION: u32 = 32;

pub fn build(primitive: &Primitive) -> Mesh {
    // Bevy's flat 2D shapes face +Z; ours lie in XZ facing +Y.
    let lay_flat = Quat::from_rotation_x(-FRAC_PI_2);
    match primitive {
        Primitive::Box { size } => Cuboid::new(size.x, size.y, size.z).into(),
        Primitive::Plane { width, depth } => Plane3d::default().mesh().size(*width, *depth).build(),
        Primitive::Cylinder {
            radius_top,
            radius_bottom,
            height,
            segments,
        } => ConicalFrustum {
            radius_top: *radius_top,
            radius_bottom: *radius_bottom,
            height: *height,
        }
        .mesh()
        .resolution(*segments)
        .build(),
        Primitive::Cone {
            radius,
            height,
            segments,
        } => Cone {
            radius: *radius,
            height: *height,
        }
        .mesh()
        .resolution(*segments)
        .build(),
        Primitive::Sphere { radius } => Sphere::new(*radius)
            .mesh()
            .uv(SPHERE_SECTORS, SPHERE_STACKS),
        Primitive::Disc { radius } => Circle::new(*radius)
            .mesh()
            .resolution(DISC_RESOLUTION)
            .build()
            .rotated_by(lay_flat),
        Primitive::Ring {
            inner,
            outer,
            segments,
        } => Annulus::new(*inner, *outer)
            .mesh()
            .resolution(*segments)
            .build()
            .rotated_by(lay_flat),
        Primitive::Prism { outline, height } => prism(outline, *height),
        Primitive::Strip { a, b } => {
            let a: Vec<Vec3> = a.iter().copied().map(vec3).collect();
            let b: Vec<Vec3> = b.iter().copied().map(vec3).collect();
            strip(&a, &b)
        }
    }
}

/// Convex outline extruded from `y = 0` to `height`, with a top cap. Either winding
/// is accepted.
fn prism(outline: &[Vector2<f32>], height: f32) -> Mesh {
    let mut outline = outline.to_vec();
    if signed_area(&outline) < 0.0 {
        outline.reverse();
    }
    let n = outline.len();
    let mut positions = Vec::with_capacity(n * 4 + n);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut uvs = Vec::with_capacity(positions.capacity());
    let mut indices = Vec::with_capacity(n * 6 + n.saturating_sub(2) * 3);

    for i in 0..n {
        let p = outline[i];
        let q = outline[(i + 1) % n];
        let edge = Vec2::new(q.x - p.x, q.y - p.y);
        let normal = Vec3::new(edge.y, 0.0, -edge.x).normalize_or_zero();
        let base = positions.len() as u32;
        positions.extend([
            [p.x, 0.0, p.y],
            [q.x, 0.0, q.y],
            [q.x, height, q.y],
            [p.x, height, p.y],
        ]);
        normals.extend([normal.to_array(); 4]);
        uvs.extend([[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);
        indices.extend([base, base + 2, base + 1, base, base + 3, base + 2]);
    }

    let cap = positions.len() as u32;
    for p in &outline {
        positions.push([p.x, height, p.y]);
        normals.push([0.0, 1.0, 0.0]);
        uvs.push([0.0, 0.0]);
    }
    for i in 1..n.saturating_sub(1) as u32 {
        indices.extend([cap, cap + i + 1, cap + i]);
    }

    triangle_mesh(positions, normals, uvs, indices)
}

/// Shoelace area over `(x, z)`; positive when the cap faces +Y as wound.
fn signed_area(outline: &[Vector2<f32>]) -> f32 {
    let n = outline.len();
    (0..n)
        .map(|i| {
            let (p, q) = (outline[i], outline[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum::<f32>()
        * 0.5
}

/// Quad strip between matching points of `a` and `b`. Extra points on the longer side
/// are ignored.
fn strip(a: &[Vec3], b: &[Vec3]) -> Mesh {
    let n = a.len().min(b.len());
    let mut positions = Vec::with_capacity(n * 2);
    let mut uvs = Vec::with_capacity(n * 2);
    let mut indices = Vec::with_capacity(n.saturating_sub(1) * 6);
    for i in 0..n {
        positions.push(a[i].to_array());
        positions.push(b[i].to_array());
        let v = i as f32;
        uvs.push([0.0, v]);
        uvs.push([1.0, v]);
    }
    for i in 0..n.saturating_sub(1) as u32 {
        let (a0, b0, a1, b1) = (i * 2, i * 2 + 1, i * 2 + 2, i * 2 + 3);
        indices.extend([a0, b0, a1, b0, b1, a1]);
    }
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];
    triangle_mesh(positions, normals, uvs, indices)
}

fn triangle_mesh(
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
) -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}
