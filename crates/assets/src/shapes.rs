//! Procedural geometry.
//!
//! All shapes are centred on the origin unless noted and use counter-clockwise
//! winding for front faces. Degenerate subdivision counts are raised to the
//! smallest value that still produces a closed surface.

use crate::mesh::{MeshData, StandardVertex2D, Topology, VertexColor, VertexNormalTexCoords};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

fn at_least(value: u32, min: u32, what: &str) -> u32 {
    if value < min {
        tracing::debug!(value, min, what, "raising degenerate subdivision count");
        min
    } else {
        value
    }
}

/// Screen-space quad with white vertex color.
pub fn quad_2d(size: Vec2) -> MeshData<StandardVertex2D> {
    let half = size * 0.5;
    let vertices = (0..4)
        .map(|i| {
            let x = i % 2;
            let z = i / 2;
            let sign_x = if x == 0 { -1.0 } else { 1.0 };
            let sign_z = if z == 0 { 1.0 } else { -1.0 };
            StandardVertex2D {
                position: [sign_x * half.x, sign_z * half.y],
                tex_coords: [x as f32, z as f32],
                color: [1.0, 1.0, 1.0],
            }
        })
        .collect();
    MeshData::new(vertices, vec![0, 1, 2, 1, 2, 3])
}

/// Horizontal plane facing +Y.
pub fn plane(width: f32, length: f32) -> MeshData<VertexNormalTexCoords> {
    let half_width = 0.5 * width;
    let half_length = 0.5 * length;
    let vertices = (0..4)
        .map(|i| {
            let x = i % 2;
            let z = i / 2;
            let sign_x = if x == 0 { -1.0 } else { 1.0 };
            let sign_z = if z == 0 { -1.0 } else { 1.0 };
            VertexNormalTexCoords::new(
                Vec3::new(sign_x * half_width, 0.0, sign_z * half_length),
                Vec3::Y,
                Vec2::new(x as f32, z as f32),
            )
        })
        .collect();
    MeshData::new(vertices, vec![0, 1, 2, 1, 2, 3])
}

/// Non-indexed cube as interleaved `x, y, z, u, v` floats, 36 vertices.
pub fn cube_vertices(width: f32, height: f32, length: f32) -> Vec<f32> {
    let (w, h, l) = (0.5 * width, 0.5 * height, 0.5 * length);
    #[rustfmt::skip]
    let data = vec![
        -w, -h, -l,  0.0, 0.0,
         w, -h, -l,  1.0, 0.0,
         w,  h, -l,  1.0, 1.0,
         w,  h, -l,  1.0, 1.0,
        -w,  h, -l,  0.0, 1.0,
        -w, -h, -l,  0.0, 0.0,

        -w, -h,  l,  0.0, 0.0,
         w, -h,  l,  1.0, 0.0,
         w,  h,  l,  1.0, 1.0,
         w,  h,  l,  1.0, 1.0,
        -w,  h,  l,  0.0, 1.0,
        -w, -h,  l,  0.0, 0.0,

        -w,  h,  l,  1.0, 0.0,
        -w,  h, -l,  1.0, 1.0,
        -w, -h, -l,  0.0, 1.0,
        -w, -h, -l,  0.0, 1.0,
        -w, -h,  l,  0.0, 0.0,
        -w,  h,  l,  1.0, 0.0,

         w,  h,  l,  1.0, 0.0,
         w,  h, -l,  1.0, 1.0,
         w, -h, -l,  0.0, 1.0,
         w, -h, -l,  0.0, 1.0,
         w, -h,  l,  0.0, 0.0,
         w,  h,  l,  1.0, 0.0,

        -w, -h, -l,  0.0, 1.0,
         w, -h, -l,  1.0, 1.0,
         w, -h,  l,  1.0, 0.0,
         w, -h,  l,  1.0, 0.0,
        -w, -h,  l,  0.0, 0.0,
        -w, -h, -l,  0.0, 1.0,

        -w,  h, -l,  0.0, 1.0,
         w,  h, -l,  1.0, 1.0,
         w,  h,  l,  1.0, 0.0,
         w,  h,  l,  1.0, 0.0,
        -w,  h,  l,  0.0, 0.0,
        -w,  h, -l,  0.0, 1.0,
    ];
    data
}

/// Box with per-face normals, six vertices per face. `flip_normals` points
/// the normals inward (for skyboxes and room interiors).
pub fn box_mesh(size: Vec3, flip_normals: bool) -> MeshData<VertexNormalTexCoords> {
    let (w, h, l) = (size.x / 2.0, size.y / 2.0, size.z / 2.0);
    let sign = if flip_normals { -1.0 } else { 1.0 };
    let (x, y, z) = (Vec3::X * sign, Vec3::Y * sign, Vec3::Z * sign);
    let v = |p: [f32; 3], n: Vec3, uv: [f32; 2]| {
        VertexNormalTexCoords::new(Vec3::from(p), n, Vec2::from(uv))
    };

    #[rustfmt::skip]
    let vertices = vec![
        v([-w, -h, -l], -z, [0.0, 0.0]),
        v([ w,  h, -l], -z, [1.0, 1.0]),
        v([ w, -h, -l], -z, [1.0, 0.0]),
        v([ w,  h, -l], -z, [1.0, 1.0]),
        v([-w, -h, -l], -z, [0.0, 0.0]),
        v([-w,  h, -l], -z, [0.0, 1.0]),

        v([-w, -h,  l],  z, [0.0, 0.0]),
        v([ w, -h,  l],  z, [1.0, 0.0]),
        v([ w,  h,  l],  z, [1.0, 1.0]),
        v([ w,  h,  l],  z, [1.0, 1.0]),
        v([-w,  h,  l],  z, [0.0, 1.0]),
        v([-w, -h,  l],  z, [0.0, 0.0]),

        v([-w,  h,  l], -x, [1.0, 0.0]),
        v([-w,  h, -l], -x, [1.0, 1.0]),
        v([-w, -h, -l], -x, [0.0, 1.0]),
        v([-w, -h, -l], -x, [0.0, 1.0]),
        v([-w, -h,  l], -x, [0.0, 0.0]),
        v([-w,  h,  l], -x, [1.0, 0.0]),

        v([ w,  h,  l],  x, [1.0, 0.0]),
        v([ w, -h, -l],  x, [0.0, 1.0]),
        v([ w,  h, -l],  x, [1.0, 1.0]),
        v([ w, -h, -l],  x, [0.0, 1.0]),
        v([ w,  h,  l],  x, [1.0, 0.0]),
        v([ w, -h,  l],  x, [0.0, 0.0]),

        v([-w, -h, -l], -y, [0.0, 1.0]),
        v([ w, -h, -l], -y, [1.0, 1.0]),
        v([ w, -h,  l], -y, [1.0, 0.0]),
        v([ w, -h,  l], -y, [1.0, 0.0]),
        v([-w, -h,  l], -y, [0.0, 0.0]),
        v([-w, -h, -l], -y, [0.0, 1.0]),

        v([-w,  h, -l],  y, [0.0, 1.0]),
        v([ w,  h,  l],  y, [1.0, 0.0]),
        v([ w,  h, -l],  y, [1.0, 1.0]),
        v([ w,  h,  l],  y, [1.0, 0.0]),
        v([-w,  h, -l],  y, [0.0, 1.0]),
        v([-w,  h,  l],  y, [0.0, 0.0]),
    ];
    let indices = (0..vertices.len() as u32).collect();
    MeshData::new(vertices, indices)
}

/// Wireframe box edges as a line list.
pub fn box_outline(size: Vec3, color: Vec3) -> MeshData<VertexColor> {
    let (w, h, l) = (size.x / 2.0, size.y / 2.0, size.z / 2.0);
    let color = color.to_array();
    let corners = [
        [-w, h, -l],
        [w, h, -l],
        [-w, -h, -l],
        [w, -h, -l],
        [-w, h, l],
        [w, h, l],
        [-w, -h, l],
        [w, -h, l],
    ];
    let vertices = corners
        .iter()
        .map(|&position| VertexColor { position, color })
        .collect();
    #[rustfmt::skip]
    let indices = vec![
        0, 1,  1, 3,  3, 2,  2, 0,
        1, 5,  3, 7,  5, 7,  0, 4,
        2, 6,  4, 6,  4, 5,  6, 7,
    ];
    MeshData::with_topology(vertices, indices, Topology::Lines)
}

/// Capped cylinder along Y. Side vertices duplicate the seam so the texture
/// wraps once around.
pub fn cylinder(height: f32, radius: f32, subdivisions: u32) -> MeshData<VertexNormalTexCoords> {
    let subdivisions = at_least(subdivisions, 3, "cylinder subdivisions");
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for step in 0..=subdivisions {
        let progress = step as f32 / subdivisions as f32;
        let angle = TAU * progress;
        let (fx, fz) = (angle.sin() * radius, angle.cos() * radius);
        for y in [-1.0_f32, 1.0] {
            let fy = 0.5 * height * y;
            vertices.push(VertexNormalTexCoords::new(
                Vec3::new(fx, fy, fz),
                Vec3::new(fx, 0.0, fz).normalize_or_zero(),
                Vec2::new(progress, 1.0 - (y + 1.0) * 0.5),
            ));
        }
    }

    let mut offset = 0;
    for _ in 0..subdivisions {
        indices.extend_from_slice(&[offset, offset + 2, offset + 1]);
        indices.extend_from_slice(&[offset + 1, offset + 2, offset + 3]);
        offset += 2;
    }

    for y in [-1.0_f32, 1.0] {
        let center = vertices.len() as u32;
        let fy = 0.5 * height * y;
        let normal = Vec3::new(0.0, y, 0.0);
        vertices.push(VertexNormalTexCoords::new(
            Vec3::new(0.0, fy, 0.0),
            normal,
            Vec2::splat(0.5),
        ));
        for step in 0..=subdivisions {
            let theta = TAU * step as f32 / subdivisions as f32;
            let (fx, fz) = (theta.sin(), theta.cos());
            vertices.push(VertexNormalTexCoords::new(
                Vec3::new(radius * fx, fy, radius * fz),
                normal,
                0.5 * Vec2::new(1.0 + fx, 1.0 + fz),
            ));
        }
        for i in 0..subdivisions {
            indices.extend_from_slice(&[center, center + 1 + i, center + 2 + i]);
        }
    }

    MeshData::new(vertices, indices)
}

/// UV sphere. Texture coordinates are left at zero.
pub fn sphere(
    radius: f32,
    latitude_subdivisions: u32,
    longitude_subdivisions: u32,
) -> MeshData<VertexNormalTexCoords> {
    let lat = at_least(latitude_subdivisions, 3, "sphere latitude subdivisions");
    let long = at_least(longitude_subdivisions, 2, "sphere longitude subdivisions");
    let mut vertices = Vec::with_capacity((lat * long) as usize);
    let mut indices = Vec::new();

    for la in 0..lat {
        for lo in 0..long {
            let theta = TAU * la as f32 / lat as f32;
            let phi = PI * lo as f32 / (long as f32 - 1.0);
            let position = Vec3::new(
                radius * theta.cos() * phi.sin(),
                radius * theta.sin() * phi.sin(),
                radius * phi.cos(),
            );
            vertices.push(VertexNormalTexCoords::new(
                position,
                position.normalize_or_zero(),
                Vec2::ZERO,
            ));
        }
    }

    for la in 0..lat {
        for lo in 0..long - 1 {
            let base = la * long + lo;
            let neighbour = ((la + 1) % lat) * long + lo;
            indices.extend_from_slice(&[base, base + 1, neighbour]);
            indices.extend_from_slice(&[neighbour, base + 1, neighbour + 1]);
        }
    }

    MeshData::new(vertices, indices)
}

/// Cone standing on the XZ plane with its apex at `(0, height, 0)`. `cuts` is
/// the number of vertex rings along the slant, apex included.
pub fn cone(
    height: f32,
    radius: f32,
    subdivisions: u32,
    cuts: u32,
) -> MeshData<VertexNormalTexCoords> {
    let subdivisions = at_least(subdivisions, 3, "cone subdivisions");
    let cuts = at_least(cuts, 2, "cone cuts");
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for step in 0..=subdivisions {
        let progress = step as f32 / subdivisions as f32;
        let angle = TAU * progress;
        let (fx, fz) = (angle.sin(), angle.cos());
        for y in 0..cuts {
            let height_progress = y as f32 / (cuts - 1) as f32;
            let current_radius = radius * (1.0 - height_progress);
            let position = Vec3::new(
                current_radius * fx,
                height * height_progress,
                current_radius * fz,
            );

            let mut flat = Vec3::new(current_radius * fx, 0.0, current_radius * fz);
            if current_radius > 1e-5 {
                flat = flat.normalize();
            }
            let normal = Vec3::new(
                flat.x * height / radius,
                radius / height,
                flat.z * height / radius,
            )
            .normalize_or_zero();

            vertices.push(VertexNormalTexCoords::new(
                position,
                normal,
                Vec2::new(progress, height_progress),
            ));
        }
    }

    let cap = vertices.len() as u32;
    vertices.push(VertexNormalTexCoords::new(Vec3::ZERO, Vec3::NEG_Y, Vec2::splat(0.5)));
    for step in 0..=subdivisions {
        let angle = TAU * step as f32 / subdivisions as f32;
        let (fx, fz) = (angle.sin(), angle.cos());
        vertices.push(VertexNormalTexCoords::new(
            Vec3::new(radius * fx, 0.0, radius * fz),
            Vec3::NEG_Y,
            Vec2::new(fx * 0.5 + 0.5, fz * 0.5 + 0.5),
        ));
    }

    for step in 0..subdivisions {
        let base = cuts * step;
        for y in 0..cuts - 1 {
            indices.extend_from_slice(&[base + y, base + y + 1, base + y + cuts]);
            indices.extend_from_slice(&[base + y + 1, base + y + cuts, base + y + cuts + 1]);
        }
    }
    for step in 0..subdivisions {
        indices.extend_from_slice(&[cap, cap + step + 1, cap + step + 2]);
    }

    MeshData::new(vertices, indices)
}
