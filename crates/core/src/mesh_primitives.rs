use std::f32::consts::TAU;

use glam::Vec3;

use crate::mesh::{Mesh, INVALID_INDEX};

pub fn make_box(size: Vec3, center: Vec3) -> Mesh {
    let mut mesh = Mesh::new();
    mesh.points.reserve(8);

    let start = center - size * 0.5;
    for x in 0..2 {
        for y in 0..2 {
            for z in 0..2 {
                mesh.points
                    .push(start + size * Vec3::new(x as f32, y as f32, z as f32));
            }
        }
    }

    mesh.polys = vec![
        [1, 3, 2, 0],
        [3, 7, 6, 2],
        [7, 5, 4, 6],
        [5, 1, 0, 4],
        [0, 2, 6, 4],
        [5, 7, 3, 1],
    ];
    mesh
}

pub fn make_grid(size: Vec3, center: Vec3, rows: u32, columns: u32) -> Mesh {
    let rows = rows.max(2);
    let columns = columns.max(2);
    let mut mesh = Mesh::new();
    mesh.points.reserve((rows * columns) as usize);

    let x_increment = size.x / (rows - 1) as f32;
    let z_increment = size.y / (columns - 1) as f32;
    let start_x = -(size.x * 0.5) + center.x;
    let start_z = -(size.y * 0.5) + center.z;

    for z in 0..columns {
        for x in 0..rows {
            mesh.points.push(Vec3::new(
                start_x + x as f32 * x_increment,
                center.y,
                start_z + z as f32 * z_increment,
            ));
        }
    }

    let index = |x: u32, z: u32| x + z * rows;
    for z in 1..columns {
        for x in 1..rows {
            mesh.polys.push([
                index(x - 1, z - 1),
                index(x, z - 1),
                index(x, z),
                index(x - 1, z),
            ]);
        }
    }
    mesh
}

/// `major_segment * minor_segment` points and one quad per cell. Indices
/// past the last point wrap around, and the single cell whose second corner
/// wraps to zero is emitted with a rotated corner order.
pub fn make_torus(
    center: Vec3,
    major_radius: f32,
    minor_radius: f32,
    major_segment: u32,
    minor_segment: u32,
) -> Mesh {
    let major_segment = major_segment.max(1);
    let minor_segment = minor_segment.max(1);
    let total = major_segment * minor_segment;

    let mut mesh = Mesh::new();
    mesh.points.reserve(total as usize);
    mesh.polys.reserve(total as usize);

    let vertical_stride = TAU / major_segment as f32;
    let horizontal_stride = TAU / minor_segment as f32;
    let wrap = |index: u32| if index >= total { index - total } else { index };

    let mut f1 = 0u32;
    for i in 0..major_segment {
        let theta = vertical_stride * i as f32;

        for j in 0..minor_segment {
            let phi = horizontal_stride * j as f32;
            let ring = major_radius + minor_radius * phi.cos();
            mesh.points.push(
                Vec3::new(
                    theta.cos() * ring,
                    minor_radius * phi.sin(),
                    theta.sin() * ring,
                ) + center,
            );

            let (f2, f3, f4) = if j + 1 == minor_segment {
                let f2 = i * minor_segment;
                (f2, f1 + minor_segment, f2 + minor_segment)
            } else {
                let f3 = f1 + minor_segment;
                (f1 + 1, f3, f3 + 1)
            };
            let (f2, f3, f4) = (wrap(f2), wrap(f3), wrap(f4));

            if f2 > 0 {
                mesh.polys.push([f1, f3, f4, f2]);
            } else {
                mesh.polys.push([f2, f1, f3, f4]);
            }

            f1 += 1;
        }
    }
    mesh
}

pub fn make_circle(segments: u32, radius: f32) -> Mesh {
    let segments = segments.max(3);
    let mut mesh = Mesh::new();
    mesh.points.reserve(segments as usize + 1);
    mesh.points.push(Vec3::ZERO);

    let step = TAU / segments as f32;
    for a in 0..segments {
        mesh.points.push(ring_point(radius, step * a as f32, 0.0));
    }

    let mut previous = segments;
    for i in 1..=segments {
        mesh.polys.push([0, previous, i, INVALID_INDEX]);
        previous = i;
    }
    mesh
}

/// Capped cylinder (or cone when the radii differ) spanning `-depth..depth`
/// along Y. Points: bottom center, top center, then interleaved bottom/top
/// ring points.
pub fn make_cylinder(segments: u32, bottom_radius: f32, top_radius: f32, depth: f32) -> Mesh {
    let segments = segments.max(3);
    let mut mesh = Mesh::new();
    mesh.points.reserve(segments as usize * 2 + 2);

    let bottom_center = 0u32;
    let top_center = 1u32;
    mesh.points.push(Vec3::new(0.0, -depth, 0.0));
    mesh.points.push(Vec3::new(0.0, depth, 0.0));

    let step = TAU / segments as f32;
    let (mut first_bottom, mut first_top) = (0u32, 0u32);
    let (mut last_bottom, mut last_top) = (0u32, 0u32);

    for a in 0..segments {
        let phi = step * a as f32;
        let bottom = mesh.points.len() as u32;
        mesh.points.push(ring_point(bottom_radius, phi, -depth));
        let top = mesh.points.len() as u32;
        mesh.points.push(ring_point(top_radius, phi, depth));

        if a > 0 {
            mesh.polys
                .push([bottom_center, last_bottom, bottom, INVALID_INDEX]);
            mesh.polys.push([top_center, top, last_top, INVALID_INDEX]);
            mesh.polys.push([last_bottom, last_top, top, bottom]);
        } else {
            first_bottom = bottom;
            first_top = top;
        }

        last_bottom = bottom;
        last_top = top;
    }

    mesh.polys
        .push([bottom_center, last_bottom, first_bottom, INVALID_INDEX]);
    mesh.polys
        .push([top_center, first_top, last_top, INVALID_INDEX]);
    mesh.polys
        .push([last_bottom, last_top, first_top, first_bottom]);
    mesh
}

const ICO_VERTS: [[f32; 3]; 12] = [
    [0.0, 0.0, -200.0],
    [144.72, -105.144, -89.443],
    [-55.277, -170.128, -89.443],
    [-178.885, 0.0, -89.443],
    [-55.277, 170.128, -89.443],
    [144.72, 105.144, -89.443],
    [55.277, -170.128, 89.443],
    [-144.72, -105.144, 89.443],
    [-144.72, 105.144, 89.443],
    [55.277, 170.128, 89.443],
    [178.885, 0.0, 89.443],
    [0.0, 0.0, 200.0],
];

const ICO_FACES: [[u32; 3]; 20] = [
    [0, 1, 2],
    [1, 0, 5],
    [0, 2, 3],
    [0, 3, 4],
    [0, 4, 5],
    [1, 5, 10],
    [2, 1, 6],
    [3, 2, 7],
    [4, 3, 8],
    [5, 4, 9],
    [1, 10, 6],
    [2, 6, 7],
    [3, 7, 8],
    [4, 8, 9],
    [5, 9, 10],
    [6, 10, 11],
    [7, 6, 11],
    [8, 7, 11],
    [9, 8, 11],
    [10, 9, 11],
];

pub fn make_icosphere(radius: f32) -> Mesh {
    let scale = radius / 200.0;
    let points = ICO_VERTS
        .iter()
        .map(|v| Vec3::new(v[0], v[2], v[1]) * scale)
        .collect();
    let polys = ICO_FACES
        .iter()
        .map(|f| [f[0], f[1], f[2], INVALID_INDEX])
        .collect();
    Mesh::with_points_polys(points, polys)
}

fn ring_point(radius: f32, phi: f32, y: f32) -> Vec3 {
    Vec3::new(-radius * phi.sin(), y, radius * phi.cos())
}
