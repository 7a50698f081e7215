use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::eval::ProcessContext;
use crate::mesh::{Mesh, INVALID_INDEX};
use crate::node::NodeError;
use crate::primitive::{PrimPoints, Primitive, PrimitiveCollection};

const SEED_BASE: u64 = 19937;

fn uniform(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * rng.random::<f32>()
}

pub(crate) fn process_point_cloud(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let count = usize::try_from(ctx.eval_int("Points Count")?).unwrap_or(0);
    let min = ctx.eval_vec3("BBox Min")?;
    let max = ctx.eval_vec3("BBox Max")?;

    let mut rng_x = StdRng::seed_from_u64(SEED_BASE);
    let mut rng_y = StdRng::seed_from_u64(SEED_BASE + 1);
    let mut rng_z = StdRng::seed_from_u64(SEED_BASE + 2);
    let points = (0..count)
        .map(|_| {
            Vec3::new(
                uniform(&mut rng_x, min.x, max.x),
                uniform(&mut rng_y, min.y, max.y),
                uniform(&mut rng_z, min.z, max.z),
            )
        })
        .collect();

    ctx.collection_mut().add(PrimPoints {
        points,
        ..PrimPoints::default()
    });
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    corners: [Vec3; 3],
    area: f32,
}

fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).cross(c - b).length() * 0.5
}

fn triangles(mesh: &Mesh) -> Vec<Triangle> {
    let count = mesh.points.len();
    let mut triangles = Vec::with_capacity(mesh.triangle_count());
    for poly in &mesh.polys {
        let corners = if poly[3] == INVALID_INDEX { 3 } else { 4 };
        if poly[..corners].iter().any(|&i| i as usize >= count) {
            continue;
        }
        let p = |slot: usize| mesh.points[poly[slot] as usize];
        for (a, b, c) in [(0, 1, 2), (0, 2, 3)].into_iter().take(corners - 2) {
            let corners = [p(a), p(b), p(c)];
            triangles.push(Triangle {
                corners,
                area: triangle_area(corners[0], corners[1], corners[2]),
            });
        }
    }
    triangles
}

fn scatter_on_mesh(mesh: &Mesh, count: usize, rng: &mut StdRng) -> Option<Vec<Vec3>> {
    let triangles = triangles(mesh);
    let mut running = 0.0f32;
    let cumulative: Vec<f32> = triangles
        .iter()
        .map(|t| {
            running += t.area;
            running
        })
        .collect();
    let total = running;
    if total <= 0.0 {
        return None;
    }

    let samples = (0..count)
        .map(|_| {
            let target = rng.random::<f32>() * total;
            let index = cumulative
                .partition_point(|&c| c <= target)
                .min(triangles.len() - 1);
            let [a, b, c] = triangles[index].corners;
            let r1 = rng.random::<f32>().sqrt();
            let r2 = rng.random::<f32>();
            a * (1.0 - r1) + b * (r1 * (1.0 - r2)) + c * (r1 * r2)
        })
        .collect();
    Some(samples)
}

pub(crate) fn process_scatter(ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
    let count = usize::try_from(ctx.eval_int("Points Count")?).unwrap_or(0);
    let seed = ctx.eval_int("Seed")?;
    let mut rng = StdRng::seed_from_u64(SEED_BASE + u64::from(seed.unsigned_abs()));

    let input = std::mem::take(ctx.collection_mut());
    let mut result = PrimitiveCollection::new();
    let mut degenerate = 0usize;

    for prim in input.into_iter() {
        let Primitive::Mesh(mesh) = prim else {
            result.add(prim);
            continue;
        };
        match scatter_on_mesh(&mesh, count, &mut rng) {
            Some(points) => {
                result.add(PrimPoints {
                    points,
                    matrix: mesh.matrix,
                    ..PrimPoints::default()
                });
            }
            None => degenerate += 1,
        }
    }

    *ctx.collection_mut() = result;
    if degenerate > 0 {
        ctx.warn(format!("{degenerate} mesh(es) without surface area, nothing scattered"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_primitives::{make_box, make_grid};

    #[test]
    fn scatter_stays_on_the_surface() {
        let mesh = make_grid(Vec3::new(2.0, 2.0, 0.0), Vec3::ZERO, 3, 3);
        let mut rng = StdRng::seed_from_u64(SEED_BASE);
        let points = scatter_on_mesh(&mesh, 500, &mut rng).unwrap();
        assert_eq!(points.len(), 500);
        for p in points {
            assert!(p.y.abs() < 1e-6);
            assert!(p.x.abs() <= 1.0 + 1e-5 && p.z.abs() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn scatter_weights_by_area() {
        let mesh = make_box(Vec3::new(4.0, 1.0, 1.0), Vec3::ZERO);
        let mut rng = StdRng::seed_from_u64(7);
        let points = scatter_on_mesh(&mesh, 4000, &mut rng).unwrap();
        // the two 1x1 end caps are 2 of 18 units of area
        let on_caps = points.iter().filter(|p| (p.x.abs() - 2.0).abs() < 1e-4).count();
        let share = on_caps as f32 / points.len() as f32;
        assert!(share > 0.06 && share < 0.17, "cap share {share}");
    }

    #[test]
    fn flat_mesh_has_nothing_to_sample() {
        let mesh = Mesh::with_points_polys(vec![Vec3::ZERO; 3], vec![[0, 1, 2, INVALID_INDEX]]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(scatter_on_mesh(&mesh, 10, &mut rng).is_none());
    }
}
