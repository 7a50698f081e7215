use glam::{Mat4, Vec3};
use rayon::prelude::*;
use serde::Serialize;

use crate::attributes::Attributes;

pub const INVALID_INDEX: u32 = u32::MAX;

pub type PointList = Vec<Vec3>;
pub type PolygonList = Vec<[u32; 4]>;

const NORMAL_CHUNK: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Aabb {
            min: min.to_array(),
            max: max.to_array(),
        })
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Vec3::from(self.min).min(Vec3::from(other.min)).to_array(),
            max: Vec3::from(self.max).max(Vec3::from(other.max)).to_array(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub points: PointList,
    pub polys: PolygonList,
    pub attributes: Attributes,
    pub matrix: Mat4,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            polys: Vec::new(),
            attributes: Attributes::new(),
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points_polys(points: PointList, polys: PolygonList) -> Self {
        Self {
            points,
            polys,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.points)
    }

    pub fn triangle_count(&self) -> usize {
        self.polys
            .iter()
            .map(|poly| if poly[3] == INVALID_INDEX { 1 } else { 2 })
            .sum()
    }

    /// Per-point sum of the (unnormalized) face normals of every polygon
    /// touching the point. Polygons are processed in parallel; each worker
    /// accumulates into its own buffer and the buffers are summed afterwards.
    pub fn accumulate_normals(&self) -> Vec<Vec3> {
        let count = self.points.len();
        let points = &self.points;

        self.polys
            .par_iter()
            .with_min_len(NORMAL_CHUNK)
            .fold(
                || vec![Vec3::ZERO; count],
                |mut acc, poly| {
                    let corners = if poly[3] == INVALID_INDEX { 3 } else { 4 };
                    if poly[..corners].iter().any(|&i| i as usize >= count) {
                        return acc;
                    }
                    let normal = face_normal(
                        points[poly[0] as usize],
                        points[poly[1] as usize],
                        points[poly[2] as usize],
                    );
                    for &index in &poly[..corners] {
                        acc[index as usize] += normal;
                    }
                    acc
                },
            )
            .reduce(
                || vec![Vec3::ZERO; count],
                |mut a, b| {
                    for (lhs, rhs) in a.iter_mut().zip(b) {
                        *lhs += rhs;
                    }
                    a
                },
            )
    }

    pub fn triangulate(&self) -> Vec<u32> {
        let count = self.points.len() as u64;
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        for poly in &self.polys {
            let corners = if poly[3] == INVALID_INDEX { 3 } else { 4 };
            if poly[..corners].iter().any(|&i| u64::from(i) >= count) {
                continue;
            }
            indices.extend_from_slice(&[poly[0], poly[1], poly[2]]);
            if corners == 4 {
                indices.extend_from_slice(&[poly[0], poly[2], poly[3]]);
            }
        }
        indices
    }
}

pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v2 - v1).cross(v0 - v1)
}
