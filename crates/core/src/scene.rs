use serde::Serialize;

use crate::attributes::AttributeType;
use crate::mesh::Aabb;
use crate::nodes::color::COLOR_ATTRIBUTE;
use crate::nodes::normal::NORMAL_ATTRIBUTE;
use crate::primitive::{Primitive, PrimitiveCollection};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenePoints {
    pub positions: Vec<[f32; 3]>,
    pub colors: Option<Vec<[f32; 3]>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneLines {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneSnapshot {
    pub meshes: Vec<SceneMesh>,
    pub points: Vec<ScenePoints>,
    pub lines: Vec<SceneLines>,
    pub bounds: Option<Aabb>,
}

fn vec3_attribute(prim: &Primitive, name: &str) -> Option<Vec<[f32; 3]>> {
    let values = prim.attribute(name, AttributeType::Vec3)?.as_vec3()?;
    (values.len() == prim.points().len()).then(|| values.iter().map(|v| v.to_array()).collect())
}

impl SceneMesh {
    fn from_primitive(prim: &Primitive) -> Option<Self> {
        let mesh = prim.as_mesh()?;
        let matrix = mesh.matrix;
        let positions = mesh
            .points
            .iter()
            .map(|p| matrix.transform_point3(*p).to_array())
            .collect();

        let normals = match prim
            .attribute(NORMAL_ATTRIBUTE, AttributeType::Vec3)
            .and_then(|attribute| attribute.as_vec3())
            .filter(|normals| normals.len() == mesh.points.len())
        {
            Some(normals) => normals.to_vec(),
            None => mesh.accumulate_normals(),
        };
        let normal_matrix = if matrix.determinant().abs() > f32::EPSILON {
            matrix.inverse().transpose()
        } else {
            matrix
        };
        let normals = normals
            .into_iter()
            .map(|n| normal_matrix.transform_vector3(n).normalize_or_zero().to_array())
            .collect();

        Some(Self {
            positions,
            normals,
            colors: vec3_attribute(prim, COLOR_ATTRIBUTE),
            indices: mesh.triangulate(),
        })
    }
}

impl SceneSnapshot {
    pub fn from_collection(collection: &PrimitiveCollection) -> Self {
        let mut snapshot = SceneSnapshot::default();
        for prim in collection.iter() {
            match prim {
                Primitive::Mesh(_) => {
                    if let Some(mesh) = SceneMesh::from_primitive(prim) {
                        snapshot.meshes.push(mesh);
                    }
                }
                Primitive::Points(points) => snapshot.points.push(ScenePoints {
                    positions: points
                        .points
                        .iter()
                        .map(|p| points.matrix.transform_point3(*p).to_array())
                        .collect(),
                    colors: vec3_attribute(prim, COLOR_ATTRIBUTE),
                }),
                Primitive::Segments(segments) => snapshot.lines.push(SceneLines {
                    positions: segments
                        .points
                        .iter()
                        .map(|p| segments.matrix.transform_point3(*p).to_array())
                        .collect(),
                    indices: segments.edges.iter().flatten().copied().collect(),
                }),
            }
            snapshot.bounds = match (snapshot.bounds, prim.bounds()) {
                (Some(a), Some(b)) => Some(a.union(&b)),
                (a, b) => a.or(b),
            };
        }
        snapshot
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum::<usize>()
            + self.points.iter().map(|p| p.positions.len()).sum::<usize>()
            + self.lines.iter().map(|l| l.positions.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_primitives::make_box;
    use crate::primitive::{PrimPoints, SegmentPrim};
    use glam::{Mat4, Vec3};

    #[test]
    fn snapshot_applies_matrices_and_triangulates() {
        let mut collection = PrimitiveCollection::new();
        let mut cube = make_box(Vec3::ONE, Vec3::ZERO);
        cube.matrix = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        collection.add(cube);
        collection.add(PrimPoints {
            points: vec![Vec3::ZERO, Vec3::ONE],
            ..PrimPoints::default()
        });
        collection.add(SegmentPrim {
            points: vec![Vec3::ZERO, Vec3::Y],
            edges: vec![[0, 1]],
            ..SegmentPrim::default()
        });

        let snapshot = SceneSnapshot::from_collection(&collection);
        assert_eq!(snapshot.meshes.len(), 1);
        assert_eq!(snapshot.triangle_count(), 12);
        assert_eq!(snapshot.meshes[0].positions[0], [9.5, -0.5, -0.5]);
        assert_eq!(snapshot.meshes[0].normals.len(), 8);
        assert_eq!(snapshot.points[0].positions.len(), 2);
        assert_eq!(snapshot.lines[0].indices, vec![0, 1]);
        assert_eq!(snapshot.vertex_count(), 12);

        let bounds = snapshot.bounds.unwrap();
        assert_eq!(bounds.min, [0.0, -0.5, -0.5]);
        assert_eq!(bounds.max, [10.5, 1.0, 1.0]);
    }

    #[test]
    fn normals_stay_perpendicular_under_non_uniform_scale() {
        let mut collection = PrimitiveCollection::new();
        let mut cube = make_box(Vec3::ONE, Vec3::ZERO);
        cube.matrix = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        collection.add(cube);

        let snapshot = SceneSnapshot::from_collection(&collection);
        for n in &snapshot.meshes[0].normals {
            // corner normals lean away from the stretched axis
            approx::assert_relative_eq!((n[0] / n[1]).abs(), 0.5, epsilon = 1e-5);
            approx::assert_relative_eq!(n[1].abs(), n[2].abs(), epsilon = 1e-5);
        }
    }
}
