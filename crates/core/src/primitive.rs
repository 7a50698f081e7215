use glam::{Mat4, Vec3};

use crate::attributes::{Attribute, AttributeType, Attributes};
use crate::mesh::{Aabb, Mesh, PointList, PolygonList};

pub type EdgeList = Vec<[u32; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Mesh,
    Points,
    Segments,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Mesh => "Mesh",
            PrimitiveKind::Points => "PrimPoints",
            PrimitiveKind::Segments => "SegmentPrim",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Mesh" => Some(PrimitiveKind::Mesh),
            "PrimPoints" => Some(PrimitiveKind::Points),
            "SegmentPrim" => Some(PrimitiveKind::Segments),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimPoints {
    pub points: PointList,
    pub attributes: Attributes,
    pub matrix: Mat4,
}

impl Default for PrimPoints {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            attributes: Attributes::new(),
            matrix: Mat4::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPrim {
    pub points: PointList,
    pub edges: EdgeList,
    pub attributes: Attributes,
    pub matrix: Mat4,
}

impl Default for SegmentPrim {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            edges: Vec::new(),
            attributes: Attributes::new(),
            matrix: Mat4::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Mesh(Mesh),
    Points(PrimPoints),
    Segments(SegmentPrim),
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Mesh => Primitive::Mesh(Mesh::new()),
            PrimitiveKind::Points => Primitive::Points(PrimPoints::default()),
            PrimitiveKind::Segments => Primitive::Segments(SegmentPrim::default()),
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Mesh(_) => PrimitiveKind::Mesh,
            Primitive::Points(_) => PrimitiveKind::Points,
            Primitive::Segments(_) => PrimitiveKind::Segments,
        }
    }

    pub fn points(&self) -> &PointList {
        match self {
            Primitive::Mesh(m) => &m.points,
            Primitive::Points(p) => &p.points,
            Primitive::Segments(s) => &s.points,
        }
    }

    pub fn points_mut(&mut self) -> &mut PointList {
        match self {
            Primitive::Mesh(m) => &mut m.points,
            Primitive::Points(p) => &mut p.points,
            Primitive::Segments(s) => &mut s.points,
        }
    }

    pub fn polys(&self) -> Option<&PolygonList> {
        match self {
            Primitive::Mesh(m) => Some(&m.polys),
            _ => None,
        }
    }

    pub fn edges(&self) -> Option<&EdgeList> {
        match self {
            Primitive::Segments(s) => Some(&s.edges),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Primitive::Mesh(m) => &m.attributes,
            Primitive::Points(p) => &p.attributes,
            Primitive::Segments(s) => &s.attributes,
        }
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        match self {
            Primitive::Mesh(m) => &mut m.attributes,
            Primitive::Points(p) => &mut p.attributes,
            Primitive::Segments(s) => &mut s.attributes,
        }
    }

    pub fn attribute(&self, name: &str, attribute_type: AttributeType) -> Option<&Attribute> {
        self.attributes().get(name, attribute_type)
    }

    pub fn add_attribute(
        &mut self,
        name: &str,
        attribute_type: AttributeType,
        size: usize,
    ) -> &mut Attribute {
        self.attributes_mut().add(name, attribute_type, size)
    }

    pub fn remove_attribute(
        &mut self,
        name: &str,
        attribute_type: AttributeType,
    ) -> Option<Attribute> {
        self.attributes_mut().remove(name, attribute_type)
    }

    pub fn matrix(&self) -> Mat4 {
        match self {
            Primitive::Mesh(m) => m.matrix,
            Primitive::Points(p) => p.matrix,
            Primitive::Segments(s) => s.matrix,
        }
    }

    pub fn set_matrix(&mut self, matrix: Mat4) {
        match self {
            Primitive::Mesh(m) => m.matrix = matrix,
            Primitive::Points(p) => p.matrix = matrix,
            Primitive::Segments(s) => s.matrix = matrix,
        }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let matrix = self.matrix();
        let world: Vec<Vec3> = self
            .points()
            .iter()
            .map(|p| matrix.transform_point3(*p))
            .collect();
        Aabb::from_points(&world)
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Primitive::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match self {
            Primitive::Mesh(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Mesh> for Primitive {
    fn from(mesh: Mesh) -> Self {
        Primitive::Mesh(mesh)
    }
}

impl From<PrimPoints> for Primitive {
    fn from(points: PrimPoints) -> Self {
        Primitive::Points(points)
    }
}

impl From<SegmentPrim> for Primitive {
    fn from(segments: SegmentPrim) -> Self {
        Primitive::Segments(segments)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveCollection {
    primitives: Vec<Primitive>,
}

impl PrimitiveCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self, kind: PrimitiveKind) -> &mut Primitive {
        self.add(Primitive::new(kind))
    }

    /// Like [`PrimitiveCollection::build`] but keyed by type name
    /// (`"Mesh"`, `"PrimPoints"`, `"SegmentPrim"`).
    pub fn build_by_name(&mut self, name: &str) -> Option<&mut Primitive> {
        PrimitiveKind::from_name(name).map(|kind| self.build(kind))
    }

    pub fn add(&mut self, primitive: impl Into<Primitive>) -> &mut Primitive {
        let index = self.primitives.len();
        self.primitives.push(primitive.into());
        &mut self.primitives[index]
    }

    /// Moves every primitive of `other` into `self`, leaving `other` empty.
    pub fn merge(&mut self, other: &mut PrimitiveCollection) {
        self.primitives.append(&mut other.primitives);
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Primitive> {
        self.primitives.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Primitive> {
        self.primitives.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Primitive> {
        self.primitives.iter_mut()
    }

    pub fn iter_kind(&self, kind: PrimitiveKind) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(move |p| p.kind() == kind)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.primitives.iter().filter_map(Primitive::as_mesh)
    }

    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut Mesh> {
        self.primitives.iter_mut().filter_map(Primitive::as_mesh_mut)
    }

    pub fn point_count(&self) -> usize {
        self.primitives.iter().map(|p| p.points().len()).sum()
    }
}

impl IntoIterator for PrimitiveCollection {
    type Item = Primitive;
    type IntoIter = std::vec::IntoIter<Primitive>;

    fn into_iter(self) -> Self::IntoIter {
        self.primitives.into_iter()
    }
}
