use std::sync::Arc;

use crate::attributes::AttributeType;
use crate::eval::ProcessContext;
use crate::node::{Node, NodeDefinition, NodeError, NodeOp};
use crate::nodes::{attribute, color, displace, fur, generators, merge, normal, points, transform};
use crate::params::{Properties, PropertyKind};
use crate::registry::{NodeRegistry, RegistryError};

pub const GEOMETRY_CATEGORY: &str = "Geometry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinNodeKind {
    Output,
    Box,
    Grid,
    Torus,
    Circle,
    Tube,
    Cone,
    IcoSphere,
    Transform,
    Normal,
    Noise,
    Color,
    MergeCollection,
    PointCloud,
    ScatterPoints,
    AttributeCreate,
    AttributeDelete,
    AttributeRandomise,
    Fur,
}

impl BuiltinNodeKind {
    pub const REGISTERED: [BuiltinNodeKind; 18] = [
        BuiltinNodeKind::Box,
        BuiltinNodeKind::Grid,
        BuiltinNodeKind::Torus,
        BuiltinNodeKind::Transform,
        BuiltinNodeKind::Circle,
        BuiltinNodeKind::Tube,
        BuiltinNodeKind::IcoSphere,
        BuiltinNodeKind::Cone,
        BuiltinNodeKind::Noise,
        BuiltinNodeKind::Normal,
        BuiltinNodeKind::Color,
        BuiltinNodeKind::MergeCollection,
        BuiltinNodeKind::PointCloud,
        BuiltinNodeKind::ScatterPoints,
        BuiltinNodeKind::AttributeCreate,
        BuiltinNodeKind::AttributeDelete,
        BuiltinNodeKind::AttributeRandomise,
        BuiltinNodeKind::Fur,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinNodeKind::Output => "Output",
            BuiltinNodeKind::Box => "Box",
            BuiltinNodeKind::Grid => "Grid",
            BuiltinNodeKind::Torus => "Torus",
            BuiltinNodeKind::Circle => "Circle",
            BuiltinNodeKind::Tube => "Tube",
            BuiltinNodeKind::Cone => "Cone",
            BuiltinNodeKind::IcoSphere => "IcoSphere",
            BuiltinNodeKind::Transform => "Transform",
            BuiltinNodeKind::Normal => "Normal",
            BuiltinNodeKind::Noise => "Noise",
            BuiltinNodeKind::Color => "Color",
            BuiltinNodeKind::MergeCollection => "Merge Collection",
            BuiltinNodeKind::PointCloud => "Point Cloud",
            BuiltinNodeKind::ScatterPoints => "Scatter Points",
            BuiltinNodeKind::AttributeCreate => "Attribute Create",
            BuiltinNodeKind::AttributeDelete => "Attribute Delete",
            BuiltinNodeKind::AttributeRandomise => "Attribute Randomise",
            BuiltinNodeKind::Fur => "Fur",
        }
    }
}

pub fn builtin_kind_from_name(name: &str) -> Option<BuiltinNodeKind> {
    if name == BuiltinNodeKind::Output.name() {
        return Some(BuiltinNodeKind::Output);
    }
    BuiltinNodeKind::REGISTERED
        .into_iter()
        .find(|kind| kind.name() == name)
}

pub fn builtin_definitions() -> Vec<NodeDefinition> {
    BuiltinNodeKind::REGISTERED
        .into_iter()
        .map(node_definition)
        .collect()
}

pub fn node_definition(kind: BuiltinNodeKind) -> NodeDefinition {
    let sockets = |names: &[&str]| names.iter().map(|name| name.to_string()).collect::<Vec<_>>();
    let (inputs, outputs) = match kind {
        BuiltinNodeKind::Output => (sockets(&["Primitive"]), Vec::new()),
        BuiltinNodeKind::Box | BuiltinNodeKind::Grid | BuiltinNodeKind::Torus => {
            (Vec::new(), sockets(&["Prim"]))
        }
        BuiltinNodeKind::Circle
        | BuiltinNodeKind::Tube
        | BuiltinNodeKind::Cone
        | BuiltinNodeKind::IcoSphere
        | BuiltinNodeKind::PointCloud => (Vec::new(), sockets(&["Primitive"])),
        BuiltinNodeKind::Transform => (sockets(&["Prim"]), sockets(&["Prim"])),
        BuiltinNodeKind::MergeCollection => (sockets(&["input1", "input2"]), sockets(&["output"])),
        BuiltinNodeKind::Normal
        | BuiltinNodeKind::Noise
        | BuiltinNodeKind::Color
        | BuiltinNodeKind::ScatterPoints
        | BuiltinNodeKind::AttributeCreate
        | BuiltinNodeKind::AttributeDelete
        | BuiltinNodeKind::AttributeRandomise
        | BuiltinNodeKind::Fur => (sockets(&["input"]), sockets(&["output"])),
    };
    let category = match kind {
        BuiltinNodeKind::Output => "Output",
        _ => GEOMETRY_CATEGORY,
    };

    NodeDefinition {
        name: kind.name().to_string(),
        category: category.to_string(),
        inputs,
        outputs,
    }
}

pub fn default_params(kind: BuiltinNodeKind) -> Properties {
    let mut props = Properties::new();
    match kind {
        BuiltinNodeKind::Output | BuiltinNodeKind::MergeCollection => {}
        BuiltinNodeKind::Box => {
            props.add("Size", PropertyKind::Vec3).range(0.0, 10.0).default_vec3([1.0, 1.0, 1.0]);
            props.add("Center", PropertyKind::Vec3).range(-10.0, 10.0);
            props.add("Uniform Scale", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
        }
        BuiltinNodeKind::Grid => {
            props.add("Center", PropertyKind::Vec3).range(-10.0, 10.0);
            props
                .add("Size", PropertyKind::Vec3)
                .range(0.0, 10.0)
                .default_vec3([1.0, 1.0, 1.0])
                .tooltip("X spans the rows, Y spans the columns along Z");
            props.add("Rows", PropertyKind::Int).range(2.0, 100.0).default_int(2);
            props.add("Columns", PropertyKind::Int).range(2.0, 100.0).default_int(2);
        }
        BuiltinNodeKind::Torus => {
            props.add("Center", PropertyKind::Vec3).range(-10.0, 10.0);
            props.add("Major Radius", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
            props.add("Minor Radius", PropertyKind::Float).range(0.0, 10.0).default_float(0.25);
            props.add("Major Segment", PropertyKind::Int).range(4.0, 100.0).default_int(48);
            props.add("Minor Segment", PropertyKind::Int).range(4.0, 100.0).default_int(24);
            props.add("Uniform Scale", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
        }
        BuiltinNodeKind::Circle => {
            props.add("Vertices", PropertyKind::Int).range(3.0, 500.0).default_int(32);
            props.add("Radius", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
        }
        BuiltinNodeKind::Tube => {
            props.add("Vertices", PropertyKind::Int).range(3.0, 500.0).default_int(32);
            props.add("Radius", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
            props.add("Depth", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
        }
        BuiltinNodeKind::Cone => {
            props.add("Vertices", PropertyKind::Int).range(3.0, 500.0).default_int(32);
            props.add("Minor Radius", PropertyKind::Float).range(0.0, 10.0).default_float(0.0);
            props.add("Major Radius", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
            props.add("Depth", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
        }
        BuiltinNodeKind::IcoSphere => {
            props.add("Radius", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
        }
        BuiltinNodeKind::Transform => {
            props
                .add("Transform Order", PropertyKind::Enum)
                .enum_items(&[("Pre Transform", 0), ("Post Transform", 1)]);
            props.add("Rotation Order", PropertyKind::Enum).enum_items(&[
                ("X Y Z", 0),
                ("X Z Y", 1),
                ("Y X Z", 2),
                ("Y Z X", 3),
                ("Z X Y", 4),
                ("Z Y X", 5),
            ]);
            props.add("Translate", PropertyKind::Vec3).range(-10.0, 10.0);
            props
                .add("Rotate", PropertyKind::Vec3)
                .range(0.0, 360.0)
                .tooltip("Degrees around each axis");
            props.add("Scale", PropertyKind::Vec3).range(0.0, 10.0).default_vec3([1.0, 1.0, 1.0]);
            props.add("Pivot", PropertyKind::Vec3).range(-10.0, 10.0);
            props.add("Uniform Scale", PropertyKind::Float).range(0.0, 1000.0).default_float(1.0);
            props.add("Invert Transformation", PropertyKind::Bool);
        }
        BuiltinNodeKind::Normal => {
            props
                .add("Flip", PropertyKind::Bool)
                .tooltip("Normalize and reverse the accumulated normals");
        }
        BuiltinNodeKind::Noise => {
            props.add("Octaves", PropertyKind::Int).range(1.0, 10.0).default_int(1);
            props.add("Frequency", PropertyKind::Float).range(0.0, 1.0).default_float(1.0);
            props.add("Amplitude", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
            props.add("Persistence", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
            props.add("Lacunarity", PropertyKind::Float).range(0.0, 10.0).default_float(2.0);
        }
        BuiltinNodeKind::Color => {
            props
                .add("Scope", PropertyKind::Enum)
                .enum_items(&[("Vertex", color::SCOPE_VERTEX), ("Primitive", color::SCOPE_PRIMITIVE)])
                .hidden();
            props
                .add("Fill Method", PropertyKind::Enum)
                .enum_items(&[("Unique", color::FILL_UNIQUE), ("Random", color::FILL_RANDOM)]);
            props.add("Color", PropertyKind::Vec3).range(0.0, 1.0).default_vec3([1.0, 1.0, 1.0]);
            props
                .add("Seed", PropertyKind::Int)
                .range(1.0, 100_000.0)
                .default_int(1)
                .hidden();
        }
        BuiltinNodeKind::PointCloud => {
            props.add("Points Count", PropertyKind::Int).range(1.0, 100_000.0).default_int(1000);
            props.add("BBox Min", PropertyKind::Vec3).range(-10.0, 10.0).default_vec3([-1.0, -1.0, -1.0]);
            props.add("BBox Max", PropertyKind::Vec3).range(-10.0, 10.0).default_vec3([1.0, 1.0, 1.0]);
        }
        BuiltinNodeKind::ScatterPoints => {
            props.add("Points Count", PropertyKind::Int).range(1.0, 100_000.0).default_int(1000);
            props.add("Seed", PropertyKind::Int).range(0.0, 100_000.0).default_int(1);
        }
        BuiltinNodeKind::AttributeCreate | BuiltinNodeKind::AttributeDelete => {
            attribute_key_params(&mut props);
        }
        BuiltinNodeKind::AttributeRandomise => {
            attribute_key_params(&mut props);
            props.add("Seed", PropertyKind::Int).range(0.0, 100_000.0).default_int(1);
            props.add("Min", PropertyKind::Float).range(-1000.0, 1000.0).default_float(0.0);
            props.add("Max", PropertyKind::Float).range(-1000.0, 1000.0).default_float(1.0);
        }
        BuiltinNodeKind::Fur => {
            props.add("Segments", PropertyKind::Int).range(1.0, 100.0).default_int(4);
            props.add("Length", PropertyKind::Float).range(0.0, 10.0).default_float(1.0);
            props
                .add("Use Normals", PropertyKind::Bool)
                .tooltip("Grow along the \"normal\" attribute instead of Direction");
            props.add("Direction", PropertyKind::Vec3).range(-1.0, 1.0).default_vec3([0.0, 1.0, 0.0]);
        }
    }
    props
}

fn attribute_key_params(props: &mut Properties) {
    props.add("Name", PropertyKind::String).default_string("attribute");
    let items: Vec<(&str, i32)> = AttributeType::ALL
        .iter()
        .enumerate()
        .map(|(index, ty)| (ty.name(), index as i32))
        .collect();
    let float = AttributeType::ALL
        .iter()
        .position(|ty| *ty == AttributeType::Float)
        .unwrap_or(0) as i32;
    props.add("Type", PropertyKind::Enum).enum_items(&items).default_int(float);
}

pub fn create_node(kind: BuiltinNodeKind) -> Node {
    let mut node = Node::new(node_definition(kind), default_params(kind), Arc::new(kind));
    node.update_properties();
    node
}

pub fn output_node() -> Node {
    create_node(BuiltinNodeKind::Output)
}

pub fn register_builtin_nodes(registry: &mut NodeRegistry) -> Result<(), RegistryError> {
    for kind in BuiltinNodeKind::REGISTERED {
        registry.register(GEOMETRY_CATEGORY, kind.name(), move || create_node(kind))?;
    }
    Ok(())
}

pub fn builtin_registry() -> Result<NodeRegistry, RegistryError> {
    let mut registry = NodeRegistry::new();
    register_builtin_nodes(&mut registry)?;
    Ok(registry)
}

impl NodeOp for BuiltinNodeKind {
    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), NodeError> {
        match self {
            // the captured collection is the seeded one
            BuiltinNodeKind::Output => Ok(()),
            BuiltinNodeKind::Box => generators::process_box(ctx),
            BuiltinNodeKind::Grid => generators::process_grid(ctx),
            BuiltinNodeKind::Torus => generators::process_torus(ctx),
            BuiltinNodeKind::Circle => generators::process_circle(ctx),
            BuiltinNodeKind::Tube => generators::process_tube(ctx),
            BuiltinNodeKind::Cone => generators::process_cone(ctx),
            BuiltinNodeKind::IcoSphere => generators::process_icosphere(ctx),
            BuiltinNodeKind::Transform => transform::process(ctx),
            BuiltinNodeKind::Normal => normal::process(ctx),
            BuiltinNodeKind::Noise => displace::process(ctx),
            BuiltinNodeKind::Color => color::process(ctx),
            BuiltinNodeKind::MergeCollection => merge::process(ctx),
            BuiltinNodeKind::PointCloud => points::process_point_cloud(ctx),
            BuiltinNodeKind::ScatterPoints => points::process_scatter(ctx),
            BuiltinNodeKind::AttributeCreate => attribute::process_create(ctx),
            BuiltinNodeKind::AttributeDelete => attribute::process_delete(ctx),
            BuiltinNodeKind::AttributeRandomise => attribute::process_randomise(ctx),
            BuiltinNodeKind::Fur => fur::process(ctx),
        }
    }

    fn update_properties(&self, properties: &mut Properties) -> bool {
        match self {
            BuiltinNodeKind::Color => color::update_properties(properties),
            BuiltinNodeKind::Fur => fur::update_properties(properties),
            _ => false,
        }
    }
}
