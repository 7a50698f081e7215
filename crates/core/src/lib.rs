mod attributes;
mod eval;
mod fractal;
mod graph;
mod mesh;
mod mesh_primitives;
mod node;
mod nodes;
mod nodes_builtin;
mod params;
mod primitive;
mod registry;
mod scene;

pub use attributes::{Attribute, AttributeData, AttributeType, Attributes};
pub use eval::{evaluate, EvalError, EvalNodeReport, EvalReport, EvalState, ProcessContext};
pub use fractal::FractalNoise;
pub use graph::{Graph, GraphError, GraphStats, InputRef, NodeId, OutputRef};
pub use mesh::{face_normal, Aabb, Mesh, PointList, PolygonList, INVALID_INDEX};
pub use mesh_primitives::{
    make_box, make_circle, make_cylinder, make_grid, make_icosphere, make_torus,
};
pub use node::{InputSocket, Node, NodeDefinition, NodeError, NodeOp, OutputSocket};
pub use nodes_builtin::{
    builtin_definitions, builtin_kind_from_name, builtin_registry, create_node, default_params,
    node_definition, output_node, register_builtin_nodes, BuiltinNodeKind, GEOMETRY_CATEGORY,
};
pub use params::{EnumItem, ParamValue, Properties, Property, PropertyError, PropertyKind};
pub use primitive::{
    EdgeList, PrimPoints, Primitive, PrimitiveCollection, PrimitiveKind, SegmentPrim,
};
pub use registry::{NodeConstructor, NodeRegistry, RegistryError};
pub use scene::{SceneLines, SceneMesh, ScenePoints, SceneSnapshot};
