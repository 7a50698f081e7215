//! JSON graph plans for headless runs.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": "ring", "type": "Torus", "properties": { "Major Radius": 2.0 } },
//!     { "id": "paint", "type": "Color", "name": "Paint", "properties": { "Fill Method": "Random" } }
//!   ],
//!   "links": ["ring.Prim -> paint.input", "paint.output -> output.Primitive"],
//!   "active": "ring"
//! }
//! ```
//!
//! The Output node every graph starts with is addressed as `output`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use procgraph_core::{Graph, NodeId, NodeRegistry, ParamValue, Properties, PropertyError, PropertyKind};
use serde::Deserialize;

use crate::AppError;

pub const OUTPUT_KEY: &str = "output";

const DEMO_PLAN: &str = r#"{
  "nodes": [
    { "id": "ring", "type": "Torus", "properties": { "Major Radius": 1.5, "Minor Radius": 0.4 } },
    {
      "id": "lift",
      "type": "Transform",
      "properties": {
        "Transform Order": "Post Transform",
        "Translate": [0.0, 1.0, 0.0],
        "Rotate": [90.0, 0.0, 0.0]
      }
    },
    { "id": "base", "type": "Box", "properties": { "Size": [4.0, 0.2, 4.0] } },
    { "id": "merge", "type": "Merge Collection" },
    { "id": "normals", "type": "Normal" },
    { "id": "paint", "type": "Color", "properties": { "Fill Method": "Random", "Seed": 7 } }
  ],
  "links": [
    "ring.Prim -> lift.Prim",
    "lift.Prim -> merge.input1",
    "base.Prim -> merge.input2",
    "merge.output -> normals.input",
    "normals.output -> paint.input",
    "paint.output -> output.Primitive"
  ],
  "active": "lift"
}"#;

#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    pub nodes: Vec<PlanNode>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub active: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanNode {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PlanValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PlanValue {
    Bool(bool),
    Number(f64),
    Vec3([f32; 3]),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node: String,
    pub socket: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEnds {
    pub from: Endpoint,
    pub to: Endpoint,
}

pub struct BuiltPlan {
    pub graph: Graph,
    pub ids: HashMap<String, NodeId>,
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn demo() -> Result<Self, AppError> {
        Ok(serde_json::from_str(DEMO_PLAN)?)
    }
}

fn parse_endpoint(text: &str) -> Option<Endpoint> {
    let (node, socket) = text.trim().split_once('.')?;
    let (node, socket) = (node.trim(), socket.trim());
    (!node.is_empty() && !socket.is_empty()).then(|| Endpoint {
        node: node.to_string(),
        socket: socket.to_string(),
    })
}

pub fn parse_link(text: &str) -> Result<LinkEnds, AppError> {
    let bad = || AppError::BadLink(text.to_string());
    let (from, to) = text.split_once("->").ok_or_else(bad)?;
    Ok(LinkEnds {
        from: parse_endpoint(from).ok_or_else(bad)?,
        to: parse_endpoint(to).ok_or_else(bad)?,
    })
}

pub fn apply_property(props: &mut Properties, name: &str, value: &PlanValue) -> Result<(), PropertyError> {
    let kind = props
        .get(name)
        .ok_or_else(|| PropertyError::Unknown(name.to_string()))?
        .kind;
    match (kind, value) {
        (PropertyKind::Enum, PlanValue::Text(label)) => props.set_enum_label(name, label),
        (PropertyKind::Int | PropertyKind::Enum, PlanValue::Number(n)) if n.fract() == 0.0 => {
            props.set(name, ParamValue::Int(*n as i32))
        }
        (PropertyKind::Float, PlanValue::Number(n)) => props.set(name, ParamValue::Float(*n as f32)),
        (PropertyKind::Bool, PlanValue::Bool(b)) => props.set(name, ParamValue::Bool(*b)),
        (PropertyKind::Vec3, PlanValue::Vec3(v)) => props.set(name, ParamValue::Vec3(*v)),
        (
            PropertyKind::String | PropertyKind::InputFile | PropertyKind::OutputFile,
            PlanValue::Text(text),
        ) => props.set(name, ParamValue::String(text.clone())),
        _ => Err(PropertyError::TypeMismatch {
            name: name.to_string(),
            expected: kind,
        }),
    }
}

fn lookup(ids: &HashMap<String, NodeId>, key: &str) -> Result<NodeId, AppError> {
    ids.get(key)
        .copied()
        .ok_or_else(|| AppError::UnknownNode(key.to_string()))
}

pub fn build_graph(plan: &Plan, registry: &NodeRegistry) -> Result<BuiltPlan, AppError> {
    let mut graph = Graph::new();
    let mut ids = HashMap::new();
    ids.insert(OUTPUT_KEY.to_string(), graph.output());

    for entry in &plan.nodes {
        if ids.contains_key(&entry.id) {
            return Err(AppError::DuplicateNode(entry.id.clone()));
        }
        let mut node = registry
            .create(&entry.type_name)
            .ok_or_else(|| AppError::UnknownNodeType(entry.type_name.clone()))?;
        if let Some(name) = &entry.name {
            node.set_name(name.clone());
        }
        for (name, value) in &entry.properties {
            apply_property(node.properties_mut(), name, value).map_err(|source| AppError::Property {
                node: entry.id.clone(),
                source,
            })?;
        }
        node.update_properties();
        let id = graph.add(node);
        tracing::debug!(key = %entry.id, node = %id, "plan node created");
        ids.insert(entry.id.clone(), id);
    }

    for text in &plan.links {
        let link = parse_link(text)?;
        let from = graph.find_output(lookup(&ids, &link.from.node)?, &link.from.socket)?;
        let to = graph.find_input(lookup(&ids, &link.to.node)?, &link.to.socket)?;
        graph.connect(from, to)?;
    }

    if let Some(active) = &plan.active {
        graph.set_active_node(Some(lookup(&ids, active)?))?;
    }

    Ok(BuiltPlan { graph, ids })
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgraph_core::{builtin_registry, evaluate, EvalState, GraphError};

    fn plan(json: &str) -> Plan {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn demo_plan_builds_and_evaluates() {
        let registry = builtin_registry().unwrap();
        let built = build_graph(&Plan::demo().unwrap(), &registry).unwrap();
        let mut graph = built.graph;
        assert_eq!(graph.len(), 7);
        assert_eq!(graph.active_node(), Some(built.ids["lift"]));

        let paint = graph.node(built.ids["paint"]).unwrap();
        assert!(paint.properties().is_visible("Seed").unwrap());
        assert_eq!(paint.properties().eval_int("Seed").unwrap(), 7);

        let mut state = EvalState::new();
        let report = evaluate(&mut graph, &mut state).unwrap();
        assert!(report.errors.is_empty());
        assert!(report.output_valid);
        assert_eq!(report.order.last(), Some(&graph.output()));
        assert_eq!(state.output(&graph).unwrap().len(), 2);
        // the active node keeps its result after handing it downstream
        assert_eq!(state.collection(built.ids["lift"]).unwrap().len(), 1);
    }

    #[test]
    fn links_are_parsed_with_loose_spacing() {
        let link = parse_link(" a.Merge Collection->b.input2 ").unwrap();
        assert_eq!(link.from.node, "a");
        assert_eq!(link.from.socket, "Merge Collection");
        assert_eq!(link.to.socket, "input2");

        assert!(matches!(parse_link("a.out b.in"), Err(AppError::BadLink(_))));
        assert!(matches!(parse_link("a -> b.in"), Err(AppError::BadLink(_))));
        assert!(matches!(parse_link(".out -> b.in"), Err(AppError::BadLink(_))));
    }

    #[test]
    fn overrides_follow_property_kinds() {
        let registry = builtin_registry().unwrap();
        let mut node = registry.create("Transform").unwrap();
        let props = node.properties_mut();

        apply_property(props, "Rotation Order", &PlanValue::Text("Z Y X".into())).unwrap();
        assert_eq!(props.eval_enum("Rotation Order").unwrap(), 5);
        apply_property(props, "Rotation Order", &PlanValue::Number(1.0)).unwrap();
        assert_eq!(props.eval_enum("Rotation Order").unwrap(), 1);
        apply_property(props, "Uniform Scale", &PlanValue::Number(2.0)).unwrap();
        assert_eq!(props.eval_float("Uniform Scale").unwrap(), 2.0);

        assert!(matches!(
            apply_property(props, "Invert Transformation", &PlanValue::Number(1.0)),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert!(matches!(
            apply_property(props, "Rotation Order", &PlanValue::Text("W".into())),
            Err(PropertyError::UnknownEnumLabel { .. })
        ));
        assert!(matches!(
            apply_property(props, "Shear", &PlanValue::Bool(true)),
            Err(PropertyError::Unknown(_))
        ));

        let mut grid = registry.create("Grid").unwrap();
        assert!(matches!(
            apply_property(grid.properties_mut(), "Rows", &PlanValue::Number(2.5)),
            Err(PropertyError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn broken_plans_are_refused() {
        let registry = builtin_registry().unwrap();

        let err = build_graph(&plan(r#"{"nodes": [{"id": "a", "type": "Teapot"}]}"#), &registry)
            .err()
            .unwrap();
        assert!(matches!(err, AppError::UnknownNodeType(name) if name == "Teapot"));

        let err = build_graph(
            &plan(r#"{"nodes": [{"id": "a", "type": "Box"}, {"id": "a", "type": "Grid"}]}"#),
            &registry,
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::DuplicateNode(_)));

        let err = build_graph(
            &plan(r#"{"nodes": [{"id": "a", "type": "Box"}], "links": ["a.Prim -> b.input"]}"#),
            &registry,
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::UnknownNode(key) if key == "b"));

        let err = build_graph(
            &plan(r#"{"nodes": [{"id": "a", "type": "Box"}], "links": ["a.Mesh -> output.Primitive"]}"#),
            &registry,
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::Graph(GraphError::SocketNotFound { .. })));

        let err = build_graph(
            &plan(r#"{"nodes": [{"id": "a", "type": "Box", "properties": {"Size": true}}]}"#),
            &registry,
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::Property { node, .. } if node == "a"));
    }

    #[test]
    fn cyclic_links_are_refused() {
        let registry = builtin_registry().unwrap();
        let json = r#"{
            "nodes": [{"id": "a", "type": "Normal"}, {"id": "b", "type": "Normal"}],
            "links": ["a.output -> b.input", "b.output -> a.input"]
        }"#;
        let err = build_graph(&plan(json), &registry).err().unwrap();
        assert!(matches!(err, AppError::Graph(GraphError::WouldCycle { .. })));
    }
}
