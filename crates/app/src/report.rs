use std::io::{self, Write};

use procgraph_core::{
    Aabb, EvalReport, EvalState, Graph, NodeRegistry, ParamValue, PrimitiveCollection, Property,
    PropertyKind, SceneSnapshot,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneStats {
    pub meshes: usize,
    pub point_sets: usize,
    pub line_sets: usize,
    pub triangles: usize,
    pub vertices: usize,
    pub bounds: Option<Aabb>,
}

impl SceneStats {
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Self {
        Self {
            meshes: snapshot.meshes.len(),
            point_sets: snapshot.points.len(),
            line_sets: snapshot.lines.len(),
            triangles: snapshot.triangle_count(),
            vertices: snapshot.vertex_count(),
            bounds: snapshot.bounds,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub report: &'a EvalReport,
    pub scene: SceneStats,
    pub active: Option<SceneStats>,
}

impl<'a> RunSummary<'a> {
    pub fn collect(report: &'a EvalReport, graph: &Graph, state: &EvalState) -> Self {
        Self {
            report,
            scene: state.output(graph).map(stats_of).unwrap_or_default(),
            active: graph
                .active_node()
                .and_then(|id| state.collection(id))
                .map(stats_of),
        }
    }
}

fn stats_of(collection: &PrimitiveCollection) -> SceneStats {
    SceneStats::from_snapshot(&SceneSnapshot::from_collection(collection))
}

#[derive(Debug, Serialize)]
pub struct NodeTypeListing {
    pub category: String,
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub properties: Vec<Property>,
}

pub fn node_type_listings(registry: &NodeRegistry) -> Vec<NodeTypeListing> {
    registry
        .categories()
        .flat_map(move |category| registry.names(category).map(move |name| (category, name)))
        .filter_map(|(category, name)| {
            let node = registry.create_in(category, name)?;
            Some(NodeTypeListing {
                category: category.to_string(),
                name: name.to_string(),
                inputs: node.inputs().iter().map(|s| s.name.clone()).collect(),
                outputs: node.outputs().iter().map(|s| s.name.clone()).collect(),
                properties: node.properties().iter().cloned().collect(),
            })
        })
        .collect()
}

fn format_value(property: &Property, value: &ParamValue) -> String {
    match value {
        ParamValue::Int(v) if property.kind == PropertyKind::Enum => property
            .items()
            .iter()
            .find(|item| item.value == *v)
            .map(|item| item.label.clone())
            .unwrap_or_else(|| v.to_string()),
        ParamValue::Bool(v) => v.to_string(),
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Float(v) => format!("{v:.3}"),
        ParamValue::Vec3([x, y, z]) => format!("({x:.3}, {y:.3}, {z:.3})"),
        ParamValue::String(v) => format!("{v:?}"),
    }
}

fn write_property(out: &mut impl Write, property: &Property) -> io::Result<()> {
    write!(
        out,
        "    {:<22} {:<7} default {}",
        property.name,
        property.kind.name(),
        format_value(property, property.default_param())
    )?;
    if let Some((min, max)) = property.bounds() {
        write!(out, " in [{min}, {max}]")?;
    }
    if !property.visible {
        write!(out, " (hidden)")?;
    }
    writeln!(out)?;
    if !property.items().is_empty() {
        let labels: Vec<_> = property
            .items()
            .iter()
            .map(|item| format!("{}={}", item.value, item.label))
            .collect();
        writeln!(out, "      items: {}", labels.join(", "))?;
    }
    if let Some(tooltip) = &property.tooltip {
        writeln!(out, "      {tooltip}")?;
    }
    Ok(())
}

pub fn write_node_types(out: &mut impl Write, registry: &NodeRegistry) -> io::Result<()> {
    let mut category = None;
    for listing in node_type_listings(registry) {
        if category.as_deref() != Some(listing.category.as_str()) {
            writeln!(out, "[{}]", listing.category)?;
            category = Some(listing.category.clone());
        }
        writeln!(
            out,
            "  {}  in: [{}]  out: [{}]",
            listing.name,
            listing.inputs.join(", "),
            listing.outputs.join(", ")
        )?;
        for property in &listing.properties {
            write_property(out, property)?;
        }
    }
    Ok(())
}

fn write_stats(out: &mut impl Write, label: &str, stats: &SceneStats) -> io::Result<()> {
    writeln!(
        out,
        "{label}: {} mesh(es), {} point set(s), {} line set(s), {} triangles, {} vertices",
        stats.meshes, stats.point_sets, stats.line_sets, stats.triangles, stats.vertices
    )?;
    if let Some(bounds) = &stats.bounds {
        writeln!(out, "  bounds {:?} .. {:?}", bounds.min, bounds.max)?;
    }
    Ok(())
}

pub fn write_summary(out: &mut impl Write, graph: &Graph, summary: &RunSummary<'_>) -> io::Result<()> {
    let report = summary.report;
    writeln!(out, "evaluation order ({} nodes):", report.order.len())?;
    for (index, id) in report.order.iter().enumerate() {
        let Some(node) = report.nodes.get(id) else {
            continue;
        };
        let marker = if graph.active_node() == Some(*id) { "*" } else { " " };
        writeln!(
            out,
            "{marker}{:>3}. {:<20} {:<20} {:>8.3} ms  {} prim(s), {} point(s)",
            index + 1,
            node.name,
            node.type_name,
            node.duration_ms,
            node.primitive_count,
            node.point_count
        )?;
        for warning in &node.warnings {
            writeln!(out, "       warning: {warning}")?;
        }
        if let Some(error) = &node.error {
            writeln!(out, "       error: {error}")?;
        }
    }
    writeln!(
        out,
        "{} warning(s), {} error(s), {:.3} ms total",
        report.warning_count(),
        report.errors.len(),
        report.total_duration_ms()
    )?;

    if report.output_valid {
        write_stats(out, "output", &summary.scene)?;
    } else {
        writeln!(out, "output: nothing reached the Output node")?;
    }
    if let Some(active) = &summary.active {
        write_stats(out, "active node", active)?;
    }
    Ok(())
}
