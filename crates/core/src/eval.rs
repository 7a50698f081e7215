use std::collections::{BTreeMap, HashMap, HashSet};

use glam::Vec3;
use serde::Serialize;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::graph::{Graph, GraphError, NodeId};
use crate::node::{Node, NodeError};
use crate::params::Properties;
use crate::primitive::PrimitiveCollection;

#[derive(Debug, Default)]
pub struct EvalState {
    outputs: BTreeMap<NodeId, PrimitiveCollection>,
    passes: u64,
}

impl EvalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection a node produced in the last pass. A collection moved on
    /// to its last consumer is left empty, except for the active node's.
    pub fn collection(&self, node: NodeId) -> Option<&PrimitiveCollection> {
        self.outputs.get(&node)
    }

    pub fn output<'a>(&'a self, graph: &Graph) -> Option<&'a PrimitiveCollection> {
        self.outputs.get(&graph.output())
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum EvalError {
    #[error("node {node} failed: {message}")]
    Node { node: NodeId, message: String },
    #[error("node {node} skipped, upstream node {upstream} failed")]
    Upstream { node: NodeId, upstream: NodeId },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvalNodeReport {
    pub name: String,
    pub type_name: String,
    pub duration_ms: f64,
    pub warnings: Vec<String>,
    pub primitive_count: usize,
    pub point_count: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvalReport {
    pub order: Vec<NodeId>,
    pub nodes: BTreeMap<NodeId, EvalNodeReport>,
    pub errors: Vec<EvalError>,
    pub output_valid: bool,
}

impl EvalReport {
    pub fn warning_count(&self) -> usize {
        self.nodes.values().map(|n| n.warnings.len()).sum()
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.nodes.values().map(|n| n.duration_ms).sum()
    }
}

/// Everything a node may touch while it runs: its own properties, its
/// working collection, and the collections behind its input sockets.
pub struct ProcessContext<'a> {
    node_id: NodeId,
    node: &'a Node,
    outputs: &'a mut BTreeMap<NodeId, PrimitiveCollection>,
    collection: &'a mut PrimitiveCollection,
    warnings: &'a mut Vec<String>,
    pending: &'a HashMap<NodeId, usize>,
    keep: Option<NodeId>,
}

impl<'a> ProcessContext<'a> {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn node_name(&self) -> &str {
        self.node.name()
    }

    pub fn properties(&self) -> &Properties {
        self.node.properties()
    }

    /// The node's working collection. It starts as the collection of the
    /// first input socket (empty when unlinked).
    pub fn collection(&self) -> &PrimitiveCollection {
        &*self.collection
    }

    pub fn collection_mut(&mut self) -> &mut PrimitiveCollection {
        &mut *self.collection
    }

    /// Upstream collection feeding `index`, or `None` when unlinked. The
    /// first input has already been handed to [`ProcessContext::collection`].
    pub fn input_collection(&self, index: usize) -> Result<Option<&PrimitiveCollection>, NodeError> {
        Ok(self
            .upstream(index)?
            .and_then(|upstream| self.outputs.get(&upstream)))
    }

    /// Takes the upstream collection. It is drained when this node is its
    /// last pending consumer and copied otherwise.
    pub fn take_input_collection(&mut self, index: usize) -> Result<PrimitiveCollection, NodeError> {
        Ok(match self.upstream(index)? {
            Some(upstream) => hand_off(self.outputs, upstream, self.pending, self.keep),
            None => PrimitiveCollection::new(),
        })
    }

    pub fn eval_bool(&self, name: &str) -> Result<bool, NodeError> {
        Ok(self.properties().eval_bool(name)?)
    }

    pub fn eval_int(&self, name: &str) -> Result<i32, NodeError> {
        Ok(self.properties().eval_int(name)?)
    }

    pub fn eval_float(&self, name: &str) -> Result<f32, NodeError> {
        Ok(self.properties().eval_float(name)?)
    }

    pub fn eval_vec3(&self, name: &str) -> Result<Vec3, NodeError> {
        Ok(self.properties().eval_vec3(name)?)
    }

    pub fn eval_string(&self, name: &str) -> Result<String, NodeError> {
        Ok(self.properties().eval_string(name)?.to_string())
    }

    pub fn eval_enum(&self, name: &str) -> Result<i32, NodeError> {
        Ok(self.properties().eval_enum(name)?)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(node = self.node.name(), "{message}");
        self.warnings.push(message);
    }

    fn upstream(&self, index: usize) -> Result<Option<NodeId>, NodeError> {
        let socket = self
            .node
            .input(index)
            .ok_or(NodeError::UnknownInput(index))?;
        Ok(socket.link().map(|link| link.node))
    }
}

/// Builds the graph if needed, then runs every node once in evaluation
/// order. Node failures are recorded in the report and do not stop the pass;
/// nodes downstream of a failure are skipped.
pub fn evaluate(graph: &mut Graph, state: &mut EvalState) -> Result<EvalReport, GraphError> {
    graph.build()?;
    let graph: &Graph = graph;

    state.outputs.clear();
    state.passes += 1;

    let order = graph.finished_stack().to_vec();
    let keep = graph.active_node();
    let mut pending: HashMap<NodeId, usize> = order
        .iter()
        .map(|id| (*id, graph.downstream_nodes(*id).len()))
        .collect();
    let mut failed: HashSet<NodeId> = HashSet::new();
    let mut report = EvalReport {
        order: order.clone(),
        ..EvalReport::default()
    };

    for &node_id in &order {
        let Some(node) = graph.node(node_id) else {
            continue;
        };
        let upstream = graph.upstream_nodes(node_id);
        let mut node_report = EvalNodeReport {
            name: node.name().to_string(),
            type_name: node.type_name().to_string(),
            ..EvalNodeReport::default()
        };

        if let Some(&blocked_by) = upstream.iter().find(|id| failed.contains(id)) {
            release(&mut pending, &upstream);
            tracing::warn!(node = node.name(), upstream = %blocked_by, "skipping node, upstream failed");
            failed.insert(node_id);
            node_report.error = Some(format!("upstream node {blocked_by} failed"));
            report.nodes.insert(node_id, node_report);
            report.errors.push(EvalError::Upstream {
                node: node_id,
                upstream: blocked_by,
            });
            continue;
        }

        let mut collection = seed_collection(node, &mut state.outputs, &pending, keep);
        let mut warnings = Vec::new();
        let start = Instant::now();
        let result = {
            let mut ctx = ProcessContext {
                node_id,
                node,
                outputs: &mut state.outputs,
                collection: &mut collection,
                warnings: &mut warnings,
                pending: &pending,
                keep,
            };
            node.op().process(&mut ctx)
        };
        node_report.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        node_report.warnings = warnings;
        release(&mut pending, &upstream);

        match result {
            Ok(()) => {
                node_report.primitive_count = collection.len();
                node_report.point_count = collection.point_count();
                state.outputs.insert(node_id, collection);
            }
            Err(err) => {
                tracing::error!(node = node.name(), "node failed: {err}");
                failed.insert(node_id);
                node_report.error = Some(err.to_string());
                report.errors.push(EvalError::Node {
                    node: node_id,
                    message: err.to_string(),
                });
            }
        }
        report.nodes.insert(node_id, node_report);
    }

    report.output_valid = state.outputs.contains_key(&graph.output());
    tracing::debug!(
        nodes = report.nodes.len(),
        errors = report.errors.len(),
        "evaluation pass finished"
    );
    Ok(report)
}

fn seed_collection(
    node: &Node,
    outputs: &mut BTreeMap<NodeId, PrimitiveCollection>,
    pending: &HashMap<NodeId, usize>,
    keep: Option<NodeId>,
) -> PrimitiveCollection {
    match node.input(0).and_then(|socket| socket.link()) {
        Some(link) => hand_off(outputs, link.node, pending, keep),
        None => PrimitiveCollection::new(),
    }
}

/// Moves `upstream`'s collection when the caller is its last pending consumer
/// and `upstream` is not the node kept for preview; clones it otherwise.
fn hand_off(
    outputs: &mut BTreeMap<NodeId, PrimitiveCollection>,
    upstream: NodeId,
    pending: &HashMap<NodeId, usize>,
    keep: Option<NodeId>,
) -> PrimitiveCollection {
    let Some(collection) = outputs.get_mut(&upstream) else {
        return PrimitiveCollection::new();
    };
    let last_consumer = pending.get(&upstream).copied().unwrap_or(0) <= 1;
    if last_consumer && keep != Some(upstream) {
        std::mem::take(collection)
    } else {
        collection.clone()
    }
}

fn release(pending: &mut HashMap<NodeId, usize>, upstream: &[NodeId]) {
    for id in upstream {
        if let Some(count) = pending.get_mut(id) {
            *count = count.saturating_sub(1);
        }
    }
}
