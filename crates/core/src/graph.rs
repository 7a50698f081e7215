use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{InputSocket, Node, OutputSocket};
use crate::nodes_builtin::output_node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    pub node: NodeId,
    pub socket: usize,
}

impl OutputRef {
    pub fn new(node: NodeId, socket: usize) -> Self {
        Self { node, socket }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.out{}", self.node, self.socket)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRef {
    pub node: NodeId,
    pub socket: usize,
}

impl InputRef {
    pub fn new(node: NodeId, socket: usize) -> Self {
        Self { node, socket }
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.in{}", self.node, self.socket)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("input socket {0} not found")]
    InputNotFound(InputRef),
    #[error("output socket {0} not found")]
    OutputNotFound(OutputRef),
    #[error("node {node} has no socket named '{name}'")]
    SocketNotFound { node: NodeId, name: String },
    #[error("input {0} is already connected")]
    InputAlreadyLinked(InputRef),
    #[error("connection mismatch: {from} does not feed {to}")]
    ConnectionMismatch { from: OutputRef, to: InputRef },
    #[error("linking {from} into {to} would create a cycle")]
    WouldCycle { from: NodeId, to: NodeId },
    #[error("graph contains a cycle through {0:?}")]
    Cycle(Vec<NodeId>),
    #[error("the Output node cannot be removed")]
    OutputNodeRemoval,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub builds: u64,
    pub connects: u64,
    pub disconnects: u64,
}

/// Owns every node of one object's network, including the terminal Output
/// node which is created first and never removed.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    next_id: u64,
    output: NodeId,
    need_update: bool,
    stack: Vec<NodeId>,
    active_node: Option<NodeId>,
    stats: GraphStats,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: IndexMap::new(),
            next_id: 0,
            output: NodeId(0),
            need_update: false,
            stack: Vec::new(),
            active_node: None,
            stats: GraphStats::default(),
        };
        graph.output = graph.add(output_node());
        graph
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn output(&self) -> NodeId {
        self.output
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        tracing::debug!(node = %id, name = node.name(), "add node");
        self.nodes.insert(id, node);
        self.need_update = true;
        id
    }

    /// Severs every link touching the node, then drops it from the graph.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, GraphError> {
        if id == self.output {
            tracing::warn!("refusing to remove the Output node");
            return Err(GraphError::OutputNodeRemoval);
        }
        let Some(node) = self.nodes.get(&id) else {
            tracing::warn!(node = %id, "unable to find node in graph");
            return Err(GraphError::NodeNotFound(id));
        };

        let incoming: Vec<(OutputRef, InputRef)> = node
            .inputs()
            .iter()
            .enumerate()
            .filter_map(|(index, socket)| socket.link().map(|from| (from, InputRef::new(id, index))))
            .collect();
        let outgoing: Vec<(OutputRef, InputRef)> = node
            .outputs()
            .iter()
            .enumerate()
            .flat_map(|(index, socket)| {
                socket
                    .links()
                    .iter()
                    .map(move |to| (OutputRef::new(id, index), *to))
            })
            .collect();

        for (from, to) in incoming.into_iter().chain(outgoing) {
            self.disconnect(from, to)?;
        }

        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(GraphError::NodeNotFound(id))?;
        if self.active_node == Some(id) {
            self.active_node = None;
        }
        self.need_update = true;
        Ok(node)
    }

    /// Links `from` into `to`. An input accepts a single link; disconnect it
    /// first to rewire. Links that would close a cycle are refused.
    pub fn connect(&mut self, from: OutputRef, to: InputRef) -> Result<(), GraphError> {
        self.output_socket(from)?;
        if let Some(existing) = self.input_socket(to)?.link() {
            tracing::warn!(input = %to, current = %existing, "input already connected");
            return Err(GraphError::InputAlreadyLinked(to));
        }
        if from.node == to.node || self.reaches(to.node, from.node) {
            tracing::warn!(from = %from, to = %to, "connection would create a cycle");
            return Err(GraphError::WouldCycle {
                from: from.node,
                to: to.node,
            });
        }

        self.input_socket_mut(to)?.set_link(Some(from));
        self.output_socket_mut(from)?.push_link(to);
        self.stats.connects += 1;
        self.need_update = true;
        Ok(())
    }

    pub fn disconnect(&mut self, from: OutputRef, to: InputRef) -> Result<(), GraphError> {
        let linked = self.output_socket(from)?.links().contains(&to)
            && self.input_socket(to)?.link() == Some(from);
        if !linked {
            tracing::warn!(from = %from, to = %to, "connection mismatch");
            return Err(GraphError::ConnectionMismatch { from, to });
        }

        self.output_socket_mut(from)?.remove_link(to);
        self.input_socket_mut(to)?.set_link(None);
        self.stats.disconnects += 1;
        self.need_update = true;
        Ok(())
    }

    pub fn find_input(&self, node: NodeId, name: &str) -> Result<InputRef, GraphError> {
        let index = self
            .nodes
            .get(&node)
            .ok_or(GraphError::NodeNotFound(node))?
            .input_index(name)
            .ok_or_else(|| GraphError::SocketNotFound {
                node,
                name: name.to_string(),
            })?;
        Ok(InputRef::new(node, index))
    }

    pub fn find_output(&self, node: NodeId, name: &str) -> Result<OutputRef, GraphError> {
        let index = self
            .nodes
            .get(&node)
            .ok_or(GraphError::NodeNotFound(node))?
            .output_index(name)
            .ok_or_else(|| GraphError::SocketNotFound {
                node,
                name: name.to_string(),
            })?;
        Ok(OutputRef::new(node, index))
    }

    pub fn link(&self, input: InputRef) -> Option<OutputRef> {
        self.input_socket(input).ok().and_then(InputSocket::link)
    }

    pub fn links(&self, output: OutputRef) -> &[InputRef] {
        self.output_socket(output)
            .map(OutputSocket::links)
            .unwrap_or(&[])
    }

    pub fn upstream_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|node| {
                node.inputs()
                    .iter()
                    .filter_map(|socket| socket.link().map(|link| link.node))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn downstream_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|node| {
                node.outputs()
                    .iter()
                    .flat_map(|socket| socket.links().iter().map(|link| link.node))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn needs_update(&self) -> bool {
        self.need_update
    }

    /// Recomputes the evaluation order when the graph changed since the last
    /// successful build; otherwise does nothing.
    pub fn build(&mut self) -> Result<(), GraphError> {
        if !self.need_update {
            return Ok(());
        }

        let order = self
            .topological_order()
            .inspect_err(|err| tracing::error!("graph build failed: {err}"))?;

        tracing::debug!(
            order = ?order
                .iter()
                .filter_map(|id| self.nodes.get(id).map(Node::name))
                .collect::<Vec<_>>(),
            "order of operation"
        );

        self.stack = order;
        self.need_update = false;
        self.stats.builds += 1;
        Ok(())
    }

    pub fn finished_stack(&self) -> &[NodeId] {
        &self.stack
    }

    /// Kahn's algorithm. Ties follow node insertion order; nodes that are not
    /// connected to the Output node are kept.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut indegree: HashMap<NodeId, usize> = self
            .nodes
            .iter()
            .map(|(id, node)| {
                let linked = node.inputs().iter().filter(|s| s.link().is_some()).count();
                (*id, linked)
            })
            .collect();

        let mut queue: VecDeque<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|id| indegree.get(id) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for next in self.downstream_nodes(id) {
                if let Some(count) = indegree.get_mut(&next) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let placed: HashSet<NodeId> = order.into_iter().collect();
            let remaining = self
                .nodes
                .keys()
                .copied()
                .filter(|id| !placed.contains(id))
                .collect();
            return Err(GraphError::Cycle(remaining));
        }

        Ok(order)
    }

    pub fn active_node(&self) -> Option<NodeId> {
        self.active_node
    }

    pub fn set_active_node(&mut self, node: Option<NodeId>) -> Result<(), GraphError> {
        if let Some(id) = node {
            if !self.nodes.contains_key(&id) {
                tracing::warn!(node = %id, "cannot activate unknown node");
                return Err(GraphError::NodeNotFound(id));
            }
        }
        self.active_node = node;
        Ok(())
    }

    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    fn reaches(&self, start: NodeId, target: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            if id == target {
                return true;
            }
            if visited.insert(id) {
                pending.extend(self.downstream_nodes(id));
            }
        }
        false
    }

    fn input_socket(&self, input: InputRef) -> Result<&InputSocket, GraphError> {
        self.nodes
            .get(&input.node)
            .and_then(|node| node.input(input.socket))
            .ok_or_else(|| {
                tracing::warn!(input = %input, "no such input socket");
                GraphError::InputNotFound(input)
            })
    }

    fn output_socket(&self, output: OutputRef) -> Result<&OutputSocket, GraphError> {
        self.nodes
            .get(&output.node)
            .and_then(|node| node.output(output.socket))
            .ok_or_else(|| {
                tracing::warn!(output = %output, "no such output socket");
                GraphError::OutputNotFound(output)
            })
    }

    fn input_socket_mut(&mut self, input: InputRef) -> Result<&mut InputSocket, GraphError> {
        self.nodes
            .get_mut(&input.node)
            .and_then(|node| node.input_mut(input.socket))
            .ok_or(GraphError::InputNotFound(input))
    }

    fn output_socket_mut(&mut self, output: OutputRef) -> Result<&mut OutputSocket, GraphError> {
        self.nodes
            .get_mut(&output.node)
            .and_then(|node| node.output_mut(output.socket))
            .ok_or(GraphError::OutputNotFound(output))
    }
}
