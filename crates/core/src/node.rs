use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::eval::ProcessContext;
use crate::graph::{InputRef, OutputRef};
use crate::params::{Properties, PropertyError};

/// Behaviour of one node type.
pub trait NodeOp: fmt::Debug + Send + Sync {
    fn process(&self, ctx: &mut ProcessContext<'_>) -> Result<(), NodeError>;

    /// Recomputes property visibility from the current values. Returns
    /// whether anything may have changed. Never touches geometry.
    fn update_properties(&self, _properties: &mut Properties) -> bool {
        false
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NodeError {
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error("no input socket at index {0}")]
    UnknownInput(usize),
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDefinition {
    pub name: String,
    pub category: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSocket {
    pub name: String,
    link: Option<OutputRef>,
}

impl InputSocket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: None,
        }
    }

    pub fn link(&self) -> Option<OutputRef> {
        self.link
    }

    pub(crate) fn set_link(&mut self, link: Option<OutputRef>) {
        self.link = link;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSocket {
    pub name: String,
    links: Vec<InputRef>,
}

impl OutputSocket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
        }
    }

    pub fn links(&self) -> &[InputRef] {
        &self.links
    }

    pub(crate) fn push_link(&mut self, input: InputRef) {
        self.links.push(input);
    }

    pub(crate) fn remove_link(&mut self, input: InputRef) -> bool {
        match self.links.iter().position(|link| *link == input) {
            Some(index) => {
                self.links.remove(index);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    type_name: String,
    category: String,
    inputs: Vec<InputSocket>,
    outputs: Vec<OutputSocket>,
    properties: Properties,
    op: Arc<dyn NodeOp>,
}

impl Node {
    pub fn new(definition: NodeDefinition, properties: Properties, op: Arc<dyn NodeOp>) -> Self {
        Self {
            name: definition.name.clone(),
            type_name: definition.name,
            category: definition.category,
            inputs: definition.inputs.into_iter().map(InputSocket::new).collect(),
            outputs: definition.outputs.into_iter().map(OutputSocket::new).collect(),
            properties,
            op,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn inputs(&self) -> &[InputSocket] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputSocket] {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Option<&InputSocket> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&OutputSocket> {
        self.outputs.get(index)
    }

    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|s| s.name == name)
    }

    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|s| s.name == name)
    }

    pub(crate) fn input_mut(&mut self, index: usize) -> Option<&mut InputSocket> {
        self.inputs.get_mut(index)
    }

    pub(crate) fn output_mut(&mut self, index: usize) -> Option<&mut OutputSocket> {
        self.outputs.get_mut(index)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn update_properties(&mut self) -> bool {
        self.op.update_properties(&mut self.properties)
    }

    pub(crate) fn op(&self) -> &dyn NodeOp {
        self.op.as_ref()
    }
}
