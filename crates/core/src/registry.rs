use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::node::Node;

pub type NodeConstructor = Arc<dyn Fn() -> Node + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("node type '{name}' is already registered in category '{category}'")]
    Duplicate { category: String, name: String },
}

#[derive(Default, Clone)]
pub struct NodeRegistry {
    categories: IndexMap<String, IndexMap<String, NodeConstructor>>,
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.categories
                    .iter()
                    .map(|(category, entries)| (category, entries.keys().collect::<Vec<_>>())),
            )
            .finish()
    }
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// First registration wins; a second one under the same category and
    /// name is refused.
    pub fn register<F>(&mut self, category: &str, name: &str, constructor: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Node + Send + Sync + 'static,
    {
        let entries = self.categories.entry(category.to_string()).or_default();
        if entries.contains_key(name) {
            tracing::warn!(category, name, "duplicate node registration refused");
            return Err(RegistryError::Duplicate {
                category: category.to_string(),
                name: name.to_string(),
            });
        }
        entries.insert(name.to_string(), Arc::new(constructor));
        Ok(())
    }

    pub fn create(&self, name: &str) -> Option<Node> {
        self.categories
            .values()
            .find_map(|entries| entries.get(name))
            .map(|constructor| constructor())
    }

    pub fn create_in(&self, category: &str, name: &str) -> Option<Node> {
        self.categories
            .get(category)
            .and_then(|entries| entries.get(name))
            .map(|constructor| constructor())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.values().any(|entries| entries.contains_key(name))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn names(&self, category: &str) -> impl Iterator<Item = &str> {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes_builtin::{builtin_registry, create_node, BuiltinNodeKind};

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut registry = NodeRegistry::new();
        registry
            .register("Geometry", "Box", || create_node(BuiltinNodeKind::Box))
            .unwrap();
        let err = registry
            .register("Geometry", "Box", || create_node(BuiltinNodeKind::Torus))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.create("Box").unwrap().type_name(), "Box");

        // same name under another category is a different entry
        registry
            .register("Custom", "Box", || create_node(BuiltinNodeKind::Grid))
            .unwrap();
        assert_eq!(registry.create_in("Custom", "Box").unwrap().type_name(), "Grid");
        assert_eq!(registry.create("Box").unwrap().type_name(), "Box");
    }

    #[test]
    fn builtin_registry_lists_geometry_nodes() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.categories().collect::<Vec<_>>(), vec!["Geometry"]);
        let names: Vec<_> = registry.names("Geometry").collect();
        assert!(names.contains(&"Torus"));
        assert!(names.contains(&"Merge Collection"));
        assert!(!names.contains(&"Output"));
        assert!(registry.create("Volume").is_none());
        assert_eq!(registry.create("Scatter Points").unwrap().inputs().len(), 1);
    }
}
