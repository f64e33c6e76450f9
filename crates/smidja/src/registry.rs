//! The node type registry: which type names a `create_node` may use.

use std::collections::BTreeMap;

use crate::error::AssemblyError;
use crate::node::{Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeEntry {
    Concrete(NodeKind),
    /// Known, but only as a base type. Creating one fails.
    Abstract,
}

/// Maps type names to node kinds.
///
/// [`NodeRegistry::default`] knows the 2D vocabulary below; hosts can add
/// their own names for existing kinds.
///
/// | type name                                   | kind           |
/// |---------------------------------------------|----------------|
/// | `Node`                                      | Generic        |
/// | `Node2D`                                    | Spatial        |
/// | `CharacterBody2D`, `StaticBody2D`, `RigidBody2D`, `Area2D` | Spatial |
/// | `Sprite2D`                                  | Sprite         |
/// | `AnimatedSprite2D`                          | AnimatedSprite |
/// | `CollisionShape2D`                          | CollisionShape |
/// | `Camera2D`                                  | Camera         |
/// | `TileMapLayer`                              | TileLayer      |
///
/// `CanvasItem`, `CollisionObject2D` and `PhysicsBody2D` are registered as
/// abstract base types.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    types: BTreeMap<String, TypeEntry>,
}

impl NodeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// The default 2D vocabulary.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register("Node", NodeKind::Generic)
            .register("Node2D", NodeKind::Spatial)
            .register("CharacterBody2D", NodeKind::Spatial)
            .register("StaticBody2D", NodeKind::Spatial)
            .register("RigidBody2D", NodeKind::Spatial)
            .register("Area2D", NodeKind::Spatial)
            .register("Sprite2D", NodeKind::Sprite)
            .register("AnimatedSprite2D", NodeKind::AnimatedSprite)
            .register("CollisionShape2D", NodeKind::CollisionShape)
            .register("Camera2D", NodeKind::Camera)
            .register("TileMapLayer", NodeKind::TileLayer)
            .register_abstract("CanvasItem")
            .register_abstract("CollisionObject2D")
            .register_abstract("PhysicsBody2D");
        registry
    }

    /// Register (or re-register) a type name.
    pub fn register(&mut self, type_name: &str, kind: NodeKind) -> &mut Self {
        self.types
            .insert(type_name.to_string(), TypeEntry::Concrete(kind));
        self
    }

    /// Register a type name that exists but cannot be instantiated.
    pub fn register_abstract(&mut self, type_name: &str) -> &mut Self {
        self.types.insert(type_name.to_string(), TypeEntry::Abstract);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// The kind behind a concrete type name.
    pub fn kind_of(&self, type_name: &str) -> Option<NodeKind> {
        match self.types.get(type_name)? {
            TypeEntry::Concrete(kind) => Some(*kind),
            TypeEntry::Abstract => None,
        }
    }

    /// All registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Create a detached node of the given type.
    pub fn instantiate(&self, type_name: &str, name: &str) -> Result<Node, AssemblyError> {
        match self.types.get(type_name) {
            None => Err(AssemblyError::UnknownType(type_name.to_string())),
            Some(TypeEntry::Abstract) => {
                Err(AssemblyError::InstantiationFailed(type_name.to_string()))
            }
            Some(TypeEntry::Concrete(kind)) => Ok(Node::new(name, type_name, *kind)),
        }
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_2d_vocabulary() {
        let registry = NodeRegistry::default();
        assert_eq!(registry.kind_of("CharacterBody2D"), Some(NodeKind::Spatial));
        assert_eq!(registry.kind_of("Camera2D"), Some(NodeKind::Camera));
        assert_eq!(registry.kind_of("Spatial3D"), None);
        assert!(registry.type_names().any(|n| n == "TileMapLayer"));
    }

    #[test]
    fn unknown_and_abstract_types_fail_differently() {
        let registry = NodeRegistry::default();
        assert_eq!(
            registry.instantiate("MeshInstance3D", "M").unwrap_err(),
            AssemblyError::UnknownType("MeshInstance3D".into())
        );
        assert_eq!(
            registry.instantiate("PhysicsBody2D", "P").unwrap_err(),
            AssemblyError::InstantiationFailed("PhysicsBody2D".into())
        );
    }

    #[test]
    fn hosts_can_alias_existing_kinds() {
        let mut registry = NodeRegistry::new();
        registry.register("Spatial2D", NodeKind::Spatial);

        let node = registry.instantiate("Spatial2D", "A").unwrap();
        assert_eq!(node.kind(), NodeKind::Spatial);
        assert_eq!(node.type_name(), "Spatial2D");
    }
}
