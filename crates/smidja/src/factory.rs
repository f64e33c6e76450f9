//! Node creation: validate the type, sanitize the name, insert under the
//! root and tag ownership.

use crate::error::AssemblyError;
use crate::registry::NodeRegistry;
use crate::tree::{NodeId, SceneTree};

/// Characters that cannot appear in a node name.
const INVALID_NAME_CHARS: &[char] = &['.', ':', '@', '/', '"', '%'];

/// Strip characters that would break name addressing and trim whitespace.
///
/// Falls back to `type_name` when nothing usable is left.
pub fn sanitize_node_name(name: &str, type_name: &str) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .filter(|c| !INVALID_NAME_CHARS.contains(c))
            .collect::<String>()
            .trim()
            .to_string()
    };
    let name = clean(name);
    if name.is_empty() { clean(type_name) } else { name }
}

/// Creates nodes of registered types.
#[derive(Debug, Clone, Copy)]
pub struct NodeFactory<'r> {
    registry: &'r NodeRegistry,
}

impl<'r> NodeFactory<'r> {
    pub fn new(registry: &'r NodeRegistry) -> Self {
        Self { registry }
    }

    /// Create a node as the last child of `root`, owned by `root`.
    ///
    /// The tree is unchanged on failure.
    pub fn create(
        &self,
        tree: &mut SceneTree,
        type_name: &str,
        node_name: &str,
        root: NodeId,
    ) -> Result<NodeId, AssemblyError> {
        let name = sanitize_node_name(node_name, type_name);
        if name.is_empty() {
            return Err(AssemblyError::MalformedInstruction(format!(
                "no usable name for a '{type_name}' node"
            )));
        }
        let node = self.registry.instantiate(type_name, &name)?;
        let id = tree.add_child(root, node)?;
        tree.set_owner(id, Some(root));
        log::debug!("Created '{}' ({}) under '{}'", name, type_name, tree[root].name());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};

    fn tree() -> SceneTree {
        SceneTree::new(Node::new("Main", "Node2D", NodeKind::Spatial))
    }

    #[test]
    fn sanitizing_strips_addressing_characters() {
        assert_eq!(sanitize_node_name(" Hero.Sprite ", "Sprite2D"), "HeroSprite");
        assert_eq!(sanitize_node_name("a/b:c@d\"e%f", "Node"), "abcdef");
        assert_eq!(sanitize_node_name("", "Camera2D"), "Camera2D");
        assert_eq!(sanitize_node_name("...", "Camera2D"), "Camera2D");
    }

    #[test]
    fn created_nodes_are_owned_by_the_root() {
        let registry = NodeRegistry::default();
        let factory = NodeFactory::new(&registry);
        let mut tree = tree();
        let root = tree.root();

        let cam = factory.create(&mut tree, "Camera2D", "", root).unwrap();

        assert_eq!(tree[cam].name(), "Camera2D");
        assert_eq!(tree[cam].kind(), NodeKind::Camera);
        assert_eq!(tree[cam].owner(), Some(root));
        assert_eq!(tree.children(root), &[cam]);
    }

    #[test]
    fn failures_leave_the_tree_alone() {
        let registry = NodeRegistry::default();
        let factory = NodeFactory::new(&registry);
        let mut tree = tree();
        let root = tree.root();
        factory.create(&mut tree, "Node2D", "Game", root).unwrap();

        assert!(matches!(
            factory.create(&mut tree, "Node2D", "Game", root),
            Err(AssemblyError::DuplicateName(_))
        ));
        assert!(matches!(
            factory.create(&mut tree, "Spaceship", "Ship", root),
            Err(AssemblyError::UnknownType(_))
        ));
        assert_eq!(tree.len(), 2);
    }
}
