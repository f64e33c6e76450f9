//! # Scene Tree: Named Node Hierarchy
//!
//! The tree owns every [`Node`] in an arena and addresses them by
//! [`NodeId`]. Instructions, however, address nodes by *name*, so the tree
//! keeps a name index alongside the arena and enforces that no two nodes share
//! a name.
//!
//! ```text
//! SceneTree
//! ┌─────────────────────────────────────────────┐
//! │ nodes: Vec<Node>                            │
//! │   [0] Main      parent: -   children: [1]   │ ◄── root
//! │   [1] Game      parent: 0   children: [2]   │
//! │   [2] Hero      parent: 1   children: []    │
//! │                                             │
//! │ names: HashMap<String, NodeId>              │
//! │   "Main" → 0, "Game" → 1, "Hero" → 2        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Lookup
//!
//! [`SceneTree::find`] answers "which node called `name` lives in the subtree
//! under `from`?", searching the whole subtree, `from` included. With a
//! tree-wide unique name index this is an index hit followed by a walk up the
//! parent chain, so lookups stay cheap even for deep trees.
//!
//! ## Ownership Tags
//!
//! Each node can carry an *owner*: the root it is saved with. Parent links
//! express structure; owner tags express which nodes a persistence layer should
//! write out as part of the scene. [`SceneTree::owned_by`] lists one group.
//!
//! Nothing ever removes a node from the arena. Detaching only unlinks it from
//! its parent, and the assembler always re-attaches straight away.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::ops::Index;

use serde::Serialize;

use crate::error::AssemblyError;
use crate::node::Node;

/// Index of a node in its [`SceneTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An arena-backed tree of uniquely named nodes.
#[derive(Debug, Clone, Serialize)]
pub struct SceneTree {
    nodes: Vec<Node>,
    #[serde(skip)]
    names: HashMap<String, NodeId>,
    root: NodeId,
}

impl SceneTree {
    /// Create a tree whose root is `root`. The root owns nothing and has no
    /// owner.
    pub fn new(mut root: Node) -> Self {
        root.parent = None;
        root.children.clear();
        root.owner = None;
        let id = NodeId(0);
        let mut names = HashMap::new();
        names.insert(root.name().to_string(), id);
        Self {
            nodes: vec![root],
            names,
            root: id,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// All node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    // ── Names ─────────────────────────────────────────────────────────

    /// The node with this name anywhere in the arena.
    pub fn try_named(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Find a node by name in the subtree rooted at `from` (inclusive).
    pub fn find(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let id = self.try_named(name)?;
        self.is_ancestor_or_self(from, id).then_some(id)
    }

    // ── Structure ─────────────────────────────────────────────────────

    /// Add `node` as the last child of `parent`.
    ///
    /// Fails without touching the tree if the name is taken.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, AssemblyError> {
        if self.contains_name(node.name()) {
            return Err(AssemblyError::DuplicateName(node.name().to_string()));
        }
        if self.get(parent).is_none() {
            return Err(AssemblyError::TargetNotFound(format!("#{}", parent.index())));
        }

        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.children.clear();
        node.owner = None;
        self.names.insert(node.name().to_string(), id);
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Set or clear a node's ownership tag.
    pub fn set_owner(&mut self, id: NodeId, owner: Option<NodeId>) {
        if let Some(node) = self.get_mut(id) {
            node.owner = owner;
        }
    }

    /// Unlink a node from its parent. Returns the former parent.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.get_mut(id)?.parent.take()?;
        self.nodes[parent.index()].children.retain(|&c| c != id);
        Some(parent)
    }

    /// Attach a detached node as the last child of `parent`.
    ///
    /// Refuses to create a cycle or to give a node two parents.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), AssemblyError> {
        let reject = |tree: &Self, reason: &'static str| AssemblyError::InvalidReparent {
            parent: tree.name_of(parent).to_string(),
            child: tree.name_of(child).to_string(),
            reason,
        };

        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(reject(self, "unknown node"));
        }
        if self.nodes[child.index()].parent.is_some() {
            return Err(reject(self, "child is still attached"));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(reject(self, "parent is inside the child's subtree"));
        }

        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(Node::parent);
        }
        false
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// `from` and everything below it, depth-first pre-order.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if self.get(id).is_none() {
                continue;
            }
            out.push(id);
            // Reverse so the first child is visited first.
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Every node tagged with `owner`, in creation order.
    pub fn owned_by(&self, owner: NodeId) -> Vec<NodeId> {
        self.ids()
            .filter(|&id| self.nodes[id.index()].owner() == Some(owner))
            .collect()
    }

    /// Slash-separated names from the root down to `id`.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.get(c)) {
            names.push(node.name());
            current = node.parent();
        }
        names.reverse();
        names.join("/")
    }

    /// An indented outline of the tree, one `name (Type)` line per node.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, self.root, 0);
        out
    }

    fn dump_into(&self, out: &mut String, id: NodeId, depth: usize) {
        let Some(node) = self.get(id) else { return };
        let _ = writeln!(out, "{}{} ({})", "  ".repeat(depth), node.name(), node.type_name());
        for &child in node.children() {
            self.dump_into(out, child, depth + 1);
        }
    }

    fn name_of(&self, id: NodeId) -> &str {
        self.get(id).map(Node::name).unwrap_or("?")
    }
}

impl Index<NodeId> for SceneTree {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}
