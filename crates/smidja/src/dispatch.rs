//! # Dispatcher: One Instruction, One Tree Mutation
//!
//! The dispatcher interprets a single [`Instruction`] against a tree and a
//! batch root:
//!
//! ```text
//!  create_node     ──► NodeFactory::create        (child of root, owned by root)
//!  set_property    ──► find(root, node) ──► configure_node({property: value})
//!  set_properties  ──► find(root, node) ──► configure_node(properties)
//!  attach_script   ──► find(root, node) ──► BehaviorAttacher::compile_and_attach
//!  add_child       ──► find parent + child ──► clear owner, detach, attach, own
//! ```
//!
//! Names are resolved by searching the whole subtree under the root, the root
//! included. Nothing in here returns an error or panics: every failure
//! becomes an [`Outcome`] and a log record, and the caller moves on to the
//! next instruction.

use std::fmt;

use crate::behavior::BehaviorAttacher;
use crate::configure::{ConfigContext, configure_node};
use crate::engine::AssemblerConfig;
use crate::error::AssemblyError;
use crate::factory::NodeFactory;
use crate::instruction::Instruction;
use crate::registry::NodeRegistry;
use crate::resource::ResourceLoader;
use crate::tree::{NodeId, SceneTree};
use crate::value::{Properties, Props, Value};

/// What happened to one instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The instruction ran. Individual configurator steps may still have
    /// failed; those are listed as warnings.
    Applied { warnings: Vec<AssemblyError> },
    /// The instruction changed nothing.
    Skipped(AssemblyError),
}

impl Outcome {
    pub fn clean() -> Self {
        Self::Applied {
            warnings: Vec::new(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Applied { warnings } if warnings.is_empty())
    }

    /// The skip reason, or the warnings of an applied instruction.
    pub fn errors(&self) -> &[AssemblyError] {
        match self {
            Self::Applied { warnings } => warnings,
            Self::Skipped(e) => std::slice::from_ref(e),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied { warnings } if warnings.is_empty() => write!(f, "applied"),
            Self::Applied { warnings } => write!(f, "applied with {} warning(s)", warnings.len()),
            Self::Skipped(e) => write!(f, "skipped: {e}"),
        }
    }
}

impl From<Result<(), AssemblyError>> for Outcome {
    fn from(result: Result<(), AssemblyError>) -> Self {
        match result {
            Ok(()) => Self::clean(),
            Err(e) => Self::Skipped(e),
        }
    }
}

/// Applies instructions one at a time.
pub struct Dispatcher<'a> {
    pub registry: &'a NodeRegistry,
    pub loader: &'a mut dyn ResourceLoader,
    pub attacher: &'a mut dyn BehaviorAttacher,
    pub config: &'a AssemblerConfig,
}

impl Dispatcher<'_> {
    /// Apply one instruction. Failures are logged and returned, never raised.
    pub fn apply(&mut self, instruction: &Instruction, tree: &mut SceneTree, root: NodeId) -> Outcome {
        log::debug!("Applying {instruction}");

        let outcome = match instruction {
            Instruction::CreateNode {
                type_name,
                node_name,
            } => NodeFactory::new(self.registry)
                .create(tree, type_name, node_name, root)
                .map(|_| ())
                .into(),
            Instruction::SetProperty {
                target_name,
                property_name,
                value,
            } => {
                let single = single_property(property_name, value.clone());
                self.set_properties(tree, root, target_name, &single)
            }
            Instruction::SetProperties {
                target_name,
                properties,
            } => self.set_properties(tree, root, target_name, properties),
            Instruction::AttachBehavior {
                target_name,
                language,
                source_code,
            } => self.attach_behavior(tree, root, target_name, language, source_code).into(),
            Instruction::Reparent {
                parent_name,
                child_name,
            } => reparent(tree, root, parent_name, child_name).into(),
        };

        match &outcome {
            Outcome::Skipped(e) => log::warn!("Skipped {}: {e}", instruction.action()),
            Outcome::Applied { warnings } => {
                for w in warnings {
                    log::warn!("{} on {}: {w}", instruction.action(), target_of(instruction));
                }
            }
        }
        outcome
    }

    fn set_properties(
        &mut self,
        tree: &mut SceneTree,
        root: NodeId,
        target: &str,
        properties: &Properties,
    ) -> Outcome {
        let id = match resolve(tree, root, target) {
            Ok(id) => id,
            Err(e) => return Outcome::Skipped(e),
        };
        let Some(node) = tree.get_mut(id) else {
            return Outcome::Skipped(AssemblyError::TargetNotFound(target.to_string()));
        };

        let mut ctx = ConfigContext {
            loader: &mut *self.loader,
            config: self.config,
        };
        let warnings = configure_node(node, Props::new(properties), &mut ctx);
        Outcome::Applied { warnings }
    }

    fn attach_behavior(
        &mut self,
        tree: &mut SceneTree,
        root: NodeId,
        target: &str,
        language: &str,
        source: &str,
    ) -> Result<(), AssemblyError> {
        let id = resolve(tree, root, target)?;
        if !language.eq_ignore_ascii_case(&self.config.behavior_language) {
            return Err(AssemblyError::UnsupportedLanguage(language.to_string()));
        }
        let node = tree
            .get_mut(id)
            .ok_or_else(|| AssemblyError::TargetNotFound(target.to_string()))?;
        self.attacher.compile_and_attach(node, language, source)?;
        Ok(())
    }
}

fn resolve(tree: &SceneTree, root: NodeId, name: &str) -> Result<NodeId, AssemblyError> {
    tree.find(root, name)
        .ok_or_else(|| AssemblyError::TargetNotFound(name.to_string()))
}

/// Move `child` under `parent`, re-tagging its owner as `root`.
fn reparent(
    tree: &mut SceneTree,
    root: NodeId,
    parent_name: &str,
    child_name: &str,
) -> Result<(), AssemblyError> {
    let parent = resolve(tree, root, parent_name)?;
    let child = resolve(tree, root, child_name)?;

    let reject = |reason| AssemblyError::InvalidReparent {
        parent: parent_name.to_string(),
        child: child_name.to_string(),
        reason,
    };
    if child == tree.root() || child == root {
        return Err(reject("the root cannot be moved"));
    }
    if tree.is_ancestor_or_self(child, parent) {
        return Err(reject("parent is inside the child's subtree"));
    }

    tree.set_owner(child, None);
    let previous = tree.detach(child);
    if let Err(e) = tree.attach(parent, child) {
        if let Some(previous) = previous {
            let _ = tree.attach(previous, child);
        }
        tree.set_owner(child, Some(root));
        return Err(e);
    }
    tree.set_owner(child, Some(root));
    Ok(())
}

fn target_of(instruction: &Instruction) -> &str {
    match instruction {
        Instruction::CreateNode { node_name, .. } => node_name,
        Instruction::SetProperty { target_name, .. }
        | Instruction::SetProperties { target_name, .. }
        | Instruction::AttachBehavior { target_name, .. } => target_name,
        Instruction::Reparent { child_name, .. } => child_name,
    }
}

/// Wrap a single property as a one-key bag.
pub fn single_property(key: &str, value: Value) -> Properties {
    let mut map = Properties::new();
    map.insert(key.to_string(), value);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::SourceAttacher;
    use crate::math::Vec2;
    use crate::node::{Node, NodeKind};
    use crate::resource::MemoryLoader;
    use serde_json::json;

    struct Fixture {
        registry: NodeRegistry,
        loader: MemoryLoader,
        attacher: SourceAttacher,
        config: AssemblerConfig,
        tree: SceneTree,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: NodeRegistry::default(),
                loader: MemoryLoader::new().with_texture("res://knight.png", 64, 64),
                attacher: SourceAttacher,
                config: AssemblerConfig::default(),
                tree: SceneTree::new(Node::new("Main", "Node2D", NodeKind::Spatial)),
            }
        }

        fn apply(&mut self, instruction: Instruction) -> Outcome {
            let root = self.tree.root();
            let mut dispatcher = Dispatcher {
                registry: &self.registry,
                loader: &mut self.loader,
                attacher: &mut self.attacher,
                config: &self.config,
            };
            dispatcher.apply(&instruction, &mut self.tree, root)
        }

        fn id(&self, name: &str) -> NodeId {
            self.tree.try_named(name).unwrap()
        }
    }

    #[test]
    fn set_property_routes_through_the_configurators() {
        let mut fx = Fixture::new();
        fx.apply(Instruction::create("Camera2D", "Cam"));

        let outcome = fx.apply(Instruction::set_property("Cam", "zoom", json!({"x": 2, "y": 2})));

        assert!(outcome.is_clean());
        assert_eq!(fx.tree[fx.id("Cam")].camera().unwrap().zoom, Vec2::splat(2.0));
        assert!(fx.tree[fx.id("Cam")].property("zoom").is_none());
    }

    #[test]
    fn missing_target_is_skipped() {
        let mut fx = Fixture::new();
        let outcome = fx.apply(Instruction::set_property("Ghost", "visible", json!(false)));
        assert_eq!(outcome, Outcome::Skipped(AssemblyError::TargetNotFound("Ghost".into())));
    }

    #[test]
    fn root_is_addressable_by_name() {
        let mut fx = Fixture::new();
        let outcome = fx.apply(Instruction::set_property("Main", "position", json!({"x": 1, "y": 1})));

        assert!(outcome.is_clean());
        assert_eq!(fx.tree[fx.tree.root()].position(), Some(Vec2::ONE));
    }

    #[test]
    fn behavior_language_must_match() {
        let mut fx = Fixture::new();
        fx.apply(Instruction::create("CharacterBody2D", "Hero"));

        let wrong = fx.apply(Instruction::attach("Hero", "Python", "print('hi')"));
        let right = fx.apply(Instruction::attach("Hero", "GDScript", "extends CharacterBody2D"));
        let empty = fx.apply(Instruction::attach("Hero", "GDScript", ""));

        assert_eq!(wrong, Outcome::Skipped(AssemblyError::UnsupportedLanguage("Python".into())));
        assert!(right.is_clean());
        assert!(matches!(empty, Outcome::Skipped(AssemblyError::Behavior(_))));
        let behavior = fx.tree[fx.id("Hero")].behavior().unwrap();
        assert_eq!(behavior.source, "extends CharacterBody2D");
    }

    #[test]
    fn attach_to_missing_target_is_skipped() {
        let mut fx = Fixture::new();
        fx.apply(Instruction::create("CharacterBody2D", "Hero"));
        let before = fx.tree.dump();

        let outcome = fx.apply(Instruction::attach("Ghost", "GDScript", "extends Node2D"));

        assert_eq!(outcome, Outcome::Skipped(AssemblyError::TargetNotFound("Ghost".into())));
        assert_eq!(fx.tree.dump(), before);
        assert_eq!(fx.tree.len(), 2);
        assert!(fx.tree[fx.id("Hero")].behavior().is_none());
    }

    #[test]
    fn reparent_moves_and_re_owns() {
        let mut fx = Fixture::new();
        fx.apply(Instruction::create("Node2D", "Game"));
        fx.apply(Instruction::create("CharacterBody2D", "Hero"));

        assert!(fx.apply(Instruction::reparent("Game", "Hero")).is_clean());

        let (root, game, hero) = (fx.tree.root(), fx.id("Game"), fx.id("Hero"));
        assert_eq!(fx.tree.children(root), &[game]);
        assert_eq!(fx.tree.children(game), &[hero]);
        assert_eq!(fx.tree[hero].owner(), Some(root));
    }

    #[test]
    fn reparent_guards_leave_the_tree_unchanged() {
        let mut fx = Fixture::new();
        fx.apply(Instruction::create("Node2D", "Game"));
        fx.apply(Instruction::create("Node2D", "Level"));
        fx.apply(Instruction::reparent("Game", "Level"));
        let before = fx.tree.dump();

        for (parent, child) in [("Level", "Game"), ("Game", "Game"), ("Game", "Main"), ("Game", "Nope")] {
            let outcome = fx.apply(Instruction::reparent(parent, child));
            assert!(!outcome.is_applied(), "{parent} <- {child}");
        }
        assert_eq!(fx.tree.dump(), before);
    }

    #[test]
    fn single_property_builds_a_one_key_bag() {
        let bag = single_property("visible", json!(false));
        assert_eq!(bag.len(), 1);
        assert_eq!(bag["visible"], json!(false));
    }
}
