//! # Scene Assembler: The Batch Façade
//!
//! [`SceneAssembler`] owns the collaborators a batch needs (type registry,
//! resource loader, behavior attacher, configuration) and runs the dispatch
//! loop over an ordered list of instructions.
//!
//! ## Example
//!
//! ```
//! use smidja::prelude::*;
//! use serde_json::json;
//!
//! let loader = MemoryLoader::new().with_texture("res://knight.png", 64, 64);
//! let mut assembler = SceneAssembler::new(loader);
//! let mut tree = SceneTree::new(Node::new("Main", "Node2D", NodeKind::Spatial));
//!
//! let root = assembler.apply_instructions(&mut tree, &[
//!     Instruction::create("CharacterBody2D", "Hero"),
//!     Instruction::set_property("Hero", "position", json!({"x": 400, "y": 100})),
//! ]);
//!
//! assert_eq!(root, tree.root());
//! assert_eq!(tree.dump(), "Main (Node2D)\n  Hero (CharacterBody2D)\n");
//! ```
//!
//! ## Ordering
//!
//! Instructions run strictly in list order on the calling thread; instruction
//! *n* sees the tree exactly as instructions `1..n` left it. A batch is never
//! aborted: each instruction either applies (possibly with warnings) or is
//! skipped, and the loop moves on.
//!
//! ```text
//!  for instruction in batch:
//!      Dispatcher::apply ──► Outcome::Applied { warnings }
//!                        └─► Outcome::Skipped(error)
//!  ──► BatchReport { root, outcomes }
//! ```

use std::fmt;

use serde::Deserialize;

use crate::behavior::{BehaviorAttacher, SourceAttacher};
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::AssemblyError;
use crate::instruction::{AssistantReply, Instruction};
use crate::math::UVec2;
use crate::registry::NodeRegistry;
use crate::resource::ResourceLoader;
use crate::tree::{NodeId, SceneTree};
use crate::value::Value;

// ── AssemblerConfig ─────────────────────────────────────────────────────

/// Tunables for a [`SceneAssembler`].
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes:
///
/// ```json
/// { "behavior_language": "GDScript", "default_tile_size": [32, 32] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// The one language `attach_script` accepts (compared case-insensitively).
    pub behavior_language: String,
    /// Animation name used when a `sprite_frames` entry has no `animation_name`.
    pub default_animation: String,
    /// Tile size used when a `tile_set` omits `tile_width`/`tile_height`.
    pub default_tile_size: UVec2,
    /// Zoom components smaller than this in magnitude count as zero.
    pub zoom_epsilon: f32,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            behavior_language: "GDScript".to_string(),
            default_animation: "default".to_string(),
            default_tile_size: UVec2::splat(16),
            zoom_epsilon: 1e-5,
        }
    }
}

impl AssemblerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_behavior_language(mut self, language: impl Into<String>) -> Self {
        self.behavior_language = language.into();
        self
    }

    pub fn with_default_animation(mut self, name: impl Into<String>) -> Self {
        self.default_animation = name.into();
        self
    }

    pub fn with_default_tile_size(mut self, width: u32, height: u32) -> Self {
        self.default_tile_size = UVec2::new(width, height);
        self
    }

    pub fn with_zoom_epsilon(mut self, epsilon: f32) -> Self {
        self.zoom_epsilon = epsilon;
        self
    }
}

// ── BatchReport ─────────────────────────────────────────────────────────

/// One [`Outcome`] per instruction, in batch order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub root: NodeId,
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn skipped(&self) -> usize {
        self.len() - self.applied()
    }

    pub fn warnings(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_applied())
            .map(|o| o.errors().len())
            .sum()
    }

    /// Every instruction applied without warnings.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(Outcome::is_clean)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} instructions: {} applied, {} skipped, {} warnings",
            self.len(),
            self.applied(),
            self.skipped(),
            self.warnings()
        )
    }
}

// ── SceneAssembler ──────────────────────────────────────────────────────

/// Applies instruction batches to scene trees.
pub struct SceneAssembler<L, A = SourceAttacher> {
    registry: NodeRegistry,
    loader: L,
    attacher: A,
    config: AssemblerConfig,
}

impl<L: ResourceLoader> SceneAssembler<L> {
    /// An assembler with the default registry, the [`SourceAttacher`] and
    /// default configuration.
    pub fn new(loader: L) -> Self {
        Self {
            registry: NodeRegistry::default(),
            loader,
            attacher: SourceAttacher,
            config: AssemblerConfig::default(),
        }
    }
}

impl<L: ResourceLoader, A: BehaviorAttacher> SceneAssembler<L, A> {
    /// Swap in a different behavior attacher.
    pub fn with_attacher<B: BehaviorAttacher>(self, attacher: B) -> SceneAssembler<L, B> {
        SceneAssembler {
            registry: self.registry,
            loader: self.loader,
            attacher,
            config: self.config,
        }
    }

    pub fn with_registry(mut self, registry: NodeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn attacher(&self) -> &A {
        &self.attacher
    }

    /// Apply a batch under the tree's root and return the root.
    pub fn apply_instructions(&mut self, tree: &mut SceneTree, instructions: &[Instruction]) -> NodeId {
        self.apply_with_report(tree, instructions).root
    }

    /// Apply a batch and report what happened to each instruction.
    pub fn apply_with_report(&mut self, tree: &mut SceneTree, instructions: &[Instruction]) -> BatchReport {
        let root = tree.root();
        self.run(tree, root, instructions.iter().cloned().map(Ok))
    }

    /// Apply a batch under `root`, which may be any node of the tree.
    ///
    /// New nodes become children of `root` and are owned by it; names are
    /// resolved within its subtree.
    pub fn apply_under(
        &mut self,
        tree: &mut SceneTree,
        root: NodeId,
        instructions: &[Instruction],
    ) -> BatchReport {
        self.run(tree, root, instructions.iter().cloned().map(Ok))
    }

    /// Apply raw JSON tasks. Tasks that do not parse are reported as skipped.
    pub fn apply_tasks(&mut self, tree: &mut SceneTree, tasks: &[Value]) -> BatchReport {
        let root = tree.root();
        self.run(tree, root, tasks.iter().map(Instruction::from_value))
    }

    /// Apply the tasks of an assistant reply.
    pub fn apply_reply(&mut self, tree: &mut SceneTree, reply: &AssistantReply) -> BatchReport {
        if !reply.message.is_empty() {
            log::info!("Assistant: {}", reply.message);
        }
        self.apply_tasks(tree, &reply.tasks)
    }

    fn run(
        &mut self,
        tree: &mut SceneTree,
        root: NodeId,
        instructions: impl Iterator<Item = Result<Instruction, AssemblyError>>,
    ) -> BatchReport {
        let mut outcomes = Vec::new();
        if tree.get(root).is_none() {
            log::warn!("Batch root #{} is not part of the tree", root.index());
            return BatchReport { root, outcomes };
        }

        let mut dispatcher = Dispatcher {
            registry: &self.registry,
            loader: &mut self.loader,
            attacher: &mut self.attacher,
            config: &self.config,
        };
        for (i, parsed) in instructions.enumerate() {
            let outcome = match parsed {
                Ok(instruction) => dispatcher.apply(&instruction, tree, root),
                Err(e) => {
                    log::warn!("Skipped task {i}: {e}");
                    Outcome::Skipped(e)
                }
            };
            outcomes.push(outcome);
        }

        let report = BatchReport { root, outcomes };
        log::info!("Applied batch under '{}': {}", tree[root].name(), report);
        report
    }
}
