//! Convenience re-exports: `use smidja::prelude::*` for the common items.

// Core
pub use crate::dispatch::Outcome;
pub use crate::engine::{AssemblerConfig, BatchReport, SceneAssembler};
pub use crate::error::{AssemblyError, BehaviorError, ResourceError};
pub use crate::instruction::{AssistantReply, Instruction};
pub use crate::math::{Region, Transform2d, UVec2, Vec2};
pub use crate::node::{Node, NodeData, NodeKind};
pub use crate::registry::NodeRegistry;
pub use crate::tree::{NodeId, SceneTree};

// Collaborators
pub use crate::behavior::{Behavior, BehaviorAttacher, SourceAttacher};
pub use crate::resource::{MemoryLoader, ResourceLoader, Texture, TextureCache, TextureHandle};
#[cfg(feature = "fs-loader")]
pub use crate::resource::ImageLoader;

// Node state
pub use crate::configure::frames::{Animation, AtlasFrame, SpriteFrames};
pub use crate::configure::shape::Shape2d;
pub use crate::configure::tile::{AtlasSource, TileSet};
