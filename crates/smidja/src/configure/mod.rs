//! # Configurators: Property Bags to Node State
//!
//! A `set_properties` instruction carries a loosely-typed map. Turning it into
//! node state happens in three passes, resolved once from the node's
//! [`NodeKind`]:
//!
//! ```text
//!  properties ──► spatial ──► kind-specific ──────────────► generic
//!                 position    Sprite          → sprite      every key not in
//!                             AnimatedSprite  → frames      reserved_keys(kind)
//!                             CollisionShape  → shape         → Node::set
//!                             Camera          → camera
//!                             TileLayer       → tile
//! ```
//!
//! Each step is independent. A step that fails leaves its own piece of state
//! as it was and is reported as a warning; the remaining steps still run.
//! Specialized configurators build their result completely before assigning
//! it, so a half-parsed atlas or shape never reaches the node.

pub mod camera;
pub mod frames;
pub mod generic;
pub mod shape;
pub mod spatial;
pub mod sprite;
pub mod tile;

use crate::engine::AssemblerConfig;
use crate::error::AssemblyError;
use crate::node::{Node, NodeKind};
use crate::resource::ResourceLoader;
use crate::value::Props;

/// Collaborators a configurator may need.
pub struct ConfigContext<'a> {
    pub loader: &'a mut dyn ResourceLoader,
    pub config: &'a AssemblerConfig,
}

/// Apply a property bag to a node.
///
/// Returns one warning per failed step; an empty list means everything
/// applied.
pub fn configure_node(
    node: &mut Node,
    props: Props<'_>,
    ctx: &mut ConfigContext<'_>,
) -> Vec<AssemblyError> {
    let mut warnings = Vec::new();
    let mut step = |result: Result<(), AssemblyError>| {
        if let Err(e) = result {
            warnings.push(e);
        }
    };

    let kind = node.kind();
    if kind.is_spatial() {
        step(spatial::configure(node, props));
    }

    match kind {
        NodeKind::Sprite => step(sprite::configure(node, props, ctx)),
        NodeKind::AnimatedSprite => step(frames::configure(node, props, ctx)),
        NodeKind::CollisionShape => step(shape::configure(node, props)),
        NodeKind::Camera => step(camera::configure(node, props, ctx.config)),
        NodeKind::TileLayer => step(tile::configure(node, props, ctx)),
        NodeKind::Generic | NodeKind::Spatial => {}
    }

    warnings.extend(generic::configure(node, props));
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::resource::MemoryLoader;
    use crate::value::Properties;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Properties {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn failing_step_does_not_stop_the_others() {
        let mut loader = MemoryLoader::new();
        let config = AssemblerConfig::default();
        let mut ctx = ConfigContext {
            loader: &mut loader,
            config: &config,
        };
        let mut cam = Node::new("Cam", "Camera2D", NodeKind::Camera);
        let map = props(json!({
            "position": {"x": 5, "y": 6},
            "zoom": {"x": 0, "y": 1},
            "enabled": false
        }));

        let warnings = configure_node(&mut cam, Props::new(&map), &mut ctx);

        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], AssemblyError::InvalidNumericParameter { .. }));
        assert_eq!(cam.position(), Some(Vec2::new(5.0, 6.0)));
        assert_eq!(cam.camera().unwrap().zoom, Vec2::ONE);
        assert!(!cam.camera().unwrap().enabled);
    }

    #[test]
    fn generic_nodes_keep_position_as_a_dynamic_value() {
        let mut loader = MemoryLoader::new();
        let config = AssemblerConfig::default();
        let mut ctx = ConfigContext {
            loader: &mut loader,
            config: &config,
        };
        let mut node = Node::new("Holder", "Node", NodeKind::Generic);
        let map = props(json!({"position": {"x": 1, "y": 2}}));

        let warnings = configure_node(&mut node, Props::new(&map), &mut ctx);

        assert!(warnings.is_empty());
        assert_eq!(node.position(), None);
        assert!(node.property("position").is_some());
    }
}
