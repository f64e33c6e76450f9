//! # Nodes: Typed Scene Entities
//!
//! A [`Node`] is one addressable entry in a [`SceneTree`](crate::tree::SceneTree):
//! a unique name, the type name it was created from, its hierarchy links, and
//! its per-kind state.
//!
//! ## Closed Kinds, Open Type Names
//!
//! Type names are open (`"CharacterBody2D"`, `"StaticBody2D"`, anything a
//! host registers), but the *behavior* behind them is a closed set:
//!
//! ```text
//!  type name            NodeKind         NodeData payload
//!  ─────────────────    ──────────────   ─────────────────────────────
//!  Node                 Generic          (none)
//!  Node2D, *Body2D      Spatial          (none)
//!  Sprite2D             Sprite           SpriteState
//!  AnimatedSprite2D     AnimatedSprite   AnimatedSpriteState
//!  CollisionShape2D     CollisionShape   CollisionState
//!  Camera2D             Camera           CameraState
//!  TileMapLayer         TileLayer        TileLayerState
//! ```
//!
//! The kind is resolved once when the node is created; configuration then
//! matches on [`NodeData`] instead of probing the node's type over and over.
//!
//! ## The `set` Capability
//!
//! Every kind answers [`Node::set`] for the plain properties it models
//! (`visible`, `flip_h`, a camera's `offset`, ...). Keys that a
//! specialized configurator owns are listed in [`NodeKind::reserved_keys`] and
//! never reach `set` through the generic path. Keys a kind doesn't model at
//! all land in the node's dynamic property bag, so a best guess from the
//! instruction source is kept rather than dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::behavior::Behavior;
use crate::configure::frames::SpriteFrames;
use crate::configure::shape::Shape2d;
use crate::configure::tile::TileSet;
use crate::error::AssemblyError;
use crate::math::{Region, Transform2d, Vec2};
use crate::resource::Texture;
use crate::tree::NodeId;
use crate::value::{self, Value};

// ── NodeKind ────────────────────────────────────────────────────────────

/// The behavior tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Generic,
    Spatial,
    Sprite,
    AnimatedSprite,
    CollisionShape,
    Camera,
    TileLayer,
}

const SPATIAL_KEYS: &[&str] = &["position"];
const SPRITE_KEYS: &[&str] = &["position", "texture", "frame_width", "frame_height", "frame_index"];
const ANIMATED_SPRITE_KEYS: &[&str] = &["position", "sprite_frames"];
const COLLISION_KEYS: &[&str] = &[
    "position",
    "shape_type",
    "shape_size",
    "shape_extents",
    "shape_radius",
    "shape_position",
];
const CAMERA_KEYS: &[&str] = &["position", "zoom"];
const TILE_LAYER_KEYS: &[&str] = &["position", "tile_set"];

impl NodeKind {
    /// Everything except `Generic` has a 2D transform.
    pub fn is_spatial(self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// Property keys consumed by specialized configurators for this kind.
    pub fn reserved_keys(self) -> &'static [&'static str] {
        match self {
            Self::Generic => &[],
            Self::Spatial => SPATIAL_KEYS,
            Self::Sprite => SPRITE_KEYS,
            Self::AnimatedSprite => ANIMATED_SPRITE_KEYS,
            Self::CollisionShape => COLLISION_KEYS,
            Self::Camera => CAMERA_KEYS,
            Self::TileLayer => TILE_LAYER_KEYS,
        }
    }

    /// Fresh per-kind state.
    pub fn instantiate(self) -> NodeData {
        match self {
            Self::Generic => NodeData::Generic,
            Self::Spatial => NodeData::Spatial,
            Self::Sprite => NodeData::Sprite(SpriteState::default()),
            Self::AnimatedSprite => NodeData::AnimatedSprite(AnimatedSpriteState::default()),
            Self::CollisionShape => NodeData::CollisionShape(CollisionState::default()),
            Self::Camera => NodeData::Camera(CameraState::default()),
            Self::TileLayer => NodeData::TileLayer(TileLayerState::default()),
        }
    }
}

// ── Per-kind state ──────────────────────────────────────────────────────

/// Transform and draw-order state shared by all spatial kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spatial {
    pub transform: Transform2d,
    pub visible: bool,
    pub z_index: i32,
}

impl Default for Spatial {
    fn default() -> Self {
        Self {
            transform: Transform2d::IDENTITY,
            visible: true,
            z_index: 0,
        }
    }
}

impl Spatial {
    fn set(&mut self, key: &str, value: &Value) -> Result<bool, AssemblyError> {
        match key {
            "rotation" => self.transform.rotation = expect(key, value, value::as_f32)?,
            "rotation_degrees" => {
                self.transform.rotation = expect(key, value, value::as_f32)?.to_radians()
            }
            "scale" => self.transform.scale = expect(key, value, value::as_vec2)?,
            "visible" => self.visible = expect(key, value, value::as_bool)?,
            "z_index" => {
                let z = expect(key, value, value::as_i64)?;
                self.z_index = i32::try_from(z)
                    .map_err(|_| AssemblyError::invalid(key, format!("{z} is out of range")))?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A single textured sprite, optionally showing one region of its texture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpriteState {
    pub texture: Option<Texture>,
    pub region: Option<Region>,
    pub centered: bool,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Default for SpriteState {
    fn default() -> Self {
        Self {
            texture: None,
            region: None,
            centered: true,
            flip_h: false,
            flip_v: false,
        }
    }
}

/// A sprite driven by a named animation set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimatedSpriteState {
    pub frames: Option<SpriteFrames>,
    /// The currently selected animation.
    pub animation: String,
    pub frame: u32,
    pub speed_scale: f32,
    /// Animation that starts playing when the scene loads.
    pub autoplay: Option<String>,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Default for AnimatedSpriteState {
    fn default() -> Self {
        Self {
            frames: None,
            animation: "default".to_string(),
            frame: 0,
            speed_scale: 1.0,
            autoplay: None,
            flip_h: false,
            flip_v: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollisionState {
    /// Owned exclusively by this node; replacing it drops the previous one.
    pub shape: Option<Shape2d>,
    pub disabled: bool,
    pub one_way_collision: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraState {
    pub zoom: Vec2,
    pub offset: Vec2,
    pub enabled: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            zoom: Vec2::ONE,
            offset: Vec2::ZERO,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayerState {
    pub tile_set: Option<TileSet>,
    pub enabled: bool,
}

impl Default for TileLayerState {
    fn default() -> Self {
        Self {
            tile_set: None,
            enabled: true,
        }
    }
}

/// Per-kind node state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum NodeData {
    Generic,
    Spatial,
    Sprite(SpriteState),
    AnimatedSprite(AnimatedSpriteState),
    CollisionShape(CollisionState),
    Camera(CameraState),
    TileLayer(TileLayerState),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Generic => NodeKind::Generic,
            Self::Spatial => NodeKind::Spatial,
            Self::Sprite(_) => NodeKind::Sprite,
            Self::AnimatedSprite(_) => NodeKind::AnimatedSprite,
            Self::CollisionShape(_) => NodeKind::CollisionShape,
            Self::Camera(_) => NodeKind::Camera,
            Self::TileLayer(_) => NodeKind::TileLayer,
        }
    }

    /// Typed keys this kind models. `Ok(false)` means "not one of mine".
    fn set(&mut self, key: &str, value: &Value) -> Result<bool, AssemblyError> {
        match self {
            Self::Generic | Self::Spatial => return Ok(false),
            Self::Sprite(s) => match key {
                "centered" => s.centered = expect(key, value, value::as_bool)?,
                "flip_h" => s.flip_h = expect(key, value, value::as_bool)?,
                "flip_v" => s.flip_v = expect(key, value, value::as_bool)?,
                _ => return Ok(false),
            },
            Self::AnimatedSprite(s) => match key {
                "animation" => s.animation = expect(key, value, |v| v.as_str().map(str::to_string))?,
                "frame" => {
                    let frame = expect(key, value, value::as_i64)?;
                    s.frame = u32::try_from(frame)
                        .map_err(|_| AssemblyError::invalid(key, "must be a frame index"))?;
                }
                "speed_scale" => s.speed_scale = expect(key, value, value::as_f32)?,
                "flip_h" => s.flip_h = expect(key, value, value::as_bool)?,
                "flip_v" => s.flip_v = expect(key, value, value::as_bool)?,
                _ => return Ok(false),
            },
            Self::CollisionShape(s) => match key {
                "disabled" => s.disabled = expect(key, value, value::as_bool)?,
                "one_way_collision" => s.one_way_collision = expect(key, value, value::as_bool)?,
                _ => return Ok(false),
            },
            Self::Camera(s) => match key {
                "enabled" => s.enabled = expect(key, value, value::as_bool)?,
                "offset" => s.offset = expect(key, value, value::as_vec2)?,
                _ => return Ok(false),
            },
            Self::TileLayer(s) => match key {
                "enabled" => s.enabled = expect(key, value, value::as_bool)?,
                _ => return Ok(false),
            },
        }
        Ok(true)
    }
}

fn expect<T>(
    key: &str,
    value: &Value,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Result<T, AssemblyError> {
    convert(value).ok_or_else(|| AssemblyError::malformed(key, format!("unexpected value {value}")))
}

// ── Node ────────────────────────────────────────────────────────────────

/// One entry in a scene tree.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    name: String,
    type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    spatial: Option<Spatial>,
    data: NodeData,
    #[serde(skip_serializing_if = "Option::is_none")]
    behavior: Option<Behavior>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Value>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) owner: Option<NodeId>,
}

impl Node {
    /// A detached node. It gets a parent and owner once added to a tree.
    pub fn new(name: &str, type_name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            spatial: kind.is_spatial().then(Spatial::default),
            data: kind.instantiate(),
            behavior: None,
            properties: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            owner: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered type name the node was created from.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    pub fn spatial(&self) -> Option<&Spatial> {
        self.spatial.as_ref()
    }

    /// `None` for non-spatial nodes.
    pub fn position(&self) -> Option<Vec2> {
        self.spatial.as_ref().map(|s| s.transform.position)
    }

    /// Returns `false` (and changes nothing) for non-spatial nodes.
    pub fn set_position(&mut self, position: Vec2) -> bool {
        match &mut self.spatial {
            Some(s) => {
                s.transform.position = position;
                true
            }
            None => false,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The ownership tag used to group nodes for serialization.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn behavior(&self) -> Option<&Behavior> {
        self.behavior.as_ref()
    }

    pub fn set_behavior(&mut self, behavior: Behavior) {
        self.behavior = Some(behavior);
    }

    /// A value stored in the dynamic property bag.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Keys owned by specialized configurators for this node's kind.
    pub fn reserved_keys(&self) -> &'static [&'static str] {
        self.kind().reserved_keys()
    }

    /// Assign a property by name.
    ///
    /// Typed keys of the node's kind are converted and validated; anything
    /// else is stored verbatim in the dynamic property bag.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<(), AssemblyError> {
        if let Some(spatial) = &mut self.spatial {
            if spatial.set(key, value)? {
                return Ok(());
            }
        }
        if self.data.set(key, value)? {
            return Ok(());
        }
        log::debug!(
            "'{}' ({}) has no typed property '{}', keeping it as a dynamic value",
            self.name,
            self.type_name,
            key
        );
        self.properties.insert(key.to_string(), value.clone());
        Ok(())
    }

    // ── Typed state accessors ───────────────────────────────────────

    pub fn sprite(&self) -> Option<&SpriteState> {
        match &self.data {
            NodeData::Sprite(s) => Some(s),
            _ => None,
        }
    }

    pub fn animated_sprite(&self) -> Option<&AnimatedSpriteState> {
        match &self.data {
            NodeData::AnimatedSprite(s) => Some(s),
            _ => None,
        }
    }

    pub fn collision(&self) -> Option<&CollisionState> {
        match &self.data {
            NodeData::CollisionShape(s) => Some(s),
            _ => None,
        }
    }

    pub fn camera(&self) -> Option<&CameraState> {
        match &self.data {
            NodeData::Camera(s) => Some(s),
            _ => None,
        }
    }

    pub fn tile_layer(&self) -> Option<&TileLayerState> {
        match &self.data {
            NodeData::TileLayer(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_generic_nodes_lack_a_transform() {
        let generic = Node::new("Root", "Node", NodeKind::Generic);
        let mut spatial = Node::new("Game", "Node2D", NodeKind::Spatial);

        assert_eq!(generic.position(), None);
        assert!(spatial.set_position(Vec2::new(3.0, 4.0)));
        assert_eq!(spatial.position(), Some(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn typed_keys_are_converted() {
        let mut sprite = Node::new("Hero", "AnimatedSprite2D", NodeKind::AnimatedSprite);
        sprite.set("flip_h", &json!(true)).unwrap();
        sprite.set("speed_scale", &json!("2.5")).unwrap();
        sprite.set("z_index", &json!(3)).unwrap();
        sprite.set("rotation_degrees", &json!(180)).unwrap();

        let state = sprite.animated_sprite().unwrap();
        assert!(state.flip_h);
        assert_eq!(state.speed_scale, 2.5);
        let spatial = sprite.spatial().unwrap();
        assert_eq!(spatial.z_index, 3);
        assert!((spatial.transform.rotation - std::f32::consts::PI).abs() < 1e-5);
        assert!(sprite.properties().is_empty());
    }

    #[test]
    fn wrong_shape_on_typed_key_is_malformed_and_leaves_state() {
        let mut camera = Node::new("Cam", "Camera2D", NodeKind::Camera);
        let err = camera.set("offset", &json!("left")).unwrap_err();

        assert!(matches!(err, AssemblyError::MalformedProperty { .. }));
        assert_eq!(camera.camera().unwrap().offset, Vec2::ZERO);
    }

    #[test]
    fn unknown_keys_are_kept_as_dynamic_values() {
        let mut body = Node::new("Hero", "CharacterBody2D", NodeKind::Spatial);
        body.set("motion_mode", &json!("floating")).unwrap();

        assert_eq!(body.property("motion_mode"), Some(&json!("floating")));
    }

    #[test]
    fn reserved_keys_follow_kind() {
        assert!(NodeKind::Camera.reserved_keys().contains(&"zoom"));
        assert!(NodeKind::CollisionShape.reserved_keys().contains(&"shape_radius"));
        assert!(NodeKind::Generic.reserved_keys().is_empty());
        assert!(!NodeKind::Spatial.reserved_keys().contains(&"zoom"));
    }
}
