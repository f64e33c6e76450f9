//! # Sprite Atlas Animations
//!
//! An animated sprite's `sprite_frames` value describes how to cut one
//! texture into a grid and which cells form an animation:
//!
//! ```json
//! "sprite_frames": {
//!     "texture": "res://assets/knight.png",
//!     "frames_horizontal_count": 8,
//!     "frames_vertical_count": 8,
//!     "frames_count": 4,
//!     "animation_name": "idle",
//!     "frame_duration": 0.1,
//!     "autoplay": true
//! }
//! ```
//!
//! The texture is divided evenly into `columns x rows` cells and the first
//! `frames_count` cells are taken in row-major order:
//!
//! ```text
//!  64x64 texture, 8x8 grid → 8x8 px cells
//!  ┌────┬────┬────┬────┬────┬─ ─ ─┐
//!  │ 0  │ 1  │ 2  │ 3  │    │     │   frame i → row i / columns
//!  ├────┼────┼────┼────┼────┼─ ─ ─┤             col i % columns
//!  │    │    │    │    │    │     │
//!  └────┴────┴────┴────┴────┴─ ─ ─┘
//! ```
//!
//! A list of such objects registers several animations into one
//! [`SpriteFrames`] set. The first entry becomes the selected animation, and
//! the first entry with `autoplay` becomes the autoplay animation.
//!
//! Every animation loops and plays at `1 / frame_duration` frames per second.
//! `frames_count` is capped at [`MAX_FRAMES_PER_ANIMATION`].
//! The whole set is built before anything is assigned, so configuring the
//! same node twice with the same bag produces identical frames.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AssemblyError;
use crate::math::{Region, UVec2};
use crate::node::{Node, NodeData};
use crate::resource::Texture;
use crate::value::{Props, Value};

use super::ConfigContext;

const KEY: &str = "sprite_frames";

/// Upper bound on `frames_count` for a single animation.
pub const MAX_FRAMES_PER_ANIMATION: u32 = 4096;

/// One animation frame: a region of a shared texture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtlasFrame {
    pub texture: Texture,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub frames: Vec<AtlasFrame>,
    pub looping: bool,
    /// Frames per second.
    pub speed: f32,
}

/// Named animations owned by one animated sprite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpriteFrames {
    animations: BTreeMap<String, Animation>,
}

impl SpriteFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an animation.
    pub fn insert(&mut self, name: &str, animation: Animation) {
        self.animations.insert(name.to_string(), animation);
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.animations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

// ── AtlasGrid ───────────────────────────────────────────────────────────

/// A texture divided evenly into `columns x rows` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasGrid {
    pub columns: u32,
    pub rows: u32,
    /// Size of one cell in pixels.
    pub cell: UVec2,
}

impl AtlasGrid {
    /// Cell size is `texture_size / (columns, rows)`, rounded down.
    pub fn new(texture_size: UVec2, columns: u32, rows: u32) -> Result<Self, AssemblyError> {
        if columns == 0 || rows == 0 {
            return Err(AssemblyError::invalid(
                "frames_horizontal_count",
                "grid needs at least one column and one row",
            ));
        }
        let cell = texture_size / UVec2::new(columns, rows);
        if cell.x == 0 || cell.y == 0 {
            return Err(AssemblyError::invalid(
                "texture",
                format!(
                    "{}x{} texture is too small for a {columns}x{rows} grid",
                    texture_size.x, texture_size.y
                ),
            ));
        }
        Ok(Self { columns, rows, cell })
    }

    pub fn capacity(&self) -> u32 {
        self.columns * self.rows
    }

    /// The region of frame `index`, counted row-major from the top-left.
    pub fn frame_region(&self, index: u32) -> Region {
        let row = index / self.columns;
        let col = index % self.columns;
        Region::new(col * self.cell.x, row * self.cell.y, self.cell.x, self.cell.y)
    }
}

// ── Animation entries ────────────────────────────────────────────────────

struct AnimationEntry<'a> {
    texture: &'a str,
    columns: u32,
    rows: u32,
    count: u32,
    name: String,
    duration: f32,
    autoplay: bool,
}

impl<'a> AnimationEntry<'a> {
    fn parse(props: Props<'a>, default_name: &str) -> Result<Self, AssemblyError> {
        let columns = count(props, "frames_horizontal_count")?;
        let rows = count(props, "frames_vertical_count")?;
        let frames = count(props, "frames_count")?;
        if frames > MAX_FRAMES_PER_ANIMATION {
            return Err(AssemblyError::invalid(
                "frames_count",
                format!("{frames} exceeds the limit of {MAX_FRAMES_PER_ANIMATION} frames"),
            ));
        }
        if frames > columns.saturating_mul(rows) {
            return Err(AssemblyError::invalid(
                "frames_count",
                format!("{frames} frames do not fit a {columns}x{rows} grid"),
            ));
        }

        let duration = props.f32_or("frame_duration", 1.0)?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(AssemblyError::invalid(
                "frame_duration",
                format!("{duration} is not a positive duration"),
            ));
        }

        let name = props
            .optional_str("animation_name")?
            .unwrap_or(default_name)
            .trim();
        if name.is_empty() {
            return Err(AssemblyError::malformed("animation_name", "must not be empty"));
        }

        Ok(Self {
            texture: props.required_str("texture")?,
            columns,
            rows,
            count: frames,
            name: name.to_string(),
            duration,
            autoplay: props.bool_or("autoplay", false)?,
        })
    }

    fn build(&self, ctx: &mut ConfigContext<'_>) -> Result<Animation, AssemblyError> {
        let texture = ctx.loader.load_texture(self.texture)?;
        let grid = AtlasGrid::new(texture.size(), self.columns, self.rows)?;
        let frames = (0..self.count)
            .map(|i| AtlasFrame {
                texture: texture.clone(),
                region: grid.frame_region(i),
            })
            .collect();
        Ok(Animation {
            frames,
            looping: true,
            speed: 1.0 / self.duration,
        })
    }
}

/// A grid count: an integer ≥ 1, defaulting to 1.
fn count(props: Props<'_>, key: &str) -> Result<u32, AssemblyError> {
    let n = props.i64_or(key, 1)?;
    u32::try_from(n)
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| AssemblyError::invalid(key, format!("{n} is not a positive count")))
}

// ── Configurator ────────────────────────────────────────────────────────

/// Runs when the bag has `sprite_frames`.
pub fn configure(
    node: &mut Node,
    props: Props<'_>,
    ctx: &mut ConfigContext<'_>,
) -> Result<(), AssemblyError> {
    let Some(value) = props.get(KEY) else {
        return Ok(());
    };

    let entries: Vec<&Value> = match value {
        Value::Array(items) if !items.is_empty() => items.iter().collect(),
        Value::Array(_) => return Err(AssemblyError::malformed(KEY, "no animations given")),
        other => vec![other],
    };

    let default_name = ctx.config.default_animation.clone();
    let mut frames = SpriteFrames::new();
    let mut selected = None;
    let mut autoplay = None;
    for entry in entries {
        let def = AnimationEntry::parse(Props::from_value(KEY, entry)?, &default_name)?;
        if frames.contains(&def.name) {
            return Err(AssemblyError::malformed(
                KEY,
                format!("animation '{}' is defined twice", def.name),
            ));
        }
        let animation = def.build(ctx)?;
        log::debug!(
            "'{}': animation '{}' with {} frames at {} fps",
            node.name(),
            def.name,
            animation.frames.len(),
            animation.speed
        );
        frames.insert(&def.name, animation);
        selected.get_or_insert_with(|| def.name.clone());
        if def.autoplay && autoplay.is_none() {
            autoplay = Some(def.name);
        }
    }

    let NodeData::AnimatedSprite(state) = node.data_mut() else {
        return Err(AssemblyError::malformed(KEY, "node is not an animated sprite"));
    };
    state.frames = Some(frames);
    if let Some(name) = selected {
        state.animation = name;
    }
    state.frame = 0;
    state.autoplay = autoplay;
    Ok(())
}
