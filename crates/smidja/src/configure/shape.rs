//! # Collision Shapes
//!
//! A collision node owns exactly one [`Shape2d`]. Configuring it replaces the
//! previous shape wholesale.
//!
//! | `shape_type`           | short form       | parameters                        |
//! |------------------------|------------------|-----------------------------------|
//! | `RectangleShape2D`     | `rectangle`      | `shape_size` or `shape_extents`   |
//! | `CircleShape2D`        | `circle`         | `shape_radius` (default `1.0`)    |
//! | `WorldBoundaryShape2D` | `world_boundary` | none                              |
//!
//! ## Rectangle Convention
//!
//! [`Shape2d::Rectangle`] stores the **full** size. `shape_size` is read as a
//! full size; `shape_extents` is read as half extents and doubled. When both
//! are given, `shape_size` wins.
//!
//! ```text
//!   shape_size    {x: 32, y: 64}   ──► Rectangle { size: 32x64 }
//!   shape_extents {x: 16, y: 32}   ──► Rectangle { size: 32x64 }
//! ```
//!
//! `shape_position` moves the collision node. Without it the node goes back
//! to the origin, unless the same bag also sets `position`.

use serde::Serialize;

use crate::error::AssemblyError;
use crate::math::Vec2;
use crate::node::{Node, NodeData};
use crate::value::Props;

/// A collision shape description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Shape2d {
    /// Axis-aligned box, full width and height.
    Rectangle { size: Vec2 },
    Circle { radius: f32 },
    /// An infinite line the body cannot cross.
    WorldBoundary,
}

impl Shape2d {
    /// Half extents of the shape's bounding box. `None` for unbounded shapes.
    pub fn half_extents(&self) -> Option<Vec2> {
        match *self {
            Self::Rectangle { size } => Some(size * 0.5),
            Self::Circle { radius } => Some(Vec2::splat(radius)),
            Self::WorldBoundary => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    WorldBoundary,
}

impl ShapeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RectangleShape2D" => return Some(Self::Rectangle),
            "CircleShape2D" => return Some(Self::Circle),
            "WorldBoundaryShape2D" => return Some(Self::WorldBoundary),
            _ => {}
        }
        match name.trim().to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Some(Self::Rectangle),
            "circle" => Some(Self::Circle),
            "world_boundary" | "worldboundary" => Some(Self::WorldBoundary),
            _ => None,
        }
    }
}

/// Build a shape of the given kind from a property bag.
pub fn build_shape(kind: ShapeKind, props: Props<'_>) -> Result<Shape2d, AssemblyError> {
    match kind {
        ShapeKind::Rectangle => {
            let size = match (props.optional_vec2("shape_size")?, props.optional_vec2("shape_extents")?) {
                (Some(size), _) => size,
                (None, Some(extents)) => extents * 2.0,
                (None, None) => {
                    return Err(AssemblyError::malformed(
                        "shape_size",
                        "a rectangle needs shape_size or shape_extents",
                    ));
                }
            };
            if !size.is_finite() || size.x < 0.0 || size.y < 0.0 {
                return Err(AssemblyError::invalid("shape_size", format!("{size} is not a valid size")));
            }
            Ok(Shape2d::Rectangle { size })
        }
        ShapeKind::Circle => {
            let radius = props.f32_or("shape_radius", 1.0)?;
            if !radius.is_finite() || radius <= 0.0 {
                return Err(AssemblyError::invalid("shape_radius", format!("{radius} is not positive")));
            }
            Ok(Shape2d::Circle { radius })
        }
        ShapeKind::WorldBoundary => Ok(Shape2d::WorldBoundary),
    }
}

/// Runs when the bag has a `shape_type`.
pub fn configure(node: &mut Node, props: Props<'_>) -> Result<(), AssemblyError> {
    let Some(type_name) = props.optional_str("shape_type")? else {
        if props.has("shape_size") || props.has("shape_extents") || props.has("shape_radius") {
            return Err(AssemblyError::malformed("shape_type", "shape parameters without a shape_type"));
        }
        return Ok(());
    };

    let kind = ShapeKind::from_name(type_name).ok_or_else(|| {
        AssemblyError::malformed("shape_type", format!("unsupported shape '{type_name}'"))
    })?;
    let position = match props.optional_vec2("shape_position")? {
        Some(p) => Some(p),
        None if props.has("position") => None,
        None => Some(Vec2::ZERO),
    };
    let shape = build_shape(kind, props)?;

    let NodeData::CollisionShape(state) = node.data_mut() else {
        return Err(AssemblyError::malformed("shape_type", "node is not a collision shape"));
    };
    state.shape = Some(shape);
    if let Some(position) = position {
        node.set_position(position);
    }
    Ok(())
}
