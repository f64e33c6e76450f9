//! Math types and glam re-exports.
//!
//! Scene nodes live in 2D, so only the 2D half of [glam](https://docs.rs/glam)
//! is re-exported. [`Transform2d`] holds a spatial node's position, rotation
//! and scale; [`Region`] is a pixel rectangle inside a texture.

use serde::Serialize;

pub use glam::{UVec2, Vec2};

/// A 2D transform: position, rotation (radians) and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform2d {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform2d {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform2d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A rectangle within a texture, in whole pixels.
///
/// `origin` is the top-left corner; (0,0) is the top-left of the texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub origin: UVec2,
    pub size: UVec2,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            origin: UVec2::new(x, y),
            size: UVec2::new(width, height),
        }
    }

    /// The bottom-right corner (exclusive).
    pub fn end(&self) -> UVec2 {
        self.origin + self.size
    }

    /// Whether the region lies entirely inside a texture of the given size.
    pub fn fits_within(&self, texture_size: UVec2) -> bool {
        let end = self.end();
        end.x <= texture_size.x && end.y <= texture_size.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_fits_within_texture() {
        let region = Region::new(56, 56, 8, 8);
        assert_eq!(region.end(), UVec2::new(64, 64));
        assert!(region.fits_within(UVec2::new(64, 64)));
        assert!(!region.fits_within(UVec2::new(63, 64)));
    }
}
