//! # Resources: Shared Textures
//!
//! Sprites, animation frames and tile sources all point at textures. The
//! assembler never reads files itself: it asks an injected [`ResourceLoader`]
//! for a [`Texture`] by path and stores what comes back.
//!
//! ## The Handle Pattern
//!
//! A [`Texture`] is a small value: a [`TextureHandle`] (an index the loader
//! hands out), the path it was loaded from, and its pixel size. Nodes hold
//! copies of it, never the image data, so the same texture can be attached to
//! any number of sprites and tile layers at once. Two loads of the same path
//! through the same loader yield the same handle.
//!
//! ```text
//! TextureCache<L>
//! ┌──────────────────────────────────────────┐
//! │ cache: HashMap<String, Texture>          │
//! │   "res://knight.png" → Handle(0) 64x64   │
//! │   "res://tiles.png"  → Handle(1) 256x128 │
//! │                                          │
//! │ inner: L  ◄── only asked on a cache miss │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Failed loads are never cached, so fixing a missing file and re-applying a
//! batch picks the texture up.
//!
//! ## Loaders
//!
//! - [`MemoryLoader`]: a table of known paths and sizes. Used by tests and by
//!   hosts that already know their assets.
//! - [`ImageLoader`] (feature `fs-loader`): resolves `res://` paths against a
//!   project directory and reads the image header with the `image` crate.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ResourceError;
use crate::math::UVec2;

#[cfg(feature = "fs-loader")]
mod image_loader;

#[cfg(feature = "fs-loader")]
pub use image_loader::ImageLoader;

/// Identifies a texture within the loader that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A loaded texture, shared by reference between every node that uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Texture {
    handle: TextureHandle,
    path: Arc<str>,
    size: UVec2,
}

impl Texture {
    pub fn new(handle: TextureHandle, path: &str, size: UVec2) -> Self {
        Self {
            handle,
            path: Arc::from(path),
            size,
        }
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Size in pixels.
    pub fn size(&self) -> UVec2 {
        self.size
    }
}

/// Loads textures by path.
pub trait ResourceLoader {
    fn load_texture(&mut self, path: &str) -> Result<Texture, ResourceError>;
}

impl<L: ResourceLoader + ?Sized> ResourceLoader for &mut L {
    fn load_texture(&mut self, path: &str) -> Result<Texture, ResourceError> {
        (**self).load_texture(path)
    }
}

impl<L: ResourceLoader + ?Sized> ResourceLoader for Box<L> {
    fn load_texture(&mut self, path: &str) -> Result<Texture, ResourceError> {
        (**self).load_texture(path)
    }
}

// ── TextureCache ────────────────────────────────────────────────────────

/// Wraps a loader and deduplicates successful loads by path.
#[derive(Debug)]
pub struct TextureCache<L> {
    inner: L,
    cache: HashMap<String, Texture>,
}

impl<L: ResourceLoader> TextureCache<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
        }
    }

    /// Number of distinct textures loaded so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: ResourceLoader> ResourceLoader for TextureCache<L> {
    fn load_texture(&mut self, path: &str) -> Result<Texture, ResourceError> {
        if let Some(texture) = self.cache.get(path) {
            return Ok(texture.clone());
        }
        let texture = self.inner.load_texture(path)?;
        log::debug!(
            "Loaded texture '{}' ({}x{})",
            path,
            texture.size.x,
            texture.size.y
        );
        self.cache.insert(path.to_string(), texture.clone());
        Ok(texture)
    }
}

// ── MemoryLoader ────────────────────────────────────────────────────────

/// A loader backed by a table of known texture paths and sizes.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    textures: HashMap<String, Texture>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture. Re-registering a path keeps its handle and updates
    /// the size.
    pub fn insert(&mut self, path: &str, width: u32, height: u32) -> TextureHandle {
        let next = TextureHandle(self.textures.len() as u32);
        let handle = self.textures.get(path).map_or(next, |t| t.handle);
        self.textures.insert(
            path.to_string(),
            Texture::new(handle, path, UVec2::new(width, height)),
        );
        handle
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_texture(mut self, path: &str, width: u32, height: u32) -> Self {
        self.insert(path, width, height);
        self
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl ResourceLoader for MemoryLoader {
    fn load_texture(&mut self, path: &str) -> Result<Texture, ResourceError> {
        self.textures
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts how often the inner loader is asked.
    struct Counting {
        inner: MemoryLoader,
        calls: usize,
    }

    impl ResourceLoader for Counting {
        fn load_texture(&mut self, path: &str) -> Result<Texture, ResourceError> {
            self.calls += 1;
            self.inner.load_texture(path)
        }
    }

    #[test]
    fn memory_loader_hands_out_stable_handles() {
        let mut loader = MemoryLoader::new()
            .with_texture("res://a.png", 64, 64)
            .with_texture("res://b.png", 32, 16);

        let a1 = loader.load_texture("res://a.png").unwrap();
        let a2 = loader.load_texture("res://a.png").unwrap();
        let b = loader.load_texture("res://b.png").unwrap();

        assert_eq!(a1, a2);
        assert_ne!(a1.handle(), b.handle());
        assert_eq!(b.size(), UVec2::new(32, 16));
    }

    #[test]
    fn reinserting_keeps_the_handle() {
        let mut loader = MemoryLoader::new();
        let first = loader.insert("res://a.png", 8, 8);
        let second = loader.insert("res://a.png", 16, 16);
        assert_eq!(first, second);
        assert_eq!(loader.len(), 1);
    }

    #[test]
    fn missing_texture_is_not_found() {
        let mut loader = MemoryLoader::new();
        assert_eq!(
            loader.load_texture("res://nope.png"),
            Err(ResourceError::NotFound("res://nope.png".into()))
        );
    }

    #[test]
    fn cache_only_asks_inner_once_per_path() {
        let mut cache = TextureCache::new(Counting {
            inner: MemoryLoader::new().with_texture("res://a.png", 4, 4),
            calls: 0,
        });

        cache.load_texture("res://a.png").unwrap();
        cache.load_texture("res://a.png").unwrap();
        assert_eq!(cache.inner().calls, 1);
        assert_eq!(cache.len(), 1);

        // Failures are retried, not cached.
        assert!(cache.load_texture("res://missing.png").is_err());
        assert!(cache.load_texture("res://missing.png").is_err());
        assert_eq!(cache.inner().calls, 3);
    }
}
