//! Tile layers.
//!
//! `tile_set` is an object with `tile_width`, `tile_height` and an optional
//! `texture`. The tile size always applies; a texture that fails to load is
//! reported, and the tile set is kept without an atlas source.

use serde::Serialize;

use crate::error::AssemblyError;
use crate::math::UVec2;
use crate::node::{Node, NodeData};
use crate::resource::Texture;
use crate::value::Props;

use super::ConfigContext;

const KEY: &str = "tile_set";

/// A texture cut into fixed-size tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtlasSource {
    pub texture: Texture,
    pub region_size: UVec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSet {
    pub tile_size: UVec2,
    pub sources: Vec<AtlasSource>,
}

impl TileSet {
    pub fn new(tile_size: UVec2) -> Self {
        Self {
            tile_size,
            sources: Vec::new(),
        }
    }

    /// Add a source whose cells match the tile size.
    pub fn add_source(&mut self, texture: Texture) {
        self.sources.push(AtlasSource {
            texture,
            region_size: self.tile_size,
        });
    }
}

/// Runs when the bag has `tile_set`.
pub fn configure(
    node: &mut Node,
    props: Props<'_>,
    ctx: &mut ConfigContext<'_>,
) -> Result<(), AssemblyError> {
    let Some(value) = props.get(KEY) else {
        return Ok(());
    };
    let tile_props = Props::from_value(KEY, value)?;

    let default = ctx.config.default_tile_size;
    let tile_size = UVec2::new(
        tile_dimension(tile_props, "tile_width", default.x)?,
        tile_dimension(tile_props, "tile_height", default.y)?,
    );
    let texture_path = tile_props.optional_str("texture")?;

    let NodeData::TileLayer(state) = node.data_mut() else {
        return Err(AssemblyError::malformed(KEY, "node is not a tile layer"));
    };

    let mut tile_set = TileSet::new(tile_size);
    let loaded = texture_path.map(|path| ctx.loader.load_texture(path));
    let result = match loaded {
        Some(Ok(texture)) => {
            tile_set.add_source(texture);
            Ok(())
        }
        Some(Err(e)) => Err(e.into()),
        None => Ok(()),
    };
    state.tile_set = Some(tile_set);
    result
}

fn tile_dimension(props: Props<'_>, key: &str, default: u32) -> Result<u32, AssemblyError> {
    let n = props.i64_or(key, i64::from(default))?;
    u32::try_from(n)
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| AssemblyError::invalid(key, format!("{n} is not a positive tile size")))
}
