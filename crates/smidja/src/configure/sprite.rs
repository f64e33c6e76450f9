//! Static sprites: a texture, optionally showing one frame of a sheet.
//!
//! With `frame_width` and `frame_height` the sprite shows a single cell of a
//! sheet laid out left to right, top to bottom:
//!
//! ```text
//!   per_row = texture_width / frame_width
//!   origin  = ((frame_index % per_row) * frame_width,
//!              (frame_index / per_row) * frame_height)
//! ```
//!
//! Without them the whole texture is shown.

use crate::error::AssemblyError;
use crate::math::{Region, UVec2};
use crate::node::{Node, NodeData};
use crate::value::Props;

use super::ConfigContext;

/// Runs when the bag has `texture` or any of the frame keys.
pub fn configure(
    node: &mut Node,
    props: Props<'_>,
    ctx: &mut ConfigContext<'_>,
) -> Result<(), AssemblyError> {
    let has_frame_keys =
        props.has("frame_width") || props.has("frame_height") || props.has("frame_index");
    if !props.has("texture") && !has_frame_keys {
        return Ok(());
    }

    let NodeData::Sprite(state) = node.data_mut() else {
        return Err(AssemblyError::malformed("texture", "node is not a sprite"));
    };

    let texture = match props.optional_str("texture")? {
        Some(path) => ctx.loader.load_texture(path)?,
        None => state.texture.clone().ok_or_else(|| {
            AssemblyError::malformed("texture", "frame keys given but the sprite has no texture")
        })?,
    };

    let region = if has_frame_keys {
        Some(frame_region(props, texture.size())?)
    } else {
        None
    };

    state.texture = Some(texture);
    state.region = region;
    Ok(())
}

fn frame_region(props: Props<'_>, texture_size: UVec2) -> Result<Region, AssemblyError> {
    let dimension = |key: &str| -> Result<u32, AssemblyError> {
        if !props.has(key) {
            return Err(AssemblyError::malformed(key, "frame_width and frame_height go together"));
        }
        let n = props.i64_or(key, 0)?;
        u32::try_from(n)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| AssemblyError::invalid(key, format!("{n} is not a positive size")))
    };
    let width = dimension("frame_width")?;
    let height = dimension("frame_height")?;

    let per_row = texture_size.x / width;
    if per_row == 0 {
        return Err(AssemblyError::invalid(
            "frame_width",
            format!("{width} is wider than the {} px texture", texture_size.x),
        ));
    }
    let rows = texture_size.y / height;
    if rows == 0 {
        return Err(AssemblyError::invalid(
            "frame_height",
            format!("{height} is taller than the {} px texture", texture_size.y),
        ));
    }

    // Every index below `frames` yields a region inside the texture.
    let frames = u64::from(per_row) * u64::from(rows);
    let index = props.i64_or("frame_index", 0)?;
    let index = u64::try_from(index)
        .ok()
        .filter(|&i| i < frames)
        .ok_or_else(|| {
            AssemblyError::invalid(
                "frame_index",
                format!("{index} is out of range for a sheet of {frames} frames"),
            )
        })?;
    let col = (index % u64::from(per_row)) as u32;
    let row = (index / u64::from(per_row)) as u32;

    Ok(Region::new(col * width, row * height, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AssemblerConfig;
    use crate::node::NodeKind;
    use crate::resource::MemoryLoader;
    use crate::value::{Properties, Value};
    use serde_json::json;

    fn run(node: &mut Node, value: Value) -> Result<(), AssemblyError> {
        let mut loader = MemoryLoader::new().with_texture("res://knight.png", 140, 70);
        let config = AssemblerConfig::default();
        let mut ctx = ConfigContext {
            loader: &mut loader,
            config: &config,
        };
        let map: Properties = serde_json::from_value(value).unwrap();
        configure(node, Props::new(&map), &mut ctx)
    }

    fn sprite() -> Node {
        Node::new("Knight", "Sprite2D", NodeKind::Sprite)
    }

    #[test]
    fn texture_alone_shows_the_whole_image() {
        let mut node = sprite();
        run(&mut node, json!({"texture": "res://knight.png"})).unwrap();

        let state = node.sprite().unwrap();
        assert_eq!(state.texture.as_ref().unwrap().size(), UVec2::new(140, 70));
        assert_eq!(state.region, None);
    }

    #[test]
    fn frame_index_wraps_to_the_next_row() {
        let mut node = sprite();
        run(&mut node, json!({
            "texture": "res://knight.png",
            "frame_width": 35,
            "frame_height": 35,
            "frame_index": 5
        }))
        .unwrap();

        // 140 / 35 = 4 frames per row, so frame 5 is row 1, column 1.
        assert_eq!(node.sprite().unwrap().region, Some(Region::new(35, 35, 35, 35)));
    }

    #[test]
    fn out_of_range_frame_is_rejected_atomically() {
        let mut node = sprite();
        let err = run(&mut node, json!({
            "texture": "res://knight.png",
            "frame_width": 35,
            "frame_height": 35,
            "frame_index": 8
        }))
        .unwrap_err();

        assert!(matches!(err, AssemblyError::InvalidNumericParameter { .. }));
        assert_eq!(node.sprite().unwrap().texture, None);
    }

    #[test]
    fn huge_or_negative_frame_index_is_rejected() {
        for index in [json!(4294967295u64), json!(1u64 << 40), json!(-1)] {
            let mut node = sprite();
            let err = run(&mut node, json!({
                "texture": "res://knight.png",
                "frame_width": 35,
                "frame_height": 35,
                "frame_index": index
            }))
            .unwrap_err();

            assert!(
                matches!(err, AssemblyError::InvalidNumericParameter { ref key, ref reason }
                    if key == "frame_index" && reason.contains("out of range")),
                "{err}"
            );
            assert_eq!(node.sprite().unwrap().texture, None);
        }
    }

    #[test]
    fn last_cell_of_the_sheet_is_accepted() {
        let mut node = sprite();
        run(&mut node, json!({
            "texture": "res://knight.png",
            "frame_width": 35,
            "frame_height": 35,
            "frame_index": 7
        }))
        .unwrap();

        assert_eq!(node.sprite().unwrap().region, Some(Region::new(105, 35, 35, 35)));
    }

    #[test]
    fn frame_keys_need_a_texture_and_each_other() {
        let mut node = sprite();
        assert!(run(&mut node, json!({"frame_width": 35, "frame_height": 35})).is_err());
        assert!(run(&mut node, json!({"texture": "res://knight.png", "frame_width": 35})).is_err());
        assert!(run(&mut node, json!({"texture": "res://missing.png"})).is_err());
    }
}
