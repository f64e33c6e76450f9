//! Camera zoom.

use crate::engine::AssemblerConfig;
use crate::error::AssemblyError;
use crate::node::{Node, NodeData};
use crate::value::Props;

/// Runs when the bag has `zoom`. A zero (or near-zero) component is rejected
/// and the previous zoom is kept.
pub fn configure(
    node: &mut Node,
    props: Props<'_>,
    config: &AssemblerConfig,
) -> Result<(), AssemblyError> {
    let Some(zoom) = props.optional_vec2("zoom")? else {
        return Ok(());
    };
    if !zoom.is_finite() {
        return Err(AssemblyError::invalid("zoom", format!("{zoom} is not finite")));
    }
    if zoom.x.abs() < config.zoom_epsilon || zoom.y.abs() < config.zoom_epsilon {
        return Err(AssemblyError::invalid("zoom", format!("{zoom} has a zero component")));
    }

    let NodeData::Camera(state) = node.data_mut() else {
        return Err(AssemblyError::malformed("zoom", "node is not a camera"));
    };
    state.zoom = zoom;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::node::NodeKind;
    use crate::value::{Properties, Value};
    use serde_json::json;

    fn run(node: &mut Node, value: Value) -> Result<(), AssemblyError> {
        let map: Properties = serde_json::from_value(value).unwrap();
        configure(node, Props::new(&map), &AssemblerConfig::default())
    }

    #[test]
    fn zoom_is_applied_directly() {
        let mut cam = Node::new("Cam", "Camera2D", NodeKind::Camera);
        run(&mut cam, json!({"zoom": {"x": 2, "y": 0.5}})).unwrap();
        assert_eq!(cam.camera().unwrap().zoom, Vec2::new(2.0, 0.5));
    }

    #[test]
    fn zero_components_keep_the_previous_zoom() {
        let mut cam = Node::new("Cam", "Camera2D", NodeKind::Camera);
        run(&mut cam, json!({"zoom": {"x": 3, "y": 3}})).unwrap();

        for zoom in [json!({"x": 0, "y": 1}), json!({"x": 1, "y": 0.000001}), json!({"x": 1})] {
            assert!(run(&mut cam, json!({ "zoom": zoom })).is_err());
            assert_eq!(cam.camera().unwrap().zoom, Vec2::splat(3.0));
        }
    }
}
