//! Position for every spatial kind.
//!
//! The remaining transform keys (`rotation`, `rotation_degrees`, `scale`) are
//! plain typed keys and go through [`Node::set`] with the generic pass.

use crate::error::AssemblyError;
use crate::node::Node;
use crate::value::Props;

pub fn configure(node: &mut Node, props: Props<'_>) -> Result<(), AssemblyError> {
    if let Some(position) = props.optional_vec2("position")? {
        node.set_position(position);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::node::NodeKind;
    use crate::value::Properties;
    use serde_json::json;

    #[test]
    fn position_requires_both_components() {
        let mut node = Node::new("Hero", "CharacterBody2D", NodeKind::Spatial);
        let good: Properties = serde_json::from_value(json!({"position": {"x": 400, "y": 100}})).unwrap();
        let bad: Properties = serde_json::from_value(json!({"position": {"x": 1}})).unwrap();

        configure(&mut node, Props::new(&good)).unwrap();
        assert!(configure(&mut node, Props::new(&bad)).is_err());
        assert_eq!(node.position(), Some(Vec2::new(400.0, 100.0)));
    }
}
