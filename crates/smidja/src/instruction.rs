//! # Instructions: The Batch Wire Format
//!
//! One instruction is one JSON object with an `action` tag:
//!
//! ```json
//! {"action": "create_node",    "class_name": "Camera2D", "name": "MainCamera"}
//! {"action": "set_property",   "node": "MainCamera", "property": "zoom", "value": {"x": 2, "y": 2}}
//! {"action": "set_properties", "node": "MainCamera", "properties": {"position": {"x": 0, "y": 0}}}
//! {"action": "attach_script",  "node": "Hero", "language": "GDScript", "code": "extends ..."}
//! {"action": "add_child",      "parent": "Game", "child": "Hero"}
//! ```
//!
//! Parsing is per task: [`AssistantReply::instructions`] yields one `Result`
//! per entry so a single malformed task never takes the rest of the batch down
//! with it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AssemblyError;
use crate::value::{Properties, Value};

/// One declarative operation in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Instruction {
    /// Create a node of a registered type under the batch root.
    CreateNode {
        #[serde(rename = "class_name", alias = "type")]
        type_name: String,
        /// Empty means "use the type name".
        #[serde(rename = "name", default)]
        node_name: String,
    },
    /// Set a single property on an existing node.
    SetProperty {
        #[serde(rename = "node")]
        target_name: String,
        #[serde(rename = "property")]
        property_name: String,
        value: Value,
    },
    /// Set a bag of properties on an existing node.
    SetProperties {
        #[serde(rename = "node")]
        target_name: String,
        properties: Properties,
    },
    /// Compile a behavior script and attach it to an existing node.
    #[serde(rename = "attach_script")]
    AttachBehavior {
        #[serde(rename = "node")]
        target_name: String,
        language: String,
        #[serde(rename = "code")]
        source_code: String,
    },
    /// Move an existing node under another existing node.
    #[serde(rename = "add_child")]
    Reparent {
        #[serde(rename = "parent")]
        parent_name: String,
        #[serde(rename = "child")]
        child_name: String,
    },
}

impl Instruction {
    pub fn create(type_name: &str, node_name: &str) -> Self {
        Self::CreateNode {
            type_name: type_name.to_string(),
            node_name: node_name.to_string(),
        }
    }

    pub fn set_property(target: &str, property: &str, value: Value) -> Self {
        Self::SetProperty {
            target_name: target.to_string(),
            property_name: property.to_string(),
            value,
        }
    }

    /// Build a `SetProperties` instruction. `properties` must be an object.
    pub fn set_properties(target: &str, properties: Value) -> Result<Self, AssemblyError> {
        let Value::Object(properties) = properties else {
            return Err(AssemblyError::malformed("properties", "expected an object"));
        };
        Ok(Self::SetProperties {
            target_name: target.to_string(),
            properties,
        })
    }

    pub fn attach(target: &str, language: &str, source: &str) -> Self {
        Self::AttachBehavior {
            target_name: target.to_string(),
            language: language.to_string(),
            source_code: source.to_string(),
        }
    }

    pub fn reparent(parent: &str, child: &str) -> Self {
        Self::Reparent {
            parent_name: parent.to_string(),
            child_name: child.to_string(),
        }
    }

    /// Parse one task object.
    pub fn from_value(value: &Value) -> Result<Self, AssemblyError> {
        Self::deserialize(value).map_err(|e| AssemblyError::MalformedInstruction(e.to_string()))
    }

    /// The wire name of this instruction's action.
    pub fn action(&self) -> &'static str {
        match self {
            Self::CreateNode { .. } => "create_node",
            Self::SetProperty { .. } => "set_property",
            Self::SetProperties { .. } => "set_properties",
            Self::AttachBehavior { .. } => "attach_script",
            Self::Reparent { .. } => "add_child",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateNode {
                type_name,
                node_name,
            } => write!(f, "create_node({type_name} '{node_name}')"),
            Self::SetProperty {
                target_name,
                property_name,
                ..
            } => write!(f, "set_property('{target_name}'.{property_name})"),
            Self::SetProperties {
                target_name,
                properties,
            } => write!(
                f,
                "set_properties('{target_name}', {} keys)",
                properties.len()
            ),
            Self::AttachBehavior {
                target_name,
                language,
                ..
            } => write!(f, "attach_script('{target_name}', {language})"),
            Self::Reparent {
                parent_name,
                child_name,
            } => write!(f, "add_child('{parent_name}' <- '{child_name}')"),
        }
    }
}

// ── AssistantReply ──────────────────────────────────────────────────────

/// The already-unwrapped reply from an assistant: a human-readable message and
/// the raw task list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tasks: Vec<Value>,
}

impl AssistantReply {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse every task independently.
    pub fn instructions(&self) -> Vec<Result<Instruction, AssemblyError>> {
        self.tasks.iter().map(Instruction::from_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_action() {
        let reply = AssistantReply::from_json_str(
            r#"{
                "message": "[b]Task:[/b] camera",
                "tasks": [
                    {"action": "create_node", "name": "MainCamera", "class_name": "Camera2D"},
                    {"action": "set_property", "node": "MainCamera", "property": "zoom", "value": {"x": 4, "y": 4}},
                    {"action": "set_properties", "node": "MainCamera", "properties": {"position": {"x": 0, "y": 0}}},
                    {"action": "attach_script", "node": "MainCamera", "language": "GDScript", "code": "extends Camera2D"},
                    {"action": "add_child", "parent": "Game", "child": "MainCamera"}
                ]
            }"#,
        )
        .unwrap();

        let parsed: Vec<_> = reply
            .instructions()
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(parsed[0], Instruction::create("Camera2D", "MainCamera"));
        assert_eq!(
            parsed[1],
            Instruction::set_property("MainCamera", "zoom", json!({"x": 4, "y": 4}))
        );
        assert_eq!(
            parsed[2],
            Instruction::set_properties("MainCamera", json!({"position": {"x": 0, "y": 0}})).unwrap()
        );
        assert_eq!(
            parsed[3],
            Instruction::attach("MainCamera", "GDScript", "extends Camera2D")
        );
        assert_eq!(parsed[4], Instruction::reparent("Game", "MainCamera"));
    }

    #[test]
    fn name_is_optional_and_type_alias_is_accepted() {
        let inst = Instruction::from_value(&json!({"action": "create_node", "type": "Node2D"})).unwrap();
        assert_eq!(inst, Instruction::create("Node2D", ""));
    }

    #[test]
    fn malformed_tasks_fail_individually() {
        let reply = AssistantReply {
            message: String::new(),
            tasks: vec![
                json!({"action": "explode"}),
                json!({"action": "add_child", "parent": "A"}),
                json!("not even an object"),
                json!({"action": "create_node", "class_name": "Node2D", "name": "Ok"}),
            ],
        };

        let results = reply.instructions();
        assert_eq!(results.len(), 4);
        assert!(results[..3]
            .iter()
            .all(|r| matches!(r, Err(AssemblyError::MalformedInstruction(_)))));
        assert!(results[3].is_ok());
    }

    #[test]
    fn set_properties_constructor_requires_an_object() {
        let err = Instruction::set_properties("Hero", json!([1, 2])).unwrap_err();
        assert!(matches!(err, AssemblyError::MalformedProperty { ref key, .. } if key == "properties"));
        assert!(Instruction::set_properties("Hero", json!({})).is_ok());
    }

    #[test]
    fn reply_without_tasks_is_empty() {
        let reply = AssistantReply::from_json_str(r#"{"message": "nothing to do"}"#).unwrap();
        assert!(reply.tasks.is_empty());
        assert_eq!(reply.message, "nothing to do");
    }
}
