//! Behavior attachment.
//!
//! Compiling a script is the host's business. The assembler only decides
//! *whether* an `attach_script` instruction is acceptable (target exists,
//! language is the configured one) and then hands the source to a
//! [`BehaviorAttacher`].

use serde::Serialize;

use crate::error::BehaviorError;
use crate::node::Node;

/// Source text attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Behavior {
    pub language: String,
    pub source: String,
}

/// Compiles behavior source and attaches the result to a node.
pub trait BehaviorAttacher {
    fn compile_and_attach(
        &mut self,
        node: &mut Node,
        language: &str,
        source: &str,
    ) -> Result<(), BehaviorError>;
}

impl<A: BehaviorAttacher + ?Sized> BehaviorAttacher for &mut A {
    fn compile_and_attach(
        &mut self,
        node: &mut Node,
        language: &str,
        source: &str,
    ) -> Result<(), BehaviorError> {
        (**self).compile_and_attach(node, language, source)
    }
}

/// Stores the source on the node as-is. Rejects empty source.
///
/// Attaching to a node that already has a behavior replaces it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceAttacher;

impl BehaviorAttacher for SourceAttacher {
    fn compile_and_attach(
        &mut self,
        node: &mut Node,
        language: &str,
        source: &str,
    ) -> Result<(), BehaviorError> {
        if source.trim().is_empty() {
            return Err(BehaviorError::EmptySource {
                language: language.to_string(),
            });
        }
        node.set_behavior(Behavior {
            language: language.to_string(),
            source: source.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};

    #[test]
    fn source_attacher_replaces_previous_behavior() {
        let mut node = Node::new("Hero", "CharacterBody2D", NodeKind::Spatial);
        let mut attacher = SourceAttacher;

        attacher
            .compile_and_attach(&mut node, "GDScript", "extends CharacterBody2D")
            .unwrap();
        attacher
            .compile_and_attach(&mut node, "GDScript", "extends Node2D")
            .unwrap();

        assert_eq!(node.behavior().unwrap().source, "extends Node2D");
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut node = Node::new("Hero", "Node2D", NodeKind::Spatial);
        let err = SourceAttacher
            .compile_and_attach(&mut node, "GDScript", "  \n")
            .unwrap_err();

        assert!(matches!(err, BehaviorError::EmptySource { .. }));
        assert!(node.behavior().is_none());
    }
}
