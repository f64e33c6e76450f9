//! Error types.
//!
//! Every failure inside a batch is *local*: it is logged, recorded in the
//! instruction's [`Outcome`](crate::dispatch::Outcome), and the batch moves on.
//! Nothing here ever escapes [`SceneAssembler::apply_instructions`](crate::engine::SceneAssembler::apply_instructions).

use thiserror::Error;

/// Failure reported by a [`ResourceLoader`](crate::resource::ResourceLoader).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("failed to decode '{path}': {reason}")]
    Decode { path: String, reason: String },
}

/// Failure reported by a [`BehaviorAttacher`](crate::behavior::BehaviorAttacher).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BehaviorError {
    #[error("{language} source is empty")]
    EmptySource { language: String },
    #[error("failed to compile {language} source: {reason}")]
    Compile { language: String, reason: String },
}

/// Everything that can go wrong while applying one instruction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("type '{0}' is not registered")]
    UnknownType(String),
    #[error("type '{0}' cannot be instantiated")]
    InstantiationFailed(String),
    #[error("a node named '{0}' already exists")]
    DuplicateName(String),
    #[error("node '{0}' not found")]
    TargetNotFound(String),
    #[error("malformed instruction: {0}")]
    MalformedInstruction(String),
    #[error("malformed property '{key}': {reason}")]
    MalformedProperty { key: String, reason: String },
    #[error(transparent)]
    ResourceLoad(#[from] ResourceError),
    #[error("unsupported behavior language '{0}'")]
    UnsupportedLanguage(String),
    #[error(transparent)]
    Behavior(#[from] BehaviorError),
    #[error("invalid value for '{key}': {reason}")]
    InvalidNumericParameter { key: String, reason: String },
    #[error("cannot move '{child}' under '{parent}': {reason}")]
    InvalidReparent {
        parent: String,
        child: String,
        reason: &'static str,
    },
}

impl AssemblyError {
    pub(crate) fn malformed(key: &str, reason: impl Into<String>) -> Self {
        Self::MalformedProperty {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidNumericParameter {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
