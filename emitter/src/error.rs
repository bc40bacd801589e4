use thiserror::Error;

/// Failures raised while emitting a section.
///
/// `UnmatchedClose` and `ContentAfterClose` are structural: they stop the
/// emitter that raised them, while sibling sections keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("cannot close {construct}: nothing is open")]
    UnmatchedClose { construct: &'static str },

    #[error("cannot run '{command}': the page is already closed")]
    ContentAfterClose { command: String },

    #[error("source is {size} bytes, which exceeds the {limit}-byte limit")]
    InputTooLarge { size: usize, limit: usize },

    #[error("internal emitter failure: {0}")]
    Internal(String),
}

impl EmitError {
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EmitError::UnmatchedClose { .. } | EmitError::ContentAfterClose { .. }
        )
    }
}
