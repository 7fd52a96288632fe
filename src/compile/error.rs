//! Error types for the constraint compiler

use thiserror::Error;

/// Errors that can occur while compiling an abstract layout into solver
/// primitives. Every variant is fatal for the whole layout: the caller must
/// not render a partial result.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A constraint, group, or edge references a node id that is not in the
    /// node list. Raised before any geometry is computed.
    #[error("dangling node reference '{id}' in {referrer}")]
    DanglingNodeReference { id: String, referrer: String },

    /// Two nodes share an id, which would make separation indices ambiguous.
    #[error("duplicate node id '{id}'")]
    DuplicateNodeId { id: String },

    /// Two groups overlap without one containing the other. The target
    /// solver can only express nested groups, so this specification cannot
    /// be rendered faithfully.
    #[error("groups '{first}' and '{second}' overlap without nesting; shared nodes: {}", shared.join(", "))]
    UnsupportedGroupOverlap {
        first: String,
        second: String,
        shared: Vec<String>,
    },
}

impl CompileError {
    /// Create a dangling-reference error naming the referring construct
    pub fn dangling(id: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self::DanglingNodeReference {
            id: id.into(),
            referrer: referrer.into(),
        }
    }

    /// Create a group-overlap error
    pub fn overlap(
        first: impl Into<String>,
        second: impl Into<String>,
        shared: Vec<String>,
    ) -> Self {
        Self::UnsupportedGroupOverlap {
            first: first.into(),
            second: second.into(),
            shared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_reference_display() {
        let err = CompileError::dangling("ghost", "constraint leftOf(ghost, b)");
        assert!(err.to_string().contains("ghost"));
        assert!(err.to_string().contains("leftOf"));
    }

    #[test]
    fn test_overlap_display() {
        let err = CompileError::overlap("cats", "pets", vec!["whiskers".to_string()]);
        assert!(err.to_string().contains("cats"));
        assert!(err.to_string().contains("whiskers"));
    }
}
