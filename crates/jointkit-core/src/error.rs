/// Core error types for jointkit.
use std::path::PathBuf;

/// A specialized Result type for jointkit operations.
pub type JointResult<T> = Result<T, JointError>;

/// Top-level error type encompassing all jointkit subsystems.
#[derive(Debug, thiserror::Error)]
pub enum JointError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node {node} is a {actual}, expected a {expected}")]
    WrongKind {
        node: String,
        expected: String,
        actual: String,
    },

    #[error("reparenting {node} under {parent} would create a cycle")]
    Cycle { node: String, parent: String },

    #[error("degenerate axes: {0}")]
    DegenerateAxes(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("scene validation error: {0}")]
    Validation(String),

    #[error("config error: {message} ({path:?})")]
    Config { message: String, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl JointError {
    /// Create a node-not-found error from any displayable handle.
    pub fn not_found(node: impl std::fmt::Display) -> Self {
        JointError::NodeNotFound(node.to_string())
    }

    /// Create a wrong-kind error.
    pub fn wrong_kind(
        node: impl std::fmt::Display,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        JointError::WrongKind {
            node: node.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        JointError::Config {
            message: message.into(),
            path: path.into(),
        }
    }
}
