//! Error types
//!
//! Tree errors are structural-invariant violations and are raised before any mutation.
//! Format errors block an import entirely. Persistence errors are recoverable: the
//! in-memory project stays authoritative and the save can be retried.

use crate::types::{NodeId, ProjectId};
use thiserror::Error;

/// Node store errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Parent is not an existing folder: {0}")]
    InvalidParent(NodeId),

    #[error("A sibling named '{name}' already exists in {parent}")]
    NameCollision { parent: NodeId, name: String },

    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("The project root cannot be deleted")]
    CannotDeleteRoot,

    #[error("The project root cannot be renamed or moved")]
    ImmutableRoot,

    #[error("Invalid node name: '{0}'")]
    InvalidName(String),
}

/// Import format errors
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Malformed project JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project JSON is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Project tree is inconsistent: {0}")]
    InvalidTree(String),
}

/// Persistence gateway errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Storage transaction aborted")]
    TransactionAborted,
}

/// Application-level error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("More than one project is named '{0}'; use its id")]
    AmbiguousProject(String),

    #[error("Path not found in project: {0}")]
    PathNotFound(String),

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
