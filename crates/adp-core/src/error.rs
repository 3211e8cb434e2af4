//! Error types for the core crate

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{EdgeKind, NodeId};

/// Errors raised by the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema '{0}' not found in registry")]
    NotFound(String),

    #[error("Invalid schema definition '{name}': {message}")]
    InvalidDefinition { name: String, message: String },

    #[error("Failed to read schema file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Graph invariant violations. Never expected under create-or-find insertion.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Edge {kind} references missing node {missing} ({source_id} -> {target_id})")]
    DanglingEdge {
        kind: EdgeKind,
        source_id: NodeId,
        target_id: NodeId,
        missing: NodeId,
    },
}
