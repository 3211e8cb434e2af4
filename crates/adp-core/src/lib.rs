//! ADP Core: metadata graph model, schema registry, and graph builder

pub mod builder;
pub mod error;
pub mod export;
pub mod graph;
pub mod model;
pub mod schema;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use builder::GraphBuilder;
pub use error::{GraphError, SchemaError};
pub use export::{ExportEdge, ExportNode, GraphExport};
pub use graph::Graph;
pub use model::{
    sanitize_path, CodeScope, EdgeKind, EdgeRules, GraphEdge, GraphNode, KindInfo, Metadata, MetadataBlock,
    NodeId, NodeKind, ParsedFile,
};
pub use schema::{FieldSpec, ScalarType, Schema, SchemaRegistry, SchemaSource, DEFAULT_SCHEMA_NAME};
