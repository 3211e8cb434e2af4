//! Portable graph export consumed by downstream renderers

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::model::Metadata;

/// `{"nodes": [...], "edges": [...]}` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNode {
    pub id: String,
    pub kind: String,
    pub label: String,
    #[serde(rename = "shortLabel")]
    pub short_label: String,
    pub attributes: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEdge {
    pub source: String,
    pub target: String,
    pub kind: String,
    pub attributes: Metadata,
}

impl Graph {
    /// Snapshot the graph in insertion order. Attributes pass through as-is.
    pub fn to_export(&self) -> GraphExport {
        GraphExport {
            nodes: self
                .all_nodes()
                .map(|n| ExportNode {
                    id: n.id.to_string(),
                    kind: n.kind.to_string(),
                    label: n.label.clone(),
                    short_label: n.short_label.clone(),
                    attributes: n.attributes.clone(),
                })
                .collect(),
            edges: self
                .all_edges()
                .map(|e| ExportEdge {
                    source: e.source.to_string(),
                    target: e.target.to_string(),
                    kind: e.kind.to_string(),
                    attributes: e.attributes.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_export())
    }

    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, &self.to_export())
    }
}
