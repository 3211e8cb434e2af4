//! Core data structures for the metadata graph

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw annotation payload: one JSON object lifted out of a comment.
pub type Metadata = Map<String, Value>;

/// Granularity level a metadata block describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeScope {
    File,
    Class,
    Function,
    Method,
    Variable,
}

impl CodeScope {
    pub const ALL: [CodeScope; 5] = [
        CodeScope::File,
        CodeScope::Class,
        CodeScope::Function,
        CodeScope::Method,
        CodeScope::Variable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeScope::File => "file",
            CodeScope::Class => "class",
            CodeScope::Function => "function",
            CodeScope::Method => "method",
            CodeScope::Variable => "variable",
        }
    }
}

impl fmt::Display for CodeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotation found in a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataBlock {
    pub metadata: Metadata,
    pub source_file: PathBuf,
    /// 1-based line of the comment that carried the annotation.
    pub line_number: u32,
    pub scope: CodeScope,
}

/// All metadata blocks of a single file, in extraction order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub metadata_blocks: Vec<MetadataBlock>,
}

impl ParsedFile {
    pub fn new(path: impl Into<PathBuf>, metadata_blocks: Vec<MetadataBlock>) -> Self {
        ParsedFile {
            path: path.into(),
            metadata_blocks,
        }
    }

    /// A file that yielded nothing (unsupported, unreadable, or unannotated).
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Vec::new())
    }

    pub fn has_metadata(&self) -> bool {
        !self.metadata_blocks.is_empty()
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Rules that only some well-known node kinds take part in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeRules {
    /// `extends` / `implements` inference.
    pub inheritance: bool,
    /// `calls` inference.
    pub calls: bool,
}

/// Side-table entry for a well-known kind.
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    pub name: &'static str,
    pub rules: EdgeRules,
}

const NO_RULES: EdgeRules = EdgeRules {
    inheritance: false,
    calls: false,
};

const WELL_KNOWN_NODE_KINDS: &[KindInfo] = &[
    KindInfo { name: "service", rules: NO_RULES },
    KindInfo { name: "module", rules: NO_RULES },
    KindInfo { name: "class", rules: EdgeRules { inheritance: true, calls: false } },
    KindInfo { name: "function", rules: EdgeRules { inheritance: false, calls: true } },
    KindInfo { name: "method", rules: EdgeRules { inheritance: false, calls: true } },
    KindInfo { name: "variable", rules: NO_RULES },
    KindInfo { name: "file", rules: NO_RULES },
    KindInfo { name: "domain", rules: NO_RULES },
    KindInfo { name: "concept", rules: NO_RULES },
    KindInfo { name: "team", rules: NO_RULES },
    KindInfo { name: "tech_debt", rules: NO_RULES },
    KindInfo { name: "performance", rules: NO_RULES },
    KindInfo { name: "data", rules: NO_RULES },
];

const WELL_KNOWN_EDGE_KINDS: &[KindInfo] = &[
    KindInfo { name: "contains", rules: NO_RULES },
    KindInfo { name: "uses", rules: NO_RULES },
    KindInfo { name: "depends_on", rules: NO_RULES },
    KindInfo { name: "calls", rules: NO_RULES },
    KindInfo { name: "implements", rules: NO_RULES },
    KindInfo { name: "extends", rules: NO_RULES },
    KindInfo { name: "references", rules: NO_RULES },
    KindInfo { name: "owned_by", rules: NO_RULES },
    KindInfo { name: "related_to", rules: NO_RULES },
    KindInfo { name: "has_tech_debt", rules: NO_RULES },
    KindInfo { name: "has_performance_issue", rules: NO_RULES },
    KindInfo { name: "processes_data", rules: NO_RULES },
];

/// What kind of entity a node represents.
///
/// Open set: the associated constants are the well-known kinds, anything else
/// is a custom kind discovered from metadata at build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKind(Cow<'static, str>);

impl NodeKind {
    pub const SERVICE: NodeKind = NodeKind(Cow::Borrowed("service"));
    pub const MODULE: NodeKind = NodeKind(Cow::Borrowed("module"));
    pub const CLASS: NodeKind = NodeKind(Cow::Borrowed("class"));
    pub const FUNCTION: NodeKind = NodeKind(Cow::Borrowed("function"));
    pub const METHOD: NodeKind = NodeKind(Cow::Borrowed("method"));
    pub const VARIABLE: NodeKind = NodeKind(Cow::Borrowed("variable"));
    pub const FILE: NodeKind = NodeKind(Cow::Borrowed("file"));
    pub const DOMAIN: NodeKind = NodeKind(Cow::Borrowed("domain"));
    pub const CONCEPT: NodeKind = NodeKind(Cow::Borrowed("concept"));
    pub const TEAM: NodeKind = NodeKind(Cow::Borrowed("team"));
    pub const TECH_DEBT: NodeKind = NodeKind(Cow::Borrowed("tech_debt"));
    pub const PERFORMANCE: NodeKind = NodeKind(Cow::Borrowed("performance"));
    pub const DATA: NodeKind = NodeKind(Cow::Borrowed("data"));

    pub fn custom(name: impl Into<String>) -> Self {
        NodeKind(Cow::Owned(name.into()))
    }

    /// Node kind for the primary node of a block with the given scope.
    pub fn for_scope(scope: CodeScope) -> Self {
        match scope {
            CodeScope::File => NodeKind::FILE,
            CodeScope::Class => NodeKind::CLASS,
            CodeScope::Function => NodeKind::FUNCTION,
            CodeScope::Method => NodeKind::METHOD,
            CodeScope::Variable => NodeKind::VARIABLE,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn info(&self) -> Option<&'static KindInfo> {
        WELL_KNOWN_NODE_KINDS.iter().find(|k| k.name == self.as_str())
    }

    pub fn is_well_known(&self) -> bool {
        self.info().is_some()
    }

    pub fn rules(&self) -> EdgeRules {
        self.info().map_or(NO_RULES, |k| k.rules)
    }

    /// Human readable form: `tech_debt` becomes `Tech debt`.
    pub fn display_name(&self) -> String {
        capitalize(&self.as_str().replace('_', " "))
    }

    pub fn well_known() -> impl Iterator<Item = &'static KindInfo> {
        WELL_KNOWN_NODE_KINDS.iter()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of relationship an edge represents. Open set, like [`NodeKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeKind(Cow<'static, str>);

impl EdgeKind {
    pub const CONTAINS: EdgeKind = EdgeKind(Cow::Borrowed("contains"));
    pub const USES: EdgeKind = EdgeKind(Cow::Borrowed("uses"));
    pub const DEPENDS_ON: EdgeKind = EdgeKind(Cow::Borrowed("depends_on"));
    pub const CALLS: EdgeKind = EdgeKind(Cow::Borrowed("calls"));
    pub const IMPLEMENTS: EdgeKind = EdgeKind(Cow::Borrowed("implements"));
    pub const EXTENDS: EdgeKind = EdgeKind(Cow::Borrowed("extends"));
    pub const REFERENCES: EdgeKind = EdgeKind(Cow::Borrowed("references"));
    pub const OWNED_BY: EdgeKind = EdgeKind(Cow::Borrowed("owned_by"));
    pub const RELATED_TO: EdgeKind = EdgeKind(Cow::Borrowed("related_to"));
    pub const HAS_TECH_DEBT: EdgeKind = EdgeKind(Cow::Borrowed("has_tech_debt"));
    pub const HAS_PERFORMANCE_ISSUE: EdgeKind = EdgeKind(Cow::Borrowed("has_performance_issue"));
    pub const PROCESSES_DATA: EdgeKind = EdgeKind(Cow::Borrowed("processes_data"));

    pub fn custom(name: impl Into<String>) -> Self {
        EdgeKind(Cow::Owned(name.into()))
    }

    /// `has_<kind>` relationship used for promoted schema entities.
    pub fn has(kind: &NodeKind) -> Self {
        EdgeKind::custom(format!("has_{}", kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn info(&self) -> Option<&'static KindInfo> {
        WELL_KNOWN_EDGE_KINDS.iter().find(|k| k.name == self.as_str())
    }

    pub fn is_well_known(&self) -> bool {
        self.info().is_some()
    }

    pub fn well_known() -> impl Iterator<Item = &'static KindInfo> {
        WELL_KNOWN_EDGE_KINDS.iter()
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic node identifier of the form `<kind>:<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(kind: &NodeKind, key: &str) -> Self {
        NodeId(format!("{}:{}", kind, key))
    }

    /// Id of the File node for a path. Separators are flattened to `_`.
    pub fn for_file(path: &str) -> Self {
        NodeId::new(&NodeKind::FILE, &sanitize_path(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(raw: &str) -> Self {
        NodeId(raw.to_string())
    }
}

pub fn sanitize_path(path: &str) -> String {
    path.replace(['/', '\\'], "_")
}

/// A single node in the metadata graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub short_label: String,
    pub attributes: Metadata,
}

impl GraphNode {
    /// Node whose short label equals its label.
    pub fn new(id: NodeId, kind: NodeKind, label: impl Into<String>) -> Self {
        let label = label.into();
        GraphNode {
            id,
            kind,
            short_label: label.clone(),
            label,
            attributes: Metadata::new(),
        }
    }

    pub fn with_short_label(mut self, short_label: impl Into<String>) -> Self {
        self.short_label = short_label.into();
        self
    }

    pub fn with_attributes(mut self, attributes: Metadata) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }
}

/// A directed edge in the metadata graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub attributes: Metadata,
}

impl GraphEdge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        GraphEdge {
            source,
            target,
            kind,
            attributes: Metadata::new(),
        }
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
