//! Turns parsed metadata blocks into graph nodes and edges

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::error::{GraphError, SchemaError};
use crate::graph::Graph;
use crate::model::*;
use crate::schema::{Schema, SchemaRegistry};

const NAME_KEYS: &[&str] = &["name", "scope_name"];
const DOMAIN_KEY: &str = "domain";
const DEPENDENCY_KEYS: &[&str] = &["dependencies", "depends_on", "imports", "requires"];
const SERVICE_KEYS: &[&str] = &["service", "serviceBoundary", "service-boundary", "service_boundary"];
const SERVICE_NAME_KEYS: &[&str] = &["service", "name"];
const TEAM_KEYS: &[&str] = &["teamOwner", "team_owner", "team", "owner"];
const EXTENDS_KEYS: &[&str] = &["extends", "parent", "inherits", "superclass"];
const IMPLEMENTS_KEYS: &[&str] = &["implements", "interfaces"];
const CALLS_KEYS: &[&str] = &["calls", "invokes", "uses_functions"];
const CATEGORY_LABEL_KEYS: &[&str] = &["name", "issue", "title", "type", "consideration", "dataType"];

/// A fixed metadata category that becomes its own child nodes.
struct Category {
    keys: &'static [&'static str],
    kind: NodeKind,
    edge: EdgeKind,
    prefix: &'static str,
}

const CATEGORIES: &[Category] = &[
    Category {
        keys: &["tech_debt", "techDebt", "tech-debt"],
        kind: NodeKind::TECH_DEBT,
        edge: EdgeKind::HAS_TECH_DEBT,
        prefix: "tech_debt",
    },
    Category {
        keys: &["performance"],
        kind: NodeKind::PERFORMANCE,
        edge: EdgeKind::HAS_PERFORMANCE_ISSUE,
        prefix: "perf",
    },
    Category {
        keys: &["data_handling", "dataHandling", "data-handling"],
        kind: NodeKind::DATA,
        edge: EdgeKind::PROCESSES_DATA,
        prefix: "data",
    },
];

/// Keys with dedicated handling; never promoted generically.
fn is_handled_key(key: &str) -> bool {
    key == DOMAIN_KEY
        || [NAME_KEYS, DEPENDENCY_KEYS, SERVICE_KEYS, EXTENDS_KEYS, IMPLEMENTS_KEYS, CALLS_KEYS]
            .iter()
            .any(|keys| keys.contains(&key))
        || CATEGORIES.iter().any(|c| c.keys.contains(&key))
}

fn first_str<'a>(object: &'a Metadata, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| object.get(*k).and_then(Value::as_str))
}

fn strings(value: &Value) -> impl Iterator<Item = &str> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Accumulates parsed files into a single [`Graph`].
pub struct GraphBuilder {
    graph: Graph,
    processed_files: HashSet<PathBuf>,
    schema: Arc<Schema>,
}

impl GraphBuilder {
    pub fn new(schema: Arc<Schema>) -> Self {
        GraphBuilder {
            graph: Graph::new(),
            processed_files: HashSet::new(),
            schema,
        }
    }

    /// Builder driven by a registry schema; `None` selects the active one.
    pub fn from_registry(registry: &SchemaRegistry, schema: Option<&str>) -> Result<Self, SchemaError> {
        Ok(Self::new(registry.get(schema)?))
    }

    /// Add one parsed file. Files already added are skipped.
    pub fn add_file(&mut self, file: &ParsedFile) {
        if self.processed_files.contains(&file.path) {
            tracing::debug!("Skipping already processed file {}", file.path.display());
            return;
        }

        let path = file.path.to_string_lossy().into_owned();
        let file_name = file.file_name();
        let file_id = self.graph.upsert_node(
            GraphNode::new(NodeId::for_file(&path), NodeKind::FILE, path.clone())
                .with_short_label(file_name.clone())
                .with_attribute("path", Value::String(path.clone())),
        );

        for block in &file.metadata_blocks {
            if let Err(e) = self.add_block(&file_id, &file_name, block) {
                tracing::error!("Failed to add block at {}:{}: {}", path, block.line_number, e);
            }
        }

        self.processed_files.insert(file.path.clone());
        tracing::debug!(
            "Added {} with {} metadata blocks ({} nodes, {} edges)",
            path,
            file.metadata_blocks.len(),
            self.graph.node_count(),
            self.graph.edge_count()
        );
    }

    /// Add every file in order and return the accumulated graph.
    pub fn build_from_parsed_files<'a, I>(&mut self, files: I) -> &Graph
    where
        I: IntoIterator<Item = &'a ParsedFile>,
    {
        for file in files {
            self.add_file(file);
        }
        tracing::info!(
            "Built graph with {} nodes and {} edges from {} files",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.processed_files.len()
        );
        &self.graph
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn processed_files(&self) -> &HashSet<PathBuf> {
        &self.processed_files
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn add_block(&mut self, file_id: &NodeId, file_name: &str, block: &MetadataBlock) -> Result<(), GraphError> {
        let kind = NodeKind::for_scope(block.scope);
        let metadata = &block.metadata;
        let name = first_str(metadata, NAME_KEYS)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} in {}", capitalize(kind.as_str()), file_name));

        let block_key = format!("{}:{}", file_id, block.line_number);
        let node_id = self.graph.upsert_node(
            GraphNode::new(
                NodeId::new(&kind, &block_key),
                kind.clone(),
                format!("{} ({})", name, file_name),
            )
            .with_short_label(name)
            .with_attributes(metadata.clone()),
        );
        tracing::debug!("Block node {} ({})", node_id, block.scope);

        if kind != NodeKind::FILE {
            self.graph
                .add_edge(GraphEdge::new(file_id.clone(), node_id.clone(), EdgeKind::CONTAINS))?;
        }

        self.link_domain(&node_id, metadata)?;
        self.link_dependencies(&node_id, metadata)?;
        self.link_services(&node_id, metadata)?;

        let rules = kind.rules();
        if rules.inheritance {
            self.link_inheritance(&node_id, metadata)?;
        }
        if rules.calls {
            self.link_calls(&node_id, metadata)?;
        }

        self.add_categories(&node_id, metadata)?;
        self.promote_entities(&node_id, metadata)?;
        Ok(())
    }

    /// Create-or-find a referenced entity whose label is its key.
    fn reference(&mut self, kind: NodeKind, key: &str) -> NodeId {
        self.graph
            .get_or_insert_node(GraphNode::new(NodeId::new(&kind, key), kind, key))
    }

    fn link(&mut self, source: &NodeId, target: NodeId, kind: EdgeKind) -> Result<(), GraphError> {
        self.graph.add_edge(GraphEdge::new(source.clone(), target, kind))
    }

    fn link_domain(&mut self, node_id: &NodeId, metadata: &Metadata) -> Result<(), GraphError> {
        if let Some(domain) = metadata.get(DOMAIN_KEY).and_then(Value::as_str) {
            let target = self.reference(NodeKind::DOMAIN, domain);
            self.link(node_id, target, EdgeKind::RELATED_TO)?;
        }
        Ok(())
    }

    fn link_dependencies(&mut self, node_id: &NodeId, metadata: &Metadata) -> Result<(), GraphError> {
        for key in DEPENDENCY_KEYS {
            let Some(list) = metadata.get(*key) else { continue };
            for dep in strings(list) {
                // Dotted names are treated as modules, everything else as a file path
                let (id, kind) = if dep.contains('.') {
                    (NodeId::new(&NodeKind::MODULE, dep), NodeKind::MODULE)
                } else {
                    (NodeId::for_file(dep), NodeKind::FILE)
                };
                let short = file_name_of(Path::new(dep));
                let target = self
                    .graph
                    .get_or_insert_node(GraphNode::new(id, kind, dep).with_short_label(short));
                self.link(node_id, target, EdgeKind::DEPENDS_ON)?;
            }
        }
        Ok(())
    }

    fn link_services(&mut self, node_id: &NodeId, metadata: &Metadata) -> Result<(), GraphError> {
        for key in SERVICE_KEYS {
            let (service, details) = match metadata.get(*key) {
                Some(Value::String(s)) => (s.as_str(), None),
                Some(Value::Object(obj)) => match first_str(obj, SERVICE_NAME_KEYS) {
                    Some(s) => (s, Some(obj)),
                    None => continue,
                },
                _ => continue,
            };
            if service.is_empty() {
                continue;
            }

            let service_id = self.graph.get_or_insert_node(
                GraphNode::new(NodeId::new(&NodeKind::SERVICE, service), NodeKind::SERVICE, service)
                    .with_attributes(details.cloned().unwrap_or_default()),
            );
            self.link(node_id, service_id.clone(), EdgeKind::DEPENDS_ON)?;

            let team = details.and_then(|obj| TEAM_KEYS.iter().find_map(|k| obj.get(*k)));
            if let Some(team) = team.and_then(Value::as_str).filter(|t| !t.is_empty()) {
                let team_id = self.reference(NodeKind::TEAM, team);
                self.link(&service_id, team_id, EdgeKind::OWNED_BY)?;
            }
        }
        Ok(())
    }

    fn link_inheritance(&mut self, node_id: &NodeId, metadata: &Metadata) -> Result<(), GraphError> {
        for key in EXTENDS_KEYS {
            let parents: Vec<&str> = match metadata.get(*key) {
                Some(Value::String(parent)) => vec![parent.as_str()],
                Some(list @ Value::Array(_)) => strings(list).collect(),
                _ => continue,
            };
            for parent in parents {
                let target = self.reference(NodeKind::CLASS, parent);
                self.link(node_id, target, EdgeKind::EXTENDS)?;
            }
        }

        for key in IMPLEMENTS_KEYS {
            let Some(list) = metadata.get(*key) else { continue };
            for interface in strings(list) {
                let target = self.graph.get_or_insert_node(
                    GraphNode::new(NodeId::new(&NodeKind::CLASS, interface), NodeKind::CLASS, interface)
                        .with_attribute("is_interface", Value::Bool(true)),
                );
                self.link(node_id, target, EdgeKind::IMPLEMENTS)?;
            }
        }
        Ok(())
    }

    fn link_calls(&mut self, node_id: &NodeId, metadata: &Metadata) -> Result<(), GraphError> {
        for key in CALLS_KEYS {
            let Some(list) = metadata.get(*key) else { continue };
            for callee in strings(list) {
                let target = self.reference(NodeKind::FUNCTION, callee);
                self.link(node_id, target, EdgeKind::CALLS)?;
            }
        }
        Ok(())
    }

    fn add_categories(&mut self, node_id: &NodeId, metadata: &Metadata) -> Result<(), GraphError> {
        for category in CATEGORIES {
            for key in category.keys {
                match metadata.get(*key) {
                    Some(Value::Array(items)) => {
                        for (index, item) in items.iter().enumerate() {
                            match item.as_object() {
                                Some(data) => {
                                    let suffix = format!("{}:{}", category.prefix, index);
                                    self.add_category_node(node_id, category, &suffix, data)?;
                                }
                                None => tracing::debug!("Ignoring non-object {} entry {}", key, index),
                            }
                        }
                    }
                    Some(Value::Object(data)) => {
                        self.add_category_node(node_id, category, category.prefix, data)?;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn add_category_node(
        &mut self,
        parent: &NodeId,
        category: &Category,
        suffix: &str,
        data: &Metadata,
    ) -> Result<(), GraphError> {
        let label = first_str(data, CATEGORY_LABEL_KEYS)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| category.kind.display_name());

        let id = self.graph.upsert_node(
            GraphNode::new(
                NodeId::from(format!("{}:{}", parent, suffix).as_str()),
                category.kind.clone(),
                label,
            )
            .with_attributes(data.clone()),
        );
        self.link(parent, id, category.edge.clone())
    }

    /// Schema fields holding `{"name": ...}` objects become their own entities.
    fn promote_entities(&mut self, node_id: &NodeId, metadata: &Metadata) -> Result<(), GraphError> {
        let schema = Arc::clone(&self.schema);
        for field in schema.entity_fields() {
            if is_handled_key(field) {
                continue;
            }
            let Some(Value::Object(entity)) = metadata.get(field) else { continue };
            let Some(name) = entity.get("name").and_then(Value::as_str) else { continue };

            let kind = NodeKind::custom(field.replace(['_', ' '], "-"));
            if self.graph.register_custom_node_kind(&kind) {
                tracing::debug!("Discovered custom node kind '{}'", kind);
            }
            let target = self.graph.get_or_insert_node(
                GraphNode::new(NodeId::new(&kind, name), kind.clone(), name).with_attributes(entity.clone()),
            );

            let edge = EdgeKind::has(&kind);
            if self.graph.register_custom_edge_kind(&edge) {
                tracing::debug!("Discovered custom edge kind '{}'", edge);
            }
            self.link(node_id, target, edge)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("graph", &self.graph)
            .field("processed_files", &self.processed_files.len())
            .field("schema", &self.schema.name())
            .finish()
    }
}
