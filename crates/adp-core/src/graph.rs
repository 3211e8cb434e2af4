//! Graph wrapper using petgraph::StableDiGraph keyed by derived NodeIds

use crate::error::GraphError;
use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The metadata graph: a directed multigraph with string node ids.
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    index: HashMap<NodeId, NodeIndex>,
    custom_node_kinds: BTreeSet<String>,
    custom_edge_kinds: BTreeSet<String>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .field("custom_node_kinds", &self.custom_node_kinds)
            .field("custom_edge_kinds", &self.custom_edge_kinds)
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            custom_node_kinds: BTreeSet::new(),
            custom_edge_kinds: BTreeSet::new(),
        }
    }

    /// Insert a node, replacing any node with the same id in place.
    pub fn upsert_node(&mut self, node: GraphNode) -> NodeId {
        let id = node.id.clone();
        match self.index.get(&id) {
            Some(&idx) => self.inner[idx] = node,
            None => {
                let idx = self.inner.add_node(node);
                self.index.insert(id.clone(), idx);
            }
        }
        id
    }

    /// Insert a node only if its id is not present yet (create-or-find).
    pub fn get_or_insert_node(&mut self, node: GraphNode) -> NodeId {
        let id = node.id.clone();
        if !self.index.contains_key(&id) {
            let idx = self.inner.add_node(node);
            self.index.insert(id.clone(), idx);
        }
        id
    }

    /// Add an edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, edge: GraphEdge) -> Result<(), GraphError> {
        let source = self.resolve(&edge, &edge.source)?;
        let target = self.resolve(&edge, &edge.target)?;
        self.inner.add_edge(source, target, edge);
        Ok(())
    }

    fn resolve(&self, edge: &GraphEdge, id: &NodeId) -> Result<NodeIndex, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::DanglingEdge {
                kind: edge.kind.clone(),
                source_id: edge.source.clone(),
                target_id: edge.target.clone(),
                missing: id.clone(),
            })
    }

    /// Get a node by ID.
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.index.get(id).and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges in insertion order.
    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Get all outgoing edges from a node.
    pub fn edges_from(&self, source: &NodeId) -> Vec<&GraphEdge> {
        self.edges_directed(source, Direction::Outgoing)
    }

    /// Get all incoming edges to a node.
    pub fn edges_to(&self, target: &NodeId) -> Vec<&GraphEdge> {
        self.edges_directed(target, Direction::Incoming)
    }

    fn edges_directed(&self, id: &NodeId, direction: Direction) -> Vec<&GraphEdge> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .inner
            .edges_directed(idx, direction)
            .map(|edge_ref| (edge_ref.id(), edge_ref.weight()))
            .collect();
        // petgraph walks adjacency lists newest-first
        edges.sort_by_key(|(edge_idx, _)| *edge_idx);
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    /// Check if an edge exists between two nodes of a specific kind.
    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId, kind: &EdgeKind) -> bool {
        self.edges_from(source)
            .iter()
            .any(|e| &e.target == target && &e.kind == kind)
    }

    /// Get all nodes of a specific kind.
    pub fn nodes_of_kind<'a>(&'a self, kind: &'a NodeKind) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.all_nodes().filter(move |n| &n.kind == kind)
    }

    /// Number of nodes per kind.
    pub fn kind_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in self.all_nodes() {
            *counts.entry(node.kind.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Record a node kind outside the well-known table. Returns true if new.
    pub fn register_custom_node_kind(&mut self, kind: &NodeKind) -> bool {
        !kind.is_well_known() && self.custom_node_kinds.insert(kind.to_string())
    }

    /// Record an edge kind outside the well-known table. Returns true if new.
    pub fn register_custom_edge_kind(&mut self, kind: &EdgeKind) -> bool {
        !kind.is_well_known() && self.custom_edge_kinds.insert(kind.to_string())
    }

    pub fn custom_node_kinds(&self) -> &BTreeSet<String> {
        &self.custom_node_kinds
    }

    pub fn custom_edge_kinds(&self) -> &BTreeSet<String> {
        &self.custom_edge_kinds
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
