//! Resource graph construction.
//!
//! Turns classified state records into nodes and typed edges. Nothing in this
//! module performs I/O; the same input always produces the same graph, with
//! nodes in record order and edges in discovery order.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::ClassifiedRecord;
use crate::error::DiagramError;
use crate::resource::Category;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Ids are `<type>.<name>`, matching the Terraform resource address.
    pub fn new(resource_type: &str, name: &str) -> Self {
        Self(format!("{resource_type}.{name}"))
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

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub resource_type: String,
    pub category: Category,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Contains,
    AttachesTo,
    RoutesTo,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "contains",
            EdgeKind::AttachesTo => "attaches-to",
            EdgeKind::RoutesTo => "routes-to",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge from the dependent resource to the resource it references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

/// Attribute field that points at another resource.
///
/// `field` is a dotted path; arrays met along the way are fanned out, so
/// `network_interface.subnetwork` visits every interface. An empty
/// `applies_to` matches every classified category except `other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRule {
    #[serde(default)]
    pub applies_to: Vec<Category>,
    pub field: String,
    pub target: Category,
    pub kind: EdgeKind,
}

impl ReferenceRule {
    pub fn new(
        applies_to: &[Category],
        field: impl Into<String>,
        target: Category,
        kind: EdgeKind,
    ) -> Self {
        Self {
            applies_to: applies_to.to_vec(),
            field: field.into(),
            target,
            kind,
        }
    }

    fn applies(&self, category: Category) -> bool {
        category != Category::Other
            && (self.applies_to.is_empty() || self.applies_to.contains(&category))
    }
}

/// Resource graph backed by a petgraph [`DiGraph`].
///
/// Node and edge indices follow insertion order, so iteration is stable for
/// a given input.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: DiGraph<Node, EdgeKind>,
    node_id_map: IndexMap<NodeId, NodeIndex>,
}

impl Graph {
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_indices().filter_map(|ix| self.edge(ix))
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index(id).map(|ix| &self.graph[ix])
    }

    pub fn node_index(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_id_map.get(id).copied()
    }

    pub fn digraph(&self) -> &DiGraph<Node, EdgeKind> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Edges leaving `id`, in insertion order.
    pub fn outgoing(&self, id: &NodeId) -> Vec<Edge> {
        let Some(ix) = self.node_index(id) else {
            return Vec::new();
        };

        let mut indices: Vec<EdgeIndex> = self
            .graph
            .edges_directed(ix, Direction::Outgoing)
            .map(|edge| edge.id())
            .collect();
        indices.sort();

        indices.into_iter().filter_map(|e| self.edge(e)).collect()
    }

    fn edge(&self, ix: EdgeIndex) -> Option<Edge> {
        let (source, target) = self.graph.edge_endpoints(ix)?;
        Some(Edge {
            source: self.graph[source].id.clone(),
            target: self.graph[target].id.clone(),
            kind: self.graph[ix],
        })
    }

    fn add_node(&mut self, node: Node) {
        let id = node.id.clone();
        let ix = self.graph.add_node(node);
        self.node_id_map.insert(id, ix);
    }

    /// Inserts an edge if both endpoints exist, it is not a self-loop and the
    /// same `(source, target, kind)` is not already present.
    fn connect(&mut self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> bool {
        if source == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.node_index(source), self.node_index(target)) else {
            return false;
        };
        if self
            .graph
            .edges_connecting(from, to)
            .any(|edge| *edge.weight() == kind)
        {
            return false;
        }

        self.graph.add_edge(from, to, kind);
        true
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.edges().eq(other.edges())
    }
}

/// Builds a [`Graph`] from classified records using a provider's rules.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'a> {
    rules: &'a [ReferenceRule],
    identity_fields: &'a [String],
    label_fields: &'a [String],
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        rules: &'a [ReferenceRule],
        identity_fields: &'a [String],
        label_fields: &'a [String],
    ) -> Self {
        Self {
            rules,
            identity_fields,
            label_fields,
        }
    }

    pub fn build(&self, records: &[ClassifiedRecord<'_>]) -> Result<Graph, DiagramError> {
        let mut graph = Graph::default();
        let mut linkable: Vec<(NodeId, Category, &Map<String, Value>)> = Vec::new();

        for classified in records {
            let record = classified.record;
            let id = NodeId::new(&record.resource_type, &record.name);

            if graph.node_id_map.contains_key(&id) {
                tracing::warn!(%id, "duplicate resource address, keeping the first");
                continue;
            }

            let label = record
                .string_attribute(self.label_fields)
                .unwrap_or(&record.name)
                .to_string();

            graph.add_node(Node {
                id: id.clone(),
                resource_type: record.resource_type.clone(),
                category: classified.category,
                label,
            });

            if classified.is_linkable() {
                linkable.push((id, classified.category, &record.attributes));
            }
        }

        if graph.is_empty() {
            return Err(DiagramError::EmptyGraph);
        }

        let index = self.index(records);

        for (source, category, attributes) in &linkable {
            for rule in self.rules.iter().filter(|rule| rule.applies(*category)) {
                for value in field_values(attributes, &rule.field) {
                    let Some(target) = index.resolve(rule.target, value) else {
                        tracing::debug!(
                            %source,
                            field = %rule.field,
                            reference = value,
                            "dropping unresolved reference"
                        );
                        continue;
                    };

                    graph.connect(source, target, rule.kind);
                }
            }
        }

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph built"
        );

        Ok(graph)
    }

    fn index(&self, records: &[ClassifiedRecord<'_>]) -> ReferenceIndex {
        let mut index = ReferenceIndex::default();

        for classified in records.iter().filter(|c| c.is_linkable()) {
            let record = classified.record;
            let id = NodeId::new(&record.resource_type, &record.name);

            for field in self.identity_fields {
                if let Some(key) = record.attributes.get(field).and_then(Value::as_str) {
                    index.insert(classified.category, key, &id);
                }
            }
            index.insert(classified.category, &record.name, &id);
        }

        index
    }
}

/// Lookup from `(category, identifying string)` to the first node carrying it.
#[derive(Debug, Default)]
struct ReferenceIndex {
    keys: HashMap<(Category, String), NodeId>,
}

impl ReferenceIndex {
    fn insert(&mut self, category: Category, key: &str, id: &NodeId) {
        if key.is_empty() {
            return;
        }
        self.keys
            .entry((category, key.to_string()))
            .or_insert_with(|| id.clone());
    }

    /// Exact match first, then the last segment of a self-link style path.
    fn resolve(&self, category: Category, reference: &str) -> Option<&NodeId> {
        if let Some(id) = self.keys.get(&(category, reference.to_string())) {
            return Some(id);
        }

        let segment = reference.trim_end_matches('/').rsplit('/').next()?;
        if segment == reference || segment.is_empty() {
            return None;
        }
        self.keys.get(&(category, segment.to_string()))
    }
}

/// Collects the non-empty strings reachable through a dotted attribute path.
pub fn field_values<'v>(attributes: &'v Map<String, Value>, path: &str) -> Vec<&'v str> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();

    if let Some((head, rest)) = segments.split_first() {
        if let Some(value) = attributes.get(*head) {
            collect_strings(value, rest, &mut out);
        }
    }

    out
}

fn collect_strings<'v>(value: &'v Value, path: &[&str], out: &mut Vec<&'v str>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_strings(item, path, out);
            }
        }
        Value::Object(map) => {
            if let Some((head, rest)) = path.split_first() {
                if let Some(next) = map.get(*head) {
                    collect_strings(next, rest, out);
                }
            }
        }
        Value::String(s) if path.is_empty() && !s.is_empty() => out.push(s.as_str()),
        _ => {}
    }
}
