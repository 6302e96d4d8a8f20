use std::collections::{HashMap, HashSet, VecDeque};

use glam::Vec3;
use serde::Serialize;

use crate::syntax::Span;

use super::BuildSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Main,
    Function,
    Variable,
    Import,
    Class,
    Object,
    Array,
    Key,
    Element,
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        Self::Main,
        Self::Function,
        Self::Variable,
        Self::Import,
        Self::Class,
        Self::Object,
        Self::Array,
        Self::Key,
        Self::Element,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Import => "import",
            Self::Class => "class",
            Self::Object => "object",
            Self::Array => "array",
            Self::Key => "key",
            Self::Element => "element",
        }
    }
}

/// Everything about a node except where it sits and what it touches.
#[derive(Clone, Debug)]
pub struct NodeDraft {
    name: String,
    kind: NodeKind,
    detail: Option<String>,
    value: Option<String>,
    span: Option<Span>,
}

impl NodeDraft {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            detail: None,
            value: None,
            span: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    pub position: Vec3,
    #[serde(skip)]
    pub edges: Vec<EdgeId>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Endpoint positions as last drawn; kept in step with the nodes by
    /// [`GraphStore::move_node`].
    #[serde(skip)]
    pub segment: [Vec3; 2],
}

impl Edge {
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GraphSnapshot<'a> {
    pub summary: BuildSummary,
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
}

/// Owns every node and edge of the current build pass.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    edge_index: HashMap<(NodeId, NodeId), EdgeId>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.edge_index.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|node| node.kind)
    }

    pub fn main(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.kind == NodeKind::Main)
            .map(|node| node.id)
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + Clone + '_ {
        self.nodes.iter().map(|node| node.position)
    }

    pub fn add_node(&mut self, draft: NodeDraft, position: Vec3) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: draft.name,
            kind: draft.kind,
            detail: draft.detail,
            value: draft.value,
            span: draft.span,
            position,
            edges: Vec::new(),
        });
        id
    }

    /// Connects two existing nodes. Repeating a (source, target) pair returns
    /// the edge created first; self-loops and unknown endpoints are refused.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        if source == target {
            tracing::trace!(node = source.0, "ignoring self-referencing edge");
            return None;
        }

        let (source_position, target_position) =
            (self.node(source)?.position, self.node(target)?.position);

        if let Some(&existing) = self.edge_index.get(&(source, target)) {
            return Some(existing);
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            id,
            source,
            target,
            segment: [source_position, target_position],
        });
        self.edge_index.insert((source, target), id);
        self.nodes[source.0].edges.push(id);
        self.nodes[target.0].edges.push(id);
        Some(id)
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.edge_index.contains_key(&(source, target))
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|node| node.edges.iter())
            .map(move |edge| self.edges[edge.0].other(id))
    }

    pub fn move_node(&mut self, id: NodeId, position: Vec3) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        node.position = position;

        for &edge_id in &node.edges {
            let edge = &mut self.edges[edge_id.0];
            if edge.source == id {
                edge.segment[0] = position;
            }
            if edge.target == id {
                edge.segment[1] = position;
            }
        }
    }

    pub fn translate_node(&mut self, id: NodeId, delta: Vec3) {
        if let Some(position) = self.node(id).map(|node| node.position) {
            self.move_node(id, position + delta);
        }
    }

    pub fn snapshot(&self, summary: BuildSummary) -> GraphSnapshot<'_> {
        GraphSnapshot {
            summary,
            nodes: &self.nodes,
            edges: &self.edges,
        }
    }

    /// Edges whose endpoints are missing or whose cached segment disagrees
    /// with the endpoint positions.
    pub fn stale_edges(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|edge| {
                match (self.node(edge.source), self.node(edge.target)) {
                    (Some(source), Some(target)) => {
                        edge.segment != [source.position, target.position]
                    }
                    _ => true,
                }
            })
            .map(|edge| edge.id)
            .collect()
    }

    /// Nodes with no path from the Main node.
    pub fn unreachable_nodes(&self) -> Vec<NodeId> {
        let Some(main) = self.main() else {
            return self.nodes.iter().map(|node| node.id).collect();
        };

        let mut visited = HashSet::from([main]);
        let mut queue = VecDeque::from([main]);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        self.nodes
            .iter()
            .map(|node| node.id)
            .filter(|id| !visited.contains(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_pair() -> (GraphStore, NodeId, NodeId) {
        let mut store = GraphStore::new();
        let main = store.add_node(NodeDraft::new("Main Thread", NodeKind::Main), Vec3::ZERO);
        let leaf = store.add_node(NodeDraft::new("x", NodeKind::Variable), Vec3::X);
        (store, main, leaf)
    }

    #[test]
    fn repeated_connections_reuse_the_first_edge() {
        let (mut store, main, leaf) = store_with_pair();
        let first = store.connect(main, leaf);
        let second = store.connect(main, leaf);

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.node(leaf).unwrap().edges.len(), 1);
    }

    #[test]
    fn self_loops_and_unknown_endpoints_are_refused() {
        let (mut store, main, _) = store_with_pair();
        assert_eq!(store.connect(main, main), None);
        assert_eq!(store.connect(main, NodeId(42)), None);
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn moving_a_node_refreshes_incident_segments() {
        let (mut store, main, leaf) = store_with_pair();
        store.connect(main, leaf);

        store.move_node(leaf, Vec3::new(3.0, 4.0, 5.0));
        store.translate_node(main, Vec3::new(0.0, -1.0, 0.0));

        let edge = &store.edges()[0];
        assert_eq!(edge.segment, [Vec3::new(0.0, -1.0, 0.0), Vec3::new(3.0, 4.0, 5.0)]);
        assert!(store.stale_edges().is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let (mut store, main, leaf) = store_with_pair();
        store.connect(main, leaf);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.edge_count(), 0);
        assert!(!store.has_edge(main, leaf));
        assert_eq!(store.main(), None);
    }

    #[test]
    fn detached_nodes_are_reported_unreachable() {
        let (mut store, main, leaf) = store_with_pair();
        let orphan = store.add_node(NodeDraft::new("y", NodeKind::Variable), Vec3::Y);
        store.connect(main, leaf);

        assert_eq!(store.unreachable_nodes(), vec![orphan]);
    }
}
