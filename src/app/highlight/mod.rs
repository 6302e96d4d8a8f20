use std::collections::HashSet;

use crate::graph::{EdgeId, GraphStore, NodeId};

mod paths;

pub(super) use self::paths::path_from_main;

/// Nodes and edges to emphasise this frame.
#[derive(Debug, Default)]
pub(super) struct HighlightState {
    pub neighbors: HashSet<NodeId>,
    pub neighbor_edges: HashSet<EdgeId>,
    pub path_nodes: HashSet<NodeId>,
    pub path_edges: HashSet<EdgeId>,
}

impl HighlightState {
    pub(super) fn is_active(&self) -> bool {
        !self.neighbors.is_empty() || !self.path_nodes.is_empty()
    }
}

/// Direct neighbours of the hovered node, plus the path from the main node
/// to the selected one.
pub(super) fn build_highlight_state(
    store: &GraphStore,
    hovered: Option<NodeId>,
    selected: Option<NodeId>,
) -> HighlightState {
    let mut state = HighlightState::default();

    if let Some(hovered) = hovered
        && let Some(node) = store.node(hovered)
    {
        state.neighbors.insert(hovered);
        for &edge_id in &node.edges {
            state.neighbor_edges.insert(edge_id);
            state.neighbors.insert(store.edges()[edge_id.0].other(hovered));
        }
    }

    if let Some(selected) = selected
        && let Some((nodes, edges)) = path_from_main(store, selected)
    {
        state.path_nodes.extend(nodes);
        state.path_edges.extend(edges);
    }

    state
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::graph::{NodeDraft, NodeKind};

    use super::*;

    #[test]
    fn hover_marks_the_node_and_its_direct_neighbours() {
        let mut store = GraphStore::new();
        let main = store.add_node(NodeDraft::new("main", NodeKind::Main), Vec3::ZERO);
        let function = store.add_node(NodeDraft::new("f", NodeKind::Function), Vec3::X);
        let variable = store.add_node(NodeDraft::new("v", NodeKind::Variable), Vec3::Y);
        store.connect(main, function);
        store.connect(function, variable);

        let state = build_highlight_state(&store, Some(variable), None);

        assert_eq!(state.neighbors, HashSet::from([variable, function]));
        assert_eq!(state.neighbor_edges.len(), 1);
        assert!(state.path_nodes.is_empty());

        let state = build_highlight_state(&store, None, Some(variable));
        assert_eq!(state.path_nodes, HashSet::from([main, function, variable]));
        assert!(state.is_active());
    }
}
