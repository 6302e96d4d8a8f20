use std::collections::{HashMap, VecDeque};

use crate::graph::{EdgeId, GraphStore, NodeId};

/// Breadth-first path from the main node to `target`, as the nodes and the
/// edges walked. Edges are followed in either direction.
pub(in crate::app) fn path_from_main(
    store: &GraphStore,
    target: NodeId,
) -> Option<(Vec<NodeId>, Vec<EdgeId>)> {
    let main = store.main()?;
    store.node(target)?;

    let mut parent: HashMap<NodeId, (NodeId, EdgeId)> = HashMap::new();
    let mut queue = VecDeque::from([main]);
    let mut reached = main == target;

    while let Some(current) = queue.pop_front() {
        if reached {
            break;
        }
        let Some(node) = store.node(current) else {
            continue;
        };

        for &edge_id in &node.edges {
            let next = store.edges()[edge_id.0].other(current);
            if next == main || parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, (current, edge_id));
            if next == target {
                reached = true;
                break;
            }
            queue.push_back(next);
        }
    }

    if !reached {
        return None;
    }

    let mut nodes = vec![target];
    let mut edges = Vec::new();
    let mut cursor = target;
    while let Some(&(previous, edge)) = parent.get(&cursor) {
        nodes.push(previous);
        edges.push(edge);
        cursor = previous;
    }

    nodes.reverse();
    edges.reverse();
    Some((nodes, edges))
}
