use super::Tree;
use crate::libs::phylo::error::PhyloError;
use crate::libs::phylo::node::NodeId;
use std::collections::VecDeque;

/// Nodes sharing an edge with `id`, paired with that edge's length.
///
/// The parent comes first, then children in insertion order.
/// A missing length counts as zero.
pub fn neighbours(tree: &Tree, id: NodeId) -> Vec<(NodeId, f64)> {
    let node = match tree.get_node(id) {
        Some(n) => n,
        None => return Vec::new(),
    };

    let mut result = Vec::with_capacity(node.degree());
    if let Some(parent) = node.parent {
        result.push((parent, node.length.unwrap_or(0.0)));
    }
    for &child in &node.children {
        let len = tree.get_node(child).and_then(|n| n.length).unwrap_or(0.0);
        result.push((child, len));
    }
    result
}

/// Depth-first walk over the undirected tree from `start`.
///
/// Returns every reachable node with its path length from `start`, in
/// visitation order. The tree must be acyclic; see [`check_structure`].
pub fn walk_from(tree: &Tree, start: NodeId) -> Vec<(NodeId, f64)> {
    let mut result = Vec::new();
    let mut stack = vec![(start, None::<NodeId>, 0.0)];

    while let Some((curr, from, dist)) = stack.pop() {
        result.push((curr, dist));
        // Push in reverse order so they are popped in original order
        for (next, len) in neighbours(tree, curr).into_iter().rev() {
            if Some(next) != from {
                stack.push((next, Some(curr), dist + len));
            }
        }
    }

    result
}

/// Verify that the arena forms exactly one tree.
///
/// A graph with V nodes is a tree iff it is connected and has V - 1 edges.
/// Each edge is a child's link to its parent, so links must be mutual.
pub fn check_structure(tree: &Tree) -> Result<(), PhyloError> {
    let n = tree.len();
    if n == 0 {
        return Err(PhyloError::MalformedTree("tree has no nodes".to_string()));
    }

    for node in tree.nodes() {
        if let Some(parent) = node.parent {
            let linked = tree
                .get_node(parent)
                .map(|p| p.children.contains(&node.id))
                .unwrap_or(false);
            if !linked {
                return Err(PhyloError::MalformedTree(format!(
                    "node {} is not a child of its parent {}",
                    node.id, parent
                )));
            }
        }
        for &child in &node.children {
            if tree.get_node(child).and_then(|c| c.parent) != Some(node.id) {
                return Err(PhyloError::MalformedTree(format!(
                    "child {} does not point back to node {}",
                    child, node.id
                )));
            }
        }
    }

    let edges = tree.edge_count();
    if edges != n - 1 {
        return Err(PhyloError::MalformedTree(format!(
            "{} nodes joined by {} edges, expected {}",
            n,
            edges,
            n - 1
        )));
    }

    // BFS with a visited mask
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    visited[0] = true;
    queue.push_back(0);
    let mut seen = 1;

    while let Some(id) = queue.pop_front() {
        for (next, _) in neighbours(tree, id) {
            if !visited[next] {
                visited[next] = true;
                seen += 1;
                queue.push_back(next);
            }
        }
    }

    if seen != n {
        return Err(PhyloError::MalformedTree(format!(
            "only {} of {} nodes are connected",
            seen, n
        )));
    }

    Ok(())
}
