use super::Tree;
use crate::libs::phylo::node::NodeId;

/// Get IDs of all leaves, in arena order.
///
/// Trees built from a matrix create their leaves first, so this is also
/// the row order of that matrix.
pub fn get_leaves(tree: &Tree) -> Vec<NodeId> {
    tree.nodes
        .iter()
        .filter(|n| n.is_leaf())
        .map(|n| n.id)
        .collect()
}

/// Get names of all leaves, in arena order.
pub fn get_leaf_names(tree: &Tree) -> Vec<Option<String>> {
    get_leaves(tree)
        .into_iter()
        .map(|leaf_id| tree.get_node(leaf_id).and_then(|n| n.name.clone()))
        .collect()
}

/// Number of edges. Each non-root node holds exactly one.
pub fn edge_count(tree: &Tree) -> usize {
    tree.nodes.iter().filter(|n| n.parent.is_some()).count()
}

/// Lengths of all edges, in arena order of their lower endpoints.
pub fn branch_lengths(tree: &Tree) -> Vec<f64> {
    tree.nodes
        .iter()
        .filter(|n| n.parent.is_some())
        .map(|n| n.length.unwrap_or(0.0))
        .collect()
}

/// Sum of all branch lengths.
pub fn total_length(tree: &Tree) -> f64 {
    branch_lengths(tree).iter().sum()
}

/// Check if the unrooted tree is binary: every internal node has degree 3.
pub fn is_binary(tree: &Tree) -> bool {
    tree.nodes.iter().all(|n| n.is_leaf() || n.degree() == 3)
}
