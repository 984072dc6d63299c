pub mod io;
pub mod ops;
pub mod stat;
pub mod traversal;

use super::error::PhyloError;
use super::node::{Node, NodeId};

/// An arena of nodes joined by weighted edges.
///
/// Reconstructed trees are unrooted; the arena still hangs them from one
/// node (`root`) so that every edge has a lower endpoint to carry its length
/// and Newick export has a place to start.
#[derive(Debug, Default, Clone)]
pub struct Tree {
    /// Arena storage for all nodes
    pub(super) nodes: Vec<Node>,

    /// Node the tree hangs from (a tree might be empty or in construction)
    pub(super) root: Option<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node to the tree. Returns the new node's ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        let node = Node::new(id);
        self.nodes.push(node);
        id
    }

    /// Add a labeled node. Returns the new node's ID.
    pub fn add_leaf(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.add_node();
        self.nodes[id].set_name(name);
        id
    }

    /// Get number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get root ID
    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a reference to a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Set a node as the root of the tree.
    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    // --- Delegation to ops ---

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
        ops::add_child(self, parent_id, child_id)
    }

    pub fn add_child_with_length(
        &mut self,
        parent_id: NodeId,
        child_id: NodeId,
        length: f64,
    ) -> Result<(), String> {
        ops::add_child_with_length(self, parent_id, child_id, length)
    }

    // --- Delegation to traversal ---

    pub fn neighbours(&self, id: NodeId) -> Vec<(NodeId, f64)> {
        traversal::neighbours(self, id)
    }

    pub fn check_structure(&self) -> Result<(), PhyloError> {
        traversal::check_structure(self)
    }

    // --- Delegation to stat ---

    pub fn get_leaves(&self) -> Vec<NodeId> {
        stat::get_leaves(self)
    }

    pub fn get_leaf_names(&self) -> Vec<Option<String>> {
        stat::get_leaf_names(self)
    }

    pub fn edge_count(&self) -> usize {
        stat::edge_count(self)
    }

    pub fn branch_lengths(&self) -> Vec<f64> {
        stat::branch_lengths(self)
    }

    pub fn is_binary(&self) -> bool {
        stat::is_binary(self)
    }

    pub fn total_length(&self) -> f64 {
        stat::total_length(self)
    }

    // --- Delegation to io ---

    pub fn to_newick(&self) -> String {
        io::to_newick(self)
    }

    pub fn to_newick_with_format(&self, indent: &str) -> String {
        io::to_newick_with_format(self, indent)
    }
}
