/// NodeId is an index into the Tree's node vector.
/// It is lightweight (Copy) and safe (no pointers).
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for the node (index in the arena)
    pub id: NodeId,

    /// Parent node ID (None for the node the tree hangs from)
    pub parent: Option<NodeId>,

    /// List of child node IDs
    pub children: Vec<NodeId>,

    // --- Payload ---
    /// Taxon label. Leaves carry one, inferred ancestors don't.
    pub name: Option<String>,

    /// Length of the edge to the parent.
    /// Each edge of the tree is stored once, on its lower endpoint.
    pub length: Option<f64>,
}

impl Node {
    /// Create a new empty node with a specific ID
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
        }
    }

    /// Set the name of the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Number of incident edges, ignoring direction.
    pub fn degree(&self) -> usize {
        self.children.len() + usize::from(self.parent.is_some())
    }

    /// A leaf is a node with at most one incident edge.
    ///
    /// In a two-taxon tree one leaf hangs from the other, so having no
    /// children is not enough.
    pub fn is_leaf(&self) -> bool {
        self.degree() <= 1
    }
}
