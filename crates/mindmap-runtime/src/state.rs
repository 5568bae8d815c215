#![forbid(unsafe_code)]

//! The committed view of one document.

use mindmap_core::{
    Direction, Edge, GraphNode, MindMapError, NodeId, PersistedDocument, children_of, encode,
    find_node, generate_edges, hidden_nodes, state_hash, validate_tree,
};
use serde::Serialize;
use std::collections::HashSet;

/// Nodes, derived edges, root, direction and selection, as captured by every
/// history snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapState {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
    root_id: NodeId,
    direction: Direction,
    selection: Option<NodeId>,
}

impl MindMapState {
    /// Build a state from a node sequence, deriving edges.
    ///
    /// The nodes must already satisfy the tree invariants.
    pub fn new(
        nodes: Vec<GraphNode>,
        root_id: NodeId,
        direction: Direction,
    ) -> Result<Self, MindMapError> {
        validate_tree(&nodes, &root_id)?;
        let edges = generate_edges(&nodes, direction);
        Ok(Self {
            nodes,
            edges,
            root_id,
            direction,
            selection: None,
        })
    }

    /// Assemble a state whose nodes and edges were produced together.
    pub(crate) fn from_parts(
        nodes: Vec<GraphNode>,
        edges: Vec<Edge>,
        root_id: NodeId,
        direction: Direction,
        selection: Option<NodeId>,
    ) -> Self {
        Self {
            nodes,
            edges,
            root_id,
            direction,
            selection,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn root_id(&self) -> &NodeId {
        &self.root_id
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        find_node(&self.nodes, id)
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn root(&self) -> Option<&GraphNode> {
        self.node(&self.root_id)
    }

    #[must_use]
    pub fn children(&self, id: &NodeId) -> Vec<&GraphNode> {
        children_of(&self.nodes, id)
    }

    /// Nodes behind a collapsed ancestor.
    #[must_use]
    pub fn hidden(&self) -> HashSet<NodeId> {
        hidden_nodes(&self.nodes, &self.root_id)
    }

    /// Nodes a renderer should draw, in sequence order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        let hidden = self.hidden();
        self.nodes
            .iter()
            .filter(move |node| !hidden.contains(&node.id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Structural fingerprint; positions and widths are ignored.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        state_hash(&self.nodes, &self.root_id, self.direction)
    }

    /// Re-nest into the persisted format.
    pub fn to_document(&self) -> Result<PersistedDocument, MindMapError> {
        encode(&self.nodes, &self.root_id, self.direction)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [GraphNode] {
        &mut self.nodes
    }

    pub(crate) fn set_selection(&mut self, selection: Option<NodeId>) {
        self.selection = selection;
    }
}
