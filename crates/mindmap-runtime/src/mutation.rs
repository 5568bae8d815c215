#![forbid(unsafe_code)]

//! Transactional tree mutations.
//!
//! Every operation runs against a working copy of the committed
//! [`MindMapState`]. The copy is mutated, its derived fields are refreshed,
//! the tree invariants are re-validated, edges are regenerated and (for
//! structural operations) the layout is recomputed. Only then is the new
//! state handed back. On any error the input state is untouched and remains
//! authoritative.

use std::collections::{BTreeSet, HashSet};

use mindmap_core::{
    Direction, GraphNode, MindMapError, NodeId, RootOperation, TreeModelError, descendants_of,
    generate_edges, is_descendant, node_index, refresh_derived, validate_tree,
};
use mindmap_layout::{LabelMeasure, TreeLayout, measure_or_none};
use serde::{Deserialize, Serialize};

use crate::state::MindMapState;

/// Stable operation discriminator used in logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    AddChild,
    AddSibling,
    DeleteSubtree,
    MoveNode,
    ToggleCollapse,
    UpdateLabel,
    UpdateNotes,
    UpdateSources,
    UpdateCustomStyle,
    UpdateChatId,
    ChangeDirection,
}

impl MutationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddChild => "add_child",
            Self::AddSibling => "add_sibling",
            Self::DeleteSubtree => "delete_subtree",
            Self::MoveNode => "move_node",
            Self::ToggleCollapse => "toggle_collapse",
            Self::UpdateLabel => "update_label",
            Self::UpdateNotes => "update_notes",
            Self::UpdateSources => "update_sources",
            Self::UpdateCustomStyle => "update_custom_style",
            Self::UpdateChatId => "update_chat_id",
            Self::ChangeDirection => "change_direction",
        }
    }

    /// Whether the operation changes geometry and therefore needs a reflow.
    #[must_use]
    pub const fn relayouts(self) -> bool {
        !matches!(
            self,
            Self::UpdateNotes | Self::UpdateSources | Self::UpdateCustomStyle | Self::UpdateChatId
        )
    }
}

/// A single tree mutation request.
#[derive(Debug, Clone, PartialEq)]
pub enum MindMapOperation {
    /// Append a new last child under `parent`.
    AddChild {
        parent: NodeId,
        new_id: NodeId,
        label: String,
    },
    /// Insert a new node directly after `sibling`, under the same parent.
    AddSibling {
        sibling: NodeId,
        new_id: NodeId,
        label: String,
    },
    /// Remove `node` and all its descendants.
    DeleteSubtree { node: NodeId },
    /// Reparent `node` (and its subtree) under `new_parent`.
    ///
    /// `insert_index` repositions the moved node in the node sequence,
    /// counted after the node has been taken out; it is clamped to the
    /// sequence length.
    MoveNode {
        node: NodeId,
        new_parent: NodeId,
        insert_index: Option<usize>,
    },
    ToggleCollapse { node: NodeId },
    UpdateLabel { node: NodeId, label: String },
    UpdateNotes { node: NodeId, notes: Option<String> },
    UpdateSources {
        node: NodeId,
        sources: Option<Vec<serde_json::Value>>,
    },
    UpdateCustomStyle {
        node: NodeId,
        custom_style: Option<String>,
    },
    UpdateChatId {
        node: NodeId,
        chat_id: Option<String>,
    },
    ChangeDirection { direction: Direction },
}

impl MindMapOperation {
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::AddChild { .. } => MutationKind::AddChild,
            Self::AddSibling { .. } => MutationKind::AddSibling,
            Self::DeleteSubtree { .. } => MutationKind::DeleteSubtree,
            Self::MoveNode { .. } => MutationKind::MoveNode,
            Self::ToggleCollapse { .. } => MutationKind::ToggleCollapse,
            Self::UpdateLabel { .. } => MutationKind::UpdateLabel,
            Self::UpdateNotes { .. } => MutationKind::UpdateNotes,
            Self::UpdateSources { .. } => MutationKind::UpdateSources,
            Self::UpdateCustomStyle { .. } => MutationKind::UpdateCustomStyle,
            Self::UpdateChatId { .. } => MutationKind::UpdateChatId,
            Self::ChangeDirection { .. } => MutationKind::ChangeDirection,
        }
    }

    /// Node ids named by the request.
    #[must_use]
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        match self {
            Self::AddChild { parent, new_id, .. } => vec![parent.clone(), new_id.clone()],
            Self::AddSibling {
                sibling, new_id, ..
            } => vec![sibling.clone(), new_id.clone()],
            Self::MoveNode {
                node, new_parent, ..
            } => vec![node.clone(), new_parent.clone()],
            Self::DeleteSubtree { node }
            | Self::ToggleCollapse { node }
            | Self::UpdateLabel { node, .. }
            | Self::UpdateNotes { node, .. }
            | Self::UpdateSources { node, .. }
            | Self::UpdateCustomStyle { node, .. }
            | Self::UpdateChatId { node, .. } => vec![node.clone()],
            Self::ChangeDirection { .. } => Vec::new(),
        }
    }

    /// Whether this is a move that would leave `state` exactly as it is:
    /// same parent and, when an index is given, the same sequence slot.
    #[must_use]
    pub fn is_noop_move(&self, state: &MindMapState) -> bool {
        let Self::MoveNode {
            node,
            new_parent,
            insert_index,
        } = self
        else {
            return false;
        };
        let Some(index) = node_index(state.nodes(), node) else {
            return false;
        };
        if state.nodes()[index].parent_id.as_ref() != Some(new_parent) {
            return false;
        }
        insert_index.is_none_or(|target| target.min(state.len() - 1) == index)
    }
}

/// Successful mutation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub operation_id: u64,
    pub kind: MutationKind,
    pub touched_nodes: Vec<NodeId>,
    pub before_hash: u64,
    pub after_hash: u64,
}

/// A committed working copy plus its outcome record.
#[derive(Debug, Clone)]
pub struct Applied {
    pub state: MindMapState,
    pub outcome: MutationOutcome,
}

/// Applies [`MindMapOperation`]s to states, re-measuring and re-laying out
/// as required.
pub struct MutationEngine<'a> {
    layout: &'a TreeLayout,
    measure: &'a dyn LabelMeasure,
}

impl<'a> MutationEngine<'a> {
    #[must_use]
    pub fn new(layout: &'a TreeLayout, measure: &'a dyn LabelMeasure) -> Self {
        Self { layout, measure }
    }

    /// Measure every label and compute a first layout for freshly loaded
    /// nodes.
    pub fn prepare(
        &self,
        mut nodes: Vec<GraphNode>,
        root_id: NodeId,
        direction: Direction,
    ) -> Result<MindMapState, MindMapError> {
        refresh_derived(&mut nodes, &root_id)?;
        validate_tree(&nodes, &root_id)?;
        for node in &mut nodes {
            node.width = self.measure_label(&node.id, &node.label);
        }
        let edges = generate_edges(&nodes, direction);
        let nodes = self.layout.apply(&nodes, &edges, &root_id, direction)?;
        Ok(MindMapState::from_parts(
            nodes, edges, root_id, direction, None,
        ))
    }

    /// Recompute positions without changing structure.
    pub fn relayout(&self, state: &MindMapState) -> Result<MindMapState, MindMapError> {
        let nodes = self.layout.apply(
            state.nodes(),
            state.edges(),
            state.root_id(),
            state.direction(),
        )?;
        Ok(MindMapState::from_parts(
            nodes,
            state.edges().to_vec(),
            state.root_id().clone(),
            state.direction(),
            state.selection().cloned(),
        ))
    }

    /// Apply `operation` to a copy of `state`.
    pub fn apply(
        &self,
        operation_id: u64,
        state: &MindMapState,
        operation: MindMapOperation,
    ) -> Result<Applied, MindMapError> {
        let kind = operation.kind();
        let before_hash = state.state_hash();
        let root_id = state.root_id().clone();
        let mut working = Working {
            nodes: state.nodes().to_vec(),
            direction: state.direction(),
            selection: state.selection().cloned(),
            touched: operation.referenced_nodes().into_iter().collect(),
        };

        let span = tracing::debug_span!(
            "mindmap.mutation",
            operation_id,
            kind = kind.as_str(),
            before_hash,
        );
        let _guard = span.enter();

        if let Err(err) = self.apply_inner(&mut working, &root_id, operation) {
            tracing::debug!(
                target: "mindmap.mutation",
                operation_id,
                kind = kind.as_str(),
                error = %err,
                "mutation rejected"
            );
            return Err(err);
        }

        refresh_derived(&mut working.nodes, &root_id)?;
        validate_tree(&working.nodes, &root_id)?;
        let edges = generate_edges(&working.nodes, working.direction);
        let nodes = if kind.relayouts() {
            self.layout
                .apply(&working.nodes, &edges, &root_id, working.direction)?
        } else {
            working.nodes
        };
        let next = MindMapState::from_parts(
            nodes,
            edges,
            root_id,
            working.direction,
            working.selection,
        );
        let after_hash = next.state_hash();

        tracing::debug!(
            target: "mindmap.mutation",
            operation_id,
            kind = kind.as_str(),
            touched = working.touched.len(),
            before_hash,
            after_hash,
            "mutation applied"
        );

        Ok(Applied {
            state: next,
            outcome: MutationOutcome {
                operation_id,
                kind,
                touched_nodes: working.touched.into_iter().collect(),
                before_hash,
                after_hash,
            },
        })
    }

    fn apply_inner(
        &self,
        working: &mut Working,
        root_id: &NodeId,
        operation: MindMapOperation,
    ) -> Result<(), MindMapError> {
        match operation {
            MindMapOperation::AddChild {
                parent,
                new_id,
                label,
            } => {
                let parent_index = working.index_of(&parent)?;
                working.ensure_unused(&new_id)?;
                let parent_node = &mut working.nodes[parent_index];
                if parent_node.collapsed {
                    parent_node.collapsed = false;
                }
                let depth = parent_node.depth + 1;
                let mut node = GraphNode::child(new_id.clone(), label, parent, depth);
                node.width = self.measure_label(&node.id, &node.label);
                working.nodes.push(node);
                working.selection = Some(new_id);
            }
            MindMapOperation::AddSibling {
                sibling,
                new_id,
                label,
            } => {
                let index = working.index_of(&sibling)?;
                let Some(parent) = working.nodes[index].parent_id.clone() else {
                    return Err(MindMapError::RootViolation {
                        node_id: sibling,
                        operation: RootOperation::AddSibling,
                    });
                };
                working.ensure_unused(&new_id)?;
                let depth = working.nodes[index].depth;
                let mut node = GraphNode::child(new_id.clone(), label, parent.clone(), depth);
                node.width = self.measure_label(&node.id, &node.label);
                working.nodes.insert(index + 1, node);
                let _ = working.touched.insert(parent);
                working.selection = Some(new_id);
            }
            MindMapOperation::DeleteSubtree { node } => {
                let index = working.index_of(&node)?;
                if &node == root_id || working.nodes[index].is_root() {
                    return Err(MindMapError::RootViolation {
                        node_id: node,
                        operation: RootOperation::Delete,
                    });
                }
                let parent = working.nodes[index].parent_id.clone();
                let mut removed: HashSet<NodeId> =
                    descendants_of(&working.nodes, &node).into_iter().collect();
                let _ = removed.insert(node.clone());
                working.nodes.retain(|n| !removed.contains(&n.id));
                if working.nodes.is_empty() {
                    return Err(MindMapError::EmptyTree);
                }
                if working
                    .selection
                    .as_ref()
                    .is_some_and(|selected| removed.contains(selected))
                {
                    working.selection = parent.clone();
                }
                working.touched.extend(removed);
                if let Some(parent) = parent {
                    let _ = working.touched.insert(parent);
                }
            }
            MindMapOperation::MoveNode {
                node,
                new_parent,
                insert_index,
            } => {
                let index = working.index_of(&node)?;
                let _ = working.index_of(&new_parent)?;
                let Some(old_parent) = working.nodes[index].parent_id.clone() else {
                    return Err(MindMapError::RootViolation {
                        node_id: node,
                        operation: RootOperation::Move,
                    });
                };
                if new_parent == node || is_descendant(&working.nodes, &node, &new_parent) {
                    return Err(MindMapError::Cycle {
                        node_id: node,
                        new_parent,
                    });
                }
                working.nodes[index].parent_id = Some(new_parent);
                if let Some(target) = insert_index {
                    let moved = working.nodes.remove(index);
                    let target = target.min(working.nodes.len());
                    working.nodes.insert(target, moved);
                }
                let _ = working.touched.insert(old_parent);
                working
                    .touched
                    .extend(descendants_of(&working.nodes, &node));
            }
            MindMapOperation::ToggleCollapse { node } => {
                let index = working.index_of(&node)?;
                let target = &mut working.nodes[index];
                target.collapsed = !target.collapsed;
            }
            MindMapOperation::UpdateLabel { node, label } => {
                let index = working.index_of(&node)?;
                let width = self.measure_label(&node, &label);
                let target = &mut working.nodes[index];
                target.label = label;
                target.width = width;
            }
            MindMapOperation::UpdateNotes { node, notes } => {
                let index = working.index_of(&node)?;
                working.nodes[index].payload.notes = notes;
            }
            MindMapOperation::UpdateSources { node, sources } => {
                let index = working.index_of(&node)?;
                working.nodes[index].payload.sources = sources;
            }
            MindMapOperation::UpdateCustomStyle { node, custom_style } => {
                let index = working.index_of(&node)?;
                working.nodes[index].custom_style = custom_style;
            }
            MindMapOperation::UpdateChatId { node, chat_id } => {
                let index = working.index_of(&node)?;
                working.nodes[index].payload.chat_id = chat_id;
            }
            MindMapOperation::ChangeDirection { direction } => {
                working.direction = direction;
            }
        }
        Ok(())
    }

    fn measure_label(&self, id: &NodeId, label: &str) -> Option<f64> {
        let width = measure_or_none(self.measure, label);
        if width.is_none() {
            tracing::debug!(
                target: "mindmap.mutation",
                node_id = %id,
                "label measurement unavailable; layout falls back to default width"
            );
        }
        width
    }
}

struct Working {
    nodes: Vec<GraphNode>,
    direction: Direction,
    selection: Option<NodeId>,
    touched: BTreeSet<NodeId>,
}

impl Working {
    fn index_of(&self, id: &NodeId) -> Result<usize, MindMapError> {
        node_index(&self.nodes, id).ok_or_else(|| MindMapError::not_found(id))
    }

    fn ensure_unused(&self, id: &NodeId) -> Result<(), MindMapError> {
        if node_index(&self.nodes, id).is_some() {
            return Err(TreeModelError::DuplicateNodeId {
                node_id: id.clone(),
            }
            .into());
        }
        Ok(())
    }
}
