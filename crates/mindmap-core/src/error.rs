//! Error taxonomy for tree operations.

use std::fmt;

use crate::id::NodeId;

/// Structural operation that is not permitted on the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootOperation {
    Delete,
    Move,
    AddSibling,
}

impl fmt::Display for RootOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delete => "delete",
            Self::Move => "move",
            Self::AddSibling => "add a sibling to",
        };
        f.write_str(name)
    }
}

/// Invariant violations found while validating a node set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeModelError {
    EmptyTree,
    DuplicateNodeId {
        node_id: NodeId,
    },
    MissingRoot {
        root_id: NodeId,
    },
    RootHasParent {
        root_id: NodeId,
        parent_id: NodeId,
    },
    MultipleRoots {
        root_id: NodeId,
        other: NodeId,
    },
    MissingParent {
        node_id: NodeId,
        parent_id: NodeId,
    },
    CycleDetected {
        node_id: NodeId,
    },
    DepthMismatch {
        node_id: NodeId,
        expected: u32,
        actual: u32,
    },
}

impl fmt::Display for TreeModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTree => write!(f, "tree has no nodes"),
            Self::DuplicateNodeId { node_id } => write!(f, "duplicate node id {node_id}"),
            Self::MissingRoot { root_id } => write!(f, "root node {root_id} not found"),
            Self::RootHasParent { root_id, parent_id } => {
                write!(f, "root {root_id} must not have parent {parent_id}")
            }
            Self::MultipleRoots { root_id, other } => {
                write!(f, "node {other} has no parent but {root_id} is the root")
            }
            Self::MissingParent { node_id, parent_id } => {
                write!(f, "node {node_id} references missing parent {parent_id}")
            }
            Self::CycleDetected { node_id } => write!(f, "cycle detected at node {node_id}"),
            Self::DepthMismatch {
                node_id,
                expected,
                actual,
            } => write!(
                f,
                "node {node_id} has depth {actual}, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for TreeModelError {}

/// Contract violations surfaced by tree operations.
///
/// Every operation is copy-on-write, so an error means the prior state is
/// still the authoritative one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MindMapError {
    NotFound {
        node_id: NodeId,
    },
    Cycle {
        node_id: NodeId,
        new_parent: NodeId,
    },
    RootViolation {
        node_id: NodeId,
        operation: RootOperation,
    },
    /// The operation would leave the map without nodes.
    EmptyTree,
    Invalid(TreeModelError),
}

impl MindMapError {
    /// Shorthand for a missing node.
    #[must_use]
    pub fn not_found(node_id: &NodeId) -> Self {
        Self::NotFound {
            node_id: node_id.clone(),
        }
    }
}

impl fmt::Display for MindMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { node_id } => write!(f, "node {node_id} not found"),
            Self::Cycle {
                node_id,
                new_parent,
            } => write!(
                f,
                "moving {node_id} under {new_parent} would create a cycle"
            ),
            Self::RootViolation { node_id, operation } => {
                write!(f, "cannot {operation} root node {node_id}")
            }
            Self::EmptyTree => write!(f, "operation would leave no nodes"),
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MindMapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Invalid(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<TreeModelError> for MindMapError {
    fn from(err: TreeModelError) -> Self {
        Self::Invalid(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_violation_message_names_operation() {
        let err = MindMapError::RootViolation {
            node_id: NodeId::new("root"),
            operation: RootOperation::AddSibling,
        };
        assert_eq!(err.to_string(), "cannot add a sibling to root node root");
    }

    #[test]
    fn invalid_chains_source() {
        use std::error::Error as _;
        let err = MindMapError::from(TreeModelError::EmptyTree);
        assert!(err.source().is_some());
        assert!(MindMapError::EmptyTree.source().is_none());
    }
}
