//! Structural queries, derived-field maintenance, and invariant validation
//! over a node sequence.
//!
//! The node sequence is the authoritative order: children of one parent are
//! always reported in the order they appear in the slice.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::{MindMapError, TreeModelError};
use crate::id::NodeId;
use crate::node::{Direction, GraphNode};

/// Parent → children index over a node slice, in sequence order.
#[derive(Debug, Default)]
pub struct ChildIndex<'a> {
    children: HashMap<&'a str, Vec<usize>>,
}

impl<'a> ChildIndex<'a> {
    /// Index every parented node under its parent.
    #[must_use]
    pub fn build(nodes: &'a [GraphNode]) -> Self {
        let mut children: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(parent) = &node.parent_id {
                children.entry(parent.as_str()).or_default().push(index);
            }
        }
        Self { children }
    }

    /// Indices of the children of `id`.
    #[must_use]
    pub fn children(&self, id: &str) -> &[usize] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    /// Whether `id` has at least one child.
    #[must_use]
    pub fn has_children(&self, id: &str) -> bool {
        !self.children(id).is_empty()
    }
}

/// Position of `id` in the node sequence.
#[must_use]
pub fn node_index(nodes: &[GraphNode], id: &NodeId) -> Option<usize> {
    nodes.iter().position(|node| &node.id == id)
}

/// Lookup a node by id.
#[must_use]
pub fn find_node<'a>(nodes: &'a [GraphNode], id: &NodeId) -> Option<&'a GraphNode> {
    nodes.iter().find(|node| &node.id == id)
}

/// Direct children of `id` in sequence order.
#[must_use]
pub fn children_of<'a>(nodes: &'a [GraphNode], id: &NodeId) -> Vec<&'a GraphNode> {
    nodes
        .iter()
        .filter(|node| node.parent_id.as_ref() == Some(id))
        .collect()
}

/// All descendants of `id` in pre-order, excluding `id` itself.
#[must_use]
pub fn descendants_of(nodes: &[GraphNode], id: &NodeId) -> Vec<NodeId> {
    let index = ChildIndex::build(nodes);
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut stack: Vec<usize> = index.children(id.as_str()).iter().rev().copied().collect();
    while let Some(next) = stack.pop() {
        let node = &nodes[next];
        if !seen.insert(node.id.as_str()) {
            continue;
        }
        out.push(node.id.clone());
        stack.extend(index.children(node.id.as_str()).iter().rev().copied());
    }
    out
}

/// Whether `candidate` sits strictly below `ancestor`.
#[must_use]
pub fn is_descendant(nodes: &[GraphNode], ancestor: &NodeId, candidate: &NodeId) -> bool {
    descendants_of(nodes, ancestor).contains(candidate)
}

/// Ancestors of `id`, nearest first, ending at the root.
#[must_use]
pub fn ancestors_of(nodes: &[GraphNode], id: &NodeId) -> Vec<NodeId> {
    let by_id: HashMap<&str, &GraphNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let mut out = Vec::new();
    let mut cursor = by_id.get(id.as_str()).and_then(|node| node.parent_id.as_ref());
    while let Some(parent) = cursor {
        if out.contains(parent) || out.len() > nodes.len() {
            break;
        }
        out.push(parent.clone());
        cursor = by_id
            .get(parent.as_str())
            .and_then(|node| node.parent_id.as_ref());
    }
    out
}

/// Ids of every node sitting behind a collapsed ancestor.
///
/// A collapsed node itself stays visible; only what hangs below it is hidden.
#[must_use]
pub fn hidden_nodes(nodes: &[GraphNode], root_id: &NodeId) -> HashSet<NodeId> {
    let index = ChildIndex::build(nodes);
    let mut hidden = HashSet::new();
    let Some(root) = node_index(nodes, root_id) else {
        return hidden;
    };
    // (node index, behind a collapsed ancestor)
    let mut stack = vec![(root, false)];
    while let Some((current, is_hidden)) = stack.pop() {
        let node = &nodes[current];
        if is_hidden {
            hidden.insert(node.id.clone());
        }
        let children_hidden = is_hidden || node.collapsed;
        for &child in index.children(node.id.as_str()) {
            stack.push((child, children_hidden));
        }
    }
    hidden
}

/// Recompute `depth` and `has_children` from the parent links.
pub fn refresh_derived(nodes: &mut [GraphNode], root_id: &NodeId) -> Result<(), MindMapError> {
    let root = node_index(nodes, root_id).ok_or_else(|| MindMapError::not_found(root_id))?;
    let (depths, has_children) = {
        let index = ChildIndex::build(nodes);
        let mut depths = vec![None; nodes.len()];
        depths[root] = Some(0u32);
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let depth = depths[current].unwrap_or(0);
            for &child in index.children(nodes[current].id.as_str()) {
                if depths[child].is_some() {
                    return Err(TreeModelError::CycleDetected {
                        node_id: nodes[child].id.clone(),
                    }
                    .into());
                }
                depths[child] = Some(depth + 1);
                stack.push(child);
            }
        }
        let has_children = nodes
            .iter()
            .map(|node| index.has_children(node.id.as_str()))
            .collect::<Vec<_>>();
        (depths, has_children)
    };
    for ((node, depth), has_children) in nodes.iter_mut().zip(depths).zip(has_children) {
        let Some(depth) = depth else {
            return Err(TreeModelError::CycleDetected {
                node_id: node.id.clone(),
            }
            .into());
        };
        node.depth = depth;
        node.has_children = has_children;
    }
    Ok(())
}

/// Check the five tree invariants: one root, acyclic, parents exist, unique
/// ids, consistent depths.
pub fn validate_tree(nodes: &[GraphNode], root_id: &NodeId) -> Result<(), TreeModelError> {
    if nodes.is_empty() {
        return Err(TreeModelError::EmptyTree);
    }

    let mut by_id: HashMap<&str, &GraphNode> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if by_id.insert(node.id.as_str(), node).is_some() {
            return Err(TreeModelError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }

    let Some(root) = by_id.get(root_id.as_str()) else {
        return Err(TreeModelError::MissingRoot {
            root_id: root_id.clone(),
        });
    };
    if let Some(parent_id) = &root.parent_id {
        return Err(TreeModelError::RootHasParent {
            root_id: root_id.clone(),
            parent_id: parent_id.clone(),
        });
    }
    if root.depth != 0 {
        return Err(TreeModelError::DepthMismatch {
            node_id: root_id.clone(),
            expected: 0,
            actual: root.depth,
        });
    }

    for node in nodes {
        match &node.parent_id {
            None if node.id != *root_id => {
                return Err(TreeModelError::MultipleRoots {
                    root_id: root_id.clone(),
                    other: node.id.clone(),
                });
            }
            None => {}
            Some(parent_id) => {
                let Some(parent) = by_id.get(parent_id.as_str()) else {
                    return Err(TreeModelError::MissingParent {
                        node_id: node.id.clone(),
                        parent_id: parent_id.clone(),
                    });
                };
                let expected = parent.depth.saturating_add(1);
                if node.depth != expected {
                    return Err(TreeModelError::DepthMismatch {
                        node_id: node.id.clone(),
                        expected,
                        actual: node.depth,
                    });
                }
            }
        }
    }

    // Every node must reach the root. Each node is walked at most once:
    // a walk stops at the first node already known to reach the root.
    let mut reaches_root: HashSet<&str> = HashSet::with_capacity(nodes.len());
    let _ = reaches_root.insert(root_id.as_str());
    let mut path: Vec<&str> = Vec::new();
    for node in nodes {
        path.clear();
        let mut cursor = node;
        while !reaches_root.contains(cursor.id.as_str()) {
            if path.len() > nodes.len() {
                return Err(TreeModelError::CycleDetected {
                    node_id: node.id.clone(),
                });
            }
            path.push(cursor.id.as_str());
            let Some(parent_id) = &cursor.parent_id else {
                break;
            };
            cursor = by_id[parent_id.as_str()];
        }
        reaches_root.extend(path.iter().copied());
    }

    Ok(())
}

/// Deterministic structural hash of a node sequence.
///
/// Covers ids, order, labels, parent links, flags, and payloads. Positions
/// and measured widths are excluded so a pure reflow does not change it.
#[must_use]
pub fn state_hash(nodes: &[GraphNode], root_id: &NodeId, direction: Direction) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0001_0000_01b3;

    fn mix(hash: &mut u64, byte: u8) {
        *hash ^= u64::from(byte);
        *hash = hash.wrapping_mul(PRIME);
    }

    fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
        for byte in bytes {
            mix(hash, *byte);
        }
    }

    fn mix_u64(hash: &mut u64, value: u64) {
        mix_bytes(hash, &value.to_le_bytes());
    }

    fn mix_str(hash: &mut u64, value: &str) {
        mix_u64(hash, value.len() as u64);
        mix_bytes(hash, value.as_bytes());
    }

    fn mix_opt_str(hash: &mut u64, value: Option<&str>) {
        match value {
            Some(value) => {
                mix(hash, 1);
                mix_str(hash, value);
            }
            None => mix(hash, 0),
        }
    }

    fn mix_sources(hash: &mut u64, sources: Option<&Vec<Value>>) {
        match sources {
            Some(sources) => {
                mix(hash, 1);
                mix_u64(hash, sources.len() as u64);
                for source in sources {
                    mix_str(hash, &source.to_string());
                }
            }
            None => mix(hash, 0),
        }
    }

    let mut hash = OFFSET_BASIS;
    mix_str(&mut hash, root_id.as_str());
    mix_str(&mut hash, direction.as_tag());
    mix_u64(&mut hash, nodes.len() as u64);
    for node in nodes {
        mix_str(&mut hash, node.id.as_str());
        mix_opt_str(&mut hash, node.parent_id.as_ref().map(NodeId::as_str));
        mix_str(&mut hash, &node.label);
        mix(&mut hash, u8::from(node.collapsed));
        mix_opt_str(&mut hash, node.custom_style.as_deref());
        mix_opt_str(&mut hash, node.payload.chat_id.as_deref());
        mix_opt_str(&mut hash, node.payload.notes.as_deref());
        mix_sources(&mut hash, node.payload.sources.as_ref());
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> NodeId {
        NodeId::new(raw)
    }

    /// root ─┬─ a ─── a1
    ///       └─ b
    fn sample() -> Vec<GraphNode> {
        let mut nodes = vec![
            GraphNode::root(id("root"), "Root"),
            GraphNode::child(id("a"), "A", id("root"), 1),
            GraphNode::child(id("b"), "B", id("root"), 1),
            GraphNode::child(id("a1"), "A1", id("a"), 2),
        ];
        refresh_derived(&mut nodes, &id("root")).unwrap();
        nodes
    }

    #[test]
    fn sample_is_valid() {
        assert_eq!(validate_tree(&sample(), &id("root")), Ok(()));
    }

    #[test]
    fn children_follow_sequence_order() {
        let nodes = sample();
        let kids: Vec<_> = children_of(&nodes, &id("root"))
            .into_iter()
            .map(|node| node.id.as_str())
            .collect();
        assert_eq!(kids, vec!["a", "b"]);
    }

    #[test]
    fn descendants_are_preorder() {
        let nodes = sample();
        assert_eq!(
            descendants_of(&nodes, &id("root")),
            vec![id("a"), id("a1"), id("b")]
        );
        assert!(descendants_of(&nodes, &id("b")).is_empty());
        assert!(is_descendant(&nodes, &id("a"), &id("a1")));
        assert!(!is_descendant(&nodes, &id("a1"), &id("a")));
    }

    #[test]
    fn ancestors_walk_to_root() {
        let nodes = sample();
        assert_eq!(ancestors_of(&nodes, &id("a1")), vec![id("a"), id("root")]);
        assert!(ancestors_of(&nodes, &id("root")).is_empty());
    }

    #[test]
    fn refresh_sets_has_children() {
        let nodes = sample();
        let flags: Vec<_> = nodes.iter().map(|node| node.has_children).collect();
        assert_eq!(flags, vec![true, true, false, false]);
    }

    #[test]
    fn collapsed_node_hides_only_descendants() {
        let mut nodes = sample();
        nodes[1].collapsed = true;
        let hidden = hidden_nodes(&nodes, &id("root"));
        assert!(hidden.contains(&id("a1")));
        assert!(!hidden.contains(&id("a")));
        assert_eq!(hidden.len(), 1);
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut nodes = sample();
        nodes.push(GraphNode::child(id("b"), "dup", id("root"), 1));
        assert!(matches!(
            validate_tree(&nodes, &id("root")),
            Err(TreeModelError::DuplicateNodeId { .. })
        ));
    }

    #[test]
    fn validate_rejects_second_root() {
        let mut nodes = sample();
        nodes.push(GraphNode::root(id("other"), "Other"));
        assert!(matches!(
            validate_tree(&nodes, &id("root")),
            Err(TreeModelError::MultipleRoots { .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_parent() {
        let mut nodes = sample();
        nodes.push(GraphNode::child(id("orphan"), "O", id("ghost"), 1));
        assert!(matches!(
            validate_tree(&nodes, &id("root")),
            Err(TreeModelError::MissingParent { .. })
        ));
    }

    #[test]
    fn validate_rejects_depth_mismatch() {
        let mut nodes = sample();
        nodes[3].depth = 5;
        assert!(matches!(
            validate_tree(&nodes, &id("root")),
            Err(TreeModelError::DepthMismatch { expected: 2, actual: 5, .. })
        ));
    }

    #[test]
    fn validate_rejects_cycle() {
        let mut nodes = sample();
        // a -> a1 -> a, detached from root; depths made locally consistent.
        nodes[1].parent_id = Some(id("a1"));
        nodes[1].depth = 3;
        nodes[3].depth = 4;
        let err = validate_tree(&nodes, &id("root")).unwrap_err();
        assert!(matches!(
            err,
            TreeModelError::DepthMismatch { .. } | TreeModelError::CycleDetected { .. }
        ));
    }

    #[test]
    fn refresh_rejects_unreachable_nodes() {
        let mut nodes = sample();
        nodes[1].parent_id = Some(id("a1"));
        assert!(refresh_derived(&mut nodes, &id("root")).is_err());
    }

    #[test]
    fn state_hash_ignores_positions() {
        let nodes = sample();
        let before = state_hash(&nodes, &id("root"), Direction::LeftRight);
        let mut moved = nodes.clone();
        moved[2].position = crate::Point::new(99.0, 1.0);
        assert_eq!(before, state_hash(&moved, &id("root"), Direction::LeftRight));
        moved[2].label = "changed".into();
        assert_ne!(before, state_hash(&moved, &id("root"), Direction::LeftRight));
        assert_ne!(before, state_hash(&nodes, &id("root"), Direction::TopBottom));
    }
}
