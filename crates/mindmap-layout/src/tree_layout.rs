//! Subtree-weighted, direction-aware tree layout.
//!
//! # Algorithm
//!
//! 1. Build child lists from visible edges only. An edge is hidden when its
//!    target sits behind a collapsed ancestor.
//! 2. Keep node-sequence order for siblings.
//! 3. Post-order: `size(n) = max(1, Σ size(children))`.
//! 4. Pre-order: each node owns a cross-axis band of `size(n) * unit`, is
//!    centered in it, and hands consecutive sub-bands to its children.
//! 5. Along-axis: `child = max(parent + extent + gap, parent + level_spacing)`,
//!    so a wide parent pushes its children further out than a fixed grid.
//! 6. Map (along, cross) to screen coordinates per [`Direction`].
//! 7. Center the cross axis on the root.
//!
//! Nodes behind a collapsed ancestor are not part of the result and keep
//! whatever position they had, so expanding later does not shuffle them.

use mindmap_core::{Direction, Edge, GraphNode, MindMapError, NodeId, Point, hidden_nodes};
use rustc_hash::FxHashMap;

use crate::config::LayoutConfig;

/// Solved positions for the visible part of a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub direction: Direction,
    positions: FxHashMap<NodeId, Point>,
    subtree_sizes: FxHashMap<NodeId, usize>,
    /// Total cross-axis extent of the laid-out tree.
    pub cross_extent: f64,
}

impl LayoutResult {
    /// Position of a visible node.
    #[must_use]
    pub fn position(&self, id: &NodeId) -> Option<Point> {
        self.positions.get(id).copied()
    }

    /// Leaf-slot weight of a visible node.
    #[must_use]
    pub fn subtree_size(&self, id: &NodeId) -> Option<usize> {
        self.subtree_sizes.get(id).copied()
    }

    /// Number of positioned nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether nothing was positioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate solved positions (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, Point)> + '_ {
        self.positions.iter().map(|(id, point)| (id, *point))
    }
}

/// Hierarchical layout solver.
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    config: LayoutConfig,
}

impl TreeLayout {
    /// Create a solver with explicit spacing.
    #[must_use]
    pub const fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Spacing in use.
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Solve positions for every visible node.
    pub fn compute(
        &self,
        nodes: &[GraphNode],
        edges: &[Edge],
        root_id: &NodeId,
        direction: Direction,
    ) -> Result<LayoutResult, MindMapError> {
        let index: FxHashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();
        let root = *index
            .get(root_id.as_str())
            .ok_or_else(|| MindMapError::not_found(root_id))?;

        let children = self.visible_children(nodes, edges, &index, root_id);
        let order = preorder(root, &children);
        let sizes = subtree_sizes(&order, &children, nodes.len());

        let unit = self.config.cross_unit(direction);
        let total = sizes[root] as f64 * unit;
        let mut positions = FxHashMap::default();
        positions.reserve(order.len());

        // (node, cross band start, along offset)
        let mut stack = vec![(root, 0.0_f64, 0.0_f64)];
        while let Some((current, band_start, along)) = stack.pop() {
            let cross = band_start + sizes[current] as f64 * unit / 2.0 - total / 2.0;
            let _ = positions.insert(nodes[current].id.clone(), direction.compose(along, cross));

            let extent = self.config.along_extent(direction, nodes[current].width);
            let child_along =
                (along + extent + self.config.level_gap).max(along + self.config.level_spacing);
            let mut running = band_start;
            let mut pending = Vec::with_capacity(children[current].len());
            for &child in &children[current] {
                pending.push((child, running, child_along));
                running += sizes[child] as f64 * unit;
            }
            stack.extend(pending.into_iter().rev());
        }

        let subtree_sizes = order
            .iter()
            .map(|&i| (nodes[i].id.clone(), sizes[i]))
            .collect();

        Ok(LayoutResult {
            direction,
            positions,
            subtree_sizes,
            cross_extent: total,
        })
    }

    /// Solve and write positions into a copy of `nodes`.
    ///
    /// Hidden nodes are copied through untouched.
    pub fn apply(
        &self,
        nodes: &[GraphNode],
        edges: &[Edge],
        root_id: &NodeId,
        direction: Direction,
    ) -> Result<Vec<GraphNode>, MindMapError> {
        let result = self.compute(nodes, edges, root_id, direction)?;
        Ok(nodes
            .iter()
            .map(|node| {
                let mut node = node.clone();
                if let Some(position) = result.position(&node.id) {
                    node.position = position;
                }
                node
            })
            .collect())
    }

    fn visible_children(
        &self,
        nodes: &[GraphNode],
        edges: &[Edge],
        index: &FxHashMap<&str, usize>,
        root_id: &NodeId,
    ) -> Vec<Vec<usize>> {
        let hidden = hidden_nodes(nodes, root_id);
        let mut parent_of: FxHashMap<&str, usize> = FxHashMap::default();
        for edge in edges {
            if hidden.contains(&edge.target) {
                continue;
            }
            if let (Some(&source), true) = (
                index.get(edge.source.as_str()),
                index.contains_key(edge.target.as_str()),
            ) {
                let _ = parent_of.insert(edge.target.as_str(), source);
            }
        }

        let mut children = vec![Vec::new(); nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            if let Some(&parent) = parent_of.get(node.id.as_str())
                && parent != i
            {
                children[parent].push(i);
            }
        }
        children
    }
}

fn preorder(root: usize, children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::new();
    let mut visited = vec![false; children.len()];
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        if std::mem::replace(&mut visited[current], true) {
            continue;
        }
        order.push(current);
        stack.extend(children[current].iter().rev().copied());
    }
    order
}

fn subtree_sizes(order: &[usize], children: &[Vec<usize>], len: usize) -> Vec<usize> {
    let mut sizes = vec![1usize; len];
    for &current in order.iter().rev() {
        let sum: usize = children[current].iter().map(|&child| sizes[child]).sum();
        sizes[current] = sum.max(1);
    }
    sizes
}
