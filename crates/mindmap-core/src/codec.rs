//! Persisted nested-tree format and its translation to the working
//! node/edge set.
//!
//! The persisted form is the only durable representation of a map:
//!
//! ```json
//! {
//!   "layoutDirection": "LR",
//!   "root": {
//!     "id": "root",
//!     "text": "Trip",
//!     "children": [{ "id": "node-1", "text": "Flights", "collapsed": true }]
//!   }
//! }
//! ```
//!
//! Declaration order of `children` becomes node-sequence order on decode and
//! is reproduced verbatim on encode.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MindMapError, TreeModelError};
use crate::id::NodeId;
use crate::node::{Direction, Edge, GraphNode, NodePayload};
use crate::tree::{ChildIndex, hidden_nodes, node_index};

/// Free stack that must remain before descending one more tree level.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each stack segment allocated once the red zone is reached.
const STACK_SEGMENT: usize = 1024 * 1024;

fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, f)
}

/// One node of the persisted nested tree.
///
/// Trees can be arbitrarily deep. Dropping is iterative, and the recursive
/// trait impls (`Clone`, `PartialEq`, `Serialize`) grow the stack on demand
/// instead of overflowing it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTree {
    pub id: NodeId,
    pub text: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub custom_style: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub children: Vec<PersistedTree>,
}

/// Borrowed wire shape of one [`PersistedTree`] level.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedTreeRef<'a> {
    id: &'a NodeId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources: Option<&'a Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "is_false")]
    collapsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_style: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_id: Option<&'a String>,
    #[serde(skip_serializing_if = "no_children")]
    children: &'a [PersistedTree],
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn no_children(children: &&[PersistedTree]) -> bool {
    children.is_empty()
}

impl Serialize for PersistedTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        with_stack(|| {
            PersistedTreeRef {
                id: &self.id,
                text: &self.text,
                notes: self.notes.as_ref(),
                sources: self.sources.as_ref(),
                collapsed: self.collapsed,
                custom_style: self.custom_style.as_ref(),
                chat_id: self.chat_id.as_ref(),
                children: &self.children,
            }
            .serialize(serializer)
        })
    }
}

impl Clone for PersistedTree {
    fn clone(&self) -> Self {
        with_stack(|| Self {
            id: self.id.clone(),
            text: self.text.clone(),
            notes: self.notes.clone(),
            sources: self.sources.clone(),
            collapsed: self.collapsed,
            custom_style: self.custom_style.clone(),
            chat_id: self.chat_id.clone(),
            children: self.children.clone(),
        })
    }
}

impl PartialEq for PersistedTree {
    fn eq(&self, other: &Self) -> bool {
        with_stack(|| {
            self.id == other.id
                && self.text == other.text
                && self.notes == other.notes
                && self.sources == other.sources
                && self.collapsed == other.collapsed
                && self.custom_style == other.custom_style
                && self.chat_id == other.chat_id
                && self.children == other.children
        })
    }
}

impl Drop for PersistedTree {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut tree) = pending.pop() {
            pending.append(&mut tree.children);
        }
    }
}

impl PersistedTree {
    /// A bare node with no payload and no children.
    #[must_use]
    pub fn leaf(id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            notes: None,
            sources: None,
            collapsed: false,
            custom_style: None,
            chat_id: None,
            children: Vec::new(),
        }
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: PersistedTree) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of nodes in this subtree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            count += 1;
            stack.extend(&tree.children);
        }
        count
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((tree, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(tree.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }
}

/// Persisted tree plus the map-level layout direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    #[serde(default, alias = "direction")]
    pub layout_direction: Direction,
    pub root: PersistedTree,
}

impl PersistedDocument {
    /// Wrap a tree with a direction.
    #[must_use]
    pub fn new(root: PersistedTree, layout_direction: Direction) -> Self {
        Self {
            layout_direction,
            root,
        }
    }

    /// Parse from a JSON string.
    ///
    /// Nesting depth is unbounded: every tree level costs two JSON levels,
    /// so the parser's default recursion limit would reject maps the engine
    /// itself wrote. The stack grows on demand instead.
    pub fn from_json_str(s: &str) -> Result<Self, CodecError> {
        let mut json = serde_json::Deserializer::from_str(s);
        json.disable_recursion_limit();
        let document = Self::deserialize(serde_stacker::Deserializer::new(&mut json))
            .map_err(CodecError::Json)?;
        json.end().map_err(CodecError::Json)?;
        Ok(document)
    }

    /// Compact JSON encoding.
    pub fn to_json_string(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Json)
    }

    /// Pretty-printed JSON encoding.
    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        serde_json::to_string_pretty(self).map_err(CodecError::Json)
    }
}

/// Result of decoding a persisted document.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTree {
    pub nodes: Vec<GraphNode>,
    pub root_id: NodeId,
    pub direction: Direction,
}

/// Failures while moving between JSON text and the working representation.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    Tree(MindMapError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "JSON error: {err}"),
            Self::Tree(err) => write!(f, "tree error: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Tree(err) => Some(err),
        }
    }
}

impl From<MindMapError> for CodecError {
    fn from(err: MindMapError) -> Self {
        Self::Tree(err)
    }
}

/// Flatten a persisted document into a node sequence (pre-order).
pub fn decode(document: &PersistedDocument) -> Result<DecodedTree, MindMapError> {
    let mut nodes = Vec::with_capacity(document.root.node_count());
    let mut seen = HashSet::new();
    // (tree node, parent id, depth)
    let mut stack: Vec<(&PersistedTree, Option<&NodeId>, u32)> = vec![(&document.root, None, 0)];

    while let Some((tree, parent, depth)) = stack.pop() {
        if !seen.insert(&tree.id) {
            return Err(TreeModelError::DuplicateNodeId {
                node_id: tree.id.clone(),
            }
            .into());
        }
        nodes.push(GraphNode {
            id: tree.id.clone(),
            label: tree.text.clone(),
            parent_id: parent.cloned(),
            depth,
            collapsed: tree.collapsed,
            has_children: !tree.children.is_empty(),
            custom_style: tree.custom_style.clone(),
            position: crate::Point::ZERO,
            width: None,
            payload: NodePayload {
                chat_id: tree.chat_id.clone(),
                notes: tree.notes.clone(),
                sources: tree.sources.clone(),
            },
        });
        for child in tree.children.iter().rev() {
            stack.push((child, Some(&tree.id), depth + 1));
        }
    }

    Ok(DecodedTree {
        nodes,
        root_id: document.root.id.clone(),
        direction: document.layout_direction,
    })
}

/// Rebuild the nested persisted form from a node sequence.
///
/// Built bottom-up from an explicit pre-order walk, so depth is bounded by
/// memory rather than by the call stack.
pub fn encode(
    nodes: &[GraphNode],
    root_id: &NodeId,
    direction: Direction,
) -> Result<PersistedDocument, MindMapError> {
    let root = node_index(nodes, root_id).ok_or_else(|| MindMapError::not_found(root_id))?;
    let index = ChildIndex::build(nodes);

    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack = vec![root];
    while let Some(at) = stack.pop() {
        let node = &nodes[at];
        if !seen.insert(node.id.as_str()) {
            return Err(TreeModelError::CycleDetected {
                node_id: node.id.clone(),
            }
            .into());
        }
        order.push(at);
        stack.extend(index.children(node.id.as_str()).iter().rev().copied());
    }

    // Reverse pre-order finishes every child before its parent.
    let mut built: Vec<Option<PersistedTree>> = (0..nodes.len()).map(|_| None).collect();
    for &at in order.iter().rev() {
        let node = &nodes[at];
        let children: Vec<PersistedTree> = index
            .children(node.id.as_str())
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[at] = Some(PersistedTree {
            id: node.id.clone(),
            text: node.label.clone(),
            notes: node.payload.notes.clone(),
            sources: node.payload.sources.clone(),
            collapsed: node.collapsed,
            custom_style: node.custom_style.clone(),
            chat_id: node.payload.chat_id.clone(),
            children,
        });
    }
    let root = built[root]
        .take()
        .ok_or_else(|| MindMapError::not_found(root_id))?;
    Ok(PersistedDocument::new(root, direction))
}

/// Derive one edge per parented node with direction-specific handles.
///
/// Edges follow node-sequence order of their targets.
#[must_use]
pub fn generate_edges(nodes: &[GraphNode], direction: Direction) -> Vec<Edge> {
    let (source_handle, target_handle) = direction.handles();
    let hidden = nodes
        .iter()
        .find(|node| node.is_root())
        .map(|root| hidden_nodes(nodes, &root.id))
        .unwrap_or_default();
    nodes
        .iter()
        .filter_map(|node| {
            let parent = node.parent_id.as_ref()?;
            Some(Edge {
                id: Edge::id_for(parent, &node.id),
                source: parent.clone(),
                target: node.id.clone(),
                source_handle,
                target_handle,
                hidden: hidden.contains(&node.id),
            })
        })
        .collect()
}
