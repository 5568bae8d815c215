#![forbid(unsafe_code)]

//! Core: the mind-map tree model, persisted-tree codec, and invariants.
//!
//! # Role in the workspace
//! `mindmap-core` owns the data model shared by every other crate: node and
//! edge types, the layout [`Direction`], the persisted nested-tree format,
//! and the structural queries used to keep the tree valid.
//!
//! # Invariants
//! A committed node sequence always satisfies:
//! 1. exactly one node has no parent (the root),
//! 2. the parent relation is acyclic,
//! 3. every parent reference resolves,
//! 4. ids are unique,
//! 5. `depth == parent.depth + 1`, with the root at depth 0.
//!
//! [`validate_tree`] checks all five; [`refresh_derived`] recomputes the
//! derived fields after a topology change.

pub mod codec;
pub mod error;
pub mod geometry;
pub mod id;
pub mod node;
pub mod tree;

pub use codec::{
    CodecError, DecodedTree, PersistedDocument, PersistedTree, decode, encode, generate_edges,
};
pub use error::{MindMapError, RootOperation, TreeModelError};
pub use geometry::Point;
pub use id::{NodeId, NodeIdAllocator};
pub use node::{Axis, Direction, Edge, GraphNode, Handle, NodePayload, UnknownDirection};
pub use tree::{
    ChildIndex, ancestors_of, children_of, descendants_of, find_node, hidden_nodes,
    is_descendant, node_index, refresh_derived, state_hash, validate_tree,
};
