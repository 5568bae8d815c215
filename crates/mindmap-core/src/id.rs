//! Node identifiers and deterministic id allocation.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix used by [`NodeIdAllocator`] for generated ids.
pub const GENERATED_ID_PREFIX: &str = "node-";

/// Stable identifier for mind-map nodes.
///
/// Ids are opaque strings: documents loaded from storage may carry any
/// non-empty value, while ids minted by the engine follow `node-{n}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap a raw id.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix if this id has the generated `node-{n}` shape.
    #[must_use]
    pub fn generated_index(&self) -> Option<u64> {
        self.0
            .strip_prefix(GENERATED_ID_PREFIX)
            .and_then(|suffix| suffix.parse().ok())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NodeId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Deterministic allocator for node ids.
///
/// Seeded past the highest generated suffix already present so freshly
/// minted ids never collide with a loaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdAllocator {
    next: u64,
}

impl Default for NodeIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl NodeIdAllocator {
    /// Start allocating from a known counter value.
    #[must_use]
    pub const fn with_next(next: u64) -> Self {
        Self { next }
    }

    /// Seed an allocator from existing ids.
    #[must_use]
    pub fn seeded<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> Self {
        let next = ids
            .into_iter()
            .filter_map(NodeId::generated_index)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        Self { next }
    }

    /// Peek the next counter value.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.next
    }

    /// Mint a fresh id.
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(format!("{GENERATED_ID_PREFIX}{}", self.next));
        self.next = self.next.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_mints_sequential_ids() {
        let mut alloc = NodeIdAllocator::default();
        assert_eq!(alloc.allocate().as_str(), "node-1");
        assert_eq!(alloc.allocate().as_str(), "node-2");
        assert_eq!(alloc.peek(), 3);
    }

    #[test]
    fn seeded_allocator_skips_existing_suffixes() {
        let ids = [
            NodeId::new("root"),
            NodeId::new("node-7"),
            NodeId::new("node-3"),
            NodeId::new("node-x"),
        ];
        let mut alloc = NodeIdAllocator::seeded(ids.iter());
        assert_eq!(alloc.allocate().as_str(), "node-8");
    }

    #[test]
    fn seeded_without_generated_ids_starts_at_one() {
        let ids = [NodeId::new("a"), NodeId::new("b")];
        let alloc = NodeIdAllocator::seeded(ids.iter());
        assert_eq!(alloc.peek(), 1);
    }

    #[test]
    fn generated_index_parses_suffix() {
        assert_eq!(NodeId::new("node-42").generated_index(), Some(42));
        assert_eq!(NodeId::new("node-").generated_index(), None);
        assert_eq!(NodeId::new("other-42").generated_index(), None);
    }
}
