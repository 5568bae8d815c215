#![forbid(unsafe_code)]

//! In-progress label edit.

use mindmap_core::NodeId;

/// `Idle -> Editing -> Idle`. The engine patches draft text straight into
/// the live state; `original` is what a cancel restores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LabelEdit {
    #[default]
    Idle,
    Editing {
        node_id: NodeId,
        original: String,
        draft: String,
    },
}

impl LabelEdit {
    #[must_use]
    pub fn begin(node_id: NodeId, original: String) -> Self {
        Self::Editing {
            node_id,
            draft: original.clone(),
            original,
        }
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    #[must_use]
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::Idle => None,
            Self::Editing { node_id, .. } => Some(node_id),
        }
    }

    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Editing { draft, .. } => Some(draft),
        }
    }

    /// Replace the draft; returns the edited node, or `None` when idle.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Option<&NodeId> {
        match self {
            Self::Idle => None,
            Self::Editing { node_id, draft, .. } => {
                *draft = text.into();
                Some(node_id)
            }
        }
    }

    /// End the edit, returning `(node, original, draft)`.
    pub fn finish(&mut self) -> Option<(NodeId, String, String)> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Editing {
                node_id,
                original,
                draft,
            } => Some((node_id, original, draft)),
        }
    }
}
