#![forbid(unsafe_code)]

//! Typed change notifications.
//!
//! Each engine owns its own [`EventBus`]; there is no process-wide channel.
//! Subscribers receive every event published after they subscribed and
//! are dropped from the bus once their receiver hangs up.

use std::sync::mpsc;

use mindmap_core::{Direction, NodeId};

use crate::mutation::MutationKind;

/// What changed in a committed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    NodeAdded {
        node_id: NodeId,
        parent_id: NodeId,
    },
    /// The deleted node first, then its descendants in pre-order.
    NodesDeleted {
        node_ids: Vec<NodeId>,
    },
    NodeMoved {
        node_id: NodeId,
        new_parent: NodeId,
    },
    LabelCommitted {
        node_id: NodeId,
        label: String,
    },
    NotesUpdated {
        node_id: NodeId,
    },
    /// Sources, custom style, or chat link changed.
    PayloadUpdated {
        node_id: NodeId,
        kind: MutationKind,
    },
    CollapseToggled {
        node_id: NodeId,
        collapsed: bool,
    },
    DirectionChanged {
        direction: Direction,
    },
    SelectionChanged {
        selection: Option<NodeId>,
    },
    /// Undo or redo restored a snapshot.
    HistoryRestored {
        undo: bool,
        state_hash: u64,
    },
}

/// Fan-out of [`EngineEvent`]s to any number of receivers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::Sender<EngineEvent>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new receiver.
    pub fn subscribe(&mut self) -> mpsc::Receiver<EngineEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Deliver `event` to every live subscriber.
    pub fn publish(&mut self, event: EngineEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        let before = self.subscribers.len();
        self.subscribers
            .retain(|sender| sender.send(event.clone()).is_ok());
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            tracing::trace!(target: "mindmap.events", pruned, "dropped disconnected subscribers");
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
