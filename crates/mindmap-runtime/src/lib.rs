#![forbid(unsafe_code)]

//! Mind-map Runtime
//!
//! The editing engine that ties the tree model (`mindmap-core`) and the
//! layout solver (`mindmap-layout`) into an interactive document.
//!
//! # Key Components
//!
//! - [`MindMapEngine`] - one document: state, history, edits, drags, saving
//! - [`MutationEngine`] - transactional, copy-on-write tree operations
//! - [`SnapshotHistory`] - bounded undo/redo over shared snapshots
//! - [`DragClassifier`] - pointer gesture machine for drag-to-reparent
//! - [`SaveSink`] / [`SaveDebouncer`] - fire-and-forget persistence
//! - [`EventBus`] - typed change notifications over `std::sync::mpsc`
//! - [`EngineConfig`] - every tunable, loadable from JSON or TOML
//!
//! # Logging
//! Operations emit `tracing` events under the `mindmap.mutation`,
//! `mindmap.history`, `mindmap.drag`, and `mindmap.save` targets. The crate
//! never installs a subscriber.

pub mod config;
pub mod drag;
pub mod edit;
pub mod engine;
pub mod events;
pub mod history;
pub mod mutation;
pub mod save;
pub mod state;

pub use config::{DragConfig, EngineConfig, EngineConfigError, HistoryConfig, SaveConfig};
pub use drag::{
    DragClassifier, DragEffect, DragEvent, DragNoopReason, DragPhase, DragState, DragTransition,
    DropIntent, DropPosition, DropTarget, SiblingPlacement, classify_drop_position, drop_target,
    find_nearest_node, resolve_drop,
};
pub use edit::LabelEdit;
pub use engine::{Clock, DropOutcome, EngineError, MindMapEngine, MindMapEngineBuilder};
pub use events::{EngineEvent, EventBus};
pub use history::SnapshotHistory;
pub use mutation::{Applied, MindMapOperation, MutationEngine, MutationKind, MutationOutcome};
pub use save::{JsonFileSink, SaveDebouncer, SaveError, SaveSink, save_or_log};
pub use state::MindMapState;
