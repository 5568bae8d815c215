#![forbid(unsafe_code)]

//! Mind-map public facade crate.
//!
//! Re-exports the types most callers need from the internal crates and
//! offers a prelude for day-to-day use:
//!
//! ```no_run
//! use mindmap::prelude::*;
//!
//! let mut engine = MindMapEngine::builder().new_map("Plan").unwrap();
//! let root = engine.root_id().clone();
//! let child = engine.add_child(&root).unwrap();
//! engine.update_label(&child, "First step").unwrap();
//! assert!(engine.undo());
//! ```

// --- Model re-exports ------------------------------------------------------

pub use mindmap_core::{
    CodecError, Direction, Edge, GraphNode, MindMapError, NodeId, NodePayload, PersistedDocument,
    PersistedTree, Point, RootOperation, TreeModelError, decode, encode,
};

// --- Layout re-exports -----------------------------------------------------

pub use mindmap_layout::{GlyphWidthTable, LabelMeasure, LayoutConfig, TreeLayout, Unmeasured};

// --- Runtime re-exports ----------------------------------------------------

pub use mindmap_runtime::{
    DragEffect, DragEvent, DragTransition, DropIntent, DropOutcome, EngineConfig, EngineError,
    EngineEvent, JsonFileSink, MindMapEngine, MindMapEngineBuilder, MindMapOperation,
    MindMapState, MutationOutcome, SaveError, SaveSink,
};

/// Standard result type for engine-level APIs.
pub type Result<T> = std::result::Result<T, EngineError>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Direction, EngineConfig, EngineEvent, GraphNode, MindMapEngine, MindMapError, NodeId,
        PersistedDocument, PersistedTree, Point, Result,
    };

    pub use crate::{core, layout, runtime};
}

pub use mindmap_core as core;
pub use mindmap_layout as layout;
pub use mindmap_runtime as runtime;
