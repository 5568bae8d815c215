#![forbid(unsafe_code)]

//! Layout: positions for the visible part of a mind-map tree.
//!
//! The solver is deterministic: the same nodes, edges, direction, and
//! measured widths always produce the same positions.

pub mod config;
pub mod measure;
pub mod tree_layout;

pub use config::LayoutConfig;
pub use measure::{FixedWidth, GlyphWidthTable, LabelMeasure, Unmeasured, measure_or_none};
pub use tree_layout::{LayoutResult, TreeLayout};
