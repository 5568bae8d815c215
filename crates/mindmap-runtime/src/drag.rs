#![forbid(unsafe_code)]

//! Drag-and-drop reparenting.
//!
//! A press on a node arms the machine; once the pointer travels past the
//! activation threshold the drag starts and every (throttled) move
//! re-classifies the drop target. Release turns the last pointer position
//! into a [`DropIntent`] the engine applies as a regular move.
//!
//! ```text
//! Idle --down--> Armed --move >= threshold--> Dragging --up--> Idle
//!                  |                             |
//!                  +--up / cancel--> Idle        +--cancel--> Idle
//! ```
//!
//! Classification is relative to the target's cross axis (y for LR/RL,
//! x for TB/BT). Beyond the sibling zone the drop means "insert next to the
//! target"; inside it means "insert under the target". The root only ever
//! accepts children.

use mindmap_core::{GraphNode, MindMapError, NodeId, Point, node_index};
use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

use crate::config::DragConfig;
use crate::mutation::MindMapOperation;
use crate::state::MindMapState;

/// Where a pointer sits relative to a candidate target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPosition {
    Above,
    Below,
    Over,
}

/// Nearest node under the pointer and how the pointer relates to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub target: NodeId,
    pub position: DropPosition,
}

/// Which side of the anchor a sibling insertion lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiblingPlacement {
    Before,
    After,
}

/// Structural change requested by a completed drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum DropIntent {
    /// Make `node` a child of `new_parent`.
    Reparent { node: NodeId, new_parent: NodeId },
    /// Make `node` a sibling of `anchor`, immediately before or after it.
    InsertSibling {
        node: NodeId,
        parent: NodeId,
        anchor: NodeId,
        placement: SiblingPlacement,
    },
}

impl DropIntent {
    /// The dragged node.
    #[must_use]
    pub fn node(&self) -> &NodeId {
        match self {
            Self::Reparent { node, .. } | Self::InsertSibling { node, .. } => node,
        }
    }

    /// The parent the dragged node ends up under.
    #[must_use]
    pub fn new_parent(&self) -> &NodeId {
        match self {
            Self::Reparent { new_parent, .. } => new_parent,
            Self::InsertSibling { parent, .. } => parent,
        }
    }

    /// Translate into a move against `state`.
    ///
    /// Sibling insertions compute the sequence index next to the anchor
    /// after the dragged node has been taken out of the sequence.
    pub fn into_operation(self, state: &MindMapState) -> Result<MindMapOperation, MindMapError> {
        match self {
            Self::Reparent { node, new_parent } => Ok(MindMapOperation::MoveNode {
                node,
                new_parent,
                insert_index: None,
            }),
            Self::InsertSibling {
                node,
                parent,
                anchor,
                placement,
            } => {
                let node_at =
                    node_index(state.nodes(), &node).ok_or_else(|| MindMapError::not_found(&node))?;
                let anchor_at = node_index(state.nodes(), &anchor)
                    .ok_or_else(|| MindMapError::not_found(&anchor))?;
                let anchor_at = if node_at < anchor_at {
                    anchor_at - 1
                } else {
                    anchor_at
                };
                let insert_index = match placement {
                    SiblingPlacement::Before => anchor_at,
                    SiblingPlacement::After => anchor_at + 1,
                };
                Ok(MindMapOperation::MoveNode {
                    node,
                    new_parent: parent,
                    insert_index: Some(insert_index),
                })
            }
        }
    }
}

/// Euclidean-nearest visible node to `position`, skipping `exclude`.
///
/// Ties resolve to the earlier node in sequence order.
#[must_use]
pub fn find_nearest_node<'a>(
    state: &'a MindMapState,
    position: Point,
    exclude: &NodeId,
) -> Option<&'a GraphNode> {
    let mut best: Option<(&GraphNode, f64)> = None;
    for node in state.visible_nodes() {
        if &node.id == exclude {
            continue;
        }
        let distance = node.position.distance_squared(position);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((node, distance));
        }
    }
    best.map(|(node, _)| node)
}

/// Classify `position` against `target` along the layout's cross axis.
#[must_use]
pub fn classify_drop_position(
    state: &MindMapState,
    position: Point,
    target: &GraphNode,
    sibling_zone: f64,
) -> DropPosition {
    if target.is_root() {
        return DropPosition::Over;
    }
    let cross = state.direction().cross_axis();
    let offset = cross.component(position) - cross.component(target.position);
    if offset < -sibling_zone {
        DropPosition::Above
    } else if offset > sibling_zone {
        DropPosition::Below
    } else {
        DropPosition::Over
    }
}

/// Nearest target for `node` at `position`, with its classification.
#[must_use]
pub fn drop_target(
    state: &MindMapState,
    node: &NodeId,
    position: Point,
    sibling_zone: f64,
) -> Option<DropTarget> {
    let target = find_nearest_node(state, position, node)?;
    Some(DropTarget {
        target: target.id.clone(),
        position: classify_drop_position(state, position, target, sibling_zone),
    })
}

/// Turn a classified target into the structural change it implies.
#[must_use]
pub fn resolve_drop(state: &MindMapState, node: &NodeId, hover: &DropTarget) -> DropIntent {
    let parent = state
        .node(&hover.target)
        .and_then(|target| target.parent_id.clone());
    match (hover.position, parent) {
        (DropPosition::Above, Some(parent)) => DropIntent::InsertSibling {
            node: node.clone(),
            parent,
            anchor: hover.target.clone(),
            placement: SiblingPlacement::Before,
        },
        (DropPosition::Below, Some(parent)) => DropIntent::InsertSibling {
            node: node.clone(),
            parent,
            anchor: hover.target.clone(),
            placement: SiblingPlacement::After,
        },
        _ => DropIntent::Reparent {
            node: node.clone(),
            new_parent: hover.target.clone(),
        },
    }
}

/// Lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Armed {
        node: NodeId,
        origin: Point,
        current: Point,
    },
    Dragging {
        node: NodeId,
        origin: Point,
        current: Point,
        hover: Option<DropTarget>,
        last_classified: Instant,
    },
}

impl DragState {
    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        match self {
            Self::Idle => DragPhase::Idle,
            Self::Armed { .. } => DragPhase::Armed,
            Self::Dragging { .. } => DragPhase::Dragging,
        }
    }

    /// The node being pressed or dragged.
    #[must_use]
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Self::Idle => None,
            Self::Armed { node, .. } | Self::Dragging { node, .. } => Some(node),
        }
    }
}

/// Data-free mirror of [`DragState`] for transition records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
}

/// Pointer input fed to the machine. `at` is supplied by the caller so the
/// machine stays deterministic under test.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    PointerDown {
        node: NodeId,
        position: Point,
        at: Instant,
    },
    PointerMove {
        position: Point,
        at: Instant,
    },
    PointerUp {
        position: Point,
        at: Instant,
    },
    Cancel,
}

/// Reasons an event was safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    UnknownNode,
    RootNotDraggable,
    ThresholdNotReached,
    HoverUnchanged,
    ReleasedWithoutDrag,
}

/// Effect emitted by one transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Armed {
        node: NodeId,
        origin: Point,
    },
    DragStarted {
        node: NodeId,
        origin: Point,
        current: Point,
        hover: Option<DropTarget>,
    },
    HoverChanged {
        node: NodeId,
        hover: Option<DropTarget>,
    },
    /// Pointer tracked but classification skipped inside the throttle window.
    Throttled {
        node: NodeId,
    },
    Dropped {
        node: NodeId,
        intent: Option<DropIntent>,
    },
    Canceled {
        node: Option<NodeId>,
    },
    Noop {
        reason: DragNoopReason,
    },
}

/// One state-machine step.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragPhase,
    pub to: DragPhase,
    pub effect: DragEffect,
}

/// Pointer-gesture state machine for node drags.
#[derive(Debug, Clone)]
pub struct DragClassifier {
    state: DragState,
    config: DragConfig,
    transition_counter: u64,
}

impl Default for DragClassifier {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl DragClassifier {
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self {
            state: DragState::Idle,
            config,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Whether a press or drag is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Current hover classification while dragging.
    #[must_use]
    pub fn hover(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging { hover, .. } => hover.as_ref(),
            _ => None,
        }
    }

    /// Drop any gesture in progress.
    pub fn force_cancel(&mut self) -> Option<DragTransition> {
        let from = self.state.phase();
        let node = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => return None,
            DragState::Armed { node, .. } | DragState::Dragging { node, .. } => node,
        };
        self.transition_counter = self.transition_counter.saturating_add(1);
        tracing::debug!(target: "mindmap.drag", node_id = %node, "drag force-canceled");
        Some(DragTransition {
            transition_id: self.transition_counter,
            from,
            to: DragPhase::Idle,
            effect: DragEffect::Canceled { node: Some(node) },
        })
    }

    /// Feed one pointer event, classifying against `state`.
    pub fn apply_event(&mut self, state: &MindMapState, event: &DragEvent) -> DragTransition {
        let from = self.state.phase();
        let current = std::mem::replace(&mut self.state, DragState::Idle);
        let (next, effect) = self.step(state, current, event);
        self.state = next;
        self.transition_counter = self.transition_counter.saturating_add(1);

        let transition = DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state.phase(),
            effect,
        };
        if !matches!(
            transition.effect,
            DragEffect::Throttled { .. } | DragEffect::Noop { .. }
        ) {
            tracing::debug!(
                target: "mindmap.drag",
                transition_id = transition.transition_id,
                from = ?transition.from,
                to = ?transition.to,
                effect = ?transition.effect,
                "drag transition"
            );
        }
        transition
    }

    fn step(
        &self,
        view: &MindMapState,
        current: DragState,
        event: &DragEvent,
    ) -> (DragState, DragEffect) {
        match (current, event) {
            (DragState::Idle, DragEvent::PointerDown { node, position, .. }) => {
                match view.node(node) {
                    None => noop(DragState::Idle, DragNoopReason::UnknownNode),
                    Some(found) if found.is_root() => {
                        noop(DragState::Idle, DragNoopReason::RootNotDraggable)
                    }
                    Some(_) => (
                        DragState::Armed {
                            node: node.clone(),
                            origin: *position,
                            current: *position,
                        },
                        DragEffect::Armed {
                            node: node.clone(),
                            origin: *position,
                        },
                    ),
                }
            }
            (DragState::Idle, _) => noop(DragState::Idle, DragNoopReason::IdleWithoutActiveDrag),

            (active, DragEvent::Cancel) => {
                let node = active.node().cloned();
                (DragState::Idle, DragEffect::Canceled { node })
            }
            (active, DragEvent::PointerDown { .. }) => {
                noop(active, DragNoopReason::ActiveDragAlreadyInProgress)
            }

            (
                DragState::Armed { node, origin, .. },
                DragEvent::PointerMove { position, at },
            ) => {
                if origin.distance(*position) < self.config.activation_threshold {
                    return noop(
                        DragState::Armed {
                            node,
                            origin,
                            current: *position,
                        },
                        DragNoopReason::ThresholdNotReached,
                    );
                }
                let hover = drop_target(view, &node, *position, self.config.sibling_zone);
                (
                    DragState::Dragging {
                        node: node.clone(),
                        origin,
                        current: *position,
                        hover: hover.clone(),
                        last_classified: *at,
                    },
                    DragEffect::DragStarted {
                        node,
                        origin,
                        current: *position,
                        hover,
                    },
                )
            }
            (DragState::Armed { .. }, DragEvent::PointerUp { .. }) => {
                noop(DragState::Idle, DragNoopReason::ReleasedWithoutDrag)
            }

            (
                DragState::Dragging {
                    node,
                    origin,
                    hover,
                    last_classified,
                    ..
                },
                DragEvent::PointerMove { position, at },
            ) => {
                let throttle = Duration::from_millis(self.config.throttle_ms);
                if at.saturating_duration_since(last_classified) < throttle {
                    let effect = DragEffect::Throttled { node: node.clone() };
                    return (
                        DragState::Dragging {
                            node,
                            origin,
                            current: *position,
                            hover,
                            last_classified,
                        },
                        effect,
                    );
                }
                let next_hover = drop_target(view, &node, *position, self.config.sibling_zone);
                let effect = if next_hover == hover {
                    DragEffect::Noop {
                        reason: DragNoopReason::HoverUnchanged,
                    }
                } else {
                    DragEffect::HoverChanged {
                        node: node.clone(),
                        hover: next_hover.clone(),
                    }
                };
                (
                    DragState::Dragging {
                        node,
                        origin,
                        current: *position,
                        hover: next_hover,
                        last_classified: *at,
                    },
                    effect,
                )
            }
            (DragState::Dragging { node, .. }, DragEvent::PointerUp { position, .. }) => {
                let intent = drop_target(view, &node, *position, self.config.sibling_zone)
                    .map(|hover| resolve_drop(view, &node, &hover));
                (DragState::Idle, DragEffect::Dropped { node, intent })
            }
        }
    }
}

fn noop(state: DragState, reason: DragNoopReason) -> (DragState, DragEffect) {
    (state, DragEffect::Noop { reason })
}
