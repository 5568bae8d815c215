#![forbid(unsafe_code)]

//! One editable mind-map document.
//!
//! [`MindMapEngine`] owns the committed state, its undo history, the id
//! allocator, the active label edit and drag gesture, the save sink, and
//! the event subscribers. Callers serialize access; nothing here locks.
//!
//! Every committed operation follows the same path:
//!
//! 1. settle any label edit in progress,
//! 2. apply the operation to a working copy ([`MutationEngine::apply`]),
//! 3. adopt the copy and push it onto the history,
//! 4. hand the re-nested document to the save sink,
//! 5. publish an [`EngineEvent`].
//!
//! A failure at step 2 leaves the engine exactly as it was.

use std::fmt;
use std::sync::{Arc, mpsc};

use mindmap_core::{
    CodecError, Direction, GraphNode, MindMapError, NodeId, NodeIdAllocator, PersistedDocument,
    PersistedTree, Point, decode, descendants_of,
};
use mindmap_layout::{GlyphWidthTable, LabelMeasure, TreeLayout};
use web_time::{Duration, Instant};

use crate::config::{EngineConfig, EngineConfigError};
use crate::drag::{DragClassifier, DragEffect, DragEvent, DragTransition};
use crate::edit::LabelEdit;
use crate::events::{EngineEvent, EventBus};
use crate::history::SnapshotHistory;
use crate::mutation::{MindMapOperation, MutationEngine, MutationKind, MutationOutcome};
use crate::save::{SaveDebouncer, SaveSink, save_or_log};
use crate::state::MindMapState;

/// Failures while constructing an engine.
#[derive(Debug)]
pub enum EngineError {
    Config(EngineConfigError),
    Codec(CodecError),
    Tree(MindMapError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid engine config: {e}"),
            Self::Codec(e) => write!(f, "unreadable document: {e}"),
            Self::Tree(e) => write!(f, "invalid document: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::Tree(e) => Some(e),
        }
    }
}

impl From<EngineConfigError> for EngineError {
    fn from(err: EngineConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<CodecError> for EngineError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl From<MindMapError> for EngineError {
    fn from(err: MindMapError) -> Self {
        Self::Tree(err)
    }
}

/// Result of releasing the pointer: the drag transition, plus the move it
/// triggered when the drop resolved to a valid target.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    pub transition: DragTransition,
    pub mutation: Option<MutationOutcome>,
}

/// Time source used to stamp debounced saves.
pub type Clock = Box<dyn Fn() -> Instant>;

/// Assembles a [`MindMapEngine`] from config and collaborators.
pub struct MindMapEngineBuilder {
    config: EngineConfig,
    measure: Box<dyn LabelMeasure>,
    sink: Option<Box<dyn SaveSink>>,
    clock: Clock,
}

impl Default for MindMapEngineBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            measure: Box::new(GlyphWidthTable::default()),
            sink: None,
            clock: Box::new(Instant::now),
        }
    }
}

impl fmt::Debug for MindMapEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindMapEngineBuilder")
            .field("config", &self.config)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl MindMapEngineBuilder {
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn measure(mut self, measure: impl LabelMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    #[must_use]
    pub fn save_sink(mut self, sink: impl SaveSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Clock for debounce deadlines. Pass the same time source to
    /// [`MindMapEngine::poll_save`].
    #[must_use]
    pub fn clock(mut self, clock: impl Fn() -> Instant + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Start a new map holding only a root.
    pub fn new_map(self, root_label: impl Into<String>) -> Result<MindMapEngine, EngineError> {
        let document = PersistedDocument::new(
            PersistedTree::leaf("root", root_label),
            Direction::default(),
        );
        self.open(&document)
    }

    /// Open a persisted document.
    pub fn open(self, document: &PersistedDocument) -> Result<MindMapEngine, EngineError> {
        let config = self.config.validated()?;
        let decoded = decode(document)?;
        let layout = TreeLayout::new(config.layout);
        let state = MutationEngine::new(&layout, &*self.measure).prepare(
            decoded.nodes,
            decoded.root_id,
            decoded.direction,
        )?;
        let ids = NodeIdAllocator::seeded(state.nodes().iter().map(|node| &node.id));
        let state = Arc::new(state);
        let mut history = SnapshotHistory::new(config.history.capacity);
        history.save(Arc::clone(&state));
        let debouncer = (config.save.debounce_ms > 0)
            .then(|| SaveDebouncer::new(Duration::from_millis(config.save.debounce_ms)));

        tracing::debug!(
            target: "mindmap.history",
            nodes = state.len(),
            root_id = %state.root_id(),
            direction = %state.direction(),
            "document opened"
        );

        Ok(MindMapEngine {
            drag: DragClassifier::new(config.drag),
            layout,
            measure: self.measure,
            sink: self.sink,
            clock: self.clock,
            debouncer,
            state,
            history,
            ids,
            edit: LabelEdit::Idle,
            events: EventBus::new(),
            operation_counter: 0,
            config,
        })
    }

    /// Open a document from its JSON text.
    pub fn open_json(self, json: &str) -> Result<MindMapEngine, EngineError> {
        let document = PersistedDocument::from_json_str(json)?;
        self.open(&document)
    }
}

/// Editing engine for one mind-map document.
pub struct MindMapEngine {
    config: EngineConfig,
    layout: TreeLayout,
    measure: Box<dyn LabelMeasure>,
    sink: Option<Box<dyn SaveSink>>,
    clock: Clock,
    debouncer: Option<SaveDebouncer>,
    state: Arc<MindMapState>,
    history: SnapshotHistory<MindMapState>,
    ids: NodeIdAllocator,
    edit: LabelEdit,
    drag: DragClassifier,
    events: EventBus,
    operation_counter: u64,
}

impl fmt::Debug for MindMapEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindMapEngine")
            .field("nodes", &self.state.len())
            .field("direction", &self.state.direction())
            .field("history", &self.history)
            .field("edit", &self.edit)
            .field("drag", &self.drag.state().phase())
            .finish_non_exhaustive()
    }
}

impl MindMapEngine {
    #[must_use]
    pub fn builder() -> MindMapEngineBuilder {
        MindMapEngineBuilder::default()
    }

    // ====================================================================
    // Views
    // ====================================================================

    /// The committed state (including any draft label).
    #[must_use]
    pub fn state(&self) -> &MindMapState {
        &self.state
    }

    /// Cheap shared handle to the current state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<MindMapState> {
        Arc::clone(&self.state)
    }

    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        self.state.nodes()
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.state.node(id)
    }

    #[must_use]
    pub fn root_id(&self) -> &NodeId {
        self.state.root_id()
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.state.direction()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&NodeId> {
        self.state.selection()
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Re-nest the current state into the persisted format.
    pub fn to_document(&self) -> Result<PersistedDocument, MindMapError> {
        self.state.to_document()
    }

    /// Receive every [`EngineEvent`] published from now on.
    pub fn subscribe(&mut self) -> mpsc::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    // ====================================================================
    // Selection
    // ====================================================================

    /// Select a node, or clear the selection with `None`.
    ///
    /// Selection travels with snapshots but does not create one.
    pub fn select(&mut self, node_id: Option<NodeId>) -> Result<(), MindMapError> {
        if let Some(id) = &node_id
            && !self.state.contains(id)
        {
            return Err(MindMapError::not_found(id));
        }
        if self.state.selection() == node_id.as_ref() {
            return Ok(());
        }
        Arc::make_mut(&mut self.state).set_selection(node_id.clone());
        self.events
            .publish(EngineEvent::SelectionChanged { selection: node_id });
        Ok(())
    }

    // ====================================================================
    // Structural operations
    // ====================================================================

    /// Append a child with the configured default label; returns its id.
    pub fn add_child(&mut self, parent_id: &NodeId) -> Result<NodeId, MindMapError> {
        let label = self.config.default_label.clone();
        self.add_child_with_label(parent_id, label)
    }

    /// Append a child with an explicit label; returns its id.
    pub fn add_child_with_label(
        &mut self,
        parent_id: &NodeId,
        label: impl Into<String>,
    ) -> Result<NodeId, MindMapError> {
        self.settle_edit()?;
        let (new_id, ids) = self.reserve_id();
        self.commit(MindMapOperation::AddChild {
            parent: parent_id.clone(),
            new_id: new_id.clone(),
            label: label.into(),
        })?;
        self.ids = ids;
        self.events.publish(EngineEvent::NodeAdded {
            node_id: new_id.clone(),
            parent_id: parent_id.clone(),
        });
        Ok(new_id)
    }

    /// Insert a node right after `sibling_id` under the same parent; returns
    /// its id.
    pub fn add_sibling(&mut self, sibling_id: &NodeId) -> Result<NodeId, MindMapError> {
        self.settle_edit()?;
        let (new_id, ids) = self.reserve_id();
        self.commit(MindMapOperation::AddSibling {
            sibling: sibling_id.clone(),
            new_id: new_id.clone(),
            label: self.config.default_label.clone(),
        })?;
        self.ids = ids;
        if let Some(parent_id) = self.state.node(&new_id).and_then(|n| n.parent_id.clone()) {
            self.events.publish(EngineEvent::NodeAdded {
                node_id: new_id.clone(),
                parent_id,
            });
        }
        Ok(new_id)
    }

    /// Remove a node and everything below it.
    pub fn delete_subtree(&mut self, node_id: &NodeId) -> Result<MutationOutcome, MindMapError> {
        self.settle_edit()?;
        let mut removed = vec![node_id.clone()];
        removed.extend(descendants_of(self.state.nodes(), node_id));
        let outcome = self.commit(MindMapOperation::DeleteSubtree {
            node: node_id.clone(),
        })?;
        self.events
            .publish(EngineEvent::NodesDeleted { node_ids: removed });
        Ok(outcome)
    }

    /// Reparent a node, optionally repositioning it in the node sequence.
    pub fn move_node(
        &mut self,
        node_id: &NodeId,
        new_parent_id: &NodeId,
        insert_index: Option<usize>,
    ) -> Result<MutationOutcome, MindMapError> {
        self.settle_edit()?;
        let outcome = self.commit(MindMapOperation::MoveNode {
            node: node_id.clone(),
            new_parent: new_parent_id.clone(),
            insert_index,
        })?;
        self.events.publish(EngineEvent::NodeMoved {
            node_id: node_id.clone(),
            new_parent: new_parent_id.clone(),
        });
        Ok(outcome)
    }

    pub fn toggle_collapse(&mut self, node_id: &NodeId) -> Result<MutationOutcome, MindMapError> {
        self.settle_edit()?;
        let outcome = self.commit(MindMapOperation::ToggleCollapse {
            node: node_id.clone(),
        })?;
        let collapsed = self.state.node(node_id).is_some_and(|n| n.collapsed);
        self.events.publish(EngineEvent::CollapseToggled {
            node_id: node_id.clone(),
            collapsed,
        });
        Ok(outcome)
    }

    pub fn change_layout_direction(
        &mut self,
        direction: Direction,
    ) -> Result<MutationOutcome, MindMapError> {
        self.settle_edit()?;
        let outcome = self.commit(MindMapOperation::ChangeDirection { direction })?;
        self.events
            .publish(EngineEvent::DirectionChanged { direction });
        Ok(outcome)
    }

    // ====================================================================
    // Content patches
    // ====================================================================

    /// Replace a label in one step (re-measured and re-laid out).
    pub fn update_label(
        &mut self,
        node_id: &NodeId,
        label: impl Into<String>,
    ) -> Result<MutationOutcome, MindMapError> {
        self.settle_edit()?;
        let label = label.into();
        let outcome = self.commit(MindMapOperation::UpdateLabel {
            node: node_id.clone(),
            label: label.clone(),
        })?;
        self.events.publish(EngineEvent::LabelCommitted {
            node_id: node_id.clone(),
            label,
        });
        Ok(outcome)
    }

    pub fn update_notes(
        &mut self,
        node_id: &NodeId,
        notes: Option<String>,
    ) -> Result<MutationOutcome, MindMapError> {
        self.settle_edit()?;
        let outcome = self.commit(MindMapOperation::UpdateNotes {
            node: node_id.clone(),
            notes,
        })?;
        self.events.publish(EngineEvent::NotesUpdated {
            node_id: node_id.clone(),
        });
        Ok(outcome)
    }

    pub fn update_sources(
        &mut self,
        node_id: &NodeId,
        sources: Option<Vec<serde_json::Value>>,
    ) -> Result<MutationOutcome, MindMapError> {
        self.patch_payload(MindMapOperation::UpdateSources {
            node: node_id.clone(),
            sources,
        })
    }

    pub fn update_custom_style(
        &mut self,
        node_id: &NodeId,
        custom_style: Option<String>,
    ) -> Result<MutationOutcome, MindMapError> {
        self.patch_payload(MindMapOperation::UpdateCustomStyle {
            node: node_id.clone(),
            custom_style,
        })
    }

    pub fn update_chat_id(
        &mut self,
        node_id: &NodeId,
        chat_id: Option<String>,
    ) -> Result<MutationOutcome, MindMapError> {
        self.patch_payload(MindMapOperation::UpdateChatId {
            node: node_id.clone(),
            chat_id,
        })
    }

    fn patch_payload(
        &mut self,
        operation: MindMapOperation,
    ) -> Result<MutationOutcome, MindMapError> {
        self.settle_edit()?;
        let outcome = self.commit(operation)?;
        if let Some(node_id) = outcome.touched_nodes.first() {
            self.events.publish(EngineEvent::PayloadUpdated {
                node_id: node_id.clone(),
                kind: outcome.kind,
            });
        }
        Ok(outcome)
    }

    // ====================================================================
    // Label editing
    // ====================================================================

    /// Start editing a label. An edit already in progress is committed first.
    pub fn begin_label_edit(&mut self, node_id: &NodeId) -> Result<(), MindMapError> {
        if self.edit.node_id() == Some(node_id) {
            return Ok(());
        }
        let original = self
            .state
            .node(node_id)
            .map(|node| node.label.clone())
            .ok_or_else(|| MindMapError::not_found(node_id))?;
        self.settle_edit()?;
        self.edit = LabelEdit::begin(node_id.clone(), original);
        Ok(())
    }

    /// Patch the draft label into the live state without layout, history,
    /// or saving. Returns `false` when no edit is active.
    pub fn update_label_draft(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        let Some(node_id) = self.edit.set_draft(text.clone()).cloned() else {
            return false;
        };
        self.write_label(&node_id, text);
        true
    }

    /// The node whose label is being edited.
    #[must_use]
    pub fn editing(&self) -> Option<&NodeId> {
        self.edit.node_id()
    }

    /// Finish the edit: re-measure, lay out, snapshot, save.
    ///
    /// Returns `None` when no edit was active or the text is unchanged.
    pub fn commit_label_edit(&mut self) -> Result<Option<MutationOutcome>, MindMapError> {
        let Some((node_id, original, draft)) = self.edit.finish() else {
            return Ok(None);
        };
        if draft == original {
            return Ok(None);
        }
        // Rebase on the pre-edit label so the outcome hashes span the edit.
        self.write_label(&node_id, original);
        let outcome = self.commit(MindMapOperation::UpdateLabel {
            node: node_id.clone(),
            label: draft.clone(),
        })?;
        self.events.publish(EngineEvent::LabelCommitted {
            node_id,
            label: draft,
        });
        Ok(Some(outcome))
    }

    /// Abandon the edit and restore the original label. No layout runs.
    pub fn cancel_label_edit(&mut self) -> bool {
        let Some((node_id, original, _)) = self.edit.finish() else {
            return false;
        };
        self.write_label(&node_id, original);
        true
    }

    fn settle_edit(&mut self) -> Result<(), MindMapError> {
        if self.edit.is_editing() {
            let _ = self.commit_label_edit()?;
        }
        Ok(())
    }

    fn write_label(&mut self, node_id: &NodeId, label: String) {
        let state = Arc::make_mut(&mut self.state);
        if let Some(node) = state.nodes_mut().iter_mut().find(|n| &n.id == node_id) {
            node.label = label;
        }
    }

    // ====================================================================
    // History
    // ====================================================================

    /// Restore the previous snapshot. Returns `false` at the oldest entry.
    pub fn undo(&mut self) -> bool {
        self.restore(true)
    }

    /// Re-apply the next snapshot. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.restore(false)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Retained snapshots, including the current one.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn restore(&mut self, undo: bool) -> bool {
        let _ = self.cancel_label_edit();
        let _ = self.drag.force_cancel();
        let restored = if undo {
            self.history.undo()
        } else {
            self.history.redo()
        };
        let Some(snapshot) = restored else {
            return false;
        };
        self.state = snapshot;
        let state_hash = self.state.state_hash();
        tracing::debug!(
            target: "mindmap.history",
            undo,
            cursor = self.history.cursor(),
            retained = self.history.len(),
            state_hash,
            "snapshot restored"
        );
        self.persist();
        self.events
            .publish(EngineEvent::HistoryRestored { undo, state_hash });
        true
    }

    // ====================================================================
    // Drag and drop
    // ====================================================================

    /// Press on a node.
    pub fn pointer_down(
        &mut self,
        node_id: &NodeId,
        position: Point,
        at: Instant,
    ) -> DragTransition {
        self.drag.apply_event(
            &self.state,
            &DragEvent::PointerDown {
                node: node_id.clone(),
                position,
                at,
            },
        )
    }

    /// Track the pointer; classification is throttled.
    pub fn pointer_move(&mut self, position: Point, at: Instant) -> DragTransition {
        self.drag
            .apply_event(&self.state, &DragEvent::PointerMove { position, at })
    }

    /// Release the pointer and apply the resulting move, if any.
    ///
    /// A rejected move (for example a drop onto the dragged node's own
    /// subtree) is returned as an error; the gesture has ended either way.
    /// A drop that leaves the node where it already is commits nothing.
    pub fn pointer_up(
        &mut self,
        position: Point,
        at: Instant,
    ) -> Result<DropOutcome, MindMapError> {
        let transition = self
            .drag
            .apply_event(&self.state, &DragEvent::PointerUp { position, at });
        let intent = match &transition.effect {
            DragEffect::Dropped {
                intent: Some(intent),
                ..
            } => intent.clone(),
            _ => {
                return Ok(DropOutcome {
                    transition,
                    mutation: None,
                });
            }
        };
        self.settle_edit()?;
        let node_id = intent.node().clone();
        let new_parent = intent.new_parent().clone();
        let operation = intent.into_operation(&self.state)?;
        if operation.is_noop_move(&self.state) {
            tracing::debug!(
                target: "mindmap.drag",
                node_id = %node_id,
                "drop leaves node in place; nothing to commit"
            );
            return Ok(DropOutcome {
                transition,
                mutation: None,
            });
        }
        let outcome = self.commit(operation)?;
        self.events.publish(EngineEvent::NodeMoved {
            node_id,
            new_parent,
        });
        Ok(DropOutcome {
            transition,
            mutation: Some(outcome),
        })
    }

    /// Abandon the gesture without touching the tree.
    pub fn cancel_drag(&mut self) -> Option<DragTransition> {
        self.drag.force_cancel()
    }

    #[must_use]
    pub fn drag(&self) -> &DragClassifier {
        &self.drag
    }

    // ====================================================================
    // Persistence
    // ====================================================================

    /// Release a debounced save whose quiet period has elapsed.
    ///
    /// `now` must come from the clock given to the builder
    /// ([`Instant::now`] unless overridden).
    pub fn poll_save(&mut self, now: Instant) -> bool {
        let Some(document) = self.debouncer.as_mut().and_then(|d| d.poll(now)) else {
            return false;
        };
        self.write_document(&document)
    }

    /// Release any debounced save immediately.
    pub fn flush_save(&mut self) -> bool {
        let Some(document) = self.debouncer.as_mut().and_then(SaveDebouncer::flush) else {
            return false;
        };
        self.write_document(&document)
    }

    /// Whether a debounced save is waiting.
    #[must_use]
    pub fn save_pending(&self) -> bool {
        self.debouncer.as_ref().is_some_and(SaveDebouncer::is_pending)
    }

    /// Replace the whole document, discarding history.
    pub fn load_document(&mut self, document: &PersistedDocument) -> Result<(), MindMapError> {
        let decoded = decode(document)?;
        let state = MutationEngine::new(&self.layout, &*self.measure).prepare(
            decoded.nodes,
            decoded.root_id,
            decoded.direction,
        )?;
        let _ = self.edit.finish();
        let _ = self.drag.force_cancel();
        self.ids = NodeIdAllocator::seeded(state.nodes().iter().map(|node| &node.id));
        self.state = Arc::new(state);
        self.history.reset(Arc::clone(&self.state));
        tracing::debug!(
            target: "mindmap.history",
            nodes = self.state.len(),
            "document replaced; history reset"
        );
        Ok(())
    }

    fn persist(&mut self) {
        if self.sink.is_none() {
            return;
        }
        let document = match self.state.to_document() {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(
                    target: "mindmap.save",
                    error = %err,
                    "could not encode state for saving"
                );
                return;
            }
        };
        match self.debouncer.as_mut() {
            Some(debouncer) => debouncer.schedule(document, (self.clock)()),
            None => {
                let _ = self.write_document(&document);
            }
        }
    }

    fn write_document(&mut self, document: &PersistedDocument) -> bool {
        match self.sink.as_mut() {
            Some(sink) => save_or_log(sink.as_mut(), document),
            None => false,
        }
    }

    // ====================================================================
    // Commit path
    // ====================================================================

    /// Next free id and the allocator state to adopt once it is used.
    fn reserve_id(&self) -> (NodeId, NodeIdAllocator) {
        let mut ids = self.ids.clone();
        let mut candidate = ids.allocate();
        while self.state.contains(&candidate) {
            candidate = ids.allocate();
        }
        (candidate, ids)
    }

    fn commit(&mut self, operation: MindMapOperation) -> Result<MutationOutcome, MindMapError> {
        self.operation_counter = self.operation_counter.saturating_add(1);
        let kind: MutationKind = operation.kind();
        let applied = MutationEngine::new(&self.layout, &*self.measure).apply(
            self.operation_counter,
            &self.state,
            operation,
        );
        let applied = match applied {
            Ok(applied) => applied,
            Err(err) => {
                tracing::warn!(
                    target: "mindmap.mutation",
                    operation_id = self.operation_counter,
                    kind = kind.as_str(),
                    error = %err,
                    "operation rejected; state unchanged"
                );
                return Err(err);
            }
        };
        let state = Arc::new(applied.state);
        self.history.save(Arc::clone(&state));
        self.state = state;
        tracing::debug!(
            target: "mindmap.history",
            cursor = self.history.cursor(),
            retained = self.history.len(),
            "snapshot saved"
        );
        self.persist();
        Ok(applied.outcome)
    }
}

impl Drop for MindMapEngine {
    fn drop(&mut self) {
        if self.flush_save() {
            tracing::debug!(target: "mindmap.save", "pending save flushed on drop");
        }
    }
}
