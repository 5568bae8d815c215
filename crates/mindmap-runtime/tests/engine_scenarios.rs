//! End-to-end editing scenarios against the public engine API.

use mindmap_core::{Direction, NodeId, PersistedDocument, PersistedTree, children_of};
use mindmap_runtime::{
    DragEffect, DropIntent, EngineConfig, EngineEvent, MindMapEngine, SiblingPlacement,
};
use mindmap_layout::Unmeasured;
use web_time::{Duration, Instant};

fn id(raw: &str) -> NodeId {
    NodeId::new(raw)
}

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.save.debounce_ms = 0;
    config
}

fn open(root: PersistedTree, direction: Direction) -> MindMapEngine {
    MindMapEngine::builder()
        .config(config())
        .measure(Unmeasured)
        .open(&PersistedDocument::new(root, direction))
        .expect("fixture document is valid")
}

fn child_ids(engine: &MindMapEngine, parent: &str) -> Vec<String> {
    children_of(engine.nodes(), &id(parent))
        .into_iter()
        .map(|node| node.id.to_string())
        .collect()
}

#[test]
fn add_sibling_lands_between_neighbours() {
    let mut engine = open(
        PersistedTree::leaf("root", "Root")
            .with_child(PersistedTree::leaf("a", "A"))
            .with_child(PersistedTree::leaf("b", "B")),
        Direction::LeftRight,
    );
    let n = engine.add_sibling(&id("a")).unwrap();

    assert_eq!(child_ids(&engine, "root"), vec!["a", n.as_str(), "b"]);
    let y = |raw: &str| engine.node(&id(raw)).unwrap().position.y;
    assert!(y("a") < y(n.as_str()));
    assert!(y(n.as_str()) < y("b"));
    assert_eq!(engine.selection(), Some(&n));
}

#[test]
fn direction_change_keeps_relationships() {
    let mut engine = open(
        PersistedTree::leaf("root", "Root")
            .with_child(PersistedTree::leaf("a", "A").with_child(PersistedTree::leaf("a1", "A1")))
            .with_child(PersistedTree::leaf("b", "B")),
        Direction::LeftRight,
    );
    let before: Vec<_> = engine
        .nodes()
        .iter()
        .map(|n| (n.id.clone(), n.parent_id.clone(), n.depth))
        .collect();

    engine.change_layout_direction(Direction::TopBottom).unwrap();

    let after: Vec<_> = engine
        .nodes()
        .iter()
        .map(|n| (n.id.clone(), n.parent_id.clone(), n.depth))
        .collect();
    assert_eq!(before, after);

    let pos = |raw: &str| engine.node(&id(raw)).unwrap().position;
    assert!(pos("a").y > pos("root").y);
    assert!(pos("a1").y > pos("a").y);
    assert_eq!(pos("a").y, pos("b").y);
    assert!(pos("a").x < pos("b").x);
    let document = engine.to_document().unwrap();
    assert_eq!(document.layout_direction, Direction::TopBottom);
}

#[test]
fn dropping_above_a_node_inserts_before_it() {
    let mut engine = open(
        PersistedTree::leaf("root", "Root")
            .with_child(PersistedTree::leaf("p", "P").with_child(PersistedTree::leaf("x", "X")))
            .with_child(PersistedTree::leaf("y", "Y"))
            .with_child(PersistedTree::leaf("z", "Z")),
        Direction::LeftRight,
    );
    let t0 = Instant::now();
    let start = engine.node(&id("x")).unwrap().position;
    let y = engine.node(&id("y")).unwrap().position;
    let over_y = mindmap_core::Point::new(y.x, y.y - 25.0);

    let _ = engine.pointer_down(&id("x"), start, t0);
    let started = engine.pointer_move(over_y, t0 + Duration::from_millis(20));
    assert!(matches!(started.effect, DragEffect::DragStarted { .. }));

    let dropped = engine
        .pointer_up(over_y, t0 + Duration::from_millis(40))
        .unwrap();
    let DragEffect::Dropped {
        intent: Some(intent),
        ..
    } = &dropped.transition.effect
    else {
        panic!("expected a drop, got {:?}", dropped.transition.effect);
    };
    assert!(matches!(
        intent,
        DropIntent::InsertSibling {
            placement: SiblingPlacement::Before,
            ..
        }
    ));
    assert!(dropped.mutation.is_some());

    assert_eq!(child_ids(&engine, "root"), vec!["p", "x", "y", "z"]);
    assert!(child_ids(&engine, "p").is_empty());
    let pos = |raw: &str| engine.node(&id(raw)).unwrap().position.y;
    assert!(pos("x") < pos("y"));
    assert_eq!(engine.node(&id("x")).unwrap().depth, 1);
}

#[test]
fn dropping_onto_own_descendant_is_rejected() {
    let mut engine = open(
        PersistedTree::leaf("root", "Root")
            .with_child(PersistedTree::leaf("a", "A").with_child(PersistedTree::leaf("a1", "A1"))),
        Direction::LeftRight,
    );
    let before = engine.state().state_hash();
    let t0 = Instant::now();
    let start = engine.node(&id("a")).unwrap().position;
    let target = engine.node(&id("a1")).unwrap().position;

    let _ = engine.pointer_down(&id("a"), start, t0);
    let _ = engine.pointer_move(target, t0 + Duration::from_millis(20));
    let err = engine
        .pointer_up(target, t0 + Duration::from_millis(40))
        .unwrap_err();
    assert!(matches!(err, mindmap_core::MindMapError::Cycle { .. }));
    assert_eq!(engine.state().state_hash(), before);
    assert!(!engine.drag().is_active());
    assert_eq!(engine.history_len(), 1);
}

#[test]
fn dropping_onto_current_parent_commits_nothing() {
    let mut engine = open(
        PersistedTree::leaf("root", "Root")
            .with_child(PersistedTree::leaf("p", "P").with_child(PersistedTree::leaf("x", "X")))
            .with_child(PersistedTree::leaf("y", "Y")),
        Direction::LeftRight,
    );
    let events = engine.subscribe();
    let before = engine.to_document().unwrap();
    let before_hash = engine.state().state_hash();
    let t0 = Instant::now();
    let start = engine.node(&id("x")).unwrap().position;
    let over_p = engine.node(&id("p")).unwrap().position;

    let _ = engine.pointer_down(&id("x"), start, t0);
    let started = engine.pointer_move(over_p, t0 + Duration::from_millis(20));
    assert!(matches!(started.effect, DragEffect::DragStarted { .. }));

    let dropped = engine
        .pointer_up(over_p, t0 + Duration::from_millis(40))
        .unwrap();
    let DragEffect::Dropped {
        intent: Some(intent),
        ..
    } = &dropped.transition.effect
    else {
        panic!("expected a drop, got {:?}", dropped.transition.effect);
    };
    assert!(matches!(intent, DropIntent::Reparent { new_parent, .. } if new_parent == &id("p")));
    assert!(dropped.mutation.is_none());

    assert!(!engine.drag().is_active());
    assert_eq!(engine.history_len(), 1);
    assert!(!engine.can_undo());
    assert_eq!(engine.state().state_hash(), before_hash);
    assert_eq!(engine.to_document().unwrap(), before);
    assert_eq!(events.try_iter().count(), 0);
}

#[test]
fn k_undos_restore_the_initial_document() {
    let mut engine = open(
        PersistedTree::leaf("root", "Root").with_child(PersistedTree::leaf("a", "A")),
        Direction::LeftRight,
    );
    let initial = engine.to_document().unwrap();
    let initial_hash = engine.state().state_hash();

    let root = id("root");
    let b = engine.add_child(&root).unwrap();
    let _ = engine.add_sibling(&b).unwrap();
    engine.toggle_collapse(&id("a")).unwrap();
    engine.move_node(&id("a"), &b, None).unwrap();
    engine.update_notes(&b, Some("n".into())).unwrap();
    engine.change_layout_direction(Direction::BottomTop).unwrap();
    let latest = engine.to_document().unwrap();
    let k = 6;

    for _ in 0..k {
        assert!(engine.undo());
    }
    assert!(!engine.undo());
    assert_eq!(engine.to_document().unwrap(), initial);
    assert_eq!(engine.state().state_hash(), initial_hash);

    for _ in 0..k {
        assert!(engine.redo());
    }
    assert!(!engine.redo());
    assert_eq!(engine.to_document().unwrap(), latest);
}

#[test]
fn new_mutation_after_undo_drops_redo() {
    let mut engine = open(PersistedTree::leaf("root", "Root"), Direction::LeftRight);
    let root = id("root");
    let _ = engine.add_child(&root).unwrap();
    let _ = engine.add_child(&root).unwrap();
    assert!(engine.undo());
    assert!(engine.can_redo());
    let _ = engine.add_child(&root).unwrap();
    assert!(!engine.can_redo());
    assert_eq!(engine.history_len(), 3);
}

#[test]
fn history_is_capped() {
    let mut engine = open(PersistedTree::leaf("root", "Root"), Direction::LeftRight);
    let root = id("root");
    for _ in 0..60 {
        let _ = engine.add_child(&root).unwrap();
    }
    assert_eq!(engine.history_len(), 50);

    let mut undos = 0;
    while engine.undo() {
        undos += 1;
    }
    assert_eq!(undos, 49);
    // The oldest retained snapshot already holds eleven children.
    assert_eq!(child_ids(&engine, "root").len(), 11);
}

#[test]
fn events_follow_commits() {
    let mut engine = open(PersistedTree::leaf("root", "Root"), Direction::LeftRight);
    let events = engine.subscribe();
    let root = id("root");
    let child = engine.add_child(&root).unwrap();
    engine.toggle_collapse(&root).unwrap();
    engine.update_custom_style(&child, Some("accent".into())).unwrap();
    assert!(engine.undo());

    let received: Vec<_> = events.try_iter().collect();
    assert_eq!(received.len(), 4);
    assert_eq!(
        received[0],
        EngineEvent::NodeAdded {
            node_id: child.clone(),
            parent_id: root.clone()
        }
    );
    assert_eq!(
        received[1],
        EngineEvent::CollapseToggled {
            node_id: root,
            collapsed: true
        }
    );
    assert!(matches!(
        received[2],
        EngineEvent::PayloadUpdated { .. }
    ));
    assert!(matches!(
        received[3],
        EngineEvent::HistoryRestored { undo: true, .. }
    ));
}

#[test]
fn opening_from_json_accepts_direction_alias() {
    let json = r#"{
        "direction": "RL",
        "root": {
            "id": "root",
            "text": "Plan",
            "children": [
                {"id": "node-4", "text": "Step", "notes": "first", "chatId": "c-1"}
            ]
        }
    }"#;
    let mut engine = MindMapEngine::builder()
        .config(config())
        .measure(Unmeasured)
        .open_json(json)
        .unwrap();
    assert_eq!(engine.direction(), Direction::RightLeft);
    let step = engine.node(&id("node-4")).unwrap();
    assert_eq!(step.payload.notes.as_deref(), Some("first"));
    assert_eq!(step.payload.chat_id.as_deref(), Some("c-1"));
    assert!(step.position.x < 0.0, "RL grows leftward");
    assert_eq!(engine.add_child(&id("root")).unwrap().as_str(), "node-5");
}
