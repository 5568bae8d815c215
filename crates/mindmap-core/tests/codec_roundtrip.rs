//! Property tests: persisted-tree encode/decode preserves ids, labels, parent
//! links, sibling order, and direction.

use mindmap_core::{
    Direction, GraphNode, NodeId, children_of, decode, encode, refresh_derived, validate_tree,
};
use proptest::prelude::*;

fn build_nodes(shape: &[(usize, String, bool)]) -> Vec<GraphNode> {
    let root = NodeId::new("root");
    let mut nodes = vec![GraphNode::root(root.clone(), "Root")];
    for (i, (parent_pick, label, collapsed)) in shape.iter().enumerate() {
        let parent = nodes[parent_pick % nodes.len()].id.clone();
        let mut node = GraphNode::child(NodeId::new(format!("n{i}")), label.clone(), parent, 0);
        node.collapsed = *collapsed;
        nodes.push(node);
    }
    refresh_derived(&mut nodes, &root).expect("generated tree is well formed");
    nodes
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::LeftRight),
        Just(Direction::RightLeft),
        Just(Direction::TopBottom),
        Just(Direction::BottomTop),
    ]
}

proptest! {
    #[test]
    fn decode_encode_is_identity(
        shape in prop::collection::vec((0usize..64, "[a-zA-Z ]{0,12}", any::<bool>()), 0..40),
        direction in direction_strategy(),
    ) {
        let nodes = build_nodes(&shape);
        let root = NodeId::new("root");
        let document = encode(&nodes, &root, direction).unwrap();
        let decoded = decode(&document).unwrap();

        prop_assert_eq!(decoded.nodes.len(), nodes.len());
        prop_assert_eq!(&decoded.root_id, &root);
        prop_assert_eq!(decoded.direction, direction);
        prop_assert!(validate_tree(&decoded.nodes, &decoded.root_id).is_ok());

        // Canonical form is a fixed point.
        let again = encode(&decoded.nodes, &decoded.root_id, decoded.direction).unwrap();
        prop_assert_eq!(&again, &document);
        prop_assert_eq!(decode(&again).unwrap(), decoded.clone());

        // Sibling order and labels survive.
        for node in &nodes {
            let original: Vec<_> = children_of(&nodes, &node.id).iter().map(|n| &n.id).collect();
            let restored: Vec<_> = children_of(&decoded.nodes, &node.id)
                .iter()
                .map(|n| &n.id)
                .collect();
            prop_assert_eq!(original, restored);
            let twin = decoded.nodes.iter().find(|n| n.id == node.id).unwrap();
            prop_assert_eq!(&twin.label, &node.label);
            prop_assert_eq!(&twin.parent_id, &node.parent_id);
            prop_assert_eq!(twin.depth, node.depth);
            prop_assert_eq!(twin.collapsed, node.collapsed);
        }
    }
}

#[test]
fn json_text_round_trip() {
    let json = r#"{
        "layoutDirection": "TB",
        "root": {
            "id": "root",
            "text": "Plan",
            "children": [
                { "id": "a", "text": "A", "notes": "n", "customStyle": "red" },
                { "id": "b", "text": "B", "collapsed": true,
                  "children": [{ "id": "b1", "text": "B1", "chatId": "c-1" }] }
            ]
        }
    }"#;
    let document = mindmap_core::PersistedDocument::from_json_str(json).unwrap();
    let decoded = decode(&document).unwrap();
    assert_eq!(decoded.nodes.len(), 4);
    assert_eq!(decoded.nodes[3].payload.chat_id.as_deref(), Some("c-1"));
    let text = encode(&decoded.nodes, &decoded.root_id, decoded.direction)
        .unwrap()
        .to_json_string()
        .unwrap();
    let reparsed = mindmap_core::PersistedDocument::from_json_str(&text).unwrap();
    assert_eq!(reparsed, document);
}

fn chain(depth: usize) -> Vec<GraphNode> {
    let root = NodeId::new("root");
    let mut nodes = vec![GraphNode::root(root.clone(), "Root")];
    for i in 1..depth {
        let parent = nodes[i - 1].id.clone();
        nodes.push(GraphNode::child(
            NodeId::new(format!("n{i}")),
            format!("Level {i}"),
            parent,
            0,
        ));
    }
    refresh_derived(&mut nodes, &root).expect("chain is well formed");
    nodes
}

#[test]
fn deep_chain_encodes_and_decodes() {
    let nodes = chain(20_000);
    let root = NodeId::new("root");
    let document = encode(&nodes, &root, Direction::LeftRight).unwrap();
    assert_eq!(document.root.node_count(), 20_000);
    assert_eq!(document.root.depth(), 20_000);

    let decoded = decode(&document).unwrap();
    assert_eq!(decoded.nodes, nodes);
    assert!(validate_tree(&decoded.nodes, &decoded.root_id).is_ok());
    assert_eq!(document.clone(), document);
}

#[test]
fn deep_document_survives_json_text() {
    // Far past the parser's default nesting limit of 128.
    let nodes = chain(5_000);
    let root = NodeId::new("root");
    let document = encode(&nodes, &root, Direction::TopBottom).unwrap();

    for text in [
        document.to_json_string().unwrap(),
        document.to_json_pretty().unwrap(),
    ] {
        let reparsed = mindmap_core::PersistedDocument::from_json_str(&text).unwrap();
        assert_eq!(reparsed, document);
        assert_eq!(decode(&reparsed).unwrap().nodes, nodes);
    }
}

#[test]
fn trailing_json_is_rejected() {
    let err = mindmap_core::PersistedDocument::from_json_str(
        r#"{"root": {"id": "root", "text": "R"}} extra"#,
    )
    .unwrap_err();
    assert!(matches!(err, mindmap_core::CodecError::Json(_)));
}
