//! Tests for longer mutation sequences
//!
//! This tests:
//! - Undo of a whole sequence returns to the start, redo replays it
//! - Redo is dropped by a new mutation after undo
//! - Scripted mutations from JSON
//! - Document integrity after every step

use blockpage_editor::{Block, EditSession, EditorConfig, Forest, Mutation, Props};
use serde_json::json;

fn page() -> Vec<Block> {
    vec![
        Block::new("hero").with_id("hero").with_prop("title", "Welcome"),
        Block::new("row").with_id("row").with_prop(
            "left",
            vec![
                Block::new("text").with_id("t1").with_prop("content", "one"),
                Block::new("button").with_id("b1").with_prop("text", "Go"),
            ],
        ),
        Block::new("text").with_id("t2").with_prop("content", "two"),
    ]
}

fn props(entries: serde_json::Value) -> Props {
    serde_json::from_value(entries).unwrap()
}

fn sequence() -> Vec<Mutation> {
    vec![
        Mutation::AddBlock {
            block: Block::new("divider"),
        },
        Mutation::UpdateBlock {
            id: "hero".to_string(),
            props: props(json!({ "title": "Hello", "height": { "desktop": "500px", "mobile": "300px" } })),
        },
        Mutation::DuplicateBlock {
            id: "t1".to_string(),
        },
        Mutation::MoveBlock { from: 0, to: 2 },
        Mutation::RemoveBlock {
            id: "b1".to_string(),
        },
        Mutation::UpdateBlock {
            id: "row".to_string(),
            props: props(json!({ "right": [ { "type": "image", "props": { "src": "a.png" } } ] })),
        },
        Mutation::InsertTemplate {
            blocks: vec![Block::new("heading"), Block::new("text")],
        },
        Mutation::RemoveBlock {
            id: "row".to_string(),
        },
    ]
}

fn snapshot(session: &EditSession) -> Forest {
    session.document().snapshot()
}

#[test]
fn test_undo_whole_sequence_then_redo() {
    let mut session = EditSession::from_blocks("seq", page(), &EditorConfig::default()).unwrap();

    let mut states = vec![snapshot(&session)];
    for mutation in sequence() {
        let name = mutation.name();
        assert!(session.apply(mutation).is_some(), "{} failed", name);
        assert!(session.document().is_consistent(), "{} broke the arena", name);
        states.push(snapshot(&session));
    }

    for expected in states.iter().rev().skip(1) {
        assert!(session.undo());
        assert_eq!(&snapshot(&session), expected);
        assert!(session.document().is_consistent());
    }
    assert!(!session.can_undo());

    for expected in states.iter().skip(1) {
        assert!(session.redo());
        assert_eq!(&snapshot(&session), expected);
    }
    assert!(!session.can_redo());
}

#[test]
fn test_new_mutation_drops_redo() {
    let mut session = EditSession::from_blocks("seq", page(), &EditorConfig::default()).unwrap();

    session.remove_block("t2");
    session.remove_block("hero");
    session.undo();
    assert!(session.can_redo());

    session.move_block(0, 1);
    assert!(!session.can_redo());
    assert!(!session.redo());
}

#[test]
fn test_rejected_mutations_leave_no_trace() {
    let mut session = EditSession::from_blocks("seq", page(), &EditorConfig::default()).unwrap();
    let before = snapshot(&session);

    let rejected = vec![
        Mutation::RemoveBlock {
            id: "ghost".to_string(),
        },
        Mutation::MoveBlock { from: 3, to: 0 },
        Mutation::MoveBlock { from: 1, to: 1 },
        Mutation::DuplicateBlock {
            id: "ghost".to_string(),
        },
        Mutation::InsertTemplate { blocks: vec![] },
        Mutation::UpdateBlock {
            id: "ghost".to_string(),
            props: Props::new(),
        },
    ];
    for mutation in rejected {
        assert!(session.apply(mutation).is_none());
    }

    assert_eq!(snapshot(&session), before);
    assert!(!session.can_undo());
}

#[test]
fn test_history_limit_evicts_oldest() {
    let config = EditorConfig {
        history_limit: 3,
        ..Default::default()
    };
    let mut session = EditSession::new("limit", &config);

    for _ in 0..5 {
        session.add_block_of_type("spacer");
    }

    let mut undone = 0;
    while session.undo() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    assert_eq!(session.document().len(), 2);
}

#[test]
fn test_replay_script_from_json() {
    let script = r#"[
        { "op": "addBlock", "block": { "id": "cta", "type": "button", "props": { "text": "Buy" } } },
        { "op": "updateBlock", "id": "cta", "props": { "variant": "outline" } },
        { "op": "moveBlock", "from": 3, "to": 0 },
        { "op": "insertBlock", "block": { "type": "text", "props": { "content": "after cta" } }, "after": "cta" }
    ]"#;
    let mutations: Vec<Mutation> = serde_json::from_str(script).unwrap();

    let mut session = EditSession::from_blocks("seq", page(), &EditorConfig::default()).unwrap();
    for mutation in mutations {
        session.apply(mutation);
    }

    let ids = session.document().top_level_ids().to_vec();
    assert_eq!(ids[0], "cta");
    assert_eq!(ids.len(), 5);

    let cta = session.block("cta").unwrap();
    assert_eq!(cta.prop("variant").and_then(|p| p.as_str()), Some("outline"));
    let pasted = session.block(&ids[1]).unwrap();
    assert_eq!(pasted.prop("content").and_then(|p| p.as_str()), Some("after cta"));
}

#[test]
fn test_replacing_slot_removes_old_children() {
    let mut session = EditSession::from_blocks("seq", page(), &EditorConfig::default()).unwrap();
    session.select_block(Some("b1"));

    let replaced = session.apply(Mutation::UpdateBlock {
        id: "row".to_string(),
        props: props(json!({ "left": [ { "id": "t2", "type": "text" } ] })),
    });
    let result = replaced.unwrap();

    let mut removed = result.removed.clone();
    removed.sort();
    assert_eq!(removed, vec!["b1".to_string(), "t1".to_string()]);
    assert_eq!(session.selected_block_id(), None);

    // "t2" is taken at the top level, so the nested copy gets a new id
    let row = session.block("row").unwrap();
    let left = row.prop("left").and_then(|p| p.as_blocks()).unwrap();
    assert_ne!(left[0].id, "t2");
    assert!(session.document().is_consistent());
}
