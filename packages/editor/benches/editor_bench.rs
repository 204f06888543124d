use blockpage_editor::{Block, EditSession, EditorConfig, Mutation, Props, Viewport};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn landing_page(sections: usize) -> Vec<Block> {
    (0..sections)
        .map(|i| {
            Block::new("row").with_id(format!("row-{}", i)).with_prop(
                "left",
                vec![
                    Block::new("heading")
                        .with_id(format!("h-{}", i))
                        .with_prop("text", format!("Section {}", i)),
                    Block::new("text")
                        .with_id(format!("t-{}", i))
                        .with_prop("content", "<p>Lorem ipsum dolor sit amet</p>"),
                    Block::new("button").with_id(format!("b-{}", i)),
                ],
            )
        })
        .collect()
}

fn update_and_undo(c: &mut Criterion) {
    let config = EditorConfig::default();
    let mut session = EditSession::from_blocks("bench", landing_page(50), &config).unwrap();

    c.bench_function("update_and_undo_200_blocks", |b| {
        b.iter(|| {
            let mut props = Props::new();
            props.insert("text".to_string(), "Edited".into());
            session.apply(black_box(Mutation::UpdateBlock {
                id: "h-25".to_string(),
                props,
            }));
            session.undo();
        })
    });
}

fn copy_paste(c: &mut Criterion) {
    let config = EditorConfig::default();

    c.bench_function("copy_paste_section", |b| {
        b.iter(|| {
            let mut session = EditSession::from_blocks("bench", landing_page(10), &config).unwrap();
            session.copy_block("row-3");
            session.select_block(Some("row-5"));
            black_box(session.paste_block())
        })
    });
}

fn preview_mobile(c: &mut Criterion) {
    let config = EditorConfig::default();
    let mut session = EditSession::from_blocks("bench", landing_page(50), &config).unwrap();
    session.set_viewport(Viewport::Mobile);

    c.bench_function("preview_mobile_200_blocks", |b| {
        b.iter(|| black_box(session.preview()))
    });
}

criterion_group!(benches, update_and_undo, copy_paste, preview_mobile);
criterion_main!(benches);
