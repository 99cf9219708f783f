use livemark_engine::editing::render::render_pass;
use livemark_engine::io::{from_json, to_json, to_markdown};
use livemark_engine::{
    BlockType, Document, Editor, EditorState, EngineOptions, EntityData, EntityType, Mutability,
    Position, Selection,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn typed(text: &str) -> Editor {
    let mut editor = Editor::default();
    editor.type_text(text);
    editor
}

fn caret(editor: &Editor) -> usize {
    editor.state().selection.anchor_offset
}

/// Every style and entity run stays inside its block.
fn assert_ranges_in_bounds(doc: &Document) {
    for block in doc.blocks() {
        for run in block.style_ranges() {
            assert!(run.range.start < run.range.end, "empty run in {block:?}");
            assert!(run.range.end <= block.len(), "style run past end in {block:?}");
        }
        for run in block.entity_ranges() {
            assert!(run.range.end <= block.len(), "entity run past end in {block:?}");
            assert!(doc.entity(run.entity).is_some(), "dangling entity in {block:?}");
        }
    }
}

#[test]
fn heading_prefix_renders_on_space() {
    let editor = typed("# ");
    insta::assert_snapshot!(editor.state().document.describe(), @r#"heading-1 """#);
    assert_eq!(caret(&editor), 0);
}

#[test]
fn auto_pair_closes_and_types_over() {
    let mut editor = Editor::default();
    editor.type_char('(');
    assert_eq!(editor.state().document.plain_text(), "()");
    assert_eq!(caret(&editor), 1);

    editor.type_char(')');
    assert_eq!(editor.state().document.plain_text(), "()");
    assert_eq!(caret(&editor), 2);
}

#[test]
fn backspace_between_pair_removes_both() {
    let mut editor = Editor::default();
    editor.type_char('[');
    editor.backspace();
    assert_eq!(editor.state().document.plain_text(), "");
    assert_eq!(caret(&editor), 0);
}

#[test]
fn bold_renders_and_re_entering_restores_syntax() {
    let mut editor = typed("**bold**");
    insta::assert_snapshot!(editor.state().document.describe(), @r#"paragraph "bold" [BOLD 0..4]"#);
    assert_eq!(caret(&editor), 4);

    editor.move_left();
    assert_eq!(editor.state().document.describe(), r#"paragraph "**bold**""#);
    assert_eq!(caret(&editor), 5);

    editor.move_end();
    assert_eq!(editor.state().document.describe(), r#"paragraph "bold" [BOLD 0..4]"#);
    assert_eq!(caret(&editor), 4);
}

#[test]
fn link_round_trip_is_byte_exact() {
    let raw = "[site](http://x.com)";
    let mut editor = typed(raw);
    insta::assert_snapshot!(
        editor.state().document.describe(),
        @r#"paragraph "site" <hyperlink 0..4 href="http://x.com" MUTABLE>"#
    );
    assert_eq!(caret(&editor), 4);

    editor.move_left();
    assert_eq!(editor.state().document.plain_text(), raw);
    assert_eq!(caret(&editor), 4);

    editor.move_end();
    assert_eq!(editor.state().document.plain_text(), "site");
    // the restored syntax creates a fresh entity
    assert_eq!(editor.state().document.entities().len(), 2);
}

#[test]
fn media_becomes_atomic_block_between_paragraphs() {
    let editor = typed("before\n![cat](cat.png)after");
    let doc = &editor.state().document;
    assert_eq!(
        doc.describe(),
        [
            r#"paragraph "before""#,
            r#"paragraph """#,
            r#"atomic " " <image 0..1 src="cat.png" alt="cat" IMMUTABLE>"#,
            r#"paragraph "after""#,
        ]
        .join("\n")
    );
    assert_eq!(editor.state().selection.anchor_key, doc.blocks()[3].key());
    assert_eq!(caret(&editor), 5);
}

const CAT: &str = r#"atomic " " <image 0..1 src="cat.png" alt="cat" IMMUTABLE>"#;

fn select(editor: &mut Editor, anchor: Position, focus: Position) {
    assert!(editor.select(Selection::between(anchor, focus)));
}

#[test]
fn backspace_over_range_after_media_keeps_atomic_block() {
    let mut editor = typed("![cat](cat.png)after");
    let keys: Vec<_> = editor.state().document.blocks().iter().map(|b| b.key()).collect();
    select(&mut editor, Position::new(keys[1], 1), Position::new(keys[2], 2));

    assert!(editor.backspace());
    assert_eq!(
        editor.state().document.describe(),
        [r#"paragraph """#, CAT, r#"paragraph "ter""#].join("\n")
    );
    assert_eq!(editor.state().selection, Selection::collapsed(keys[2], 0));
}

#[test]
fn typing_over_range_covering_media_replaces_it_with_text() {
    let mut editor = typed("![cat](cat.png)after");
    let keys: Vec<_> = editor.state().document.blocks().iter().map(|b| b.key()).collect();
    select(&mut editor, Position::new(keys[1], 0), Position::new(keys[2], 0));

    assert!(editor.type_char('x'));
    let doc = &editor.state().document;
    assert_eq!(doc.describe(), "paragraph \"\"\nparagraph \"xafter\"");
    assert!(doc.blocks().iter().all(|b| !b.is_atomic()));
    assert_eq!(caret(&editor), 1);
}

#[test]
fn backspace_over_range_ending_before_media_leaves_placeholder() {
    let mut editor = typed("before\n![cat](cat.png)after");
    let keys: Vec<_> = editor.state().document.blocks().iter().map(|b| b.key()).collect();
    select(&mut editor, Position::new(keys[0], 3), Position::new(keys[2], 0));

    assert!(editor.backspace());
    assert_eq!(
        editor.state().document.describe(),
        [r#"paragraph "bef""#, CAT, r#"paragraph "after""#].join("\n")
    );
    assert_eq!(editor.state().selection, Selection::collapsed(keys[0], 3));
}

#[test]
fn backspace_into_immutable_entity_removes_whole_run() {
    let doc = Document::from_plain_text("a tag b");
    let key = doc.first_block().key();
    let (doc, entity) = doc.create_entity(
        EntityType::Hyperlink,
        Mutability::Immutable,
        EntityData::link("http://x.com"),
    );
    let doc = doc.apply_entity(key, 2..5, Some(entity)).unwrap();
    let mut editor = Editor::from_state(
        EditorState {
            document: doc,
            selection: Selection::collapsed(key, 5),
        },
        EngineOptions::default(),
    );

    editor.backspace();
    assert_eq!(editor.state().document.describe(), r#"paragraph "a  b""#);
    assert_eq!(caret(&editor), 2);
}

#[test]
fn typing_inside_mutable_link_extends_it() {
    let editor = typed("[site](u) x");
    let state = editor.state();
    let key = state.selection.anchor_key;
    assert_eq!(state.document.plain_text(), "site x");

    let doc = state
        .document
        .insert_typed_text(Position::new(key, 2), "!")
        .unwrap();
    assert_eq!(doc.describe(), r#"paragraph "si!te x" <hyperlink 0..5 href="u" MUTABLE>"#);
}

#[rstest]
#[case("- item", BlockType::UnorderedItem, "item")]
#[case("1. first", BlockType::OrderedItem, "first")]
#[case("> quoted", BlockType::Blockquote, "quoted")]
#[case("### small", BlockType::HeadingThree, "small")]
fn block_prefixes_render_while_typing(
    #[case] input: &str,
    #[case] block_type: BlockType,
    #[case] text: &str,
) {
    let editor = typed(input);
    let block = editor.state().document.first_block();
    assert_eq!(block.block_type(), block_type);
    assert_eq!(block.text(), text);
}

#[rstest]
#[case("**bold** and *it*")]
#[case("`code` ~~gone~~ [l](u)")]
#[case("# head\n- a\n- b\n> q")]
#[case("x ![v](clip.mp4) y")]
fn render_pass_is_idempotent(#[case] input: &str) {
    let editor = typed(input);
    let state = editor.state();
    assert_ranges_in_bounds(&state.document);

    let (doc, sel) = render_pass(&state.document, &state.selection, &EngineOptions::default()).unwrap();
    assert_eq!(doc, state.document);
    assert_eq!(sel, state.selection);
}

#[test]
fn raw_json_is_lossless() {
    let editor = typed("# Notes\n**bold** [site](http://x.com \"X\")\n- a\n\n![cat](cat.png)");
    let doc = &editor.state().document;
    assert_ranges_in_bounds(doc);

    let json = to_json(doc).unwrap();
    assert_eq!(&from_json(&json).unwrap(), doc);
}

#[test]
fn markdown_export_after_editing_session() {
    let mut editor = typed("- one\n");
    editor.tab();
    editor.type_text("two");
    assert_eq!(to_markdown(&editor.state().document), "- one\n  - two");
}
