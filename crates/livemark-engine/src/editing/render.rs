//! Rendering: completed raw syntax in the anchor's block becomes block
//! types, inline styles, link entities and atomic media blocks.

use crate::editing::offsets::map_through_unwrap;
use crate::editing::{Document, EditError, EngineOptions};
use crate::models::{BlockKey, BlockType, CharMeta, EntityData, Position, Selection};
use crate::patterns::{self, MediaKind, MediaMatch};

/// One render pass over the block holding the anchor.
///
/// A block-prefix match short-circuits the pass. Otherwise the first inline
/// match and then the first media match (against the updated text) render
/// unless the anchor is strictly inside them.
pub fn render_pass(
    document: &Document,
    selection: &Selection,
    options: &EngineOptions,
) -> Result<(Document, Selection), EditError> {
    let key = selection.anchor_key;
    let Some(block) = document.block(key) else {
        return Ok((document.clone(), *selection));
    };
    if block.is_atomic() {
        return Ok((document.clone(), *selection));
    }

    let table = patterns::table();
    if block.block_type() == BlockType::Paragraph
        && let Some(m) = table.first_block_match(block.text())
    {
        log::debug!("render {} prefix in {key}", m.block_type);
        let doc = document
            .splice(key, 0..m.prefix_len, "", CharMeta::default())?
            .set_block_type(key, m.block_type)?;
        let sel = selection.map_offsets(key, |o| o.saturating_sub(m.prefix_len));
        return Ok((doc, sel));
    }

    let (doc, sel) = render_inline(document, *selection, key)?;
    render_media(&doc, sel, key, options)
}

fn strictly_inside(cursor: usize, range: &std::ops::Range<usize>) -> bool {
    range.start < cursor && cursor < range.end
}

fn render_inline(doc: &Document, sel: Selection, key: BlockKey) -> Result<(Document, Selection), EditError> {
    let block = doc.block(key).ok_or(EditError::UnknownBlock(key))?;
    let Some(m) = patterns::table().first_inline_match(block.text()) else {
        return Ok((doc.clone(), sel));
    };
    if strictly_inside(sel.anchor_offset, &m.outer) {
        return Ok((doc.clone(), sel));
    }
    log::debug!("render {} over {:?} in {key}", m.style, m.outer);
    let kept = m.outer.start..m.outer.start + m.inner.len();
    let doc = doc
        .splice(key, m.inner.end..m.outer.end, "", CharMeta::default())?
        .splice(key, m.outer.start..m.inner.start, "", CharMeta::default())?
        .apply_inline_style(key, kept, m.style)?;
    let sel = sel.map_offsets(key, |o| map_through_unwrap(o, &m.outer, &m.inner));
    Ok((doc, sel))
}

fn render_media(
    doc: &Document,
    sel: Selection,
    key: BlockKey,
    options: &EngineOptions,
) -> Result<(Document, Selection), EditError> {
    let block = doc.block(key).ok_or(EditError::UnknownBlock(key))?;
    let Some(m) = patterns::table().first_media_match(block.text()) else {
        return Ok((doc.clone(), sel));
    };
    if strictly_inside(sel.anchor_offset, &m.outer) {
        return Ok((doc.clone(), sel));
    }
    match m.kind {
        MediaKind::Hyperlink => render_link(doc, sel, key, m),
        _ => render_atomic(doc, sel, key, m, options.atomic_placeholder),
    }
}

fn render_link(doc: &Document, sel: Selection, key: BlockKey, m: MediaMatch) -> Result<(Document, Selection), EditError> {
    log::debug!("render link {} over {:?} in {key}", m.target, m.outer);
    let kept = m.outer.start..m.outer.start + m.text_range.len();
    let data = EntityData::Link {
        href: m.target,
        title: m.title,
    };
    let (doc, entity) = doc.create_entity(m.kind.entity_type(), m.kind.mutability(), data);
    let doc = doc
        .splice(key, m.text_range.end..m.outer.end, "", CharMeta::default())?
        .splice(key, m.outer.start..m.text_range.start, "", CharMeta::default())?
        .apply_entity(key, kept, Some(entity))?;
    let sel = sel.map_offsets(key, |o| map_through_unwrap(o, &m.outer, &m.text_range));
    Ok((doc, sel))
}

/// Media leave the text entirely: the match is cut and an atomic block
/// takes its place, splitting the host block at the match start.
fn render_atomic(
    doc: &Document,
    sel: Selection,
    key: BlockKey,
    m: MediaMatch,
    placeholder: char,
) -> Result<(Document, Selection), EditError> {
    log::debug!("render {:?} {} over {:?} in {key}", m.kind, m.target, m.outer);
    let data = EntityData::Media {
        src: m.target,
        alt: m.text,
        title: m.title,
    };
    let (doc, entity) = doc.create_entity(m.kind.entity_type(), m.kind.mutability(), data);
    let doc = doc.splice(key, m.outer.clone(), "", CharMeta::default())?;
    let at = Selection::collapsed(key, m.outer.start);
    let (doc, caret) = doc.insert_atomic_block(&at, entity, placeholder)?;
    let trailing = caret.anchor_key;

    let relocate = |pos: Position| {
        if pos.key != key || pos.offset <= m.outer.start {
            pos
        } else {
            Position::new(trailing, pos.offset.saturating_sub(m.outer.end))
        }
    };
    let mut sel_out = Selection::between(relocate(sel.anchor()), relocate(sel.focus()));
    sel_out.is_backward = sel.is_backward;
    Ok((doc, sel_out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityType, InlineStyle, Mutability};
    use pretty_assertions::assert_eq;

    fn render(text: &str, cursor: usize) -> (Document, Selection) {
        let doc = Document::from_plain_text(text);
        let key = doc.first_block().key();
        render_pass(&doc, &Selection::collapsed(key, cursor), &EngineOptions::default()).unwrap()
    }

    #[test]
    fn heading_prefix_becomes_block_type() {
        let (doc, sel) = render("# ", 2);
        assert_eq!(doc.describe(), r#"heading-1 """#);
        assert_eq!(sel.anchor_offset, 0);
    }

    #[test]
    fn block_prefix_cursor_clamps_at_zero() {
        let (doc, sel) = render("- item", 1);
        assert_eq!(doc.describe(), r#"unordered-item "item""#);
        assert_eq!(sel.anchor_offset, 0);
    }

    #[test]
    fn block_match_suppresses_inline() {
        let (doc, _) = render("> **q**", 7);
        assert_eq!(doc.describe(), r#"blockquote "**q**""#);
    }

    #[test]
    fn typed_block_ignores_prefix_rules() {
        let doc = Document::from_plain_text("# x");
        let key = doc.first_block().key();
        let doc = doc.set_block_type(key, BlockType::Blockquote).unwrap();
        let (out, _) =
            render_pass(&doc, &Selection::collapsed(key, 3), &EngineOptions::default()).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn bold_renders_with_cursor_at_end() {
        let (doc, sel) = render("**bold**", 8);
        assert_eq!(doc.describe(), r#"paragraph "bold" [BOLD 0..4]"#);
        assert_eq!(sel.anchor_offset, 4);
    }

    #[test]
    fn cursor_inside_match_suppresses_render() {
        let (doc, sel) = render("**bold**", 7);
        assert_eq!(doc.describe(), r#"paragraph "**bold**""#);
        assert_eq!(sel.anchor_offset, 7);
    }

    #[test]
    fn cursor_before_match_stays() {
        let (doc, sel) = render("x *it* y", 1);
        assert_eq!(doc.describe(), r#"paragraph "x it y" [ITALIC 2..4]"#);
        assert_eq!(sel.anchor_offset, 1);
    }

    #[test]
    fn inner_metadata_survives() {
        let doc = Document::from_plain_text("*a*");
        let key = doc.first_block().key();
        let doc = doc.apply_inline_style(key, 1..2, InlineStyle::Code).unwrap();
        let (doc, sel) =
            render_pass(&doc, &Selection::collapsed(key, 3), &EngineOptions::default()).unwrap();
        assert_eq!(doc.describe(), r#"paragraph "a" [ITALIC 0..1] [CODE 0..1]"#);
        assert_eq!(sel.anchor_offset, 1);
    }

    #[test]
    fn link_becomes_mutable_entity() {
        let (doc, sel) = render("go [site](http://x.com)", 23);
        assert_eq!(
            doc.describe(),
            r#"paragraph "go site" <hyperlink 3..7 href="http://x.com" MUTABLE>"#
        );
        assert_eq!(sel.anchor_offset, 7);
    }

    #[test]
    fn inline_then_link_in_one_pass() {
        let (doc, sel) = render("**b** [l](u)", 12);
        assert_eq!(
            doc.describe(),
            r#"paragraph "b l" [BOLD 0..1] <hyperlink 2..3 href="u" MUTABLE>"#
        );
        assert_eq!(sel.anchor_offset, 3);
    }

    #[test]
    fn image_splits_block_around_atomic() {
        let (doc, sel) = render("see ![cat](cat.png) now", 19);
        assert_eq!(
            doc.describe(),
            [
                r#"paragraph "see ""#,
                r#"atomic " " <image 0..1 src="cat.png" alt="cat" IMMUTABLE>"#,
                r#"paragraph " now""#,
            ]
            .join("\n")
        );
        assert_eq!(sel, Selection::collapsed(doc.blocks()[2].key(), 0));
        let entity = doc.entities().iter().next().unwrap().1;
        assert_eq!(entity.entity_type(), EntityType::Image);
        assert_eq!(entity.mutability(), Mutability::Immutable);
    }

    #[test]
    fn backward_selection_follows_text_into_trailing_block() {
        let doc = Document::from_plain_text("see ![cat](cat.png) now");
        let key = doc.first_block().key();
        let mut sel = Selection::between(Position::new(key, 21), Position::new(key, 2));
        sel.is_backward = true;
        let (doc, sel) = render_pass(&doc, &sel, &EngineOptions::default()).unwrap();
        let trailing = doc.blocks()[2].key();
        assert_eq!(sel.anchor(), Position::new(trailing, 2));
        assert_eq!(sel.focus(), Position::new(key, 2));
        assert!(sel.is_backward);
    }

    #[test]
    fn cursor_before_media_stays_in_host() {
        let (doc, sel) = render("a ![v](clip.mp4)", 1);
        assert_eq!(sel, Selection::collapsed(doc.blocks()[0].key(), 1));
        assert_eq!(doc.blocks()[1].block_type(), BlockType::Atomic);
    }

    #[test]
    fn rendered_state_is_a_fixed_point() {
        let (doc, sel) = render("**bold** and [l](u)", 19);
        let again = render_pass(&doc, &sel, &EngineOptions::default()).unwrap();
        assert_eq!(again, (doc, sel));
    }
}
