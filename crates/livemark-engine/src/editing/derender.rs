//! Derendering: when the caret moves strictly inside a styled run or a
//! link, the run goes back to its raw syntax so it can be edited as text.

use std::ops::Range;

use crate::editing::offsets::map_through_wrap;
use crate::editing::{Document, EditError};
use crate::models::{Block, BlockKey, CharMeta, EntityData, EntityType, InlineStyle, Selection};
use crate::patterns::{self, MediaKind};

/// Re-wraps every run the anchor sits strictly inside: inline styles first,
/// in table order, then a hyperlink.
pub fn derender_at_cursor(document: &Document, selection: &Selection) -> Result<(Document, Selection), EditError> {
    let key = selection.anchor_key;
    let Some(block) = document.block(key) else {
        return Ok((document.clone(), *selection));
    };
    if block.is_atomic() {
        return Ok((document.clone(), *selection));
    }

    let mut doc = document.clone();
    let mut sel = *selection;
    for style in InlineStyle::ALL {
        let Some(decorator) = patterns::table().decorator(style) else {
            continue;
        };
        let Some(run) = run_around_cursor(&doc, &sel, |block, at| block.style_run_at(at, style))
        else {
            continue;
        };
        log::debug!("derender {style} over {run:?} in {key}");
        (doc, sel) = wrap_style(&doc, sel, key, run, style, decorator)?;
    }

    let link = run_around_cursor(&doc, &sel, |block, at| {
        block.entity_run_at(at).map(|(_, range)| range)
    });
    if let Some(run) = link {
        let block = doc.block(key).ok_or(EditError::UnknownBlock(key))?;
        let entity_key = block.entity_at(run.start);
        let entity = entity_key
            .and_then(|k| doc.entity(k))
            .map(|e| (e.entity_type(), e.data().clone()));
        match entity {
            Some((EntityType::Hyperlink, EntityData::Link { href, title })) => {
                log::debug!("derender link {href} over {run:?} in {key}");
                (doc, sel) = wrap_link(&doc, sel, key, run, &href, title.as_deref())?;
            }
            Some(_) => {}
            None => log::warn!("block {key} references missing entity {entity_key:?}"),
        }
    }
    Ok((doc, sel))
}

/// The run found by `find` at the char before the anchor, if the anchor lies
/// strictly inside it.
fn run_around_cursor(
    doc: &Document,
    sel: &Selection,
    find: impl Fn(&Block, usize) -> Option<Range<usize>>,
) -> Option<Range<usize>> {
    let cursor = sel.anchor_offset;
    let block = doc.block(sel.anchor_key)?;
    let run = find(block, cursor.checked_sub(1)?)?;
    (run.start < cursor && cursor < run.end).then_some(run)
}

fn wrap_style(
    doc: &Document,
    sel: Selection,
    key: BlockKey,
    run: Range<usize>,
    style: InlineStyle,
    decorator: &str,
) -> Result<(Document, Selection), EditError> {
    let block = doc.block(key).ok_or(EditError::UnknownBlock(key))?;
    // Decorators join whatever else the run's edge chars carry.
    let edge_meta = |at: usize| {
        let meta = block.meta_at(at).unwrap_or_default();
        CharMeta {
            styles: meta.styles.without(style),
            entity: meta.entity,
        }
    };
    let (open_meta, close_meta) = (edge_meta(run.start), edge_meta(run.end - 1));
    let len = decorator.chars().count();

    let doc = doc
        .remove_inline_style(key, run.clone(), style)?
        .splice(key, run.end..run.end, decorator, close_meta)?
        .splice(key, run.start..run.start, decorator, open_meta)?;
    let sel = sel.map_offsets(key, |o| map_through_wrap(o, &run, len, len));
    Ok((doc, sel))
}

fn wrap_link(
    doc: &Document,
    sel: Selection,
    key: BlockKey,
    run: Range<usize>,
    href: &str,
    title: Option<&str>,
) -> Result<(Document, Selection), EditError> {
    let text = doc
        .block(key)
        .ok_or(EditError::UnknownBlock(key))?
        .slice(run.clone());
    let raw = MediaKind::Hyperlink.render(&text, href, title);
    let open = MediaKind::TEXT_OPEN.len_utf8();
    let close = raw.chars().count() - open - run.len();
    let closing: String = raw.chars().skip(open + run.len()).collect();

    let doc = doc
        .update_meta(key, run.clone(), |m| m.entity = None)?
        .splice(key, run.end..run.end, &closing, CharMeta::default())?
        .splice(
            key,
            run.start..run.start,
            &MediaKind::TEXT_OPEN.to_string(),
            CharMeta::default(),
        )?;
    let sel = sel.map_offsets(key, |o| map_through_wrap(o, &run, open, close));
    Ok((doc, sel))
}
