//! Edit steps: commit one raw change, then derender and render around the
//! anchor. Each step maps a `(Document, Selection)` value to a new one.

use std::ops::Range;

use crate::editing::autopair::delete_surrounding_pair;
use crate::editing::derender::derender_at_cursor;
use crate::editing::render::render_pass;
use crate::editing::{Document, EditError};
use crate::models::{Block, BlockType, Mutability, Position, Selection};

/// Engine behaviour switches, usually filled from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Close brackets and quotes as their opener is typed.
    pub auto_pair: bool,
    /// Deepest list nesting reachable with Tab.
    pub max_list_depth: usize,
    /// Text of the single char an atomic block holds.
    pub atomic_placeholder: char,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            auto_pair: true,
            max_list_depth: 4,
            atomic_placeholder: ' ',
        }
    }
}

/// A raw change delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum TextChange {
    /// Text and selection were already committed; only render.
    Committed,
    /// The caret moved or the selection changed.
    Select(Selection),
    /// Typed or pasted text, replacing an extended selection.
    InsertText(String),
    Backspace,
    Delete,
    /// Return. `force` splits a blockquote instead of adding a soft newline.
    SplitBlock { force: bool },
    /// Tab, or Shift+Tab with `outdent`.
    Indent { outdent: bool },
}

/// The value every step produces.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub document: Document,
    pub selection: Selection,
}

impl EditorState {
    /// A document with the caret at the start of its first block.
    pub fn from_document(document: Document) -> Self {
        let selection = Selection::collapsed(document.first_block().key(), 0);
        Self {
            document,
            selection,
        }
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::from_document(Document::new())
    }
}

/// Commits `change`, then derenders any run the anchor re-entered and
/// renders any pattern the edit completed.
pub fn apply_edit_step(
    document: &Document,
    selection: &Selection,
    change: TextChange,
    options: &EngineOptions,
) -> Result<EditorState, EditError> {
    log::trace!("edit step {change:?} at {selection:?}");
    let (doc, sel) = commit(document, selection, change, options)?;
    let (doc, sel) = derender_at_cursor(&doc, &sel)?;
    let (document, selection) = render_pass(&doc, &sel, options)?;
    Ok(EditorState {
        document,
        selection,
    })
}

fn commit(
    doc: &Document,
    sel: &Selection,
    change: TextChange,
    options: &EngineOptions,
) -> Result<(Document, Selection), EditError> {
    match change {
        TextChange::Committed => {
            doc.validate_selection(sel)?;
            Ok((doc.clone(), *sel))
        }
        TextChange::Select(next) => {
            doc.validate_selection(&next)?;
            Ok((doc.clone(), next))
        }
        TextChange::InsertText(text) => insert_text(doc, sel, &text),
        TextChange::Backspace => backspace(doc, sel),
        TextChange::Delete => delete(doc, sel),
        TextChange::SplitBlock { force } => split(doc, sel, force),
        TextChange::Indent { outdent } => indent(doc, sel, outdent, options.max_list_depth),
    }
}

fn insert_text(doc: &Document, sel: &Selection, text: &str) -> Result<(Document, Selection), EditError> {
    let (doc, at) = doc.remove_range(sel)?;
    let (doc, at) = if doc.block(at.key).is_some_and(Block::is_atomic) {
        // Atomic blocks hold no text: typing lands in a paragraph after it.
        let (doc, caret) = doc.split_block(at)?;
        (doc, caret.anchor())
    } else {
        (doc, at)
    };
    let doc = doc.insert_typed_text(at, text)?;
    Ok((doc, Selection::collapsed(at.key, at.offset + text.chars().count())))
}

fn backspace(doc: &Document, sel: &Selection) -> Result<(Document, Selection), EditError> {
    doc.validate_selection(sel)?;
    if let Some(result) = delete_surrounding_pair(doc, sel) {
        return Ok(result);
    }
    if !sel.is_collapsed() {
        let (doc, at) = doc.remove_range(sel)?;
        return Ok((doc, Selection::collapsed(at.key, at.offset)));
    }

    let at = sel.anchor();
    let block = doc.block(at.key).ok_or(EditError::UnknownBlock(at.key))?;
    if block.is_atomic() {
        return remove_atomic(doc, at);
    }
    if at.offset == 0 {
        if block.block_type() != BlockType::Paragraph {
            log::debug!("backspace resets {} to paragraph", block.block_type());
            let doc = doc.set_block_type(at.key, BlockType::Paragraph)?;
            return Ok((doc, *sel));
        }
        let Some(prev) = doc.block_before(at.key) else {
            return Ok((doc.clone(), *sel));
        };
        if prev.is_atomic() {
            return Ok((doc.remove_block(prev.key())?, *sel));
        }
        let joint = Position::new(prev.key(), prev.len());
        let doc = doc.replace_text(&Selection::between(joint, at), "")?;
        return Ok((doc, Selection::collapsed(joint.key, joint.offset)));
    }

    let range = widen_deletion(doc, block, at.offset - 1..at.offset);
    delete_range(doc, at, range)
}

fn delete(doc: &Document, sel: &Selection) -> Result<(Document, Selection), EditError> {
    doc.validate_selection(sel)?;
    if !sel.is_collapsed() {
        let (doc, at) = doc.remove_range(sel)?;
        return Ok((doc, Selection::collapsed(at.key, at.offset)));
    }

    let at = sel.anchor();
    let block = doc.block(at.key).ok_or(EditError::UnknownBlock(at.key))?;
    if block.is_atomic() {
        return remove_atomic(doc, at);
    }
    if at.offset == block.len() {
        let Some(next) = doc.block_after(at.key) else {
            return Ok((doc.clone(), *sel));
        };
        if next.is_atomic() {
            return Ok((doc.remove_block(next.key())?, *sel));
        }
        let joint = Position::new(next.key(), 0);
        let doc = doc.replace_text(&Selection::between(at, joint), "")?;
        return Ok((doc, *sel));
    }

    let range = widen_deletion(doc, block, at.offset..at.offset + 1);
    delete_range(doc, at, range)
}

fn delete_range(doc: &Document, at: Position, range: Range<usize>) -> Result<(Document, Selection), EditError> {
    let removal = Selection::between(
        Position::new(at.key, range.start),
        Position::new(at.key, range.end),
    );
    let doc = doc.replace_text(&removal, "")?;
    Ok((doc, Selection::collapsed(at.key, range.start)))
}

/// Caret lands at the end of the block before a removed atomic block, or
/// the start of the one after it.
fn remove_atomic(doc: &Document, at: Position) -> Result<(Document, Selection), EditError> {
    let caret = match (doc.block_before(at.key), doc.block_after(at.key)) {
        (Some(prev), _) => Some(Position::new(prev.key(), prev.len())),
        (None, Some(next)) => Some(Position::new(next.key(), 0)),
        (None, None) => None,
    };
    let doc = doc.remove_block(at.key)?;
    let caret = caret.unwrap_or_else(|| Position::new(doc.first_block().key(), 0));
    Ok((doc, Selection::collapsed(caret.key, caret.offset)))
}

/// Widens a one-char deletion by the mutability of the entity under it:
/// immutable runs go whole, segmented runs lose the word.
fn widen_deletion(doc: &Document, block: &Block, range: Range<usize>) -> Range<usize> {
    let Some((entity, run)) = block.entity_run_at(range.start) else {
        return range;
    };
    match doc.entity(entity).map(|e| e.mutability()) {
        Some(Mutability::Immutable) => run,
        Some(Mutability::Segmented) => segment_around(block, run, range),
        Some(Mutability::Mutable) => range,
        None => {
            log::warn!("block {} references missing entity {entity}", block.key());
            range
        }
    }
}

/// The whitespace-delimited segment of `run` holding `range`.
fn segment_around(block: &Block, run: Range<usize>, range: Range<usize>) -> Range<usize> {
    let is_space = |i: usize| block.char_at(i).is_some_and(char::is_whitespace);
    if is_space(range.start) {
        return range;
    }
    let mut start = range.start;
    while start > run.start && !is_space(start - 1) {
        start -= 1;
    }
    let mut end = range.end;
    while end < run.end && !is_space(end) {
        end += 1;
    }
    start..end
}

fn split(doc: &Document, sel: &Selection, force: bool) -> Result<(Document, Selection), EditError> {
    let (doc, at) = doc.remove_range(sel)?;
    let block = doc.block(at.key).ok_or(EditError::UnknownBlock(at.key))?;
    let block_type = block.block_type();
    let resets = block_type.is_list_item() || block_type == BlockType::Blockquote;
    if resets && block.is_empty() {
        log::debug!("return in empty {block_type} resets it to paragraph");
        let doc = doc.set_block_type(at.key, BlockType::Paragraph)?;
        return Ok((doc, Selection::collapsed(at.key, at.offset)));
    }
    if block_type == BlockType::Blockquote && !force {
        let doc = doc.insert_typed_text(at, "\n")?;
        return Ok((doc, Selection::collapsed(at.key, at.offset + 1)));
    }
    doc.split_block(at)
}

fn indent(
    doc: &Document,
    sel: &Selection,
    outdent: bool,
    max_depth: usize,
) -> Result<(Document, Selection), EditError> {
    doc.validate_selection(sel)?;
    let key = sel.anchor_key;
    let block = doc.block(key).ok_or(EditError::UnknownBlock(key))?;
    if !block.block_type().is_list_item() {
        return Ok((doc.clone(), *sel));
    }
    let depth = if outdent {
        block.depth().saturating_sub(1)
    } else {
        // Nesting goes at most one level below a preceding item of the same list.
        match doc.block_before(key) {
            Some(prev) if prev.block_type() == block.block_type() => {
                (block.depth() + 1).min(prev.depth() + 1).min(max_depth)
            }
            _ => block.depth(),
        }
    };
    if depth == block.depth() {
        return Ok((doc.clone(), *sel));
    }
    Ok((doc.set_block_depth(key, depth)?, *sel))
}
