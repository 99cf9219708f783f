//! Bracket and quote auto-pairing.
//!
//! Runs before a typed char is committed. Typing a registered closer right
//! before the same char steps over it; typing an opener inserts the pair
//! with the caret between them.

use crate::editing::Document;
use crate::models::{Position, Selection};
use crate::patterns::kinds::pairs;

/// Result of offering one typed char to the auto-pair handler.
#[derive(Debug, Clone, PartialEq)]
pub struct InputOutcome {
    /// True when the char was fully handled and must not be inserted again.
    pub handled: bool,
    pub document: Document,
    pub selection: Selection,
}

impl InputOutcome {
    fn passed(document: &Document, selection: &Selection) -> Self {
        Self {
            handled: false,
            document: document.clone(),
            selection: *selection,
        }
    }
}

pub fn handle_raw_input_char(document: &Document, selection: &Selection, ch: char) -> InputOutcome {
    if !selection.is_collapsed() {
        return InputOutcome::passed(document, selection);
    }
    let cursor = selection.anchor();
    let Some(block) = document.block(cursor.key) else {
        return InputOutcome::passed(document, selection);
    };
    if block.is_atomic() || cursor.offset > block.len() {
        return InputOutcome::passed(document, selection);
    }

    if pairs::is_closer(ch) && block.char_at(cursor.offset) == Some(ch) {
        log::debug!("auto-pair: typing over {ch:?} at {}", cursor.offset);
        return InputOutcome {
            handled: true,
            document: document.clone(),
            selection: Selection::collapsed(cursor.key, cursor.offset + 1),
        };
    }

    if let Some(closer) = pairs::closer_for(ch) {
        let pair: String = [ch, closer].into_iter().collect();
        match document.insert_typed_text(cursor, &pair) {
            Ok(doc) => {
                log::debug!("auto-pair: closing {ch:?} with {closer:?} at {}", cursor.offset);
                return InputOutcome {
                    handled: true,
                    document: doc,
                    selection: Selection::collapsed(cursor.key, cursor.offset + 1),
                };
            }
            Err(err) => log::warn!("auto-pair: insert rejected: {err}"),
        }
    }

    InputOutcome::passed(document, selection)
}

/// Backspace between a registered opener and its closer removes both.
///
/// Returns `None` when the selection is extended or the chars around the
/// caret are not a pair.
pub fn delete_surrounding_pair(document: &Document, selection: &Selection) -> Option<(Document, Selection)> {
    if !selection.is_collapsed() {
        return None;
    }
    let cursor = selection.anchor();
    let block = document.block(cursor.key)?;
    if block.is_atomic() || cursor.offset == 0 {
        return None;
    }
    let open = block.char_at(cursor.offset - 1)?;
    let close = block.char_at(cursor.offset)?;
    if !pairs::is_pair(open, close) {
        return None;
    }
    let range = Selection::between(
        Position::new(cursor.key, cursor.offset - 1),
        Position::new(cursor.key, cursor.offset + 1),
    );
    let doc = document.replace_text(&range, "").ok()?;
    log::debug!("auto-pair: removed pair {open:?}{close:?}");
    Some((doc, Selection::collapsed(cursor.key, cursor.offset - 1)))
}
