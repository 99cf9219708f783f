use crate::editing::autopair::handle_raw_input_char;
use crate::editing::{EditError, EditorState, EngineOptions, TextChange, apply_edit_step};
use crate::models::{Position, Selection};

/// Owns the current editor state and turns key events into edit steps.
///
/// Every method is one step. A step the engine rejects is logged and the
/// previous state is kept, so a host never observes a half-applied edit.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    state: EditorState,
    options: EngineOptions,
}

impl Editor {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            state: EditorState::default(),
            options,
        }
    }

    pub fn from_state(state: EditorState, options: EngineOptions) -> Self {
        Self { state, options }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn into_state(self) -> EditorState {
        self.state
    }

    /// Applies one change; returns whether the engine accepted it.
    pub fn step(&mut self, change: TextChange) -> bool {
        let next = apply_edit_step(
            &self.state.document,
            &self.state.selection,
            change.clone(),
            &self.options,
        );
        self.adopt(next, &change)
    }

    fn adopt(&mut self, next: Result<EditorState, EditError>, change: &TextChange) -> bool {
        match next {
            Ok(state) => {
                self.state = state;
                true
            }
            Err(err) => {
                log::warn!("rejected {change:?}: {err}");
                false
            }
        }
    }

    /// Types one char, giving auto-pairing first refusal.
    pub fn type_char(&mut self, ch: char) -> bool {
        if self.options.auto_pair {
            let outcome = handle_raw_input_char(&self.state.document, &self.state.selection, ch);
            if outcome.handled {
                // The pair is only kept if the render step after it succeeds.
                let change = TextChange::Committed;
                let next = apply_edit_step(
                    &outcome.document,
                    &outcome.selection,
                    change.clone(),
                    &self.options,
                );
                return self.adopt(next, &change);
            }
        }
        self.step(TextChange::InsertText(ch.to_string()))
    }

    /// Types each char in turn; a newline is Return.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.enter();
            } else {
                self.type_char(ch);
            }
        }
    }

    pub fn backspace(&mut self) -> bool {
        self.step(TextChange::Backspace)
    }

    pub fn delete(&mut self) -> bool {
        self.step(TextChange::Delete)
    }

    pub fn enter(&mut self) -> bool {
        self.step(TextChange::SplitBlock { force: false })
    }

    /// Ctrl+Return: always splits, even in a blockquote.
    pub fn force_enter(&mut self) -> bool {
        self.step(TextChange::SplitBlock { force: true })
    }

    /// Shift+Return: a newline inside the block.
    pub fn soft_enter(&mut self) -> bool {
        self.step(TextChange::InsertText("\n".to_string()))
    }

    pub fn tab(&mut self) -> bool {
        self.step(TextChange::Indent { outdent: false })
    }

    pub fn shift_tab(&mut self) -> bool {
        self.step(TextChange::Indent { outdent: true })
    }

    pub fn select(&mut self, selection: Selection) -> bool {
        self.step(TextChange::Select(selection))
    }

    /// Collapses an extended selection to its start, else moves one char
    /// left, wrapping to the end of the previous block.
    pub fn move_left(&mut self) -> bool {
        let doc = &self.state.document;
        let caret = match self.collapsed_or_edge(true) {
            Err(pos) => pos,
            Ok(pos) if pos.offset > 0 => Position::new(pos.key, pos.offset - 1),
            Ok(pos) => match doc.block_before(pos.key) {
                Some(prev) => Position::new(prev.key(), prev.len()),
                None => pos,
            },
        };
        self.move_to(caret)
    }

    /// Mirror of [`Editor::move_left`].
    pub fn move_right(&mut self) -> bool {
        let doc = &self.state.document;
        let caret = match self.collapsed_or_edge(false) {
            Err(pos) => pos,
            Ok(pos) => {
                let len = doc.block(pos.key).map_or(0, |b| b.len());
                if pos.offset < len {
                    Position::new(pos.key, pos.offset + 1)
                } else {
                    match doc.block_after(pos.key) {
                        Some(next) => Position::new(next.key(), 0),
                        None => pos,
                    }
                }
            }
        };
        self.move_to(caret)
    }

    /// Previous block at the same offset, clamped to its length.
    pub fn move_up(&mut self) -> bool {
        let pos = self.state.selection.anchor();
        let caret = match self.state.document.block_before(pos.key) {
            Some(prev) => Position::new(prev.key(), pos.offset.min(prev.len())),
            None => Position::new(pos.key, 0),
        };
        self.move_to(caret)
    }

    pub fn move_down(&mut self) -> bool {
        let pos = self.state.selection.anchor();
        let doc = &self.state.document;
        let caret = match doc.block_after(pos.key) {
            Some(next) => Position::new(next.key(), pos.offset.min(next.len())),
            None => Position::new(pos.key, doc.block(pos.key).map_or(0, |b| b.len())),
        };
        self.move_to(caret)
    }

    pub fn move_home(&mut self) -> bool {
        let key = self.state.selection.anchor_key;
        self.move_to(Position::new(key, 0))
    }

    pub fn move_end(&mut self) -> bool {
        let key = self.state.selection.anchor_key;
        let len = self.state.document.block(key).map_or(0, |b| b.len());
        self.move_to(Position::new(key, len))
    }

    fn move_to(&mut self, caret: Position) -> bool {
        self.select(Selection::collapsed(caret.key, caret.offset))
    }

    /// `Ok(caret)` for a collapsed selection; `Err(edge)` with the start (or
    /// end) of an extended one, which a move collapses onto.
    fn collapsed_or_edge(&self, start: bool) -> Result<Position, Position> {
        let sel = self.state.selection;
        if sel.is_collapsed() {
            return Ok(sel.anchor());
        }
        let clamped = self.state.document.clamp_selection(&sel);
        let (first, last) = if clamped.is_backward {
            (clamped.focus(), clamped.anchor())
        } else {
            (clamped.anchor(), clamped.focus())
        };
        Err(if start { first } else { last })
    }
}
