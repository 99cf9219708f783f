use super::block::BlockKey;

/// A point in the document: a block and a char offset within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub key: BlockKey,
    pub offset: usize,
}

impl Position {
    pub fn new(key: BlockKey, offset: usize) -> Self {
        Self { key, offset }
    }
}

/// Anchor/focus selection. Rules treat the anchor as the edit cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor_key: BlockKey,
    pub anchor_offset: usize,
    pub focus_key: BlockKey,
    pub focus_offset: usize,
    /// True when focus precedes anchor in document order.
    pub is_backward: bool,
}

impl Selection {
    /// A caret at `offset` in `key`.
    pub fn collapsed(key: BlockKey, offset: usize) -> Self {
        Self {
            anchor_key: key,
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
            is_backward: false,
        }
    }

    /// A forward selection from `anchor` to `focus`.
    pub fn between(anchor: Position, focus: Position) -> Self {
        Self {
            anchor_key: anchor.key,
            anchor_offset: anchor.offset,
            focus_key: focus.key,
            focus_offset: focus.offset,
            is_backward: false,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    pub fn anchor(&self) -> Position {
        Position::new(self.anchor_key, self.anchor_offset)
    }

    pub fn focus(&self) -> Position {
        Position::new(self.focus_key, self.focus_offset)
    }

    /// Remaps every endpoint lying in `key` through `f`.
    #[must_use]
    pub fn map_offsets(mut self, key: BlockKey, f: impl Fn(usize) -> usize) -> Self {
        if self.anchor_key == key {
            self.anchor_offset = f(self.anchor_offset);
        }
        if self.focus_key == key {
            self.focus_offset = f(self.focus_offset);
        }
        self
    }
}
