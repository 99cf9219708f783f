use std::fmt::Write as _;
use std::ops::Range;

use crate::editing::EditError;
use crate::models::{
    Block, BlockKey, BlockType, CharMeta, Entity, EntityData, EntityKey, EntityMap, EntityType,
    InlineStyle, Mutability, Position, Selection, StyleSet,
};

/// The rich-text document: an ordered, never-empty sequence of blocks plus
/// the entity table they reference.
///
/// Every write primitive returns a new `Document` (or a new document and
/// selection) and leaves `self` untouched, so a rejected edit step simply
/// keeps the value it started from.
///
/// ```rust
/// # use livemark_engine::editing::Document;
/// # use livemark_engine::models::{BlockType, InlineStyle};
/// let doc = Document::from_plain_text("hello world");
/// let key = doc.blocks()[0].key();
/// let doc = doc.apply_inline_style(key, 0..5, InlineStyle::Bold).unwrap();
/// let doc = doc.toggle_block_type(key, BlockType::HeadingOne).unwrap();
/// assert_eq!(doc.describe(), r#"heading-1 "hello world" [BOLD 0..5]"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    entities: EntityMap,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding one empty paragraph.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::new(BlockType::Paragraph, "")],
            entities: EntityMap::default(),
        }
    }

    /// One paragraph per line of `text`.
    pub fn from_plain_text(text: &str) -> Self {
        let blocks = text
            .split('\n')
            .map(|line| Block::new(BlockType::Paragraph, line))
            .collect();
        Self::from_parts(blocks, EntityMap::default())
    }

    pub(crate) fn from_parts(mut blocks: Vec<Block>, entities: EntityMap) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::new(BlockType::Paragraph, ""));
        }
        Self { blocks, entities }
    }

    // Read accessors

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, key: BlockKey) -> Option<&Block> {
        self.blocks.iter().find(|b| b.key() == key)
    }

    pub fn block_index(&self, key: BlockKey) -> Option<usize> {
        self.blocks.iter().position(|b| b.key() == key)
    }

    pub fn block_before(&self, key: BlockKey) -> Option<&Block> {
        let index = self.block_index(key)?;
        index.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    pub fn block_after(&self, key: BlockKey) -> Option<&Block> {
        let index = self.block_index(key)?;
        self.blocks.get(index + 1)
    }

    pub fn first_block(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn last_block(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn entities(&self) -> &EntityMap {
        &self.entities
    }

    /// Block texts joined by newlines.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Selection checks

    /// Errors unless `pos` names a block and lies within its length.
    pub fn validate_position(&self, pos: Position) -> Result<(), EditError> {
        let block = self.block(pos.key).ok_or(EditError::UnknownBlock(pos.key))?;
        check_offset(block, pos.offset)
    }

    pub fn validate_selection(&self, selection: &Selection) -> Result<(), EditError> {
        self.validate_position(selection.anchor())?;
        self.validate_position(selection.focus())
    }

    /// Read-path repair: unknown blocks snap to the end of the last block and
    /// offsets are clamped to their block's length.
    pub fn clamp_selection(&self, selection: &Selection) -> Selection {
        let clamp = |pos: Position| match self.block(pos.key) {
            Some(block) => Position::new(pos.key, pos.offset.min(block.len())),
            None => Position::new(self.last_block().key(), self.last_block().len()),
        };
        let (anchor, focus) = (clamp(selection.anchor()), clamp(selection.focus()));
        let mut clamped = Selection::between(anchor, focus);
        clamped.is_backward = self.compare(focus, anchor).is_lt();
        clamped
    }

    /// The selection's endpoints in document order.
    pub fn ordered_endpoints(&self, selection: &Selection) -> Result<(Position, Position), EditError> {
        self.validate_selection(selection)?;
        let (anchor, focus) = (selection.anchor(), selection.focus());
        if self.compare(focus, anchor).is_lt() {
            Ok((focus, anchor))
        } else {
            Ok((anchor, focus))
        }
    }

    /// The block and char range a single-block selection covers.
    pub fn selection_range(&self, selection: &Selection) -> Result<(BlockKey, Range<usize>), EditError> {
        let (start, end) = self.ordered_endpoints(selection)?;
        if start.key != end.key {
            return Err(EditError::CrossBlockRange {
                start: start.key,
                end: end.key,
            });
        }
        Ok((start.key, start.offset..end.offset))
    }

    fn compare(&self, a: Position, b: Position) -> std::cmp::Ordering {
        let index = |p: Position| self.block_index(p.key).unwrap_or(usize::MAX);
        (index(a), a.offset).cmp(&(index(b), b.offset))
    }

    // Write primitives

    /// Removes the selected range and inserts `text` in its place, unstyled
    /// and without entity. See [`Document::remove_range`] for how ranges
    /// spanning blocks are removed.
    pub fn replace_text(&self, selection: &Selection, text: &str) -> Result<Document, EditError> {
        let (mut doc, at) = self.remove_range(selection)?;
        if text.is_empty() {
            return Ok(doc);
        }
        let index = doc.index_of(at.key)?;
        let block = &mut doc.blocks[index];
        if block.is_atomic() {
            return Err(EditError::AtomicBlockText(at.key));
        }
        block.splice(at.offset..at.offset, text, CharMeta::default());
        Ok(doc)
    }

    /// Removes the selected range, returning the collapsed position left
    /// behind.
    ///
    /// A range spanning blocks keeps the first block's prefix and appends
    /// the last block's suffix; blocks in between go. Text never moves into
    /// or out of an atomic block: an atomic block whose placeholder the
    /// range covers becomes an empty paragraph (first block) or is removed
    /// (last block), and one the range only touches stays as it is.
    pub fn remove_range(&self, selection: &Selection) -> Result<(Document, Position), EditError> {
        let (start, end) = self.ordered_endpoints(selection)?;
        let mut doc = self.clone();
        let first = doc.index_of(start.key)?;
        if start.key == end.key {
            if start.offset == end.offset {
                return Ok((doc, start));
            }
            if doc.blocks[first].is_atomic() {
                return Ok(doc.clear_atomic(first));
            }
            doc.blocks[first].splice(start.offset..end.offset, "", CharMeta::default());
            return Ok((doc, start));
        }

        let last = doc.index_of(end.key)?;
        let mut caret = start;
        let mut keeps_head = true;
        if !doc.blocks[first].is_atomic() {
            doc.blocks[first].split_off(start.offset);
        } else if start.offset == 0 {
            (doc, caret) = doc.clear_atomic(first);
        } else {
            keeps_head = false;
        }

        let mut drain_end = last;
        if doc.blocks[last].is_atomic() {
            if end.offset > 0 {
                drain_end = last + 1;
            }
        } else if keeps_head {
            let (tail, metas) = doc.blocks[last].split_off(end.offset);
            doc.blocks[first].append(&tail, &metas);
            drain_end = last + 1;
        } else {
            doc.blocks[last].splice(0..end.offset, "", CharMeta::default());
            caret = Position::new(end.key, 0);
        }
        doc.blocks.drain(first + 1..drain_end);
        Ok((doc, caret))
    }

    /// Swaps the atomic block at `index` for an empty paragraph.
    fn clear_atomic(mut self, index: usize) -> (Document, Position) {
        log::debug!("range covers atomic block {}", self.blocks[index].key());
        let block = Block::new(BlockType::Paragraph, "");
        let caret = Position::new(block.key(), 0);
        self.blocks[index] = block;
        (self, caret)
    }

    /// Inserts `text` at `at`, every char carrying `styles`.
    pub fn insert_text(&self, at: Position, text: &str, styles: StyleSet) -> Result<Document, EditError> {
        self.with_block(at.key, |block| {
            check_offset(block, at.offset)?;
            block.splice(at.offset..at.offset, text, CharMeta::styled(styles));
            Ok(())
        })
    }

    /// Inserts typed text at `at`, unstyled, honouring entity mutability:
    /// text typed strictly inside a mutable entity's run joins the entity,
    /// while typing inside an immutable or segmented run detaches the whole
    /// run from its entity.
    pub fn insert_typed_text(&self, at: Position, text: &str) -> Result<Document, EditError> {
        self.validate_position(at)?;
        let block = self.block(at.key).ok_or(EditError::UnknownBlock(at.key))?;
        let enclosing = match (at.offset.checked_sub(1), block.entity_at(at.offset)) {
            (Some(before), Some(after)) if block.entity_at(before) == Some(after) => {
                block.entity_run_at(before)
            }
            _ => None,
        };
        let mut meta = CharMeta::default();
        let mut doc = self.clone();
        if let Some((entity, run)) = enclosing {
            match self.entities.get(entity).map(Entity::mutability) {
                Some(Mutability::Mutable) => meta.entity = Some(entity),
                Some(_) => {
                    log::debug!("typing inside entity {entity} detaches it from {run:?}");
                    doc = doc.update_meta(at.key, run, |m| m.entity = None)?;
                }
                None => log::warn!("block {} references missing entity {entity}", at.key),
            }
        }
        doc.splice(at.key, at.offset..at.offset, text, meta)
    }

    pub fn apply_inline_style(
        &self,
        key: BlockKey,
        range: Range<usize>,
        style: InlineStyle,
    ) -> Result<Document, EditError> {
        self.with_block(key, |block| {
            check_range(block, &range)?;
            block.update_meta(range, |m| m.styles = m.styles.with(style));
            Ok(())
        })
    }

    pub fn remove_inline_style(
        &self,
        key: BlockKey,
        range: Range<usize>,
        style: InlineStyle,
    ) -> Result<Document, EditError> {
        self.with_block(key, |block| {
            check_range(block, &range)?;
            block.update_meta(range, |m| m.styles = m.styles.without(style));
            Ok(())
        })
    }

    /// Sets the block's type; setting its current type resets it to a paragraph.
    pub fn toggle_block_type(&self, key: BlockKey, block_type: BlockType) -> Result<Document, EditError> {
        let current = self.block(key).ok_or(EditError::UnknownBlock(key))?.block_type();
        let next = if current == block_type {
            BlockType::Paragraph
        } else {
            block_type
        };
        self.set_block_type(key, next)
    }

    /// Sets the block's type without toggling. Depth only survives on list items.
    pub fn set_block_type(&self, key: BlockKey, block_type: BlockType) -> Result<Document, EditError> {
        self.with_block(key, |block| {
            block.set_block_type(block_type);
            if !block_type.is_list_item() {
                block.set_depth(0);
            }
            Ok(())
        })
    }

    pub fn set_block_depth(&self, key: BlockKey, depth: usize) -> Result<Document, EditError> {
        self.with_block(key, |block| {
            block.set_depth(depth);
            Ok(())
        })
    }

    pub fn create_entity(
        &self,
        entity_type: EntityType,
        mutability: Mutability,
        data: EntityData,
    ) -> (Document, EntityKey) {
        let mut doc = self.clone();
        let key = doc
            .entities
            .insert(Entity::new(entity_type, mutability, data));
        (doc, key)
    }

    /// Attaches `entity` to the range, or clears entities from it with `None`.
    pub fn apply_entity(
        &self,
        key: BlockKey,
        range: Range<usize>,
        entity: Option<EntityKey>,
    ) -> Result<Document, EditError> {
        if let Some(entity) = entity
            && !self.entities.contains(entity)
        {
            return Err(EditError::UnknownEntity(entity));
        }
        self.with_block(key, |block| {
            check_range(block, &range)?;
            block.update_meta(range, |m| m.entity = entity);
            Ok(())
        })
    }

    /// Edits a mutable or segmented entity's data in place.
    pub fn replace_entity_data(&self, key: EntityKey, data: EntityData) -> Result<Document, EditError> {
        let mut doc = self.clone();
        let entity = doc
            .entities
            .get_mut(key)
            .ok_or(EditError::UnknownEntity(key))?;
        if entity.mutability() == Mutability::Immutable {
            return Err(EditError::ImmutableEntity(key));
        }
        entity.set_data(data);
        Ok(doc)
    }

    /// Splits the anchor's block around a new atomic block holding `entity`.
    ///
    /// The host block keeps the text before the cursor, the text after it
    /// moves into a new trailing paragraph, and the returned caret sits at
    /// the start of that paragraph.
    pub fn insert_atomic_block(
        &self,
        selection: &Selection,
        entity: EntityKey,
        placeholder: char,
    ) -> Result<(Document, Selection), EditError> {
        let at = selection.anchor();
        self.validate_position(at)?;
        if !self.entities.contains(entity) {
            return Err(EditError::UnknownEntity(entity));
        }
        let mut doc = self.clone();
        let index = doc.index_of(at.key)?;
        let trailing = if doc.blocks[index].is_atomic() {
            Block::new(BlockType::Paragraph, "")
        } else {
            let (tail, metas) = doc.blocks[index].split_off(at.offset);
            let mut block = Block::new(BlockType::Paragraph, "");
            block.append(&tail, &metas);
            block
        };
        let caret = Selection::collapsed(trailing.key(), 0);
        doc.blocks.insert(index + 1, Block::atomic(entity, placeholder));
        doc.blocks.insert(index + 2, trailing);
        Ok((doc, caret))
    }

    /// Splits the block at `at`; the tail moves into a new block after it.
    ///
    /// The new block inherits the type and depth, except that headings
    /// continue as paragraphs. Splitting an atomic block adds an empty
    /// paragraph after it.
    pub fn split_block(&self, at: Position) -> Result<(Document, Selection), EditError> {
        self.validate_position(at)?;
        let mut doc = self.clone();
        let index = doc.index_of(at.key)?;
        let host = &mut doc.blocks[index];
        let next = if host.is_atomic() {
            Block::new(BlockType::Paragraph, "")
        } else {
            let block_type = match host.block_type() {
                t if t.heading_level().is_some() => BlockType::Paragraph,
                t => t,
            };
            let (tail, metas) = host.split_off(at.offset);
            let mut block = Block::new(block_type, "");
            block.append(&tail, &metas);
            block.set_depth(host.depth());
            block
        };
        let caret = Selection::collapsed(next.key(), 0);
        doc.blocks.insert(index + 1, next);
        Ok((doc, caret))
    }

    /// Removes a block. Removing the only block leaves an empty paragraph.
    pub fn remove_block(&self, key: BlockKey) -> Result<Document, EditError> {
        let mut doc = self.clone();
        let index = doc.index_of(key)?;
        doc.blocks.remove(index);
        if doc.blocks.is_empty() {
            doc.blocks.push(Block::new(BlockType::Paragraph, ""));
        }
        Ok(doc)
    }

    /// Applies a crate-internal metadata rewrite to a range of one block.
    pub(crate) fn update_meta(
        &self,
        key: BlockKey,
        range: Range<usize>,
        f: impl Fn(&mut CharMeta),
    ) -> Result<Document, EditError> {
        self.with_block(key, |block| {
            check_range(block, &range)?;
            block.update_meta(range, f);
            Ok(())
        })
    }

    /// Replaces `range` with `text` whose chars all carry `meta`.
    pub(crate) fn splice(
        &self,
        key: BlockKey,
        range: Range<usize>,
        text: &str,
        meta: CharMeta,
    ) -> Result<Document, EditError> {
        self.with_block(key, |block| {
            check_range(block, &range)?;
            block.splice(range, text, meta);
            Ok(())
        })
    }

    fn index_of(&self, key: BlockKey) -> Result<usize, EditError> {
        self.block_index(key).ok_or(EditError::UnknownBlock(key))
    }

    fn with_block(
        &self,
        key: BlockKey,
        f: impl FnOnce(&mut Block) -> Result<(), EditError>,
    ) -> Result<Document, EditError> {
        let mut doc = self.clone();
        let index = doc.index_of(key)?;
        f(&mut doc.blocks[index])?;
        Ok(doc)
    }

    /// Deterministic one-line-per-block dump: type, depth, text, then style
    /// and entity runs.
    pub fn describe(&self) -> String {
        self.blocks
            .iter()
            .map(|block| self.describe_block(block))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn describe_block(&self, block: &Block) -> String {
        let mut line = block.block_type().to_string();
        if block.block_type().is_list_item() && block.depth() > 0 {
            let _ = write!(line, " (depth {})", block.depth());
        }
        let _ = write!(line, " {:?}", block.text());
        for run in block.style_ranges() {
            let _ = write!(line, " [{} {}..{}]", run.style, run.range.start, run.range.end);
        }
        for run in block.entity_ranges() {
            let (start, end) = (run.range.start, run.range.end);
            let Some(entity) = self.entities.get(run.entity) else {
                let _ = write!(line, " <missing {} {start}..{end}>", run.entity);
                continue;
            };
            let _ = write!(line, " <{} {start}..{end}", entity.entity_type().as_str());
            match entity.data() {
                EntityData::Link { href, .. } => {
                    let _ = write!(line, " href={href:?}");
                }
                EntityData::Media { src, alt, .. } => {
                    let _ = write!(line, " src={src:?} alt={alt:?}");
                }
            }
            if let Some(title) = entity.data().title() {
                let _ = write!(line, " title={title:?}");
            }
            let _ = write!(line, " {}>", entity.mutability().as_str());
        }
        line
    }
}

fn check_offset(block: &Block, offset: usize) -> Result<(), EditError> {
    if offset > block.len() {
        return Err(EditError::InvalidOffset {
            key: block.key(),
            offset,
            len: block.len(),
        });
    }
    Ok(())
}

fn check_range(block: &Block, range: &Range<usize>) -> Result<(), EditError> {
    check_offset(block, range.end)?;
    check_offset(block, range.start)?;
    if range.start > range.end {
        return Err(EditError::InvalidOffset {
            key: block.key(),
            offset: range.start,
            len: block.len(),
        });
    }
    Ok(())
}
