use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chars::byte_offset;
use super::entity::EntityKey;

/// Stable identity of a block. Survives every edit that keeps the block alive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(pub Uuid);

impl BlockKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural type of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    #[default]
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    HeadingFour,
    HeadingFive,
    HeadingSix,
    UnorderedItem,
    OrderedItem,
    Blockquote,
    /// Holds a single media entity over a placeholder char; not text-editable.
    Atomic,
}

impl BlockType {
    pub const ALL: [BlockType; 11] = [
        BlockType::Paragraph,
        BlockType::HeadingOne,
        BlockType::HeadingTwo,
        BlockType::HeadingThree,
        BlockType::HeadingFour,
        BlockType::HeadingFive,
        BlockType::HeadingSix,
        BlockType::UnorderedItem,
        BlockType::OrderedItem,
        BlockType::Blockquote,
        BlockType::Atomic,
    ];

    /// Heading type for a level in `1..=6`.
    pub fn heading(level: usize) -> Option<Self> {
        match level {
            1 => Some(BlockType::HeadingOne),
            2 => Some(BlockType::HeadingTwo),
            3 => Some(BlockType::HeadingThree),
            4 => Some(BlockType::HeadingFour),
            5 => Some(BlockType::HeadingFive),
            6 => Some(BlockType::HeadingSix),
            _ => None,
        }
    }

    pub fn heading_level(self) -> Option<usize> {
        match self {
            BlockType::HeadingOne => Some(1),
            BlockType::HeadingTwo => Some(2),
            BlockType::HeadingThree => Some(3),
            BlockType::HeadingFour => Some(4),
            BlockType::HeadingFive => Some(5),
            BlockType::HeadingSix => Some(6),
            _ => None,
        }
    }

    pub fn is_list_item(self) -> bool {
        matches!(self, BlockType::UnorderedItem | BlockType::OrderedItem)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::HeadingOne => "heading-1",
            BlockType::HeadingTwo => "heading-2",
            BlockType::HeadingThree => "heading-3",
            BlockType::HeadingFour => "heading-4",
            BlockType::HeadingFive => "heading-5",
            BlockType::HeadingSix => "heading-6",
            BlockType::UnorderedItem => "unordered-item",
            BlockType::OrderedItem => "ordered-item",
            BlockType::Blockquote => "blockquote",
            BlockType::Atomic => "atomic",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline formatting tag carried per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InlineStyle {
    Bold,
    Italic,
    Code,
    Strikethrough,
    Underline,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 5] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Code,
        InlineStyle::Strikethrough,
        InlineStyle::Underline,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InlineStyle::Bold => "BOLD",
            InlineStyle::Italic => "ITALIC",
            InlineStyle::Code => "CODE",
            InlineStyle::Strikethrough => "STRIKETHROUGH",
            InlineStyle::Underline => "UNDERLINE",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of inline styles on one character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StyleSet(u8);

impl StyleSet {
    pub const EMPTY: StyleSet = StyleSet(0);

    #[must_use]
    pub fn with(self, style: InlineStyle) -> Self {
        Self(self.0 | style.bit())
    }

    #[must_use]
    pub fn without(self, style: InlineStyle) -> Self {
        Self(self.0 & !style.bit())
    }

    pub fn contains(self, style: InlineStyle) -> bool {
        self.0 & style.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Styles in table order.
    pub fn iter(self) -> impl Iterator<Item = InlineStyle> {
        InlineStyle::ALL
            .into_iter()
            .filter(move |style| self.contains(*style))
    }
}

impl FromIterator<InlineStyle> for StyleSet {
    fn from_iter<I: IntoIterator<Item = InlineStyle>>(iter: I) -> Self {
        iter.into_iter().fold(StyleSet::EMPTY, StyleSet::with)
    }
}

/// Metadata attached to every character of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CharMeta {
    pub styles: StyleSet,
    pub entity: Option<EntityKey>,
}

impl CharMeta {
    pub fn styled(styles: StyleSet) -> Self {
        Self {
            styles,
            entity: None,
        }
    }
}

/// A maximal run of characters carrying one inline style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRange {
    pub style: InlineStyle,
    pub range: Range<usize>,
}

/// A maximal run of characters attached to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRange {
    pub entity: EntityKey,
    pub range: Range<usize>,
}

/// One structural unit of the document.
///
/// Text and per-char metadata always have the same length; style and entity
/// ranges are derived from the metadata as maximal runs, so they can never
/// leave `[0, len]`, invert, or partially overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    key: BlockKey,
    block_type: BlockType,
    depth: usize,
    text: String,
    chars: Vec<CharMeta>,
}

impl Block {
    pub fn new(block_type: BlockType, text: &str) -> Self {
        Self::with_key(BlockKey::new(), block_type, text)
    }

    pub fn with_key(key: BlockKey, block_type: BlockType, text: &str) -> Self {
        Self {
            key,
            block_type,
            depth: 0,
            text: text.to_string(),
            chars: vec![CharMeta::default(); text.chars().count()],
        }
    }

    /// An atomic block whose placeholder char carries `entity`.
    pub fn atomic(entity: EntityKey, placeholder: char) -> Self {
        let mut block = Self::new(BlockType::Atomic, "");
        block.splice(
            0..0,
            &placeholder.to_string(),
            CharMeta {
                styles: StyleSet::EMPTY,
                entity: Some(entity),
            },
        );
        block
    }

    pub fn key(&self) -> BlockKey {
        self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn is_atomic(&self) -> bool {
        self.block_type == BlockType::Atomic
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.text.chars().nth(offset)
    }

    pub fn meta_at(&self, offset: usize) -> Option<CharMeta> {
        self.chars.get(offset).copied()
    }

    pub fn styles_at(&self, offset: usize) -> StyleSet {
        self.meta_at(offset).map(|m| m.styles).unwrap_or_default()
    }

    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.meta_at(offset).and_then(|m| m.entity)
    }

    /// Text of a char range, clamped to the block.
    pub fn slice(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        self.text[byte_offset(&self.text, start)..byte_offset(&self.text, end)].to_string()
    }

    pub fn metas(&self) -> &[CharMeta] {
        &self.chars
    }

    /// Maximal runs of each style, ordered by start offset then style.
    pub fn style_ranges(&self) -> Vec<StyleRange> {
        let mut ranges = Vec::new();
        for style in InlineStyle::ALL {
            ranges.extend(
                runs_where(&self.chars, move |m| m.styles.contains(style))
                    .map(|range| StyleRange { style, range }),
            );
        }
        ranges.sort_by_key(|r| (r.range.start, r.style));
        ranges
    }

    /// Maximal runs of each entity, in offset order.
    pub fn entity_ranges(&self) -> Vec<EntityRange> {
        let mut ranges = Vec::new();
        let mut i = 0;
        while i < self.chars.len() {
            match self.chars[i].entity {
                Some(entity) => {
                    let start = i;
                    while i < self.chars.len() && self.chars[i].entity == Some(entity) {
                        i += 1;
                    }
                    ranges.push(EntityRange {
                        entity,
                        range: start..i,
                    });
                }
                None => i += 1,
            }
        }
        ranges
    }

    /// Maximal runs of identical metadata covering the whole block.
    pub fn segments(&self) -> Vec<(Range<usize>, CharMeta)> {
        let mut out: Vec<(Range<usize>, CharMeta)> = Vec::new();
        for (i, meta) in self.chars.iter().enumerate() {
            match out.last_mut() {
                Some((range, last)) if last == meta => range.end = i + 1,
                _ => out.push((i..i + 1, *meta)),
            }
        }
        out
    }

    /// The maximal run of `style` containing `offset`.
    pub fn style_run_at(&self, offset: usize, style: InlineStyle) -> Option<Range<usize>> {
        self.run_around(offset, |m| m.styles.contains(style))
    }

    /// The entity at `offset` and its maximal run.
    pub fn entity_run_at(&self, offset: usize) -> Option<(EntityKey, Range<usize>)> {
        let entity = self.entity_at(offset)?;
        let range = self.run_around(offset, |m| m.entity == Some(entity))?;
        Some((entity, range))
    }

    fn run_around(&self, offset: usize, pred: impl Fn(&CharMeta) -> bool) -> Option<Range<usize>> {
        if !pred(self.chars.get(offset)?) {
            return None;
        }
        let start = self.chars[..offset]
            .iter()
            .rposition(|m| !pred(m))
            .map_or(0, |i| i + 1);
        let end = self.chars[offset..]
            .iter()
            .position(|m| !pred(m))
            .map_or(self.chars.len(), |i| offset + i);
        Some(start..end)
    }

    // Mutation is crate-private: documents clone a block and edit the copy.

    pub(crate) fn set_block_type(&mut self, block_type: BlockType) {
        self.block_type = block_type;
    }

    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Replaces `range` with `insert`, every inserted char carrying `meta`.
    pub(crate) fn splice(&mut self, range: Range<usize>, insert: &str, meta: CharMeta) {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let byte_start = byte_offset(&self.text, start);
        let byte_end = byte_offset(&self.text, end);
        self.text.replace_range(byte_start..byte_end, insert);
        self.chars.splice(
            start..end,
            std::iter::repeat_n(meta, insert.chars().count()),
        );
    }

    /// Applies `f` to the metadata of every char in `range`.
    pub(crate) fn update_meta(&mut self, range: Range<usize>, f: impl Fn(&mut CharMeta)) {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        self.chars[start..end].iter_mut().for_each(f);
    }

    /// Cuts the block at `offset`, returning the tail text and metadata.
    pub(crate) fn split_off(&mut self, offset: usize) -> (String, Vec<CharMeta>) {
        let offset = offset.min(self.len());
        let byte = byte_offset(&self.text, offset);
        let text = self.text.split_off(byte);
        let chars = self.chars.split_off(offset);
        (text, chars)
    }

    pub(crate) fn append(&mut self, text: &str, chars: &[CharMeta]) {
        debug_assert_eq!(text.chars().count(), chars.len());
        self.text.push_str(text);
        self.chars.extend_from_slice(chars);
    }
}

fn runs_where<'a>(
    chars: &'a [CharMeta],
    pred: impl Fn(&CharMeta) -> bool + 'a,
) -> impl Iterator<Item = Range<usize>> + 'a {
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < chars.len() && !pred(&chars[i]) {
            i += 1;
        }
        if i >= chars.len() {
            return None;
        }
        let start = i;
        while i < chars.len() && pred(&chars[i]) {
            i += 1;
        }
        Some(start..i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bold() -> CharMeta {
        CharMeta::styled(StyleSet::EMPTY.with(InlineStyle::Bold))
    }

    #[test]
    fn new_block_has_plain_metadata() {
        let block = Block::new(BlockType::Paragraph, "héllo");
        assert_eq!(block.len(), 5);
        assert!(block.style_ranges().is_empty());
        assert!(block.entity_ranges().is_empty());
    }

    #[test]
    fn splice_shifts_following_metadata() {
        let mut block = Block::new(BlockType::Paragraph, "");
        block.splice(0..0, "bold", bold());
        block.splice(0..0, ">> ", CharMeta::default());

        assert_eq!(block.text(), ">> bold");
        assert_eq!(
            block.style_ranges(),
            vec![StyleRange {
                style: InlineStyle::Bold,
                range: 3..7
            }]
        );
    }

    #[test]
    fn splice_inside_run_splits_it() {
        let mut block = Block::new(BlockType::Paragraph, "");
        block.splice(0..0, "abcd", bold());
        block.splice(2..2, "-", CharMeta::default());

        let ranges: Vec<_> = block.style_ranges().into_iter().map(|r| r.range).collect();
        assert_eq!(ranges, vec![0..2, 3..5]);
    }

    #[test]
    fn splice_removing_run_truncates_it() {
        let mut block = Block::new(BlockType::Paragraph, "xx");
        block.splice(2..2, "abcd", bold());
        block.splice(1..4, "", CharMeta::default());

        assert_eq!(block.text(), "xcd");
        let ranges: Vec<_> = block.style_ranges().into_iter().map(|r| r.range).collect();
        assert_eq!(ranges, vec![1..3]);
    }

    #[test]
    fn style_run_at_finds_maximal_run() {
        let mut block = Block::new(BlockType::Paragraph, "a ");
        block.splice(2..2, "bold", bold());
        block.splice(6..6, " z", CharMeta::default());

        assert_eq!(block.style_run_at(4, InlineStyle::Bold), Some(2..6));
        assert_eq!(block.style_run_at(1, InlineStyle::Bold), None);
        assert_eq!(block.style_run_at(99, InlineStyle::Bold), None);
    }

    #[test]
    fn entity_runs_are_disjoint() {
        let mut block = Block::new(BlockType::Paragraph, "");
        let link = |key| CharMeta {
            styles: StyleSet::EMPTY,
            entity: Some(EntityKey(key)),
        };
        block.splice(0..0, "ab", link(1));
        block.splice(2..2, "cd", link(2));

        assert_eq!(
            block.entity_ranges(),
            vec![
                EntityRange {
                    entity: EntityKey(1),
                    range: 0..2
                },
                EntityRange {
                    entity: EntityKey(2),
                    range: 2..4
                },
            ]
        );
        assert_eq!(block.entity_run_at(3), Some((EntityKey(2), 2..4)));
    }

    #[test]
    fn split_off_and_append_round_trip() {
        let mut block = Block::new(BlockType::Paragraph, "héllo wörld");
        let (tail, metas) = block.split_off(6);
        assert_eq!(block.text(), "héllo ");
        assert_eq!(tail, "wörld");
        block.append(&tail, &metas);
        assert_eq!(block.text(), "héllo wörld");
        assert_eq!(block.len(), 11);
    }

    #[test]
    fn segments_group_identical_metadata() {
        let mut block = Block::new(BlockType::Paragraph, "ab");
        block.splice(2..2, "cd", bold());
        let segments: Vec<_> = block.segments().into_iter().map(|(r, _)| r).collect();
        assert_eq!(segments, vec![0..2, 2..4]);
    }

    #[test]
    fn block_type_names_round_trip() {
        for block_type in BlockType::ALL {
            assert_eq!(BlockType::parse(block_type.as_str()), Some(block_type));
        }
        assert_eq!(BlockType::heading(3), Some(BlockType::HeadingThree));
        assert_eq!(BlockType::heading(7), None);
    }

    #[test]
    fn style_set_iterates_in_table_order() {
        let set: StyleSet = [InlineStyle::Code, InlineStyle::Bold].into_iter().collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![InlineStyle::Bold, InlineStyle::Code]
        );
        assert!(set.without(InlineStyle::Code).contains(InlineStyle::Bold));
        assert!(!set.without(InlineStyle::Code).contains(InlineStyle::Code));
    }
}
