//! Import and export.
//!
//! - **Raw content**: a JSON seed format holding blocks with style and
//!   entity ranges plus an entity map. Lossless for everything a `Document`
//!   holds except block keys that are not UUIDs, which are replaced.
//! - **Markdown**: every block written back with its raw syntax.

use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::editing::Document;
use crate::models::{
    Block, BlockKey, BlockType, CharMeta, Entity, EntityData, EntityKey, EntityMap, EntityType,
    InlineStyle, Mutability,
};
use crate::patterns::{BlockPrefix, Decorator, MediaKind};

#[derive(Debug, thiserror::Error)]
pub enum RawContentError {
    #[error("Invalid raw content JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),
    #[error("Unknown inline style: {0}")]
    UnknownStyle(String),
    #[error("Range {offset}+{length} out of bounds for block {block} of length {len}")]
    RangeOutOfBounds {
        block: usize,
        offset: usize,
        length: usize,
        len: usize,
    },
    #[error("Invalid entity key: {0}")]
    InvalidEntityKey(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: BTreeMap<String, RawEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(default)]
    pub key: Option<String>,
    pub text: String,
    #[serde(rename = "type", default = "paragraph")]
    pub block_type: String,
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<RawEntityRange>,
}

fn paragraph() -> String {
    BlockType::Paragraph.as_str().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub mutability: Mutability,
    pub data: EntityData,
}

pub fn to_raw(document: &Document) -> RawContent {
    let blocks = document
        .blocks()
        .iter()
        .map(|block| RawBlock {
            key: Some(block.key().to_string()),
            text: block.text().to_string(),
            block_type: block.block_type().as_str().to_string(),
            depth: block.depth(),
            inline_style_ranges: block
                .style_ranges()
                .into_iter()
                .map(|r| RawStyleRange {
                    offset: r.range.start,
                    length: r.range.len(),
                    style: r.style.as_str().to_string(),
                })
                .collect(),
            entity_ranges: block
                .entity_ranges()
                .into_iter()
                .map(|r| RawEntityRange {
                    offset: r.range.start,
                    length: r.range.len(),
                    key: r.entity.0,
                })
                .collect(),
        })
        .collect();
    let entity_map = document
        .entities()
        .iter()
        .map(|(key, entity)| {
            let raw = RawEntity {
                entity_type: entity.entity_type(),
                mutability: entity.mutability(),
                data: entity.data().clone(),
            };
            (key.to_string(), raw)
        })
        .collect();
    RawContent { blocks, entity_map }
}

pub fn from_raw(raw: RawContent) -> Result<Document, RawContentError> {
    let mut entities = EntityMap::default();
    for (key, entity) in raw.entity_map {
        let parsed = key
            .parse::<u64>()
            .map_err(|_| RawContentError::InvalidEntityKey(key.clone()))?;
        entities.insert_with_key(
            EntityKey(parsed),
            Entity::new(entity.entity_type, entity.mutability, entity.data),
        );
    }

    let mut seen = HashSet::new();
    let mut blocks = Vec::with_capacity(raw.blocks.len());
    for (index, raw_block) in raw.blocks.into_iter().enumerate() {
        let key = match raw_block.key.as_deref().map(Uuid::parse_str) {
            Some(Ok(uuid)) if seen.insert(uuid) => BlockKey(uuid),
            Some(_) => {
                log::warn!("block {index} has an unusable key, assigning a new one");
                BlockKey::new()
            }
            None => BlockKey::new(),
        };
        let block_type = BlockType::parse(&raw_block.block_type)
            .ok_or_else(|| RawContentError::UnknownBlockType(raw_block.block_type.clone()))?;
        let mut block = Block::with_key(key, block_type, &raw_block.text);
        block.set_depth(raw_block.depth);

        for range in &raw_block.inline_style_ranges {
            let style = InlineStyle::parse(&range.style)
                .ok_or_else(|| RawContentError::UnknownStyle(range.style.clone()))?;
            let span = checked_range(&block, index, range.offset, range.length)?;
            block.update_meta(span, |m| m.styles = m.styles.with(style));
        }
        for range in &raw_block.entity_ranges {
            let span = checked_range(&block, index, range.offset, range.length)?;
            let entity = EntityKey(range.key);
            if !entities.contains(entity) {
                log::warn!("block {index} references missing entity {entity}, skipping range");
                continue;
            }
            block.update_meta(span, |m| m.entity = Some(entity));
        }
        blocks.push(block);
    }
    Ok(Document::from_parts(blocks, entities))
}

fn checked_range(
    block: &Block,
    index: usize,
    offset: usize,
    length: usize,
) -> Result<Range<usize>, RawContentError> {
    match offset.checked_add(length) {
        Some(end) if end <= block.len() => Ok(offset..end),
        _ => Err(RawContentError::RangeOutOfBounds {
            block: index,
            offset,
            length,
            len: block.len(),
        }),
    }
}

pub fn to_json(document: &Document) -> Result<String, RawContentError> {
    Ok(serde_json::to_string_pretty(&to_raw(document))?)
}

pub fn from_json(json: &str) -> Result<Document, RawContentError> {
    from_raw(serde_json::from_str(json)?)
}

/// Writes every block back as raw markdown, one line per block.
pub fn to_markdown(document: &Document) -> String {
    let mut lines = Vec::with_capacity(document.blocks().len());
    let mut ordinals: Vec<usize> = Vec::new();
    for block in document.blocks() {
        let block_type = block.block_type();
        if block_type.is_list_item() {
            ordinals.truncate(block.depth() + 1);
            ordinals.resize(block.depth() + 1, 0);
            if block_type == BlockType::OrderedItem {
                ordinals[block.depth()] += 1;
            }
        } else {
            ordinals.clear();
        }

        if block.is_atomic() {
            lines.push(atomic_markdown(document, block));
            continue;
        }
        let ordinal = ordinals.get(block.depth()).copied().unwrap_or(0);
        let prefix = BlockPrefix::render(block_type, block.depth(), ordinal);
        let body = inline_markdown(document, block);
        let line = if block_type == BlockType::Blockquote {
            body.split('\n')
                .map(|l| format!("{prefix}{l}"))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            format!("{prefix}{body}")
        };
        lines.push(line);
    }
    lines.join("\n")
}

fn atomic_markdown(document: &Document, block: &Block) -> String {
    let entity = block.entity_at(0).and_then(|k| document.entity(k));
    match entity.map(|e| (e.entity_type(), e.data())) {
        Some((entity_type, EntityData::Media { src, alt, title })) => {
            MediaKind::from_entity_type(entity_type).render(alt, src, title.as_deref())
        }
        _ => String::new(),
    }
}

/// Block text with decorators and link syntax re-inserted.
fn inline_markdown(document: &Document, block: &Block) -> String {
    let mut out = String::new();
    let mut at = 0;
    for run in block.entity_ranges() {
        let link = document.entity(run.entity).and_then(|e| match e.data() {
            EntityData::Link { href, title } if e.entity_type() == EntityType::Hyperlink => {
                Some((href.as_str(), title.as_deref()))
            }
            _ => None,
        });
        let Some((href, title)) = link else {
            continue;
        };
        out.push_str(&styled_markdown(block, at..run.range.start));
        let text = styled_markdown(block, run.range.clone());
        out.push_str(&MediaKind::Hyperlink.render(&text, href, title));
        at = run.range.end;
    }
    out.push_str(&styled_markdown(block, at..block.len()));
    out
}

fn styled_markdown(block: &Block, range: Range<usize>) -> String {
    let mut out = String::new();
    let mut open: Vec<InlineStyle> = Vec::new();
    let close_all = |out: &mut String, styles: &mut Vec<InlineStyle>| {
        for style in styles.drain(..).rev() {
            out.push_str(Decorator::of(style).unwrap_or_default());
        }
    };
    for (segment, meta) in block.segments() {
        let start = segment.start.max(range.start);
        let end = segment.end.min(range.end);
        if start >= end {
            continue;
        }
        let CharMeta { styles, .. } = meta;
        // Close from the first style that ends here, reopening what continues.
        if let Some(pos) = open.iter().position(|s| !styles.contains(*s)) {
            let mut closing = open.split_off(pos);
            close_all(&mut out, &mut closing);
        }
        for style in styles.iter() {
            if let Some(decorator) = Decorator::of(style)
                && !open.contains(&style)
            {
                out.push_str(decorator);
                open.push(style);
            }
        }
        out.push_str(&block.slice(start..end));
    }
    close_all(&mut out, &mut open);
    out
}
