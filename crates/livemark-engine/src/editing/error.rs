use crate::models::{BlockKey, EntityKey};

/// A write primitive or edit step was asked to do something the document
/// cannot satisfy. The caller keeps its prior state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockKey),
    #[error("Offset {offset} out of range for block {key} of length {len}")]
    InvalidOffset {
        key: BlockKey,
        offset: usize,
        len: usize,
    },
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityKey),
    #[error("Entity {0} is immutable")]
    ImmutableEntity(EntityKey),
    #[error("Block {0} is atomic and holds no text")]
    AtomicBlockText(BlockKey),
    #[error("Range spans blocks {start} and {end}")]
    CrossBlockRange { start: BlockKey, end: BlockKey },
}
