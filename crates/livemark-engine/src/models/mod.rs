pub mod block;
pub mod chars;
pub mod entity;
pub mod selection;

pub use block::{Block, BlockKey, BlockType, CharMeta, EntityRange, InlineStyle, StyleRange, StyleSet};
pub use entity::{Entity, EntityData, EntityKey, EntityMap, EntityType, Mutability};
pub use selection::{Position, Selection};
