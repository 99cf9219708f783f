//! # Pattern Kinds
//!
//! Each kind of markup owns its delimiter constants. The pattern table
//! builds its regexes from these, and markdown export re-inserts the same
//! strings, so detection and reconstruction can never drift apart.
//!
//! - **`BlockPrefix`**: `#`, `- `, `N. `, `> `
//! - **`Decorator`**: `**`, `*`, `` ` ``, `~~`
//! - **`MediaKind`**: image/video/audio extension lists and the `!` marker
//! - **`pairs`**: opener/closer table for auto-pairing

pub mod block_prefix;
pub mod inline_style;
pub mod media;
pub mod pairs;

pub use block_prefix::BlockPrefix;
pub use inline_style::Decorator;
pub use media::MediaKind;
