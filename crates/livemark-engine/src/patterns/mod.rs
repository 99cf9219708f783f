//! # Pattern Table
//!
//! Three ordered rule families, compiled once and shared read-only:
//!
//! 1. **Block rules** turn a paragraph's line prefix into a block type.
//! 2. **Inline rules** find decorator-delimited runs (`**bold**`).
//! 3. **Media rules** find `![alt](src)` media and `[text](href)` links.
//!
//! Within a family the first rule in table order that matches anywhere in
//! the text wins. Every offset reported here counts chars.

pub mod kinds;

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::chars::char_range;
use crate::models::{BlockType, InlineStyle};
pub use kinds::{BlockPrefix, Decorator, MediaKind};

pub struct BlockRule {
    pub block_type: BlockType,
    regex: Regex,
}

/// A prefix match: the prefix always starts at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatch {
    pub block_type: BlockType,
    pub prefix_len: usize,
}

impl BlockRule {
    pub fn find(&self, text: &str) -> Option<BlockMatch> {
        let caps = self.regex.captures(text)?;
        let prefix = caps.get(1)?;
        Some(BlockMatch {
            block_type: self.block_type,
            prefix_len: char_range(text, prefix.range()).end,
        })
    }
}

pub struct InlineRule {
    pub style: InlineStyle,
    pub decorator: &'static str,
    regex: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMatch {
    pub style: InlineStyle,
    /// The whole match, decorators included.
    pub outer: Range<usize>,
    /// The text between the decorators.
    pub inner: Range<usize>,
}

impl InlineRule {
    pub fn find(&self, text: &str) -> Option<InlineMatch> {
        let caps = self.regex.captures(text)?;
        Some(InlineMatch {
            style: self.style,
            outer: char_range(text, caps.get(0)?.range()),
            inner: char_range(text, caps.get(1)?.range()),
        })
    }
}

pub struct MediaRule {
    pub kind: MediaKind,
    regex: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMatch {
    pub kind: MediaKind,
    pub outer: Range<usize>,
    /// Char range of the bracketed text: link text or media alt.
    pub text_range: Range<usize>,
    pub text: String,
    pub target: String,
    pub title: Option<String>,
}

impl MediaRule {
    pub fn find(&self, text: &str) -> Option<MediaMatch> {
        let caps = self.regex.captures(text)?;
        let label = caps.name("text")?;
        Some(MediaMatch {
            kind: self.kind,
            outer: char_range(text, caps.get(0)?.range()),
            text_range: char_range(text, label.range()),
            text: label.as_str().to_string(),
            target: caps.name("target")?.as_str().to_string(),
            title: caps.name("title").map(|m| m.as_str().to_string()),
        })
    }
}

pub struct PatternTable {
    pub block: Vec<BlockRule>,
    pub inline: Vec<InlineRule>,
    pub media: Vec<MediaRule>,
}

impl PatternTable {
    fn build() -> Self {
        let block = BlockPrefix::RULE_ORDER
            .into_iter()
            .filter_map(|block_type| {
                let pattern = BlockPrefix::pattern(block_type)?;
                Some(BlockRule {
                    block_type,
                    regex: Regex::new(&pattern).expect("Invalid block prefix regex"),
                })
            })
            .collect();
        let inline = Decorator::RULE_ORDER
            .into_iter()
            .filter_map(|style| {
                let pattern = Decorator::pattern(style)?;
                Some(InlineRule {
                    style,
                    decorator: Decorator::of(style)?,
                    regex: Regex::new(&pattern).expect("Invalid inline style regex"),
                })
            })
            .collect();
        let media = MediaKind::RULE_ORDER
            .into_iter()
            .map(|kind| MediaRule {
                kind,
                regex: Regex::new(&kind.pattern()).expect("Invalid media regex"),
            })
            .collect();
        Self {
            block,
            inline,
            media,
        }
    }

    pub fn first_block_match(&self, text: &str) -> Option<BlockMatch> {
        self.block.iter().find_map(|rule| rule.find(text))
    }

    pub fn first_inline_match(&self, text: &str) -> Option<InlineMatch> {
        self.inline.iter().find_map(|rule| rule.find(text))
    }

    pub fn first_media_match(&self, text: &str) -> Option<MediaMatch> {
        self.media.iter().find_map(|rule| rule.find(text))
    }

    pub fn decorator(&self, style: InlineStyle) -> Option<&'static str> {
        self.inline
            .iter()
            .find(|rule| rule.style == style)
            .map(|rule| rule.decorator)
    }
}

/// The process-wide pattern table.
pub fn table() -> &'static PatternTable {
    static TABLE: OnceLock<PatternTable> = OnceLock::new();
    TABLE.get_or_init(PatternTable::build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("# ", BlockType::HeadingOne, 2)]
    #[case("## title", BlockType::HeadingTwo, 3)]
    #[case("###### deep", BlockType::HeadingSix, 7)]
    #[case("- item", BlockType::UnorderedItem, 2)]
    #[case("  - nested", BlockType::UnorderedItem, 4)]
    #[case("1. first", BlockType::OrderedItem, 3)]
    #[case("12. twelfth", BlockType::OrderedItem, 4)]
    #[case("> quote\nsecond line", BlockType::Blockquote, 2)]
    fn block_rules(#[case] text: &str, #[case] block_type: BlockType, #[case] prefix_len: usize) {
        assert_eq!(
            table().first_block_match(text),
            Some(BlockMatch {
                block_type,
                prefix_len
            })
        );
    }

    #[rstest]
    #[case("#no space")]
    #[case("####### seven")]
    #[case("text - not a list")]
    #[case("-")]
    fn block_rules_reject(#[case] text: &str) {
        assert_eq!(table().first_block_match(text), None);
    }

    #[rstest]
    #[case("a **bold** z", InlineStyle::Bold, 2..10, 4..8)]
    #[case("*it*", InlineStyle::Italic, 0..4, 1..3)]
    #[case("run `code` now", InlineStyle::Code, 4..10, 5..9)]
    #[case("~~gone~~", InlineStyle::Strikethrough, 0..8, 2..6)]
    #[case("ü**b**", InlineStyle::Bold, 1..6, 3..4)]
    fn inline_rules(
        #[case] text: &str,
        #[case] style: InlineStyle,
        #[case] outer: Range<usize>,
        #[case] inner: Range<usize>,
    ) {
        assert_eq!(
            table().first_inline_match(text),
            Some(InlineMatch {
                style,
                outer,
                inner
            })
        );
    }

    #[test]
    fn inline_rules_need_inner_text() {
        assert_eq!(table().first_inline_match("**"), None);
        assert_eq!(table().first_inline_match("``"), None);
    }

    #[test]
    fn bold_wins_over_italic() {
        let m = table().first_inline_match("*a* **b**").unwrap();
        assert_eq!(m.style, InlineStyle::Bold);
    }

    #[test]
    fn hyperlink_with_title() {
        let m = table()
            .first_media_match(r#"see [site](http://x.com "X site") now"#)
            .unwrap();
        assert_eq!(
            m,
            MediaMatch {
                kind: MediaKind::Hyperlink,
                outer: 4..33,
                text_range: 5..9,
                text: "site".into(),
                target: "http://x.com".into(),
                title: Some("X site".into()),
            }
        );
    }

    #[rstest]
    #[case("![cat](cat.png)", MediaKind::Image)]
    #[case("![cat](CAT.PNG?w=10)", MediaKind::Image)]
    #[case("![clip](a/b.mp4)", MediaKind::Video)]
    #[case("![song](tune.mp3 \"Tune\")", MediaKind::Audio)]
    #[case("![doc](notes.txt)", MediaKind::Hyperlink)]
    #[case("![my cat](my cat.png)", MediaKind::Image)]
    fn media_kinds(#[case] text: &str, #[case] kind: MediaKind) {
        assert_eq!(table().first_media_match(text).unwrap().kind, kind);
    }

    #[rstest]
    #[case("[a](my page.html)", "my page.html", None)]
    #[case(r#"[a](u"t")"#, "u", Some("t"))]
    #[case(r#"[a](my page.html "T")"#, "my page.html", Some("T"))]
    fn link_targets_may_hold_spaces(
        #[case] text: &str,
        #[case] target: &str,
        #[case] title: Option<&str>,
    ) {
        let m = table().first_media_match(text).unwrap();
        assert_eq!(m.target, target);
        assert_eq!(m.title.as_deref(), title);
    }

    #[test]
    fn incomplete_link_does_not_match() {
        assert_eq!(table().first_media_match("[site]("), None);
        assert_eq!(table().first_media_match("[site]()"), None);
    }
}
