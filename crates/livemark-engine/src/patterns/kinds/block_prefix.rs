use crate::models::BlockType;

/// Line prefixes that turn a paragraph into a typed block.
pub struct BlockPrefix;

impl BlockPrefix {
    pub const HEADING: char = '#';
    pub const BULLET: &'static str = "- ";
    /// Follows the digit of an ordered item.
    pub const ORDERED: &'static str = ". ";
    pub const QUOTE: &'static str = "> ";

    /// Block types that have a prefix rule, in matching order.
    pub const RULE_ORDER: [BlockType; 9] = [
        BlockType::HeadingOne,
        BlockType::HeadingTwo,
        BlockType::HeadingThree,
        BlockType::HeadingFour,
        BlockType::HeadingFive,
        BlockType::HeadingSix,
        BlockType::UnorderedItem,
        BlockType::OrderedItem,
        BlockType::Blockquote,
    ];

    fn heading(level: usize) -> String {
        format!("{} ", Self::HEADING.to_string().repeat(level))
    }

    /// Regex for the prefix of `block_type`: group 1 is the consumed prefix,
    /// group 2 the kept text.
    pub fn pattern(block_type: BlockType) -> Option<String> {
        if let Some(level) = block_type.heading_level() {
            return Some(format!("(?s)^({})(.*)$", Self::heading(level)));
        }
        let prefix = match block_type {
            BlockType::UnorderedItem => format!(r"\s*{}", regex::escape(Self::BULLET)),
            BlockType::OrderedItem => format!(r"\s*\d+{}", regex::escape(Self::ORDERED)),
            BlockType::Blockquote => format!(r"\s*{}", regex::escape(Self::QUOTE)),
            _ => return None,
        };
        Some(format!("(?s)^({prefix})(.*)$"))
    }

    /// The prefix markdown export writes for `block_type`. Ordered items
    /// take their 1-based position in the current run of ordered items.
    pub fn render(block_type: BlockType, depth: usize, ordinal: usize) -> String {
        if let Some(level) = block_type.heading_level() {
            return Self::heading(level);
        }
        let indent = "  ".repeat(depth);
        match block_type {
            BlockType::UnorderedItem => format!("{indent}{}", Self::BULLET),
            BlockType::OrderedItem => format!("{indent}{ordinal}{}", Self::ORDERED),
            BlockType::Blockquote => Self::QUOTE.to_string(),
            _ => String::new(),
        }
    }
}
