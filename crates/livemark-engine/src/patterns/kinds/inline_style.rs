use crate::models::InlineStyle;

/// Raw delimiters of the inline styles that have markdown syntax.
pub struct Decorator;

impl Decorator {
    pub const BOLD: &'static str = "**";
    pub const ITALIC: &'static str = "*";
    pub const CODE: &'static str = "`";
    pub const STRIKETHROUGH: &'static str = "~~";

    /// Styles with a decorator, in matching order. Bold precedes italic so
    /// `**x**` is never read as italic `*x*` with stray stars.
    pub const RULE_ORDER: [InlineStyle; 4] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Code,
        InlineStyle::Strikethrough,
    ];

    pub fn of(style: InlineStyle) -> Option<&'static str> {
        match style {
            InlineStyle::Bold => Some(Self::BOLD),
            InlineStyle::Italic => Some(Self::ITALIC),
            InlineStyle::Code => Some(Self::CODE),
            InlineStyle::Strikethrough => Some(Self::STRIKETHROUGH),
            InlineStyle::Underline => None,
        }
    }

    /// Decorator, lazily matched non-empty inner text, decorator.
    pub fn pattern(style: InlineStyle) -> Option<String> {
        let dec = regex::escape(Self::of(style)?);
        Some(format!("(?s){dec}(.+?){dec}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underline_has_no_syntax() {
        assert_eq!(Decorator::of(InlineStyle::Underline), None);
        assert_eq!(Decorator::pattern(InlineStyle::Underline), None);
    }

    #[test]
    fn decorators_are_escaped() {
        assert_eq!(
            Decorator::pattern(InlineStyle::Bold).as_deref(),
            Some(r"(?s)\*\*(.+?)\*\*")
        );
    }
}
