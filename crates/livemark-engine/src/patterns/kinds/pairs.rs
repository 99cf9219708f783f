//! Bracket and quote pairs for auto-pairing.

/// Opener to closer, in table order.
pub const PAIRS: [(char, char); 8] = [
    ('*', '*'),
    ('`', '`'),
    ('~', '~'),
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('"', '"'),
    ('\'', '\''),
];

pub fn closer_for(opener: char) -> Option<char> {
    PAIRS
        .iter()
        .find(|(open, _)| *open == opener)
        .map(|(_, close)| *close)
}

pub fn is_closer(ch: char) -> bool {
    PAIRS.iter().any(|(_, close)| *close == ch)
}

/// True when `open` followed by `close` is a registered pair.
pub fn is_pair(open: char, close: char) -> bool {
    closer_for(open) == Some(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        assert_eq!(closer_for('('), Some(')'));
        assert_eq!(closer_for(')'), None);
        assert!(is_closer(')'));
        assert!(is_closer('*'));
        assert!(!is_closer('a'));
        assert!(is_pair('"', '"'));
        assert!(!is_pair('(', ']'));
    }
}
