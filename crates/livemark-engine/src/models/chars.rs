//! Conversions between char offsets (what every block offset counts) and
//! byte offsets (what `str` slicing and `regex` report).

use std::ops::Range;

/// Byte index of the `offset`-th char of `text`, or `text.len()` past the end.
pub fn byte_offset(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Number of chars in `text[..byte]`. `byte` must sit on a char boundary.
pub fn char_offset(text: &str, byte: usize) -> usize {
    text.get(..byte).map_or_else(|| text.chars().count(), |s| s.chars().count())
}

/// Converts a byte range reported by a regex match into a char range.
pub fn char_range(text: &str, bytes: Range<usize>) -> Range<usize> {
    let start = char_offset(text, bytes.start);
    let len = text
        .get(bytes.start..bytes.end)
        .map_or(0, |s| s.chars().count());
    start..start + len
}
