//! Offset arithmetic for rewrites that add or remove syntax around a run.
//!
//! Both maps keep an offset at the same place in the human-readable text:
//! a caret between `b` and `o` in `bold` stays between them whether the run
//! is shown as `bold` or as `**bold**`.

use std::ops::Range;

/// Maps an offset through wrapping `run` in `open` + `close` chars of syntax.
pub fn map_through_wrap(offset: usize, run: &Range<usize>, open: usize, close: usize) -> usize {
    if offset <= run.start {
        offset
    } else if offset <= run.end {
        offset + open
    } else {
        offset + open + close
    }
}

/// Maps an offset through replacing `outer` by the `inner` text it encloses.
///
/// Offsets inside the removed syntax snap to the nearest edge of the kept text.
pub fn map_through_unwrap(offset: usize, outer: &Range<usize>, inner: &Range<usize>) -> usize {
    let open = inner.start - outer.start;
    let removed = outer.len() - inner.len();
    if offset <= outer.start {
        offset
    } else if offset >= outer.end {
        offset - removed
    } else if offset <= inner.start {
        outer.start
    } else if offset <= inner.end {
        offset - open
    } else {
        inner.end - open
    }
}
