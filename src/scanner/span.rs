//! Spans and edit records
//!
//! All positions are UTF-8 byte offsets into the buffer. A [`Span`] is the
//! half-open range `[start, start + len)`; an [`EditRecord`] describes one
//! replacement and owns the position translation law used to carry
//! pre-edit positions into post-edit coordinates.

use serde::{Deserialize, Serialize};
use std::ops::Range;

// =============================================================================
// Span
// =============================================================================

/// Half-open byte range over the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Span covering `start..end`. An inverted range yields an empty span at `start`.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            len: end.saturating_sub(start),
        }
    }

    /// Exclusive end position
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Exclusive end, or `None` when `start + len` overflows
    pub fn checked_end(&self) -> Option<usize> {
        self.start.checked_add(self.len)
    }

    /// True when the span lies inside `[0, len]`
    pub fn fits_within(&self, len: usize) -> bool {
        self.checked_end().is_some_and(|end| end <= len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end()
    }

    /// True when both spans share at least one position
    pub fn intersects(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end() && other.start < self.end()
    }

    /// Overlapping part of two spans, if any position is shared
    pub fn intersection(&self, other: &Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        (start < end).then(|| Span::from_bounds(start, end))
    }

    /// Smallest span covering both
    pub fn cover(&self, other: &Span) -> Span {
        Span::from_bounds(self.start.min(other.start), self.end().max(other.end()))
    }

    /// Same span moved right by `offset` (fragment → buffer coordinates)
    pub fn offset_by(&self, offset: usize) -> Span {
        Span::new(self.start + offset, self.len)
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::from_bounds(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.to_range()
    }
}

// =============================================================================
// EditRecord
// =============================================================================

/// One committed replacement, expressed against the pre-edit buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    /// Replaced range in pre-edit coordinates
    pub range: Span,
    /// Byte length of the inserted text
    pub replacement_len: usize,
    /// Net length change: `replacement_len - range.len`
    pub delta: i64,
}

impl EditRecord {
    pub fn new(range: Span, replacement_len: usize) -> Self {
        Self {
            range,
            replacement_len,
            delta: replacement_len as i64 - range.len as i64,
        }
    }

    /// Where the inserted text lives after the edit
    pub fn post_edit_range(&self) -> Span {
        Span::new(self.range.start, self.replacement_len)
    }

    /// Position translation law.
    ///
    /// Positions at or after the edit start move by `delta` (clamped at zero);
    /// positions strictly before it are untouched.
    pub fn adjust(&self, position: usize) -> usize {
        if position >= self.range.start {
            (position as i64 + self.delta).max(0) as usize
        } else {
            position
        }
    }

    /// The edit shrank the buffer
    pub fn is_deletion(&self) -> bool {
        self.delta < 0
    }
}

// =============================================================================
// Tests
// =============================================================================
