//! Byte spans into reference text
//!
//! Spans always address the *raw* reference text, before character references such as
//! `&#64;` are decoded, so diagnostics point at what the author actually wrote.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A byte offset span in a reference text
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: u32,
    /// Exclusive end offset
    pub end: u32,
}

impl Span {
    /// Create a span from its bounds
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// An empty span at `offset`
    pub fn empty(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    /// The span as a `usize` range, for slicing the text it was taken from
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Length in bytes
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span covers no text
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both `self` and `other`
    #[must_use]
    pub fn to(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Slice `text` by this span, yielding an empty string when out of bounds
    pub fn slice<'text>(&self, text: &'text str) -> &'text str {
        text.get(self.range()).unwrap_or_default()
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start as usize, span.len() as usize).into()
    }
}
