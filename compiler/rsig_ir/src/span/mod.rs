//! Source locations.
//!
//! A type may be declared piecewise across several files, so a byte span
//! alone is ambiguous. [`Location`] pairs a [`Span`] with the [`SourceId`] of
//! the file it points into.

use std::fmt;

/// Byte range within one source file.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from file start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for synthesized declarations.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Identifies the file a declaration was read from.
///
/// Allocation of ids is owned by the loader; the builder only compares them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceId(pub u32);

/// A span inside a specific source file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub source: SourceId,
    pub span: Span,
}

impl Location {
    /// Location for synthesized declarations.
    pub const DUMMY: Location = Location {
        source: SourceId(0),
        span: Span::DUMMY,
    };

    #[inline]
    pub const fn new(source: SourceId, span: Span) -> Self {
        Location { source, span }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{:?}", self.source.0, self.span)
    }
}
