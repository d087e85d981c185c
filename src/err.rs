//! Error and diagnostic types shared by every stage of the toolchain.
//!
//! Two families of failures exist:
//! - [`Diagnostic`]s, which are collected and returned by [`lex`], [`parse`], and [`validate`].
//!   These never abort a stage.
//! - Fatal errors ([`AsmErr`], [`SimErr`]), which indicate the generator or simulator
//!   was given input it cannot safely continue with.
//!
//! All of these types implement [`Error`], which adds help text and span information
//! on top of [`std::error::Error`].
//!
//! [`lex`]: crate::parse::lex::lex
//! [`parse`]: crate::parse::parse
//! [`validate`]: crate::validate::validate
//! [`AsmErr`]: crate::asm::AsmErr
//! [`SimErr`]: crate::sim::SimErr
use std::borrow::Cow;
use std::ops::Range;

pub use crate::parse::lex::LexErr;

/// A location in source text.
///
/// Both fields are zero-based. `offset` is a byte offset into the source string.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default, PartialOrd, Ord)]
pub struct Position {
    /// Absolute byte offset.
    pub offset: usize,
    /// Line number (the count of newlines before `offset`).
    pub line: usize,
}
impl Position {
    /// Creates a new position.
    pub fn new(offset: usize, line: usize) -> Self {
        Self { offset, line }
    }
}

/// A positional, human-readable message about some range of the source.
///
/// This is the shape every editor-facing consumer reads:
/// the `start`/`end` span maps directly onto an editor decoration.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Diagnostic {
    /// Start of the offending range.
    pub start: Position,
    /// End of the offending range (exclusive).
    pub end: Position,
    /// The message.
    pub message: String,
}
impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(start: Position, end: Position, message: impl Into<String>) -> Self {
        Self { start, end, message: message.into() }
    }

    /// The byte range of the source this diagnostic covers.
    pub fn span(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }
}
impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.start.line + 1, self.start.offset, self.message)
    }
}

/// Unified error interface for all errors in this crate.
///
/// Note that the [`std::fmt::Display`] implementation is used for the brief message,
/// and [`Error::help`] is used for any further hints.
pub trait Error: std::error::Error {
    /// The range of source text this error applies to, if known.
    fn span(&self) -> Option<ErrSpan> {
        None
    }

    /// Any helpful hint text for the error.
    fn help(&self) -> Option<Cow<str>>;
}

/// Source span of an error.
///
/// Most errors apply to one contiguous range, but some (e.g., a label defined twice)
/// point at two.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrSpan {
    /// One contiguous span.
    One(Range<usize>),
    /// Two contiguous spans.
    Two([Range<usize>; 2]),
}
impl ErrSpan {
    /// Gets the first span.
    pub fn first(&self) -> Range<usize> {
        match self {
            ErrSpan::One(r)      => r.clone(),
            ErrSpan::Two([r, _]) => r.clone(),
        }
    }

    /// Gets an iterator over all of the spans.
    pub fn iter(&self) -> impl Iterator<Item = &Range<usize>> {
        match self {
            ErrSpan::One(r) => std::slice::from_ref(r).iter(),
            ErrSpan::Two(r) => r.iter(),
        }
    }
}
impl From<Range<usize>> for ErrSpan {
    fn from(value: Range<usize>) -> Self {
        ErrSpan::One(value)
    }
}
impl From<[Range<usize>; 2]> for ErrSpan {
    fn from(value: [Range<usize>; 2]) -> Self {
        ErrSpan::Two(value)
    }
}
impl From<(Position, Position)> for ErrSpan {
    fn from((start, end): (Position, Position)) -> Self {
        ErrSpan::One(start.offset..end.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, ErrSpan, Position};

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(Position::new(6, 1), Position::new(9, 1), "Invalid character");
        assert_eq!(diag.to_string(), "2:6: Invalid character");
        assert_eq!(diag.span(), 6..9);
    }

    #[test]
    fn test_err_span() {
        let span = ErrSpan::from([0..3, 10..13]);
        assert_eq!(span.first(), 0..3);
        assert_eq!(span.iter().cloned().collect::<Vec<_>>(), vec![0..3, 10..13]);

        let span = ErrSpan::from((Position::new(4, 0), Position::new(8, 0)));
        assert_eq!(span, ErrSpan::One(4..8));
    }
}
