//! The concrete syntax tree produced by [`crate::parser::parse`].

use crate::span::Span;

/// Marks whether an invocation's `}}` was actually present in the source or
/// inserted by the parser's error recovery.
///
/// The walker flattens any invocation whose close is `Synthetic` back to
/// plaintext (see `DESIGN.md`), while still expanding complete invocations
/// nested inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseToken {
    Real(Span),
    Synthetic,
}

impl CloseToken {
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        matches!(self, CloseToken::Synthetic)
    }
}

/// A single `{{...}}` invocation node.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub open: Span,
    pub ident: Span,
    /// The invocation name as written (not alias-resolved).
    pub name: String,
    pub arguments: Vec<Argument>,
    pub close: CloseToken,
}

impl Invocation {
    /// The canonical half-open `[start, end)` range of the whole invocation.
    ///
    /// For a synthetic close, `end` is one past the last offset actually
    /// consumed (the end of the last argument, or of the identifier if there
    /// were no arguments).
    #[must_use]
    pub fn range(&self) -> Span {
        let end = match self.close {
            CloseToken::Real(close_span) => close_span.end,
            CloseToken::Synthetic => self
                .arguments
                .last()
                .map_or(self.ident.end, |a| a.span.end),
        };
        Span::new(self.open.start, end)
    }
}

/// One `::`-delimited argument: a contiguous source range that may contain
/// nested invocations interleaved with raw text.
#[derive(Debug, Clone)]
pub struct Argument {
    pub span: Span,
    pub nested: Vec<Invocation>,
}

/// A top-level document item.
#[derive(Debug, Clone)]
pub enum Item {
    Plaintext(Span),
    Invocation(Invocation),
}

impl Item {
    #[must_use]
    pub fn range(&self) -> Span {
        match self {
            Item::Plaintext(span) => *span,
            Item::Invocation(inv) => inv.range(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub items: Vec<Item>,
}
