//! The token alphabet produced by [`crate::lexer::lex`].

use crate::span::Span;

/// One classified unit of the input.
///
/// `Ident` only matters to the parser when it immediately follows an `Open`
/// token; everywhere else it (like `Whitespace` and `Text`) is just inert
/// content to be copied back out verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `{{`, only emitted when immediately followed by a valid identifier start.
    Open,
    /// `}}`
    Close,
    /// `::`
    Sep,
    /// A run matching `[A-Za-z_/][A-Za-z0-9_/\-]*`.
    Ident,
    /// A run of Unicode whitespace.
    Whitespace,
    /// Anything else, including a lone `:` that didn't pair up into a `Sep`.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
