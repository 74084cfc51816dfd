//! Recursive-descent parser turning a token stream into a [`Document`] CST.
//!
//! Grammar:
//! ```text
//! document   := item*
//! item       := plaintext | invocation
//! invocation := OPEN IDENT (SEP argument)* CLOSE
//! argument   := (argText | invocation)*
//! ```
//!
//! The parser never fails: a missing `CLOSE` is synthesized
//! ([`CloseToken::Synthetic`]) and recorded as a [`ParserError`] rather than
//! aborting the document. Legacy single-colon (`{{name:arg}}`) and
//! whitespace-delimited (`{{name arg}}`) forms are recognized by inspecting
//! the raw character immediately following the identifier, per the
//! documented ambiguity: once legacy mode is entered, the remainder up to
//! the closing brace is exactly one argument, `::` included.

use crate::cst::{Argument, CloseToken, Document, Invocation, Item};
use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};

/// Matches the walker's default recursion cap (§5 of the design notes).
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub document: Document,
    pub errors: Vec<ParserError>,
}

#[must_use]
pub fn parse(chars: &[char], tokens: &[Token]) -> ParseOutput {
    parse_with_depth(chars, tokens, DEFAULT_MAX_NESTING_DEPTH)
}

#[must_use]
pub fn parse_with_depth(chars: &[char], tokens: &[Token], max_depth: usize) -> ParseOutput {
    let mut parser = Parser { chars, tokens, pos: 0, errors: Vec::new(), max_depth };
    let items = parser.parse_items(0);
    ParseOutput { document: Document { items }, errors: parser.errors }
}

struct Parser<'a> {
    chars: &'a [char],
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<ParserError>,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn current_offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.chars.len(), |t| t.span.start)
    }

    fn starts_invocation(&self) -> bool {
        self.peek_kind() == Some(TokenKind::Open)
    }

    fn parse_items(&mut self, depth: usize) -> Vec<Item> {
        let mut items = Vec::new();
        let mut pending: Option<Span> = None;
        while self.pos < self.tokens.len() {
            if self.starts_invocation() {
                if let Some(span) = pending.take() {
                    items.push(Item::Plaintext(span));
                }
                items.push(Item::Invocation(self.parse_invocation(depth)));
            } else {
                let tok = self.tokens[self.pos];
                pending = Some(pending.map_or(tok.span, |p| p.join(tok.span)));
                self.pos += 1;
            }
        }
        if let Some(span) = pending {
            items.push(Item::Plaintext(span));
        }
        items
    }

    /// Consumes `OPEN IDENT` (both guaranteed present by [`Self::starts_invocation`]
    /// and the lexer's open-lookahead contract) and dispatches on what follows.
    fn parse_invocation(&mut self, depth: usize) -> Invocation {
        let open_tok = self.tokens[self.pos];
        self.pos += 1;
        let ident_tok = self.tokens[self.pos];
        self.pos += 1;
        let name = ident_tok.span.slice(self.chars);

        if depth >= self.max_depth {
            self.errors.push(ParserError {
                message: format!(
                    "invocation '{name}' exceeds maximum nesting depth ({})",
                    self.max_depth
                ),
                span: open_tok.span,
            });
            return self.finish_with_args(open_tok, ident_tok, name, Vec::new());
        }

        match self.peek_kind() {
            None | Some(TokenKind::Close) => self.finish_with_args(open_tok, ident_tok, name, Vec::new()),
            Some(TokenKind::Sep) => {
                let args = self.parse_standard_args(depth);
                self.finish_with_args(open_tok, ident_tok, name, args)
            }
            _ => {
                let arg = self.parse_legacy_arg(depth);
                self.finish_with_args(open_tok, ident_tok, name, vec![arg])
            }
        }
    }

    fn finish_with_args(
        &mut self,
        open_tok: Token,
        ident_tok: Token,
        name: String,
        arguments: Vec<Argument>,
    ) -> Invocation {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Close => {
                self.pos += 1;
                Invocation { open: open_tok.span, ident: ident_tok.span, name, arguments, close: CloseToken::Real(t.span) }
            }
            _ => {
                let pos = Position::from_offset(self.chars, open_tok.span.start);
                self.errors.push(ParserError {
                    message: format!(
                        "unterminated invocation '{name}' starting at line {}, column {}",
                        pos.line, pos.column
                    ),
                    span: open_tok.span,
                });
                Invocation { open: open_tok.span, ident: ident_tok.span, name, arguments, close: CloseToken::Synthetic }
            }
        }
    }

    /// Standard `::`-separated argument list: `SEP argument` repeated.
    fn parse_standard_args(&mut self, depth: usize) -> Vec<Argument> {
        let mut args = Vec::new();
        while self.peek_kind() == Some(TokenKind::Sep) {
            self.pos += 1;
            let start = self.current_offset();
            let nested = self.scan_argument_content(depth, true);
            let end = self.current_offset();
            args.push(Argument { span: Span::new(start, end), nested });
        }
        args
    }

    /// Legacy single-argument form: triggered by a single `:` or any
    /// whitespace/other content immediately after the identifier (anything
    /// that isn't `::` or `}}`). Consumes exactly one separating character
    /// (the colon, or the first whitespace code point) and then captures
    /// everything up to the matching `CLOSE` as one argument, ignoring any
    /// `::` encountered along the way.
    fn parse_legacy_arg(&mut self, depth: usize) -> Argument {
        let start = match self.peek() {
            Some(t) if t.kind == TokenKind::Whitespace => t.span.start + 1,
            Some(t) if t.kind == TokenKind::Text && t.span.len() == 1 && self.chars[t.span.start] == ':' => {
                self.pos += 1;
                t.span.end
            }
            Some(t) => t.span.start,
            None => self.current_offset(),
        };
        let nested = self.scan_argument_content(depth, false);
        let end = self.current_offset().max(start);
        Argument { span: Span::new(start, end), nested }
    }

    /// Scans forward collecting nested invocations until a terminator: always
    /// `CLOSE` or end of input; additionally `SEP` when `stop_at_sep` (the
    /// standard, non-legacy, argument form).
    fn scan_argument_content(&mut self, depth: usize, stop_at_sep: bool) -> Vec<Invocation> {
        let mut nested = Vec::new();
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::Close) => break,
                Some(TokenKind::Sep) if stop_at_sep => break,
                Some(TokenKind::Open) => nested.push(self.parse_invocation(depth + 1)),
                _ => self.pos += 1,
            }
        }
        nested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn run(input: &str) -> (Vec<char>, ParseOutput) {
        let chars: Vec<char> = input.chars().collect();
        let lexed = lex(&chars);
        let out = parse(&chars, &lexed.tokens);
        (chars, out)
    }

    #[test]
    fn zero_arg_invocation() {
        let (_, out) = run("{{user}}");
        assert_eq!(out.document.items.len(), 1);
        match &out.document.items[0] {
            Item::Invocation(inv) => {
                assert_eq!(inv.name, "user");
                assert!(inv.arguments.is_empty());
                assert!(matches!(inv.close, CloseToken::Real(_)));
            }
            Item::Plaintext(_) => panic!("expected invocation"),
        }
    }

    #[test]
    fn standard_args_split_on_sep() {
        let (_, out) = run("{{roll::1d6}}");
        match &out.document.items[0] {
            Item::Invocation(inv) => assert_eq!(inv.arguments.len(), 1),
            _ => panic!("expected invocation"),
        }
    }

    #[test]
    fn legacy_colon_is_one_argument() {
        let (chars, out) = run("{{name:a::b}}");
        match &out.document.items[0] {
            Item::Invocation(inv) => {
                assert_eq!(inv.arguments.len(), 1);
                assert_eq!(inv.arguments[0].span.slice(&chars), "a::b");
            }
            _ => panic!("expected invocation"),
        }
    }

    #[test]
    fn unterminated_invocation_is_synthetic_and_warns() {
        let (_, out) = run("{{user");
        assert_eq!(out.errors.len(), 1);
        match &out.document.items[0] {
            Item::Invocation(inv) => assert!(inv.close.is_synthetic()),
            _ => panic!("expected invocation"),
        }
    }

    #[test]
    fn nested_invocation_inside_argument() {
        let (_, out) = run("{{reverse::{{newline}}}}");
        match &out.document.items[0] {
            Item::Invocation(inv) => {
                assert_eq!(inv.name, "reverse");
                assert_eq!(inv.arguments[0].nested.len(), 1);
                assert_eq!(inv.arguments[0].nested[0].name, "newline");
            }
            _ => panic!("expected invocation"),
        }
    }
}
