//! Tokenizes raw input into the alphabet in [`crate::token`].
//!
//! The lexer never fails. A malformed `{{` that isn't followed by a valid
//! identifier start is not a lexer error in the sense of aborting anything —
//! it just isn't emitted as an `Open` token, and the attempt is recorded in
//! [`LexOutput::errors`] as a syntax warning for the caller to surface.

use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

#[must_use]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '/'
}

#[must_use]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '/' || c == '-'
}

/// True when `chars[i..]` starts a valid `{{` open delimiter, i.e. is
/// immediately followed by a valid identifier-start character.
fn match_open(chars: &[char], i: usize) -> bool {
    chars.get(i) == Some(&'{')
        && chars.get(i + 1) == Some(&'{')
        && chars.get(i + 2).is_some_and(|&c| is_ident_start(c))
}

fn match_close(chars: &[char], i: usize) -> bool {
    chars.get(i) == Some(&'}') && chars.get(i + 1) == Some(&'}')
}

fn match_sep(chars: &[char], i: usize) -> bool {
    chars.get(i) == Some(&':') && chars.get(i + 1) == Some(&':')
}

/// Tokenizes `chars` (a code-point buffer) into a flat, gap-free token stream.
///
/// Every code point belongs to exactly one token; offsets are non-decreasing
/// and strictly ordered, per the lexer's ordering contract. Spans are
/// half-open, as everywhere else in this crate.
#[must_use]
pub fn lex(chars: &[char]) -> LexOutput {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let len = chars.len();
    let mut i = 0usize;

    while i < len {
        if match_open(chars, i) {
            tokens.push(Token::new(TokenKind::Open, Span::new(i, i + 2)));
            i += 2;
        } else if match_close(chars, i) {
            tokens.push(Token::new(TokenKind::Close, Span::new(i, i + 2)));
            i += 2;
        } else if match_sep(chars, i) {
            tokens.push(Token::new(TokenKind::Sep, Span::new(i, i + 2)));
            i += 2;
        } else if is_ident_start(chars[i]) {
            let start = i;
            let mut j = i + 1;
            while j < len && is_ident_continue(chars[j]) {
                j += 1;
            }
            tokens.push(Token::new(TokenKind::Ident, Span::new(start, j)));
            i = j;
        } else if chars[i].is_whitespace() {
            let start = i;
            let mut j = i + 1;
            while j < len && chars[j].is_whitespace() {
                j += 1;
            }
            tokens.push(Token::new(TokenKind::Whitespace, Span::new(start, j)));
            i = j;
        } else {
            if chars[i] == '{' && chars.get(i + 1) == Some(&'{') {
                let pos = Position::from_offset(chars, i);
                errors.push(LexError {
                    message: format!(
                        "dangling '{{{{' not followed by a valid identifier at line {}, column {}",
                        pos.line, pos.column
                    ),
                    span: Span::new(i, i + 2),
                });
            }
            tokens.push(Token::new(TokenKind::Text, Span::new(i, i + 1)));
            i += 1;
        }
    }

    coalesce(&mut tokens);
    LexOutput { tokens, errors }
}

/// Merges adjacent same-kind `Text` tokens produced by the one-code-point-at-a-time
/// fallback path, so a run of ordinary punctuation reads as a single plaintext
/// token rather than many. Purely cosmetic: correctness never depends on it.
fn coalesce(tokens: &mut Vec<Token>) {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens.drain(..) {
        if let (TokenKind::Text, Some(last)) = (tok.kind, out.last_mut()) {
            if last.kind == TokenKind::Text && last.span.end == tok.span.start {
                last.span.end = tok.span.end;
                continue;
            }
        }
        out.push(tok);
    }
    *tokens = out;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn plain_text_has_no_tokens_but_text() {
        let c = chars("hello world");
        let out = lex(&c);
        assert!(out.errors.is_empty());
        assert!(out.tokens.iter().any(|t| t.kind == TokenKind::Ident));
        assert!(out.tokens.iter().any(|t| t.kind == TokenKind::Whitespace));
    }

    #[test]
    fn simple_invocation_tokenizes() {
        let c = chars("{{user}}");
        let out = lex(&c);
        assert_eq!(
            out.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Open, TokenKind::Ident, TokenKind::Close]
        );
    }

    #[test]
    fn dangling_open_is_not_tokenized_as_open() {
        let c = chars("{{ hehe");
        let out = lex(&c);
        assert!(!out.tokens.iter().any(|t| t.kind == TokenKind::Open));
        assert_eq!(out.errors.len(), 1);
    }

    #[test]
    fn quadruple_brace_splits_into_text_then_open() {
        let c = chars("{{{{char}}");
        let out = lex(&c);
        let kinds: Vec<_> = out.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Text, TokenKind::Open, TokenKind::Ident, TokenKind::Close]
        );
        assert_eq!(out.tokens[0].span, Span::new(0, 2));
    }

    #[test]
    fn lone_colon_is_its_own_text_token() {
        let c = chars("{{name:arg}}");
        let out = lex(&c);
        let colon = out
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::Text)
            .expect("colon token");
        assert_eq!(colon.span.slice(&c), ":");
    }
}
