//! Lexer for the KE grammar.
//!
//! Produces span-based tokens without storing text - text is sliced from
//! source only when needed.
//!
//! ## Two-mode scanning
//!
//! The KE grammar is context-dependent: outside brackets any run of
//! characters is literal text, while bracket interiors have real token
//! structure. `lex` hand-scans the top level (everything up to the next
//! `[` or `]` becomes a single `OuterText` token) and drives the Logos
//! lexer over bracket interiors, tracking bracket depth to know when the
//! top level resumes. A stray `]` at the top level becomes a lone
//! `BracketClose` for the parser to report.
//!
//! ## Error handling
//!
//! The lexer coalesces consecutive error characters into single `Garbage`
//! tokens rather than producing one error per character. This keeps the
//! token stream manageable for malformed input.

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

use super::syntax_kind::SyntaxKind;

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes source into a vector of span-based tokens.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let bracket = rest.find(['[', ']']);
        let run = bracket.unwrap_or(rest.len());
        if run > 0 {
            tokens.push(Token::new(
                SyntaxKind::OuterText,
                range_to_text_range(pos..pos + run),
            ));
        }
        let Some(offset) = bracket else { break };
        let at = pos + offset;
        if rest.as_bytes()[offset] == b']' {
            tokens.push(Token::new(
                SyntaxKind::BracketClose,
                range_to_text_range(at..at + 1),
            ));
            pos = at + 1;
        } else {
            pos = lex_braces(source, at, &mut tokens);
        }
    }

    tokens
}

/// Lexes a bracketed region starting at the `[` at `start`. Returns the
/// offset just past the matching `]`, or `source.len()` if unclosed.
fn lex_braces(source: &str, start: usize, tokens: &mut Vec<Token>) -> usize {
    let mut lexer = SyntaxKind::lexer(&source[start..]);
    let mut depth = 0usize;
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                let span = start + lexer.span().start..start + lexer.span().end;
                if let Some(garbage_start) = error_start.take() {
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        range_to_text_range(garbage_start..span.start),
                    ));
                }

                match kind {
                    SyntaxKind::BracketOpen => {
                        depth += 1;
                        tokens.push(Token::new(kind, range_to_text_range(span)));
                    }
                    SyntaxKind::BracketClose => {
                        depth -= 1;
                        let end = span.end;
                        tokens.push(Token::new(kind, range_to_text_range(span)));
                        if depth == 0 {
                            return end;
                        }
                    }
                    SyntaxKind::StringLiteral => split_string_literal(source, span, tokens),
                    _ => tokens.push(Token::new(kind, range_to_text_range(span))),
                }
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(start + lexer.span().start);
                }
            }
            None => {
                if let Some(garbage_start) = error_start.take() {
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        range_to_text_range(garbage_start..source.len()),
                    ));
                }
                return source.len();
            }
        }
    }
}

/// Splits a string literal token into: quote + content + quote
fn split_string_literal(source: &str, span: Range<usize>, tokens: &mut Vec<Token>) {
    let text = &source[span.clone()];
    let quote_char = text.chars().next().expect("string literal is non-empty");
    let quote_kind = if quote_char == '"' {
        SyntaxKind::DoubleQuote
    } else {
        SyntaxKind::SingleQuote
    };

    let start = span.start;
    let end = span.end;

    tokens.push(Token::new(
        quote_kind,
        range_to_text_range(start..start + 1),
    ));

    if end - start > 2 {
        tokens.push(Token::new(
            SyntaxKind::StrVal,
            range_to_text_range(start + 1..end - 1),
        ));
    }

    tokens.push(Token::new(quote_kind, range_to_text_range(end - 1..end)));
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[std::ops::Range::<usize>::from(token.span)]
}
