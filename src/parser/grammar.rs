//! Grammar productions for the KE language.
//!
//! This module implements all `parse_*` methods as an extension of `Parser`.
//! A braces body is classified by its first token: a bareword opens the
//! operator form, anything else is a matches sequence, promoted to an
//! alternation when `|` appears at that level.

use super::core::Parser;
use super::syntax_kind::SyntaxKind;
use super::syntax_kind::token_sets::MATCH_FIRST;
use crate::diagnostics::{Diagnostic, ErrorKind, Fix};

impl Parser<'_> {
    pub fn parse_root(&mut self) {
        self.start_node(SyntaxKind::Root);

        if self.source.is_empty() {
            self.errors.push(Diagnostic::error_at(
                ErrorKind::Syntax,
                0.into(),
                "empty pattern; use [] to match the empty string",
            ));
        }

        while !self.eof() {
            match self.peek() {
                SyntaxKind::OuterText => {
                    self.start_node(SyntaxKind::OuterLit);
                    self.bump();
                    self.finish_node();
                }
                SyntaxKind::BracketOpen => self.parse_braces(),
                SyntaxKind::BracketClose => {
                    let span = self.current_span();
                    self.error_with_fix(
                        ErrorKind::Syntax,
                        span,
                        "unmatched ']'",
                        Fix::new("[']']", "brackets must be quoted inside a group to match literally"),
                    );
                    self.bump_as_error();
                }
                _ => self.error_and_bump(ErrorKind::Syntax, "unexpected token"),
            }
        }

        self.drain_trivia();
        self.finish_node();
    }

    /// Bracket group: `[` body? `]`. The body is operators + matches, an
    /// alternation, or a plain matches sequence.
    fn parse_braces(&mut self) {
        if !self.enter_recursion() {
            self.error(ErrorKind::Syntax, "pattern is nested too deeply");
            self.start_node(SyntaxKind::Error);
            while !self.eof() {
                self.bump();
            }
            self.finish_node();
            return;
        }

        self.start_node(SyntaxKind::Braces);
        self.push_delimiter();
        self.bump(); // consume '['

        if self.peek() == SyntaxKind::Word && !self.next_is(SyntaxKind::Equals) {
            self.parse_ops_then_matches();
        } else {
            self.parse_matches_or_either();
        }

        let open = self.pop_delimiter();
        if !self.eat(SyntaxKind::BracketClose) {
            if let Some(open) = open {
                self.error_unclosed_delimiter(
                    "unclosed '['; expected ']'",
                    "bracket opened here",
                    open.span,
                );
            }
        }

        self.finish_node();
        self.exit_recursion();
    }

    /// Operator form: one or more ops, then an optional matches sequence.
    /// `|` is not allowed at this level.
    fn parse_ops_then_matches(&mut self) {
        self.parse_op();
        while self.peek() == SyntaxKind::Word {
            self.require_separation();
            self.parse_op();
        }

        loop {
            let kind = self.peek();
            if kind == SyntaxKind::BracketClose || self.eof() {
                break;
            }
            if kind == SyntaxKind::Pipe {
                self.error(
                    ErrorKind::Syntax,
                    "a group cannot mix operators with '|' alternation; nest the alternation in its own brackets",
                );
                self.bump_as_error();
                continue;
            }
            if self.at_set(MATCH_FIRST) {
                self.require_separation();
                self.parse_match();
                continue;
            }
            self.parse_unexpected_in_braces();
        }
    }

    /// Operator: `word` or `word:arg`.
    fn parse_op(&mut self) {
        self.start_node(SyntaxKind::Op);
        self.bump(); // Word

        if self.peek() == SyntaxKind::Colon {
            self.bump();
            if self.peek() == SyntaxKind::Word {
                self.bump();
            } else {
                self.error(ErrorKind::Syntax, "expected an argument after ':'");
            }
        }

        self.finish_node();
    }

    /// Matches sequence, promoted to an alternation when `|` appears:
    /// each pipe-separated run of matches is wrapped in a `Branch` node
    /// via checkpointing.
    fn parse_matches_or_either(&mut self) {
        let mut branch_checkpoint = self.checkpoint();
        let mut in_either = false;
        let mut item_count = 0usize;

        loop {
            let kind = self.peek();
            if kind == SyntaxKind::BracketClose || self.eof() {
                break;
            }
            if kind == SyntaxKind::Pipe {
                if item_count == 0 {
                    self.error(ErrorKind::Syntax, "alternation branch is empty");
                }
                self.start_node_at(branch_checkpoint, SyntaxKind::Branch);
                self.finish_node();
                in_either = true;
                self.bump(); // consume '|'
                branch_checkpoint = self.checkpoint();
                item_count = 0;
                continue;
            }
            if self.at_set(MATCH_FIRST) {
                if item_count > 0 {
                    self.require_separation();
                }
                self.parse_match();
                item_count += 1;
                continue;
            }
            self.parse_unexpected_in_braces();
        }

        if in_either {
            if item_count == 0 {
                self.error(ErrorKind::Syntax, "alternation branch is empty");
            }
            self.start_node_at(branch_checkpoint, SyntaxKind::Branch);
            self.finish_node();
        }
    }

    /// A single match: inner literal, macro use, definition, or nested braces.
    fn parse_match(&mut self) {
        match self.peek() {
            SyntaxKind::SingleQuote | SyntaxKind::DoubleQuote => self.parse_inner_lit(),
            SyntaxKind::MacroName => self.parse_macro(),
            SyntaxKind::BracketOpen => self.parse_braces(),
            _ => self.parse_unexpected_in_braces(),
        }
    }

    /// Quoted literal: quote + optional content + quote.
    fn parse_inner_lit(&mut self) {
        self.start_node(SyntaxKind::InnerLit);
        let quote = self.peek();
        self.bump();
        if self.peek() == SyntaxKind::StrVal {
            self.bump();
        }
        // The lexer splits terminated strings, so the partner quote is present
        self.expect(quote, "closing quote");
        self.finish_node();
    }

    /// `#name`, `#a..f`, or `#name=`: classified by content and lookahead.
    fn parse_macro(&mut self) {
        if self.next_is(SyntaxKind::Equals) {
            self.parse_def();
        } else {
            self.parse_macro_use();
        }
    }

    /// Macro reference or range macro, by the shape of the name.
    fn parse_macro_use(&mut self) {
        let kind = if is_range_shaped(self.current_text()) {
            SyntaxKind::RangeMacro
        } else {
            SyntaxKind::MacroRef
        };
        self.start_node(kind);
        self.bump();
        self.finish_node();
    }

    /// Definition: `#name=` followed by a single match as the body.
    fn parse_def(&mut self) {
        self.start_node(SyntaxKind::Def);

        let name = self.current_text().to_string();
        let span = self.current_span();
        self.bump(); // MacroName
        if is_range_shaped(&name) {
            self.errors.push(Diagnostic::error(
                ErrorKind::Syntax,
                span,
                format!("`{}` is a range, not a valid definition name", name),
            ));
        }

        self.expect(SyntaxKind::Equals, "'='");

        match self.peek() {
            SyntaxKind::BracketOpen => self.parse_braces(),
            SyntaxKind::SingleQuote | SyntaxKind::DoubleQuote => self.parse_inner_lit(),
            SyntaxKind::MacroName if !self.next_is(SyntaxKind::Equals) => self.parse_macro_use(),
            _ => self.error(
                ErrorKind::Syntax,
                "expected a pattern after '=' in definition",
            ),
        }

        self.finish_node();
    }

    /// Report and consume a token that cannot start a match.
    fn parse_unexpected_in_braces(&mut self) {
        match self.peek() {
            SyntaxKind::Word => {
                let text = self.current_text().to_string();
                let span = self.current_span();
                if self.next_is(SyntaxKind::Equals) {
                    self.error_with_fix(
                        ErrorKind::Syntax,
                        span,
                        "definition names must start with '#'",
                        Fix::new(format!("#{}", text), format!("write `#{}` to define a macro", text)),
                    );
                } else {
                    self.error_with_fix(
                        ErrorKind::Syntax,
                        span,
                        format!("bareword `{}` is not a pattern; operators must come first in a group", text),
                        Fix::new(format!("'{}'", text), "quote it to match literally"),
                    );
                }
                self.bump_as_error();
            }
            SyntaxKind::UnterminatedString => {
                self.error_and_bump(ErrorKind::Syntax, "unterminated string literal");
            }
            SyntaxKind::Garbage => {
                self.error_and_bump(ErrorKind::Syntax, "unrecognized characters");
            }
            SyntaxKind::Equals | SyntaxKind::Colon => {
                let text = self.current_text().to_string();
                self.error_and_bump(ErrorKind::Syntax, format!("unexpected `{}`", text));
            }
            _ => {
                self.error_and_bump(ErrorKind::Syntax, "unexpected token");
            }
        }
    }
}

/// `x..y` shape: anything containing `..` is treated as a range attempt,
/// so malformed ranges report as range errors rather than unknown macros.
fn is_range_shaped(name: &str) -> bool {
    name.trim_start_matches('#').contains("..")
}
