//! Resilient LL parser for the KE grammar.
//!
//! # Architecture
//!
//! This parser produces a lossless concrete syntax tree (CST) via Rowan's
//! green tree builder:
//!
//! - Zero-copy lexing: tokens carry spans, text sliced only when building
//!   tree nodes
//! - Trivia buffering: whitespace collected, then attached as leading trivia
//! - Checkpoint-based wrapping: retroactively wrap alternation branches
//! - The parser never fails on syntax errors—it always produces a tree, and
//!   records diagnostics separately
//!
//! # Grammar (EBNF-ish)
//!
//! ```text
//! pattern     = ( outer_literal / braces )*
//! braces      = '[' ws? ( ops_matches / either / matches )? ws? ']'
//! ops_matches = op ( ws op )* ( ws matches )?
//! op          = word (':' word)?
//! either      = matches ( ws? '|' ws? matches )+
//! matches     = match ( ws match )*
//! match       = inner_literal / def / macro / braces
//! macro       = '#' ( range / name )
//! def         = macro '=' ( braces / inner_literal / macro )
//! ```
//!
//! Whitespace between items is required, except that the boundary
//! immediately before `[` or after `]` counts as whitespace.

mod ast;
mod core;
mod grammar;
mod lexer;
mod syntax_kind;

#[cfg(test)]
mod tests;

pub use ast::{Braces, Branch, Def, InnerLit, MacroRef, Match, Op, OuterLit, RangeMacro, Root, RootItem};
pub use syntax_kind::{KeLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

use crate::diagnostics::{Diagnostic, RenderOptions, render_diagnostics};
use lexer::lex;
use rowan::NodeOrToken;
use std::fmt::Write;

/// Parse result containing the green tree and any errors.
///
/// The tree is always complete—errors are recorded separately and also
/// represented as `SyntaxKind::Error` nodes in the tree itself.
#[derive(Debug, Clone)]
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<Diagnostic>,
}

impl Parse {
    /// Creates a typed view over the immutable green tree.
    /// This is cheap—SyntaxNode is a thin wrapper with parent pointers.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn root(&self) -> Root {
        Root::cast(self.syntax()).expect("parser always produces Root")
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render errors as a human-readable string using annotate-snippets.
    pub fn render_errors(&self, source: &str) -> String {
        render_diagnostics(source, &self.errors, None, RenderOptions::plain())
    }

    /// Debug dump of the CST, trivia omitted.
    pub fn dump_cst(&self) -> String {
        let mut out = String::new();
        format_cst(&self.syntax(), 0, &mut out).expect("String write never fails");
        out
    }
}

fn format_cst(node: &SyntaxNode, indent: usize, w: &mut impl Write) -> std::fmt::Result {
    let prefix = "  ".repeat(indent);
    writeln!(w, "{}{:?}", prefix, node.kind())?;

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => format_cst(&n, indent + 1, w)?,
            NodeOrToken::Token(t) => {
                if !t.kind().is_trivia() {
                    let child_prefix = "  ".repeat(indent + 1);
                    writeln!(w, "{}{:?} {:?}", child_prefix, t.kind(), t.text())?;
                }
            }
        }
    }
    Ok(())
}

/// Main entry point. Never fails; check [`Parse::errors`].
pub fn parse(source: &str) -> Parse {
    let mut parser = core::Parser::new(source, lex(source));
    parser.parse_root();
    let (green, errors) = parser.finish();
    Parse { green, errors }
}
