//! The `Pattern` facade: parse once, compile to any flavor.

use crate::diagnostics::{Diagnostics, RenderOptions, render_diagnostics};
use crate::options::Options;
use crate::parser::{self, Parse, Root, SyntaxNode};
use crate::{Error, Result, emit, lower};

/// A parsed KE pattern.
///
/// Construction always succeeds. Check [`is_valid`](Self::is_valid) or
/// [`errors`](Self::errors) to determine if the pattern is usable, then
/// [`to_regex`](Self::to_regex) to produce output for a flavor.
#[derive(Debug, Clone)]
pub struct Pattern<'a> {
    source: &'a str,
    parse: Parse,
}

impl<'a> Pattern<'a> {
    /// Parse a pattern from source text.
    ///
    /// This never fails. Errors are collected and accessible via
    /// [`errors`](Self::errors).
    pub fn new(source: &'a str) -> Self {
        let parse = parser::parse(source);
        Self { source, parse }
    }

    pub fn source(&self) -> &str {
        self.source
    }

    pub fn syntax(&self) -> SyntaxNode {
        self.parse.syntax()
    }

    pub fn root(&self) -> Root {
        self.parse.root()
    }

    pub fn is_valid(&self) -> bool {
        self.parse.is_valid()
    }

    pub fn errors(&self) -> &[crate::Diagnostic] {
        self.parse.errors()
    }

    /// Render parse errors as a human-readable string.
    pub fn render_errors(&self) -> String {
        self.parse.render_errors(self.source)
    }

    /// Debug dump of the CST, trivia omitted.
    pub fn dump_cst(&self) -> String {
        self.parse.dump_cst()
    }

    /// Translate to a regex string for the requested flavor.
    pub fn to_regex(&self, options: &Options) -> Result<String> {
        if !self.is_valid() {
            return Err(Error::Parse(Diagnostics::from(self.errors().to_vec())));
        }
        let ir = lower::lower(&self.root(), options)
            .map_err(|diagnostic| Error::Compile(Diagnostics::from(diagnostic)))?;
        Ok(emit::emit(&ir, options))
    }

    /// Render arbitrary diagnostics against this pattern's source.
    pub fn render_diagnostics(&self, diagnostics: &Diagnostics) -> String {
        render_diagnostics(
            self.source,
            diagnostics.as_slice(),
            None,
            RenderOptions::plain(),
        )
    }
}

/// Translate a KE source string into a regex for the target flavor.
pub fn compile(source: &str, options: &Options) -> Result<String> {
    Pattern::new(source).to_regex(options)
}

/// Alias for [`compile`].
pub fn re(source: &str, options: &Options) -> Result<String> {
    compile(source, options)
}
