//! kleenexp: a compiler from Kleene Expression (KE) syntax to classic regex syntax.
//!
//! KE is a modern surface syntax for regular expressions. This crate
//! translates a KE pattern into a regex string for a target flavor; it does
//! not execute the result.
//!
//! # Example
//!
//! ```
//! use kleenexp::{Options, Pattern};
//!
//! let pattern = Pattern::new("[c 1+ #digit] bottles of [ci 'Beer']");
//!
//! if !pattern.is_valid() {
//!     eprintln!("{}", pattern.render_errors());
//! }
//! let regex = pattern.to_regex(&Options::default()).unwrap();
//! assert_eq!(regex, r"(\d+) bottles of (?i:Beer)");
//! ```

pub mod diagnostics;
pub mod parser;

mod emit;
mod ir;
mod lower;
mod macros;
mod options;
mod pattern;

#[cfg(test)]
mod pattern_tests;

pub use diagnostics::{Diagnostic, Diagnostics, ErrorKind, Severity};
pub use options::{Flavor, Options};
pub use pattern::{Pattern, compile, re};

/// Errors that can occur while compiling a pattern.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("pattern parsing failed with {} errors", .0.error_count())]
    Parse(Diagnostics),

    #[error("pattern compilation failed with {} errors", .0.error_count())]
    Compile(Diagnostics),
}

impl Error {
    /// The diagnostics behind this error, whatever the stage.
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Error::Parse(d) | Error::Compile(d) => d,
        }
    }
}

/// Result type for pattern operations.
pub type Result<T> = std::result::Result<T, Error>;
