//! Syntax kinds for the KE grammar.
//!
//! `SyntaxKind` serves dual roles: token kinds (from lexer) and node kinds
//! (from parser). Logos derives token recognition for the bracket-interior
//! tokens; node kinds and lexer-synthesized kinds lack token/regex
//! attributes. `KeLang` implements Rowan's `Language` trait for tree
//! construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST` sentinel.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("[")]
    BracketOpen = 0,

    #[token("]")]
    BracketClose,

    #[token("|")]
    Pipe,

    #[token("=")]
    Equals,

    #[token(":")]
    Colon,

    /// `#` followed by token characters: a macro reference, a range macro
    /// like `#a..f`, or the name part of a definition. The parser
    /// classifies by content and by lookahead for `=`.
    #[regex(r"#[A-Za-z0-9!$%&()*+,./;<>?@\\^_`{}~-]+")]
    MacroName,

    /// Quoted inner literal. No escape sequences; use the other quote
    /// character for literals containing one.
    #[regex(r"'[^']*'")]
    #[regex(r#""[^"]*""#)]
    #[doc(hidden)]
    StringLiteral, // Lexer-internal only

    /// A quote with no closing partner. Stops at brackets so delimiter
    /// tracking survives the error.
    #[regex(r"'[^'\[\]]*")]
    #[regex(r#""[^"\[\]]*"#)]
    UnterminatedString,

    /// Bareword: operator names, quantifier counts, operator arguments.
    /// `=` and `:` have syntactic meaning and are not part of the token.
    #[regex(r"[A-Za-z0-9!$%&()*+,./;<>?@\\^_`{}~-]+")]
    Word,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    DoubleQuote,
    SingleQuote,
    /// String content between quotes
    StrVal,
    /// A run of top-level text outside any brackets
    OuterText,
    /// Coalesced unrecognized characters
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Root,
    OuterLit,
    Braces,
    Op,
    Branch,
    InnerLit,
    MacroRef,
    RangeMacro,
    Def,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeLang {}

impl Language for KeLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<KeLang>;
pub type SyntaxToken = rowan::SyntaxToken<KeLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// FIRST set of a match inside braces.
    pub const MATCH_FIRST: TokenSet =
        TokenSet::new(&[BracketOpen, MacroName, SingleQuote, DoubleQuote]);
}
