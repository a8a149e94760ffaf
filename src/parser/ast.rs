//! Typed AST wrappers over CST nodes.
//!
//! Each wrapper type is named after the `SyntaxKind` it covers, so the
//! `ast_node!` macro takes a single name. Casting checks the kind once;
//! accessors assume nothing beyond it - validation happens elsewhere.

use rowan::TextRange;

use super::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                match node.kind() {
                    SyntaxKind::$name => Some(Self(node)),
                    _ => None,
                }
            }

            pub fn syntax(&self) -> &SyntaxNode {
                &self.0
            }

            pub fn text_range(&self) -> TextRange {
                self.0.text_range()
            }
        }
    };
}

ast_node!(Root);
ast_node!(OuterLit);
ast_node!(Braces);
ast_node!(Op);
ast_node!(Branch);
ast_node!(InnerLit);
ast_node!(MacroRef);
ast_node!(RangeMacro);
ast_node!(Def);

/// A top-level item: literal text or a bracket group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootItem {
    OuterLit(OuterLit),
    Braces(Braces),
}

impl RootItem {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::OuterLit => OuterLit::cast(node).map(RootItem::OuterLit),
            SyntaxKind::Braces => Braces::cast(node).map(RootItem::Braces),
            _ => None,
        }
    }
}

/// Anything that can appear in match position inside braces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Match {
    InnerLit(InnerLit),
    MacroRef(MacroRef),
    RangeMacro(RangeMacro),
    Def(Def),
    Braces(Braces),
}

impl Match {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::InnerLit => InnerLit::cast(node).map(Match::InnerLit),
            SyntaxKind::MacroRef => MacroRef::cast(node).map(Match::MacroRef),
            SyntaxKind::RangeMacro => RangeMacro::cast(node).map(Match::RangeMacro),
            SyntaxKind::Def => Def::cast(node).map(Match::Def),
            SyntaxKind::Braces => Braces::cast(node).map(Match::Braces),
            _ => None,
        }
    }

    pub fn text_range(&self) -> TextRange {
        match self {
            Match::InnerLit(n) => n.text_range(),
            Match::MacroRef(n) => n.text_range(),
            Match::RangeMacro(n) => n.text_range(),
            Match::Def(n) => n.text_range(),
            Match::Braces(n) => n.text_range(),
        }
    }
}

impl Root {
    pub fn items(&self) -> impl Iterator<Item = RootItem> + '_ {
        self.0.children().filter_map(RootItem::cast)
    }
}

impl OuterLit {
    /// The literal text, exactly as written in the source.
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }
}

impl Braces {
    pub fn ops(&self) -> impl Iterator<Item = Op> + '_ {
        self.0.children().filter_map(Op::cast)
    }

    pub fn has_ops(&self) -> bool {
        self.ops().next().is_some()
    }

    pub fn branches(&self) -> impl Iterator<Item = Branch> + '_ {
        self.0.children().filter_map(Branch::cast)
    }

    pub fn is_either(&self) -> bool {
        self.branches().next().is_some()
    }

    /// Direct matches of this group. Excludes matches nested inside
    /// alternation branches; use [`branches`](Self::branches) for those.
    pub fn matches(&self) -> impl Iterator<Item = Match> + '_ {
        self.0.children().filter_map(Match::cast)
    }

    /// Definitions scoped to this group: direct ones and those written
    /// inside alternation branches (visibility is the whole group).
    pub fn defs(&self) -> impl Iterator<Item = Def> + '_ {
        let direct = self.matches().filter_map(|m| match m {
            Match::Def(d) => Some(d),
            _ => None,
        });
        let in_branches = self.branches().flat_map(|b| {
            b.matches()
                .filter_map(|m| match m {
                    Match::Def(d) => Some(d),
                    _ => None,
                })
                .collect::<Vec<_>>()
        });
        direct.chain(in_branches)
    }
}

impl Branch {
    pub fn matches(&self) -> impl Iterator<Item = Match> + '_ {
        self.0.children().filter_map(Match::cast)
    }
}

impl Op {
    fn words(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::Word)
    }

    /// The operator word itself.
    pub fn name(&self) -> Option<SyntaxToken> {
        self.words().next()
    }

    /// The argument after `:`, if any.
    pub fn arg(&self) -> Option<SyntaxToken> {
        self.words().nth(1)
    }
}

impl InnerLit {
    /// The content between the quotes; empty for `''`.
    pub fn value(&self) -> String {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::StrVal)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}

impl MacroRef {
    /// The `#name` token.
    pub fn name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::MacroName)
    }
}

impl RangeMacro {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::MacroName)
    }

    /// The two endpoint characters, when the range has the valid
    /// single-character `#a..b` shape.
    pub fn endpoints(&self) -> Option<(char, char)> {
        let token = self.token()?;
        let text = token.text().strip_prefix('#')?;
        let chars: Vec<char> = text.chars().collect();
        match chars.as_slice() {
            [a, '.', '.', b] => Some((*a, *b)),
            _ => None,
        }
    }
}

impl Def {
    /// The `#name` token being defined.
    pub fn name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::MacroName)
    }

    /// The definition body: the single match after `=`.
    pub fn body(&self) -> Option<Match> {
        self.0.children().filter_map(Match::cast).next()
    }
}
