//! Normalized regex IR.
//!
//! The lowering pass reduces the parse tree to this small set of tagged
//! variants; the emitter renders them per flavor. Flavor-specific fragments
//! never appear here—`AnyChar`, `ClassKind` and `AnchorKind` are resolved
//! to concrete syntax at emission time, which keeps the builtin macro table
//! flavor-neutral and the emitter total.

/// Character class shorthand, resolved per flavor and unicode option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Digit,
    Word,
    Space,
    Letter,
    Lowercase,
    Uppercase,
}

/// One member of a character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
    Class(ClassKind),
}

/// A character class: members plus a negation flag.
///
/// Negation exists only here. The `not` operator folds into this flag
/// during lowering, so the emitter never sees a standalone negation node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    pub items: Vec<ClassItem>,
    pub negated: bool,
}

impl CharClass {
    pub fn of(item: ClassItem) -> Self {
        Self {
            items: vec![item],
            negated: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    StartString,
    EndString,
    StartLine,
    EndLine,
    WordBoundary,
    NotWordBoundary,
}

/// Normalized regex IR node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ir {
    Literal(String),
    Concat(Vec<Ir>),
    Alt(Vec<Ir>),
    Repeat {
        inner: Box<Ir>,
        min: u32,
        /// `None` is unbounded.
        max: Option<u32>,
        greedy: bool,
    },
    Capture {
        inner: Box<Ir>,
        name: Option<String>,
    },
    Class(CharClass),
    Anchor(AnchorKind),
    AnyChar,
    CaseInsensitive(Box<Ir>),
}

impl Ir {
    pub fn empty() -> Ir {
        Ir::Concat(Vec::new())
    }

    /// Matches only the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Ir::Literal(s) => s.is_empty(),
            Ir::Concat(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Concatenation with local simplifications: nested concats are flattened,
/// empty pieces dropped, adjacent literals merged, singletons collapsed.
pub fn concat(items: Vec<Ir>) -> Ir {
    let mut merged: Vec<Ir> = Vec::with_capacity(items.len());
    flatten_into(items, &mut merged);

    if merged.len() == 1 {
        return merged.pop().expect("length checked");
    }
    Ir::Concat(merged)
}

fn flatten_into(items: Vec<Ir>, out: &mut Vec<Ir>) {
    for item in items {
        if item.is_empty() {
            continue;
        }
        match item {
            Ir::Concat(inner) => flatten_into(inner, out),
            Ir::Literal(text) => match out.last_mut() {
                Some(Ir::Literal(prev)) => prev.push_str(&text),
                _ => out.push(Ir::Literal(text)),
            },
            other => out.push(other),
        }
    }
}

/// Alternation. An alternation whose branches are all single characters or
/// positive classes folds into one positive class, which both shortens the
/// output and makes it eligible for `not`.
pub fn alt(branches: Vec<Ir>) -> Ir {
    if branches.len() < 2 {
        return concat(branches);
    }

    let folded: Option<Vec<ClassItem>> = branches
        .iter()
        .map(as_class_items)
        .try_fold(Vec::new(), |mut acc, items| {
            acc.extend(items?);
            Some(acc)
        });

    match folded {
        Some(items) => Ir::Class(CharClass {
            items,
            negated: false,
        }),
        None => Ir::Alt(branches),
    }
}

/// The members this node would contribute to a positive character class,
/// or `None` if it does not denote a single character.
fn as_class_items(ir: &Ir) -> Option<Vec<ClassItem>> {
    match ir {
        Ir::Literal(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(vec![ClassItem::Char(c)]),
                _ => None,
            }
        }
        Ir::Class(class) if !class.negated => Some(class.items.clone()),
        _ => None,
    }
}

/// Complement of a single-character expression, or `None` when the
/// expression has no complement (`not` on it is invalid).
pub fn invert(ir: Ir) -> Option<Ir> {
    match ir {
        Ir::Literal(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Ir::Class(CharClass {
                    items: vec![ClassItem::Char(c)],
                    negated: true,
                })),
                _ => None,
            }
        }
        Ir::Class(class) => Some(Ir::Class(CharClass {
            items: class.items,
            negated: !class.negated,
        })),
        Ir::Anchor(AnchorKind::WordBoundary) => Some(Ir::Anchor(AnchorKind::NotWordBoundary)),
        Ir::Anchor(AnchorKind::NotWordBoundary) => Some(Ir::Anchor(AnchorKind::WordBoundary)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_merges_adjacent_literals() {
        let ir = concat(vec![
            Ir::Literal("ab".into()),
            Ir::Literal("cd".into()),
            Ir::Class(CharClass::of(ClassItem::Class(ClassKind::Digit))),
            Ir::Literal("e".into()),
        ]);
        match ir {
            Ir::Concat(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[0], Ir::Literal("abcd".into()));
            }
            other => panic!("expected concat, got {:?}", other),
        }
    }

    #[test]
    fn concat_collapses_singleton() {
        let ir = concat(vec![Ir::Literal("a".into()), Ir::Literal("b".into())]);
        assert_eq!(ir, Ir::Literal("ab".into()));
    }

    #[test]
    fn concat_drops_empty_pieces() {
        let ir = concat(vec![Ir::Literal(String::new()), Ir::empty()]);
        assert!(ir.is_empty());
    }

    #[test]
    fn concat_flattens_nested() {
        let inner = Ir::Concat(vec![
            Ir::Literal("a".into()),
            Ir::Anchor(AnchorKind::EndLine),
        ]);
        let ir = concat(vec![inner, Ir::Literal("b".into())]);
        match ir {
            Ir::Concat(items) => assert_eq!(items.len(), 3),
            other => panic!("expected concat, got {:?}", other),
        }
    }

    #[test]
    fn alt_folds_single_chars_into_class() {
        let ir = alt(vec![Ir::Literal("a".into()), Ir::Literal("b".into())]);
        assert_eq!(
            ir,
            Ir::Class(CharClass {
                items: vec![ClassItem::Char('a'), ClassItem::Char('b')],
                negated: false,
            })
        );
    }

    #[test]
    fn alt_folds_classes_and_ranges() {
        let digit = Ir::Class(CharClass::of(ClassItem::Class(ClassKind::Digit)));
        let af = Ir::Class(CharClass::of(ClassItem::Range('a', 'f')));
        let ir = alt(vec![digit, af]);
        assert_eq!(
            ir,
            Ir::Class(CharClass {
                items: vec![
                    ClassItem::Class(ClassKind::Digit),
                    ClassItem::Range('a', 'f')
                ],
                negated: false,
            })
        );
    }

    #[test]
    fn alt_keeps_multichar_branches() {
        let ir = alt(vec![Ir::Literal("ab".into()), Ir::Literal("c".into())]);
        assert!(matches!(ir, Ir::Alt(_)));
    }

    #[test]
    fn alt_does_not_fold_negated_class() {
        // [^a] | b is not the same language as [ab]
        let not_a = invert(Ir::Literal("a".into())).unwrap();
        let ir = alt(vec![not_a, Ir::Literal("b".into())]);
        assert!(matches!(ir, Ir::Alt(_)));
    }

    #[test]
    fn invert_single_char() {
        let ir = invert(Ir::Literal("a".into())).unwrap();
        assert_eq!(
            ir,
            Ir::Class(CharClass {
                items: vec![ClassItem::Char('a')],
                negated: true,
            })
        );
    }

    #[test]
    fn invert_is_involution_on_classes() {
        let class = Ir::Class(CharClass::of(ClassItem::Class(ClassKind::Digit)));
        let twice = invert(invert(class.clone()).unwrap()).unwrap();
        assert_eq!(twice, class);
    }

    #[test]
    fn invert_word_boundary() {
        assert_eq!(
            invert(Ir::Anchor(AnchorKind::WordBoundary)),
            Some(Ir::Anchor(AnchorKind::NotWordBoundary))
        );
    }

    #[test]
    fn invert_rejects_multichar_and_anchors() {
        assert_eq!(invert(Ir::Literal("ab".into())), None);
        assert_eq!(invert(Ir::Anchor(AnchorKind::StartLine)), None);
        assert_eq!(invert(Ir::AnyChar), None);
    }
}
