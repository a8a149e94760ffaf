//! Rendering of the normalized IR to a regex string.
//!
//! A recursive walk over tagged variants. The parent decides grouping: an
//! alternation inside a concatenation gets a non-capturing group, a
//! quantified subexpression that is not already an atom gets one, and the
//! bodies of captures and flag groups stay bare. Escaping depends on the
//! emission context: top level and character-class interiors use different
//! escape sets.
//!
//! Emission is infallible; every flavor-capability check happened during
//! lowering.

use std::fmt::Write;

use crate::ir::{AnchorKind, CharClass, ClassItem, ClassKind, Ir};
use crate::options::{Flavor, Options};

pub fn emit(ir: &Ir, options: &Options) -> String {
    let mut out = String::new();
    emit_node(ir, options, &mut out);
    out
}

fn emit_node(ir: &Ir, options: &Options, out: &mut String) {
    match ir {
        Ir::Literal(text) => {
            for c in text.chars() {
                push_escaped(c, out);
            }
        }
        Ir::Concat(items) => {
            for item in items {
                emit_grouped(item, options, out);
            }
        }
        Ir::Alt(branches) => {
            for (i, branch) in branches.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                emit_node(branch, options, out);
            }
        }
        Ir::Repeat {
            inner,
            min,
            max,
            greedy,
        } => {
            emit_atom(inner, options, out);
            push_quantifier(*min, *max, *greedy, out);
        }
        Ir::Capture { inner, name } => {
            match (name, options.flavor) {
                (Some(name), Flavor::Pcre) => {
                    write!(out, "(?P<{}>", name).expect("String write never fails")
                }
                (Some(name), Flavor::EcmaScript) => {
                    write!(out, "(?<{}>", name).expect("String write never fails")
                }
                (None, _) => out.push('('),
            }
            emit_node(inner, options, out);
            out.push(')');
        }
        Ir::Class(class) => emit_class(class, options, out),
        Ir::Anchor(kind) => out.push_str(anchor_str(*kind, options.flavor)),
        Ir::AnyChar => out.push_str(match options.flavor {
            Flavor::Pcre => ".",
            Flavor::EcmaScript => r"[\s\S]",
        }),
        Ir::CaseInsensitive(inner) => {
            out.push_str("(?i:");
            emit_node(inner, options, out);
            out.push(')');
        }
    }
}

/// Emit as a sequence element: alternations need their own group.
fn emit_grouped(ir: &Ir, options: &Options, out: &mut String) {
    if matches!(ir, Ir::Alt(_)) {
        out.push_str("(?:");
        emit_node(ir, options, out);
        out.push(')');
    } else {
        emit_node(ir, options, out);
    }
}

/// Emit as a quantifier target: wrap anything that is not an atom.
fn emit_atom(ir: &Ir, options: &Options, out: &mut String) {
    if needs_group_for_quantifier(ir) {
        out.push_str("(?:");
        emit_node(ir, options, out);
        out.push(')');
    } else {
        emit_node(ir, options, out);
    }
}

fn needs_group_for_quantifier(ir: &Ir) -> bool {
    match ir {
        Ir::Literal(text) => {
            let mut chars = text.chars();
            !(chars.next().is_some() && chars.next().is_none())
        }
        Ir::Concat(_) | Ir::Alt(_) | Ir::Repeat { .. } | Ir::Anchor(_) => true,
        Ir::Capture { .. } | Ir::Class(_) | Ir::AnyChar | Ir::CaseInsensitive(_) => false,
    }
}

fn push_quantifier(min: u32, max: Option<u32>, greedy: bool, out: &mut String) {
    match (min, max) {
        (0, Some(1)) => out.push('?'),
        (0, None) => out.push('*'),
        (1, None) => out.push('+'),
        (n, Some(m)) if n == m => write!(out, "{{{}}}", n).expect("String write never fails"),
        (n, None) => write!(out, "{{{},}}", n).expect("String write never fails"),
        (n, Some(m)) => write!(out, "{{{},{}}}", n, m).expect("String write never fails"),
    }
    if !greedy {
        out.push('?');
    }
}

fn emit_class(class: &CharClass, options: &Options, out: &mut String) {
    if let [item] = class.items.as_slice() {
        match (item, class.negated) {
            // A positive single character is just that character
            (ClassItem::Char(c), false) => {
                push_escaped(*c, out);
                return;
            }
            (ClassItem::Class(kind), false) => {
                out.push_str(&standalone_class(*kind, options));
                return;
            }
            (ClassItem::Class(kind), true) => {
                if let Some(short) = negated_standalone_class(*kind, options) {
                    out.push_str(&short);
                    return;
                }
            }
            _ => {}
        }
    }

    out.push('[');
    if class.negated {
        out.push('^');
    }
    for item in &class.items {
        match item {
            ClassItem::Char(c) => push_escaped_in_class(*c, out),
            ClassItem::Range(a, b) => {
                push_escaped_in_class(*a, out);
                out.push('-');
                push_escaped_in_class(*b, out);
            }
            ClassItem::Class(kind) => out.push_str(in_class_fragment(*kind, options)),
        }
    }
    out.push(']');
}

fn standalone_class(kind: ClassKind, options: &Options) -> String {
    match (kind, options.unicode) {
        (ClassKind::Digit, _) => r"\d".into(),
        (ClassKind::Word, _) => r"\w".into(),
        (ClassKind::Space, _) => r"\s".into(),
        (ClassKind::Letter, true) => r"\p{L}".into(),
        (ClassKind::Lowercase, true) => r"\p{Ll}".into(),
        (ClassKind::Uppercase, true) => r"\p{Lu}".into(),
        (ClassKind::Letter, false) => "[a-zA-Z]".into(),
        (ClassKind::Lowercase, false) => "[a-z]".into(),
        (ClassKind::Uppercase, false) => "[A-Z]".into(),
    }
}

/// The `\D`-style complement shorthand, where one exists.
fn negated_standalone_class(kind: ClassKind, options: &Options) -> Option<String> {
    match (kind, options.unicode) {
        (ClassKind::Digit, _) => Some(r"\D".into()),
        (ClassKind::Word, _) => Some(r"\W".into()),
        (ClassKind::Space, _) => Some(r"\S".into()),
        (ClassKind::Letter, true) => Some(r"\P{L}".into()),
        (ClassKind::Lowercase, true) => Some(r"\P{Ll}".into()),
        (ClassKind::Uppercase, true) => Some(r"\P{Lu}".into()),
        // ASCII complements have no shorthand; the bracket form handles them
        (ClassKind::Letter | ClassKind::Lowercase | ClassKind::Uppercase, false) => None,
    }
}

fn in_class_fragment(kind: ClassKind, options: &Options) -> &'static str {
    match (kind, options.unicode) {
        (ClassKind::Digit, _) => "0-9",
        (ClassKind::Word, _) => r"\w",
        (ClassKind::Space, _) => r"\s",
        (ClassKind::Letter, true) => r"\p{L}",
        (ClassKind::Lowercase, true) => r"\p{Ll}",
        (ClassKind::Uppercase, true) => r"\p{Lu}",
        (ClassKind::Letter, false) => "a-zA-Z",
        (ClassKind::Lowercase, false) => "a-z",
        (ClassKind::Uppercase, false) => "A-Z",
    }
}

fn anchor_str(kind: AnchorKind, flavor: Flavor) -> &'static str {
    match (kind, flavor) {
        (AnchorKind::StartString, Flavor::Pcre) => r"\A",
        (AnchorKind::EndString, Flavor::Pcre) => r"\Z",
        (AnchorKind::StartString, Flavor::EcmaScript) => "^",
        (AnchorKind::EndString, Flavor::EcmaScript) => "$",
        (AnchorKind::StartLine, _) => "^",
        (AnchorKind::EndLine, _) => "$",
        (AnchorKind::WordBoundary, _) => r"\b",
        (AnchorKind::NotWordBoundary, _) => r"\B",
    }
}

fn push_escaped(c: char, out: &mut String) {
    match c {
        '\n' => out.push_str(r"\n"),
        '\r' => out.push_str(r"\r"),
        '\t' => out.push_str(r"\t"),
        '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' => {
            out.push('\\');
            out.push(c);
        }
        _ => out.push(c),
    }
}

fn push_escaped_in_class(c: char, out: &mut String) {
    match c {
        '\n' => out.push_str(r"\n"),
        '\r' => out.push_str(r"\r"),
        '\t' => out.push_str(r"\t"),
        ']' | '[' | '\\' | '^' | '-' => {
            out.push('\\');
            out.push(c);
        }
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcre(ir: &Ir) -> String {
        emit(ir, &Options::default())
    }

    fn ecma(ir: &Ir) -> String {
        emit(
            ir,
            &Options {
                flavor: Flavor::EcmaScript,
                ..Options::default()
            },
        )
    }

    fn lit(s: &str) -> Ir {
        Ir::Literal(s.into())
    }

    fn repeat(min: u32, max: Option<u32>, greedy: bool, inner: Ir) -> Ir {
        Ir::Repeat {
            inner: Box::new(inner),
            min,
            max,
            greedy,
        }
    }

    fn digit() -> Ir {
        Ir::Class(CharClass::of(ClassItem::Class(ClassKind::Digit)))
    }

    #[test]
    fn literal() {
        assert_eq!(pcre(&lit("abc")), "abc");
        assert_eq!(pcre(&lit("^[a](b)$")), r"\^\[a\]\(b\)\$");
        assert_eq!(pcre(&lit("a b:c-d")), "a b:c-d");
        assert_eq!(pcre(&lit("a\tb\n")), r"a\tb\n");
    }

    #[test]
    fn multiple() {
        assert_eq!(pcre(&repeat(0, Some(1), true, lit("a"))), "a?");
        assert_eq!(pcre(&repeat(0, None, true, lit("a"))), "a*");
        assert_eq!(pcre(&repeat(1, None, true, lit("a"))), "a+");
        assert_eq!(pcre(&repeat(2, Some(2), true, lit("a"))), "a{2}");
        assert_eq!(pcre(&repeat(2, None, true, lit("a"))), "a{2,}");
        assert_eq!(pcre(&repeat(2, Some(5), true, lit("a"))), "a{2,5}");
        assert_eq!(pcre(&repeat(0, Some(0), true, lit("a"))), "a{0}");
    }

    #[test]
    fn multiple_subexpression() {
        assert_eq!(pcre(&repeat(0, Some(1), true, lit("abc"))), "(?:abc)?");
        assert_eq!(pcre(&repeat(0, None, true, lit("abc"))), "(?:abc)*");
        assert_eq!(pcre(&repeat(1, None, true, lit("abc"))), "(?:abc)+");
        assert_eq!(
            pcre(&repeat(0, Some(1), true, repeat(2, Some(3), true, lit("a")))),
            "(?:a{2,3})?"
        );
    }

    #[test]
    fn multiple_nongreedy() {
        assert_eq!(pcre(&repeat(0, Some(1), false, lit("a"))), "a??");
        assert_eq!(pcre(&repeat(0, None, false, lit("a"))), "a*?");
        assert_eq!(pcre(&repeat(1, None, false, lit("a"))), "a+?");
        assert_eq!(pcre(&repeat(2, Some(2), false, lit("a"))), "a{2}?");
    }

    #[test]
    fn either() {
        let alt = Ir::Alt(vec![lit("a"), lit("b"), lit("c")]);
        assert_eq!(pcre(&alt), "a|b|c");

        let alt = Ir::Alt(vec![lit("123"), lit("45"), lit("")]);
        assert_eq!(pcre(&alt), "123|45|");
    }

    #[test]
    fn either_in_sequence_gets_a_group() {
        let ir = Ir::Concat(vec![lit("x"), Ir::Alt(vec![lit("a"), lit("bc")])]);
        assert_eq!(pcre(&ir), "x(?:a|bc)");
    }

    #[test]
    fn concat() {
        let ir = Ir::Concat(vec![lit("123"), repeat(0, Some(1), true, lit("abc"))]);
        assert_eq!(pcre(&ir), "123(?:abc)?");
    }

    #[test]
    fn character_class() {
        assert_eq!(pcre(&digit()), r"\d");
        assert_eq!(pcre(&Ir::Concat(vec![digit(), digit()])), r"\d\d");
        assert_eq!(
            pcre(&Ir::Class(CharClass::of(ClassItem::Char('a')))),
            "a"
        );
        assert_eq!(
            pcre(&Ir::Class(CharClass {
                items: vec![ClassItem::Char('a'), ClassItem::Char('b')],
                negated: false,
            })),
            "[ab]"
        );
        assert_eq!(
            pcre(&Ir::Class(CharClass {
                items: vec![ClassItem::Char('a')],
                negated: true,
            })),
            "[^a]"
        );
        assert_eq!(
            pcre(&Ir::Class(CharClass {
                items: vec![ClassItem::Char('a'), ClassItem::Char('b')],
                negated: true,
            })),
            "[^ab]"
        );
    }

    #[test]
    fn class_shorthands_inline_into_brackets() {
        let ir = Ir::Class(CharClass {
            items: vec![
                ClassItem::Class(ClassKind::Digit),
                ClassItem::Range('a', 'f'),
            ],
            negated: false,
        });
        assert_eq!(pcre(&ir), "[0-9a-f]");
    }

    #[test]
    fn class_member_escaping() {
        let ir = Ir::Class(CharClass {
            items: vec![
                ClassItem::Char(']'),
                ClassItem::Char('^'),
                ClassItem::Char('-'),
            ],
            negated: false,
        });
        assert_eq!(pcre(&ir), r"[\]\^\-]");
    }

    #[test]
    fn negated_class_shorthands() {
        let not_digit = Ir::Class(CharClass {
            items: vec![ClassItem::Class(ClassKind::Digit)],
            negated: true,
        });
        assert_eq!(pcre(&not_digit), r"\D");

        let not_letter = Ir::Class(CharClass {
            items: vec![ClassItem::Class(ClassKind::Letter)],
            negated: true,
        });
        assert_eq!(pcre(&not_letter), "[^a-zA-Z]");
    }

    #[test]
    fn letter_classes_follow_unicode_option() {
        let letter = Ir::Class(CharClass::of(ClassItem::Class(ClassKind::Letter)));
        assert_eq!(pcre(&letter), "[a-zA-Z]");
        assert_eq!(
            emit(
                &letter,
                &Options {
                    unicode: true,
                    ..Options::default()
                }
            ),
            r"\p{L}"
        );
    }

    #[test]
    fn capture() {
        let ir = Ir::Capture {
            inner: Box::new(digit()),
            name: None,
        };
        assert_eq!(pcre(&ir), r"(\d)");

        let ir = Ir::Concat(vec![
            lit("No. "),
            Ir::Capture {
                inner: Box::new(repeat(1, None, true, digit())),
                name: Some("number".into()),
            },
        ]);
        assert_eq!(pcre(&ir), r"No\. (?P<number>\d+)");
        assert_eq!(ecma(&ir), r"No\. (?<number>\d+)");
    }

    #[test]
    fn capture_body_needs_no_extra_group() {
        let ir = Ir::Capture {
            inner: Box::new(Ir::Alt(vec![lit("a"), lit("bc")])),
            name: None,
        };
        assert_eq!(pcre(&ir), "(a|bc)");
    }

    #[test]
    fn case_insensitive_group() {
        let ir = Ir::CaseInsensitive(Box::new(Ir::Alt(vec![lit("Laugh"), lit("Cry")])));
        assert_eq!(pcre(&ir), "(?i:Laugh|Cry)");
    }

    #[test]
    fn anchors_per_flavor() {
        assert_eq!(pcre(&Ir::Anchor(AnchorKind::StartString)), r"\A");
        assert_eq!(pcre(&Ir::Anchor(AnchorKind::EndString)), r"\Z");
        assert_eq!(ecma(&Ir::Anchor(AnchorKind::StartString)), "^");
        assert_eq!(ecma(&Ir::Anchor(AnchorKind::EndString)), "$");
        assert_eq!(pcre(&Ir::Anchor(AnchorKind::StartLine)), "^");
        assert_eq!(pcre(&Ir::Anchor(AnchorKind::WordBoundary)), r"\b");
        assert_eq!(pcre(&Ir::Anchor(AnchorKind::NotWordBoundary)), r"\B");
    }

    #[test]
    fn any_char_per_flavor() {
        assert_eq!(pcre(&Ir::AnyChar), ".");
        assert_eq!(ecma(&Ir::AnyChar), r"[\s\S]");
    }

    #[test]
    fn quantified_anchor_gets_a_group() {
        let ir = repeat(3, Some(3), true, Ir::Anchor(AnchorKind::WordBoundary));
        assert_eq!(pcre(&ir), r"(?:\b){3}");
    }

    #[test]
    fn empty_ir_is_empty_string() {
        assert_eq!(pcre(&Ir::empty()), "");
        assert_eq!(pcre(&lit("")), "");
    }
}
