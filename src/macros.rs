//! The builtin macro table.
//!
//! Initialized once, then read-only and shared by every compilation. Long
//! names and short aliases live in a single namespace; user definitions may
//! shadow any row in an inner scope.
//!
//! Rows fall in three groups: native constructs (classes, anchors, plain
//! literals), their inverted `#not_*` forms, and macros defined in KE
//! itself, which are compiled through the regular pipeline against the
//! partially built table.

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::ir::{self, AnchorKind, CharClass, ClassItem, ClassKind, Ir};
use crate::lower;

pub type BuiltinTable = IndexMap<&'static str, Ir>;

static TABLE: LazyLock<BuiltinTable> = LazyLock::new(build_table);

/// Looks up a builtin by its `#name`, long or short.
pub fn lookup(name: &str) -> Option<&'static Ir> {
    TABLE.get(name)
}

pub fn table() -> &'static BuiltinTable {
    &TABLE
}

/// Invertible rows and the names of their complements.
const INVERTED: &[(&str, &str)] = &[
    ("#linefeed", "#not_linefeed"),
    ("#carriage_return", "#not_carriage_return"),
    ("#tab", "#not_tab"),
    ("#digit", "#not_digit"),
    ("#letter", "#not_letter"),
    ("#lowercase", "#not_lowercase"),
    ("#uppercase", "#not_uppercase"),
    ("#space", "#not_space"),
    ("#token_character", "#not_token_character"),
    ("#word_boundary", "#not_word_boundary"),
];

/// Short aliases, including the `#n…` forms of the inverted rows.
const ALIASES: &[(&str, &str)] = &[
    ("#a", "#any"),
    ("#lf", "#linefeed"),
    ("#cr", "#carriage_return"),
    ("#crlf", "#windows_newline"),
    ("#t", "#tab"),
    ("#d", "#digit"),
    ("#l", "#letter"),
    ("#lc", "#lowercase"),
    ("#uc", "#uppercase"),
    ("#s", "#space"),
    ("#tc", "#token_character"),
    ("#wb", "#word_boundary"),
    ("#ss", "#start_string"),
    ("#es", "#end_string"),
    ("#sl", "#start_line"),
    ("#el", "#end_line"),
    ("#q", "#quote"),
    ("#dq", "#double_quote"),
    ("#lb", "#left_brace"),
    ("#rb", "#right_brace"),
    ("#nlf", "#not_linefeed"),
    ("#ncr", "#not_carriage_return"),
    ("#nt", "#not_tab"),
    ("#nd", "#not_digit"),
    ("#nl", "#not_letter"),
    ("#nlc", "#not_lowercase"),
    ("#nuc", "#not_uppercase"),
    ("#ns", "#not_space"),
    ("#ntc", "#not_token_character"),
    ("#nwb", "#not_word_boundary"),
];

/// Macros whose definitions are themselves KE.
const DERIVED: &[(&str, Option<&str>, &str)] = &[
    ("#integer", Some("#int"), "[[0-1 '-'] [1+ #digit]]"),
    ("#unsigned_integer", Some("#uint"), "[1+ #digit]"),
    ("#real", None, "[#int [0-1 '.' #uint]]"),
    (
        "#float",
        None,
        "[[0-1 '-'] [[#uint '.' [0-1 #uint] | '.' #uint] [0-1 #exponent] | #int #exponent] #exponent=[['e' | 'E'] [0-1 ['+' | '-']] #uint]]",
    ),
    ("#hex_digit", None, "[#digit | #a..f | #A..F]"),
];

fn class(kind: ClassKind) -> Ir {
    Ir::Class(CharClass::of(ClassItem::Class(kind)))
}

fn char_class(c: char) -> Ir {
    Ir::Class(CharClass::of(ClassItem::Char(c)))
}

fn build_table() -> BuiltinTable {
    let mut table = BuiltinTable::new();

    table.insert("#any", Ir::AnyChar);
    table.insert("#linefeed", char_class('\n'));
    table.insert("#carriage_return", char_class('\r'));
    table.insert("#windows_newline", Ir::Literal("\r\n".into()));
    table.insert("#tab", char_class('\t'));
    table.insert("#digit", class(ClassKind::Digit));
    table.insert("#letter", class(ClassKind::Letter));
    table.insert("#lowercase", class(ClassKind::Lowercase));
    table.insert("#uppercase", class(ClassKind::Uppercase));
    table.insert("#space", class(ClassKind::Space));
    table.insert("#token_character", class(ClassKind::Word));
    table.insert("#word_boundary", Ir::Anchor(AnchorKind::WordBoundary));

    table.insert("#start_string", Ir::Anchor(AnchorKind::StartString));
    table.insert("#end_string", Ir::Anchor(AnchorKind::EndString));
    table.insert("#start_line", Ir::Anchor(AnchorKind::StartLine));
    table.insert("#end_line", Ir::Anchor(AnchorKind::EndLine));

    table.insert("#quote", Ir::Literal("'".into()));
    table.insert("#double_quote", Ir::Literal("\"".into()));
    table.insert("#left_brace", Ir::Literal("[".into()));
    table.insert("#right_brace", Ir::Literal("]".into()));

    for &(name, inverted_name) in INVERTED {
        let base = table
            .get(name)
            .unwrap_or_else(|| panic!("invertible builtin {} missing", name))
            .clone();
        let inverted = ir::invert(base)
            .unwrap_or_else(|| panic!("builtin {} must be invertible", name));
        table.insert(inverted_name, inverted);
    }

    for &(alias, target) in ALIASES {
        let ir = table
            .get(target)
            .unwrap_or_else(|| panic!("alias target {} missing", target))
            .clone();
        table.insert(alias, ir);
    }

    for &(name, short, source) in DERIVED {
        let ir = lower::lower_builtin_source(source, &table)
            .unwrap_or_else(|err| panic!("builtin macro {} failed to compile: {}", name, err));
        if let Some(short) = short {
            table.insert(short, ir.clone());
        }
        table.insert(name, ir);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_names_agree() {
        for &(alias, target) in ALIASES {
            assert_eq!(lookup(alias), lookup(target), "{} vs {}", alias, target);
        }
    }

    #[test]
    fn inverted_rows_are_complements() {
        for &(name, inverted_name) in INVERTED {
            let base = lookup(name).unwrap().clone();
            let inverted = lookup(inverted_name).unwrap().clone();
            assert_eq!(ir::invert(base), Some(inverted), "{}", name);
        }
    }

    #[test]
    fn derived_macros_compile() {
        assert!(lookup("#integer").is_some());
        assert!(lookup("#int").is_some());
        assert!(lookup("#float").is_some());
        assert!(lookup("#hex_digit").is_some());
        assert_eq!(lookup("#integer"), lookup("#int"));
    }

    #[test]
    fn unknown_name_is_absent() {
        assert!(lookup("#no_such_macro").is_none());
    }
}
