//! End-to-end compilation tests: KE source in, regex string out.

use crate::diagnostics::ErrorKind;
use crate::{Error, Flavor, Options, Pattern, compile};

fn pcre(source: &str) -> String {
    compile(source, &Options::default()).unwrap_or_else(|err| {
        panic!("{:?} failed: {:?}", source, err);
    })
}

fn ecma(source: &str) -> String {
    let options = Options {
        flavor: Flavor::EcmaScript,
        ..Options::default()
    };
    compile(source, &options).unwrap()
}

fn compile_error_kind(source: &str) -> ErrorKind {
    match compile(source, &Options::default()) {
        Ok(out) => panic!("{:?} unexpectedly compiled to {:?}", source, out),
        Err(err) => err.diagnostics().as_slice()[0].kind,
    }
}

#[test]
fn plain_literal() {
    assert_eq!(
        pcre("This is a (short) literal :-)"),
        r"This is a \(short\) literal :-\)"
    );
}

#[test]
fn literal_transparency() {
    assert_eq!(pcre("abc def"), "abc def");
    assert_eq!(pcre("x['|']y"), r"x\|y");
    assert_eq!(pcre("a.b"), r"a\.b");
}

#[test]
fn escaping_completeness() {
    for c in [
        '.', '^', '$', '|', '?', '*', '+', '(', ')', '[', ']', '{', '}', '\\',
    ] {
        let source = format!("['{}']", c);
        assert_eq!(pcre(&source), format!("\\{}", c), "metacharacter {:?}", c);
    }
    // The quote characters themselves need the other quote
    assert_eq!(pcre(r#"["'"]"#), "'");
    assert_eq!(pcre(r#"['"']"#), "\"");
}

#[test]
fn digits_and_case_insensitive_alternation() {
    assert_eq!(
        pcre("[#digit] Reasons To Switch, The [#digit]th Made Me [case_insensitive ['Laugh' | 'Cry']]"),
        r"\d Reasons To Switch, The \dth Made Me (?i:Laugh|Cry)"
    );
}

#[test]
fn capture_with_repetition() {
    assert_eq!(pcre("[c 1+ #d] Reasons"), r"(\d+) Reasons");
}

#[test]
fn named_capture_between_anchors() {
    assert_eq!(
        pcre("[#start_line]articles/[capture:year 4 #digit]/[#end_line]"),
        r"^articles/(?P<year>\d{4})/$"
    );
}

#[test]
fn negated_alternation() {
    assert_eq!(pcre("[not ['a' | 'b']]"), "[^ab]");
}

#[test]
fn class_folding() {
    assert_eq!(pcre("[#digit | #a..f]"), "[0-9a-f]");
}

#[test]
fn hex_color() {
    assert_eq!(
        pcre("['#' [[6 #h] | [3 #h]] #h=[#digit | #a..f]]"),
        "#(?:[0-9a-f]{6}|[0-9a-f]{3})"
    );
}

#[test]
fn empty_source_is_rejected() {
    let pattern = Pattern::new("");
    assert!(!pattern.is_valid());
    assert_eq!(pattern.errors()[0].kind, ErrorKind::Syntax);

    let err = compile("", &Options::default()).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn explicit_empty_pattern() {
    assert_eq!(pcre("[]"), "");
    assert_eq!(pcre("['']"), "");
    // Whitespace-only source is a literal, not empty
    assert_eq!(pcre(" "), " ");
}

#[test]
fn unknown_macro() {
    assert_eq!(compile_error_kind("[#unknown]"), ErrorKind::UnknownMacro);
}

#[test]
fn cyclic_definitions() {
    assert_eq!(compile_error_kind("[#a=#b #b=#a]"), ErrorKind::CyclicMacro);
}

#[test]
fn short_and_long_names_compile_identically() {
    for (short, long) in [
        ("[1+ #d]", "[1+ #digit]"),
        ("[#ss]", "[#start_string]"),
        ("[#nd]", "[#not_digit]"),
        ("[c 'x']", "[capture 'x']"),
        ("[ci 'x']", "[case_insensitive 'x']"),
        ("[#int]", "[#integer]"),
    ] {
        assert_eq!(pcre(short), pcre(long), "{} vs {}", short, long);
    }
}

#[test]
fn idempotent_lowering() {
    assert_eq!(pcre("a"), pcre("['a']"));
    assert_eq!(pcre("['a']"), pcre("[['a']]"));
}

#[test]
fn alternation_order_only_reorders_the_class() {
    assert_eq!(pcre("['a' | 'b']"), "[ab]");
    assert_eq!(pcre("['b' | 'a']"), "[ba]");
}

#[test]
fn negation_involution() {
    assert_eq!(pcre("[not [not 'a']]"), "a");
    assert_eq!(pcre("[not [not #digit]]"), r"\d");
}

#[test]
fn range_expansion() {
    assert_eq!(pcre("[#a..f]"), "[a-f]");
    assert_eq!(pcre("[#0..5]"), "[0-5]");
    assert_eq!(pcre("[#A..F]"), "[A-F]");
}

#[test]
fn bracket_adjacency_counts_as_whitespace() {
    assert_eq!(pcre("[1+ #d][#letter]"), r"\d+[a-zA-Z]");
}

#[test]
fn adjacent_items_require_whitespace() {
    let pattern = Pattern::new("['a''b']");
    assert!(!pattern.is_valid());
    assert!(pattern.render_errors().contains("whitespace"));
}

#[test]
fn builtin_numeric_macros() {
    assert_eq!(pcre("[#integer]"), r"-?\d+");
    assert_eq!(pcre("[#uint]"), r"\d+");
    assert_eq!(pcre("[#real]"), r"-?\d+(?:\.\d+)?");
    assert_eq!(pcre("[#hex_digit]"), "[0-9a-fA-F]");
}

#[test]
fn builtin_character_macros() {
    assert_eq!(pcre("[#linefeed]"), r"\n");
    assert_eq!(pcre("[#windows_newline]"), r"\r\n");
    assert_eq!(pcre("[#not_digit]"), r"\D");
    assert_eq!(pcre("[#not_linefeed]"), r"[^\n]");
    assert_eq!(pcre("[#quote]"), "'");
    assert_eq!(pcre("[#left_brace]"), r"\[");
    assert_eq!(pcre("[#token_character]"), r"\w");
    assert_eq!(pcre("[#not_word_boundary]"), r"\B");
}

#[test]
fn anchors_per_flavor() {
    assert_eq!(pcre("[#ss]x[#es]"), r"\Ax\Z");
    assert_eq!(ecma("[#ss]x[#es]"), "^x$");
    assert_eq!(pcre("[#sl]x[#el]"), "^x$");
}

#[test]
fn any_char_per_flavor() {
    assert_eq!(pcre("[#any]"), ".");
    assert_eq!(ecma("[#any]"), r"[\s\S]");
}

#[test]
fn ecma_named_capture_syntax() {
    assert_eq!(ecma("[capture:n 1+ #d]"), r"(?<n>\d+)");
}

#[test]
fn unicode_letter_classes() {
    let options = Options {
        unicode: true,
        ..Options::default()
    };
    assert_eq!(compile("[#letter]", &options).unwrap(), r"\p{L}");
    assert_eq!(compile("[#not_letter]", &options).unwrap(), r"\P{L}");
    assert_eq!(compile("[#lowercase]", &options).unwrap(), r"\p{Ll}");
    assert_eq!(compile("[#letter]", &Options::default()).unwrap(), "[a-zA-Z]");
}

#[test]
fn chained_operators_wrap_outside_in() {
    assert_eq!(pcre("[capture 1+ #d]"), r"(\d+)");
    assert_eq!(pcre("[1+ capture #d]"), r"(\d)+");
    assert_eq!(pcre("[ci 2 'ab']"), "(?i:(?:ab){2})");
}

#[test]
fn nongreedy_quantifiers() {
    assert_eq!(pcre("[1+:fewest #d]"), r"\d+?");
    assert_eq!(pcre("[0-1:fewest 'a']"), "a??");
}

#[test]
fn float_macro_spells_out_every_branch() {
    assert_eq!(
        pcre("[#float]"),
        r"-?(?:(?:\d+\.(?:\d+)?|\.\d+)(?:[eE][+\-]?\d+)?|-?\d+[eE][+\-]?\d+)"
    );
}

#[test]
fn comment_operator_discards() {
    assert_eq!(pcre("a[comment 'ignored']b"), "ab");
}

#[test]
fn newlines_inside_braces_are_just_whitespace() {
    let source = indoc::indoc! {"
        [
            capture:year
            4 #digit
        ]"};
    assert_eq!(pcre(source), r"(?P<year>\d{4})");
}

#[test]
fn stray_close_bracket_is_a_parse_error() {
    let pattern = Pattern::new("a]b");
    assert!(!pattern.is_valid());
    assert_eq!(pattern.errors()[0].kind, ErrorKind::Syntax);
}

#[test]
fn ops_mixed_with_alternation_is_a_parse_error() {
    let pattern = Pattern::new("[1+ 'a' | 'b']");
    assert!(!pattern.is_valid());
    assert!(pattern.render_errors().contains("alternation"));
}
