use crate::Pattern;

#[test]
fn two_branches() {
    let pattern = Pattern::new("['Laugh' | 'Cry']");
    assert!(pattern.is_valid());
    insta::assert_snapshot!(pattern.dump_cst(), @r##"
    Root
      Braces
        BracketOpen "["
        Branch
          InnerLit
            SingleQuote "'"
            StrVal "Laugh"
            SingleQuote "'"
        Pipe "|"
        Branch
          InnerLit
            SingleQuote "'"
            StrVal "Cry"
            SingleQuote "'"
        BracketClose "]"
    "##);
}

#[test]
fn three_branches_with_sequences() {
    let pattern = Pattern::new("['a' 'b' | #d | [0-1 'c']]");
    assert!(pattern.is_valid());
    insta::assert_snapshot!(pattern.dump_cst(), @r##"
    Root
      Braces
        BracketOpen "["
        Branch
          InnerLit
            SingleQuote "'"
            StrVal "a"
            SingleQuote "'"
          InnerLit
            SingleQuote "'"
            StrVal "b"
            SingleQuote "'"
        Pipe "|"
        Branch
          MacroRef
            MacroName "#d"
        Pipe "|"
        Branch
          Braces
            BracketOpen "["
            Op
              Word "0-1"
            InnerLit
              SingleQuote "'"
              StrVal "c"
              SingleQuote "'"
            BracketClose "]"
        BracketClose "]"
    "##);
}

#[test]
fn single_match_is_not_an_alternation() {
    let pattern = Pattern::new("['x']");
    assert!(pattern.is_valid());
    // No Branch node: a one-element sequence stays a sequence
    assert!(!pattern.dump_cst().contains("Branch"));
}

#[test]
fn pipes_without_spaces() {
    let pattern = Pattern::new("['a'|'b']");
    assert!(pattern.is_valid());
    insta::assert_snapshot!(pattern.dump_cst(), @r##"
    Root
      Braces
        BracketOpen "["
        Branch
          InnerLit
            SingleQuote "'"
            StrVal "a"
            SingleQuote "'"
        Pipe "|"
        Branch
          InnerLit
            SingleQuote "'"
            StrVal "b"
            SingleQuote "'"
        BracketClose "]"
    "##);
}

#[test]
fn empty_branch_is_an_error() {
    let pattern = Pattern::new("['a' | ]");
    assert!(!pattern.is_valid());
    assert!(pattern.render_errors().contains("empty"));

    let pattern = Pattern::new("[| 'a']");
    assert!(!pattern.is_valid());
}
