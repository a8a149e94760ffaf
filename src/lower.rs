//! Lowering: parse tree to normalized IR, with macro resolution.
//!
//! Scopes form a parent-linked chain with one frame per bracket group that
//! contains definitions. A definition is visible in its whole group,
//! including alternation branches and nested groups, regardless of textual
//! order. Expansion is lazy at each reference site but lowers the
//! definition body in its *defining* scope, so resolution is lexical.
//!
//! A visit stack over definitions detects cycles; a configurable depth
//! limit bounds non-cyclic chains. Definitions are validated eagerly when
//! their scope is entered, so broken definitions are reported even when
//! nothing references them.
//!
//! Unlike the parser, lowering stops at the first error.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use rowan::TextRange;

use crate::diagnostics::{Diagnostic, ErrorKind, RelatedInfo};
use crate::ir::{self, AnchorKind, CharClass, ClassItem, Ir};
use crate::macros::{self, BuiltinTable};
use crate::options::{Flavor, Options};
use crate::parser::{self, Braces, Def, MacroRef, Match, Op, RangeMacro, Root, RootItem};

/// Lower a valid parse tree to IR using the global builtin table.
pub fn lower(root: &Root, options: &Options) -> Result<Ir, Diagnostic> {
    Lowerer {
        options,
        builtins: macros::table(),
        expansion: Vec::new(),
        expanded: HashMap::new(),
    }
    .lower_root(root)
}

/// Compiles one KE-defined builtin against a partially built table.
/// Only called during table initialization.
pub(crate) fn lower_builtin_source(
    source: &str,
    builtins: &BuiltinTable,
) -> Result<Ir, Diagnostic> {
    let parse = parser::parse(source);
    if let Some(err) = parse.errors().first() {
        return Err(err.clone());
    }
    let options = Options::default();
    Lowerer {
        options: &options,
        builtins,
        expansion: Vec::new(),
        expanded: HashMap::new(),
    }
    .lower_root(&parse.root())
}

struct Scope {
    defs: IndexMap<String, Def>,
    parent: Option<Rc<Scope>>,
}

type ScopeRef = Option<Rc<Scope>>;

/// Walks the chain outward; returns the definition and the scope it lives
/// in (its siblings stay visible while its body lowers).
fn scope_lookup(scope: &ScopeRef, name: &str) -> Option<(Def, Rc<Scope>)> {
    let mut current = scope.clone();
    while let Some(s) = current {
        if let Some(def) = s.defs.get(name) {
            return Some((def.clone(), s.clone()));
        }
        current = s.parent.clone();
    }
    None
}

struct Frame {
    name: String,
    def_range: TextRange,
    use_range: TextRange,
}

struct Lowerer<'a> {
    options: &'a Options,
    builtins: &'a BuiltinTable,
    expansion: Vec<Frame>,
    /// Each definition lowers once; its scope is fixed, so the result is too.
    expanded: HashMap<Def, Ir>,
}

impl Lowerer<'_> {
    fn lower_root(&mut self, root: &Root) -> Result<Ir, Diagnostic> {
        let mut items = Vec::new();
        for item in root.items() {
            match item {
                RootItem::OuterLit(lit) => items.push(Ir::Literal(lit.text())),
                RootItem::Braces(braces) => items.push(self.lower_braces(&braces, &None)?),
            }
        }
        Ok(ir::concat(items))
    }

    fn lower_braces(&mut self, braces: &Braces, parent: &ScopeRef) -> Result<Ir, Diagnostic> {
        let scope = self.enter_scope(braces, parent)?;

        if braces.has_ops() {
            self.lower_ops_form(braces, &scope)
        } else if braces.is_either() {
            let mut branches = Vec::new();
            for branch in braces.branches() {
                branches.push(self.lower_matches(branch.matches(), &scope)?);
            }
            Ok(ir::alt(branches))
        } else {
            self.lower_matches(braces.matches(), &scope)
        }
    }

    /// Collects this group's definitions into a new scope frame, checking
    /// for duplicates, then validates each definition body.
    fn enter_scope(&mut self, braces: &Braces, parent: &ScopeRef) -> Result<ScopeRef, Diagnostic> {
        let mut defs: IndexMap<String, Def> = IndexMap::new();
        for def in braces.defs() {
            let Some(name_token) = def.name() else { continue };
            let name = name_token.text().to_string();
            if let Some(first) = defs.get(&name) {
                let first_range = first
                    .name()
                    .map(|t| t.text_range())
                    .unwrap_or_else(|| first.text_range());
                return Err(Diagnostic::error(
                    ErrorKind::DuplicateDefinition,
                    name_token.text_range(),
                    format!("macro `{}` is defined twice in this group", name),
                )
                .with_related(RelatedInfo::new(first_range, "first defined here")));
            }
            defs.insert(name, def);
        }

        if defs.is_empty() {
            return Ok(parent.clone());
        }
        let scope = Rc::new(Scope {
            defs,
            parent: parent.clone(),
        });

        for (name, def) in scope.defs.iter() {
            let at = def
                .name()
                .map(|t| t.text_range())
                .unwrap_or_else(|| def.text_range());
            self.expand_def(name, def, &scope, at)?;
        }

        Ok(Some(scope))
    }

    fn lower_matches(
        &mut self,
        matches: impl Iterator<Item = Match>,
        scope: &ScopeRef,
    ) -> Result<Ir, Diagnostic> {
        let mut items = Vec::new();
        for m in matches {
            // Definitions contribute nothing at their own site
            if matches!(m, Match::Def(_)) {
                continue;
            }
            items.push(self.lower_match(&m, scope)?);
        }
        Ok(ir::concat(items))
    }

    fn lower_match(&mut self, m: &Match, scope: &ScopeRef) -> Result<Ir, Diagnostic> {
        match m {
            Match::InnerLit(lit) => Ok(Ir::Literal(lit.value())),
            Match::MacroRef(macro_ref) => self.lower_macro_ref(macro_ref, scope),
            Match::RangeMacro(range) => self.lower_range(range),
            Match::Braces(braces) => self.lower_braces(braces, scope),
            Match::Def(_) => Ok(Ir::empty()),
        }
    }

    fn lower_macro_ref(&mut self, macro_ref: &MacroRef, scope: &ScopeRef) -> Result<Ir, Diagnostic> {
        let token = macro_ref.name().expect("macro node has a name token");
        let name = token.text();

        if let Some((def, def_scope)) = scope_lookup(scope, name) {
            return self.expand_def(name, &def, &def_scope, token.text_range());
        }

        if let Some(ir) = self.builtins.get(name) {
            self.check_flavor_support(ir, token.text_range())?;
            return Ok(ir.clone());
        }

        Err(Diagnostic::error(
            ErrorKind::UnknownMacro,
            token.text_range(),
            format!(
                "macro `{}` is not defined; perhaps it was defined in another scope?",
                name
            ),
        ))
    }

    /// Lowers a definition body at a reference site (or eagerly at scope
    /// entry), guarding against cycles and unbounded depth.
    fn expand_def(
        &mut self,
        name: &str,
        def: &Def,
        def_scope: &Rc<Scope>,
        use_range: TextRange,
    ) -> Result<Ir, Diagnostic> {
        if let Some(ir) = self.expanded.get(def) {
            return Ok(ir.clone());
        }

        let def_range = def.text_range();
        if let Some(start) = self
            .expansion
            .iter()
            .position(|frame| frame.def_range == def_range)
        {
            return Err(self.cycle_error(start, name, use_range));
        }
        if self.expansion.len() >= self.options.max_expansion_depth {
            return Err(Diagnostic::error(
                ErrorKind::ExpansionDepthExceeded,
                use_range,
                format!(
                    "macro expansion exceeded the depth limit of {}",
                    self.options.max_expansion_depth
                ),
            ));
        }

        self.expansion.push(Frame {
            name: name.to_string(),
            def_range,
            use_range,
        });
        let body = def.body().expect("definition body present in valid parse");
        let result = self.lower_match(&body, &Some(def_scope.clone()));
        self.expansion.pop();

        let ir = result?;
        self.expanded.insert(def.clone(), ir.clone());
        Ok(ir)
    }

    fn cycle_error(&self, start: usize, name: &str, use_range: TextRange) -> Diagnostic {
        let frames = &self.expansion[start..];

        let mut cycle: Vec<String> = frames.iter().map(|f| format!("`{}`", f.name)).collect();
        cycle.push(format!("`{}`", name));

        let mut related = Vec::new();
        for pair in frames.windows(2) {
            related.push(RelatedInfo::new(
                pair[1].use_range,
                format!("`{}` expands `{}` here", pair[0].name, pair[1].name),
            ));
        }
        let last = frames.last().expect("cycle has at least one frame");
        related.push(RelatedInfo::new(
            use_range,
            format!(
                "`{}` expands `{}` here, completing the cycle",
                last.name, name
            ),
        ));

        Diagnostic::error(
            ErrorKind::CyclicMacro,
            use_range,
            format!("cyclic macro definition: {}", cycle.join(" → ")),
        )
        .with_related_many(related)
    }

    /// Anchors a flavor cannot express are rejected here so the emitter
    /// stays total.
    fn check_flavor_support(&self, ir: &Ir, range: TextRange) -> Result<(), Diagnostic> {
        if self.options.flavor == Flavor::EcmaScript && self.options.multiline {
            let name = match ir {
                Ir::Anchor(AnchorKind::StartString) => Some("#start_string"),
                Ir::Anchor(AnchorKind::EndString) => Some("#end_string"),
                _ => None,
            };
            if let Some(name) = name {
                return Err(Diagnostic::error(
                    ErrorKind::UnsupportedOperator,
                    range,
                    format!(
                        "`{}` has no ECMAScript equivalent when multiline is set; use `#start_line`/`#end_line` or drop multiline",
                        name
                    ),
                ));
            }
        }
        Ok(())
    }

    fn lower_range(&mut self, range_macro: &RangeMacro) -> Result<Ir, Diagnostic> {
        let token = range_macro.token().expect("range node has a name token");
        let range = token.text_range();

        let Some((start, end)) = range_macro.endpoints() else {
            return Err(Diagnostic::error(
                ErrorKind::InvalidRange,
                range,
                "range endpoints must be single letters or digits, like `#a..f`",
            ));
        };
        let start_category = character_category(start).ok_or_else(|| {
            Diagnostic::error(
                ErrorKind::InvalidRange,
                range,
                format!("`{}` cannot be a range endpoint; use letters or digits", start),
            )
        })?;
        let end_category = character_category(end).ok_or_else(|| {
            Diagnostic::error(
                ErrorKind::InvalidRange,
                range,
                format!("`{}` cannot be a range endpoint; use letters or digits", end),
            )
        })?;
        if start_category != end_category {
            return Err(Diagnostic::error(
                ErrorKind::InvalidRange,
                range,
                format!(
                    "range endpoints must be of the same kind: `{}` is {} but `{}` is {}",
                    start, start_category, end, end_category
                ),
            ));
        }
        if start >= end {
            return Err(Diagnostic::error(
                ErrorKind::InvalidRange,
                range,
                format!(
                    "range start must come strictly before its end: `{}` >= `{}`",
                    start, end
                ),
            ));
        }

        Ok(Ir::Class(CharClass::of(ClassItem::Range(start, end))))
    }

    fn lower_ops_form(&mut self, braces: &Braces, scope: &ScopeRef) -> Result<Ir, Diagnostic> {
        let ops: Vec<Op> = braces.ops().collect();

        let has_body = braces.matches().any(|m| !matches!(m, Match::Def(_)));
        if !has_body {
            let last = ops.last().expect("ops form has at least one op");
            let token = last.name().expect("op node has a name token");
            return Err(Diagnostic::error(
                ErrorKind::Syntax,
                token.text_range(),
                format!("operator `{}` requires a pattern to apply to", token.text()),
            ));
        }

        let mut ir = self.lower_matches(braces.matches(), scope)?;
        // Outside-in: the left operator wraps the result of the right
        for op in ops.iter().rev() {
            ir = self.apply_op(op, ir)?;
        }
        Ok(ir)
    }

    fn apply_op(&mut self, op: &Op, inner: Ir) -> Result<Ir, Diagnostic> {
        let token = op.name().expect("op node has a name token");
        let name = token.text();
        let range = token.text_range();
        let arg = op.arg();

        if name.starts_with(|c: char| c.is_ascii_digit()) {
            let Some((min, max)) = parse_counts(name) else {
                return Err(Diagnostic::error(
                    ErrorKind::Syntax,
                    range,
                    format!("malformed quantifier `{}`", name),
                ));
            };
            if let Some(max) = max {
                if min > max {
                    return Err(Diagnostic::error(
                        ErrorKind::Syntax,
                        range,
                        format!(
                            "quantifier minimum {} is greater than its maximum {}",
                            min, max
                        ),
                    ));
                }
            }
            let greedy = match &arg {
                None => true,
                Some(t) if t.text() == "fewest" => false,
                Some(t) => {
                    return Err(Diagnostic::error(
                        ErrorKind::Syntax,
                        t.text_range(),
                        format!(
                            "unknown quantifier modifier `{}`; the only modifier is `fewest`",
                            t.text()
                        ),
                    ));
                }
            };
            if inner.is_empty() || (min == 1 && max == Some(1)) {
                return Ok(inner);
            }
            return Ok(Ir::Repeat {
                inner: Box::new(inner),
                min,
                max,
                greedy,
            });
        }

        match name {
            "capture" | "c" => {
                let capture_name = match &arg {
                    None => None,
                    Some(t) => {
                        if !is_valid_group_name(t.text()) {
                            return Err(Diagnostic::error(
                                ErrorKind::Syntax,
                                t.text_range(),
                                format!(
                                    "`{}` is not a valid group name; use letters, digits and underscores, not starting with a digit",
                                    t.text()
                                ),
                            ));
                        }
                        Some(t.text().to_string())
                    }
                };
                Ok(Ir::Capture {
                    inner: Box::new(inner),
                    name: capture_name,
                })
            }
            "not" => {
                reject_arg(name, &arg)?;
                ir::invert(inner).ok_or_else(|| {
                    Diagnostic::error(
                        ErrorKind::InvalidNegation,
                        range,
                        "`not` applies only to a single character or character class",
                    )
                })
            }
            "comment" => {
                reject_arg(name, &arg)?;
                Ok(Ir::empty())
            }
            "case_insensitive" | "ci" => {
                reject_arg(name, &arg)?;
                if self.options.flavor == Flavor::EcmaScript {
                    return Err(Diagnostic::error(
                        ErrorKind::UnsupportedOperator,
                        range,
                        "the ECMAScript flavor has no inline case-insensitive group; pass the `i` flag to the engine instead",
                    ));
                }
                Ok(Ir::CaseInsensitive(Box::new(inner)))
            }
            _ => Err(Diagnostic::error(
                ErrorKind::Syntax,
                range,
                format!(
                    "unknown operator `{}` (known operators: capture, not, comment, case_insensitive, and counts like 2, 1+ or 0-1)",
                    name
                ),
            )),
        }
    }
}

fn reject_arg(
    name: &str,
    arg: &Option<parser::SyntaxToken>,
) -> Result<(), Diagnostic> {
    match arg {
        None => Ok(()),
        Some(t) => Err(Diagnostic::error(
            ErrorKind::Syntax,
            t.text_range(),
            format!("operator `{}` does not take an argument", name),
        )),
    }
}

/// `N`, `N+` or `N-M`. Anything else digit-leading is malformed.
fn parse_counts(word: &str) -> Option<(u32, Option<u32>)> {
    if let Some(rest) = word.strip_suffix('+') {
        return rest.parse().ok().map(|n| (n, None));
    }
    if let Some((lo, hi)) = word.split_once('-') {
        return Some((lo.parse().ok()?, Some(hi.parse().ok()?)));
    }
    word.parse().ok().map(|n| (n, Some(n)))
}

fn is_valid_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn character_category(c: char) -> Option<&'static str> {
    if c.is_ascii_lowercase() {
        Some("a lowercase letter")
    } else if c.is_ascii_uppercase() {
        Some("an uppercase letter")
    } else if c.is_ascii_digit() {
        Some("a digit")
    } else {
        None
    }
}
