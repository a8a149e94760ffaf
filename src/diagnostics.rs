//! Diagnostic types and rendering utilities.

use annotate_snippets::{AnnotationKind, Level, Patch, Renderer, Snippet};
use rowan::{TextRange, TextSize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Classifier for what went wrong. Every diagnostic carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    /// Malformed tokens, unmatched brackets or quotes, empty input,
    /// operator/alternation mix, malformed quantifiers, unknown operators.
    #[default]
    Syntax,
    /// Macro reference with no definition in scope.
    UnknownMacro,
    /// Transitive self-reference among user definitions.
    CyclicMacro,
    /// Same macro name defined twice in one scope.
    DuplicateDefinition,
    /// Range endpoints in different character classes or not strictly ordered.
    InvalidRange,
    /// `not` applied to something that is not a single character or class.
    InvalidNegation,
    /// Construct recognized but not expressible in the chosen flavor.
    UnsupportedOperator,
    /// Macro expansion recursion limit reached.
    ExpansionDepthExceeded,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::UnknownMacro => "unknown-macro",
            ErrorKind::CyclicMacro => "cyclic-macro",
            ErrorKind::DuplicateDefinition => "duplicate-definition",
            ErrorKind::InvalidRange => "invalid-range",
            ErrorKind::InvalidNegation => "invalid-negation",
            ErrorKind::UnsupportedOperator => "unsupported-operator",
            ErrorKind::ExpansionDepthExceeded => "expansion-depth-exceeded",
        };
        write!(f, "{}", name)
    }
}

/// A suggested fix for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub replacement: String,
    pub description: String,
}

impl Fix {
    pub fn new(replacement: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
            description: description.into(),
        }
    }
}

/// Related location information for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub range: TextRange,
    pub message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

/// A diagnostic with location, classifier, message, and optional fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: ErrorKind,
    pub range: TextRange,
    pub message: String,
    pub fix: Option<Fix>,
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(kind: ErrorKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            range,
            message: message.into(),
            fix: None,
            related: Vec::new(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(kind: ErrorKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, range, message)
        }
    }

    /// Create an error at a zero-width position.
    pub fn error_at(kind: ErrorKind, offset: TextSize, message: impl Into<String>) -> Self {
        Self::error(kind, TextRange::empty(offset), message)
    }

    /// Add a fix suggestion.
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Add a related location.
    pub fn with_related(mut self, related: RelatedInfo) -> Self {
        self.related.push(related);
        self
    }

    /// Add multiple related locations.
    pub fn with_related_many(mut self, related: impl IntoIterator<Item = RelatedInfo>) -> Self {
        self.related.extend(related);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity,
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        if let Some(fix) = &self.fix {
            write!(f, " (fix: {})", fix.description)?;
        }
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Collection of diagnostics from one compilation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.0.iter().filter(|d| d.is_error()).count()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self(diagnostics)
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Options for rendering diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub colored: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { colored: true }
    }
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn colored() -> Self {
        Self { colored: true }
    }
}

/// Render diagnostics using annotate-snippets.
pub fn render_diagnostics(
    source: &str,
    diagnostics: &[Diagnostic],
    path: Option<&str>,
    options: RenderOptions,
) -> String {
    let renderer = if options.colored {
        Renderer::styled()
    } else {
        Renderer::plain()
    };

    let reports: Vec<String> = diagnostics
        .iter()
        .map(|diagnostic| render_one(source, diagnostic, path, &renderer))
        .collect();
    reports.join("\n")
}

/// One diagnostic becomes one report: the annotated source, followed by a
/// help section when a fix is attached.
fn render_one(
    source: &str,
    diagnostic: &Diagnostic,
    path: Option<&str>,
    renderer: &Renderer,
) -> String {
    let mut body = Snippet::source(source).line_start(1);
    if let Some(path) = path {
        body = body.path(path);
    }
    body = body.annotation(
        AnnotationKind::Primary
            .span(caret_span(diagnostic.range, source))
            .label(&diagnostic.message),
    );
    for note in &diagnostic.related {
        body = body.annotation(
            AnnotationKind::Context
                .span(caret_span(note.range, source))
                .label(&note.message),
        );
    }

    let severity = match diagnostic.severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    };
    let mut groups = vec![severity.primary_title(&diagnostic.message).element(body)];

    if let Some(fix) = &diagnostic.fix {
        // The patch keeps the raw span: a zero-width fix is an insertion
        let patch = Patch::new(diagnostic.range.into(), fix.replacement.as_str());
        groups.push(
            Level::HELP
                .secondary_title(&fix.description)
                .element(Snippet::source(source).line_start(1).patch(patch)),
        );
    }

    renderer.render(&groups).to_string()
}

/// Zero-width spans widen by one character so the caret lands on something.
fn caret_span(range: TextRange, source: &str) -> std::ops::Range<usize> {
    let mut span = std::ops::Range::<usize>::from(range);
    if span.is_empty() {
        span.end = (span.start + 1).min(source.len());
    }
    span
}
