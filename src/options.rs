//! Compilation options and output flavors.

/// Default bound on transitive macro expansion depth.
pub const DEFAULT_MAX_EXPANSION_DEPTH: usize = 100;

/// The regex dialect to emit.
///
/// Flavors differ in the constructs they can express; see the anchor and
/// class mappings in `emit`. Differences surface through `#any`, `#letter`
/// and the string anchors, never through silently changed semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    /// PCRE-like output: `\A`/`\Z` anchors, `(?P<name>…)` named groups,
    /// `(?i:…)` inline case folding.
    #[default]
    Pcre,
    /// ECMAScript-like output restricted to the portable subset: no
    /// `\A`/`\Z`, no inline flag groups, `(?<name>…)` named groups.
    EcmaScript,
}

/// Options accepted by [`compile`](crate::compile).
#[derive(Debug, Clone)]
pub struct Options {
    pub flavor: Flavor,
    /// Whether the caller intends to run the result with multiline
    /// semantics. Affects the mapping of `#start_string`/`#end_string`.
    pub multiline: bool,
    /// Map `#letter`/`#lowercase`/`#uppercase` to Unicode property classes
    /// instead of ASCII ranges.
    pub unicode: bool,
    /// Bound on transitive macro expansion depth.
    pub max_expansion_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            flavor: Flavor::default(),
            multiline: false,
            unicode: false,
            max_expansion_depth: DEFAULT_MAX_EXPANSION_DEPTH,
        }
    }
}
