//! Keyword table and limits used by the parser.

use crate::ast::ConjunctionKind;
use crate::builder::FragmentBuilder;

/// Default cap on tree height.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// The conjunction keywords a parser recognises, plus parse limits.
///
/// Keywords match exactly (case-sensitive).
///
/// # Example
///
/// ```rust
/// use survey_condition::{ConjunctionKind, Grammar};
///
/// let grammar = Grammar::default();
/// assert_eq!(grammar.conjunction_kind("AND"), Some(ConjunctionKind::And));
/// assert_eq!(grammar.conjunction_kind("and"), None);
///
/// let grammar = Grammar::default().with_conjunction("&&", ConjunctionKind::And);
/// assert!(grammar.conjunction_builder("&&").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Grammar {
    conjunctions: Vec<(String, ConjunctionKind)>,
    max_depth: usize,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            conjunctions: vec![
                (ConjunctionKind::AND.to_string(), ConjunctionKind::And),
                (ConjunctionKind::OR.to_string(), ConjunctionKind::Or),
            ],
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Grammar {
    /// Grammar with the `AND` / `OR` keywords.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or re-binds) a conjunction keyword.
    pub fn with_conjunction(mut self, word: impl Into<String>, kind: ConjunctionKind) -> Self {
        let word = word.into();
        self.conjunctions.retain(|(w, _)| *w != word);
        self.conjunctions.push((word, kind));
        self
    }

    /// Sets the maximum tree height a sentence may produce.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Maximum tree height.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Looks up the conjunction a word stands for.
    pub fn conjunction_kind(&self, word: &str) -> Option<ConjunctionKind> {
        self.conjunctions
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, kind)| *kind)
    }

    /// Returns an empty builder for a conjunction word, or `None` when the
    /// word is not a conjunction.
    pub fn conjunction_builder(&self, word: &str) -> Option<FragmentBuilder> {
        self.conjunction_kind(word).map(FragmentBuilder::conjunction)
    }

    /// Whether a word is a conjunction keyword.
    pub fn is_conjunction(&self, word: &str) -> bool {
        self.conjunction_kind(word).is_some()
    }
}
