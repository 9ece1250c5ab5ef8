//! Tree types for parsed conditions.

use std::collections::BTreeMap;

// =============================================================================
// Terminals
// =============================================================================

/// Markers recorded for items that carry no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum NoResponse {
    /// The item was shown and the participant chose not to answer.
    Skipped,
    /// The item's own condition hid it.
    NotDisplayed,
}

impl NoResponse {
    /// Word for [`NoResponse::Skipped`].
    pub const SKIPPED: &'static str = "SKIPPED";
    /// Word for [`NoResponse::NotDisplayed`].
    pub const NOT_DISPLAYED: &'static str = "NOT_DISPLAYED";

    /// Looks up a marker by its exact word.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            Self::SKIPPED => Some(NoResponse::Skipped),
            Self::NOT_DISPLAYED => Some(NoResponse::NotDisplayed),
            _ => None,
        }
    }

    /// The word used for this marker in sentences and response maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoResponse::Skipped => Self::SKIPPED,
            NoResponse::NotDisplayed => Self::NOT_DISPLAYED,
        }
    }
}

impl std::fmt::Display for NoResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric literal, keeping the text it was written as.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberLiteral {
    /// Source text, e.g. `"-2.50"`.
    pub text: String,
    /// Parsed value.
    pub value: f64,
}

impl NumberLiteral {
    /// Creates a literal from its text, returning `None` if it is not numeric.
    pub fn parse(text: &str) -> Option<Self> {
        let value = text.parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            value,
        })
    }
}

impl From<i64> for NumberLiteral {
    fn from(value: i64) -> Self {
        Self {
            text: value.to_string(),
            value: value as f64,
        }
    }
}

impl std::fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// A leaf operand: a reference to a survey item or a literal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value", rename_all = "snake_case"))]
pub enum Terminal {
    /// The id of an earlier survey item; resolves to that item's response.
    PromptId(String),
    /// A numeric literal.
    Number(NumberLiteral),
    /// A no-response marker literal.
    NoResponse(NoResponse),
}

impl Terminal {
    /// Creates a prompt-id terminal.
    pub fn prompt_id(id: impl Into<String>) -> Self {
        Terminal::PromptId(id.into())
    }

    /// Creates an integer literal terminal.
    pub fn number(value: i64) -> Self {
        Terminal::Number(NumberLiteral::from(value))
    }

    /// Returns the referenced item id, if this terminal is a reference.
    pub fn as_prompt_id(&self) -> Option<&str> {
        match self {
            Terminal::PromptId(id) => Some(id),
            _ => None,
        }
    }

    /// Returns true for numeric and marker literals.
    pub fn is_literal(&self) -> bool {
        !matches!(self, Terminal::PromptId(_))
    }
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Terminal::PromptId(id) => f.write_str(id),
            Terminal::Number(n) => write!(f, "{}", n),
            Terminal::NoResponse(m) => write!(f, "{}", m),
        }
    }
}

// =============================================================================
// Comparators
// =============================================================================

/// Comparison operators usable between two terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparator {
    /// `==`
    Equals,
    /// `!=`
    NotEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEquals,
}

impl Comparator {
    /// All comparators, longest symbols first so lexing can try them in order.
    pub const ALL: [Comparator; 6] = [
        Comparator::Equals,
        Comparator::NotEquals,
        Comparator::LessThanEquals,
        Comparator::GreaterThanEquals,
        Comparator::LessThan,
        Comparator::GreaterThan,
    ];

    /// The symbol written in sentences.
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Equals => "==",
            Comparator::NotEquals => "!=",
            Comparator::LessThan => "<",
            Comparator::LessThanEquals => "<=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterThanEquals => ">=",
        }
    }

    /// Looks up a comparator by symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.symbol() == symbol)
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Comparator::Equals => "equals",
            Comparator::NotEquals => "not equals",
            Comparator::LessThan => "less than",
            Comparator::LessThanEquals => "less than or equals",
            Comparator::GreaterThan => "greater than",
            Comparator::GreaterThanEquals => "greater than or equals",
        }
    }

    /// The comparator that gives the same answer with operands swapped.
    pub fn mirrored(&self) -> Self {
        match self {
            Comparator::Equals => Comparator::Equals,
            Comparator::NotEquals => Comparator::NotEquals,
            Comparator::LessThan => Comparator::GreaterThan,
            Comparator::LessThanEquals => Comparator::GreaterThanEquals,
            Comparator::GreaterThan => Comparator::LessThan,
            Comparator::GreaterThanEquals => Comparator::LessThanEquals,
        }
    }

    /// Whether this comparator orders its operands (only meaningful for numbers).
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Comparator::Equals | Comparator::NotEquals)
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// =============================================================================
// Leaves and fragments
// =============================================================================

/// A comparison between two terminals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    /// Left operand.
    pub left: Terminal,
    /// Operator.
    pub comparator: Comparator,
    /// Right operand.
    pub right: Terminal,
}

impl Comparison {
    /// Creates a comparison.
    pub fn new(left: Terminal, comparator: Comparator, right: Terminal) -> Self {
        Self {
            left,
            comparator,
            right,
        }
    }

    /// Returns the `(prompt id, pair)` this comparison constrains, if it
    /// compares exactly one prompt id against a literal.
    ///
    /// Literal-on-the-left comparisons are mirrored so the id reads first.
    pub fn condition_value_pair(&self) -> Option<(&str, ConditionValuePair)> {
        match (&self.left, &self.right) {
            (Terminal::PromptId(id), literal) if literal.is_literal() => Some((
                id.as_str(),
                ConditionValuePair::new(self.comparator, literal.to_string()),
            )),
            (literal, Terminal::PromptId(id)) if literal.is_literal() => Some((
                id.as_str(),
                ConditionValuePair::new(self.comparator.mirrored(), literal.to_string()),
            )),
            _ => None,
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.comparator, self.right)
    }
}

/// A terminal fragment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Leaf {
    /// `left <op> right`
    Comparison(Comparison),
    /// A terminal on its own. For a prompt id this means "was answered".
    Terminal(Terminal),
}

impl Leaf {
    /// Prompt ids referenced by this leaf.
    pub fn prompt_ids(&self) -> Vec<&str> {
        match self {
            Leaf::Comparison(c) => [&c.left, &c.right]
                .into_iter()
                .filter_map(Terminal::as_prompt_id)
                .collect(),
            Leaf::Terminal(t) => t.as_prompt_id().into_iter().collect(),
        }
    }
}

impl std::fmt::Display for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leaf::Comparison(c) => write!(f, "{}", c),
            Leaf::Terminal(t) => write!(f, "{}", t),
        }
    }
}

/// Binary boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConjunctionKind {
    /// Both sides must hold.
    And,
    /// Either side must hold.
    Or,
}

impl ConjunctionKind {
    /// Keyword for [`ConjunctionKind::And`].
    pub const AND: &'static str = "AND";
    /// Keyword for [`ConjunctionKind::Or`].
    pub const OR: &'static str = "OR";

    /// The keyword rendered between operands.
    pub fn value(&self) -> &'static str {
        match self {
            ConjunctionKind::And => Self::AND,
            ConjunctionKind::Or => Self::OR,
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ConjunctionKind::And => "and",
            ConjunctionKind::Or => "or",
        }
    }
}

impl std::fmt::Display for ConjunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value())
    }
}

/// A node of a condition tree.
///
/// Conjunctions own both children; there are no parent links.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Fragment {
    /// `left AND right`
    And(Box<Fragment>, Box<Fragment>),
    /// `left OR right`
    Or(Box<Fragment>, Box<Fragment>),
    /// A comparison or bare terminal.
    Leaf(Leaf),
    /// A parenthesised sub-condition: `( inner )`
    Nested(Box<Fragment>),
}

impl Fragment {
    /// Joins two fragments with the given conjunction.
    pub fn conjunction(kind: ConjunctionKind, left: Fragment, right: Fragment) -> Self {
        match kind {
            ConjunctionKind::And => Fragment::And(Box::new(left), Box::new(right)),
            ConjunctionKind::Or => Fragment::Or(Box::new(left), Box::new(right)),
        }
    }

    /// Creates a comparison leaf.
    pub fn comparison(left: Terminal, comparator: Comparator, right: Terminal) -> Self {
        Fragment::Leaf(Leaf::Comparison(Comparison::new(left, comparator, right)))
    }

    /// Creates a bare terminal leaf.
    pub fn terminal(terminal: Terminal) -> Self {
        Fragment::Leaf(Leaf::Terminal(terminal))
    }

    /// Strips any number of enclosing parentheses.
    pub fn unwrap_nested(&self) -> &Fragment {
        let mut current = self;
        while let Fragment::Nested(inner) = current {
            current = inner;
        }
        current
    }

    /// Height of the tree; a single leaf has depth 1.
    ///
    /// Computed without recursion so it is safe on trees of any shape.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            max = max.max(level);
            match node {
                Fragment::And(l, r) | Fragment::Or(l, r) => {
                    stack.push((l, level + 1));
                    stack.push((r, level + 1));
                }
                Fragment::Nested(inner) => stack.push((inner, level + 1)),
                Fragment::Leaf(_) => {}
            }
        }
        max
    }

    /// All leaves, left to right.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Fragment::And(l, r) | Fragment::Or(l, r) => {
                    stack.push(r);
                    stack.push(l);
                }
                Fragment::Nested(inner) => stack.push(inner),
                Fragment::Leaf(leaf) => out.push(leaf),
            }
        }
        out
    }

    /// Every prompt id the tree references, deduplicated and sorted.
    pub fn prompt_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.leaves().into_iter().flat_map(Leaf::prompt_ids).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Groups every `id <op> literal` comparison by prompt id.
    pub fn condition_value_pairs(&self) -> BTreeMap<String, Vec<ConditionValuePair>> {
        let mut map: BTreeMap<String, Vec<ConditionValuePair>> = BTreeMap::new();
        for leaf in self.leaves() {
            if let Leaf::Comparison(c) = leaf {
                if let Some((id, pair)) = c.condition_value_pair() {
                    map.entry(id.to_string()).or_default().push(pair);
                }
            }
        }
        map
    }
}

impl std::fmt::Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fragment::And(l, r) => write!(f, "{} {} {}", l, ConjunctionKind::AND, r),
            Fragment::Or(l, r) => write!(f, "{} {} {}", l, ConjunctionKind::OR, r),
            Fragment::Leaf(leaf) => write!(f, "{}", leaf),
            Fragment::Nested(inner) => write!(f, "({})", inner),
        }
    }
}

/// A comparator and the raw literal a prompt id is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionValuePair {
    /// Operator, oriented with the prompt id on the left.
    pub comparator: Comparator,
    /// Literal text as written.
    pub value: String,
}

impl ConditionValuePair {
    /// Creates a pair.
    pub fn new(comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            comparator,
            value: value.into(),
        }
    }

    /// The no-response marker this pair compares against, if any.
    pub fn no_response(&self) -> Option<NoResponse> {
        NoResponse::from_word(&self.value)
    }
}

impl std::fmt::Display for ConditionValuePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.comparator, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(id: &str, value: i64) -> Fragment {
        Fragment::comparison(Terminal::prompt_id(id), Comparator::Equals, Terminal::number(value))
    }

    #[test]
    fn test_comparator_symbols_round_trip() {
        for c in Comparator::ALL {
            assert_eq!(Comparator::from_symbol(c.symbol()), Some(c));
        }
        assert_eq!(Comparator::from_symbol("="), None);
    }

    #[test]
    fn test_comparator_mirrored() {
        assert_eq!(Comparator::LessThan.mirrored(), Comparator::GreaterThan);
        assert_eq!(Comparator::GreaterThanEquals.mirrored(), Comparator::LessThanEquals);
        assert_eq!(Comparator::NotEquals.mirrored(), Comparator::NotEquals);
    }

    #[test]
    fn test_conjunction_values() {
        assert_eq!(ConjunctionKind::And.value(), "AND");
        assert_eq!(ConjunctionKind::Or.value(), "OR");
    }

    #[test]
    fn test_fragment_display() {
        let tree = Fragment::conjunction(
            ConjunctionKind::And,
            eq("a", 1),
            Fragment::Nested(Box::new(Fragment::conjunction(
                ConjunctionKind::Or,
                eq("b", 2),
                Fragment::terminal(Terminal::prompt_id("c")),
            ))),
        );
        assert_eq!(tree.to_string(), "a == 1 AND (b == 2 OR c)");
    }

    #[test]
    fn test_depth_and_leaves() {
        let tree = Fragment::conjunction(
            ConjunctionKind::And,
            eq("a", 1),
            Fragment::conjunction(ConjunctionKind::And, eq("b", 2), eq("c", 3)),
        );
        assert_eq!(tree.depth(), 3);
        let rendered: Vec<String> = tree.leaves().iter().map(|l| l.to_string()).collect();
        assert_eq!(rendered, vec!["a == 1", "b == 2", "c == 3"]);
    }

    #[test]
    fn test_condition_value_pairs_mirror_literal_on_left() {
        let tree = Fragment::conjunction(
            ConjunctionKind::Or,
            Fragment::comparison(Terminal::number(5), Comparator::LessThan, Terminal::prompt_id("q")),
            Fragment::comparison(
                Terminal::prompt_id("q"),
                Comparator::Equals,
                Terminal::NoResponse(NoResponse::Skipped),
            ),
        );
        let pairs = tree.condition_value_pairs();
        let q = &pairs["q"];
        assert_eq!(q[0], ConditionValuePair::new(Comparator::GreaterThan, "5"));
        assert_eq!(q[1].no_response(), Some(NoResponse::Skipped));
    }

    #[test]
    fn test_prompt_ids_dedup() {
        let tree = Fragment::conjunction(ConjunctionKind::And, eq("b", 1), eq("a", 2));
        let tree = Fragment::conjunction(ConjunctionKind::Or, tree, eq("b", 3));
        assert_eq!(tree.prompt_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_number_literal_keeps_text() {
        let n = NumberLiteral::parse("2.50").unwrap();
        assert_eq!(n.to_string(), "2.50");
        assert_eq!(n.value, 2.5);
        assert!(NumberLiteral::parse("abc").is_none());
        assert!(NumberLiteral::parse("inf").is_none());
    }
}
