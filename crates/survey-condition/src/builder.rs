//! Mutable builders that accumulate a sentence into a [`Fragment`] tree.
//!
//! The parser turns each word of a sentence into a [`FragmentBuilder`] and
//! folds them together left to right with [`FragmentBuilder::merge`]. Once the
//! sentence is exhausted, [`FragmentBuilder::build`] checks that every binary
//! construct got both operands and produces the immutable tree.
//!
//! A conjunction fills its `left` slot on the first merge and its `right` slot
//! on the second. Further merges descend into the right slot, so chains nest
//! to the right:
//!
//! ```rust
//! use survey_condition::{ConjunctionKind, FragmentBuilder, Terminal};
//!
//! let builder = FragmentBuilder::terminal(Terminal::prompt_id("a"))
//!     .merge(FragmentBuilder::conjunction(ConjunctionKind::And)).unwrap()
//!     .merge(FragmentBuilder::terminal(Terminal::prompt_id("b"))).unwrap()
//!     .merge(FragmentBuilder::conjunction(ConjunctionKind::And)).unwrap()
//!     .merge(FragmentBuilder::terminal(Terminal::prompt_id("c"))).unwrap();
//!
//! let tree = builder.build().unwrap();
//! assert_eq!(tree.to_string(), "a AND b AND c");
//! ```

use crate::ast::{Comparator, Comparison, ConjunctionKind, Fragment, Leaf, Terminal};
use crate::error::{ConditionError, ConditionResult, Side};

/// Accumulation state for one piece of a sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentBuilder {
    /// A terminal waiting to be absorbed by a comparison or conjunction.
    Terminal(Terminal),
    /// A comparator collecting its two terminal operands.
    Comparison(ComparisonBuilder),
    /// A conjunction collecting its two operands.
    Conjunction(ConjunctionBuilder),
    /// A finished parenthesised sub-tree.
    Nested(Fragment),
}

impl FragmentBuilder {
    /// Builder for a single terminal.
    pub fn terminal(terminal: Terminal) -> Self {
        FragmentBuilder::Terminal(terminal)
    }

    /// Empty comparison builder.
    pub fn comparison(comparator: Comparator) -> Self {
        FragmentBuilder::Comparison(ComparisonBuilder::new(comparator))
    }

    /// Empty conjunction builder.
    pub fn conjunction(kind: ConjunctionKind) -> Self {
        FragmentBuilder::Conjunction(ConjunctionBuilder::new(kind))
    }

    /// Wraps a finished sub-tree that came from a parenthetical.
    pub fn nested(inner: Fragment) -> Self {
        FragmentBuilder::Nested(inner)
    }

    /// Folds `other` into this builder and returns the combined builder.
    ///
    /// The returned builder may be `other` itself when `other` is the one
    /// that absorbs `self` (for example a terminal followed by a comparator).
    pub fn merge(self, other: FragmentBuilder) -> ConditionResult<FragmentBuilder> {
        match self {
            FragmentBuilder::Terminal(terminal) => match other {
                FragmentBuilder::Terminal(next) => Err(ConditionError::ConsecutiveTerminals(
                    format!("{}, {}", terminal, next),
                )),
                other => other.merge(FragmentBuilder::Terminal(terminal)),
            },
            FragmentBuilder::Comparison(mut comparison) => match other {
                FragmentBuilder::Terminal(terminal) => {
                    comparison.push_operand(terminal)?;
                    Ok(FragmentBuilder::Comparison(comparison))
                }
                FragmentBuilder::Comparison(next) => Err(ConditionError::ConsecutiveComparators(
                    format!("{} {}", comparison.comparator, next.comparator),
                )),
                other => other.merge(FragmentBuilder::Comparison(comparison)),
            },
            FragmentBuilder::Conjunction(conjunction) => {
                Ok(FragmentBuilder::Conjunction(conjunction.merge(other)?))
            }
            FragmentBuilder::Nested(inner) => match other {
                FragmentBuilder::Conjunction(conjunction) => {
                    Ok(FragmentBuilder::Conjunction(
                        conjunction.merge(FragmentBuilder::Nested(inner))?,
                    ))
                }
                other => Err(ConditionError::InvalidOperand(format!(
                    "a parenthetical must be joined to '{}' by a conjunction",
                    other.describe()
                ))),
            },
        }
    }

    /// Produces the immutable tree, failing if any operand is missing.
    pub fn build(self) -> ConditionResult<Fragment> {
        match self {
            FragmentBuilder::Terminal(terminal) => Ok(Fragment::Leaf(Leaf::Terminal(terminal))),
            FragmentBuilder::Comparison(comparison) => comparison.build(),
            FragmentBuilder::Conjunction(conjunction) => conjunction.build(),
            FragmentBuilder::Nested(inner) => Ok(Fragment::Nested(Box::new(inner))),
        }
    }

    fn describe(&self) -> String {
        match self {
            FragmentBuilder::Terminal(t) => t.to_string(),
            FragmentBuilder::Comparison(c) => c.comparator.symbol().to_string(),
            FragmentBuilder::Conjunction(j) => j.kind.value().to_string(),
            FragmentBuilder::Nested(inner) => format!("({})", inner),
        }
    }
}

/// Collects the two terminal operands of a comparator.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonBuilder {
    comparator: Comparator,
    left: Option<Terminal>,
    right: Option<Terminal>,
}

impl ComparisonBuilder {
    /// Creates an empty builder.
    pub fn new(comparator: Comparator) -> Self {
        Self {
            comparator,
            left: None,
            right: None,
        }
    }

    /// The operator being built.
    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    fn push_operand(&mut self, terminal: Terminal) -> ConditionResult<()> {
        if self.left.is_none() {
            self.left = Some(terminal);
        } else if self.right.is_none() {
            self.right = Some(terminal);
        } else {
            let left = self.left.as_ref().map(ToString::to_string).unwrap_or_default();
            let right = self.right.as_ref().map(ToString::to_string).unwrap_or_default();
            return Err(ConditionError::ConsecutiveTerminals(format!(
                "{}, {}, {}",
                left, right, terminal
            )));
        }
        Ok(())
    }

    fn build(self) -> ConditionResult<Fragment> {
        let construct = self.comparator.name();
        let left = self.left.ok_or(ConditionError::MissingOperand {
            construct,
            side: Side::Left,
        })?;
        let right = self.right.ok_or(ConditionError::MissingOperand {
            construct,
            side: Side::Right,
        })?;
        Ok(Fragment::Leaf(Leaf::Comparison(Comparison::new(
            left,
            self.comparator,
            right,
        ))))
    }
}

/// Collects the two operands of an AND / OR.
#[derive(Debug, Clone, PartialEq)]
pub struct ConjunctionBuilder {
    kind: ConjunctionKind,
    left: Option<Box<FragmentBuilder>>,
    right: Option<Box<FragmentBuilder>>,
}

impl ConjunctionBuilder {
    /// Creates an empty builder.
    pub fn new(kind: ConjunctionKind) -> Self {
        Self {
            kind,
            left: None,
            right: None,
        }
    }

    /// The conjunction being built.
    pub fn kind(&self) -> ConjunctionKind {
        self.kind
    }

    /// Whether the left slot is filled.
    pub fn has_left(&self) -> bool {
        self.left.is_some()
    }

    /// Whether the right slot is filled.
    pub fn has_right(&self) -> bool {
        self.right.is_some()
    }

    /// Fills the left slot, then the right slot, then merges into the right
    /// subtree.
    ///
    /// The right spine is unzipped into a stack instead of recursing, so the
    /// cost of a long chain is heap, not call stack.
    pub fn merge(self, other: FragmentBuilder) -> ConditionResult<Self> {
        let mut spine: Vec<ConjunctionBuilder> = Vec::new();
        let mut current = self;

        loop {
            if current.left.is_none() {
                current.left = Some(Box::new(other));
                break;
            }
            match current.right.take() {
                None => {
                    current.right = Some(Box::new(other));
                    break;
                }
                Some(right) => match *right {
                    FragmentBuilder::Conjunction(inner) => {
                        spine.push(current);
                        current = inner;
                    }
                    operand => {
                        current.right = Some(Box::new(operand.merge(other)?));
                        break;
                    }
                },
            }
        }

        while let Some(mut parent) = spine.pop() {
            parent.right = Some(Box::new(FragmentBuilder::Conjunction(current)));
            current = parent;
        }
        Ok(current)
    }

    fn build(self) -> ConditionResult<Fragment> {
        let construct = self.kind.name();
        let left = self.left.ok_or(ConditionError::MissingOperand {
            construct,
            side: Side::Left,
        })?;
        let right = self.right.ok_or(ConditionError::MissingOperand {
            construct,
            side: Side::Right,
        })?;
        Ok(Fragment::conjunction(self.kind, left.build()?, right.build()?))
    }
}
