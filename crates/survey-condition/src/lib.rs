//! # survey-condition
//!
//! Parser for survey branching conditions.
//!
//! A survey item may carry a condition sentence that decides whether the item
//! is shown, based on the answers to earlier items. This crate turns such a
//! sentence into an immutable [`Fragment`] tree. Checking the tree against a
//! survey and evaluating it against responses lives in
//! `survey-condition-executor`.
//!
//! ## Usage
//!
//! ```rust
//! use survey_condition::{parse, Condition, Fragment};
//!
//! // A single comparison
//! let tree = parse("exercise_minutes >= 30").unwrap();
//!
//! // Chains nest to the right: a AND (b AND c)
//! let tree = parse("mood == 1 AND sleep < 6 AND stress == SKIPPED").unwrap();
//! assert!(matches!(tree, Fragment::And(_, _)));
//!
//! // Keep the authored sentence next to the tree
//! let condition = Condition::parse("(mood == 1 OR mood == 2) AND sleep").unwrap();
//! assert_eq!(condition.prompt_ids(), vec!["mood", "sleep"]);
//! ```
//!
//! ## Syntax Quick Reference
//!
//! | Token | Meaning | Example |
//! |-------|---------|---------|
//! | prompt id | Response to an earlier item | `mood` |
//! | number | Numeric literal | `3`, `-2.5` |
//! | `SKIPPED` | Item was skipped | `mood == SKIPPED` |
//! | `NOT_DISPLAYED` | Item was hidden by its own condition | `mood == NOT_DISPLAYED` |
//! | `==` `!=` | Equality | `mood != 2` |
//! | `<` `<=` `>` `>=` | Numeric ordering | `sleep <= 6` |
//! | `AND` `OR` | Conjunctions (right-nesting, equal precedence) | `a AND b` |
//! | `( )` | Grouping | `(a OR b) AND c` |
//!
//! A bare prompt id is true when that item has an answer.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
mod builder;
mod condition;
mod error;
mod grammar;
mod parser;

pub use ast::{
    Comparator, Comparison, ConditionValuePair, ConjunctionKind, Fragment, Leaf, NoResponse,
    NumberLiteral, Terminal,
};
pub use builder::{ComparisonBuilder, ConjunctionBuilder, FragmentBuilder};
pub use condition::Condition;
pub use error::{ConditionError, ConditionResult, Side};
pub use grammar::{Grammar, DEFAULT_MAX_DEPTH};
pub use parser::{parse, parse_with};
