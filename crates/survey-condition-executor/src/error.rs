//! Error types for condition validation and evaluation.

use survey_condition::{Comparator, ConditionError};
use thiserror::Error;

/// Errors raised while checking a condition against a survey or evaluating it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionExecutorError {
    /// The sentence did not parse.
    #[error("condition parse error: {0}")]
    Parse(#[from] ConditionError),

    /// The condition references an item the survey does not have.
    #[error("unknown survey item in condition: {0}")]
    UnknownItem(String),

    /// A literal is not valid for the referenced item's prompt type.
    #[error("invalid value '{value}' for prompt '{prompt_id}': {reason}")]
    InvalidValue {
        /// Referenced item.
        prompt_id: String,
        /// Literal as written.
        value: String,
        /// What was expected.
        reason: String,
    },

    /// A numeric literal falls outside the item's configured bounds.
    #[error("value {value} for prompt '{prompt_id}' is outside [{min}, {max}]")]
    OutOfRange {
        /// Referenced item.
        prompt_id: String,
        /// Parsed literal.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// `SKIPPED` was compared against an item that cannot be skipped.
    #[error("SKIPPED not allowed for prompt type in condition: {0}")]
    SkipNotAllowed(String),

    /// The comparator makes no sense for the item's prompt type.
    #[error("comparator '{comparator}' not allowed for prompt '{prompt_id}' of type {prompt_type}")]
    ComparatorNotAllowed {
        /// Referenced item.
        prompt_id: String,
        /// Offending comparator.
        comparator: Comparator,
        /// Name of the item's prompt type.
        prompt_type: &'static str,
    },

    /// The item's prompt type cannot appear in conditions at all.
    #[error("conditions are not allowed for prompt '{prompt_id}' of type {prompt_type}")]
    ConditionsNotAllowed {
        /// Referenced item.
        prompt_id: String,
        /// Name of the item's prompt type.
        prompt_type: &'static str,
    },

    /// A condition leaf carries no reference to any item.
    #[error("condition leaf does not reference a survey item: {0}")]
    NoPromptReference(String),

    /// A prompt's own configuration is unusable.
    #[error("invalid prompt configuration: {0}")]
    InvalidPromptConfig(String),

    /// The response map has no entry for a referenced item.
    #[error("no response recorded for prompt '{0}'")]
    MissingResponse(String),

    /// The tree is taller than the configured limit.
    #[error("condition depth {depth} exceeds limit {limit}")]
    DepthExceeded {
        /// Height of the tree.
        depth: usize,
        /// Configured maximum.
        limit: usize,
    },
}

/// Result type for executor operations.
pub type ExecutorResult<T> = std::result::Result<T, ConditionExecutorError>;
