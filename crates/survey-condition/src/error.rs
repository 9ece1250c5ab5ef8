//! Error types for condition parsing and building.

use thiserror::Error;

/// Which operand slot of a binary construct is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The left operand.
    Left,
    /// The right operand.
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Errors that can occur while turning a condition sentence into a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// Empty input (or an empty parenthetical) provided.
    #[error("empty condition")]
    EmptyCondition,

    /// Lexing error at a specific position in the input.
    #[error("parse error at position {position}: {message}")]
    ParseError {
        /// Position in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// Opening and closing parentheses do not pair up.
    #[error("parenthetical mismatch: {0}")]
    UnbalancedParentheses(String),

    /// A conjunction or comparison was built without one of its operands.
    #[error("the '{construct}' does not have a {side} operand")]
    MissingOperand {
        /// Human name of the construct ("and", "less than", ...).
        construct: &'static str,
        /// The missing slot.
        side: Side,
    },

    /// Two terminals appeared with nothing joining them.
    #[error("more than one terminal in a row is not allowed: {0}")]
    ConsecutiveTerminals(String),

    /// A comparator was compared to another comparator.
    #[error("a comparator cannot be compared to another comparator: {0}")]
    ConsecutiveComparators(String),

    /// An operand was placed where it cannot be used.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    /// The sentence nests deeper than the configured limit.
    #[error("condition nests deeper than {limit} levels")]
    TooDeep {
        /// Configured maximum depth.
        limit: usize,
    },
}

/// Result type for condition parsing.
pub type ConditionResult<T> = std::result::Result<T, ConditionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_operand_display() {
        let err = ConditionError::MissingOperand {
            construct: "and",
            side: Side::Right,
        };
        assert_eq!(err.to_string(), "the 'and' does not have a right operand");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ConditionError::ParseError {
            position: 4,
            message: "unexpected input at: '#'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "parse error at position 4: unexpected input at: '#'"
        );
    }
}
