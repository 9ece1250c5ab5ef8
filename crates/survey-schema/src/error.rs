//! Error types for the schema crate.

use survey_condition_executor::ConditionExecutorError;

#[cfg(feature = "json")]
use std::path::PathBuf;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while loading a survey or processing a submission.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A survey needs at least one item.
    #[error("survey '{0}' has no items")]
    EmptySurvey(String),

    /// Two items share an id.
    #[error("duplicate survey item id: {0}")]
    DuplicateItem(String),

    /// The first item of a survey carries a condition.
    #[error("the first survey item '{0}' may not have a condition")]
    ConditionOnFirstItem(String),

    /// A condition reads an item that is not before it.
    #[error("condition on '{item}' references '{reference}', which does not precede it")]
    ForwardReference {
        /// Item carrying the condition.
        item: String,
        /// Item the condition refers to.
        reference: String,
    },

    /// A condition failed to parse, validate or evaluate.
    #[error("invalid condition on '{item}': {source}")]
    Condition {
        /// Item carrying the condition.
        item: String,
        /// Underlying failure.
        #[source]
        source: ConditionExecutorError,
    },

    /// A prompt's configuration is unusable.
    #[error("invalid prompt '{item}': {source}")]
    InvalidPrompt {
        /// Offending item.
        item: String,
        /// Underlying failure.
        #[source]
        source: ConditionExecutorError,
    },

    /// A survey document names a prompt type that does not exist.
    #[error("item '{item}' has unknown prompt type '{prompt_type}'")]
    UnknownPromptType {
        /// Offending item.
        item: String,
        /// Name found in the document.
        prompt_type: String,
    },

    /// A submission answers an item the survey does not have.
    #[error("response for unknown survey item: {0}")]
    UnknownItem(String),

    /// An item hidden by its condition has an answer.
    #[error("item '{0}' was not displayed but has a response")]
    UnexpectedResponse(String),

    /// An item shown to the participant is recorded as NOT_DISPLAYED.
    #[error("item '{0}' was displayed but is recorded as NOT_DISPLAYED")]
    DisplayMismatch(String),

    /// A shown, non-skippable item has no answer.
    #[error("item '{0}' is not skippable but has no response")]
    NotSkippable(String),

    /// An answer is not something the prompt could produce.
    #[error("invalid response for '{item}': {source}")]
    InvalidResponse {
        /// Offending item.
        item: String,
        /// Underlying failure.
        #[source]
        source: ConditionExecutorError,
    },

    /// No survey with that id is registered.
    #[cfg(feature = "registry")]
    #[error("survey not found: {0}")]
    UnknownSurvey(String),

    /// The registry already holds its configured number of surveys.
    #[cfg(feature = "registry")]
    #[error("survey registry is full ({capacity} surveys); remove one before adding {survey}")]
    RegistryFull {
        /// Id of the survey that was rejected.
        survey: String,
        /// Configured capacity.
        capacity: usize,
    },

    /// I/O error while reading or writing a survey document.
    #[cfg(feature = "json")]
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed survey document.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Creates an I/O error with path context.
    #[cfg(feature = "json")]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The item the error is about, if any.
    pub fn item(&self) -> Option<&str> {
        match self {
            SchemaError::DuplicateItem(item)
            | SchemaError::ConditionOnFirstItem(item)
            | SchemaError::UnknownItem(item)
            | SchemaError::UnexpectedResponse(item)
            | SchemaError::DisplayMismatch(item)
            | SchemaError::NotSkippable(item) => Some(item),
            SchemaError::ForwardReference { item, .. }
            | SchemaError::Condition { item, .. }
            | SchemaError::InvalidPrompt { item, .. }
            | SchemaError::UnknownPromptType { item, .. }
            | SchemaError::InvalidResponse { item, .. } => Some(item),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_forward_reference() {
        let err = SchemaError::ForwardReference {
            item: "q1".to_string(),
            reference: "q3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "condition on 'q1' references 'q3', which does not precede it"
        );
        assert_eq!(err.item(), Some("q1"));
    }

    #[test]
    fn test_error_display_wraps_source() {
        let err = SchemaError::Condition {
            item: "q2".to_string(),
            source: ConditionExecutorError::SkipNotAllowed("q1".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "invalid condition on 'q2': SKIPPED not allowed for prompt type in condition: q1"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_item_absent_for_survey_level_errors() {
        assert_eq!(SchemaError::EmptySurvey("s".to_string()).item(), None);
    }
}
