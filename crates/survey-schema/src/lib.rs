//! # survey-schema
//!
//! Ordered surveys built on `survey-condition` and
//! `survey-condition-executor`.
//!
//! A [`Survey`] is a list of items, each optionally shown only when a
//! condition over earlier answers holds. Building a survey checks ids,
//! condition placement and every condition's literals. Processing a
//! submission walks the items in order and records each one as answered,
//! `SKIPPED` or `NOT_DISPLAYED`.
//!
//! ## Features
//!
//! - **`json`**: Load and save surveys as JSON documents
//! - **`registry`**: Thread-safe, bounded registry of loaded surveys
//! - **`full`**: Enable everything
//!
//! ## Quick Start
//!
//! ```rust
//! use survey_condition_executor::{ChoiceList, NumericRange, PromptType, ResponseMap, ResponseValue};
//! use survey_schema::{Survey, SurveyItem};
//!
//! let survey = Survey::new(
//!     "morning",
//!     vec![
//!         SurveyItem::new("sleep", PromptType::Number(NumericRange::new(0, 24).unwrap())),
//!         SurveyItem::new(
//!             "rested",
//!             PromptType::SingleChoice(ChoiceList::new([(0, "no"), (1, "yes")]).unwrap()),
//!         )
//!         .with_condition_str("sleep >= 7")
//!         .unwrap(),
//!     ],
//! )
//! .unwrap();
//!
//! let mut answers = ResponseMap::new();
//! answers.insert("sleep".into(), ResponseValue::from(8i64));
//! answers.insert("rested".into(), ResponseValue::from(1i64));
//!
//! let submission = survey.process_submission(&answers).unwrap();
//! assert_eq!(submission.displayed_count(), 2);
//! ```
//!
//! ### Loading from JSON (feature: `json`)
//!
//! ```ignore
//! use survey_schema::Survey;
//!
//! let survey = Survey::from_path("surveys/morning.json")?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod submission;
pub mod survey;

// Feature-gated modules
#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "registry")]
pub mod registry;

// Re-export commonly used types
pub use error::{SchemaError, SchemaResult};
pub use submission::Submission;
pub use survey::{Survey, SurveyItem};

#[cfg(feature = "json")]
pub use json::{Bound, ChoiceDocument, ItemDocument, SurveyDocument};

#[cfg(feature = "registry")]
pub use registry::{RegistryConfig, RegistryStats, SurveyRegistry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Survey>();
        assert_send_sync::<Submission>();
        assert_send_sync::<SchemaError>();
    }

    #[cfg(feature = "registry")]
    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SurveyRegistry>();
    }
}
