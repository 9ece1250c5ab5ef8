//! # survey-condition-executor
//!
//! Validation and evaluation of survey branching conditions.
//!
//! This crate takes the trees produced by [`survey-condition`] and checks
//! them against the survey they belong to, then evaluates them against the
//! answers recorded so far to decide whether an item is shown.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use survey_condition::Condition;
//! use survey_condition_executor::{
//!     validate, Evaluator, NumericRange, PromptDefinition, PromptType, ResponseMap,
//!     ResponseValue,
//! };
//!
//! // What the survey looks like
//! let mut items = HashMap::new();
//! items.insert(
//!     "sleep".to_string(),
//!     PromptDefinition::new(PromptType::Number(NumericRange::new(0, 24).unwrap()))
//!         .with_skippable(true),
//! );
//!
//! // Authoring time: parse once, validate once
//! let condition = Condition::parse("sleep < 6 OR sleep == SKIPPED").unwrap();
//! validate(&condition, &items).unwrap();
//!
//! // Submission time: evaluate against each participant's answers
//! let mut answers = ResponseMap::new();
//! answers.insert("sleep".into(), ResponseValue::from(5i64));
//! assert!(Evaluator::new().evaluate(&condition, &answers).unwrap());
//! ```
//!
//! ## With Configuration
//!
//! ```rust
//! use survey_condition_executor::{CacheConfig, Evaluator, ExecutorConfig, MissingResponsePolicy};
//!
//! let config = ExecutorConfig::builder()
//!     .with_max_depth(64)
//!     .with_missing_response_policy(MissingResponsePolicy::Error)
//!     .with_cache(CacheConfig::default())
//!     .build();
//!
//! let evaluator = Evaluator::with_config(config);
//! let condition = evaluator.compile("mood == 1 AND sleep").unwrap();
//! ```
//!
//! ## Prompt Types in Conditions
//!
//! | Prompt type | Literal | Comparators |
//! |-------------|---------|-------------|
//! | `number`, `hours_before_now` | integer in `[min, max]` | all |
//! | `single_choice`, `multi_choice` | configured choice key | `==` `!=` |
//! | `single_choice_custom`, `multi_choice_custom` | integer | `==` `!=` |
//! | `remote_activity` | number | all |
//! | `text`, `timestamp`, `photo`, `video`, `audio`, `document` | not allowed | none |
//!
//! `SKIPPED` may only be compared against skippable items; `NOT_DISPLAYED`
//! is always allowed.
//!
//! ## Feature Flags
//!
//! - `parallel` - Evaluates batches of response maps using rayon
//! - `serde` - Serialize/deserialize support for responses and configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod config;
mod error;
mod evaluator;
mod prompt;
mod response;
mod traits;
mod validator;

// Public re-exports
pub use cache::{normalize_cache_key, CacheStats, ConditionCache};
pub use config::{CacheConfig, ExecutorConfig, ExecutorConfigBuilder, MissingResponsePolicy};
pub use error::{ConditionExecutorError, ExecutorResult};
pub use evaluator::{evaluate, Evaluator};
pub use prompt::{ChoiceList, NumericRange, PromptType};
pub use response::{ResponseMap, ResponseSource, ResponseValue};
pub use traits::{PromptDefinition, SurveyCatalogue};
pub use validator::{validate, ConditionValidator};

// Re-export commonly used types from dependencies for convenience
pub use survey_condition::{Condition, NoResponse};
