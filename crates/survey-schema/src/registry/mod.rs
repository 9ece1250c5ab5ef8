//! Shared registry of loaded surveys.
//!
//! Services that receive submissions for many surveys keep them here and
//! look them up by id. Surveys are handed out as `Arc<Survey>` so a lookup
//! never holds the lock while a submission is processed.
//!
//! A registered survey stays reachable until it is removed. The configured
//! capacity bounds how many distinct ids may be registered; once it is
//! reached, registering a new id fails with [`SchemaError::RegistryFull`].
//!
//! # Example
//!
//! ```rust
//! use survey_condition_executor::{NumericRange, PromptType, ResponseMap, ResponseValue};
//! use survey_schema::{Survey, SurveyItem, SurveyRegistry};
//!
//! let registry = SurveyRegistry::new();
//! registry
//!     .insert(
//!         Survey::new(
//!             "steps",
//!             vec![SurveyItem::new("count", PromptType::Number(NumericRange::new(0, 50_000).unwrap()))],
//!         )
//!         .unwrap(),
//!     )
//!     .unwrap();
//!
//! let mut answers = ResponseMap::new();
//! answers.insert("count".into(), ResponseValue::from(4_200i64));
//!
//! let submission = registry.process_submission("steps", &answers).unwrap();
//! assert_eq!(submission.answered_count(), 1);
//! println!("{}", registry.stats());
//! ```

mod types;

pub use types::{RegistryConfig, RegistryStats};

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use survey_condition_executor::ResponseMap;

use crate::error::{SchemaError, SchemaResult};
use crate::submission::Submission;
use crate::survey::Survey;

/// A bounded, thread-safe map from survey id to survey.
pub struct SurveyRegistry {
    config: RegistryConfig,
    surveys: RwLock<HashMap<String, Arc<Survey>>>,
    stats: RwLock<RegistryStats>,
}

impl Default for SurveyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SurveyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyRegistry")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish()
    }
}

impl SurveyRegistry {
    /// Creates a registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates a registry with custom configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            surveys: RwLock::new(HashMap::new()),
            stats: RwLock::new(RegistryStats::default()),
        }
    }

    /// Adds a survey, replacing any survey with the same id.
    ///
    /// Fails with [`SchemaError::RegistryFull`] when the id is new and the
    /// registry is at capacity. Replacing an existing id always succeeds.
    pub fn insert(&self, survey: Survey) -> SchemaResult<Arc<Survey>> {
        let survey = Arc::new(survey);
        let id = survey.id().to_string();

        let mut surveys = self.surveys.write();
        let capacity = self.config.capacity.max(1);
        if !surveys.contains_key(&id) && surveys.len() >= capacity {
            drop(surveys);
            self.stats.write().rejections += 1;
            tracing::warn!(survey = id.as_str(), capacity, "survey registry full");
            return Err(SchemaError::RegistryFull {
                survey: id,
                capacity,
            });
        }
        let replaced = surveys.insert(id.clone(), Arc::clone(&survey)).is_some();
        drop(surveys);

        let mut stats = self.stats.write();
        stats.insertions += 1;
        if replaced {
            stats.replacements += 1;
            tracing::debug!(survey = id.as_str(), "survey replaced");
        } else {
            tracing::debug!(survey = id.as_str(), "survey registered");
        }
        Ok(survey)
    }

    /// Loads a survey document from disk and registers it.
    #[cfg(feature = "json")]
    pub fn load<P: AsRef<std::path::Path>>(&self, path: P) -> SchemaResult<Arc<Survey>> {
        self.insert(Survey::from_path(path)?)
    }

    /// Looks up a survey.
    pub fn get(&self, survey_id: &str) -> Option<Arc<Survey>> {
        let found = self.surveys.read().get(survey_id).cloned();
        let mut stats = self.stats.write();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    /// Removes a survey.
    pub fn remove(&self, survey_id: &str) -> Option<Arc<Survey>> {
        self.surveys.write().remove(survey_id)
    }

    /// Whether a survey is registered. Does not affect stats.
    pub fn contains(&self, survey_id: &str) -> bool {
        self.surveys.read().contains_key(survey_id)
    }

    /// Number of registered surveys.
    pub fn len(&self) -> usize {
        self.surveys.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.surveys.read().is_empty()
    }

    /// Removes every survey.
    pub fn clear(&self) {
        self.surveys.write().clear();
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.surveys.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns registry statistics.
    pub fn stats(&self) -> RegistryStats {
        self.stats.read().clone()
    }

    /// Resets statistics.
    pub fn reset_stats(&self) {
        *self.stats.write() = RegistryStats::default();
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Processes answers against a registered survey.
    pub fn process_submission(
        &self,
        survey_id: &str,
        answers: &ResponseMap,
    ) -> SchemaResult<Submission> {
        let survey = self
            .get(survey_id)
            .ok_or_else(|| SchemaError::UnknownSurvey(survey_id.to_string()))?;
        survey.process_submission(answers)
    }
}
