//! Configuration types for the condition executor.

use survey_condition::{Grammar, DEFAULT_MAX_DEPTH};

/// What the evaluator does when a referenced item has no entry in the
/// response map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MissingResponsePolicy {
    /// The leaf that reads the missing item evaluates to `false`.
    #[default]
    TreatAsUnanswered,
    /// Evaluation fails with [`MissingResponse`](crate::ConditionExecutorError::MissingResponse).
    Error,
}

/// Configuration for the condition executor.
///
/// # Example
///
/// ```rust
/// use survey_condition_executor::{CacheConfig, ExecutorConfig, MissingResponsePolicy};
///
/// let config = ExecutorConfig::builder()
///     .with_max_depth(64)
///     .with_missing_response_policy(MissingResponsePolicy::Error)
///     .with_cache(CacheConfig::default())
///     .build();
///
/// assert_eq!(config.max_depth, 64);
/// ```
///
/// With the `serde` feature, absent fields take their defaults:
/// `{"missing_response": "error"}` is a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecutorConfig {
    /// Tallest tree the validator and evaluator accept.
    pub max_depth: usize,
    /// Behaviour for response maps lacking a referenced item.
    pub missing_response: MissingResponsePolicy,
    /// Compiled-condition cache configuration (None = caching disabled).
    pub cache: Option<CacheConfig>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            missing_response: MissingResponsePolicy::default(),
            cache: None,
        }
    }
}

impl ExecutorConfig {
    /// Creates a new builder for ExecutorConfig.
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }

    /// The grammar sentences are parsed with under this configuration.
    pub fn grammar(&self) -> Grammar {
        Grammar::default().with_max_depth(self.max_depth)
    }
}

/// Builder for ExecutorConfig.
#[derive(Debug, Clone)]
pub struct ExecutorConfigBuilder {
    max_depth: usize,
    missing_response: MissingResponsePolicy,
    cache: Option<CacheConfig>,
}

impl Default for ExecutorConfigBuilder {
    fn default() -> Self {
        let defaults = ExecutorConfig::default();
        Self {
            max_depth: defaults.max_depth,
            missing_response: defaults.missing_response,
            cache: defaults.cache,
        }
    }
}

impl ExecutorConfigBuilder {
    /// Sets the maximum tree height (at least 1).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Sets the missing-response policy.
    pub fn with_missing_response_policy(mut self, policy: MissingResponsePolicy) -> Self {
        self.missing_response = policy;
        self
    }

    /// Enables the compiled-condition cache.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builds the ExecutorConfig.
    pub fn build(self) -> ExecutorConfig {
        ExecutorConfig {
            max_depth: self.max_depth,
            missing_response: self.missing_response,
            cache: self.cache,
        }
    }
}

/// Configuration for the compiled-condition cache.
///
/// # Example
///
/// ```rust
/// use survey_condition_executor::CacheConfig;
///
/// let cache = CacheConfig { max_entries: 1_000 };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
    /// Maximum number of compiled conditions kept (at least 1 is kept).
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}
