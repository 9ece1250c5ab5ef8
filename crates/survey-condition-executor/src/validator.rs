//! Authoring-time checks of a condition against the survey it belongs to.

use survey_condition::{Comparison, Condition, Fragment, Leaf, NoResponse, Terminal};

use crate::config::ExecutorConfig;
use crate::error::{ConditionExecutorError, ExecutorResult};
use crate::traits::{PromptDefinition, SurveyCatalogue};

/// Checks conditions against a survey catalogue.
///
/// Validation walks the tree left to right and stops at the first problem.
/// A condition that passes can be evaluated against any response map the
/// survey produces.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use survey_condition::Condition;
/// use survey_condition_executor::{
///     ChoiceList, ConditionValidator, PromptDefinition, PromptType,
/// };
///
/// let mut items = HashMap::new();
/// items.insert(
///     "mood".to_string(),
///     PromptDefinition::new(PromptType::SingleChoice(
///         ChoiceList::new([(0, "low"), (1, "high")]).unwrap(),
///     )),
/// );
///
/// let validator = ConditionValidator::new(&items);
/// assert!(validator.validate(&Condition::parse("mood == 1").unwrap()).is_ok());
/// assert!(validator.validate(&Condition::parse("mood == 4").unwrap()).is_err());
/// assert!(validator.validate(&Condition::parse("mood == SKIPPED").unwrap()).is_err());
/// ```
pub struct ConditionValidator<'a> {
    catalogue: &'a dyn SurveyCatalogue,
    max_depth: usize,
}

impl<'a> ConditionValidator<'a> {
    /// Creates a validator with the default configuration.
    pub fn new(catalogue: &'a dyn SurveyCatalogue) -> Self {
        Self::with_config(catalogue, &ExecutorConfig::default())
    }

    /// Creates a validator using the limits in `config`.
    pub fn with_config(catalogue: &'a dyn SurveyCatalogue, config: &ExecutorConfig) -> Self {
        Self {
            catalogue,
            max_depth: config.max_depth,
        }
    }

    /// Validates a whole condition.
    pub fn validate(&self, condition: &Condition) -> ExecutorResult<()> {
        self.validate_fragment(condition.root())?;
        tracing::debug!(
            condition = condition.sentence(),
            "validated condition"
        );
        Ok(())
    }

    /// Validates a tree, failing on the first invalid leaf.
    pub fn validate_fragment(&self, fragment: &Fragment) -> ExecutorResult<()> {
        let depth = fragment.depth();
        if depth > self.max_depth {
            return Err(ConditionExecutorError::DepthExceeded {
                depth,
                limit: self.max_depth,
            });
        }
        for leaf in fragment.leaves() {
            self.validate_leaf(leaf)?;
        }
        Ok(())
    }

    fn validate_leaf(&self, leaf: &Leaf) -> ExecutorResult<()> {
        match leaf {
            Leaf::Terminal(Terminal::PromptId(id)) => self.lookup(id).map(|_| ()),
            Leaf::Terminal(literal) => Err(ConditionExecutorError::NoPromptReference(
                literal.to_string(),
            )),
            Leaf::Comparison(comparison) => self.validate_comparison(comparison),
        }
    }

    fn validate_comparison(&self, comparison: &Comparison) -> ExecutorResult<()> {
        match (&comparison.left, &comparison.right) {
            (Terminal::PromptId(left), Terminal::PromptId(right)) => {
                let left_def = self.lookup(left)?;
                let right_def = self.lookup(right)?;
                if comparison.comparator.is_ordering() {
                    for (id, def) in [(left, left_def), (right, right_def)] {
                        if !def.prompt_type.is_numeric() {
                            return Err(def.prompt_type.comparator_error(id, comparison.comparator));
                        }
                    }
                }
                Ok(())
            }
            _ => {
                let (id, pair) = comparison.condition_value_pair().ok_or_else(|| {
                    ConditionExecutorError::NoPromptReference(comparison.to_string())
                })?;
                let def = self.lookup(id)?;

                if let Some(marker) = pair.no_response() {
                    if marker == NoResponse::Skipped && !def.skippable {
                        return Err(ConditionExecutorError::SkipNotAllowed(id.to_string()));
                    }
                    if pair.comparator.is_ordering() {
                        return Err(def.prompt_type.comparator_error(id, pair.comparator));
                    }
                }

                def.prompt_type.validate_condition_value_pair(id, &pair)
            }
        }
    }

    fn lookup(&self, prompt_id: &str) -> ExecutorResult<&'a PromptDefinition> {
        let def = self
            .catalogue
            .prompt(prompt_id)
            .ok_or_else(|| ConditionExecutorError::UnknownItem(prompt_id.to_string()))?;
        if !def.prompt_type.allows_conditions() {
            return Err(ConditionExecutorError::ConditionsNotAllowed {
                prompt_id: prompt_id.to_string(),
                prompt_type: def.prompt_type.name(),
            });
        }
        Ok(def)
    }
}

/// Validates `condition` against `catalogue` with default limits.
pub fn validate(condition: &Condition, catalogue: &dyn SurveyCatalogue) -> ExecutorResult<()> {
    ConditionValidator::new(catalogue).validate(condition)
}
