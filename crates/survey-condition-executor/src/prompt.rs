//! Prompt types and the value rules each one imposes on conditions.
//!
//! A condition such as `sleep_hours > 8` is only meaningful if `8` is a value
//! the `sleep_hours` prompt could have produced. Each [`PromptType`] knows
//! which literals and comparators are acceptable, and which recorded answers
//! are well formed.

use std::collections::BTreeMap;

use survey_condition::{Comparator, ConditionValuePair, NoResponse};

use crate::error::{ConditionExecutorError, ExecutorResult};
use crate::response::ResponseValue;

// =============================================================================
// Numeric range
// =============================================================================

/// Inclusive integer bounds for number-like prompts.
///
/// # Example
///
/// ```rust
/// use survey_condition_executor::NumericRange;
///
/// let range = NumericRange::from_attributes("0", "24").unwrap();
/// assert!(range.contains(24));
/// assert!(!range.contains(25));
///
/// assert!(NumericRange::new(10, 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericRange {
    min: i64,
    max: i64,
}

impl NumericRange {
    /// Creates a range, rejecting `max < min`.
    pub fn new(min: i64, max: i64) -> ExecutorResult<Self> {
        if max < min {
            return Err(ConditionExecutorError::InvalidPromptConfig(format!(
                "max ({}) is less than min ({})",
                max, min
            )));
        }
        Ok(Self { min, max })
    }

    /// Creates a range from textual `min` / `max` attributes.
    pub fn from_attributes(min: &str, max: &str) -> ExecutorResult<Self> {
        let parse = |name: &str, raw: &str| {
            raw.trim().parse::<i64>().map_err(|_| {
                ConditionExecutorError::InvalidPromptConfig(format!(
                    "{} must be an integer, got '{}'",
                    name, raw
                ))
            })
        };
        Self::new(parse("min", min)?, parse("max", max)?)
    }

    /// Lower bound.
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: i64) -> bool {
        !(value < self.min || value > self.max)
    }

    /// Checks a condition literal against the range.
    ///
    /// No-response markers pass; they are governed by the skip policy.
    pub fn validate_literal(&self, prompt_id: &str, value: &str) -> ExecutorResult<()> {
        if NoResponse::from_word(value).is_some() {
            return Ok(());
        }
        let parsed = value.parse::<i64>().map_err(|_| ConditionExecutorError::InvalidValue {
            prompt_id: prompt_id.to_string(),
            value: value.to_string(),
            reason: "expected an integer".to_string(),
        })?;
        if !self.contains(parsed) {
            return Err(ConditionExecutorError::OutOfRange {
                prompt_id: prompt_id.to_string(),
                value: parsed,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Choices
// =============================================================================

/// The keyed options of a choice prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChoiceList {
    choices: BTreeMap<i64, String>,
}

impl ChoiceList {
    /// Creates a list; it must be non-empty and keys must be unique.
    pub fn new<I, S>(choices: I) -> ExecutorResult<Self>
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (key, label) in choices {
            if map.insert(key, label.into()).is_some() {
                return Err(ConditionExecutorError::InvalidPromptConfig(format!(
                    "duplicate choice key {}",
                    key
                )));
            }
        }
        if map.is_empty() {
            return Err(ConditionExecutorError::InvalidPromptConfig(
                "a choice prompt needs at least one choice".to_string(),
            ));
        }
        Ok(Self { choices: map })
    }

    /// Whether `key` is one of the options.
    pub fn contains_key(&self, key: i64) -> bool {
        self.choices.contains_key(&key)
    }

    /// Label shown for `key`.
    pub fn label(&self, key: i64) -> Option<&str> {
        self.choices.get(&key).map(String::as_str)
    }

    /// Option keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.choices.keys().copied()
    }

    /// Key and label pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> + '_ {
        self.choices.iter().map(|(key, label)| (*key, label.as_str()))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Always false for a constructed list.
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

// =============================================================================
// Prompt types
// =============================================================================

/// The kind of answer a survey item collects.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptType {
    /// Integer within a range.
    Number(NumericRange),
    /// Integer count of hours before now, within a range.
    HoursBeforeNow(NumericRange),
    /// One option from a fixed list.
    SingleChoice(ChoiceList),
    /// Any options from a fixed list.
    MultiChoice(ChoiceList),
    /// One option from a list the participant may extend.
    SingleChoiceCustom,
    /// Any options from a list the participant may extend.
    MultiChoiceCustom,
    /// Score returned by an external activity.
    RemoteActivity,
    /// Free text.
    Text,
    /// A point in time.
    Timestamp,
    /// Photo reference.
    Photo,
    /// Video reference.
    Video,
    /// Audio reference.
    Audio,
    /// Document reference.
    Document,
}

impl PromptType {
    /// Name used in survey definitions and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            PromptType::Number(_) => "number",
            PromptType::HoursBeforeNow(_) => "hours_before_now",
            PromptType::SingleChoice(_) => "single_choice",
            PromptType::MultiChoice(_) => "multi_choice",
            PromptType::SingleChoiceCustom => "single_choice_custom",
            PromptType::MultiChoiceCustom => "multi_choice_custom",
            PromptType::RemoteActivity => "remote_activity",
            PromptType::Text => "text",
            PromptType::Timestamp => "timestamp",
            PromptType::Photo => "photo",
            PromptType::Video => "video",
            PromptType::Audio => "audio",
            PromptType::Document => "document",
        }
    }

    /// Whether answers are plain numbers that can be ordered.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PromptType::Number(_) | PromptType::HoursBeforeNow(_) | PromptType::RemoteActivity
        )
    }

    /// Whether conditions may reference items of this type.
    pub fn allows_conditions(&self) -> bool {
        !matches!(
            self,
            PromptType::Text
                | PromptType::Timestamp
                | PromptType::Photo
                | PromptType::Video
                | PromptType::Audio
                | PromptType::Document
        )
    }

    fn comparator_allowed(&self, comparator: Comparator) -> bool {
        self.is_numeric() || !comparator.is_ordering()
    }

    /// Checks that `prompt_id <comparator> value` is well formed for this
    /// type. Skip-policy for markers is checked by the validator.
    pub fn validate_condition_value_pair(
        &self,
        prompt_id: &str,
        pair: &ConditionValuePair,
    ) -> ExecutorResult<()> {
        if !self.allows_conditions() {
            return Err(ConditionExecutorError::ConditionsNotAllowed {
                prompt_id: prompt_id.to_string(),
                prompt_type: self.name(),
            });
        }
        if !self.comparator_allowed(pair.comparator) {
            return Err(self.comparator_error(prompt_id, pair.comparator));
        }
        if pair.no_response().is_some() {
            return Ok(());
        }

        let invalid = |reason: &str| ConditionExecutorError::InvalidValue {
            prompt_id: prompt_id.to_string(),
            value: pair.value.clone(),
            reason: reason.to_string(),
        };

        match self {
            PromptType::Number(range) | PromptType::HoursBeforeNow(range) => {
                range.validate_literal(prompt_id, &pair.value)
            }
            PromptType::SingleChoice(choices) | PromptType::MultiChoice(choices) => {
                let key = pair
                    .value
                    .parse::<i64>()
                    .map_err(|_| invalid("expected a choice key"))?;
                if choices.contains_key(key) {
                    Ok(())
                } else {
                    Err(invalid("not a configured choice key"))
                }
            }
            PromptType::SingleChoiceCustom | PromptType::MultiChoiceCustom => pair
                .value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| invalid("expected a choice key")),
            PromptType::RemoteActivity => pair
                .value
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| invalid("expected a numeric score")),
            _ => Ok(()),
        }
    }

    pub(crate) fn comparator_error(
        &self,
        prompt_id: &str,
        comparator: Comparator,
    ) -> ConditionExecutorError {
        ConditionExecutorError::ComparatorNotAllowed {
            prompt_id: prompt_id.to_string(),
            comparator,
            prompt_type: self.name(),
        }
    }

    /// Checks that a recorded answer is something this prompt could produce.
    pub fn check_response(&self, prompt_id: &str, response: &ResponseValue) -> ExecutorResult<()> {
        let invalid = |reason: &str| ConditionExecutorError::InvalidValue {
            prompt_id: prompt_id.to_string(),
            value: response.to_string(),
            reason: reason.to_string(),
        };

        if matches!(response, ResponseValue::NoResponse(_)) {
            return Ok(());
        }

        match (self, response) {
            (PromptType::Number(range) | PromptType::HoursBeforeNow(range), _) => {
                let value = response
                    .as_integer()
                    .ok_or_else(|| invalid("expected an integer"))?;
                if range.contains(value) {
                    Ok(())
                } else {
                    Err(ConditionExecutorError::OutOfRange {
                        prompt_id: prompt_id.to_string(),
                        value,
                        min: range.min(),
                        max: range.max(),
                    })
                }
            }
            (PromptType::SingleChoice(choices), _) => match response.as_integer() {
                Some(key) if choices.contains_key(key) => Ok(()),
                _ => Err(invalid("expected one configured choice key")),
            },
            (PromptType::MultiChoice(choices), ResponseValue::Choices(keys)) => {
                if keys.iter().all(|k| choices.contains_key(*k)) {
                    Ok(())
                } else {
                    Err(invalid("every selection must be a configured choice key"))
                }
            }
            (PromptType::MultiChoice(choices), _) => match response.as_integer() {
                Some(key) if choices.contains_key(key) => Ok(()),
                _ => Err(invalid("expected configured choice keys")),
            },
            (PromptType::SingleChoiceCustom, _) => response
                .as_integer()
                .map(|_| ())
                .ok_or_else(|| invalid("expected a choice key")),
            (PromptType::MultiChoiceCustom, ResponseValue::Choices(_)) => Ok(()),
            (PromptType::MultiChoiceCustom, _) => response
                .as_integer()
                .map(|_| ())
                .ok_or_else(|| invalid("expected choice keys")),
            (PromptType::RemoteActivity, ResponseValue::Number(_)) => Ok(()),
            (PromptType::RemoteActivity, _) => Err(invalid("expected a numeric score")),
            (_, ResponseValue::Text(_)) => Ok(()),
            _ => Err(invalid("expected text")),
        }
    }
}
