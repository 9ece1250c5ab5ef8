//! Ordered survey definitions.
//!
//! A [`Survey`] is a list of items shown in order. Each item may carry a
//! condition over the answers to items before it. Everything that can be
//! checked without answers is checked when the survey is built, so a built
//! survey only fails at submission time on bad answers.

use std::collections::HashMap;

use survey_condition::Condition;
use survey_condition_executor::{
    ConditionValidator, Evaluator, ExecutorConfig, PromptDefinition, PromptType, ResponseSource,
    SurveyCatalogue,
};

use crate::error::{SchemaError, SchemaResult};

// =============================================================================
// Items
// =============================================================================

/// One question of a survey.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyItem {
    id: String,
    prompt: PromptDefinition,
    condition: Option<Condition>,
}

impl SurveyItem {
    /// An unconditional, non-skippable item.
    pub fn new(id: impl Into<String>, prompt_type: PromptType) -> Self {
        Self {
            id: id.into(),
            prompt: PromptDefinition::new(prompt_type),
            condition: None,
        }
    }

    /// Sets whether the item may be skipped.
    pub fn with_skippable(mut self, skippable: bool) -> Self {
        self.prompt.skippable = skippable;
        self
    }

    /// Attaches a parsed condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Parses and attaches a condition sentence.
    pub fn with_condition_str(self, sentence: &str) -> SchemaResult<Self> {
        let condition = Condition::parse(sentence).map_err(|e| SchemaError::Condition {
            item: self.id.clone(),
            source: e.into(),
        })?;
        Ok(self.with_condition(condition))
    }

    /// Item id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Prompt type and skip policy.
    pub fn prompt(&self) -> &PromptDefinition {
        &self.prompt
    }

    /// Prompt type.
    pub fn prompt_type(&self) -> &PromptType {
        &self.prompt.prompt_type
    }

    /// Whether the item may be skipped.
    pub fn is_skippable(&self) -> bool {
        self.prompt.skippable
    }

    /// The display condition, if any.
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

// =============================================================================
// Survey
// =============================================================================

/// A validated, ordered survey.
///
/// # Example
///
/// ```rust
/// use survey_condition_executor::{NumericRange, PromptType};
/// use survey_schema::{Survey, SurveyItem};
///
/// let survey = Survey::new(
///     "sleep-check",
///     vec![
///         SurveyItem::new("hours", PromptType::Number(NumericRange::new(0, 24).unwrap())),
///         SurveyItem::new("why", PromptType::Text)
///             .with_skippable(true)
///             .with_condition_str("hours < 6")
///             .unwrap(),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(survey.len(), 2);
/// ```
#[derive(Debug)]
pub struct Survey {
    id: String,
    items: Vec<SurveyItem>,
    index: HashMap<String, usize>,
    evaluator: Evaluator,
}

/// The items before a given position, as a catalogue.
struct Preceding<'s> {
    survey: &'s Survey,
    limit: usize,
}

impl SurveyCatalogue for Preceding<'_> {
    fn prompt(&self, prompt_id: &str) -> Option<&PromptDefinition> {
        self.survey
            .index
            .get(prompt_id)
            .filter(|&&position| position < self.limit)
            .and_then(|&position| self.survey.items.get(position))
            .map(SurveyItem::prompt)
    }
}

impl Survey {
    /// Builds a survey with the default executor configuration.
    pub fn new(id: impl Into<String>, items: Vec<SurveyItem>) -> SchemaResult<Self> {
        Self::with_config(id, items, ExecutorConfig::default())
    }

    /// Builds a survey, checking:
    ///
    /// - there is at least one item and ids are unique
    /// - the first item has no condition
    /// - conditions only reference earlier items
    /// - every condition validates against the items it references
    pub fn with_config(
        id: impl Into<String>,
        items: Vec<SurveyItem>,
        config: ExecutorConfig,
    ) -> SchemaResult<Self> {
        let id = id.into();
        if items.is_empty() {
            return Err(SchemaError::EmptySurvey(id));
        }

        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), position).is_some() {
                return Err(SchemaError::DuplicateItem(item.id.clone()));
            }
        }

        let survey = Self {
            id,
            items,
            index,
            evaluator: Evaluator::with_config(config),
        };
        survey.check_conditions()?;

        tracing::debug!(
            survey = survey.id.as_str(),
            items = survey.items.len(),
            "built survey"
        );
        Ok(survey)
    }

    fn check_conditions(&self) -> SchemaResult<()> {
        for (position, item) in self.items.iter().enumerate() {
            let Some(condition) = &item.condition else {
                continue;
            };
            if position == 0 {
                return Err(SchemaError::ConditionOnFirstItem(item.id.clone()));
            }

            for reference in condition.prompt_ids() {
                if matches!(self.index.get(reference), Some(&p) if p >= position) {
                    return Err(SchemaError::ForwardReference {
                        item: item.id.clone(),
                        reference: reference.to_string(),
                    });
                }
            }

            let preceding = Preceding {
                survey: self,
                limit: position,
            };
            ConditionValidator::with_config(&preceding, self.evaluator.config())
                .validate(condition)
                .map_err(|source| SchemaError::Condition {
                    item: item.id.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Survey id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Items in display order.
    pub fn items(&self) -> &[SurveyItem] {
        &self.items
    }

    /// Looks up an item by id.
    pub fn item(&self, item_id: &str) -> Option<&SurveyItem> {
        self.position(item_id).and_then(|p| self.items.get(p))
    }

    /// Display position of an item.
    pub fn position(&self, item_id: &str) -> Option<usize> {
        self.index.get(item_id).copied()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a built survey.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The evaluator used for this survey's conditions.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Whether an item should be shown given the answers recorded so far.
    ///
    /// Items without a condition are always shown.
    pub fn is_displayed<R>(&self, item: &SurveyItem, responses: &R) -> SchemaResult<bool>
    where
        R: ResponseSource + ?Sized,
    {
        match &item.condition {
            None => Ok(true),
            Some(condition) => self
                .evaluator
                .evaluate(condition, responses)
                .map_err(|source| SchemaError::Condition {
                    item: item.id.clone(),
                    source,
                }),
        }
    }
}

impl SurveyCatalogue for Survey {
    fn prompt(&self, prompt_id: &str) -> Option<&PromptDefinition> {
        self.item(prompt_id).map(SurveyItem::prompt)
    }
}
