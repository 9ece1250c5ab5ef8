//! Processing a participant's answers against a survey.

use std::collections::BTreeMap;

use survey_condition::NoResponse;
use survey_condition_executor::{ResponseMap, ResponseSource, ResponseValue};

use crate::error::{SchemaError, SchemaResult};
use crate::survey::Survey;

/// The recorded outcome of one survey run, in item order.
///
/// Every survey item has exactly one entry: the answer, `SKIPPED`, or
/// `NOT_DISPLAYED`.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    survey_id: String,
    order: Vec<String>,
    responses: BTreeMap<String, ResponseValue>,
}

impl Submission {
    /// Id of the survey this submission belongs to.
    pub fn survey_id(&self) -> &str {
        &self.survey_id
    }

    /// The recorded value for an item.
    pub fn get(&self, item_id: &str) -> Option<&ResponseValue> {
        self.responses.get(item_id)
    }

    /// Recorded values in survey order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResponseValue)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.responses.get(id).map(|value| (id.as_str(), value)))
    }

    /// Number of recorded items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True only for a submission to a survey with no items.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of items that were shown.
    pub fn displayed_count(&self) -> usize {
        self.count_not(NoResponse::NotDisplayed)
    }

    /// Number of items that were shown and answered.
    pub fn answered_count(&self) -> usize {
        self.responses.values().filter(|v| v.is_answered()).count()
    }

    fn count_not(&self, marker: NoResponse) -> usize {
        self.responses
            .values()
            .filter(|v| v.no_response() != Some(marker))
            .count()
    }

    /// Converts into a plain response map.
    pub fn into_response_map(self) -> ResponseMap {
        self.responses.into_iter().collect()
    }
}

impl ResponseSource for Submission {
    fn response(&self, prompt_id: &str) -> Option<&ResponseValue> {
        self.responses.get(prompt_id)
    }
}

impl Survey {
    /// Walks the items in order and records each one.
    ///
    /// For each item:
    ///
    /// - condition false: the item must have no answer; records `NOT_DISPLAYED`
    /// - shown without an answer (or answered `SKIPPED`): the item must be
    ///   skippable; records `SKIPPED`
    /// - otherwise the answer is checked against the prompt type and recorded
    ///
    /// Conditions see the values recorded for earlier items, including the
    /// markers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use survey_condition_executor::{NoResponse, NumericRange, PromptType, ResponseMap, ResponseValue};
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
    /// let mut answers = ResponseMap::new();
    /// answers.insert("hours".into(), ResponseValue::from(8i64));
    ///
    /// let submission = survey.process_submission(&answers).unwrap();
    /// assert_eq!(
    ///     submission.get("why"),
    ///     Some(&ResponseValue::NoResponse(NoResponse::NotDisplayed))
    /// );
    /// ```
    pub fn process_submission(&self, answers: &ResponseMap) -> SchemaResult<Submission> {
        if let Some(unknown) = answers.keys().find(|id| self.position(id).is_none()) {
            return Err(SchemaError::UnknownItem(unknown.clone()));
        }

        let mut recorded: BTreeMap<String, ResponseValue> = BTreeMap::new();
        let mut order = Vec::with_capacity(self.len());

        for item in self.items() {
            let id = item.id();
            let answer = answers.get(id);
            let value = if !self.is_displayed(item, &recorded)? {
                match answer {
                    None | Some(ResponseValue::NoResponse(NoResponse::NotDisplayed)) => {}
                    Some(_) => return Err(SchemaError::UnexpectedResponse(id.to_string())),
                }
                tracing::trace!(item = id, "not displayed");
                ResponseValue::NoResponse(NoResponse::NotDisplayed)
            } else {
                match answer {
                    None | Some(ResponseValue::NoResponse(NoResponse::Skipped)) => {
                        if !item.is_skippable() {
                            return Err(SchemaError::NotSkippable(id.to_string()));
                        }
                        ResponseValue::NoResponse(NoResponse::Skipped)
                    }
                    Some(ResponseValue::NoResponse(NoResponse::NotDisplayed)) => {
                        return Err(SchemaError::DisplayMismatch(id.to_string()));
                    }
                    Some(value) => {
                        item.prompt_type()
                            .check_response(id, value)
                            .map_err(|source| SchemaError::InvalidResponse {
                                item: id.to_string(),
                                source,
                            })?;
                        value.clone()
                    }
                }
            };

            order.push(id.to_string());
            recorded.insert(id.to_string(), value);
        }

        let submission = Submission {
            survey_id: self.id().to_string(),
            order,
            responses: recorded,
        };
        tracing::debug!(
            survey = self.id(),
            displayed = submission.displayed_count(),
            answered = submission.answered_count(),
            "processed submission"
        );
        Ok(submission)
    }
}
