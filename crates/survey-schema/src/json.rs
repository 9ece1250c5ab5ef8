//! JSON survey documents.
//!
//! A document lists items in display order:
//!
//! ```json
//! {
//!   "id": "evening",
//!   "items": [
//!     { "id": "sleep", "prompt_type": "number", "min": 0, "max": 24 },
//!     { "id": "mood", "prompt_type": "single_choice",
//!       "choices": [{ "key": 0, "label": "low" }, { "key": 1, "label": "ok" }] },
//!     { "id": "why", "prompt_type": "text", "skippable": true,
//!       "condition": "sleep < 6 OR mood == 0" }
//!   ]
//! }
//! ```
//!
//! `min` and `max` may be numbers or numeric strings. Documents are turned
//! into [`Survey`] values through the same checks as [`Survey::new`].

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use survey_condition_executor::{
    ChoiceList, ConditionExecutorError, ExecutorConfig, NumericRange, PromptType,
};

use crate::error::{SchemaError, SchemaResult};
use crate::survey::{Survey, SurveyItem};

/// Serialized form of a [`Survey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyDocument {
    /// Survey id.
    pub id: String,
    /// Items in display order.
    pub items: Vec<ItemDocument>,
}

/// Serialized form of a [`SurveyItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDocument {
    /// Item id.
    pub id: String,
    /// Prompt type name, as returned by [`PromptType::name`].
    pub prompt_type: String,
    /// Lower bound for number prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    /// Upper bound for number prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
    /// Options for fixed choice prompts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceDocument>,
    /// Whether the item may be skipped.
    #[serde(default)]
    pub skippable: bool,
    /// Display condition sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// One option of a choice prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDocument {
    /// Value recorded when chosen.
    pub key: i64,
    /// Text shown to the participant.
    pub label: String,
}

/// A range bound as found in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    /// `"min": 0`
    Integer(i64),
    /// `"min": "0"`
    Text(String),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(value) => write!(f, "{}", value),
            Bound::Text(value) => f.write_str(value),
        }
    }
}

impl ItemDocument {
    fn range(&self) -> SchemaResult<NumericRange> {
        let (Some(min), Some(max)) = (&self.min, &self.max) else {
            return Err(self.invalid("min and max are required"));
        };
        NumericRange::from_attributes(&min.to_string(), &max.to_string()).map_err(|source| {
            SchemaError::InvalidPrompt {
                item: self.id.clone(),
                source,
            }
        })
    }

    fn choices(&self) -> SchemaResult<ChoiceList> {
        ChoiceList::new(self.choices.iter().map(|c| (c.key, c.label.clone()))).map_err(
            |source| SchemaError::InvalidPrompt {
                item: self.id.clone(),
                source,
            },
        )
    }

    fn invalid(&self, reason: &str) -> SchemaError {
        SchemaError::InvalidPrompt {
            item: self.id.clone(),
            source: ConditionExecutorError::InvalidPromptConfig(reason.to_string()),
        }
    }

    fn prompt_type(&self) -> SchemaResult<PromptType> {
        let prompt_type = match self.prompt_type.as_str() {
            "number" => PromptType::Number(self.range()?),
            "hours_before_now" => PromptType::HoursBeforeNow(self.range()?),
            "single_choice" => PromptType::SingleChoice(self.choices()?),
            "multi_choice" => PromptType::MultiChoice(self.choices()?),
            "single_choice_custom" => PromptType::SingleChoiceCustom,
            "multi_choice_custom" => PromptType::MultiChoiceCustom,
            "remote_activity" => PromptType::RemoteActivity,
            "text" => PromptType::Text,
            "timestamp" => PromptType::Timestamp,
            "photo" => PromptType::Photo,
            "video" => PromptType::Video,
            "audio" => PromptType::Audio,
            "document" => PromptType::Document,
            other => {
                return Err(SchemaError::UnknownPromptType {
                    item: self.id.clone(),
                    prompt_type: other.to_string(),
                })
            }
        };
        Ok(prompt_type)
    }

    fn into_item(self) -> SchemaResult<SurveyItem> {
        let item = SurveyItem::new(self.id.clone(), self.prompt_type()?)
            .with_skippable(self.skippable);
        match &self.condition {
            Some(sentence) => item.with_condition_str(sentence),
            None => Ok(item),
        }
    }

    fn from_item(item: &SurveyItem) -> Self {
        let (min, max, choices) = match item.prompt_type() {
            PromptType::Number(range) | PromptType::HoursBeforeNow(range) => (
                Some(Bound::Integer(range.min())),
                Some(Bound::Integer(range.max())),
                Vec::new(),
            ),
            PromptType::SingleChoice(list) | PromptType::MultiChoice(list) => (
                None,
                None,
                list.iter()
                    .map(|(key, label)| ChoiceDocument {
                        key,
                        label: label.to_string(),
                    })
                    .collect(),
            ),
            _ => (None, None, Vec::new()),
        };
        Self {
            id: item.id().to_string(),
            prompt_type: item.prompt_type().name().to_string(),
            min,
            max,
            choices,
            skippable: item.is_skippable(),
            condition: item.condition().map(|c| c.sentence().to_string()),
        }
    }
}

impl SurveyDocument {
    /// Builds and checks the survey this document describes.
    pub fn into_survey(self, config: ExecutorConfig) -> SchemaResult<Survey> {
        let items = self
            .items
            .into_iter()
            .map(ItemDocument::into_item)
            .collect::<SchemaResult<Vec<_>>>()?;
        Survey::with_config(self.id, items, config)
    }
}

impl Survey {
    /// Loads a survey from a JSON string.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let document: SurveyDocument = serde_json::from_str(json)?;
        document.into_survey(ExecutorConfig::default())
    }

    /// Loads a survey from any reader producing a JSON document.
    pub fn from_reader<R: Read>(reader: R) -> SchemaResult<Self> {
        let document: SurveyDocument = serde_json::from_reader(reader)?;
        document.into_survey(ExecutorConfig::default())
    }

    /// Loads a survey from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> SchemaResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SchemaError::io_error(path, e))?;
        let survey = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), survey = survey.id(), "loaded survey");
        Ok(survey)
    }

    /// The document form of this survey.
    pub fn to_document(&self) -> SurveyDocument {
        SurveyDocument {
            id: self.id().to_string(),
            items: self.items().iter().map(ItemDocument::from_item).collect(),
        }
    }

    /// Serializes the survey as pretty-printed JSON.
    pub fn to_json_string(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Writes the survey to a JSON file.
    ///
    /// The buffer is flushed before returning so write failures surface as
    /// [`SchemaError::Io`] rather than being lost on drop.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> SchemaResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SchemaError::io_error(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.to_document())?;
        writer.flush().map_err(|e| SchemaError::io_error(path, e))?;
        tracing::debug!(path = %path.display(), survey = self.id(), "saved survey");
        Ok(())
    }
}
