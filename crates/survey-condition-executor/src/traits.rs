//! Traits for looking up the survey items a condition refers to.
//!
//! The validator only needs to know, for each referenced item id, its
//! [`PromptType`] and whether it may be skipped. Any survey representation
//! can provide that by implementing [`SurveyCatalogue`].
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use survey_condition_executor::{NumericRange, PromptDefinition, PromptType, SurveyCatalogue};
//!
//! let mut items = HashMap::new();
//! items.insert(
//!     "sleep".to_string(),
//!     PromptDefinition::new(PromptType::Number(NumericRange::new(0, 24).unwrap()))
//!         .with_skippable(true),
//! );
//!
//! assert!(items.contains_prompt("sleep"));
//! assert!(items.is_skippable("sleep"));
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::prompt::PromptType;

/// What a catalogue knows about one survey item.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptDefinition {
    /// Kind of answer the item collects.
    pub prompt_type: PromptType,
    /// Whether the participant may skip the item.
    pub skippable: bool,
}

impl PromptDefinition {
    /// A non-skippable item of the given type.
    pub fn new(prompt_type: PromptType) -> Self {
        Self {
            prompt_type,
            skippable: false,
        }
    }

    /// Sets whether the item may be skipped.
    pub fn with_skippable(mut self, skippable: bool) -> Self {
        self.skippable = skippable;
        self
    }
}

/// Lookup of survey items by id.
///
/// # Required Methods
///
/// - [`prompt`](Self::prompt) - Definition of the item with the given id
pub trait SurveyCatalogue {
    /// The definition for `prompt_id`, or `None` if the survey has no such item.
    fn prompt(&self, prompt_id: &str) -> Option<&PromptDefinition>;

    /// Whether the item exists.
    fn contains_prompt(&self, prompt_id: &str) -> bool {
        self.prompt(prompt_id).is_some()
    }

    /// Whether the item exists and may be skipped.
    fn is_skippable(&self, prompt_id: &str) -> bool {
        self.prompt(prompt_id).is_some_and(|p| p.skippable)
    }
}

impl SurveyCatalogue for HashMap<String, PromptDefinition> {
    fn prompt(&self, prompt_id: &str) -> Option<&PromptDefinition> {
        self.get(prompt_id)
    }
}

impl SurveyCatalogue for BTreeMap<String, PromptDefinition> {
    fn prompt(&self, prompt_id: &str) -> Option<&PromptDefinition> {
        self.get(prompt_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::NumericRange;

    #[test]
    fn test_defaults_not_skippable() {
        let def = PromptDefinition::new(PromptType::Text);
        assert!(!def.skippable);
        assert!(def.with_skippable(true).skippable);
    }

    #[test]
    fn test_btree_catalogue() {
        let mut items = BTreeMap::new();
        items.insert(
            "q1".to_string(),
            PromptDefinition::new(PromptType::Number(NumericRange::new(1, 5).unwrap())),
        );
        assert!(items.contains_prompt("q1"));
        assert!(!items.contains_prompt("q2"));
        assert!(!items.is_skippable("q1"));
        assert!(!items.is_skippable("q2"));
    }
}
