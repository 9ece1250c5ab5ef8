//! The parsed condition attached to one survey item.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::ast::{ConditionValuePair, Fragment};
use crate::error::{ConditionError, ConditionResult};
use crate::grammar::Grammar;
use crate::parser::parse_with;

/// A condition sentence together with its parsed tree.
///
/// Immutable once created; share it freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    sentence: String,
    root: Fragment,
}

impl Condition {
    /// Parses a sentence with the default grammar.
    pub fn parse(sentence: &str) -> ConditionResult<Self> {
        Self::parse_with(sentence, &Grammar::default())
    }

    /// Parses a sentence with a custom grammar.
    pub fn parse_with(sentence: &str, grammar: &Grammar) -> ConditionResult<Self> {
        let root = parse_with(sentence, grammar)?;
        Ok(Self {
            sentence: sentence.trim().to_string(),
            root,
        })
    }

    /// Wraps an already built tree; the sentence is its rendering.
    pub fn from_fragment(root: Fragment) -> Self {
        Self {
            sentence: root.to_string(),
            root,
        }
    }

    /// The sentence as authored.
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Root of the tree.
    pub fn root(&self) -> &Fragment {
        &self.root
    }

    /// Height of the tree.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Prompt ids the condition reads.
    pub fn prompt_ids(&self) -> Vec<&str> {
        self.root.prompt_ids()
    }

    /// Comparator/value pairs grouped by prompt id.
    pub fn condition_value_pairs(&self) -> BTreeMap<String, Vec<ConditionValuePair>> {
        self.root.condition_value_pairs()
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Conditions travel as their sentence.
#[cfg(feature = "serde")]
impl serde::Serialize for Condition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.sentence)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Condition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let sentence = String::deserialize(deserializer)?;
        Condition::parse(&sentence).map_err(serde::de::Error::custom)
    }
}
