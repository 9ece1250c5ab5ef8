//! Recorded survey answers as seen by the evaluator.

use std::collections::{BTreeMap, HashMap};

use survey_condition::{NoResponse, NumberLiteral};

/// One recorded answer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ResponseValue {
    /// A numeric answer (number prompts, single choice keys, scores).
    Number(f64),
    /// Keys selected on a multi-choice prompt.
    Choices(Vec<i64>),
    /// The item was skipped or never shown.
    NoResponse(NoResponse),
    /// Any other answer.
    Text(String),
}

impl ResponseValue {
    /// Interprets a raw answer string.
    ///
    /// Marker words map to [`ResponseValue::NoResponse`], numbers to
    /// [`ResponseValue::Number`], bracketed integer lists such as `[1,3]` to
    /// [`ResponseValue::Choices`]; anything else is text.
    ///
    /// # Example
    ///
    /// ```rust
    /// use survey_condition::NoResponse;
    /// use survey_condition_executor::ResponseValue;
    ///
    /// assert_eq!(ResponseValue::parse("4"), ResponseValue::Number(4.0));
    /// assert_eq!(ResponseValue::parse("[0, 2]"), ResponseValue::Choices(vec![0, 2]));
    /// assert_eq!(ResponseValue::parse("SKIPPED"), ResponseValue::NoResponse(NoResponse::Skipped));
    /// assert_eq!(ResponseValue::parse("tired"), ResponseValue::Text("tired".into()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(marker) = NoResponse::from_word(trimmed) {
            return ResponseValue::NoResponse(marker);
        }
        if let Some(literal) = NumberLiteral::parse(trimmed) {
            return ResponseValue::Number(literal.value);
        }
        if let Some(keys) = parse_choice_list(trimmed) {
            return ResponseValue::Choices(keys);
        }
        ResponseValue::Text(raw.to_string())
    }

    /// False for the no-response markers.
    pub fn is_answered(&self) -> bool {
        !matches!(self, ResponseValue::NoResponse(_))
    }

    /// The marker, if this is not an answer.
    pub fn no_response(&self) -> Option<NoResponse> {
        match self {
            ResponseValue::NoResponse(marker) => Some(*marker),
            _ => None,
        }
    }

    /// The numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResponseValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The numeric value when it is a whole number.
    pub fn as_integer(&self) -> Option<i64> {
        self.as_number().and_then(integral)
    }
}

pub(crate) fn integral(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// A JSON array of integer keys, as multi-choice answers are exported.
fn parse_choice_list(raw: &str) -> Option<Vec<i64>> {
    if !raw.starts_with('[') {
        return None;
    }
    serde_json::from_str(raw).ok()
}

impl std::fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseValue::Number(n) => write!(f, "{}", n),
            ResponseValue::Choices(keys) => {
                let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", keys.join(","))
            }
            ResponseValue::NoResponse(marker) => write!(f, "{}", marker),
            ResponseValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for ResponseValue {
    fn from(value: f64) -> Self {
        ResponseValue::Number(value)
    }
}

impl From<i64> for ResponseValue {
    fn from(value: i64) -> Self {
        ResponseValue::Number(value as f64)
    }
}

impl From<&str> for ResponseValue {
    fn from(value: &str) -> Self {
        ResponseValue::Text(value.to_string())
    }
}

impl From<String> for ResponseValue {
    fn from(value: String) -> Self {
        ResponseValue::Text(value)
    }
}

impl From<Vec<i64>> for ResponseValue {
    fn from(keys: Vec<i64>) -> Self {
        ResponseValue::Choices(keys)
    }
}

impl From<NoResponse> for ResponseValue {
    fn from(marker: NoResponse) -> Self {
        ResponseValue::NoResponse(marker)
    }
}

/// Default response map: item id to recorded answer.
pub type ResponseMap = HashMap<String, ResponseValue>;

/// Read access to recorded answers by item id.
pub trait ResponseSource {
    /// The answer recorded for `prompt_id`, if any.
    fn response(&self, prompt_id: &str) -> Option<&ResponseValue>;
}

impl ResponseSource for HashMap<String, ResponseValue> {
    fn response(&self, prompt_id: &str) -> Option<&ResponseValue> {
        self.get(prompt_id)
    }
}

impl ResponseSource for BTreeMap<String, ResponseValue> {
    fn response(&self, prompt_id: &str) -> Option<&ResponseValue> {
        self.get(prompt_id)
    }
}

impl<T: ResponseSource + ?Sized> ResponseSource for &T {
    fn response(&self, prompt_id: &str) -> Option<&ResponseValue> {
        (**self).response(prompt_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(ResponseValue::parse("-3"), ResponseValue::Number(-3.0));
        assert_eq!(ResponseValue::parse(" 2.5 "), ResponseValue::Number(2.5));
        assert_eq!(ResponseValue::parse("NaN"), ResponseValue::Text("NaN".into()));
    }

    #[test]
    fn test_parse_choice_lists() {
        assert_eq!(ResponseValue::parse("[]"), ResponseValue::Choices(vec![]));
        assert_eq!(ResponseValue::parse("[3]"), ResponseValue::Choices(vec![3]));
        assert_eq!(
            ResponseValue::parse("[1,x]"),
            ResponseValue::Text("[1,x]".into())
        );
    }

    #[test]
    fn test_parse_exported_choice_lists() {
        assert_eq!(
            ResponseValue::parse("[ 1,\n 3 ]"),
            ResponseValue::Choices(vec![1, 3])
        );
        assert_eq!(
            ResponseValue::parse("[1,2,]"),
            ResponseValue::Text("[1,2,]".into())
        );
        assert_eq!(
            ResponseValue::parse("[1.5]"),
            ResponseValue::Text("[1.5]".into())
        );
    }

    #[test]
    fn test_parse_markers() {
        assert_eq!(
            ResponseValue::parse("NOT_DISPLAYED"),
            ResponseValue::NoResponse(NoResponse::NotDisplayed)
        );
        assert!(!ResponseValue::parse("SKIPPED").is_answered());
        assert!(ResponseValue::parse("skipped").is_answered());
    }

    #[test]
    fn test_integer_view() {
        assert_eq!(ResponseValue::from(7i64).as_integer(), Some(7));
        assert_eq!(ResponseValue::from(7.5f64).as_integer(), None);
        assert_eq!(ResponseValue::from("7").as_integer(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ResponseValue::from(vec![1, 2]).to_string(), "[1,2]");
        assert_eq!(ResponseValue::from(NoResponse::Skipped).to_string(), "SKIPPED");
        assert_eq!(ResponseValue::from(3i64).to_string(), "3");
    }

    #[test]
    fn test_response_source_maps() {
        let mut map = ResponseMap::new();
        map.insert("q1".to_string(), ResponseValue::from(1i64));
        assert!(map.response("q1").is_some());
        assert!(map.response("q2").is_none());

        let ordered: BTreeMap<String, ResponseValue> = map.clone().into_iter().collect();
        assert_eq!(ordered.response("q1"), map.response("q1"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_untagged() {
        let values: Vec<ResponseValue> =
            serde_json::from_str(r#"[3, [1, 2], "SKIPPED", "fine"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ResponseValue::Number(3.0),
                ResponseValue::Choices(vec![1, 2]),
                ResponseValue::NoResponse(NoResponse::Skipped),
                ResponseValue::Text("fine".into()),
            ]
        );
    }
}
