use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::questions::MAX_INTENSITY;

/// Answers keyed by question id, each an intensity in `0..=MAX_INTENSITY`.
///
/// Construction always goes through [`AnswerSet::from_json`] or
/// [`AnswerSet::try_insert`], so a value outside the scale can never be held.
/// Keys are not checked against any question bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, u8>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate an inbound JSON payload: an object whose values are all
    /// integers on the answer scale.
    pub fn from_json(value: &Value) -> Result<Self, AnswerError> {
        let object = value.as_object().ok_or(AnswerError::NotAnObject)?;
        let mut answers = AnswerSet::new();
        for (question_id, raw) in object {
            let intensity = integer_value(raw).ok_or_else(|| AnswerError::NotAnInteger {
                question_id: question_id.clone(),
            })?;
            answers.try_insert(question_id.clone(), intensity)?;
        }
        Ok(answers)
    }

    pub fn try_insert(
        &mut self,
        question_id: impl Into<String>,
        intensity: i64,
    ) -> Result<(), AnswerError> {
        let question_id = question_id.into();
        match u8::try_from(intensity) {
            Ok(value) if value <= MAX_INTENSITY => {
                self.0.insert(question_id, value);
                Ok(())
            }
            _ => Err(AnswerError::OutOfRange {
                question_id,
                value: intensity,
            }),
        }
    }

    /// Intensity recorded for `question_id`, zero when unanswered.
    pub fn intensity(&self, question_id: &str) -> u8 {
        self.0.get(question_id).copied().unwrap_or(0)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(id, value)| (id.as_str(), *value))
    }
}

// Accepts integral floats such as `3.0`, which JSON encoders emit for whole numbers.
fn integer_value(raw: &Value) -> Option<i64> {
    let number = match raw {
        Value::Number(number) => number,
        _ => return None,
    };
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    number
        .as_f64()
        .filter(|value| value.is_finite() && value.fract() == 0.0)
        .map(|value| value as i64)
}

impl<'de> Deserialize<'de> for AnswerSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        AnswerSet::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Reasons an inbound answer payload is rejected before scoring.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    #[error("answers must be an object keyed by question id")]
    NotAnObject,
    #[error("answer for '{question_id}' must be an integer")]
    NotAnInteger { question_id: String },
    #[error("answer for '{question_id}' must be between 0 and 4, got {value}")]
    OutOfRange { question_id: String, value: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_partial_sets_and_unknown_keys() {
        let answers = AnswerSet::from_json(&json!({ "C1": 4, "ZZ9": 0 })).expect("valid");
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.intensity("C1"), 4);
        assert_eq!(answers.intensity("H1"), 0);
        assert!(!answers.contains("H1"));
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert_eq!(
            AnswerSet::from_json(&json!([1, 2, 3])),
            Err(AnswerError::NotAnObject)
        );
        assert_eq!(
            AnswerSet::from_json(&Value::Null),
            Err(AnswerError::NotAnObject)
        );
    }

    #[test]
    fn rejects_fractional_and_textual_values() {
        match AnswerSet::from_json(&json!({ "C1": 2.5 })) {
            Err(AnswerError::NotAnInteger { question_id }) => assert_eq!(question_id, "C1"),
            other => panic!("expected integer error, got {other:?}"),
        }
        assert!(matches!(
            AnswerSet::from_json(&json!({ "C1": "3" })),
            Err(AnswerError::NotAnInteger { .. })
        ));
    }

    #[test]
    fn rejects_values_outside_the_scale() {
        assert_eq!(
            AnswerSet::from_json(&json!({ "H2": 5 })),
            Err(AnswerError::OutOfRange {
                question_id: "H2".to_string(),
                value: 5,
            })
        );
        assert!(matches!(
            AnswerSet::from_json(&json!({ "H2": -1 })),
            Err(AnswerError::OutOfRange { value: -1, .. })
        ));
    }

    #[test]
    fn whole_number_floats_are_accepted() {
        let answers = AnswerSet::from_json(&json!({ "D1": 3.0 })).expect("valid");
        assert_eq!(answers.intensity("D1"), 3);
    }

    #[test]
    fn deserialize_enforces_the_same_contract() {
        let parsed: AnswerSet = serde_json::from_str(r#"{"W1":1,"W2":4}"#).expect("valid");
        assert_eq!(parsed.intensity("W2"), 4);
        assert!(serde_json::from_str::<AnswerSet>(r#"{"W1":9}"#).is_err());
        assert_eq!(
            serde_json::to_value(&parsed).expect("serializes"),
            json!({ "W1": 1, "W2": 4 })
        );
    }
}
