use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::answers::AnswerSet;
use super::profile::{self, Profile};
use super::questions::{Axis, QuestionBank};

/// Categorical outcome formed by the signs of the two derived coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    #[serde(rename = "HH")]
    HeatDamp,
    #[serde(rename = "HD")]
    HeatDry,
    #[serde(rename = "CH")]
    ColdDamp,
    #[serde(rename = "CD")]
    ColdDry,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::HeatDamp,
        Quadrant::HeatDry,
        Quadrant::ColdDamp,
        Quadrant::ColdDry,
    ];

    /// Zero on either axis counts toward heat and damp.
    pub const fn classify(ch: i32, dd: i32) -> Self {
        if ch >= 0 && dd >= 0 {
            Quadrant::HeatDamp
        } else if ch >= 0 {
            Quadrant::HeatDry
        } else if dd >= 0 {
            Quadrant::ColdDamp
        } else {
            Quadrant::ColdDry
        }
    }

    /// Wire and storage code.
    pub const fn code(self) -> &'static str {
        match self {
            Quadrant::HeatDamp => "HH",
            Quadrant::HeatDry => "HD",
            Quadrant::ColdDamp => "CH",
            Quadrant::ColdDry => "CD",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        Quadrant::ALL
            .into_iter()
            .find(|quadrant| quadrant.code().eq_ignore_ascii_case(raw.trim()))
    }

    /// Resolve a stored code, substituting the default profile's quadrant
    /// for anything unrecognised.
    pub fn from_code_or_default(raw: &str) -> Self {
        Self::from_code(raw).unwrap_or_else(|| {
            tracing::warn!(type_code = raw, "unknown quadrant code, using default profile");
            profile::DEFAULT_QUADRANT
        })
    }

    pub fn profile(self) -> &'static Profile {
        profile::lookup(self)
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type code '{0}'")]
pub struct UnknownQuadrant(pub String);

impl FromStr for Quadrant {
    type Err = UnknownQuadrant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::from_code(raw).ok_or_else(|| UnknownQuadrant(raw.to_string()))
    }
}

/// Running sums per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisTotals {
    pub cold: i32,
    pub heat: i32,
    pub dry: i32,
    pub damp: i32,
}

impl AxisTotals {
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Cold => self.cold,
            Axis::Heat => self.heat,
            Axis::Dry => self.dry,
            Axis::Damp => self.damp,
        }
    }
}

/// Derived `(ch, dd, type_code)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Heat minus cold.
    pub ch: i32,
    /// Damp minus dry.
    pub dd: i32,
    pub type_code: Quadrant,
}

impl ScoreResult {
    pub fn from_coordinates(ch: i32, dd: i32) -> Self {
        Self {
            ch,
            dd,
            type_code: Quadrant::classify(ch, dd),
        }
    }
}

/// Walk the bank once and sum each answer into its axis bucket.
pub fn tally(bank: &QuestionBank, answers: &AnswerSet) -> AxisTotals {
    let mut totals = AxisTotals::default();
    for question in bank.all_questions() {
        let value = i32::from(answers.intensity(question.id));
        match question.axis {
            Axis::Cold => totals.cold += value,
            Axis::Heat => totals.heat += value,
            Axis::Dry => totals.dry += value,
            Axis::Damp => totals.damp += value,
        }
    }
    totals
}

pub fn score(bank: &QuestionBank, answers: &AnswerSet) -> ScoreResult {
    let totals = tally(bank, answers);
    ScoreResult::from_coordinates(totals.heat - totals.cold, totals.damp - totals.dry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::questions::SurveyVersion;

    fn answers(pairs: &[(&str, i64)]) -> AnswerSet {
        let mut set = AnswerSet::new();
        for (id, value) in pairs {
            set.try_insert(*id, *value).expect("valid intensity");
        }
        set
    }

    fn uniform(bank: &QuestionBank, intensity: impl Fn(Axis) -> i64) -> AnswerSet {
        let mut set = AnswerSet::new();
        for question in bank.all_questions() {
            set.try_insert(question.id, intensity(question.axis))
                .expect("valid intensity");
        }
        set
    }

    #[test]
    fn empty_and_all_zero_sets_land_in_heat_damp() {
        for version in [SurveyVersion::Short, SurveyVersion::Mini] {
            let bank = version.bank();
            let expected = ScoreResult {
                ch: 0,
                dd: 0,
                type_code: Quadrant::HeatDamp,
            };
            assert_eq!(score(&bank, &AnswerSet::new()), expected);
            assert_eq!(score(&bank, &uniform(&bank, |_| 0)), expected);
        }
    }

    #[test]
    fn maximal_cold_and_dry_answers_land_in_cold_dry() {
        let bank = SurveyVersion::Short.bank();
        let set = uniform(&bank, |axis| match axis {
            Axis::Cold | Axis::Dry => 4,
            Axis::Heat | Axis::Damp => 0,
        });
        assert_eq!(
            score(&bank, &set),
            ScoreResult {
                ch: -32,
                dd: -32,
                type_code: Quadrant::ColdDry,
            }
        );
    }

    #[test]
    fn zero_groups_with_heat_and_damp() {
        assert_eq!(Quadrant::classify(0, 0), Quadrant::HeatDamp);
        assert_eq!(Quadrant::classify(0, -1), Quadrant::HeatDry);
        assert_eq!(Quadrant::classify(-1, 0), Quadrant::ColdDamp);
        assert_eq!(Quadrant::classify(-1, -1), Quadrant::ColdDry);
        assert_eq!(Quadrant::classify(5, 7), Quadrant::HeatDamp);
    }

    #[test]
    fn cold_only_answers_on_mini_bank() {
        let bank = SurveyVersion::Mini.bank();
        let set = answers(&[("C1", 4), ("C2", 4), ("C3", 4)]);
        let totals = tally(&bank, &set);
        assert_eq!(
            totals,
            AxisTotals {
                cold: 12,
                heat: 0,
                dry: 0,
                damp: 0,
            }
        );
        assert_eq!(
            score(&bank, &set),
            ScoreResult {
                ch: -12,
                dd: 0,
                type_code: Quadrant::ColdDamp,
            }
        );
    }

    #[test]
    fn unknown_keys_do_not_move_the_score() {
        let bank = SurveyVersion::Short.bank();
        let base = answers(&[("H1", 3), ("D2", 2)]);
        let noisy = answers(&[("H1", 3), ("D2", 2), ("X1", 4), ("h1", 4)]);
        assert_eq!(score(&bank, &base), score(&bank, &noisy));
    }

    #[test]
    fn questions_outside_the_bank_revision_are_ignored() {
        let mini = SurveyVersion::Mini.bank();
        let short = SurveyVersion::Short.bank();
        let set = answers(&[("H8", 4), ("W1", 2)]);
        assert_eq!(score(&mini, &set).ch, 0);
        assert_eq!(score(&short, &set).ch, 4);
    }

    #[test]
    fn same_coordinates_classify_identically() {
        let bank = SurveyVersion::Short.bank();
        let first = answers(&[("H1", 4), ("C1", 1), ("W1", 2), ("D1", 2)]);
        let second = answers(&[("H2", 2), ("H3", 1), ("W4", 3), ("D5", 3)]);
        let a = score(&bank, &first);
        let b = score(&bank, &second);
        assert_eq!((a.ch, a.dd), (b.ch, b.dd));
        assert_eq!(a.type_code, b.type_code);
    }

    #[test]
    fn codes_round_trip_through_parsing() {
        for quadrant in Quadrant::ALL {
            assert_eq!(quadrant.code().parse::<Quadrant>(), Ok(quadrant));
            let encoded = serde_json::to_string(&quadrant).expect("serializes");
            assert_eq!(encoded, format!("\"{}\"", quadrant.code()));
        }
        assert_eq!(Quadrant::from_code("hd"), Some(Quadrant::HeatDry));
        assert!("XX".parse::<Quadrant>().is_err());
        assert_eq!(Quadrant::from_code_or_default("XX"), Quadrant::HeatDry);
    }
}
