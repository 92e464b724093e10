use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Highest intensity on the five point answer scale.
pub const MAX_INTENSITY: u8 = 4;

/// Display labels for intensities `0..=MAX_INTENSITY`.
pub const LIKERT_LABELS: [&str; 5] = ["전혀 아니다", "거의 없다", "가끔", "자주", "거의 항상"];

/// Scored dimension every question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Cold,
    Heat,
    Dry,
    Damp,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::Cold, Axis::Heat, Axis::Dry, Axis::Damp];

    /// Single letter prefix used by question ids.
    pub const fn code(self) -> char {
        match self {
            Axis::Cold => 'C',
            Axis::Heat => 'H',
            Axis::Dry => 'D',
            Axis::Damp => 'W',
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Axis::Cold => "한",
            Axis::Heat => "열",
            Axis::Dry => "조",
            Axis::Damp => "습",
        }
    }
}

/// A single scored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub axis: Axis,
    pub text: &'static str,
}

const fn question(id: &'static str, axis: Axis, text: &'static str) -> Question {
    Question { id, axis, text }
}

const SHORT_QUESTIONS: [Question; 32] = [
    question("C1", Axis::Cold, "손발이 항상 차가운 편이다."),
    question("C2", Axis::Cold, "추위를 남들보다 많이 탄다."),
    question("C3", Axis::Cold, "찬 음식을 먹으면 속이 불편해진다."),
    question("C4", Axis::Cold, "겨울이 여름보다 훨씬 힘들다."),
    question("C5", Axis::Cold, "냉방이 강한 곳에 오래 있으면 쉽게 피곤해진다."),
    question("C6", Axis::Cold, "따뜻한 음식을 먹으면 컨디션이 좋아진다."),
    question("C7", Axis::Cold, "손이나 발이 차가워 잠들기 어려운 적이 있다."),
    question("C8", Axis::Cold, "배가 차가운 느낌이 자주 든다."),
    question("H1", Axis::Heat, "얼굴이나 몸이 쉽게 달아오른다."),
    question("H2", Axis::Heat, "더위를 남들보다 많이 탄다."),
    question("H3", Axis::Heat, "여름이 겨울보다 훨씬 힘들다."),
    question("H4", Axis::Heat, "매운 음식을 먹으면 얼굴이 붉어진다."),
    question("H5", Axis::Heat, "밤에 열이 올라 잠들기 어렵다."),
    question("H6", Axis::Heat, "갈증이 자주 난다."),
    question("H7", Axis::Heat, "따뜻한 환경보다 시원한 환경이 편하다."),
    question("H8", Axis::Heat, "몸속에 열이 몰려 있는 느낌이 든다."),
    question("D1", Axis::Dry, "입이 자주 마른다."),
    question("D2", Axis::Dry, "피부가 쉽게 건조해진다."),
    question("D3", Axis::Dry, "변이 딱딱한 편이다."),
    question("D4", Axis::Dry, "변비가 자주 생긴다."),
    question("D5", Axis::Dry, "피부 각질이 잘 생긴다."),
    question("D6", Axis::Dry, "눈이 건조하다고 느낀다."),
    question("D7", Axis::Dry, "피부가 당기는 느낌이 자주 든다."),
    question("D8", Axis::Dry, "전반적으로 몸이 마른 느낌이다."),
    question("W1", Axis::Damp, "몸이 무겁고 처지는 느낌이 자주 든다."),
    question("W2", Axis::Damp, "땀이 많고 끈적하다."),
    question("W3", Axis::Damp, "비 오거나 습한 날씨에 컨디션이 나빠진다."),
    question("W4", Axis::Damp, "몸이 잘 붓는다."),
    question("W5", Axis::Damp, "아침에 몸이 무겁고 개운하지 않다."),
    question("W6", Axis::Damp, "피부나 두피에 유분이 많다."),
    question("W7", Axis::Damp, "속이 더부룩한 느낌이 자주 든다."),
    question("W8", Axis::Damp, "전반적으로 몸이 탁한 느낌이다."),
];

// First three items of every axis.
const MINI_QUESTIONS: [Question; 12] = [
    SHORT_QUESTIONS[0],
    SHORT_QUESTIONS[1],
    SHORT_QUESTIONS[2],
    SHORT_QUESTIONS[8],
    SHORT_QUESTIONS[9],
    SHORT_QUESTIONS[10],
    SHORT_QUESTIONS[16],
    SHORT_QUESTIONS[17],
    SHORT_QUESTIONS[18],
    SHORT_QUESTIONS[24],
    SHORT_QUESTIONS[25],
    SHORT_QUESTIONS[26],
];

/// Revision tag of the question bank that produced a set of answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyVersion {
    /// Eight questions per axis.
    #[default]
    Short,
    /// Three questions per axis.
    Mini,
}

impl SurveyVersion {
    pub const fn tag(self) -> &'static str {
        match self {
            SurveyVersion::Short => "short",
            SurveyVersion::Mini => "mini",
        }
    }

    pub fn bank(self) -> QuestionBank {
        match self {
            SurveyVersion::Short => QuestionBank {
                version: self,
                questions: &SHORT_QUESTIONS,
            },
            SurveyVersion::Mini => QuestionBank {
                version: self,
                questions: &MINI_QUESTIONS,
            },
        }
    }
}

impl fmt::Display for SurveyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown survey version '{0}'")]
pub struct UnknownSurveyVersion(pub String);

impl FromStr for SurveyVersion {
    type Err = UnknownSurveyVersion;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(SurveyVersion::Short),
            "mini" => Ok(SurveyVersion::Mini),
            _ => Err(UnknownSurveyVersion(raw.to_string())),
        }
    }
}

/// Fixed, ordered catalog of scored items for one revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionBank {
    version: SurveyVersion,
    questions: &'static [Question],
}

impl QuestionBank {
    pub fn version(&self) -> SurveyVersion {
        self.version
    }

    pub fn all_questions(&self) -> &'static [Question] {
        self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'static Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn on_axis(&self, axis: Axis) -> impl Iterator<Item = &'static Question> {
        self.questions
            .iter()
            .filter(move |question| question.axis == axis)
    }

    pub fn count_on_axis(&self, axis: Axis) -> usize {
        self.on_axis(axis).count()
    }

    /// Largest magnitude either derived coordinate can reach.
    pub fn max_magnitude(&self) -> i32 {
        let widest = Axis::ALL
            .iter()
            .map(|axis| self.count_on_axis(*axis))
            .max()
            .unwrap_or(0);
        widest as i32 * i32::from(MAX_INTENSITY)
    }
}
