//! Personalised narrative generation.
//!
//! The quiz hands a prompt to an external text generator and shows whatever
//! comes back under the result card. Providers implement
//! [`NarrativeGenerator`]; the prompt itself is assembled here so every
//! provider sees the same instructions.

use std::time::Duration;

use async_trait::async_trait;

use super::answers::AnswerSet;
use super::questions::{Axis, QuestionBank};
use super::scoring::Quadrant;

/// Answers at or above this intensity count as strong agreement.
pub const HIGH_INTENSITY: u8 = 3;
/// Strong answers needed on one axis before the prompt calls it out.
pub const AXIS_TRIGGER: usize = 3;

const BALANCED_PATTERN: &str = "균형잡힌 답변 패턴";

/// Capability interface over a remote text generator.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative generation is not configured")]
    Disabled,
    #[error("narrative provider failed: {0}")]
    Remote(String),
    #[error("narrative provider returned no text")]
    EmptyResponse,
    #[error("narrative provider timed out after {0:?}")]
    Timeout(Duration),
}

/// Generator used when no provider credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNarrative;

#[async_trait]
impl NarrativeGenerator for DisabledNarrative {
    async fn generate(&self, _prompt: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Disabled)
    }
}

/// Inputs for one narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeRequest {
    pub answers: AnswerSet,
    pub type_code: Quadrant,
    pub ch: i32,
    pub dd: i32,
}

fn axis_trait(axis: Axis) -> &'static str {
    match axis {
        Axis::Cold => "손발이 차갑고 추위를 많이 타는 편 (한 체질 특징)",
        Axis::Heat => "얼굴이 쉽게 달아오르고 더위를 많이 탐 (열 체질 특징)",
        Axis::Dry => "피부 건조, 변비 경향 (조 체질 특징)",
        Axis::Damp => "몸이 무겁고 부종 경향 (습 체질 특징)",
    }
}

/// Axes where at least [`AXIS_TRIGGER`] answers reached [`HIGH_INTENSITY`].
pub fn pronounced_axes(bank: &QuestionBank, answers: &AnswerSet) -> Vec<Axis> {
    Axis::ALL
        .into_iter()
        .filter(|axis| {
            bank.on_axis(*axis)
                .filter(|question| answers.intensity(question.id) >= HIGH_INTENSITY)
                .count()
                >= AXIS_TRIGGER
        })
        .collect()
}

/// Bullet list describing the answer pattern.
pub fn summarize_answers(bank: &QuestionBank, answers: &AnswerSet) -> String {
    let axes = pronounced_axes(bank, answers);
    if axes.is_empty() {
        return format!("- {BALANCED_PATTERN}");
    }
    axes.into_iter()
        .map(|axis| format!("- {}", axis_trait(axis)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn tendency(value: i32, positive: &'static str, negative: &'static str) -> &'static str {
    match value {
        v if v > 0 => positive,
        v if v < 0 => negative,
        _ => "중립",
    }
}

pub fn build_prompt(bank: &QuestionBank, request: &NarrativeRequest) -> String {
    let profile = request.type_code.profile();
    let summary = summarize_answers(bank, &request.answers);
    let ch_tendency = tendency(request.ch, "열 경향", "한 경향");
    let dd_tendency = tendency(request.dd, "습 경향", "조 경향");

    format!(
        "당신은 한의학 전문가이자 체질 분석 전문가입니다.

# 사용자 체질 정보
- 체질 유형: {summary_line}
- 정의: {definition}
- 한열 지수 (CH): {ch} ({ch_tendency})
- 조습 지수 (DD): {dd} ({dd_tendency})

# 사용자 답변 패턴
{summary}

# 요청사항
위 정보를 바탕으로 개인화된 상세 분석을 친근하고 공감하는 말투로 작성해주세요.
아래 순서의 마크다운 섹션을 사용하세요.

## 🔍 당신의 몸 상태 분석
답변 패턴에서 보이는 특징을 3-4문장으로 짚어주세요.

## 🍽️ 맞춤 식습관 가이드
추천 식품과 피해야 할 식품을 각각 3-4가지 이유와 함께, 그리고 아침/점심/저녁 식사 타이밍 조언.

## 💪 생활습관 조언
이 체질에 맞는 운동, 수면 패턴, 계절과 온도에 따른 일상 관리.

## ⚠️ 특별히 주의할 점
이 체질이 조심해야 할 증상이나 상황 2-3가지.

## 💡 오늘부터 실천하기
바로 시작할 수 있는 실천 3가지를 번호로.

전문 용어는 최소화하고, 이모지를 적절히 사용하고, 전체 700-900자 분량으로 작성하세요.",
        summary_line = profile.summary,
        definition = profile.definition,
        ch = request.ch,
        dd = request.dd,
    )
}
