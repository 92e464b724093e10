//! Quiz domain: question banks, scoring, profiles, persistence contract,
//! narrative prompts, and the HTTP routes that tie them together.

pub mod answers;
pub mod display;
pub mod narrative;
pub mod profile;
pub mod questions;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod statistics;

#[cfg(test)]
mod tests;

pub use answers::{AnswerError, AnswerSet};
pub use display::{MapPosition, ResultView, ShareLinks};
pub use narrative::{DisabledNarrative, NarrativeError, NarrativeGenerator, NarrativeRequest};
pub use profile::Profile;
pub use questions::{Axis, Question, QuestionBank, SurveyVersion};
pub use repository::{RepositoryError, SurveyId, SurveyRecord, SurveyRepository};
pub use router::{requests_analysis, survey_router};
pub use scoring::{score, Quadrant, ScoreResult};
pub use service::{SurveyService, SurveyServiceError, SurveySettings};
pub use statistics::TypeStatistics;
