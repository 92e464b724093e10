use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answers::AnswerSet;
use super::questions::SurveyVersion;
use super::scoring::{self, Quadrant, ScoreResult};

/// Opaque identifier assigned at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(pub Uuid);

impl SurveyId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SurveyId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

/// Persisted submission: raw answers plus the score derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub id: SurveyId,
    pub version: SurveyVersion,
    pub ch: i32,
    pub dd: i32,
    pub type_code: Quadrant,
    pub answers: AnswerSet,
    pub created_at: DateTime<Utc>,
}

impl SurveyRecord {
    pub fn new(
        id: SurveyId,
        version: SurveyVersion,
        score: ScoreResult,
        answers: AnswerSet,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            version,
            ch: score.ch,
            dd: score.dd,
            type_code: score.type_code,
            answers,
            created_at,
        }
    }

    /// Score as stored at submission time.
    pub fn score(&self) -> ScoreResult {
        ScoreResult {
            ch: self.ch,
            dd: self.dd,
            type_code: self.type_code,
        }
    }

    /// Score the stored answers again with the bank revision they were
    /// collected under.
    pub fn rescore(&self) -> ScoreResult {
        scoring::score(&self.version.bank(), &self.answers)
    }
}

/// Storage abstraction over the hosted survey table.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    async fn insert(&self, record: SurveyRecord) -> Result<SurveyRecord, RepositoryError>;
    async fn fetch(&self, id: &SurveyId) -> Result<Option<SurveyRecord>, RepositoryError>;
    async fn count_all(&self) -> Result<u64, RepositoryError>;
    async fn count_by_type(&self, type_code: Quadrant) -> Result<u64, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored record is malformed: {0}")]
    Corrupt(String),
}
