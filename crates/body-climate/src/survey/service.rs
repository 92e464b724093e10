use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::answers::{AnswerError, AnswerSet};
use super::display::ResultView;
use super::narrative::{build_prompt, NarrativeError, NarrativeGenerator, NarrativeRequest};
use super::questions::{QuestionBank, SurveyVersion};
use super::repository::{RepositoryError, SurveyId, SurveyRecord, SurveyRepository};
use super::scoring::{self, Quadrant};
use super::statistics::TypeStatistics;

/// Knobs the service needs from application configuration.
#[derive(Debug, Clone)]
pub struct SurveySettings {
    pub default_version: SurveyVersion,
    pub public_base_url: String,
    pub narrative_timeout: Duration,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            default_version: SurveyVersion::Short,
            public_base_url: "http://localhost:3000".to_string(),
            narrative_timeout: Duration::from_secs(20),
        }
    }
}

/// Service composing the scorer, the repository, and the narrative provider.
pub struct SurveyService<R> {
    repository: Arc<R>,
    narrator: Arc<dyn NarrativeGenerator>,
    settings: SurveySettings,
}

impl<R> SurveyService<R>
where
    R: SurveyRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        narrator: Arc<dyn NarrativeGenerator>,
        settings: SurveySettings,
    ) -> Self {
        Self {
            repository,
            narrator,
            settings,
        }
    }

    pub fn settings(&self) -> &SurveySettings {
        &self.settings
    }

    pub fn questions(&self, version: Option<SurveyVersion>) -> QuestionBank {
        version.unwrap_or(self.settings.default_version).bank()
    }

    /// Validate, score, and persist one submission.
    pub async fn submit(
        &self,
        payload: &Value,
        version: Option<SurveyVersion>,
    ) -> Result<SurveyRecord, SurveyServiceError> {
        let answers = AnswerSet::from_json(payload)?;
        let version = version.unwrap_or(self.settings.default_version);
        let score = scoring::score(&version.bank(), &answers);

        let record = SurveyRecord::new(SurveyId::generate(), version, score, answers, Utc::now());
        let stored = self.repository.insert(record).await?;

        info!(
            survey_id = %stored.id,
            version = %stored.version,
            type_code = %stored.type_code,
            ch = stored.ch,
            dd = stored.dd,
            "survey stored"
        );
        Ok(stored)
    }

    pub async fn get(&self, id: &SurveyId) -> Result<SurveyRecord, SurveyServiceError> {
        let record = self
            .repository
            .fetch(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub async fn type_statistics(
        &self,
        type_code: Quadrant,
    ) -> Result<TypeStatistics, SurveyServiceError> {
        let total = self.repository.count_all().await?;
        if total == 0 {
            return Ok(TypeStatistics::default());
        }
        let type_count = self.repository.count_by_type(type_code).await?;
        Ok(TypeStatistics::compute(type_count, total))
    }

    /// Ask the provider for a narrative, bounded by the configured timeout.
    pub async fn narrative(
        &self,
        bank: &QuestionBank,
        request: &NarrativeRequest,
    ) -> Result<String, NarrativeError> {
        let prompt = build_prompt(bank, request);
        let timeout = self.settings.narrative_timeout;
        debug!(type_code = %request.type_code, prompt_chars = prompt.chars().count(), "requesting narrative");

        let text = tokio::time::timeout(timeout, self.narrator.generate(&prompt))
            .await
            .map_err(|_| NarrativeError::Timeout(timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(NarrativeError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    /// Display view for a stored record. A failed narrative is logged and
    /// left out rather than failing the view.
    pub async fn result_view(
        &self,
        id: &SurveyId,
        include_narrative: bool,
    ) -> Result<ResultView, SurveyServiceError> {
        let record = self.get(id).await?;
        let view = ResultView::from_record(&record, &self.settings.public_base_url);
        if !include_narrative {
            return Ok(view);
        }

        let request = NarrativeRequest {
            answers: record.answers.clone(),
            type_code: record.type_code,
            ch: record.ch,
            dd: record.dd,
        };
        let narrative = match self.narrative(&record.version.bank(), &request).await {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(survey_id = %record.id, %error, "narrative unavailable, rendering without it");
                None
            }
        };
        Ok(view.with_narrative(narrative))
    }
}

/// Error raised by the survey service.
#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error(transparent)]
    InvalidAnswers(#[from] AnswerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
