use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::survey::narrative::{NarrativeError, NarrativeGenerator};
use crate::survey::questions::SurveyVersion;
use crate::survey::repository::{RepositoryError, SurveyId, SurveyRecord, SurveyRepository};
use crate::survey::scoring::Quadrant;
use crate::survey::service::{SurveyService, SurveySettings};

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<SurveyId, SurveyRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

#[async_trait]
impl SurveyRepository for MemoryRepository {
    async fn insert(&self, record: SurveyRecord) -> Result<SurveyRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &SurveyId) -> Result<Option<SurveyRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn count_all(&self) -> Result<u64, RepositoryError> {
        Ok(self.len() as u64)
    }

    async fn count_by_type(&self, type_code: Quadrant) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.type_code == type_code)
            .count() as u64)
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl SurveyRepository for UnavailableRepository {
    async fn insert(&self, _record: SurveyRecord) -> Result<SurveyRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch(&self, _id: &SurveyId) -> Result<Option<SurveyRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn count_all(&self) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn count_by_type(&self, _type_code: Quadrant) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Returns canned text and remembers every prompt it was handed.
#[derive(Default)]
pub(super) struct ScriptedNarrative {
    prompts: Mutex<Vec<String>>,
}

impl ScriptedNarrative {
    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("narrative mutex poisoned").clone()
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedNarrative {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        self.prompts
            .lock()
            .expect("narrative mutex poisoned")
            .push(prompt.to_string());
        Ok("  ## 🔍 당신의 몸 상태 분석\n따뜻하게 지내세요.  ".to_string())
    }
}

pub(super) struct FailingNarrative;

#[async_trait]
impl NarrativeGenerator for FailingNarrative {
    async fn generate(&self, _prompt: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Remote("HTTP 500".to_string()))
    }
}

pub(super) struct StalledNarrative;

#[async_trait]
impl NarrativeGenerator for StalledNarrative {
    async fn generate(&self, _prompt: &str) -> Result<String, NarrativeError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".to_string())
    }
}

pub(super) fn settings() -> SurveySettings {
    SurveySettings {
        default_version: SurveyVersion::Short,
        public_base_url: "https://quiz.example".to_string(),
        narrative_timeout: Duration::from_millis(50),
    }
}

pub(super) fn build_service(
    narrator: Arc<dyn NarrativeGenerator>,
) -> (Arc<SurveyService<MemoryRepository>>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let service = SurveyService::new(Arc::new(repository.clone()), narrator, settings());
    (Arc::new(service), repository)
}

/// Every heat and damp question at full intensity.
pub(super) fn heat_damp_answers() -> Value {
    let mut answers = serde_json::Map::new();
    for question in SurveyVersion::Short.bank().all_questions() {
        let value = match question.id.chars().next() {
            Some('H') | Some('W') => 4,
            _ => 0,
        };
        answers.insert(question.id.to_string(), json!(value));
    }
    Value::Object(answers)
}

pub(super) fn cold_dry_answers() -> Value {
    json!({ "C1": 4, "C2": 3, "C3": 3, "D1": 2, "W1": 1 })
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
