use async_trait::async_trait;
use body_climate::survey::{Quadrant, RepositoryError, SurveyId, SurveyRecord, SurveyRepository};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local store used when no database is configured. Results vanish on
/// restart.
#[derive(Default, Clone)]
pub(crate) struct InMemorySurveyRepository {
    records: Arc<Mutex<HashMap<SurveyId, SurveyRecord>>>,
}

impl InMemorySurveyRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<SurveyId, SurveyRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("survey store lock poisoned".to_string()))
    }
}

#[async_trait]
impl SurveyRepository for InMemorySurveyRepository {
    async fn insert(&self, record: SurveyRecord) -> Result<SurveyRecord, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &SurveyId) -> Result<Option<SurveyRecord>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn count_all(&self) -> Result<u64, RepositoryError> {
        Ok(self.guard()?.len() as u64)
    }

    async fn count_by_type(&self, type_code: Quadrant) -> Result<u64, RepositoryError> {
        Ok(self
            .guard()?
            .values()
            .filter(|record| record.type_code == type_code)
            .count() as u64)
    }
}
