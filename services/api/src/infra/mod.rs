mod gemini;
mod memory;
mod postgres;

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) use gemini::GeminiNarrative;
pub(crate) use memory::InMemorySurveyRepository;
pub(crate) use postgres::PgSurveyRepository;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}
