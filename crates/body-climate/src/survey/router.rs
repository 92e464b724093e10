use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::answers::AnswerSet;
use super::narrative::{NarrativeError, NarrativeRequest};
use super::questions::{Question, SurveyVersion, LIKERT_LABELS, MAX_INTENSITY};
use super::repository::{RepositoryError, SurveyId, SurveyRepository};
use super::scoring::{self, Quadrant};
use super::service::{SurveyService, SurveyServiceError};

/// Router builder exposing the quiz endpoints.
pub fn survey_router<R>(service: Arc<SurveyService<R>>) -> Router
where
    R: SurveyRepository + 'static,
{
    Router::new()
        .route("/api/questions", get(questions_handler::<R>))
        .route("/api/submit", post(submit_handler::<R>))
        .route("/api/submit-short", post(submit_short_handler::<R>))
        .route("/api/results/:survey_id", get(result_handler::<R>))
        .route("/api/stats", get(stats_handler::<R>))
        .route("/api/analyze", post(analyze_handler::<R>))
        .route("/r/:survey_id", get(view_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) answers: Option<Value>,
    #[serde(default)]
    pub(crate) version: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct AnalyzeRequest {
    #[serde(default)]
    pub(crate) answers: Option<Value>,
    #[serde(default, rename = "typeCode")]
    pub(crate) type_code: Option<String>,
    #[serde(default)]
    pub(crate) ch: Option<i32>,
    #[serde(default)]
    pub(crate) dd: Option<i32>,
    #[serde(default)]
    pub(crate) version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VersionQuery {
    #[serde(default)]
    pub(crate) version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsQuery {
    #[serde(default, rename = "typeCode")]
    pub(crate) type_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ViewQuery {
    #[serde(default)]
    pub(crate) analysis: Option<String>,
}

impl ViewQuery {
    fn wants_analysis(&self) -> bool {
        self.analysis.as_deref().is_some_and(flag_enabled)
    }
}

/// Loose boolean for query flags: `true`, `1`, `yes` and `on` enable.
fn flag_enabled(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Whether a result view request will call the narrative provider.
pub fn requests_analysis(uri: &Uri) -> bool {
    uri.path().starts_with("/r/")
        && Query::<ViewQuery>::try_from_uri(uri)
            .map(|Query(query)| query.wants_analysis())
            .unwrap_or(false)
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionBankView {
    pub(crate) version: SurveyVersion,
    pub(crate) max_intensity: u8,
    pub(crate) labels: [&'static str; 5],
    pub(crate) questions: &'static [Question],
}

fn bad_request(detail: impl std::fmt::Display) -> Response {
    let payload = json!({
        "error": "invalid",
        "detail": detail.to_string(),
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn parse_version(raw: Option<&str>) -> Result<Option<SurveyVersion>, Response> {
    raw.map(|value| value.parse::<SurveyVersion>().map_err(bad_request))
        .transpose()
}

impl IntoResponse for SurveyServiceError {
    fn into_response(self) -> Response {
        match self {
            SurveyServiceError::InvalidAnswers(error) => bad_request(error),
            SurveyServiceError::Repository(RepositoryError::NotFound) => {
                let payload = json!({ "error": "result not found" });
                (StatusCode::NOT_FOUND, Json(payload)).into_response()
            }
            SurveyServiceError::Repository(other) => {
                error!(error = %other, "survey storage failed");
                let payload = json!({ "error": other.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
        }
    }
}

pub(crate) async fn questions_handler<R>(
    State(service): State<Arc<SurveyService<R>>>,
    Query(query): Query<VersionQuery>,
) -> Response
where
    R: SurveyRepository + 'static,
{
    let version = match parse_version(query.version.as_deref()) {
        Ok(version) => version,
        Err(response) => return response,
    };
    let bank = service.questions(version);
    let view = QuestionBankView {
        version: bank.version(),
        max_intensity: MAX_INTENSITY,
        labels: LIKERT_LABELS,
        questions: bank.all_questions(),
    };
    (StatusCode::OK, Json(view)).into_response()
}

async fn submit_with_version<R>(
    service: &SurveyService<R>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
    forced: Option<SurveyVersion>,
) -> Response
where
    R: SurveyRepository + 'static,
{
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let requested = match parse_version(request.version.as_deref()) {
        Ok(version) => version,
        Err(response) => return response,
    };
    let answers = request.answers.unwrap_or(Value::Null);

    match service.submit(&answers, forced.or(requested)).await {
        Ok(record) => (StatusCode::OK, Json(json!({ "id": record.id }))).into_response(),
        Err(other) => other.into_response(),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<SurveyService<R>>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Response
where
    R: SurveyRepository + 'static,
{
    submit_with_version(&service, payload, None).await
}

pub(crate) async fn submit_short_handler<R>(
    State(service): State<Arc<SurveyService<R>>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Response
where
    R: SurveyRepository + 'static,
{
    submit_with_version(&service, payload, Some(SurveyVersion::Short)).await
}

fn not_found(survey_id: &str) -> Response {
    let payload = json!({
        "error": "result not found",
        "id": survey_id,
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

pub(crate) async fn result_handler<R>(
    State(service): State<Arc<SurveyService<R>>>,
    Path(survey_id): Path<String>,
) -> Response
where
    R: SurveyRepository + 'static,
{
    let Ok(id) = survey_id.parse::<SurveyId>() else {
        return not_found(&survey_id);
    };
    match service.get(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(other) => other.into_response(),
    }
}

pub(crate) async fn view_handler<R>(
    State(service): State<Arc<SurveyService<R>>>,
    Path(survey_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response
where
    R: SurveyRepository + 'static,
{
    let Ok(id) = survey_id.parse::<SurveyId>() else {
        return not_found(&survey_id);
    };
    match service.result_view(&id, query.wants_analysis()).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(other) => other.into_response(),
    }
}

pub(crate) async fn stats_handler<R>(
    State(service): State<Arc<SurveyService<R>>>,
    Query(query): Query<StatsQuery>,
) -> Response
where
    R: SurveyRepository + 'static,
{
    let Some(raw) = query.type_code else {
        let payload = json!({ "error": "typeCode required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };
    let type_code = match raw.parse::<Quadrant>() {
        Ok(type_code) => type_code,
        Err(error) => return bad_request(error),
    };
    match service.type_statistics(type_code).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(other) => other.into_response(),
    }
}

pub(crate) async fn analyze_handler<R>(
    State(service): State<Arc<SurveyService<R>>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response
where
    R: SurveyRepository + 'static,
{
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let (Some(raw_answers), Some(raw_type)) = (request.answers, request.type_code) else {
        return bad_request("answers and typeCode are required");
    };
    let answers = match AnswerSet::from_json(&raw_answers) {
        Ok(answers) => answers,
        Err(error) => return bad_request(error),
    };
    let type_code = match raw_type.parse::<Quadrant>() {
        Ok(type_code) => type_code,
        Err(error) => return bad_request(error),
    };
    let version = match parse_version(request.version.as_deref()) {
        Ok(version) => version,
        Err(response) => return response,
    };

    let bank = service.questions(version);
    let (ch, dd) = match (request.ch, request.dd) {
        (Some(ch), Some(dd)) => (ch, dd),
        (ch, dd) => {
            let derived = scoring::score(&bank, &answers);
            (ch.unwrap_or(derived.ch), dd.unwrap_or(derived.dd))
        }
    };
    let narrative_request = NarrativeRequest {
        answers,
        type_code,
        ch,
        dd,
    };

    match service.narrative(&bank, &narrative_request).await {
        Ok(analysis) => {
            let payload = json!({
                "success": true,
                "analysis": analysis,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => {
            warn!(%error, type_code = %type_code, "narrative generation failed");
            let status = match error {
                NarrativeError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
                NarrativeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                NarrativeError::Remote(_) | NarrativeError::EmptyResponse => {
                    StatusCode::BAD_GATEWAY
                }
            };
            let payload = json!({
                "error": "analysis failed",
                "message": error.to_string(),
            });
            (status, Json(payload)).into_response()
        }
    }
}
