use crate::cli::ServeArgs;
use crate::infra::{AppState, GeminiNarrative, InMemorySurveyRepository, PgSurveyRepository};
use crate::routes::with_survey_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use body_climate::config::AppConfig;
use body_climate::error::AppError;
use body_climate::survey::{
    DisabledNarrative, NarrativeGenerator, SurveyRepository, SurveyService,
};
use body_climate::telemetry;
use body_climate::throttle::{spawn_sweeper, FixedWindowCounter, RateCounter, RateLimitState};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let narrator: Arc<dyn NarrativeGenerator> = match GeminiNarrative::from_config(&config.narrative)
    {
        Some(gemini) => {
            info!(model = %config.narrative.model, "narrative generation enabled");
            Arc::new(gemini)
        }
        None => {
            warn!("GEMINI_API_KEY not set, /api/analyze will answer 503");
            Arc::new(DisabledNarrative)
        }
    };

    match config.database.url.clone() {
        Some(url) => {
            let repository =
                PgSurveyRepository::connect(&url, config.database.max_connections).await?;
            serve_with(config, repository, narrator).await
        }
        None => {
            warn!("DATABASE_URL not set, results are kept in memory only");
            serve_with(config, InMemorySurveyRepository::default(), narrator).await
        }
    }
}

async fn serve_with<R>(
    config: AppConfig,
    repository: R,
    narrator: Arc<dyn NarrativeGenerator>,
) -> Result<(), AppError>
where
    R: SurveyRepository + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let survey_service = Arc::new(SurveyService::new(
        Arc::new(repository),
        narrator,
        config.survey_settings(),
    ));

    let counter: Arc<dyn RateCounter> =
        Arc::new(FixedWindowCounter::new(config.rate_limit.window));
    let _sweeper = spawn_sweeper(counter.clone());
    let limiter = RateLimitState::new(counter, config.rate_limit.max_requests);

    let app = with_survey_routes(survey_service, limiter)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        survey_version = %config.survey.default_version,
        rate_limit = config.rate_limit.max_requests,
        "body climate quiz ready"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
