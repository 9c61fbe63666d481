use axum::{
    Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header::AUTHORIZATION},
    middleware::{Next, from_fn, from_fn_with_state},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    config::ServiceConfig,
    intake::{clean_price, validate_feedback},
    llm::{OpenRouterReplyGenerator, ReplyGenerator},
    models::{AnalysisResult, AnalyzeFeedbackRequest, SentimentCount, TrendPoint},
    sentiment::{LexiconClassifier, SentimentClassifier},
    store::{FeedbackStore, InMemoryFeedbackStore, PostgresFeedbackStore},
    workflow::{FeedbackSubmission, FeedbackWorkflow},
};

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn unauthorized_error() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Dashboard access requires a valid bearer token." })),
    )
}

fn not_found_error(message: &str, id: &Uuid) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message, "id": id })),
    )
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<FeedbackWorkflow>,
    pub store: Arc<dyn FeedbackStore>,
    pub require_llm: bool,
    pub dashboard_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        config: &ServiceConfig,
        classifier: Arc<dyn SentimentClassifier>,
        generator: Option<Arc<dyn ReplyGenerator>>,
        store: Arc<dyn FeedbackStore>,
    ) -> Self {
        let workflow =
            FeedbackWorkflow::new(classifier, generator, store.clone(), config.llm_timeout);
        Self {
            workflow: Arc::new(workflow),
            store,
            require_llm: config.require_llm,
            dashboard_token: config.dashboard_token.as_deref().map(Arc::from),
        }
    }

    /// Wires the production collaborators described by `config`.
    pub async fn from_config(config: &ServiceConfig) -> Self {
        let store = create_feedback_store(config).await;

        let generator: Option<Arc<dyn ReplyGenerator>> =
            match config.openrouter_api_key.as_deref() {
                Some(api_key) => {
                    info!(model = %config.llm_model, "reply generation enabled");
                    Some(Arc::new(OpenRouterReplyGenerator::new(
                        api_key,
                        &config.llm_model,
                    )))
                }
                None if config.require_llm => {
                    error!("OPENROUTER_API_KEY not set and REQUIRE_LLM is on; analysis requests will fail");
                    None
                }
                None => {
                    warn!("OPENROUTER_API_KEY not set; replies will use offline fallbacks");
                    None
                }
            };

        if config.dashboard_token.is_none() {
            warn!("DASHBOARD_TOKEN not set; dashboard routes are unauthenticated");
        }

        Self::new(config, Arc::new(LexiconClassifier::new()), generator, store)
    }
}

/// Postgres when `DATABASE_URL` is set and reachable, in-memory otherwise.
async fn create_feedback_store(config: &ServiceConfig) -> Arc<dyn FeedbackStore> {
    match config.database_url.as_deref() {
        Some(database_url) => match PostgresFeedbackStore::connect(database_url).await {
            Ok(store) => {
                info!("Using PostgreSQL feedback storage");
                Arc::new(store)
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Failed to connect to PostgreSQL. Falling back to in-memory storage."
                );
                Arc::new(InMemoryFeedbackStore::new())
            }
        },
        None => {
            info!("Using in-memory feedback storage (set DATABASE_URL to use PostgreSQL)");
            Arc::new(InMemoryFeedbackStore::new())
        }
    }
}

pub async fn create_app(config: &ServiceConfig) -> Router {
    let app_state = AppState::from_config(config).await;
    build_router(app_state)
}

pub fn build_router(app_state: AppState) -> Router {
    let dashboard = Router::new()
        .route("/api/trends", get(trends))
        .route("/api/sentiment-stats", get(sentiment_stats))
        .route("/api/feedback/{id}", delete(delete_feedback))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            require_dashboard_token,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/analyze-feedback", post(analyze_feedback))
        .merge(dashboard)
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags every request with a fresh correlation id: a tracing span for the
/// handler and a response header for the client.
async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header {
        request
            .headers_mut()
            .insert(CORRELATION_ID_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

async fn require_dashboard_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.dashboard_token.as_deref() {
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        if presented != Some(expected) {
            warn!(path = %request.uri().path(), "rejected dashboard request");
            return Err(unauthorized_error());
        }
    }
    Ok(next.run(request).await)
}

/// The credentials of a `Bearer` authorization header. The scheme name is
/// matched case-insensitively.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Customer Feedback Analysis Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Sentiment analysis and generated replies for customer feedback",
        "endpoints": {
            "POST /api/analyze-feedback": "Analyse a piece of feedback",
            "GET /api/trends": "Daily positive/negative/neutral counts (dashboard)",
            "GET /api/sentiment-stats": "Totals per sentiment (dashboard)",
            "DELETE /api/feedback/{id}": "Remove a stored feedback record (dashboard)",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn analyze_feedback(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeFeedbackRequest>, JsonRejection>,
) -> ApiResult<AnalysisResult> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "unreadable analyze request");
        bad_request_error("Invalid request body.")
    })?;

    let feedback = validate_feedback(request.feedback.as_deref())
        .map_err(|e| bad_request_error(&e.to_string()))?;

    if state.require_llm && !state.workflow.generator_available() {
        error!("analysis refused: reply generation is required but not configured");
        return Err(internal_error("OPENROUTER_API_KEY is not configured."));
    }

    let submission = FeedbackSubmission {
        feedback: feedback.to_string(),
        price: request.price.as_ref().and_then(clean_price),
    };
    info!(
        feedback_chars = submission.feedback.chars().count(),
        has_price = submission.price.is_some(),
        "analysing feedback"
    );

    match state.workflow.analyze(submission).await {
        Ok(analysis) => Ok(Json(analysis)),
        Err(e) => {
            error!(error = %e, "feedback analysis failed");
            Err(internal_error("Server error."))
        }
    }
}

async fn trends(State(state): State<AppState>) -> ApiResult<Vec<TrendPoint>> {
    state.store.daily_trends().await.map(Json).map_err(|e| {
        error!(error = %e, "failed to load trends");
        internal_error("Failed to load trends.")
    })
}

async fn sentiment_stats(State(state): State<AppState>) -> ApiResult<Vec<SentimentCount>> {
    state.store.sentiment_counts().await.map(Json).map_err(|e| {
        error!(error = %e, "failed to load sentiment stats");
        internal_error("Failed to load sentiment stats.")
    })
}

async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    match state.store.delete(id).await {
        Ok(true) => {
            info!(record_id = %id, "feedback record deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(not_found_error("Feedback record not found", &id)),
        Err(e) => {
            error!(record_id = %id, error = %e, "failed to delete feedback record");
            Err(internal_error("Failed to delete feedback record."))
        }
    }
}
