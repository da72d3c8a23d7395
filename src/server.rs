//! HTTP surface: routes, shared state, metrics and error mapping.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::{
    Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::location::{self, Location, LocationError};
use crate::suggest::SuggestService;
use crate::types::{
    ErrorResponse, SuggestQuery, SuggestResponse, WeatherReport, WeatherRequest,
};
use crate::upstream::{UpstreamClient, UpstreamError};
use crate::weather::WeatherService;

const INDEX_HTML: &str = include_str!("../static/index.html");

const LOCATION_GUIDANCE: &str =
    "Enter a city and state like \"Denver, CO\" (optionally followed by a ZIP code), or a 5-digit ZIP code.";

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    weather: Arc<WeatherService>,
    suggest: Arc<SuggestService>,
    metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(weather: WeatherService, suggest: SuggestService) -> Self {
        Self {
            weather: Arc::new(weather),
            suggest: Arc::new(suggest),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Wire up both services against one upstream client.
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        let client = Arc::new(UpstreamClient::new(config.upstream.clone())?);
        Ok(Self::new(
            WeatherService::new(client.clone(), config.weather.clone()),
            SuggestService::new(client, config.suggest.clone()),
        ))
    }
}

/// Server metrics
struct Metrics {
    total_requests: AtomicU64,
    requests_in_flight: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            requests_in_flight: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Count a request and return a guard that marks it finished on drop.
    fn track(&self) -> RequestGuard<'_> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.requests_in_flight.fetch_add(1, Ordering::Relaxed);
        RequestGuard(&self.requests_in_flight)
    }
}

/// RAII guard for tracking in-flight requests
struct RequestGuard<'a>(&'a AtomicU64);

impl<'a> Drop for RequestGuard<'a> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Build the Axum application with routes and middleware
pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Front end
        .route("/", get(index))
        // Health check
        .route("/health", get(health_check))
        // API routes
        .route("/api/weather", post(weather_report))
        .route("/api/suggest", get(suggest_locations))
        .route("/api/metrics", get(get_metrics))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Resolve the posted body into a validated location.
///
/// Structured fields win; the free-text `location` is only used when no
/// structured field was sent.
fn resolve_location(request: &WeatherRequest) -> Result<Location, LocationError> {
    let structured = [&request.city, &request.state, &request.zip]
        .iter()
        .any(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()));

    match request.location.as_deref() {
        Some(text) if !structured => location::parse_location(text),
        _ => Location::from_fields(
            request.city.as_deref(),
            request.state.as_deref(),
            request.zip.as_deref(),
        ),
    }
}

/// Generate (or serve from cache) a weather report
async fn weather_report(
    State(state): State<AppState>,
    payload: Result<Json<WeatherRequest>, JsonRejection>,
) -> Result<Json<WeatherReport>, ApiError> {
    let _guard = state.metrics.track();

    let Json(request) = payload.map_err(|rejection| {
        ApiError::BadRequest(format!(
            "Invalid request body: {}. {}",
            rejection.body_text(),
            LOCATION_GUIDANCE
        ))
    })?;

    let location = resolve_location(&request)?;
    tracing::info!("Weather report requested for {}", location);

    let report = state.weather.report(&location).await.map_err(|e| {
        tracing::error!("Weather report for {} failed: {}", location, e);
        ApiError::from(e)
    })?;

    Ok(Json(report))
}

/// Autocomplete suggestions; always answers 200
async fn suggest_locations(
    State(state): State<AppState>,
    query: Result<Query<SuggestQuery>, QueryRejection>,
) -> Json<SuggestResponse> {
    let _guard = state.metrics.track();

    let q = match query {
        Ok(Query(params)) => params.q.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!("Ignoring malformed suggest query: {}", rejection);
            String::new()
        }
    };

    Json(SuggestResponse {
        suggestions: state.suggest.suggest(&q).await,
    })
}

/// Get server metrics
async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        total_requests: state.metrics.total_requests.load(Ordering::Relaxed),
        requests_in_flight: state.metrics.requests_in_flight.load(Ordering::Relaxed),
        uptime_seconds: state.metrics.start_time.elapsed().as_secs(),
        weather_cache_entries: state.weather.cache().len().await,
        suggestion_cache_entries: state.suggest.cache().len().await,
    })
}

#[derive(Serialize)]
struct MetricsResponse {
    total_requests: u64,
    requests_in_flight: u64,
    uptime_seconds: u64,
    weather_cache_entries: usize,
    suggestion_cache_entries: usize,
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Configuration(String),
    BadGateway(String),
    GatewayTimeout(String),
    InternalError(String),
}

impl From<LocationError> for ApiError {
    fn from(e: LocationError) -> Self {
        let mut message = e.to_string();
        if let Some(first) = message.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        ApiError::BadRequest(format!("{}. {}", message, LOCATION_GUIDANCE))
    }
}

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::Unauthenticated => ApiError::Configuration(
                "The weather service is not configured: set OPENROUTER_API_KEY in the server environment and restart."
                    .to_string(),
            ),
            UpstreamError::Status { .. } => ApiError::BadGateway(
                "The weather provider returned an error. Please try again in a moment.".to_string(),
            ),
            UpstreamError::EmptyResponse => ApiError::BadGateway(
                "The weather provider returned an empty report. Please try again.".to_string(),
            ),
            UpstreamError::Timeout(_) => ApiError::GatewayTimeout(
                "The weather provider took too long to respond. Please try again.".to_string(),
            ),
            UpstreamError::Network(_) => ApiError::InternalError(
                "Something went wrong while generating the report. Please try again.".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
