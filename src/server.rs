use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::categories::{
    layer_overrides, parse_category, resolve_fallback_chain, FallbackOverrides, Round,
};
use crate::config::Config;
use crate::cutoffs::stats::{collect_chain_stats, CategoryStats};
use crate::cutoffs::CutoffResponse;
use crate::prediction::decision::build_decision;
use crate::prediction::report::{build_report, PredictionReport};
use crate::prediction::{validate_rank, DecisionSummary};
use crate::recommend::{build_recommendations, BranchCutoffs, RecommendQuery, Recommendation};

#[derive(Clone)]
struct ApiState {
    config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize, Default)]
struct FallbackRequest {
    category: Option<String>,
    #[serde(default)]
    fall_back: Option<FallbackOverrides>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct StatsRequest {
    category: Option<String>,
    #[serde(default)]
    cutoffs: CutoffResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct PredictRequest {
    rank: i64,
    category: Option<String>,
    #[serde(default)]
    cutoffs: CutoffResponse,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct DecisionRequest {
    category: Option<String>,
    #[serde(default)]
    cutoffs: CutoffResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct RecommendRequest {
    rank: i64,
    category: Option<String>,
    year: Option<String>,
    round: Option<Round>,
    cluster: Option<String>,
    opening_rank: Option<u32>,
    closing_rank: Option<u32>,
    #[serde(default)]
    fall_back: Option<FallbackOverrides>,
    #[serde(default)]
    branches: Vec<BranchCutoffs>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct FallbackResponse {
    category: String,
    chain: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    categories: Vec<CategoryStats>,
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    window: (u32, u32),
    recommendations: Vec<Recommendation>,
}

fn router(config: Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/fallback", post(fallback))
        .route("/v1/stats", post(stats))
        .route("/v1/predict", post(predict))
        .route("/v1/decision", post(decision))
        .route("/v1/recommend", post(recommend))
        .layer(cors)
        .with_state(ApiState { config })
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn fallback(
    State(state): State<ApiState>,
    Json(request): Json<FallbackRequest>,
) -> ApiResult<FallbackResponse> {
    let category = resolve_category(&state, request.category.as_deref())?;
    let overrides = layer_overrides(&state.config.fallback.chains, request.fall_back.as_ref());
    let chain = resolve_fallback_chain(&category, Some(&overrides));
    Ok(ok(FallbackResponse { category, chain }))
}

async fn stats(
    State(state): State<ApiState>,
    Json(request): Json<StatsRequest>,
) -> ApiResult<StatsResponse> {
    let chain = match request.category.as_deref() {
        Some(raw) => {
            let category = parse_category(raw).map_err(|e| ApiError::bad_request(e.to_string()))?;
            let overrides = effective_overrides(&state, &request.cutoffs);
            resolve_fallback_chain(&category, Some(&overrides))
        }
        None => request.cutoffs.categories.keys().cloned().collect(),
    };
    Ok(ok(StatsResponse {
        categories: collect_chain_stats(&chain, &request.cutoffs.categories),
    }))
}

async fn predict(
    State(state): State<ApiState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<PredictionReport> {
    let rank = validate_rank(request.rank).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let category = resolve_category(&state, request.category.as_deref())?;
    let overrides = effective_overrides(&state, &request.cutoffs);
    let report = build_report(rank, &category, &request.cutoffs.categories, Some(&overrides));
    if !report.is_available() {
        return Err(ApiError::not_found(format!(
            "no prediction available for category {category}"
        )));
    }
    info!("predicted rank {rank} / {category}");
    Ok(ok(report))
}

async fn decision(
    State(state): State<ApiState>,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<DecisionSummary> {
    let category = resolve_category(&state, request.category.as_deref())?;
    let overrides = effective_overrides(&state, &request.cutoffs);
    build_decision(&category, &request.cutoffs.categories, Some(&overrides))
        .map(ok)
        .ok_or_else(|| {
            ApiError::not_found(format!("no decision available for category {category}"))
        })
}

async fn recommend(
    State(state): State<ApiState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResult<RecommendResponse> {
    let rank = validate_rank(request.rank).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let category = resolve_category(&state, request.category.as_deref())?;

    let mut query = RecommendQuery::new(rank, category);
    query.year = request
        .year
        .unwrap_or_else(|| state.config.recommend.year.clone());
    query.round = request.round.unwrap_or(state.config.recommend.round);
    query.cluster = request.cluster;
    query.opening_rank = request.opening_rank;
    query.closing_rank = request.closing_rank;

    let overrides = layer_overrides(&state.config.fallback.chains, request.fall_back.as_ref());
    let recommendations = build_recommendations(&request.branches, &query, Some(&overrides));
    Ok(ok(RecommendResponse {
        window: query.window(),
        recommendations,
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn resolve_category(
    state: &ApiState,
    requested: Option<&str>,
) -> std::result::Result<String, ApiError> {
    let raw = requested.unwrap_or(state.config.applicant.category.as_str());
    parse_category(raw).map_err(|error| ApiError::bad_request(error.to_string()))
}

/// Payload `fall_back` entries win over configured chains.
fn effective_overrides(state: &ApiState, cutoffs: &CutoffResponse) -> FallbackOverrides {
    layer_overrides(&state.config.fallback.chains, cutoffs.fall_back.as_ref())
}
