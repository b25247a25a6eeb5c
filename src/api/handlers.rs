//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::types::*;
use crate::core::engine::SpoilageEngine;
use crate::core::manual::ManualInput;
use crate::models::errors::AppError;
use crate::models::types::RiskTier;
use crate::utils::constants::MAX_BATCH_ROUTES;

/// Shared application state
pub struct AppState {
    pub engine: Arc<SpoilageEngine>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<SpoilageEngine>) -> Self {
        Self {
            engine,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn error_response(err: AppError, start: Instant) -> (StatusCode, Json<ApiResponse<()>>) {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(&err), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        routes: state.engine.catalog().len(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let store_stats = state.engine.store().stats();

    let data = StatsData {
        telemetry: state.engine.telemetry().get_stats(),
        stored_assessments: store_stats.entries,
        in_flight: store_stats.in_flight,
        uptime_seconds: state.uptime_seconds(),
        api_version: "v1".to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Route Catalog
// ============================================

pub async fn list_routes(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<RouteSummary>>> {
    let start = Instant::now();
    let engine = &state.engine;

    let routes = engine
        .catalog()
        .routes()
        .map(|profile| {
            let latest = engine.store().get(&profile.id).ok();
            RouteSummary {
                profile: profile.clone(),
                in_progress: engine.is_in_progress(&profile.id),
                latest_tier: latest.as_ref().map(|a| a.risk_tier.as_str().to_string()),
                latest_score: latest.map(|a| a.score),
            }
        })
        .collect();

    Json(ApiResponse::success(routes, elapsed_ms(start)))
}

// ============================================
// Route Assessment
// ============================================

pub async fn assess_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<String>,
) -> ApiResult<AssessmentData> {
    let start = Instant::now();

    let assessment = state
        .engine
        .assess_route(&route_id)
        .await
        .map_err(|e| error_response(e, start))?;

    Ok(Json(ApiResponse::success(assessment.into(), elapsed_ms(start))))
}

pub async fn get_assessment(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<String>,
) -> ApiResult<AssessmentData> {
    let start = Instant::now();

    if !state.engine.catalog().contains(&route_id) {
        return Err(error_response(AppError::unknown_route(&route_id), start));
    }

    let assessment = state
        .engine
        .get_assessment(&route_id)
        .map_err(|e| error_response(e, start))?;

    Ok(Json(ApiResponse::success(assessment.into(), elapsed_ms(start))))
}

// ============================================
// Manual Assessment
// ============================================

pub async fn assess_manual(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ManualInput>, JsonRejection>,
) -> ApiResult<ManualAssessmentData> {
    let start = Instant::now();

    // Wrong JSON types and missing fields are manual input errors too
    let Json(input) = payload
        .map_err(|e| error_response(AppError::invalid_manual_input(e.body_text()), start))?;

    let assessment = state
        .engine
        .assess_manual(&input)
        .map_err(|e| error_response(e, start))?;

    Ok(Json(ApiResponse::success(assessment.into(), elapsed_ms(start))))
}

// ============================================
// Batch Assessment
// ============================================

pub async fn batch_assess(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchAssessmentRequest>,
) -> ApiResult<BatchAssessmentData> {
    let start = Instant::now();

    let route_ids = if req.route_ids.is_empty() {
        state.engine.catalog().ids()
    } else {
        req.route_ids
    };

    if route_ids.len() > MAX_BATCH_ROUTES {
        return Err(error_response(
            AppError::bad_request(format!(
                "Maximum {} routes per batch request",
                MAX_BATCH_ROUTES
            )),
            start,
        ));
    }

    info!("📦 Batch assessment of {} routes", route_ids.len());
    let outcomes = state.engine.assess_many(&route_ids).await;

    let results: Vec<BatchRouteResult> = outcomes
        .into_iter()
        .map(|(route_id, outcome)| match outcome {
            Ok(assessment) => BatchRouteResult {
                route_id,
                status: "success".to_string(),
                score: Some(assessment.score),
                risk_tier: Some(assessment.risk_tier.as_str().to_string()),
                error: None,
            },
            Err(e) => BatchRouteResult {
                route_id,
                status: "error".to_string(),
                score: None,
                risk_tier: None,
                error: Some(ApiError::from(&e)),
            },
        })
        .collect();

    let total_assessed = results.iter().filter(|r| r.status == "success").count();
    let high = RiskTier::High.as_str();
    let total_high_risk = results
        .iter()
        .filter(|r| r.risk_tier.as_deref() == Some(high))
        .count();

    let data = BatchAssessmentData {
        total_requested: route_ids.len(),
        total_assessed,
        total_high_risk,
        results,
        processing_time_ms: elapsed_ms(start),
    };

    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}
