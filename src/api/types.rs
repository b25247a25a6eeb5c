//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::errors::AppError;
use crate::models::types::{
    EnvironmentalSnapshot, ManualAssessment, RiskAssessment, RouteProfile, ScoreFactor,
};
use crate::utils::telemetry::TelemetryStats;

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            retryable: err.code.is_retryable(),
        }
    }
}

// ============================================
// Route Assessment
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AssessmentData {
    pub route_id: String,
    pub score: u8,
    pub risk_tier: String,
    pub color: String,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub snapshot: EnvironmentalSnapshot,
    pub breakdown: Vec<ScoreFactor>,
    pub assessed_at: String,
}

impl From<RiskAssessment> for AssessmentData {
    fn from(a: RiskAssessment) -> Self {
        Self {
            route_id: a.route_id,
            score: a.score,
            risk_tier: a.risk_tier.as_str().to_string(),
            color: a.risk_tier.color_code().to_string(),
            explanation: a.explanation,
            recommendations: a.recommendations,
            snapshot: a.snapshot,
            breakdown: a.breakdown,
            assessed_at: a.assessed_at.to_rfc3339(),
        }
    }
}

// ============================================
// Manual Assessment
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ManualAssessmentData {
    pub score: u8,
    pub risk_tier: String,
    pub color: String,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub duration_hours: f64,
    pub food_type: String,
    pub breakdown: Vec<ScoreFactor>,
}

impl From<ManualAssessment> for ManualAssessmentData {
    fn from(a: ManualAssessment) -> Self {
        Self {
            score: a.score,
            risk_tier: a.risk_tier.as_str().to_string(),
            color: a.risk_tier.color_code().to_string(),
            explanation: a.explanation,
            recommendations: a.recommendations,
            temperature_c: a.reading.temperature_c,
            humidity_pct: a.reading.humidity_pct,
            duration_hours: a.reading.duration_hours,
            food_type: a.reading.food_type.as_str().to_string(),
            breakdown: a.breakdown,
        }
    }
}

// ============================================
// Batch Assessment
// ============================================

#[derive(Debug, Deserialize)]
pub struct BatchAssessmentRequest {
    /// Empty means every catalog route
    #[serde(default)]
    pub route_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchAssessmentData {
    pub total_requested: usize,
    pub total_assessed: usize,
    pub total_high_risk: usize,
    pub results: Vec<BatchRouteResult>,
    pub processing_time_ms: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchRouteResult {
    pub route_id: String,
    pub status: String, // "success" | "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

// ============================================
// Routes
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteSummary {
    #[serde(flatten)]
    pub profile: RouteProfile,
    pub in_progress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_score: Option<u8>,
}

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub telemetry: TelemetryStats,
    pub stored_assessments: usize,
    pub in_flight: usize,
    pub uptime_seconds: u64,
    pub api_version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub routes: usize,
}
