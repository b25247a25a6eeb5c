//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so that log lines and API
//! responses can be grepped and monitored.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ROUTE_xxx: Route catalog lookups
//! - ASSESSMENT_xxx: Assessment store lifecycle
//! - MANUAL_xxx: Manual entry validation
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Route Errors
    // ============================================
    /// Route id absent from the catalog
    RouteUnknown,
    /// Route catalog could not be loaded
    CatalogLoadFailed,

    // ============================================
    // Assessment Errors
    // ============================================
    /// A previous assessment for the same route has not completed
    AssessmentInProgress,
    /// No completed assessment stored for the route
    AssessmentNotFound,
    /// Result arrived for a generation that is no longer current
    AssessmentSuperseded,
    /// Assessment was cancelled before the pipeline ran
    AssessmentCancelled,

    // ============================================
    // Manual Entry Errors
    // ============================================
    /// Non-numeric or out-of-domain manual reading
    ManualInputInvalid,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RouteUnknown => "ROUTE_UNKNOWN",
            Self::CatalogLoadFailed => "CATALOG_LOAD_FAILED",

            Self::AssessmentInProgress => "ASSESSMENT_IN_PROGRESS",
            Self::AssessmentNotFound => "ASSESSMENT_NOT_FOUND",
            Self::AssessmentSuperseded => "ASSESSMENT_SUPERSEDED",
            Self::AssessmentCancelled => "ASSESSMENT_CANCELLED",

            Self::ManualInputInvalid => "MANUAL_INPUT_INVALID",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::ManualInputInvalid | Self::ConfigInvalidValue => 400,
            Self::RouteUnknown | Self::AssessmentNotFound => 404,
            Self::AssessmentInProgress | Self::AssessmentSuperseded => 409,
            Self::ApiRateLimited => 429,
            _ => 500,
        }
    }

    /// Check if the caller may simply try again later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AssessmentInProgress
                | Self::AssessmentSuperseded
                | Self::AssessmentCancelled
                | Self::ApiRateLimited
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Route id not present in the catalog
    pub fn unknown_route(route_id: &str) -> Self {
        Self::new(
            ErrorCode::RouteUnknown,
            format!("Unknown route: {}", route_id),
        )
    }

    /// Duplicate trigger for a route that is still being assessed
    pub fn already_in_progress(route_id: &str) -> Self {
        Self::new(
            ErrorCode::AssessmentInProgress,
            format!("Assessment already in progress for route {}", route_id),
        )
    }

    /// No stored assessment for the route
    pub fn assessment_not_found(route_id: &str) -> Self {
        Self::new(
            ErrorCode::AssessmentNotFound,
            format!("No assessment recorded for route {}", route_id),
        )
    }

    /// Stale result discarded
    pub fn superseded(route_id: &str, generation: u64) -> Self {
        Self::new(
            ErrorCode::AssessmentSuperseded,
            format!(
                "Assessment generation {} for route {} was superseded",
                generation, route_id
            ),
        )
    }

    /// Assessment task aborted by the caller
    pub fn cancelled(route_id: &str) -> Self {
        Self::new(
            ErrorCode::AssessmentCancelled,
            format!("Assessment for route {} was cancelled", route_id),
        )
    }

    /// Manual reading failed validation
    pub fn invalid_manual_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ManualInputInvalid, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key, value),
        )
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Client exceeded its request window
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::new(
            ErrorCode::ApiRateLimited,
            format!("Rate limit exceeded, retry in {}s", retry_after_secs),
        )
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::CatalogLoadFailed, "JSON parse error", err)
    }
}
