//! Spoilage Sentry Library
//!
//! Cold-chain spoilage risk estimation for cargo routes:
//! - Environmental synthesis from a route's static profile plus jitter
//! - Weighted rule-table scoring into Low / Medium / High tiers
//! - Assessment store with duplicate-trigger rejection
//! - Manual entry path for operator-supplied readings

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::{
    score, score_manual, synthesize, AssessmentHandle, FixedSequence, InputValue, ManualInput,
    RandomSource, RngSource, RouteCatalog, SpoilageEngine, SpoilageScore, SpoilageScoreBuilder,
};
pub use models::{
    AppError, AppResult, EngineConfig, EnvironmentalSnapshot, ErrorCode, FoodType,
    ManualAssessment, ManualReading, RiskAssessment, RiskTier, RouteProfile, RouteStatus,
    ServerConfig, TransportType,
};
pub use utils::{AssessmentStore, TelemetryCollector, TelemetryStats};
