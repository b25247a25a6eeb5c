//! Type definitions for Spoilage Sentry
//! All core data structures for route risk assessment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the cargo travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Truck,
    Ship,
    Rail,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Truck => "truck",
            TransportType::Ship => "ship",
            TransportType::Rail => "rail",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStatus {
    Scheduled,
    InTransit,
    Delayed,
    Completed,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Scheduled => "scheduled",
            RouteStatus::InTransit => "in-transit",
            RouteStatus::Delayed => "delayed",
            RouteStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a cargo route, supplied by the route catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteProfile {
    pub id: String,
    pub source: String,
    pub destination: String,
    pub transport_type: TransportType,
    pub distance_km: f64,
    /// Free text. Only "Dairy" and "Produce" (case-sensitive) affect scoring.
    pub cargo_category: String,
    pub status: RouteStatus,
    pub estimated_duration_hours: f64,
}

/// Synthesized reading used as scoring input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSnapshot {
    pub temperature_c: f64,
    /// Always within 70..=100 when produced by the synthesizer
    pub humidity_pct: f64,
    pub duration_hours: f64,
}

/// Discrete risk classification derived from the score alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// 0-30 Low, 31-65 Medium, 66+ High
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=30 => RiskTier::Low,
            31..=65 => RiskTier::Medium,
            _ => RiskTier::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskTier::Low => "🟢",
            RiskTier::Medium => "🟡",
            RiskTier::High => "🔴",
        }
    }

    /// Badge color for presentation layers
    pub fn color_code(&self) -> &'static str {
        match self {
            RiskTier::Low => "#22c55e",
            RiskTier::Medium => "#eab308",
            RiskTier::High => "#ef4444",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single rule that fired while scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    pub effect: FactorEffect,
    pub reason: String,
}

/// How a factor changed the raw score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FactorEffect {
    Points(u8),
    Multiplier(f64),
}

/// Engine output for a catalog route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub route_id: String,
    pub score: u8,
    pub risk_tier: RiskTier,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub snapshot: EnvironmentalSnapshot,
    pub breakdown: Vec<ScoreFactor>,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// One-line summary for logs and CLI output
    pub fn summary(&self) -> String {
        format!(
            "{} {} | Risk: {} ({}%) | {:.1}°C {:.1}% {}h",
            self.risk_tier.emoji(),
            self.route_id,
            self.risk_tier,
            self.score,
            self.snapshot.temperature_c,
            self.snapshot.humidity_pct,
            self.snapshot.duration_hours,
        )
    }
}

/// Food categories accepted by the manual entry path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodType {
    Produce,
    Dairy,
    Meat,
    Packaged,
}

impl FoodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodType::Produce => "produce",
            FoodType::Dairy => "dairy",
            FoodType::Meat => "meat",
            FoodType::Packaged => "packaged",
        }
    }

    /// Parse a user-entered label, ignoring case and surrounding whitespace
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "produce" => Some(FoodType::Produce),
            "dairy" => Some(FoodType::Dairy),
            "meat" => Some(FoodType::Meat),
            "packaged" => Some(FoodType::Packaged),
            _ => None,
        }
    }
}

impl fmt::Display for FoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated manual reading, ready for the scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualReading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub duration_hours: f64,
    pub food_type: FoodType,
}

/// Scorer output for a manually entered reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualAssessment {
    pub score: u8,
    pub risk_tier: RiskTier,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub reading: ManualReading,
    pub breakdown: Vec<ScoreFactor>,
    pub assessed_at: DateTime<Utc>,
}
