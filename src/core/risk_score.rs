//! Risk Scoring Module
//! Turns an environmental reading into a bounded 0-100 spoilage score
//!
//! - 0-30: Low (conditions within optimal ranges)
//! - 31-65: Medium (quality may degrade, monitor closely)
//! - 66-100: High (intervention required)
//!
//! Additive band points are accumulated first, then the cargo, transport
//! and status multipliers are applied in that order, regardless of the
//! order the builder methods were called in.

use chrono::{DateTime, Utc};

use crate::models::types::{
    EnvironmentalSnapshot, FactorEffect, FoodType, ManualAssessment, ManualReading,
    RiskAssessment, RiskTier, RouteProfile, RouteStatus, ScoreFactor, TransportType,
};
use crate::utils::constants::{
    band_points, DAIRY_MULTIPLIER, DELAYED_MULTIPLIER, DISTANCE_BANDS, DRY_POINTS,
    DRY_THRESHOLD_PCT, DURATION_BANDS, HIGH_RISK_RECOMMENDATIONS, HUMID_POINTS,
    HUMID_THRESHOLD_PCT, LOW_RISK_RECOMMENDATIONS, MAX_SCORE, MEAT_MULTIPLIER,
    MEDIUM_RISK_RECOMMENDATIONS, PRODUCE_MULTIPLIER, SHIP_MULTIPLIER, TEMPERATURE_BANDS,
};

/// Final score with the rules that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct SpoilageScore {
    /// Rounded, clamped score (0-100)
    pub total: u8,
    /// Additive points before multipliers
    pub base_points: u32,
    /// Score after multipliers, before clamping and rounding
    pub adjusted: f64,
    pub tier: RiskTier,
    pub breakdown: Vec<ScoreFactor>,
}

/// Pending multiplier, applied at build time
#[derive(Debug, Clone)]
struct Modifier {
    name: &'static str,
    multiplier: f64,
    reason: String,
}

/// Builder for spoilage scores
pub struct SpoilageScoreBuilder {
    points: u32,
    factors: Vec<ScoreFactor>,
    cargo: Option<Modifier>,
    transport: Option<Modifier>,
    status: Option<Modifier>,
}

impl SpoilageScoreBuilder {
    pub fn new() -> Self {
        Self {
            points: 0,
            factors: Vec::new(),
            cargo: None,
            transport: None,
            status: None,
        }
    }

    fn add_points(&mut self, name: &str, points: u8, reason: String) {
        self.points += u32::from(points);
        self.factors.push(ScoreFactor {
            name: name.to_string(),
            effect: FactorEffect::Points(points),
            reason,
        });
    }

    /// Temperature band: >20 → 40, >10 → 25, >4 → 10
    pub fn with_temperature(mut self, temperature_c: f64) -> Self {
        if let Some((threshold, points)) = band_points(temperature_c, &TEMPERATURE_BANDS) {
            self.add_points(
                "Temperature",
                points,
                format!("{:.1}°C is above {}°C", temperature_c, threshold),
            );
        }
        self
    }

    /// Humidity: >95 → 15, <85 → 20, 85..=95 is the no-penalty zone
    pub fn with_humidity(mut self, humidity_pct: f64) -> Self {
        if humidity_pct > HUMID_THRESHOLD_PCT {
            self.add_points(
                "Humidity",
                HUMID_POINTS,
                format!("{:.1}% is above {}%", humidity_pct, HUMID_THRESHOLD_PCT),
            );
        } else if humidity_pct < DRY_THRESHOLD_PCT {
            self.add_points(
                "Humidity",
                DRY_POINTS,
                format!("{:.1}% is below {}%", humidity_pct, DRY_THRESHOLD_PCT),
            );
        }
        self
    }

    /// Duration band: >48 → 30, >24 → 15, >12 → 8
    pub fn with_duration(mut self, duration_hours: f64) -> Self {
        if let Some((threshold, points)) = band_points(duration_hours, &DURATION_BANDS) {
            self.add_points(
                "Duration",
                points,
                format!("{}h transit exceeds {}h", duration_hours, threshold),
            );
        }
        self
    }

    /// Distance band: >1500 → 15, >800 → 8
    pub fn with_distance(mut self, distance_km: f64) -> Self {
        if let Some((threshold, points)) = band_points(distance_km, &DISTANCE_BANDS) {
            self.add_points(
                "Distance",
                points,
                format!("{}km route exceeds {}km", distance_km, threshold),
            );
        }
        self
    }

    /// Route cargo label: "Dairy" ×1.3, else "Produce" ×1.1 (case-sensitive)
    pub fn with_cargo_category(mut self, cargo_category: &str) -> Self {
        let multiplier = if cargo_category.contains("Dairy") {
            Some(DAIRY_MULTIPLIER)
        } else if cargo_category.contains("Produce") {
            Some(PRODUCE_MULTIPLIER)
        } else {
            None
        };
        self.cargo = multiplier.map(|multiplier| Modifier {
            name: "Cargo sensitivity",
            multiplier,
            reason: format!("{} is perishable", cargo_category),
        });
        self
    }

    /// Manual entry food type: produce ×1.1, dairy ×1.3, meat ×1.5, packaged ×1.0
    pub fn with_food_type(mut self, food_type: FoodType) -> Self {
        let multiplier = match food_type {
            FoodType::Produce => Some(PRODUCE_MULTIPLIER),
            FoodType::Dairy => Some(DAIRY_MULTIPLIER),
            FoodType::Meat => Some(MEAT_MULTIPLIER),
            FoodType::Packaged => None,
        };
        self.cargo = multiplier.map(|multiplier| Modifier {
            name: "Cargo sensitivity",
            multiplier,
            reason: format!("{} is perishable", food_type),
        });
        self
    }

    /// Ships are harder to keep cold: ×1.2
    pub fn with_transport(mut self, transport: TransportType) -> Self {
        self.transport = (transport == TransportType::Ship).then(|| Modifier {
            name: "Transport",
            multiplier: SHIP_MULTIPLIER,
            reason: "Sea freight has less temperature control".to_string(),
        });
        self
    }

    /// Delays compound every other risk: ×1.4
    pub fn with_status(mut self, status: RouteStatus) -> Self {
        self.status = (status == RouteStatus::Delayed).then(|| Modifier {
            name: "Status",
            multiplier: DELAYED_MULTIPLIER,
            reason: "Route is delayed".to_string(),
        });
        self
    }

    /// Additive points accumulated so far
    pub fn base_points(&self) -> u32 {
        self.points
    }

    /// Build final score
    pub fn build(self) -> SpoilageScore {
        let mut factors = self.factors;
        let mut adjusted = f64::from(self.points);

        for modifier in [self.cargo, self.transport, self.status].into_iter().flatten() {
            adjusted *= modifier.multiplier;
            factors.push(ScoreFactor {
                name: modifier.name.to_string(),
                effect: FactorEffect::Multiplier(modifier.multiplier),
                reason: modifier.reason,
            });
        }

        let total = adjusted.min(MAX_SCORE).round().max(0.0) as u8;

        SpoilageScore {
            total,
            base_points: self.points,
            adjusted,
            tier: RiskTier::from_score(total),
            breakdown: factors,
        }
    }
}

impl Default for SpoilageScoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Score a catalog route against its synthesized snapshot. The caller
/// supplies the timestamp; equal inputs give equal assessments.
pub fn score(
    profile: &RouteProfile,
    snapshot: &EnvironmentalSnapshot,
    assessed_at: DateTime<Utc>,
) -> RiskAssessment {
    let result = SpoilageScoreBuilder::new()
        .with_temperature(snapshot.temperature_c)
        .with_humidity(snapshot.humidity_pct)
        .with_duration(snapshot.duration_hours)
        .with_distance(profile.distance_km)
        .with_cargo_category(&profile.cargo_category)
        .with_transport(profile.transport_type)
        .with_status(profile.status)
        .build();

    RiskAssessment {
        route_id: profile.id.clone(),
        score: result.total,
        risk_tier: result.tier,
        explanation: route_explanation(result.tier, profile),
        recommendations: recommendations_for(result.tier),
        snapshot: *snapshot,
        breakdown: result.breakdown,
        assessed_at,
    }
}

/// Score a manually entered reading. No distance band, no transport or
/// status modifier.
pub fn score_manual(reading: &ManualReading, assessed_at: DateTime<Utc>) -> ManualAssessment {
    let result = SpoilageScoreBuilder::new()
        .with_temperature(reading.temperature_c)
        .with_humidity(reading.humidity_pct)
        .with_duration(reading.duration_hours)
        .with_food_type(reading.food_type)
        .build();

    ManualAssessment {
        score: result.total,
        risk_tier: result.tier,
        explanation: manual_explanation(result.tier, reading),
        recommendations: recommendations_for(result.tier),
        reading: *reading,
        breakdown: result.breakdown,
        assessed_at,
    }
}

/// Advisory list for a tier. Fixed per tier; does not depend on which
/// bands fired.
pub fn recommendations_for(tier: RiskTier) -> Vec<String> {
    let list: &[&str] = match tier {
        RiskTier::Low => &LOW_RISK_RECOMMENDATIONS,
        RiskTier::Medium => &MEDIUM_RISK_RECOMMENDATIONS,
        RiskTier::High => &HIGH_RISK_RECOMMENDATIONS,
    };
    list.iter().map(|s| s.to_string()).collect()
}

fn route_explanation(tier: RiskTier, profile: &RouteProfile) -> String {
    let cargo = profile.cargo_category.to_lowercase();
    match tier {
        RiskTier::Low => format!(
            "Route {} shows excellent conditions for preserving {}. Environmental factors are within optimal ranges.",
            profile.id, cargo
        ),
        RiskTier::Medium => format!(
            "Route {} has moderate risk factors that could affect {} quality during the {}km journey.",
            profile.id, cargo, profile.distance_km
        ),
        RiskTier::High => format!(
            "Critical risk detected for route {}. The {}-hour journey poses significant spoilage threat to {}.",
            profile.id, profile.estimated_duration_hours, cargo
        ),
    }
}

fn manual_explanation(tier: RiskTier, reading: &ManualReading) -> String {
    match tier {
        RiskTier::Low => format!(
            "Manual reading shows excellent conditions for preserving {}. Environmental factors are within optimal ranges.",
            reading.food_type
        ),
        RiskTier::Medium => format!(
            "Manual reading has moderate risk factors that could affect {} quality at {:.1}°C and {:.1}% humidity.",
            reading.food_type, reading.temperature_c, reading.humidity_pct
        ),
        RiskTier::High => format!(
            "Critical risk detected for manual reading. The {}-hour journey poses significant spoilage threat to {}.",
            reading.duration_hours, reading.food_type
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn route(
        transport: TransportType,
        status: RouteStatus,
        distance_km: f64,
        duration: f64,
        cargo: &str,
    ) -> RouteProfile {
        RouteProfile {
            id: "RTX".to_string(),
            source: "A".to_string(),
            destination: "B".to_string(),
            transport_type: transport,
            distance_km,
            cargo_category: cargo.to_string(),
            status,
            estimated_duration_hours: duration,
        }
    }

    fn snapshot(
        temperature_c: f64,
        humidity_pct: f64,
        duration_hours: f64,
    ) -> EnvironmentalSnapshot {
        EnvironmentalSnapshot {
            temperature_c,
            humidity_pct,
            duration_hours,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_score_is_repeatable() {
        let profile = route(TransportType::Ship, RouteStatus::Delayed, 1850.0, 32.0, "Dairy");
        let reading = snapshot(12.5, 97.0, 32.0);

        let first = score(&profile, &reading, at());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = score(&profile, &reading, at());
        assert_eq!(first, second);
        assert_eq!(first.assessed_at, at());
    }

    #[test]
    fn test_fresh_produce_truck_is_low() {
        let profile = route(
            TransportType::Truck,
            RouteStatus::InTransit,
            280.0,
            4.5,
            "Fresh Produce",
        );
        let result = score(&profile, &snapshot(6.0, 90.0, 4.5), at());

        assert_eq!(result.score, 11);
        assert_eq!(result.risk_tier, RiskTier::Low);
        assert_eq!(result.recommendations.len(), 3);
        assert!(result.explanation.contains("fresh produce"));
    }

    #[test]
    fn test_delayed_ship_is_high() {
        let profile = route(
            TransportType::Ship,
            RouteStatus::Delayed,
            1850.0,
            32.0,
            "Import Goods",
        );
        let result = score(&profile, &snapshot(12.5, 85.0, 32.0), at());

        assert_eq!(result.score, 92);
        assert_eq!(result.risk_tier, RiskTier::High);
        assert_eq!(result.recommendations.len(), 5);
        assert!(result.explanation.contains("32-hour journey"));
    }

    #[test]
    fn test_humidity_boundaries_carry_no_penalty() {
        for humidity in [85.0, 90.0, 95.0] {
            let built = SpoilageScoreBuilder::new().with_humidity(humidity).build();
            assert_eq!(built.base_points, 0, "humidity {}", humidity);
        }
        assert_eq!(SpoilageScoreBuilder::new().with_humidity(84.9).build().base_points, 20);
        assert_eq!(SpoilageScoreBuilder::new().with_humidity(95.1).build().base_points, 15);
    }

    #[test]
    fn test_only_one_band_per_factor() {
        let built = SpoilageScoreBuilder::new()
            .with_temperature(30.0)
            .with_duration(100.0)
            .with_distance(5000.0)
            .build();
        assert_eq!(built.base_points, 40 + 30 + 15);
        assert_eq!(built.breakdown.len(), 3);
    }

    #[test]
    fn test_dairy_checked_before_produce() {
        let built = SpoilageScoreBuilder::new()
            .with_temperature(5.0)
            .with_cargo_category("Dairy and Produce Mix")
            .build();
        assert!((built.adjusted - 13.0).abs() < 1e-9);
        assert_eq!(built.total, 13);
    }

    #[test]
    fn test_cargo_match_is_case_sensitive() {
        let built = SpoilageScoreBuilder::new()
            .with_temperature(5.0)
            .with_cargo_category("dairy products")
            .build();
        assert_eq!(built.total, 10);
    }

    #[test]
    fn test_multiplier_order_is_fixed() {
        let a = SpoilageScoreBuilder::new()
            .with_status(RouteStatus::Delayed)
            .with_transport(TransportType::Ship)
            .with_cargo_category("Dairy")
            .with_temperature(11.0)
            .build();
        let b = SpoilageScoreBuilder::new()
            .with_temperature(11.0)
            .with_cargo_category("Dairy")
            .with_transport(TransportType::Ship)
            .with_status(RouteStatus::Delayed)
            .build();
        assert_eq!(a.adjusted.to_bits(), b.adjusted.to_bits());
        let names: Vec<_> = a.breakdown.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Temperature", "Cargo sensitivity", "Transport", "Status"]);
    }

    #[test]
    fn test_zero_points_stays_zero() {
        let profile = route(TransportType::Ship, RouteStatus::Delayed, 100.0, 2.0, "Dairy");
        let result = score(&profile, &snapshot(3.0, 90.0, 2.0), at());
        assert_eq!(result.score, 0);
        assert_eq!(result.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_manual_meat_clamps_to_100() {
        let reading = ManualReading {
            temperature_c: 25.0,
            humidity_pct: 98.0,
            duration_hours: 60.0,
            food_type: FoodType::Meat,
        };
        let result = score_manual(&reading, at());
        assert_eq!(result.score, 100);
        assert_eq!(result.risk_tier, RiskTier::High);
    }

    #[test]
    fn test_manual_packaged_has_no_multiplier() {
        let reading = ManualReading {
            temperature_c: 12.0,
            humidity_pct: 90.0,
            duration_hours: 30.0,
            food_type: FoodType::Packaged,
        };
        let result = score_manual(&reading, at());
        assert_eq!(result.score, 40);
        assert_eq!(result.risk_tier, RiskTier::Medium);
        assert_eq!(result.recommendations.len(), 4);
    }
}
