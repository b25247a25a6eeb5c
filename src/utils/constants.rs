//! Constants Module - Single Source of Truth
//!
//! Every threshold, weight and default used by the synthesizer, the scorer
//! and the configuration layer lives here.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "SpoilageSentry";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// ENGINE DEFAULTS
// ============================================

/// Simulated round trip to the external inference service (milliseconds)
pub const DEFAULT_LATENCY_MS: u64 = 1200;

/// Default telemetry export directory
pub const DEFAULT_TELEMETRY_DIR: &str = "./telemetry";

/// Default API port
pub const DEFAULT_PORT: u16 = 8080;

/// Default API host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Maximum routes accepted by one batch request
pub const MAX_BATCH_ROUTES: usize = 50;

// ============================================
// SYNTHESIS (°C / %)
// ============================================

/// Cold-chain optimum
pub const BASE_TEMPERATURE_C: f64 = 6.0;
pub const SHIP_TEMPERATURE_OFFSET: f64 = 2.0;
pub const RAIL_TEMPERATURE_OFFSET: f64 = 1.0;
pub const LONG_HAUL_TEMPERATURE_OFFSET: f64 = 1.5;
pub const LONG_HAUL_DISTANCE_KM: f64 = 1000.0;
pub const DELAY_TEMPERATURE_OFFSET: f64 = 3.0;
/// Full width of the temperature jitter window (±2.0)
pub const TEMPERATURE_JITTER_SPAN: f64 = 4.0;

pub const BASE_HUMIDITY_PCT: f64 = 90.0;
pub const TRUCK_HUMIDITY_OFFSET: f64 = -5.0;
pub const SHIP_HUMIDITY_OFFSET: f64 = 3.0;
pub const DELAY_HUMIDITY_OFFSET: f64 = -8.0;
/// Full width of the humidity jitter window (±5.0)
pub const HUMIDITY_JITTER_SPAN: f64 = 10.0;
pub const MIN_HUMIDITY_PCT: f64 = 70.0;
pub const MAX_HUMIDITY_PCT: f64 = 100.0;

// ============================================
// SCORING BANDS
// ============================================

/// (exclusive lower bound, points), highest band first
pub const TEMPERATURE_BANDS: [(f64, u8); 3] = [(20.0, 40), (10.0, 25), (4.0, 10)];

/// Humidity above this adds HUMID_POINTS
pub const HUMID_THRESHOLD_PCT: f64 = 95.0;
pub const HUMID_POINTS: u8 = 15;
/// Humidity below this adds DRY_POINTS
pub const DRY_THRESHOLD_PCT: f64 = 85.0;
pub const DRY_POINTS: u8 = 20;

pub const DURATION_BANDS: [(f64, u8); 3] = [(48.0, 30), (24.0, 15), (12.0, 8)];

pub const DISTANCE_BANDS: [(f64, u8); 2] = [(1500.0, 15), (800.0, 8)];

// ============================================
// MODIFIERS
// ============================================

pub const DAIRY_MULTIPLIER: f64 = 1.3;
pub const PRODUCE_MULTIPLIER: f64 = 1.1;
pub const MEAT_MULTIPLIER: f64 = 1.5;
pub const SHIP_MULTIPLIER: f64 = 1.2;
pub const DELAYED_MULTIPLIER: f64 = 1.4;

/// Cap applied before rounding
pub const MAX_SCORE: f64 = 100.0;

// ============================================
// MANUAL ENTRY DOMAIN
// ============================================

pub const MANUAL_MIN_TEMPERATURE_C: f64 = -50.0;
pub const MANUAL_MAX_TEMPERATURE_C: f64 = 60.0;
pub const MANUAL_MIN_HUMIDITY_PCT: f64 = 0.0;
pub const MANUAL_MAX_HUMIDITY_PCT: f64 = 100.0;

// ============================================
// TIER RECOMMENDATIONS
// ============================================

pub const LOW_RISK_RECOMMENDATIONS: [&str; 3] = [
    "Maintain current temperature controls",
    "Continue standard monitoring procedures",
    "Route is suitable for sensitive cargo",
];

pub const MEDIUM_RISK_RECOMMENDATIONS: [&str; 4] = [
    "Increase monitoring frequency",
    "Consider adjusting temperature to 2-4°C",
    "Alert receiving facility of conditions",
    "Prepare for quality inspection upon arrival",
];

pub const HIGH_RISK_RECOMMENDATIONS: [&str; 5] = [
    "Immediate intervention required",
    "Consider route optimization",
    "Implement emergency cooling measures",
    "Notify all stakeholders",
    "Prepare for potential cargo loss",
];

/// Look up the first band whose exclusive lower bound is exceeded
#[inline]
pub fn band_points(value: f64, bands: &[(f64, u8)]) -> Option<(f64, u8)> {
    bands.iter().copied().find(|(threshold, _)| value > *threshold)
}
