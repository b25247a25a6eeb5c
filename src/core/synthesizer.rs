//! Environmental Synthesizer
//!
//! Derives a plausible temperature/humidity reading from a route's static
//! profile plus bounded jitter. The random source is always passed in so a
//! fixed sequence reproduces the same snapshot.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::types::{EnvironmentalSnapshot, RouteProfile, RouteStatus, TransportType};
use crate::utils::constants::{
    BASE_HUMIDITY_PCT, BASE_TEMPERATURE_C, DELAY_HUMIDITY_OFFSET, DELAY_TEMPERATURE_OFFSET,
    HUMIDITY_JITTER_SPAN, LONG_HAUL_DISTANCE_KM, LONG_HAUL_TEMPERATURE_OFFSET, MAX_HUMIDITY_PCT,
    MIN_HUMIDITY_PCT, RAIL_TEMPERATURE_OFFSET, SHIP_HUMIDITY_OFFSET, SHIP_TEMPERATURE_OFFSET,
    TEMPERATURE_JITTER_SPAN, TRUCK_HUMIDITY_OFFSET,
};

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource {
    fn uniform(&mut self) -> f64;
}

/// Adapter over any `rand` generator
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn uniform(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
/// An empty list behaves like a constant 0.5 (no jitter).
#[derive(Debug, Clone, Default)]
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Every draw lands on the jitter midpoint
    pub fn neutral() -> Self {
        Self::new(vec![0.5])
    }
}

impl RandomSource for FixedSequence {
    fn uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Build a snapshot for `profile`. Draws temperature jitter first,
/// humidity jitter second.
pub fn synthesize(profile: &RouteProfile, rng: &mut dyn RandomSource) -> EnvironmentalSnapshot {
    let mut temperature = BASE_TEMPERATURE_C;
    match profile.transport_type {
        TransportType::Ship => temperature += SHIP_TEMPERATURE_OFFSET,
        TransportType::Rail => temperature += RAIL_TEMPERATURE_OFFSET,
        TransportType::Truck => {}
    }
    if profile.distance_km > LONG_HAUL_DISTANCE_KM {
        temperature += LONG_HAUL_TEMPERATURE_OFFSET;
    }
    if profile.status == RouteStatus::Delayed {
        temperature += DELAY_TEMPERATURE_OFFSET;
    }

    let mut humidity = BASE_HUMIDITY_PCT;
    match profile.transport_type {
        TransportType::Truck => humidity += TRUCK_HUMIDITY_OFFSET,
        TransportType::Ship => humidity += SHIP_HUMIDITY_OFFSET,
        TransportType::Rail => {}
    }
    if profile.status == RouteStatus::Delayed {
        humidity += DELAY_HUMIDITY_OFFSET;
    }

    let temperature = temperature + jitter(rng, TEMPERATURE_JITTER_SPAN);
    let humidity = humidity + jitter(rng, HUMIDITY_JITTER_SPAN);

    EnvironmentalSnapshot {
        temperature_c: round_to_tenth(temperature),
        humidity_pct: humidity.clamp(MIN_HUMIDITY_PCT, MAX_HUMIDITY_PCT),
        duration_hours: profile.estimated_duration_hours,
    }
}

#[inline]
fn jitter(rng: &mut dyn RandomSource, span: f64) -> f64 {
    (rng.uniform() - 0.5) * span
}

#[inline]
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
