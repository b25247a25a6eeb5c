//! Manual entry validation
//!
//! Operators may type readings instead of picking a catalog route. Values
//! arrive either as JSON numbers or as form strings and are checked here
//! before they reach the scorer.

use serde::{Deserialize, Serialize};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FoodType, ManualReading};
use crate::utils::constants::{
    MANUAL_MAX_HUMIDITY_PCT, MANUAL_MAX_TEMPERATURE_C, MANUAL_MIN_HUMIDITY_PCT,
    MANUAL_MIN_TEMPERATURE_C,
};

/// A number as typed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Number(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

/// Unvalidated manual reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualInput {
    pub temperature: InputValue,
    pub humidity: InputValue,
    pub duration: InputValue,
    pub food_type: String,
}

impl ManualInput {
    pub fn new(
        temperature: impl Into<InputValue>,
        humidity: impl Into<InputValue>,
        duration: impl Into<InputValue>,
        food_type: impl Into<String>,
    ) -> Self {
        Self {
            temperature: temperature.into(),
            humidity: humidity.into(),
            duration: duration.into(),
            food_type: food_type.into(),
        }
    }

    /// Check every field; the first violation is reported
    pub fn validate(&self) -> AppResult<ManualReading> {
        let temperature_c = numeric("temperature", &self.temperature)?;
        let humidity_pct = numeric("humidity", &self.humidity)?;
        let duration_hours = numeric("duration", &self.duration)?;

        if !(MANUAL_MIN_TEMPERATURE_C..=MANUAL_MAX_TEMPERATURE_C).contains(&temperature_c) {
            return Err(AppError::invalid_manual_input(format!(
                "temperature {}°C outside {}..={}°C",
                temperature_c, MANUAL_MIN_TEMPERATURE_C, MANUAL_MAX_TEMPERATURE_C
            )));
        }
        if !(MANUAL_MIN_HUMIDITY_PCT..=MANUAL_MAX_HUMIDITY_PCT).contains(&humidity_pct) {
            return Err(AppError::invalid_manual_input(format!(
                "humidity {}% outside {}..={}%",
                humidity_pct, MANUAL_MIN_HUMIDITY_PCT, MANUAL_MAX_HUMIDITY_PCT
            )));
        }
        if duration_hours < 0.0 {
            return Err(AppError::invalid_manual_input(format!(
                "duration {}h must not be negative",
                duration_hours
            )));
        }

        let food_type = FoodType::parse(&self.food_type).ok_or_else(|| {
            AppError::invalid_manual_input(format!(
                "unknown food type {:?} (expected produce, dairy, meat or packaged)",
                self.food_type
            ))
        })?;

        Ok(ManualReading {
            temperature_c,
            humidity_pct,
            duration_hours,
            food_type,
        })
    }
}

fn numeric(field: &str, value: &InputValue) -> AppResult<f64> {
    let parsed = match value {
        InputValue::Number(n) => *n,
        InputValue::Text(raw) => raw.trim().parse::<f64>().map_err(|_| {
            AppError::invalid_manual_input(format!("{} is not a number: {:?}", field, raw))
        })?,
    };
    if !parsed.is_finite() {
        return Err(AppError::invalid_manual_input(format!(
            "{} must be finite",
            field
        )));
    }
    Ok(parsed)
}
