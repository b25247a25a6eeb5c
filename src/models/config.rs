//! Configuration module for Spoilage Sentry
//!
//! Uses constants from utils/constants.rs for every default.
//! All values come from environment variables; unset means default,
//! unparsable means CFG_INVALID_VALUE.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_HOST, DEFAULT_LATENCY_MS, DEFAULT_PORT, DEFAULT_TELEMETRY_DIR,
};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Simulated external round trip between begin and scoring
    pub latency: Duration,
    /// Fixed seed for the jitter source; entropy when unset
    pub rng_seed: Option<u64>,
    /// JSON route catalog; built-in demo catalog when unset
    pub routes_file: Option<PathBuf>,
    /// Where telemetry exports land
    pub telemetry_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(DEFAULT_LATENCY_MS),
            rng_seed: None,
            routes_file: None,
            telemetry_dir: PathBuf::from(DEFAULT_TELEMETRY_DIR),
        }
    }
}

impl EngineConfig {
    /// Load from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let latency = parse_var::<u64, _>(&lookup, "SPOILAGE_LATENCY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.latency);

        let rng_seed = parse_var::<u64, _>(&lookup, "SPOILAGE_RNG_SEED")?;
        if rng_seed.is_some() {
            info!("🎲 Deterministic jitter enabled (SPOILAGE_RNG_SEED set)");
        }

        let routes_file = lookup("SPOILAGE_ROUTES_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let telemetry_dir = lookup("SPOILAGE_TELEMETRY_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.telemetry_dir);

        Ok(Self {
            latency,
            rng_seed,
            routes_file,
            telemetry_dir,
        })
    }

    /// Zero latency, fixed seed
    pub fn instant(seed: u64) -> Self {
        Self {
            latency: Duration::ZERO,
            rng_seed: Some(seed),
            ..Self::default()
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// PORT (platform-provided) wins over SPOILAGE_PORT
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SPOILAGE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match parse_var::<u16, _>(&lookup, "PORT")? {
            Some(port) => port,
            None => parse_var::<u16, _>(&lookup, "SPOILAGE_PORT")?.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self { host, port })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::invalid_config(key, &raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.latency, Duration::from_millis(1200));
        assert_eq!(config.rng_seed, None);
        assert!(config.routes_file.is_none());
    }

    #[test]
    fn test_engine_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("SPOILAGE_LATENCY_MS", "50"),
            ("SPOILAGE_RNG_SEED", "42"),
            ("SPOILAGE_ROUTES_FILE", "routes.json"),
        ]))
        .unwrap();
        assert_eq!(config.latency, Duration::from_millis(50));
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.routes_file, Some(PathBuf::from("routes.json")));
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = EngineConfig::from_lookup(lookup_from(&[("SPOILAGE_LATENCY_MS", "soon")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_port_precedence() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("SPOILAGE_PORT", "9001"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);

        let config = ServerConfig::from_lookup(lookup_from(&[("SPOILAGE_PORT", "9001")])).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9001");
    }
}
