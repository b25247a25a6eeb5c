//! Telemetry Module for Spoilage Sentry
//!
//! Collects anonymous assessment statistics for:
//! - Operations dashboards (tier distribution, latency)
//! - Spotting routes that are triggered repeatedly while still running
//!
//! No route payloads are stored, only counters and small event records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::types::RiskTier;
use crate::utils::constants::{APP_NAME, DEFAULT_TELEMETRY_DIR};

/// Where an assessment came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssessmentSource {
    Route,
    Manual,
}

/// Single high-risk event (anonymized)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub timestamp: u64,
    pub source: AssessmentSource,
    pub tier: RiskTier,
    pub score: u8,
    pub latency_ms: u64,
}

impl TelemetryEvent {
    pub fn new(source: AssessmentSource, tier: RiskTier, score: u8, latency_ms: u64) -> Self {
        Self {
            timestamp: current_timestamp(),
            source,
            tier,
            score,
            latency_ms,
        }
    }
}

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    pub total_assessed: u64,
    pub route_assessments: u64,
    pub manual_assessments: u64,
    pub assessments_by_tier: HashMap<String, u64>,
    pub high_risk_detected: u64,
    pub rejected_in_progress: u64,
    pub cancelled: u64,
    pub avg_latency_ms: f64,
    pub period_start: u64,
    pub period_end: u64,
}

impl TelemetryStats {
    /// Plain-text report for shutdown logs and the CLI
    pub fn summary(&self) -> String {
        let tier = |name: &str| self.assessments_by_tier.get(name).copied().unwrap_or(0);
        format!(
            r#"
╔══════════════════════════════════════════════════════════════════╗
║           🧊 {} - ASSESSMENT REPORT
╠══════════════════════════════════════════════════════════════════╣
║   🔍 Assessments:          {:>10}  (manual: {})
║   🟢 Low:                  {:>10}
║   🟡 Medium:               {:>10}
║   🔴 High:                 {:>10}
║   ⏳ Rejected (in flight): {:>10}
║   🚫 Cancelled:            {:>10}
║   ⚡ Avg latency:          {:>10.2}ms
╚══════════════════════════════════════════════════════════════════╝
"#,
            APP_NAME,
            self.total_assessed,
            self.manual_assessments,
            tier("Low"),
            tier("Medium"),
            tier("High"),
            self.rejected_in_progress,
            self.cancelled,
            self.avg_latency_ms,
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.2}\n",
            self.period_start,
            self.period_end,
            self.total_assessed,
            self.high_risk_detected,
            self.rejected_in_progress,
            self.cancelled,
            self.avg_latency_ms,
        )
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    /// High-risk events buffered in memory
    events: RwLock<Vec<TelemetryEvent>>,
    total_assessed: AtomicU64,
    route_assessments: AtomicU64,
    manual_assessments: AtomicU64,
    high_risk_detected: AtomicU64,
    rejected_in_progress: AtomicU64,
    cancelled: AtomicU64,
    total_latency_ms: AtomicU64,
    tier_counts: RwLock<HashMap<RiskTier, u64>>,
    session_start: u64,
    export_dir: PathBuf,
    max_buffer_size: usize,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::with_config(PathBuf::from(DEFAULT_TELEMETRY_DIR), 1000)
    }

    /// The export directory is created lazily on first export
    pub fn with_config(export_dir: PathBuf, max_buffer_size: usize) -> Self {
        Self {
            events: RwLock::new(Vec::with_capacity(max_buffer_size.min(1024))),
            total_assessed: AtomicU64::new(0),
            route_assessments: AtomicU64::new(0),
            manual_assessments: AtomicU64::new(0),
            high_risk_detected: AtomicU64::new(0),
            rejected_in_progress: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            tier_counts: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
            export_dir,
            max_buffer_size,
        }
    }

    /// Record a finished assessment
    pub fn record_assessment(&self, event: TelemetryEvent) {
        self.total_assessed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(event.latency_ms, Ordering::Relaxed);

        match event.source {
            AssessmentSource::Route => self.route_assessments.fetch_add(1, Ordering::Relaxed),
            AssessmentSource::Manual => self.manual_assessments.fetch_add(1, Ordering::Relaxed),
        };

        if let Ok(mut counts) = self.tier_counts.write() {
            *counts.entry(event.tier).or_insert(0) += 1;
        }

        if event.tier != RiskTier::High {
            return;
        }
        self.high_risk_detected.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut events) = self.events.write() {
            events.push(event);

            if events.len() >= self.max_buffer_size {
                let events_to_flush = std::mem::take(&mut *events);
                drop(events); // Release lock before I/O
                let _ = self.flush_events(&events_to_flush);
            }
        }
    }

    /// Duplicate trigger rejected by the store
    pub fn record_rejected(&self) {
        self.rejected_in_progress.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total_assessed = self.total_assessed.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency = if total_assessed > 0 {
            total_latency as f64 / total_assessed as f64
        } else {
            0.0
        };

        let assessments_by_tier = self
            .tier_counts
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), *v))
                    .collect()
            })
            .unwrap_or_default();

        TelemetryStats {
            total_assessed,
            route_assessments: self.route_assessments.load(Ordering::Relaxed),
            manual_assessments: self.manual_assessments.load(Ordering::Relaxed),
            assessments_by_tier,
            high_risk_detected: self.high_risk_detected.load(Ordering::Relaxed),
            rejected_in_progress: self.rejected_in_progress.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            avg_latency_ms: avg_latency,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Buffered high-risk events not yet flushed
    pub fn pending_events(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.export_dir)?;
        let stats = self.get_stats();
        let filename = format!("stats_{}.json", current_timestamp());
        let path = self.export_dir.join(filename);

        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;

        Ok(path)
    }

    /// Append one row to the CSV history
    pub fn export_stats_csv(&self) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.export_dir)?;
        let stats = self.get_stats();
        let path = self.export_dir.join("telemetry_history.csv");

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        if file.metadata()?.len() == 0 {
            writeln!(
                file,
                "period_start,period_end,total_assessed,high_risk_detected,rejected_in_progress,cancelled,avg_latency_ms"
            )?;
        }

        write!(file, "{}", stats.to_csv_row())?;

        Ok(path)
    }

    /// Write buffered high-risk events to disk now; returns how many were
    /// written
    pub fn flush(&self) -> Result<usize, std::io::Error> {
        let events = match self.events.write() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => return Ok(0),
        };
        self.flush_events(&events)?;
        Ok(events.len())
    }

    fn flush_events(&self, events: &[TelemetryEvent]) -> Result<(), std::io::Error> {
        if events.is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.export_dir)?;

        let filename = format!("events_{}.jsonl", current_timestamp());
        let path = self.export_dir.join(filename);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        for event in events {
            if let Ok(json) = serde_json::to_string(event) {
                writeln!(file, "{}", json)?;
            }
        }

        Ok(())
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
