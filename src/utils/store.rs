//! Assessment Store
//!
//! Thread-safe holder for the latest assessment per route plus the
//! in-flight marker that rejects overlapping triggers.
//! Uses DashMap for concurrent access without a global lock.
//!
//! Features:
//! - Generation tags: a result is only stored if it belongs to the
//!   in-flight computation that is still current
//! - RAII in-flight guard that releases the marker on cancellation
//! - Read HIT/MISS counters

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::RiskAssessment;

#[derive(Clone)]
pub struct AssessmentStore {
    /// route id -> latest completed assessment
    assessments: Arc<DashMap<String, RiskAssessment>>,
    /// route id -> generation of the computation in progress
    in_flight: Arc<DashMap<String, u64>>,
    next_generation: Arc<AtomicU64>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for AssessmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentStore {
    pub fn new() -> Self {
        Self {
            assessments: Arc::new(DashMap::new()),
            in_flight: Arc::new(DashMap::new()),
            next_generation: Arc::new(AtomicU64::new(1)),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Mark `route_id` in progress and return the generation assigned to
    /// this computation. Fails while an earlier one is still running.
    pub fn begin_assessment(&self, route_id: &str) -> AppResult<u64> {
        match self.in_flight.entry(route_id.to_string()) {
            Entry::Occupied(_) => {
                warn!("⏳ ASSESSMENT REJECTED: {} already in progress", route_id);
                Err(AppError::already_in_progress(route_id))
            }
            Entry::Vacant(slot) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                slot.insert(generation);
                debug!("🚦 ASSESSMENT BEGIN: {} (gen {})", route_id, generation);
                Ok(generation)
            }
        }
    }

    /// Same as `begin_assessment`, wrapped in a guard that clears the
    /// in-flight marker if dropped before completion
    pub fn begin_guarded(&self, route_id: &str) -> AppResult<InFlightAssessment> {
        let generation = self.begin_assessment(route_id)?;
        Ok(InFlightAssessment {
            store: self.clone(),
            route_id: route_id.to_string(),
            generation,
            finished: false,
        })
    }

    /// Store `assessment` and clear the in-flight marker, overwriting any
    /// earlier value. Returns false (and stores nothing) when `generation`
    /// is not the computation currently in flight.
    pub fn complete(&self, route_id: &str, generation: u64, assessment: RiskAssessment) -> bool {
        match self.in_flight.entry(route_id.to_string()) {
            Entry::Occupied(entry) if *entry.get() == generation => {
                info!(
                    "💾 ASSESSMENT SET: {} -> {} ({}%)",
                    route_id, assessment.risk_tier, assessment.score
                );
                self.assessments.insert(route_id.to_string(), assessment);
                entry.remove();
                true
            }
            _ => {
                warn!("🗑️ STALE RESULT DISCARDED: {} (gen {})", route_id, generation);
                false
            }
        }
    }

    /// Clear the in-flight marker without storing a result
    pub fn abandon(&self, route_id: &str, generation: u64) -> bool {
        let removed = self
            .in_flight
            .remove_if(route_id, |_, current| *current == generation)
            .is_some();
        if removed {
            debug!("🚫 ASSESSMENT ABANDONED: {} (gen {})", route_id, generation);
        }
        removed
    }

    pub fn get(&self, route_id: &str) -> AppResult<RiskAssessment> {
        match self.assessments.get(route_id) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 ASSESSMENT MISS: {}", route_id);
                Err(AppError::assessment_not_found(route_id))
            }
        }
    }

    pub fn is_in_progress(&self, route_id: &str) -> bool {
        self.in_flight.contains_key(route_id)
    }

    /// Drop every assessment and in-flight marker
    pub fn reset(&self) {
        self.assessments.clear();
        self.in_flight.clear();
        info!("🗑️ ASSESSMENT STORE RESET");
    }

    pub fn stats(&self) -> StoreStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        StoreStats {
            entries: self.assessments.len(),
            in_flight: self.in_flight.len(),
            hits,
            misses,
            hit_rate,
        }
    }
}

/// Store statistics for monitoring
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub entries: usize,
    pub in_flight: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Handle on a running computation for one route
pub struct InFlightAssessment {
    store: AssessmentStore,
    route_id: String,
    generation: u64,
    finished: bool,
}

impl InFlightAssessment {
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record the result. Errors if the store moved on (e.g. reset) while
    /// this computation was running.
    pub fn complete(mut self, assessment: RiskAssessment) -> AppResult<()> {
        self.finished = true;
        if self.store.complete(&self.route_id, self.generation, assessment) {
            Ok(())
        } else {
            Err(AppError::superseded(&self.route_id, self.generation))
        }
    }
}

impl Drop for InFlightAssessment {
    fn drop(&mut self) {
        if !self.finished {
            self.store.abandon(&self.route_id, self.generation);
        }
    }
}
