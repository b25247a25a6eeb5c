//! Spoilage Engine
//!
//! Orchestrates one assessment: catalog lookup → in-flight marker →
//! simulated external latency → synthesize → score → store.
//!
//! The only suspension point is the latency sleep. Dropping the future (or
//! cancelling a spawned handle) there releases the in-flight marker and
//! stores nothing.

use chrono::Utc;
use futures_util::future::join_all;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::catalog::RouteCatalog;
use super::manual::ManualInput;
use super::risk_score::{score, score_manual};
use super::synthesizer::{synthesize, RandomSource, RngSource};
use crate::models::config::EngineConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{ManualAssessment, RiskAssessment, RouteProfile};
use crate::utils::store::AssessmentStore;
use crate::utils::telemetry::{AssessmentSource, TelemetryCollector, TelemetryEvent};

type SharedRandom = Mutex<Box<dyn RandomSource + Send>>;

pub struct SpoilageEngine {
    catalog: RouteCatalog,
    store: AssessmentStore,
    rng: SharedRandom,
    latency: Duration,
    telemetry: Arc<TelemetryCollector>,
}

impl SpoilageEngine {
    pub fn new(
        config: &EngineConfig,
        catalog: RouteCatalog,
        telemetry: Arc<TelemetryCollector>,
    ) -> Self {
        let source: Box<dyn RandomSource + Send> = match config.rng_seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::from_entropy()),
        };

        Self {
            catalog,
            store: AssessmentStore::new(),
            rng: Mutex::new(source),
            latency: config.latency,
            telemetry,
        }
    }

    /// Build everything the config describes: catalog file (or demo
    /// catalog) and a telemetry collector exporting to the configured dir
    pub fn from_config(config: &EngineConfig) -> AppResult<Self> {
        let catalog = match &config.routes_file {
            Some(path) => RouteCatalog::from_json_file(path)?,
            None => RouteCatalog::demo(),
        };
        let telemetry = Arc::new(TelemetryCollector::with_config(
            config.telemetry_dir.clone(),
            1000,
        ));
        Ok(Self::new(config, catalog, telemetry))
    }

    /// Replace the jitter source (tests inject fixed sequences)
    pub fn with_random_source(self, source: impl RandomSource + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(source)),
            ..self
        }
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &AssessmentStore {
        &self.store
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Synthesize and score without touching the store, stamped with the
    /// current time
    pub fn evaluate(&self, profile: &RouteProfile) -> RiskAssessment {
        let snapshot = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            synthesize(profile, &mut **rng)
        };
        score(profile, &snapshot, Utc::now())
    }

    /// Full assessment of a catalog route
    pub async fn assess_route(&self, route_id: &str) -> AppResult<RiskAssessment> {
        let start = Instant::now();

        let profile = self
            .catalog
            .get(route_id)
            .ok_or_else(|| AppError::unknown_route(route_id))?;

        let in_flight = self.store.begin_guarded(route_id).map_err(|e| {
            self.telemetry.record_rejected();
            e
        })?;

        info!(
            "🔍 Assessing route {} ({} → {})",
            profile.id, profile.source, profile.destination
        );

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let assessment = self.evaluate(profile);
        in_flight.complete(assessment.clone())?;

        let latency_ms = start.elapsed().as_millis() as u64;
        self.telemetry.record_assessment(TelemetryEvent::new(
            AssessmentSource::Route,
            assessment.risk_tier,
            assessment.score,
            latency_ms,
        ));
        info!("{} ({}ms)", assessment.summary(), latency_ms);

        Ok(assessment)
    }

    /// Latest stored assessment for a route
    pub fn get_assessment(&self, route_id: &str) -> AppResult<RiskAssessment> {
        self.store.get(route_id)
    }

    pub fn is_in_progress(&self, route_id: &str) -> bool {
        self.store.is_in_progress(route_id)
    }

    /// Assess several routes concurrently; results keep the input order
    pub async fn assess_many(
        &self,
        route_ids: &[String],
    ) -> Vec<(String, AppResult<RiskAssessment>)> {
        let results = join_all(route_ids.iter().map(|id| self.assess_route(id))).await;
        route_ids.iter().cloned().zip(results).collect()
    }

    /// Score a manually entered reading, bypassing the synthesizer
    pub fn assess_manual(&self, input: &ManualInput) -> AppResult<ManualAssessment> {
        let start = Instant::now();
        let reading = input.validate().map_err(|e| {
            warn!("✋ Manual input rejected: {}", e);
            e
        })?;

        let assessment = score_manual(&reading, Utc::now());
        self.telemetry.record_assessment(TelemetryEvent::new(
            AssessmentSource::Manual,
            assessment.risk_tier,
            assessment.score,
            start.elapsed().as_millis() as u64,
        ));
        info!(
            "{} manual {} reading | Risk: {} ({}%)",
            assessment.risk_tier.emoji(),
            reading.food_type,
            assessment.risk_tier,
            assessment.score
        );

        Ok(assessment)
    }

    /// Run `assess_route` as a background task the caller can cancel
    pub fn spawn_assessment(self: &Arc<Self>, route_id: &str) -> AssessmentHandle {
        let engine = Arc::clone(self);
        let id = route_id.to_string();
        let task = tokio::spawn(async move { engine.assess_route(&id).await });

        AssessmentHandle {
            route_id: route_id.to_string(),
            task,
            telemetry: Arc::clone(&self.telemetry),
        }
    }
}

/// Awaitable, cancellable assessment task
pub struct AssessmentHandle {
    route_id: String,
    task: JoinHandle<AppResult<RiskAssessment>>,
    telemetry: Arc<TelemetryCollector>,
}

impl AssessmentHandle {
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Abandon the assessment. If the task already passed its last await
    /// point it still completes and stores its result.
    pub fn cancel(&self) {
        if self.task.is_finished() {
            return;
        }
        self.task.abort();
        info!("🚫 Cancellation requested for {}", self.route_id);
    }

    /// Wait for the task. Only a run that was actually stopped counts as
    /// cancelled.
    pub async fn join(self) -> AppResult<RiskAssessment> {
        let AssessmentHandle {
            route_id,
            task,
            telemetry,
        } = self;
        match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                telemetry.record_cancelled();
                info!("🚫 Assessment for {} cancelled", route_id);
                Err(AppError::cancelled(&route_id))
            }
            Err(e) => Err(AppError::internal(format!(
                "Assessment task for {} failed: {}",
                route_id, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synthesizer::FixedSequence;
    use crate::models::errors::ErrorCode;
    use crate::models::types::RiskTier;

    fn engine() -> SpoilageEngine {
        SpoilageEngine::new(
            &EngineConfig::instant(1),
            RouteCatalog::demo(),
            Arc::new(TelemetryCollector::new()),
        )
        .with_random_source(FixedSequence::neutral())
    }

    #[tokio::test]
    async fn test_assess_demo_route() {
        let engine = engine();
        let assessment = engine.assess_route("RT001").await.unwrap();

        assert_eq!(assessment.score, 11);
        assert_eq!(assessment.risk_tier, RiskTier::Low);
        assert_eq!(engine.get_assessment("RT001").unwrap(), assessment);
        assert!(!engine.is_in_progress("RT001"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let engine = engine();
        let err = engine.assess_route("RT999").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RouteUnknown);
        assert!(!engine.is_in_progress("RT999"));
    }

    #[tokio::test]
    async fn test_assess_many_keeps_order() {
        let engine = engine();
        let ids: Vec<String> = vec!["RT002".into(), "RT404".into(), "RT001".into()];
        let results = engine.assess_many(&ids).await;

        assert_eq!(results[0].0, "RT002");
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_ok());
    }

    fn slow_engine() -> Arc<SpoilageEngine> {
        let config = EngineConfig {
            latency: Duration::from_millis(500),
            ..EngineConfig::instant(1)
        };
        Arc::new(SpoilageEngine::new(
            &config,
            RouteCatalog::demo(),
            Arc::new(TelemetryCollector::new()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_counted_only_when_run_stops() {
        let engine = slow_engine();
        let handle = engine.spawn_assessment("RT002");
        while !engine.is_in_progress("RT002") {
            tokio::task::yield_now().await;
        }

        handle.cancel();
        assert_eq!(engine.telemetry().get_stats().cancelled, 0);

        let err = handle.join().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AssessmentCancelled);
        assert_eq!(engine.telemetry().get_stats().cancelled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_completion_keeps_result() {
        let engine = slow_engine();
        let handle = engine.spawn_assessment("RT005");
        while !handle.is_finished() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        handle.cancel();
        let assessment = handle.join().await.unwrap();
        assert_eq!(engine.get_assessment("RT005").unwrap(), assessment);
        assert_eq!(engine.telemetry().get_stats().cancelled, 0);
    }

    #[test]
    fn test_manual_records_telemetry() {
        let engine = engine();
        let result = engine
            .assess_manual(&ManualInput::new(25.0, 98.0, 60.0, "meat"))
            .unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(engine.telemetry().get_stats().manual_assessments, 1);
    }
}
