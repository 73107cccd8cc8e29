use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::error::Result;
use crate::fetcher::RecordFetcher;
use crate::pipeline::{build_dashboard, PipelineObserver, PipelineOptions};
use crate::render::ChartRenderer;
use crate::state::{Snapshot, SnapshotStore};

/// Renderer shared by the HTTP layer and the refresher.
pub type SharedRenderer = Arc<dyn ChartRenderer<Figure = Value>>;

/// Owns the collaborators of one running dashboard server and keeps the
/// snapshot store, health counters and latency histogram up to date.
pub struct DashboardService {
    fetcher: Arc<dyn RecordFetcher>,
    renderer: SharedRenderer,
    observer: Arc<dyn PipelineObserver>,
    options: PipelineOptions,
    store: Arc<SnapshotStore>,
    health: Arc<HealthState>,
    latency: Arc<LatencyStats>,
    /// One gate per dataset id so concurrent first requests share one build.
    building: DashMap<String, Arc<Mutex<()>>>,
}

impl DashboardService {
    pub fn new(
        fetcher: Arc<dyn RecordFetcher>,
        renderer: SharedRenderer,
        observer: Arc<dyn PipelineObserver>,
        options: PipelineOptions,
        default_dataset: &str,
    ) -> Arc<Self> {
        Arc::new(Self {
            fetcher,
            renderer,
            observer,
            options,
            store: SnapshotStore::new(default_dataset),
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::new()),
            building: DashMap::new(),
        })
    }

    /// Run the pipeline for `dataset` and publish the result. On failure the
    /// previous snapshot, if any, stays in place.
    pub async fn rebuild(&self, dataset: &str) -> Result<Snapshot> {
        let started = Instant::now();
        let result = build_dashboard(
            self.fetcher.as_ref(),
            self.renderer.as_ref(),
            dataset,
            self.options,
            self.observer.as_ref(),
        )
        .await;
        let elapsed = started.elapsed();

        match result {
            Ok(dashboard) => {
                self.latency.record(elapsed);
                self.health.record_success(dashboard.draws, Utc::now());
                let snapshot = self.store.insert(dashboard);
                info!(
                    dataset,
                    draws = snapshot.draws,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "dashboard published",
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.health.record_failure();
                warn!(dataset, "dashboard rebuild failed: {e}");
                Err(e)
            }
        }
    }

    /// Cached snapshot for `dataset`, building it on first request. Callers
    /// racing on the same id wait for the first build instead of starting
    /// their own.
    pub async fn get_or_build(&self, dataset: &str) -> Result<Snapshot> {
        if let Some(snapshot) = self.store.get(dataset) {
            return Ok(snapshot);
        }

        let gate = Arc::clone(self.building.entry(dataset.to_string()).or_default().value());
        let _building = gate.lock().await;
        if let Some(snapshot) = self.store.get(dataset) {
            return Ok(snapshot);
        }
        self.rebuild(dataset).await
    }

    pub fn default_dataset(&self) -> &str {
        self.store.default_dataset()
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn health(&self) -> &Arc<HealthState> {
        &self.health
    }

    pub fn latency(&self) -> &Arc<LatencyStats> {
        &self.latency
    }

    pub fn engine(&self) -> &'static str {
        self.renderer.engine()
    }
}
