use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::latency::LatencySummary;
use crate::error::AppError;
use crate::service::DashboardService;
use crate::state::Snapshot;

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<DashboardService>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/dashboard", get(get_dashboard))
        .route("/figures/:name", get(get_figure))
        .route("/tables/:name", get(get_table))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct DatasetQuery {
    pub dataset: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine: &'static str,
    pub default_dataset: String,
    pub datasets: Vec<String>,
    pub builds_ok: u64,
    pub builds_failed: u64,
    pub last_build_at: Option<String>,
    pub last_draws: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let svc = &state.service;
    let health = svc.health();
    let status = if svc.store().latest().is_some() { "ok" } else { "starting" };
    Json(HealthResponse {
        status,
        engine: svc.engine(),
        default_dataset: svc.default_dataset().to_string(),
        datasets: svc.store().datasets(),
        builds_ok: health.builds_ok(),
        builds_failed: health.builds_failed(),
        last_build_at: health.last_build_at().map(|t| t.to_rfc3339()),
        last_draws: health.last_draws(),
    })
}

async fn get_dashboard(
    State(state): State<ApiState>,
    Query(params): Query<DatasetQuery>,
) -> Result<Json<Value>, AppError> {
    let snapshot = snapshot_for(&state, params.dataset).await?;
    Ok(Json(serde_json::to_value(&*snapshot)?))
}

async fn get_figure(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(params): Query<DatasetQuery>,
) -> Result<Json<Value>, AppError> {
    let snapshot = snapshot_for(&state, params.dataset).await?;
    snapshot
        .figure(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("figure {name:?}")))
}

async fn get_table(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(params): Query<DatasetQuery>,
) -> Result<Json<Value>, AppError> {
    let snapshot = snapshot_for(&state, params.dataset).await?;
    let chart = snapshot
        .chart(&name)
        .ok_or_else(|| AppError::NotFound(format!("table {name:?}")))?;
    Ok(Json(serde_json::to_value(chart)?))
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencySummary> {
    Json(state.service.latency().summary())
}

/// Resolve the requested dataset (default when absent) to a snapshot,
/// building it on first use.
async fn snapshot_for(state: &ApiState, dataset: Option<String>) -> Result<Snapshot, AppError> {
    let svc = &state.service;
    let dataset = match dataset.as_deref().map(str::trim) {
        None | Some("") => svc.default_dataset().to_string(),
        Some(id) => {
            check_dataset_id(id)?;
            id.to_string()
        }
    };
    svc.get_or_build(&dataset).await
}

/// Ids are spliced into the upstream URL path, so only ASCII alphanumerics
/// and '-' pass.
fn check_dataset_id(id: &str) -> Result<(), AppError> {
    if id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Ok(())
    } else {
        Err(AppError::InvalidDataset(id.to_string()))
    }
}
