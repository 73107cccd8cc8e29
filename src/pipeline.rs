//! Pipeline entry point: fetch, parse, build tables, rank overdue balls,
//! render.
//!
//! Progress is reported as discrete [`PipelineEvent`]s through an injected
//! [`PipelineObserver`]; the pipeline itself never configures logging.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{error, info};

use crate::config::WHITE_BALLS;
use crate::error::{AppError, Result};
use crate::fetcher::RecordFetcher;
use crate::render::{dashboard_charts, ChartRenderer, ChartSpec};
use crate::transform::{
    build_tables_concurrently, compute_overdue, parse_records, reference_instant, DayOrder,
};
use crate::types::{DrawRecord, RawRecord};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    FetchStarted { dataset: String },
    FetchCompleted { dataset: String, rows: usize },
    ParseCompleted { rows: usize, white_rows: usize },
    TablesBuilt { pair_total: u64, top_pairs: usize, dow_rows: usize, year_multiplier_rows: usize },
    OverdueComputed { balls: usize, reference: DateTime<Utc> },
    RenderCompleted { engine: &'static str, figures: usize },
    PipelineFailed { error: String },
}

impl PipelineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::FetchStarted { .. } => "fetch_started",
            PipelineEvent::FetchCompleted { .. } => "fetch_completed",
            PipelineEvent::ParseCompleted { .. } => "parse_completed",
            PipelineEvent::TablesBuilt { .. } => "tables_built",
            PipelineEvent::OverdueComputed { .. } => "overdue_computed",
            PipelineEvent::RenderCompleted { .. } => "render_completed",
            PipelineEvent::PipelineFailed { .. } => "pipeline_failed",
        }
    }
}

pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Forwards pipeline events to `tracing` as structured records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        let name = event.name();
        match event {
            PipelineEvent::FetchStarted { dataset } => {
                info!(event = name, dataset = %dataset, "fetch begin");
            }
            PipelineEvent::FetchCompleted { dataset, rows } => {
                info!(event = name, dataset = %dataset, rows, "fetch ok: {rows} records");
            }
            PipelineEvent::ParseCompleted { rows, white_rows } => {
                info!(event = name, rows, white_rows, "parse numbers done");
            }
            PipelineEvent::TablesBuilt { pair_total, top_pairs, dow_rows, year_multiplier_rows } => {
                info!(
                    event = name,
                    pair_total,
                    top_pairs,
                    dow_rows,
                    year_multiplier_rows,
                    "derived tables built",
                );
            }
            PipelineEvent::OverdueComputed { balls, reference } => {
                info!(event = name, balls, reference = %reference, "overdue as of {}", reference.format("%Y-%m-%d"));
            }
            PipelineEvent::RenderCompleted { engine, figures } => {
                info!(event = name, engine, figures, "rendered {figures} figures with {engine}");
            }
            PipelineEvent::PipelineFailed { error } => {
                error!(event = name, error = %error, "pipeline aborted");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub day_order: DayOrder,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard<F> {
    pub engine: &'static str,
    pub dataset: String,
    /// Latest draw date; overdue days are measured from here.
    pub as_of: DateTime<Utc>,
    pub draws: usize,
    #[serde(skip)]
    pub charts: Vec<ChartSpec>,
    pub figures: IndexMap<String, F>,
}

impl<F> Dashboard<F> {
    pub fn chart(&self, name: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.name == name)
    }

    pub fn figure(&self, name: &str) -> Option<&F> {
        self.figures.get(name)
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Fetch `dataset` and run the whole pipeline. Any failure aborts the run and
/// nothing partial is returned.
pub async fn build_dashboard<R: ChartRenderer + ?Sized>(
    fetcher: &dyn RecordFetcher,
    renderer: &R,
    dataset: &str,
    options: PipelineOptions,
    observer: &dyn PipelineObserver,
) -> Result<Dashboard<R::Figure>> {
    let result = async {
        observer.on_event(&PipelineEvent::FetchStarted { dataset: dataset.to_string() });
        let raw = fetcher.fetch(dataset).await?;
        observer.on_event(&PipelineEvent::FetchCompleted {
            dataset: dataset.to_string(),
            rows: raw.len(),
        });
        transform_and_render(dataset, &raw, renderer, options, observer).await
    }
    .await;

    if let Err(e) = &result {
        observer.on_event(&PipelineEvent::PipelineFailed { error: e.to_string() });
    }
    result
}

/// Run the pipeline on records that were already fetched.
pub async fn build_dashboard_from_records<R: ChartRenderer + ?Sized>(
    dataset: &str,
    raw: &[RawRecord],
    renderer: &R,
    options: PipelineOptions,
    observer: &dyn PipelineObserver,
) -> Result<Dashboard<R::Figure>> {
    let result = transform_and_render(dataset, raw, renderer, options, observer).await;
    if let Err(e) = &result {
        observer.on_event(&PipelineEvent::PipelineFailed { error: e.to_string() });
    }
    result
}

async fn transform_and_render<R: ChartRenderer + ?Sized>(
    dataset: &str,
    raw: &[RawRecord],
    renderer: &R,
    options: PipelineOptions,
    observer: &dyn PipelineObserver,
) -> Result<Dashboard<R::Figure>> {
    let draws: Arc<[DrawRecord]> = parse_records(raw)?.into();
    observer.on_event(&PipelineEvent::ParseCompleted {
        rows: draws.len(),
        white_rows: draws.len() * WHITE_BALLS,
    });
    let today = reference_instant(&draws).ok_or(AppError::EmptyDataset)?;

    let tables = build_tables_concurrently(Arc::clone(&draws), options.day_order).await?;
    observer.on_event(&PipelineEvent::TablesBuilt {
        pair_total: tables.pair_total,
        top_pairs: tables.top_pairs.len(),
        dow_rows: tables.day_of_week.len(),
        year_multiplier_rows: tables.year_multiplier.len(),
    });

    let overdue = compute_overdue(&tables.white_balls, today);
    observer.on_event(&PipelineEvent::OverdueComputed {
        balls: overdue.len(),
        reference: today,
    });

    let charts = dashboard_charts(&tables, &overdue, today)?;
    let mut figures = IndexMap::with_capacity(charts.len());
    for chart in &charts {
        figures.insert(chart.name.to_string(), renderer.render(chart)?);
    }
    observer.on_event(&PipelineEvent::RenderCompleted {
        engine: renderer.engine(),
        figures: figures.len(),
    });

    Ok(Dashboard {
        engine: renderer.engine(),
        dataset: dataset.to_string(),
        as_of: today,
        draws: draws.len(),
        charts,
        figures,
    })
}
