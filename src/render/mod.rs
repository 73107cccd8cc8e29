//! Chart rendering seam.
//!
//! The pipeline hands every derived table to a [`ChartRenderer`] as a
//! [`ChartSpec`]: canonical name, chart kind, title and the table itself.
//! Renderers are picked by the caller up front; the pipeline never looks for
//! one at runtime.

pub mod charts;
pub mod plotly;
pub mod table;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;

pub use charts::dashboard_charts;
pub use plotly::PlotlyJsonRenderer;
pub use table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    Histogram { x: String, nbins: u32 },
    Bar { x: String, y: String },
    StackedBar { x: String, y: String, color: String },
    /// Matrix of `value` indexed by `row` and `col`.
    Heatmap { row: String, col: String, value: String },
    /// Two series sharing the `x` column.
    DualLine { x: String, first: String, second: String },
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Histogram { .. } => "histogram",
            ChartKind::Bar { .. } => "bar",
            ChartKind::StackedBar { .. } => "stacked_bar",
            ChartKind::Heatmap { .. } => "heatmap",
            ChartKind::DualLine { .. } => "dual_line",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub name: &'static str,
    pub title: String,
    pub kind: ChartKind,
    pub table: Table,
}

pub trait ChartRenderer: Send + Sync {
    type Figure: Serialize + Clone + Send + Sync + 'static;

    /// Short engine tag reported with the rendered dashboard.
    fn engine(&self) -> &'static str;

    fn render(&self, chart: &ChartSpec) -> Result<Self::Figure>;
}

/// Passes the table through untouched, tagged with the chart kind label and
/// its column encoding, for consumers that draw their own charts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableJsonRenderer;

impl ChartRenderer for TableJsonRenderer {
    type Figure = Value;

    fn engine(&self) -> &'static str {
        "table"
    }

    fn render(&self, chart: &ChartSpec) -> Result<Value> {
        Ok(json!({
            "kind": chart.kind.label(),
            "encoding": chart.kind,
            "title": chart.title,
            "columns": chart.table.columns,
            "rows": chart.table.rows,
        }))
    }
}
