use std::cmp::Ordering;

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::error::Result;
use crate::render::{ChartKind, ChartRenderer, ChartSpec};
use crate::transform::tables::pivot_pairs;
use crate::types::PairCount;

/// Emits Plotly figure JSON (`data` traces plus `layout`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotlyJsonRenderer;

impl ChartRenderer for PlotlyJsonRenderer {
    type Figure = Value;

    fn engine(&self) -> &'static str {
        "plotly"
    }

    fn render(&self, chart: &ChartSpec) -> Result<Value> {
        let table = &chart.table;
        let title = json!({ "text": chart.title });

        let figure = match &chart.kind {
            ChartKind::Histogram { x, nbins } => json!({
                "data": [{
                    "type": "histogram",
                    "x": table.column(x)?,
                    "nbinsx": nbins,
                    "name": x,
                }],
                "layout": {
                    "title": title,
                    "xaxis": { "title": { "text": x } },
                    "yaxis": { "title": { "text": "count" } },
                },
            }),
            ChartKind::Bar { x, y } => json!({
                "data": [{
                    "type": "bar",
                    "x": table.column(x)?,
                    "y": table.column(y)?,
                }],
                "layout": {
                    "title": title,
                    "xaxis": { "title": { "text": x } },
                    "yaxis": { "title": { "text": y } },
                },
            }),
            ChartKind::StackedBar { x, y, color } => {
                let xi = table.column_index(x)?;
                let yi = table.column_index(y)?;
                let ci = table.column_index(color)?;

                // One trace per colour value; numeric values ascend numerically.
                let mut groups: IndexMap<String, (Value, Vec<Value>, Vec<Value>)> = IndexMap::new();
                for row in &table.rows {
                    let (_, xs, ys) = groups
                        .entry(row[ci].to_string())
                        .or_insert_with(|| (row[ci].clone(), Vec::new(), Vec::new()));
                    xs.push(row[xi].clone());
                    ys.push(row[yi].clone());
                }
                groups.sort_by(|_, (va, ..), _, (vb, ..)| colour_order(va, vb));
                let traces: Vec<Value> = groups
                    .into_iter()
                    .map(|(key, (_, xs, ys))| {
                        json!({
                            "type": "bar",
                            "name": format!("{color}={key}"),
                            "x": xs,
                            "y": ys,
                        })
                    })
                    .collect();

                json!({
                    "data": traces,
                    "layout": {
                        "title": title,
                        "barmode": "stack",
                        "xaxis": { "title": { "text": x } },
                        "yaxis": { "title": { "text": y } },
                        "legend": { "title": { "text": color } },
                    },
                })
            }
            ChartKind::Heatmap { row, col, value } => {
                let pairs: Vec<PairCount> = table
                    .column_u32(row)?
                    .into_iter()
                    .zip(table.column_u32(col)?)
                    .zip(table.column_u32(value)?)
                    .map(|((a, b), count)| PairCount { a, b, count })
                    .collect();
                let matrix = pivot_pairs(&pairs);
                json!({
                    "data": [{
                        "type": "heatmap",
                        "z": matrix.z,
                        "x": matrix.cols,
                        "y": matrix.rows,
                        "colorbar": { "title": { "text": value } },
                    }],
                    "layout": {
                        "title": title,
                        "xaxis": { "title": { "text": col } },
                        "yaxis": { "title": { "text": row } },
                    },
                })
            }
            ChartKind::DualLine { x, first, second } => {
                let xs = table.column(x)?;
                json!({
                    "data": [
                        {
                            "type": "scatter",
                            "mode": "lines",
                            "name": "sum(whites)",
                            "x": xs,
                            "y": table.column(first)?,
                        },
                        {
                            "type": "scatter",
                            "mode": "lines",
                            "name": "spread(max-min)",
                            "x": xs,
                            "y": table.column(second)?,
                        },
                    ],
                    "layout": { "title": title },
                })
            }
        };
        Ok(figure)
    }
}

/// Numbers before everything else and by value; the rest keep their
/// first-seen order.
fn colour_order(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
