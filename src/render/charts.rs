use chrono::{DateTime, Utc};

use crate::config::{POWERBALL_BINS, WHITE_BALL_BINS};
use crate::error::Result;
use crate::render::{ChartKind, ChartSpec, Table};
use crate::transform::DerivedTables;
use crate::types::OverdueEntry;

pub const WHITE_HIST: &str = "white_hist";
pub const PB_HIST: &str = "pb_hist";
pub const OVERDUE: &str = "overdue";
pub const PP_YEAR: &str = "pp_year";
pub const DOW: &str = "dow";
pub const PAIRS_HEATMAP: &str = "pairs_heatmap";
pub const SUM_SPREAD: &str = "sum_spread";

/// Canonical chart names, in dashboard order.
pub const CHART_NAMES: [&str; 7] = [WHITE_HIST, PB_HIST, OVERDUE, PP_YEAR, DOW, PAIRS_HEATMAP, SUM_SPREAD];

fn s(v: &str) -> String {
    v.to_string()
}

/// One chart per canonical name, built from a single pipeline run.
pub fn dashboard_charts(
    tables: &DerivedTables,
    overdue: &[OverdueEntry],
    today: DateTime<Utc>,
) -> Result<Vec<ChartSpec>> {
    Ok(vec![
        ChartSpec {
            name: WHITE_HIST,
            title: s("White-ball Frequency (1–69)"),
            kind: ChartKind::Histogram { x: s("white_ball"), nbins: WHITE_BALL_BINS },
            table: Table::from_records(&["draw_date", "white_ball"], &tables.white_balls)?,
        },
        ChartSpec {
            name: PB_HIST,
            title: s("Powerball Frequency (1–26)"),
            kind: ChartKind::Histogram { x: s("powerball"), nbins: POWERBALL_BINS },
            table: Table::from_records(&["draw_date", "powerball"], &tables.powerballs)?,
        },
        ChartSpec {
            name: OVERDUE,
            title: format!("Overdue (days) as of {}", today.format("%Y-%m-%d")),
            kind: ChartKind::Bar { x: s("white_ball"), y: s("days") },
            table: Table::from_records(&["white_ball", "days"], overdue)?,
        },
        ChartSpec {
            name: PP_YEAR,
            title: s("Power Play usage by year"),
            kind: ChartKind::StackedBar { x: s("year"), y: s("count"), color: s("multiplier") },
            table: Table::from_records(&["year", "multiplier", "count"], &tables.year_multiplier)?,
        },
        ChartSpec {
            name: DOW,
            title: s("Draws by Day of Week"),
            kind: ChartKind::Bar { x: s("dow"), y: s("count") },
            table: Table::from_records(&["dow", "count"], &tables.day_of_week)?,
        },
        ChartSpec {
            name: PAIRS_HEATMAP,
            title: s("Top Pair Combinations (counts)"),
            kind: ChartKind::Heatmap { row: s("a"), col: s("b"), value: s("count") },
            table: Table::from_records(&["a", "b", "count"], &tables.top_pairs)?,
        },
        ChartSpec {
            name: SUM_SPREAD,
            title: s("Sum & Spread over Time"),
            kind: ChartKind::DualLine { x: s("draw_date"), first: s("sum"), second: s("spread") },
            table: Table::from_records(&["draw_date", "sum", "spread"], &tables.trend)?,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{build_tables, compute_overdue, parse_records, reference_instant, DayOrder};
    use crate::types::RawRecord;

    #[test]
    fn one_chart_per_canonical_name() {
        let draws = parse_records(&[
            RawRecord::new("2024-01-01T00:00:00Z", "01 02 03 04 05 10", Some(2)),
            RawRecord::new("2024-01-08T00:00:00Z", "05 10 15 20 69 26", Some(3)),
        ])
        .unwrap();
        let tables = build_tables(&draws, DayOrder::Alphabetical);
        let today = reference_instant(&draws).unwrap();
        let overdue = compute_overdue(&tables.white_balls, today);

        let charts = dashboard_charts(&tables, &overdue, today).unwrap();
        let names: Vec<&str> = charts.iter().map(|c| c.name).collect();
        assert_eq!(names, CHART_NAMES.to_vec());

        assert_eq!(charts[0].table.len(), 10);
        assert_eq!(charts[2].title, "Overdue (days) as of 2024-01-08");
        assert_eq!(charts[2].table.column_u32("white_ball").unwrap()[0], 1);
        assert_eq!(charts[6].table.columns, vec!["draw_date", "sum", "spread"]);
    }
}
