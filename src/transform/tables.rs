use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Weekday;
use indexmap::IndexMap;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::{TOP_PAIRS, WHITE_BALLS};
use crate::error::{AppError, Result};
use crate::types::{
    day_name, DayOfWeekCount, DrawRecord, PairCount, PowerballObservation, TrendPoint,
    WhiteBallObservation, YearMultiplierCount,
};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Row order of the day-of-week table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOrder {
    /// Sorted by day name: Friday, Monday, Saturday, Sunday, Thursday, Tuesday, Wednesday.
    #[default]
    Alphabetical,
    /// Monday first.
    Calendar,
}

impl FromStr for DayOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "alphabetical" | "lexicographic" | "name" => Ok(DayOrder::Alphabetical),
            "calendar" | "weekday" => Ok(DayOrder::Calendar),
            other => Err(AppError::Config(format!(
                "DOW_ORDER must be \"alphabetical\" or \"calendar\", got {other:?}"
            ))),
        }
    }
}

/// Every table derived from one parsed draw set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTables {
    pub white_balls: Vec<WhiteBallObservation>,
    pub powerballs: Vec<PowerballObservation>,
    pub year_multiplier: Vec<YearMultiplierCount>,
    pub day_of_week: Vec<DayOfWeekCount>,
    /// Top co-occurring pairs, count descending.
    pub top_pairs: Vec<PairCount>,
    /// Sum of all pair counts before truncation (10 per draw).
    pub pair_total: u64,
    pub trend: Vec<TrendPoint>,
}

/// Single-threaded build, one pass per table.
pub fn build_tables(draws: &[DrawRecord], order: DayOrder) -> DerivedTables {
    let counts = pair_counts(draws);
    DerivedTables {
        white_balls: white_ball_table(draws),
        powerballs: powerball_table(draws),
        year_multiplier: year_multiplier_counts(draws),
        day_of_week: day_of_week_counts(draws, order),
        top_pairs: top_pairs(&counts, TOP_PAIRS),
        pair_total: counts.values().map(|&c| u64::from(c)).sum(),
        trend: trend_series(draws),
    }
}

/// Same result as [`build_tables`], with each pass on the blocking pool.
pub async fn build_tables_concurrently(
    draws: Arc<[DrawRecord]>,
    order: DayOrder,
) -> Result<DerivedTables> {
    let (white_balls, powerballs, year_multiplier, day_of_week, (top_pairs, pair_total), trend) =
        tokio::try_join!(
            spawn_pass(&draws, white_ball_table),
            spawn_pass(&draws, powerball_table),
            spawn_pass(&draws, year_multiplier_counts),
            spawn_pass(&draws, move |d| day_of_week_counts(d, order)),
            spawn_pass(&draws, |d| {
                let counts = pair_counts(d);
                let total: u64 = counts.values().map(|&c| u64::from(c)).sum();
                (top_pairs(&counts, TOP_PAIRS), total)
            }),
            spawn_pass(&draws, trend_series),
        )?;

    Ok(DerivedTables {
        white_balls,
        powerballs,
        year_multiplier,
        day_of_week,
        top_pairs,
        pair_total,
        trend,
    })
}

fn spawn_pass<T, F>(draws: &Arc<[DrawRecord]>, pass: F) -> JoinHandle<T>
where
    F: FnOnce(&[DrawRecord]) -> T + Send + 'static,
    T: Send + 'static,
{
    let draws = Arc::clone(draws);
    tokio::task::spawn_blocking(move || pass(&draws))
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// Long table: one row per (draw, white-ball slot), slot order preserved.
pub fn white_ball_table(draws: &[DrawRecord]) -> Vec<WhiteBallObservation> {
    let mut rows = Vec::with_capacity(draws.len() * WHITE_BALLS);
    for draw in draws {
        rows.extend(draw.white_balls.iter().map(|&white_ball| WhiteBallObservation {
            draw_date: draw.draw_date,
            white_ball,
        }));
    }
    rows
}

pub fn powerball_table(draws: &[DrawRecord]) -> Vec<PowerballObservation> {
    draws
        .iter()
        .map(|d| PowerballObservation {
            draw_date: d.draw_date,
            powerball: d.powerball,
        })
        .collect()
}

/// Observed (year, multiplier) combinations, ascending. Draws without a
/// multiplier are left out.
pub fn year_multiplier_counts(draws: &[DrawRecord]) -> Vec<YearMultiplierCount> {
    let mut groups: BTreeMap<(i32, i64), u32> = BTreeMap::new();
    for draw in draws {
        if let Some(multiplier) = draw.multiplier {
            *groups.entry((draw.year, multiplier)).or_insert(0) += 1;
        }
    }
    groups
        .into_iter()
        .map(|((year, multiplier), count)| YearMultiplierCount { year, multiplier, count })
        .collect()
}

pub fn day_of_week_counts(draws: &[DrawRecord], order: DayOrder) -> Vec<DayOfWeekCount> {
    let mut counts = [0u32; 7];
    for draw in draws {
        counts[draw.day_of_week.num_days_from_monday() as usize] += 1;
    }

    let mut days: Vec<Weekday> = WEEK
        .into_iter()
        .filter(|d| counts[d.num_days_from_monday() as usize] > 0)
        .collect();
    match order {
        DayOrder::Alphabetical => days.sort_by_key(|d| day_name(*d)),
        DayOrder::Calendar => days.sort_by_key(|d| d.num_days_from_monday()),
    }

    days.into_iter()
        .map(|d| DayOfWeekCount {
            dow: day_name(d).to_string(),
            count: counts[d.num_days_from_monday() as usize],
        })
        .collect()
}

/// Count every unordered white-ball pair per draw. Keys are `(a, b)` with
/// `a <= b`, in first-discovery order.
pub fn pair_counts(draws: &[DrawRecord]) -> IndexMap<(u32, u32), u32> {
    let mut counts: IndexMap<(u32, u32), u32> = IndexMap::new();
    for draw in draws {
        let mut balls = draw.white_balls;
        balls.sort_unstable();
        for i in 0..balls.len() {
            for j in (i + 1)..balls.len() {
                *counts.entry((balls[i], balls[j])).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Highest `n` pairs by count. Stable: equal counts keep discovery order.
pub fn top_pairs(counts: &IndexMap<(u32, u32), u32>, n: usize) -> Vec<PairCount> {
    let mut pairs: Vec<PairCount> = counts
        .iter()
        .map(|(&(a, b), &count)| PairCount { a, b, count })
        .collect();
    pairs.sort_by(|x, y| y.count.cmp(&x.count));
    pairs.truncate(n);
    pairs
}

pub fn trend_series(draws: &[DrawRecord]) -> Vec<TrendPoint> {
    draws
        .iter()
        .map(|d| TrendPoint {
            draw_date: d.draw_date,
            sum: d.sum(),
            spread: d.spread(),
        })
        .collect()
}

/// Pair counts pivoted into a dense matrix: rows are distinct `a`, columns
/// distinct `b`, both ascending; absent cells are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairMatrix {
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
    pub z: Vec<Vec<u32>>,
}

pub fn pivot_pairs(pairs: &[PairCount]) -> PairMatrix {
    let mut rows: Vec<u32> = pairs.iter().map(|p| p.a).collect();
    rows.sort_unstable();
    rows.dedup();
    let mut cols: Vec<u32> = pairs.iter().map(|p| p.b).collect();
    cols.sort_unstable();
    cols.dedup();

    let mut z = vec![vec![0u32; cols.len()]; rows.len()];
    for p in pairs {
        // Both lookups succeed: rows/cols were built from these pairs.
        if let (Ok(r), Ok(c)) = (rows.binary_search(&p.a), cols.binary_search(&p.b)) {
            z[r][c] = p.count;
        }
    }
    PairMatrix { rows, cols, z }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::parser::parse_records;
    use crate::types::RawRecord;

    fn scenario() -> Vec<DrawRecord> {
        parse_records(&[
            RawRecord::new("2024-01-01T00:00:00Z", "01 02 03 04 05 10", Some(2)),
            RawRecord::new("2024-01-08T00:00:00Z", "05 10 15 20 69 26", Some(3)),
        ])
        .unwrap()
    }

    fn many_draws() -> Vec<DrawRecord> {
        let raw: Vec<RawRecord> = (0..40u32)
            .map(|i| {
                let base = i % 45 + 1;
                let numbers = format!(
                    "{} {} {} {} {} {}",
                    base + 8,
                    base,
                    base + 3,
                    base + 20,
                    base + 1,
                    i % 26 + 1
                );
                let date = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                    + chrono::Duration::days(i64::from(i) * 3);
                RawRecord::new(&date.format("%Y-%m-%d").to_string(), &numbers, Some(i64::from(i % 3 + 2)))
            })
            .collect();
        parse_records(&raw).unwrap()
    }

    #[test]
    fn long_table_is_five_rows_per_draw() {
        let draws = many_draws();
        let rows = white_ball_table(&draws);
        assert_eq!(rows.len(), draws.len() * 5);
        assert_eq!(rows[0].white_ball, draws[0].white_balls[0]);
        assert_eq!(rows[4].white_ball, draws[0].white_balls[4]);
        assert_eq!(rows[5].draw_date, draws[1].draw_date);
    }

    #[test]
    fn powerball_table_one_row_per_draw() {
        let draws = scenario();
        let rows = powerball_table(&draws);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].powerball, 10);
        assert_eq!(rows[1].powerball, 26);
    }

    #[test]
    fn pair_counts_sum_to_ten_per_draw() {
        let draws = many_draws();
        let counts = pair_counts(&draws);
        let total: u32 = counts.values().sum();
        assert_eq!(total as usize, draws.len() * 10);
        assert!(counts.keys().all(|(a, b)| a < b));
        assert_eq!(build_tables(&draws, DayOrder::Alphabetical).pair_total, draws.len() as u64 * 10);
    }

    #[test]
    fn scenario_pairs() {
        let draws = scenario();
        let counts = pair_counts(&draws);
        // 10 is the powerball of the first draw, so (5, 10) co-occurs in the second only.
        assert_eq!(counts.get(&(5, 10)), Some(&1));
        assert!(counts.values().all(|&c| c <= 1));

        let top = top_pairs(&counts, TOP_PAIRS);
        assert_eq!(top.len(), 20);
        assert_eq!(top[0], PairCount { a: 1, b: 2, count: 1 });
        assert_eq!(top[10], PairCount { a: 5, b: 10, count: 1 });
    }

    #[test]
    fn pairs_are_keyed_sorted_regardless_of_column_order() {
        let draws = parse_records(&[RawRecord::new("2024-01-01", "50 40 30 20 10 1", None)]).unwrap();
        let counts = pair_counts(&draws);
        assert_eq!(counts.keys().next(), Some(&(10, 20)));
        assert!(counts.contains_key(&(40, 50)));
        assert!(!counts.contains_key(&(50, 40)));
    }

    #[test]
    fn top_pairs_truncates_and_keeps_discovery_order_on_ties() {
        let draws = many_draws();
        let counts = pair_counts(&draws);
        let top = top_pairs(&counts, 30);
        assert_eq!(top.len(), 30.min(counts.len()));
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));

        let mut counts = IndexMap::new();
        counts.insert((3, 4), 1);
        counts.insert((1, 2), 5);
        counts.insert((2, 9), 1);
        counts.insert((7, 8), 5);
        let top = top_pairs(&counts, 3);
        let keys: Vec<(u32, u32)> = top.iter().map(|p| (p.a, p.b)).collect();
        assert_eq!(keys, vec![(1, 2), (7, 8), (3, 4)]);
    }

    #[test]
    fn year_multiplier_groups_observed_combinations() {
        let draws = parse_records(&[
            RawRecord::new("2023-12-30", "01 02 03 04 05 10", Some(2)),
            RawRecord::new("2024-01-01", "01 02 03 04 05 10", Some(3)),
            RawRecord::new("2024-01-03", "01 02 03 04 05 10", Some(2)),
            RawRecord::new("2024-01-06", "01 02 03 04 05 10", Some(2)),
            RawRecord::new("2024-01-08", "01 02 03 04 05 10", None),
        ])
        .unwrap();
        let rows = year_multiplier_counts(&draws);
        assert_eq!(
            rows,
            vec![
                YearMultiplierCount { year: 2023, multiplier: 2, count: 1 },
                YearMultiplierCount { year: 2024, multiplier: 2, count: 2 },
                YearMultiplierCount { year: 2024, multiplier: 3, count: 1 },
            ]
        );
    }

    #[test]
    fn day_of_week_sorts_by_name() {
        // 2024-01-01 is a Monday, 2024-01-07 a Sunday, 2024-01-05 a Friday.
        let draws = parse_records(&[
            RawRecord::new("2024-01-01", "01 02 03 04 05 10", None),
            RawRecord::new("2024-01-07", "01 02 03 04 05 10", None),
            RawRecord::new("2024-01-08", "01 02 03 04 05 10", None),
            RawRecord::new("2024-01-05", "01 02 03 04 05 10", None),
        ])
        .unwrap();

        let rows = day_of_week_counts(&draws, DayOrder::Alphabetical);
        let names: Vec<&str> = rows.iter().map(|r| r.dow.as_str()).collect();
        assert_eq!(names, vec!["Friday", "Monday", "Sunday"]);
        assert_eq!(rows[1].count, 2);

        let rows = day_of_week_counts(&draws, DayOrder::Calendar);
        let names: Vec<&str> = rows.iter().map(|r| r.dow.as_str()).collect();
        assert_eq!(names, vec!["Monday", "Friday", "Sunday"]);
    }

    #[test]
    fn monday_and_sunday_yield_two_rows() {
        let draws = parse_records(&[
            RawRecord::new("2024-01-07", "01 02 03 04 05 10", None),
            RawRecord::new("2024-01-08", "01 02 03 04 05 10", None),
        ])
        .unwrap();
        let rows = day_of_week_counts(&draws, DayOrder::default());
        assert_eq!(
            rows,
            vec![
                DayOfWeekCount { dow: "Monday".to_string(), count: 1 },
                DayOfWeekCount { dow: "Sunday".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn day_order_from_str() {
        assert_eq!("calendar".parse::<DayOrder>().unwrap(), DayOrder::Calendar);
        assert_eq!("Alphabetical".parse::<DayOrder>().unwrap(), DayOrder::Alphabetical);
        assert!("sideways".parse::<DayOrder>().is_err());
    }

    #[test]
    fn trend_sum_and_spread() {
        let draws = scenario();
        let trend = trend_series(&draws);
        assert_eq!(trend.len(), 2);
        assert_eq!((trend[0].sum, trend[0].spread), (15, 4));
        assert_eq!((trend[1].sum, trend[1].spread), (119, 64));

        for (point, draw) in trend_series(&many_draws()).iter().zip(many_draws()) {
            assert_eq!(point.sum, draw.white_balls.iter().map(|&b| u64::from(b)).sum::<u64>());
            assert_eq!(
                point.spread,
                draw.white_balls.iter().max().unwrap() - draw.white_balls.iter().min().unwrap()
            );
        }
    }

    #[tokio::test]
    async fn extreme_values_build_without_overflow() {
        let draws: Arc<[DrawRecord]> = parse_records(&[RawRecord::new(
            "2024-01-08",
            "4294967295 4294967295 1 1 1 1",
            Some(2),
        )])
        .unwrap()
        .into();

        let tables = build_tables_concurrently(draws, DayOrder::Alphabetical).await.unwrap();
        assert_eq!(tables.trend[0].sum, 2 * u64::from(u32::MAX) + 3);
        assert_eq!(tables.trend[0].spread, u32::MAX - 1);
        // Repeated values pair with themselves.
        assert!(tables.top_pairs.iter().any(|p| (p.a, p.b) == (1, 1)));
        assert!(tables.top_pairs.iter().all(|p| p.a <= p.b));
    }

    #[test]
    fn pivot_fills_missing_cells_with_zero() {
        let pairs = vec![
            PairCount { a: 5, b: 10, count: 2 },
            PairCount { a: 1, b: 2, count: 1 },
            PairCount { a: 1, b: 10, count: 1 },
        ];
        let m = pivot_pairs(&pairs);
        assert_eq!(m.rows, vec![1, 5]);
        assert_eq!(m.cols, vec![2, 10]);
        assert_eq!(m.z, vec![vec![1, 1], vec![0, 2]]);
    }

    #[tokio::test]
    async fn concurrent_build_matches_sequential() {
        let draws = many_draws();
        let sequential = build_tables(&draws, DayOrder::Calendar);
        let concurrent = build_tables_concurrently(Arc::from(draws), DayOrder::Calendar)
            .await
            .unwrap();
        assert_eq!(sequential, concurrent);
    }
}
