use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::types::{DrawRecord, OverdueEntry, WhiteBallObservation};

/// The instant overdue days are measured from: the latest draw date.
pub fn reference_instant(draws: &[DrawRecord]) -> Option<DateTime<Utc>> {
    draws.iter().map(|d| d.draw_date).max()
}

/// Days since each white ball was last drawn, most overdue first.
///
/// Only balls present in `observations` get an entry. Ties on `days` keep
/// ascending ball order.
pub fn compute_overdue(
    observations: &[WhiteBallObservation],
    today: DateTime<Utc>,
) -> Vec<OverdueEntry> {
    let mut last_seen: BTreeMap<u32, DateTime<Utc>> = BTreeMap::new();
    for obs in observations {
        last_seen
            .entry(obs.white_ball)
            .and_modify(|seen| *seen = (*seen).max(obs.draw_date))
            .or_insert(obs.draw_date);
    }

    let mut entries: Vec<OverdueEntry> = last_seen
        .into_iter()
        .map(|(white_ball, seen)| OverdueEntry {
            white_ball,
            days: (today - seen).num_days(),
        })
        .collect();
    entries.sort_by(|a, b| b.days.cmp(&a.days));
    entries
}
