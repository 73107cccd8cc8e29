use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::WHITE_BALLS;

// ---------------------------------------------------------------------------
// Raw record (wire shape)
// ---------------------------------------------------------------------------

/// One historical draw exactly as the data API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub draw_date: String,
    pub winning_numbers: String,
    /// Socrata serves numbers as strings; early draws have no multiplier at all.
    #[serde(default, deserialize_with = "lenient_int")]
    pub multiplier: Option<i64>,
}

impl RawRecord {
    pub fn new(draw_date: &str, winning_numbers: &str, multiplier: Option<i64>) -> Self {
        Self {
            draw_date: draw_date.to_string(),
            winning_numbers: winning_numbers.to_string(),
            multiplier,
        }
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("multiplier {n} is not an integer"))),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("multiplier {s:?} is not an integer"))),
        Some(other) => Err(D::Error::custom(format!("unexpected multiplier value {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Parsed draw
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawRecord {
    pub draw_date: DateTime<Utc>,
    /// Column order from the source string, never re-sorted.
    pub white_balls: [u32; WHITE_BALLS],
    pub powerball: u32,
    pub multiplier: Option<i64>,
    pub year: i32,
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
}

impl DrawRecord {
    /// Widened so five `u32` values never overflow.
    pub fn sum(&self) -> u64 {
        self.white_balls.iter().map(|&b| u64::from(b)).sum()
    }

    pub fn spread(&self) -> u32 {
        let max = self.white_balls.iter().max().copied().unwrap_or(0);
        let min = self.white_balls.iter().min().copied().unwrap_or(0);
        max - min
    }
}

/// Full English day name ("Monday"), the label used by the day-of-week table.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn serialize_weekday<S: serde::Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(day_name(*day))
}

// ---------------------------------------------------------------------------
// Derived rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WhiteBallObservation {
    pub draw_date: DateTime<Utc>,
    pub white_ball: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PowerballObservation {
    pub draw_date: DateTime<Utc>,
    pub powerball: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMultiplierCount {
    pub year: i32,
    pub multiplier: i64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayOfWeekCount {
    pub dow: String,
    pub count: u32,
}

/// Co-occurrence of two white balls within one draw. Always `a <= b`; a
/// repeated value in one draw yields `(x, x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairCount {
    pub a: u32,
    pub b: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverdueEntry {
    pub white_ball: u32,
    pub days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub draw_date: DateTime<Utc>,
    pub sum: u64,
    pub spread: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_accepts_string_number_and_absent() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"draw_date":"2024-01-01T00:00:00.000","winning_numbers":"01 02 03 04 05 10","multiplier":"2"}"#,
        )
        .unwrap();
        assert_eq!(raw.multiplier, Some(2));

        let raw: RawRecord = serde_json::from_str(
            r#"{"draw_date":"2024-01-01T00:00:00.000","winning_numbers":"01 02 03 04 05 10","multiplier":3}"#,
        )
        .unwrap();
        assert_eq!(raw.multiplier, Some(3));

        let raw: RawRecord = serde_json::from_str(
            r#"{"draw_date":"2010-02-03T00:00:00.000","winning_numbers":"17 22 36 37 52 24"}"#,
        )
        .unwrap();
        assert_eq!(raw.multiplier, None);
    }

    #[test]
    fn multiplier_rejects_garbage() {
        let res: std::result::Result<RawRecord, _> = serde_json::from_str(
            r#"{"draw_date":"2024-01-01","winning_numbers":"01 02 03 04 05 10","multiplier":"x2"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn sum_and_spread() {
        let draw = DrawRecord {
            draw_date: "2024-01-08T00:00:00Z".parse().unwrap(),
            white_balls: [5, 10, 15, 20, 69],
            powerball: 26,
            multiplier: Some(3),
            year: 2024,
            day_of_week: Weekday::Mon,
        };
        assert_eq!(draw.sum(), 119);
        assert_eq!(draw.spread(), 64);
    }

    #[test]
    fn sum_does_not_overflow_on_max_values() {
        let draw = DrawRecord {
            draw_date: "2024-01-08T00:00:00Z".parse().unwrap(),
            white_balls: [u32::MAX, u32::MAX, 1, 1, 1],
            powerball: 1,
            multiplier: None,
            year: 2024,
            day_of_week: Weekday::Mon,
        };
        assert_eq!(draw.sum(), 2 * u64::from(u32::MAX) + 3);
        assert_eq!(draw.spread(), u32::MAX - 1);
    }

    #[test]
    fn weekday_serializes_as_name() {
        let draw = DrawRecord {
            draw_date: "2024-01-07T00:00:00Z".parse().unwrap(),
            white_balls: [1, 2, 3, 4, 5],
            powerball: 1,
            multiplier: None,
            year: 2024,
            day_of_week: Weekday::Sun,
        };
        let v = serde_json::to_value(&draw).unwrap();
        assert_eq!(v["day_of_week"], "Sunday");
        assert_eq!(v["draw_date"], "2024-01-07T00:00:00Z");
    }
}
