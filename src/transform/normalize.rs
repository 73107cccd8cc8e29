//! Draw-date normalisation.
//!
//! Every draw date is converted to a `DateTime<Utc>` exactly once, at
//! ingestion. Naive timestamps are read as UTC wall-clock time; timestamps
//! carrying an offset are re-expressed in UTC at the same instant. Feeding the
//! RFC 3339 rendering of a normalised value back in returns the same instant.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::TimeNormalizationError;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const AWARE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A parsed draw date before it is pinned to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawInstant {
    /// No offset in the source: wall clock is taken as UTC.
    Naive(NaiveDateTime),
    /// Offset present in the source.
    Aware(DateTime<FixedOffset>),
}

impl DrawInstant {
    pub fn parse(input: &str) -> Result<Self, TimeNormalizationError> {
        let s = input.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(DrawInstant::Aware(dt));
        }
        for fmt in AWARE_DATETIME_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Ok(DrawInstant::Aware(dt));
            }
        }
        for fmt in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(DrawInstant::Naive(dt));
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return Ok(DrawInstant::Naive(d.and_time(NaiveTime::MIN)));
            }
        }

        Err(TimeNormalizationError {
            input: input.to_string(),
        })
    }

    pub fn to_utc(self) -> DateTime<Utc> {
        match self {
            DrawInstant::Naive(naive) => naive.and_utc(),
            DrawInstant::Aware(aware) => aware.with_timezone(&Utc),
        }
    }
}

pub fn normalize_draw_date(input: &str) -> Result<DateTime<Utc>, TimeNormalizationError> {
    DrawInstant::parse(input).map(DrawInstant::to_utc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn socrata_floating_timestamp_is_read_as_utc() {
        let dt = normalize_draw_date("2024-01-01T00:00:00.000").unwrap();
        assert_eq!(dt, utc("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn naive_without_fraction() {
        assert_eq!(
            normalize_draw_date("2024-01-01T22:59:00").unwrap(),
            utc("2024-01-01T22:59:00Z")
        );
        assert_eq!(
            normalize_draw_date("2024-01-01 22:59:00").unwrap(),
            utc("2024-01-01T22:59:00Z")
        );
    }

    #[test]
    fn offset_is_converted_preserving_instant() {
        let dt = normalize_draw_date("2024-01-01T05:30:00+05:30").unwrap();
        assert_eq!(dt, utc("2024-01-01T00:00:00Z"));

        let dt = normalize_draw_date("2023-12-31T19:00:00-05:00").unwrap();
        assert_eq!(dt, utc("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn bare_dates_are_midnight_utc() {
        assert_eq!(normalize_draw_date("2024-01-08").unwrap(), utc("2024-01-08T00:00:00Z"));
        assert_eq!(normalize_draw_date("01/08/2024").unwrap(), utc("2024-01-08T00:00:00Z"));
    }

    #[test]
    fn normalisation_is_idempotent() {
        for input in [
            "2024-01-01T00:00:00.000",
            "2024-01-01T05:30:00+05:30",
            "2024-01-01T00:00:00Z",
            "2024-03-10 02:30:00",
            "07/04/2021",
        ] {
            let once = normalize_draw_date(input).unwrap();
            let twice = normalize_draw_date(&once.to_rfc3339()).unwrap();
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn guard_branches() {
        let naive = DrawInstant::parse("2024-01-01T12:00:00").unwrap();
        assert!(matches!(naive, DrawInstant::Naive(_)));
        assert_eq!(naive.to_utc(), utc("2024-01-01T12:00:00Z"));

        let aware = DrawInstant::parse("2024-01-01T12:00:00+02:00").unwrap();
        assert!(matches!(aware, DrawInstant::Aware(_)));
        assert_eq!(aware.to_utc(), utc("2024-01-01T10:00:00Z"));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = normalize_draw_date("yesterday").unwrap_err();
        assert_eq!(err.input, "yesterday");
        assert!(normalize_draw_date("").is_err());
    }
}
