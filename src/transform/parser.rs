use chrono::Datelike;

use crate::config::{WHITE_BALLS, WINNING_NUMBER_TOKENS};
use crate::error::{AppError, ParseError, Result};
use crate::transform::normalize::normalize_draw_date;
use crate::types::{DrawRecord, RawRecord};

/// The six numbers of one draw, white balls in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinningNumbers {
    pub white_balls: [u32; WHITE_BALLS],
    pub powerball: u32,
}

/// Split a `winning_numbers` field ("01 02 03 04 05 10") into white balls and
/// powerball. Ball ranges (1-69, 1-26) are not checked; only integers that do
/// not fit a `u32` are refused.
pub fn parse_winning_numbers(input: &str) -> std::result::Result<WinningNumbers, ParseError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.len() != WINNING_NUMBER_TOKENS {
        return Err(ParseError::TokenCount {
            input: input.to_string(),
            found: tokens.len(),
        });
    }

    let mut values = [0u32; WINNING_NUMBER_TOKENS];
    for (position, token) in tokens.iter().enumerate() {
        values[position] = parse_number(position, token)?;
    }

    let mut white_balls = [0u32; WHITE_BALLS];
    white_balls.copy_from_slice(&values[..WHITE_BALLS]);
    Ok(WinningNumbers {
        white_balls,
        powerball: values[WHITE_BALLS],
    })
}

/// An optionally signed run of digits is an integer; one that does not fit a
/// ball value is `OutOfRange`, anything else `NotInteger`.
fn parse_number(position: usize, token: &str) -> std::result::Result<u32, ParseError> {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::NotInteger {
            position,
            token: token.to_string(),
        });
    }
    token.parse::<u32>().map_err(|_| ParseError::OutOfRange {
        position,
        token: token.to_string(),
    })
}

/// Build a `DrawRecord` from the raw record at `index`. Errors name the index
/// and the failing field.
pub fn parse_draw(index: usize, raw: &RawRecord) -> Result<DrawRecord> {
    let draw_date = normalize_draw_date(&raw.draw_date)
        .map_err(|source| AppError::TimeNormalization { index, source })?;
    let numbers = parse_winning_numbers(&raw.winning_numbers)
        .map_err(|source| AppError::Parse { index, source })?;

    Ok(DrawRecord {
        draw_date,
        white_balls: numbers.white_balls,
        powerball: numbers.powerball,
        multiplier: raw.multiplier,
        year: draw_date.year(),
        day_of_week: draw_date.weekday(),
    })
}

/// Parse every record; the first failure aborts the whole set.
pub fn parse_records(raw: &[RawRecord]) -> Result<Vec<DrawRecord>> {
    raw.iter()
        .enumerate()
        .map(|(index, record)| parse_draw(index, record))
        .collect()
}
