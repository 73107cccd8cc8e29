use crate::error::{AppError, Result};
use crate::transform::tables::DayOrder;

pub const SOCRATA_API_URL: &str = "https://data.ny.gov/resource";

/// NY Open Data "Lottery Powerball Winning Numbers: Beginning 2010".
pub const DEFAULT_DATASET: &str = "d6yy-54nr";

/// Upper bound on rows requested from the API (`$limit`).
pub const ROW_LIMIT: usize = 50_000;

/// White balls per draw.
pub const WHITE_BALLS: usize = 5;

/// Tokens in a `winning_numbers` string: five white balls then the powerball.
pub const WINNING_NUMBER_TOKENS: usize = WHITE_BALLS + 1;

/// Pair rows kept after ranking co-occurrence counts.
pub const TOP_PAIRS: usize = 30;

/// Histogram bin counts, one per legal ball value.
pub const WHITE_BALL_BINS: u32 = 69;
pub const POWERBALL_BINS: u32 = 26;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub dataset: String,
    pub row_limit: usize,
    pub log_level: String,
    pub api_port: u16,
    /// Background rebuild period in seconds (REFRESH_INTERVAL_SECS). 0 disables.
    pub refresh_interval_secs: u64,
    /// Day-of-week table ordering (DOW_ORDER: "alphabetical" | "calendar").
    pub dow_order: DayOrder,
    /// Timeout applied to the HTTP client (HTTP_TIMEOUT_SECS).
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: SOCRATA_API_URL.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            row_limit: ROW_LIMIT,
            log_level: "info".to_string(),
            api_port: 3000,
            refresh_interval_secs: 0,
            dow_order: DayOrder::Alphabetical,
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_url: std::env::var("SOCRATA_API_URL").unwrap_or(defaults.api_url),
            dataset: std::env::var("DATASET_ID")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.dataset),
            row_limit: std::env::var("ROW_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(defaults.row_limit),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            refresh_interval_secs: std::env::var("REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "0".to_string())
                .parse::<u64>()
                .map_err(|_| {
                    AppError::Config("REFRESH_INTERVAL_SECS must be a whole number of seconds".to_string())
                })?,
            dow_order: match std::env::var("DOW_ORDER") {
                Ok(s) => s.parse::<DayOrder>()?,
                Err(_) => defaults.dow_order,
            },
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(defaults.http_timeout_secs),
        })
    }
}
