use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

/// Transport or decoding failure while retrieving raw records.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response was not a JSON array of records")]
    NotAnArray,

    #[error("record {index} could not be decoded: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A `winning_numbers` string that does not hold six integer tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 6 space-separated numbers, found {found} in {input:?}")]
    TokenCount { input: String, found: usize },

    #[error("token {position} ({token:?}) is not an integer")]
    NotInteger { position: usize, token: String },

    #[error("token {position} ({token:?}) is an integer outside 0..=4294967295")]
    OutOfRange { position: usize, token: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised draw date {input:?}")]
pub struct TimeNormalizationError {
    pub input: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("record {index}: winning_numbers: {source}")]
    Parse {
        index: usize,
        #[source]
        source: ParseError,
    },

    #[error("record {index}: draw_date: {source}")]
    TimeNormalization {
        index: usize,
        #[source]
        source: TimeNormalizationError,
    },

    #[error("no draws to build a dashboard from")]
    EmptyDataset,

    #[error("Render error: {0}")]
    Render(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid dataset id: {0:?}")]
    InvalidDataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Table build task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Parse { .. } | AppError::TimeNormalization { .. } | AppError::EmptyDataset => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidDataset(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
