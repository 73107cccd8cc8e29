use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::types::RawRecord;

/// Source of raw draw records for a dataset id, ascending by draw date.
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch(&self, dataset: &str) -> Result<Vec<RawRecord>, FetchError>;
}

/// Fetches draws from a Socrata `resource/{dataset}.json` endpoint.
#[derive(Debug, Clone)]
pub struct SocrataFetcher {
    client: reqwest::Client,
    base_url: String,
    row_limit: usize,
}

impl SocrataFetcher {
    pub fn new(cfg: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            row_limit: cfg.row_limit,
        })
    }

    pub fn dataset_url(&self, dataset: &str) -> String {
        format!(
            "{}/{}.json?$select=draw_date,winning_numbers,multiplier&$order=draw_date%20ASC&$limit={}",
            self.base_url, dataset, self.row_limit
        )
    }
}

#[async_trait]
impl RecordFetcher for SocrataFetcher {
    async fn fetch(&self, dataset: &str) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.dataset_url(dataset);
        debug!(%url, "requesting draw records");

        let resp: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_records(resp)
    }
}

/// Decode a Socrata response body. Fails on anything but an array of records.
pub fn decode_records(resp: serde_json::Value) -> Result<Vec<RawRecord>, FetchError> {
    let serde_json::Value::Array(items) = resp else {
        return Err(FetchError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| FetchError::Record { index, source })
        })
        .collect()
}
