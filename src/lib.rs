//! Powerball draw analytics: fetch the public draw history, derive frequency,
//! overdue, pair and trend tables, and render them as a dashboard.

pub mod api;
pub mod config;
pub mod dashboard_refresh;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod render;
pub mod service;
pub mod state;
pub mod transform;
pub mod types;

pub use error::{AppError, Result};
pub use pipeline::{build_dashboard, Dashboard, PipelineEvent, PipelineObserver, PipelineOptions};
