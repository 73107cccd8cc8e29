use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use powerball_dashboard::api::routes::{router, ApiState};
use powerball_dashboard::config::Config;
use powerball_dashboard::dashboard_refresh::DashboardRefresher;
use powerball_dashboard::fetcher::SocrataFetcher;
use powerball_dashboard::pipeline::{PipelineOptions, TracingObserver};
use powerball_dashboard::render::PlotlyJsonRenderer;
use powerball_dashboard::service::DashboardService;
use powerball_dashboard::Result;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let fetcher = SocrataFetcher::new(&cfg)?;
    info!(
        "Source: {} (row limit {}, timeout {}s)",
        fetcher.dataset_url(&cfg.dataset),
        cfg.row_limit,
        cfg.http_timeout_secs,
    );

    let service = DashboardService::new(
        Arc::new(fetcher),
        Arc::new(PlotlyJsonRenderer),
        Arc::new(TracingObserver),
        PipelineOptions { day_order: cfg.dow_order },
        &cfg.dataset,
    );

    // --- Startup build: nothing to serve without it ---
    let snapshot = service.rebuild(&cfg.dataset).await?;
    info!(
        "Bootstrap complete: {} draws, {} figures, as of {}",
        snapshot.draws,
        snapshot.figures.len(),
        snapshot.as_of.format("%Y-%m-%d"),
    );

    // --- Background refresh ---
    if cfg.refresh_interval_secs > 0 {
        let refresher = DashboardRefresher::new(
            Arc::clone(&service),
            Duration::from_secs(cfg.refresh_interval_secs),
        );
        tokio::spawn(async move { refresher.run().await });
        info!("Refreshing every {}s", cfg.refresh_interval_secs);
    } else {
        warn!("REFRESH_INTERVAL_SECS=0, snapshot will not be refreshed");
    }

    // --- HTTP API server ---
    let app = router(ApiState { service });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
