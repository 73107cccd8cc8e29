use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use crate::service::DashboardService;

/// Rebuilds the default dataset on a fixed period. A failed rebuild leaves
/// the previous snapshot in place.
pub struct DashboardRefresher {
    service: Arc<DashboardService>,
    period: Duration,
}

impl DashboardRefresher {
    pub fn new(service: Arc<DashboardService>, period: Duration) -> Self {
        Self { service, period }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.tick().await; // skip immediate first tick, startup build already ran

        loop {
            ticker.tick().await;
            self.refresh().await;
        }
    }

    async fn refresh(&self) {
        let dataset = self.service.default_dataset().to_string();
        match self.service.rebuild(&dataset).await {
            Ok(snapshot) => info!(
                dataset = %dataset,
                draws = snapshot.draws,
                as_of = %snapshot.as_of.format("%Y-%m-%d"),
                "Dashboard refresh complete",
            ),
            Err(e) => error!(dataset = %dataset, "Dashboard refresh failed, keeping previous snapshot: {e}"),
        }
    }
}
