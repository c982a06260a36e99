//! Background health polling for a running chart server.
//!
//! Each tick runs the supervisor's side-effecting health check, so the
//! monitor is what turns a dead or wedged server into `Error` (and a
//! recovered one back into `Running`). The stream yields only on change.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use chartsrv_core::ServerStatus;
use futures_util::Stream;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::supervisor::ChartSupervisor;

pub struct HealthMonitor {
    supervisor: Arc<ChartSupervisor>,
    interval: Duration,
    cancel_token: CancellationToken,
}

impl HealthMonitor {
    pub const fn new(
        supervisor: Arc<ChartSupervisor>,
        check_interval: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            supervisor,
            interval: check_interval,
            cancel_token,
        }
    }

    /// Monitor at the supervisor's configured `checkIntervalSeconds`.
    pub async fn from_config(
        supervisor: Arc<ChartSupervisor>,
        cancel_token: CancellationToken,
    ) -> Self {
        let check_interval = supervisor.current_config().await.check_interval();
        Self::new(supervisor, check_interval, cancel_token)
    }

    /// Poll until cancelled, yielding each status change.
    pub fn monitor(self) -> impl Stream<Item = ServerStatus> {
        let supervisor = self.supervisor;
        let cancel_token = self.cancel_token;
        let check_interval = self.interval;

        stream! {
            let mut ticker = interval(check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut last_status: Option<ServerStatus> = None;
            debug!(interval = ?check_interval, "Starting chart server health monitor");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let healthy = supervisor.refresh_health().await;
                        let current = supervisor.status().await;

                        if last_status != Some(current) {
                            debug!(%current, ?last_status, healthy, "Chart server status changed");
                            yield current;
                            last_status = Some(current);
                        }
                    }
                    () = cancel_token.cancelled() => {
                        debug!("Chart server health monitor cancelled");
                        break;
                    }
                }
            }
        }
    }
}
