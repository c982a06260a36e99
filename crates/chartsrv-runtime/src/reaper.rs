//! Zombie chart server cleanup.
//!
//! Two independent best-effort passes:
//!
//! 1. If the supervisor still holds a handle whose process has exited, the
//!    handle is reclaimed and status forced to `Stopped`.
//! 2. Every occupied port in the scan range is asked for `/api/status`; a
//!    `200` whose body carries a chart server signature gets a
//!    fire-and-forget `POST /api/shutdown`.
//!
//! Nothing here kills processes by name or pid. A server that does not
//! identify itself is left alone.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use chartsrv_core::{SHUTDOWN_PATH, STATUS_PATH};
use tracing::{debug, info, warn};

use crate::http::{HttpRequest, HttpTransport, send_detached};
use crate::process::is_port_available;
use crate::supervisor::ChartSupervisor;

/// Host probed during the port sweep. Port occupancy is checked on loopback.
const PROBE_HOST: &str = "127.0.0.1";

/// Reaper settings.
#[derive(Debug, Clone)]
pub struct ReaperOptions {
    /// Ports to sweep. `None` uses the supervisor's configured range.
    pub scan_range: Option<RangeInclusive<u16>>,
    pub probe_timeout: Duration,
    pub shutdown_timeout: Duration,
    /// Substrings of a status body that identify a chart server.
    pub signatures: Vec<String>,
}

impl Default for ReaperOptions {
    fn default() -> Self {
        Self {
            scan_range: None,
            probe_timeout: Duration::from_secs(2),
            shutdown_timeout: Duration::from_secs(3),
            signatures: vec!["ChartServer".to_string(), "chart".to_string()],
        }
    }
}

/// What a reap pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReapReport {
    /// A dead handle was dropped and status reset to `Stopped`.
    pub reclaimed_handle: bool,
    /// Occupied ports that were asked for their status.
    pub probed: Vec<u16>,
    /// Ports that identified as a chart server and were sent a shutdown.
    pub shutdown_sent: Vec<u16>,
}

pub struct ZombieReaper {
    transport: Arc<dyn HttpTransport>,
    options: ReaperOptions,
}

impl ZombieReaper {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            options: ReaperOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ReaperOptions) -> Self {
        self.options = options;
        self
    }

    /// Run both passes against `supervisor`.
    pub async fn reap(&self, supervisor: &ChartSupervisor) -> ReapReport {
        let reclaimed_handle = supervisor.reclaim_exited_handle().await;

        let range = match &self.options.scan_range {
            Some(range) => range.clone(),
            None => supervisor.current_config().await.port_range(),
        };
        let skip = supervisor.live_port().await;

        let (probed, shutdown_sent) = self.sweep_ports(range, skip).await;

        info!(
            reclaimed_handle,
            probed = probed.len(),
            shutdown_sent = shutdown_sent.len(),
            "Zombie sweep finished"
        );

        ReapReport {
            reclaimed_handle,
            probed,
            shutdown_sent,
        }
    }

    /// Probe every occupied port in `range` except `skip`.
    ///
    /// Returns `(probed, shutdown_sent)`.
    pub async fn sweep_ports(
        &self,
        range: RangeInclusive<u16>,
        skip: Option<u16>,
    ) -> (Vec<u16>, Vec<u16>) {
        let mut probed = Vec::new();
        let mut shutdown_sent = Vec::new();

        for port in range {
            if Some(port) == skip || is_port_available(port) {
                continue;
            }

            probed.push(port);
            let base = format!("http://{PROBE_HOST}:{port}");
            let outcome = self
                .transport
                .send(HttpRequest::get(
                    format!("{base}{STATUS_PATH}"),
                    self.options.probe_timeout,
                ))
                .await;

            if !outcome.is_ok_200() || !self.matches_signature(&outcome.body) {
                debug!(port = %port, status = ?outcome.status, "Occupied port is not a chart server");
                continue;
            }

            warn!(port = %port, "Found orphaned chart server; requesting shutdown");
            let url = format!("{base}{SHUTDOWN_PATH}");
            drop(send_detached(
                Arc::clone(&self.transport),
                HttpRequest::post(url, None, self.options.shutdown_timeout),
                move |outcome| {
                    debug!(port = %port, ok = outcome.ok, "Orphan shutdown request completed");
                },
            ));
            shutdown_sent.push(port);
        }

        (probed, shutdown_sent)
    }

    fn matches_signature(&self, body: &str) -> bool {
        self.options
            .signatures
            .iter()
            .any(|signature| body.contains(signature.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ReqwestTransport;
    use axum::Router;
    use axum::routing::{get, post};
    use chartsrv_core::{ExecutableLocator, LocateError};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    struct NoExecutable;

    impl ExecutableLocator for NoExecutable {
        fn locate(&self) -> Result<PathBuf, LocateError> {
            Err(LocateError::NotFound { searched: vec![] })
        }
    }

    /// Serve a status body and count shutdown requests.
    async fn fake_server(status_body: &'static str) -> (u16, Arc<AtomicUsize>) {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&shutdowns);
        let router = Router::new()
            .route("/api/status", get(move || async move { status_body }))
            .route(
                "/api/shutdown",
                post(move || {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        r#"{"success":true}"#
                    }
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (port, shutdowns)
    }

    async fn wait_for(count: &AtomicUsize, expected: usize) -> bool {
        for _ in 0..50 {
            if count.load(Ordering::SeqCst) == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    fn reaper() -> ZombieReaper {
        ZombieReaper::new(Arc::new(ReqwestTransport::new()))
    }

    #[tokio::test]
    async fn test_signature_server_gets_shutdown() {
        let (port, shutdowns) =
            fake_server(r#"{"success":true,"status":"running","server":"ChartServer"}"#).await;

        let (probed, sent) = reaper().sweep_ports(port..=port, None).await;

        assert_eq!(probed, vec![port]);
        assert_eq!(sent, vec![port]);
        assert!(wait_for(&shutdowns, 1).await);
    }

    #[tokio::test]
    async fn test_unrelated_server_is_left_alone() {
        let (port, shutdowns) = fake_server(r#"{"success":true,"service":"database"}"#).await;

        let (probed, sent) = reaper().sweep_ports(port..=port, None).await;

        assert_eq!(probed, vec![port]);
        assert!(sent.is_empty());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(shutdowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_live_port_is_skipped() {
        let (port, shutdowns) = fake_server(r#"{"server":"ChartServer"}"#).await;

        let (probed, sent) = reaper().sweep_ports(port..=port, Some(port)).await;

        assert!(probed.is_empty());
        assert!(sent.is_empty());
        assert_eq!(shutdowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_free_ports_are_not_probed() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut transport = crate::http::MockHttpTransport::new();
        transport.expect_send().times(0);
        let reaper = ZombieReaper::new(Arc::new(transport));

        let (probed, sent) = reaper.sweep_ports(port..=port, None).await;
        assert!(probed.is_empty());
        assert!(sent.is_empty());
    }

    #[tokio::test]
    async fn test_reap_uses_configured_range_by_default() {
        let (port, shutdowns) = fake_server(r#"{"success":true,"server":"ChartServer"}"#).await;
        let supervisor = ChartSupervisor::new(Arc::new(NoExecutable))
            .with_config(chartsrv_core::ServerConfig::new("127.0.0.1", port, port));

        let report = reaper().reap(&supervisor).await;

        assert!(!report.reclaimed_handle);
        assert_eq!(report.shutdown_sent, vec![port]);
        assert!(wait_for(&shutdowns, 1).await);
    }
}
