//! Drives the real supervisor against the `chart-server-stub` binary.

use std::sync::Arc;
use std::time::Duration;

use chartsrv_core::{ChartData, ChartKind, ServerConfig, ServerStatus};
use chartsrv_runtime::{
    ChartSupervisor, FsExecutableLocator, ReqwestTransport, StartupCheck, StopOutcome,
    SupervisorOptions, ZombieReaper,
};

const STUB: &str = env!("CARGO_BIN_EXE_chart-server-stub");

fn options() -> SupervisorOptions {
    SupervisorOptions {
        settle_delay: Duration::from_millis(100),
        shutdown_polls: 20,
        shutdown_poll_interval: Duration::from_millis(100),
        restart_grace: Duration::from_millis(100),
        control_timeout: Duration::from_secs(5),
        health_timeout: Duration::from_secs(1),
        shutdown_timeout: Duration::from_secs(2),
        ..SupervisorOptions::default()
    }
    .with_startup(StartupCheck::ConfirmHealth {
        attempts: 50,
        interval: Duration::from_millis(100),
    })
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn config() -> ServerConfig {
    let port = free_port();
    ServerConfig::new("127.0.0.1", port, port.saturating_add(20))
}

fn supervisor() -> Arc<ChartSupervisor> {
    Arc::new(
        ChartSupervisor::new(Arc::new(FsExecutableLocator::fixed(STUB))).with_options(options()),
    )
}

#[tokio::test]
async fn test_full_session_against_stub() {
    let supervisor = supervisor();

    let endpoint = supervisor.start(config()).await.unwrap();
    assert_eq!(supervisor.status().await, ServerStatus::Running);
    assert!(supervisor.check_health().await);

    let initial = supervisor.fetch_current_data().await.unwrap();
    assert_eq!(initial.len(), 6);

    let data = ChartData::new(vec![1.0, 2.0, 3.0], vec!["a".into(), "b".into(), "c".into()]);
    assert!(supervisor.update_data(data.clone()).await);
    assert_eq!(supervisor.cached_data().await, data);
    assert_eq!(supervisor.fetch_current_data().await, Some(data));

    assert!(supervisor.switch_chart_kind(ChartKind::Pie).await);
    assert_eq!(supervisor.cached_chart_kind().await, ChartKind::Pie);

    assert!(supervisor.generate_random_data().await);
    assert_eq!(supervisor.cached_data().await.len(), 60);

    assert_eq!(supervisor.stop().await, StopOutcome::Graceful);
    assert_eq!(supervisor.status().await, ServerStatus::Stopped);
    assert_eq!(supervisor.endpoint().await, None);
    assert!(!supervisor.check_health().await);

    // The port is released once the stub exits.
    let listener = std::net::TcpListener::bind(("127.0.0.1", endpoint.port));
    assert!(listener.is_ok());
}

#[tokio::test]
async fn test_restart_starts_a_fresh_session() {
    let supervisor = supervisor();
    supervisor.start(config()).await.unwrap();

    let data = ChartData::new(vec![9.0], vec!["only".into()]);
    assert!(supervisor.update_data(data).await);

    let endpoint = supervisor.restart().await.unwrap();
    assert!(endpoint.is_some());
    assert!(supervisor.is_running().await);

    // A new stub process starts from its initial data.
    let fresh = supervisor.fetch_current_data().await.unwrap();
    assert_eq!(fresh.len(), 6);

    assert_eq!(supervisor.stop().await, StopOutcome::Graceful);
}

#[tokio::test]
async fn test_detached_update_reports_result() {
    let supervisor = supervisor();
    supervisor.start(config()).await.unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel();
    let data = ChartData::new(vec![4.0, 5.0], vec![]);
    let handle = supervisor.update_data_detached(data, move |ok| {
        let _ = tx.send(ok);
    });

    assert!(rx.await.unwrap());
    handle.await.unwrap();
    assert_eq!(supervisor.cached_data().await.values, vec![4.0, 5.0]);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_reaper_shuts_down_orphaned_stub() {
    let port = free_port();
    let mut orphan = tokio::process::Command::new(STUB)
        .args(["--host", "127.0.0.1", "--port", &port.to_string(), "--no-info-file"])
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    // Wait for the orphan to bind.
    let mut bound = false;
    for _ in 0..100 {
        if std::net::TcpStream::connect(("127.0.0.1", port)).is_ok() {
            bound = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(bound, "stub never started listening");

    let reaper = ZombieReaper::new(Arc::new(ReqwestTransport::new()));
    let (probed, sent) = reaper.sweep_ports(port..=port, None).await;
    assert_eq!(probed, vec![port]);
    assert_eq!(sent, vec![port]);

    let status = tokio::time::timeout(Duration::from_secs(10), orphan.wait())
        .await
        .expect("orphan did not exit")
        .unwrap();
    assert!(status.success());
}
