//! Chart server supervisor.
//!
//! `ChartSupervisor` owns the child process handle and the status state
//! machine. All mutable state sits behind one `tokio::sync::Mutex`; a second
//! lock serializes the lifecycle operations (start, stop, restart, reclaim) so
//! the state lock is only held for short, non-blocking sections.
//!
//! ```text
//! Stopped -> Starting -> Running
//!               |           |
//!               +--> Error <+        (any state) --stop--> Stopped
//! ```
//!
//! Every `start` and `stop` bumps a session generation. In-flight requests
//! capture the generation when issued and only touch status or caches if it
//! still matches when they complete.

mod data;
mod error;
mod options;

use std::path::PathBuf;
use std::sync::Arc;

use chartsrv_core::{
    BrowserLauncher, ChartData, ChartKind, ConfigError, ConfigFileError, ExecutableLocator,
    NoopBrowser, SHUTDOWN_PATH, ServerConfig, ServerEndpoint, ServerStatus, validate_config,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::health;
use crate::http::{HttpRequest, HttpTransport, ReqwestTransport, send_detached};
use crate::process::{ServerHandle, find_port_in_candidates, spawn_server};
use crate::reaper::{ReapReport, ZombieReaper};

pub use error::{StopOutcome, SupervisorError};
pub use options::{StartupCheck, SupervisorOptions};

struct SupervisorState {
    status: ServerStatus,
    handle: Option<ServerHandle>,
    endpoint: Option<ServerEndpoint>,
    config: ServerConfig,
    cached_data: ChartData,
    cached_kind: ChartKind,
    generation: u64,
}

impl SupervisorState {
    fn new(config: ServerConfig) -> Self {
        Self {
            status: ServerStatus::Stopped,
            handle: None,
            endpoint: None,
            config,
            cached_data: ChartData::default(),
            cached_kind: ChartKind::default(),
            generation: 0,
        }
    }

    fn transition(&mut self, next: ServerStatus) {
        if self.status != next {
            info!(from = %self.status, to = %next, "Chart server status changed");
            self.status = next;
        }
    }

    /// Drop endpoint and handle, bump the generation, and move to `next`.
    fn clear_session(&mut self, next: ServerStatus) -> (Option<ServerHandle>, Option<ServerEndpoint>) {
        self.generation += 1;
        self.transition(next);
        (self.handle.take(), self.endpoint.take())
    }
}

/// Supervises one chart server process.
///
/// Share it as `Arc<ChartSupervisor>`; the `*_detached` operations need the
/// `Arc` to outlive the caller.
pub struct ChartSupervisor {
    lifecycle: Mutex<()>,
    state: Mutex<SupervisorState>,
    transport: Arc<dyn HttpTransport>,
    locator: Arc<dyn ExecutableLocator>,
    browser: Arc<dyn BrowserLauncher>,
    options: SupervisorOptions,
}

impl ChartSupervisor {
    /// Create a stopped supervisor with default config, timings and a
    /// `reqwest` transport.
    pub fn new(locator: Arc<dyn ExecutableLocator>) -> Self {
        Self {
            lifecycle: Mutex::new(()),
            state: Mutex::new(SupervisorState::new(ServerConfig::default())),
            transport: Arc::new(ReqwestTransport::new()),
            locator,
            browser: Arc::new(NoopBrowser),
            options: SupervisorOptions::default(),
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn with_browser(mut self, browser: Arc<dyn BrowserLauncher>) -> Self {
        self.browser = browser;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: SupervisorOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the initial config (what `restart` and `save_config` see
    /// before the first `start`).
    #[must_use]
    pub fn with_config(self, config: ServerConfig) -> Self {
        let state = SupervisorState::new(config);
        Self {
            state: Mutex::new(state),
            ..self
        }
    }

    pub const fn options(&self) -> &SupervisorOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start the chart server with `config`.
    ///
    /// Stops any existing session first. On success the returned endpoint is
    /// live and status is `Running`; on failure status is `Error`.
    pub async fn start(&self, config: ServerConfig) -> Result<ServerEndpoint, SupervisorError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.start_locked(config).await
    }

    /// Stop the chart server, gracefully if possible.
    ///
    /// Status reads `Stopped` as soon as teardown begins. No-op when there is
    /// no process handle.
    pub async fn stop(&self) -> StopOutcome {
        let _lifecycle = self.lifecycle.lock().await;
        self.stop_locked().await
    }

    /// Stop and start again with the stored config.
    ///
    /// Returns `Ok(None)` without doing anything unless status is `Running`.
    pub async fn restart(&self) -> Result<Option<ServerEndpoint>, SupervisorError> {
        let _lifecycle = self.lifecycle.lock().await;

        let config = {
            let state = self.state.lock().await;
            if state.status != ServerStatus::Running {
                debug!(status = %state.status, "Restart ignored: chart server is not running");
                return Ok(None);
            }
            state.config.clone()
        };

        info!("Restarting chart server");
        self.stop_locked().await;
        sleep(self.options.restart_grace).await;
        self.start_locked(config).await.map(Some)
    }

    async fn start_locked(&self, config: ServerConfig) -> Result<ServerEndpoint, SupervisorError> {
        if self.status().await != ServerStatus::Stopped {
            self.stop_locked().await;
        }

        if let Err(e) = validate_config(&config) {
            error!(error = %e, "Refusing to start chart server");
            self.fail_start().await;
            return Err(SupervisorError::InvalidConfig(e));
        }

        let generation = {
            let mut state = self.state.lock().await;
            state.config = config.clone();
            let (stale_handle, _) = state.clear_session(ServerStatus::Starting);
            debug_assert!(stale_handle.is_none());
            state.generation
        };

        info!(
            host = %config.host,
            preferred_port = %config.preferred_port,
            max_port = %config.max_port,
            "Starting chart server"
        );

        let port = find_port_in_candidates(&config.port_candidates()).unwrap_or_else(|| {
            warn!(
                port = %config.preferred_port,
                "No free port in range; falling back to preferred port"
            );
            config.preferred_port
        });

        let executable = match self.locator.locate() {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, "Chart server executable not found");
                self.fail_start().await;
                return Err(SupervisorError::ExecutableNotFound(e));
            }
        };

        let handle = match spawn_server(&executable, &config.host, port) {
            Ok(handle) => handle,
            Err(e) => {
                error!(path = %executable.display(), error = %e, "Failed to spawn chart server");
                self.fail_start().await;
                return Err(SupervisorError::SpawnFailed {
                    path: executable,
                    reason: e.to_string(),
                });
            }
        };

        let endpoint = ServerEndpoint::new(&config.host, port);
        {
            let mut state = self.state.lock().await;
            state.handle = Some(handle);
            state.endpoint = Some(endpoint.clone());
        }

        sleep(self.options.settle_delay).await;

        match self.options.startup {
            StartupCheck::Optimistic => {
                self.mark_running(generation).await;
                info!(url = %endpoint.url, "Chart server started");
                Ok(endpoint)
            }
            StartupCheck::ConfirmHealth { attempts, interval } => {
                self.confirm_startup(&endpoint, generation, attempts, interval)
                    .await
            }
        }
    }

    async fn confirm_startup(
        &self,
        endpoint: &ServerEndpoint,
        generation: u64,
        attempts: u32,
        interval: std::time::Duration,
    ) -> Result<ServerEndpoint, SupervisorError> {
        for attempt in 1..=attempts {
            if self.child_exited().await {
                warn!(url = %endpoint.url, "Chart server exited during startup");
                break;
            }

            if health::check_health(self.transport.as_ref(), endpoint, self.options.health_timeout)
                .await
            {
                self.mark_running(generation).await;
                info!(url = %endpoint.url, attempt, "Chart server started and healthy");
                return Ok(endpoint.clone());
            }

            debug!(url = %endpoint.url, attempt, attempts, "Chart server not healthy yet");
            if attempt < attempts {
                sleep(interval).await;
            }
        }

        error!(url = %endpoint.url, attempts, "Chart server failed startup health check");
        let handle = {
            let mut state = self.state.lock().await;
            state.clear_session(ServerStatus::Error).0
        };
        if let Some(mut handle) = handle {
            handle.force_terminate();
            if let Err(e) = handle.wait().await {
                warn!(error = %e, "Failed to reap chart server after failed startup");
            }
        }

        Err(SupervisorError::HealthCheckFailed {
            url: endpoint.url.clone(),
            attempts,
        })
    }

    async fn stop_locked(&self) -> StopOutcome {
        let (handle, endpoint) = {
            let mut state = self.state.lock().await;
            if state.handle.is_none() {
                if state.status.is_active() {
                    state.clear_session(ServerStatus::Stopped);
                }
                return StopOutcome::NotRunning;
            }
            state.clear_session(ServerStatus::Stopped)
        };

        let Some(handle) = handle else {
            return StopOutcome::NotRunning;
        };

        info!(pid = ?handle.pid(), port = %handle.port(), "Stopping chart server");
        self.shutdown_child(handle, endpoint).await
    }

    /// Ask the child to exit, poll for it, then escalate to a kill.
    async fn shutdown_child(
        &self,
        mut handle: ServerHandle,
        endpoint: Option<ServerEndpoint>,
    ) -> StopOutcome {
        if let Some(endpoint) = endpoint {
            let url = endpoint.api_url(SHUTDOWN_PATH);
            let request = HttpRequest::post(url.clone(), None, self.options.shutdown_timeout);
            drop(send_detached(
                Arc::clone(&self.transport),
                request,
                move |outcome| {
                    debug!(%url, ok = outcome.ok, status = ?outcome.status, "Shutdown request completed");
                },
            ));
        }

        let mut outcome = StopOutcome::Forced;
        for poll in 1..=self.options.shutdown_polls {
            sleep(self.options.shutdown_poll_interval).await;
            if handle.has_exited() {
                debug!(poll, "Chart server exited gracefully");
                outcome = StopOutcome::Graceful;
                break;
            }
        }

        if outcome == StopOutcome::Forced {
            warn!(pid = ?handle.pid(), "Chart server did not exit in time; force-terminating");
            handle.force_terminate();
        }

        match handle.wait().await {
            Ok(status) => info!(%status, %outcome, "Chart server stopped"),
            Err(e) => warn!(error = %e, "Failed to wait for chart server exit"),
        }

        outcome
    }

    async fn fail_start(&self) {
        let mut state = self.state.lock().await;
        state.clear_session(ServerStatus::Error);
    }

    async fn mark_running(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.transition(ServerStatus::Running);
        }
    }

    async fn child_exited(&self) -> bool {
        let mut state = self.state.lock().await;
        state.handle.as_mut().is_none_or(ServerHandle::has_exited)
    }

    // ------------------------------------------------------------------
    // Status and accessors
    // ------------------------------------------------------------------

    /// Last recorded status. Not verified against the process.
    pub async fn status(&self) -> ServerStatus {
        self.state.lock().await.status
    }

    pub async fn is_running(&self) -> bool {
        self.status().await == ServerStatus::Running
    }

    pub async fn endpoint(&self) -> Option<ServerEndpoint> {
        self.state.lock().await.endpoint.clone()
    }

    pub async fn server_url(&self) -> Option<String> {
        self.endpoint().await.map(|e| e.url)
    }

    pub async fn server_port(&self) -> Option<u16> {
        self.endpoint().await.map(|e| e.port)
    }

    /// Last data confirmed by the server.
    pub async fn cached_data(&self) -> ChartData {
        self.state.lock().await.cached_data.clone()
    }

    /// Last chart kind confirmed by the server.
    pub async fn cached_chart_kind(&self) -> ChartKind {
        self.state.lock().await.cached_kind
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn default_config() -> ServerConfig {
        ServerConfig::default()
    }

    pub async fn current_config(&self) -> ServerConfig {
        self.state.lock().await.config.clone()
    }

    /// Store `config` for the next `restart`. The running server is untouched.
    pub async fn reconfigure(&self, config: ServerConfig) -> Result<(), ConfigError> {
        validate_config(&config)?;
        self.state.lock().await.config = config;
        Ok(())
    }

    /// Persist the current config under `file_name` in the config directory.
    pub async fn save_config(&self, file_name: &str) -> Result<PathBuf, ConfigFileError> {
        let config = self.current_config().await;
        chartsrv_core::save_config(&config, file_name)
    }

    /// Load a persisted config and make it current.
    ///
    /// On failure the current config is left unchanged.
    pub async fn load_config(&self, file_name: &str) -> Result<ServerConfig, ConfigFileError> {
        let config = chartsrv_core::load_config(file_name).inspect_err(|e| {
            warn!(file = %file_name, error = %e, "Failed to load chart server config");
        })?;
        self.state.lock().await.config = config.clone();
        Ok(config)
    }

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    /// Check the live endpoint without touching status.
    pub async fn check_health(&self) -> bool {
        let Some(endpoint) = self.endpoint().await else {
            return false;
        };
        health::check_health(self.transport.as_ref(), &endpoint, self.options.health_timeout).await
    }

    /// Check the live endpoint and move status to `Running` or `Error`.
    ///
    /// With no endpoint this reports `false` and only demotes a `Running`
    /// status. Results for a superseded session, or arriving while the
    /// supervisor is `Stopped` or `Starting`, leave status alone.
    pub async fn refresh_health(&self) -> bool {
        let (endpoint, generation) = {
            let mut state = self.state.lock().await;
            match state.endpoint.clone() {
                Some(endpoint) => (endpoint, state.generation),
                None => {
                    if state.status == ServerStatus::Running {
                        state.transition(ServerStatus::Error);
                    }
                    return false;
                }
            }
        };

        let healthy =
            health::check_health(self.transport.as_ref(), &endpoint, self.options.health_timeout)
                .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Ignoring health result for a previous session");
        } else if matches!(state.status, ServerStatus::Stopped | ServerStatus::Starting) {
            debug!(status = %state.status, "Ignoring health result while not started");
        } else if healthy {
            state.transition(ServerStatus::Running);
        } else {
            if state.status == ServerStatus::Running {
                warn!(url = %endpoint.url, "Chart server failed health check");
            }
            state.transition(ServerStatus::Error);
        }

        healthy
    }

    /// Callback form of [`refresh_health`](Self::refresh_health).
    pub fn check_health_detached<F>(self: &Arc<Self>, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let healthy = this.refresh_health().await;
            on_complete(healthy);
        })
    }

    // ------------------------------------------------------------------
    // Zombie reclamation and browser
    // ------------------------------------------------------------------

    /// Drop the handle if its process has exited behind our back.
    pub(crate) async fn reclaim_exited_handle(&self) -> bool {
        let _lifecycle = self.lifecycle.lock().await;
        let mut state = self.state.lock().await;

        let exited = state.handle.as_mut().is_some_and(ServerHandle::has_exited);
        if exited {
            warn!("Chart server process is gone; reclaiming handle");
            state.clear_session(ServerStatus::Stopped);
        }
        exited
    }

    /// Port owned by the live process, if any.
    pub(crate) async fn live_port(&self) -> Option<u16> {
        let state = self.state.lock().await;
        state.handle.as_ref().map(ServerHandle::port)
    }

    pub(crate) fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    /// Reclaim a dead handle and ask orphaned chart servers to shut down.
    pub async fn reap_zombies(&self) -> ReapReport {
        ZombieReaper::new(self.transport())
            .with_options(self.options.reaper.clone())
            .reap(self)
            .await
    }

    /// Open the live endpoint in a browser. `false` when there is none.
    pub async fn open_in_browser(&self) -> bool {
        let Some(url) = self.server_url().await else {
            warn!("No chart server endpoint to open");
            return false;
        };
        match self.browser.open(&url) {
            Ok(()) => {
                info!(%url, "Opened chart in browser");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to open chart in browser");
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn attach_endpoint_for_test(&self, endpoint: ServerEndpoint) {
        let mut state = self.state.lock().await;
        state.endpoint = Some(endpoint);
        state.transition(ServerStatus::Running);
    }

    #[cfg(test)]
    pub(crate) async fn set_status_for_test(&self, status: ServerStatus) {
        self.state.lock().await.transition(status);
    }

    #[cfg(test)]
    pub(crate) async fn detach_for_test(&self) {
        let mut state = self.state.lock().await;
        state.clear_session(ServerStatus::Stopped);
    }
}

impl std::fmt::Debug for ChartSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSupervisor").finish_non_exhaustive()
    }
}
