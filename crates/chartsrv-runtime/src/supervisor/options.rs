//! Timing and policy knobs for [`ChartSupervisor`](super::ChartSupervisor).

use std::time::Duration;

use crate::reaper::ReaperOptions;

/// How `start` decides the server is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupCheck {
    /// Mark `Running` as soon as the settle delay elapses.
    Optimistic,
    /// Poll the status endpoint until it reports healthy or attempts run out.
    ConfirmHealth { attempts: u32, interval: Duration },
}

impl Default for StartupCheck {
    fn default() -> Self {
        Self::ConfirmHealth {
            attempts: 5,
            interval: Duration::from_secs(1),
        }
    }
}

/// Supervisor timings. Defaults match the production values; tests shrink them.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Wait after spawning before the child is expected to be listening.
    pub settle_delay: Duration,
    /// How many times `stop` checks for a graceful exit before force-killing.
    pub shutdown_polls: u32,
    /// Spacing of those checks.
    pub shutdown_poll_interval: Duration,
    /// Pause between stop and start during `restart`.
    pub restart_grace: Duration,
    /// Timeout for data operations.
    pub control_timeout: Duration,
    /// Timeout for status checks.
    pub health_timeout: Duration,
    /// Timeout for shutdown notifications.
    pub shutdown_timeout: Duration,
    pub startup: StartupCheck,
    pub reaper: ReaperOptions,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            shutdown_polls: 5,
            shutdown_poll_interval: Duration::from_secs(1),
            restart_grace: Duration::from_secs(1),
            control_timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(3),
            startup: StartupCheck::default(),
            reaper: ReaperOptions::default(),
        }
    }
}

impl SupervisorOptions {
    #[must_use]
    pub const fn with_startup(mut self, startup: StartupCheck) -> Self {
        self.startup = startup;
        self
    }

    #[must_use]
    pub fn with_reaper(mut self, reaper: ReaperOptions) -> Self {
        self.reaper = reaper;
        self
    }
}
