//! Chart server supervision runtime.
//!
//! - [`process`]: port allocation, spawning and terminating the child
//! - [`http`]: the request seam and its `reqwest` adapter
//! - [`health`] / [`health_monitor`]: status endpoint checks and polling
//! - [`supervisor`]: the lifecycle state machine and chart data operations
//! - [`reaper`]: cleanup of orphaned chart servers
//! - [`locator`] / [`browser`]: adapters for the core port traits

pub mod browser;
pub mod health;
pub mod health_monitor;
pub mod http;
pub mod locator;
pub mod process;
pub mod reaper;
pub mod supervisor;

pub use browser::SystemBrowser;
pub use health_monitor::HealthMonitor;
pub use http::{HttpMethod, HttpOutcome, HttpRequest, HttpTransport, ReqwestTransport};
pub use locator::{FsExecutableLocator, SERVER_PATH_ENV};
pub use process::find_available_port;
pub use reaper::{ReapReport, ReaperOptions, ZombieReaper};
pub use supervisor::{
    ChartSupervisor, StartupCheck, StopOutcome, SupervisorError, SupervisorOptions,
};

