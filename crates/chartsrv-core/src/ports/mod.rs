//! Port definitions for the supervisor's external collaborators.
//!
//! Ports describe what the supervisor needs from the outside world. They
//! contain no filesystem or process logic; adapters live in `chartsrv-runtime`.

pub mod browser;
pub mod executable_locator;

pub use browser::{BrowserError, BrowserLauncher, NoopBrowser};
pub use executable_locator::{ExecutableLocator, LocateError};
