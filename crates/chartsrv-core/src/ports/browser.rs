//! Opening the chart endpoint in the user's browser.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to open {url} in browser: {reason}")]
pub struct BrowserError {
    pub url: String,
    pub reason: String,
}

/// Opens a URL with the platform's default handler.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> Result<(), BrowserError>;
}

/// Launcher that does nothing. Used by tests and headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBrowser;

impl BrowserLauncher for NoopBrowser {
    fn open(&self, url: &str) -> Result<(), BrowserError> {
        tracing::debug!(%url, "Browser launch suppressed");
        Ok(())
    }
}
