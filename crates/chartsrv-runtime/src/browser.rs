//! System browser adapter.

use chartsrv_core::{BrowserError, BrowserLauncher};

/// Opens URLs with the platform's default handler via the `open` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<(), BrowserError> {
        open::that(url).map_err(|e| BrowserError {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
