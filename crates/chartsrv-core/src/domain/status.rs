//! Server lifecycle status and the endpoint derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of the supervised chart server.
///
/// Transitions: `Stopped -> Starting -> Running`, `Error` reachable from
/// `Starting` or `Running`, and `Stopped` reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// No process is being supervised.
    #[default]
    Stopped,
    /// A process is being spawned or has not confirmed readiness yet.
    Starting,
    /// The process is up and its endpoint accepts requests.
    Running,
    /// Start failed or a health check failed.
    Error,
}

impl ServerStatus {
    /// Whether an endpoint is expected to exist in this status.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    /// Lowercase name used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a spawned chart server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    /// Base URL, e.g. `http://127.0.0.1:8500`.
    pub url: String,
    /// Port the server was told to listen on.
    pub port: u16,
}

impl ServerEndpoint {
    /// Build the endpoint for `host:port`.
    #[must_use]
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            url: format!("http://{host}:{port}"),
            port,
        }
    }

    /// Absolute URL of an API path on this endpoint.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
