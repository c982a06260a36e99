//! Chart server configuration and validation.
//!
//! `ServerConfig` is an immutable snapshot captured when the server starts.
//! Changing it means reconfigure-then-restart; nothing mutates it in place.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bind host for the chart server.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default first port of the allocation range.
pub const DEFAULT_PREFERRED_PORT: u16 = 8500;

/// Default last port of the allocation range.
pub const DEFAULT_MAX_PORT: u16 = 8600;

/// Default health polling interval in seconds.
pub const DEFAULT_CHECK_INTERVAL_SECS: f64 = 5.0;

/// Default fixed proxy port.
pub const DEFAULT_FIXED_PROXY_PORT: u16 = 8500;

/// Configuration for one chart server session.
///
/// Field names follow the persisted JSON layout (`preferredPort`, `maxPort`, ...).
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Host the server binds to and the supervisor connects to.
    pub host: String,
    /// First port to try.
    pub preferred_port: u16,
    /// Last port to try (inclusive).
    pub max_port: u16,
    /// Whether the host application should start the server on launch.
    pub auto_start: bool,
    /// Interval between background health checks.
    pub check_interval_seconds: f64,
    /// Try `fixed_proxy_port` before scanning the preferred range.
    pub use_fixed_proxy: bool,
    /// Port tried first when `use_fixed_proxy` is set.
    pub fixed_proxy_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            preferred_port: DEFAULT_PREFERRED_PORT,
            max_port: DEFAULT_MAX_PORT,
            auto_start: true,
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECS,
            use_fixed_proxy: true,
            fixed_proxy_port: DEFAULT_FIXED_PROXY_PORT,
        }
    }
}

impl ServerConfig {
    /// Create a config for `host` scanning `[preferred_port, max_port]`.
    #[must_use]
    pub fn new(host: impl Into<String>, preferred_port: u16, max_port: u16) -> Self {
        Self {
            host: host.into(),
            preferred_port,
            max_port,
            use_fixed_proxy: false,
            ..Self::default()
        }
    }

    /// Set the health check interval.
    #[must_use]
    pub const fn with_check_interval(mut self, seconds: f64) -> Self {
        self.check_interval_seconds = seconds;
        self
    }

    /// Try `port` before scanning the preferred range.
    #[must_use]
    pub const fn with_fixed_proxy(mut self, port: u16) -> Self {
        self.use_fixed_proxy = true;
        self.fixed_proxy_port = port;
        self
    }

    /// The preferred allocation range.
    #[must_use]
    pub const fn port_range(&self) -> RangeInclusive<u16> {
        self.preferred_port..=self.max_port
    }

    /// Ranges the port allocator should scan, in order.
    ///
    /// Every candidate lies in [`port_range`](Self::port_range). The fixed
    /// proxy port is only tried first when it falls inside that range;
    /// otherwise it is ignored.
    #[must_use]
    pub fn port_candidates(&self) -> Vec<RangeInclusive<u16>> {
        let mut ranges = Vec::with_capacity(2);
        if self.use_fixed_proxy && self.port_range().contains(&self.fixed_proxy_port) {
            ranges.push(self.fixed_proxy_port..=self.fixed_proxy_port);
        }
        ranges.push(self.port_range());
        ranges
    }

    /// Health check interval as a `Duration`.
    ///
    /// Falls back to the default when the configured value is not a
    /// positive finite number.
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        if self.check_interval_seconds.is_finite() && self.check_interval_seconds > 0.0 {
            Duration::try_from_secs_f64(self.check_interval_seconds)
                .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_CHECK_INTERVAL_SECS))
        } else {
            Duration::from_secs_f64(DEFAULT_CHECK_INTERVAL_SECS)
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Host cannot be empty")]
    EmptyHost,

    #[error("Preferred port {preferred} is greater than max port {max}")]
    InvertedPortRange { preferred: u16, max: u16 },

    #[error("Port should be >= 1024 (privileged ports require root), got {0}")]
    PrivilegedPort(u16),

    #[error("Check interval must be a positive number of seconds, got {0}")]
    InvalidCheckInterval(f64),
}

/// Validate a configuration before it is used to start a server.
pub fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::EmptyHost);
    }

    if config.preferred_port > config.max_port {
        return Err(ConfigError::InvertedPortRange {
            preferred: config.preferred_port,
            max: config.max_port,
        });
    }

    if config.preferred_port < 1024 {
        return Err(ConfigError::PrivilegedPort(config.preferred_port));
    }

    if config.use_fixed_proxy && config.fixed_proxy_port < 1024 {
        return Err(ConfigError::PrivilegedPort(config.fixed_proxy_port));
    }

    if !(config.check_interval_seconds.is_finite() && config.check_interval_seconds > 0.0) {
        return Err(ConfigError::InvalidCheckInterval(
            config.check_interval_seconds,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.preferred_port, 8500);
        assert_eq!(config.max_port, 8600);
        assert!(config.auto_start);
        assert!((config.check_interval_seconds - 5.0).abs() < f64::EPSILON);
        assert!(config.use_fixed_proxy);
        assert_eq!(config.fixed_proxy_port, 8500);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let json = serde_json::to_string(&ServerConfig::default()).unwrap();
        assert!(json.contains("\"preferredPort\":8500"));
        assert!(json.contains("\"maxPort\":8600"));
        assert!(json.contains("\"checkIntervalSeconds\":5.0"));
        assert!(json.contains("\"useFixedProxy\":true"));
        assert!(json.contains("\"fixedProxyPort\":8500"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"host":"0.0.0.0","maxPort":9000}"#).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_port, 9000);
        assert_eq!(config.preferred_port, DEFAULT_PREFERRED_PORT);
    }

    #[test]
    fn test_port_candidates() {
        let plain = ServerConfig::new("127.0.0.1", 8500, 8510);
        assert_eq!(plain.port_candidates(), vec![8500..=8510]);

        let fixed = plain.clone().with_fixed_proxy(8505);
        assert_eq!(fixed.port_candidates(), vec![8505..=8505, 8500..=8510]);
    }

    #[test]
    fn test_fixed_proxy_outside_range_is_ignored() {
        // Partial file: useFixedProxy and fixedProxyPort come from the defaults.
        let config: ServerConfig =
            serde_json::from_str(r#"{"preferredPort":9100,"maxPort":9110}"#).unwrap();
        assert!(config.use_fixed_proxy);
        assert_eq!(config.fixed_proxy_port, DEFAULT_FIXED_PROXY_PORT);
        assert_eq!(config.port_candidates(), vec![9100..=9110]);

        let above = ServerConfig::new("127.0.0.1", 8500, 8510).with_fixed_proxy(8511);
        assert_eq!(above.port_candidates(), vec![8500..=8510]);

        for range in ServerConfig::default().port_candidates() {
            assert!(ServerConfig::default().port_range().contains(range.start()));
            assert!(ServerConfig::default().port_range().contains(range.end()));
        }
    }

    #[test]
    fn test_check_interval_falls_back_on_bad_values() {
        let config = ServerConfig::default().with_check_interval(0.25);
        assert_eq!(config.check_interval(), Duration::from_millis(250));

        let config = ServerConfig::default().with_check_interval(-1.0);
        assert_eq!(config.check_interval(), Duration::from_secs(5));

        let config = ServerConfig::default().with_check_interval(f64::NAN);
        assert_eq!(config.check_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_validation_errors() {
        let config = ServerConfig::new(" ", 8500, 8600);
        assert_eq!(validate_config(&config), Err(ConfigError::EmptyHost));

        let config = ServerConfig::new("127.0.0.1", 8600, 8500);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvertedPortRange { .. })
        ));

        let config = ServerConfig::new("127.0.0.1", 80, 8500);
        assert_eq!(validate_config(&config), Err(ConfigError::PrivilegedPort(80)));

        let config = ServerConfig::new("127.0.0.1", 8500, 8600).with_check_interval(0.0);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidCheckInterval(_))
        ));
    }
}
