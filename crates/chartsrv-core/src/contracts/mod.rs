//! Wire contracts for the chart server's HTTP API.
//!
//! Every endpoint answers with a `{ "success": bool, ... }` envelope. Only the
//! envelope shape matters here; the visual meaning of the payload belongs to
//! the chart server.

mod envelope;

pub use envelope::{
    ConfigBody, ConfigEnvelope, DataEnvelope, StatusEnvelope, SwitchRequest, UpdateRequest,
    is_success, parse_config_data, parse_random_data,
};

/// Health/status endpoint (`GET`).
pub const STATUS_PATH: &str = "/api/status";

/// Graceful shutdown endpoint (`POST`, body ignored).
pub const SHUTDOWN_PATH: &str = "/api/shutdown";

/// Replace the chart data (`POST`).
pub const UPDATE_PATH: &str = "/api/update";

/// Change the chart kind (`POST`).
pub const SWITCH_PATH: &str = "/api/switch";

/// Generate random data server-side (`POST`, empty body).
pub const RANDOM_PATH: &str = "/api/random";

/// Read the server's current chart configuration (`GET`).
pub const CONFIG_PATH: &str = "/api/config";
