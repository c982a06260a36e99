//! Health checks against the chart server's status endpoint.
//!
//! A server is healthy iff `GET {endpoint}/api/status` completes, answers
//! exactly `200`, and its body is a JSON object with `success: true`.

use std::time::Duration;

use chartsrv_core::{STATUS_PATH, ServerEndpoint, is_success};
use tracing::debug;

use crate::http::{HttpOutcome, HttpRequest, HttpTransport};

/// Interpret a status response.
pub fn is_healthy_response(outcome: &HttpOutcome) -> bool {
    outcome.is_ok_200() && is_success(&outcome.body)
}

/// Single-shot health check with no side effects.
pub async fn check_health(
    transport: &dyn HttpTransport,
    endpoint: &ServerEndpoint,
    timeout: Duration,
) -> bool {
    let outcome = transport
        .send(HttpRequest::get(endpoint.api_url(STATUS_PATH), timeout))
        .await;
    let healthy = is_healthy_response(&outcome);
    debug!(
        url = %endpoint.url,
        status = ?outcome.status,
        healthy,
        "Health check completed"
    );
    healthy
}
