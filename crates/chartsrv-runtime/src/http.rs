//! HTTP client adapter for talking to the chart server.
//!
//! Every request resolves to an [`HttpOutcome`]; nothing here returns an
//! error. A transport failure (refused, timeout, unreadable body) is
//! `ok = false`. A non-2xx response is still `ok = true`, and callers inspect
//! `status` and the JSON envelope themselves.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::task::JoinHandle;
use tracing::debug;

/// HTTP verb used by the chart server API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A single request against the chart server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
            timeout,
        }
    }

    pub fn post(url: impl Into<String>, body: Option<String>, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            body,
            timeout,
        }
    }
}

/// Uniform result of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpOutcome {
    /// The request reached the server and a response body was read.
    pub ok: bool,
    /// HTTP status code, when a response arrived.
    pub status: Option<u16>,
    /// Response body, or the transport error message when `ok` is false.
    pub body: String,
}

impl HttpOutcome {
    pub fn transport_failure(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: None,
            body: reason.into(),
        }
    }

    pub fn response(status: u16, body: impl Into<String>) -> Self {
        Self {
            ok: true,
            status: Some(status),
            body: body.into(),
        }
    }

    /// Transport succeeded with exactly `200 OK`.
    pub fn is_ok_200(&self) -> bool {
        self.ok && self.status == Some(200)
    }
}

/// Blocking-form request seam. Implementations must never panic or error;
/// every failure maps to `ok = false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> HttpOutcome;
}

/// Non-blocking form: spawn the request and hand the outcome to
/// `on_complete` exactly once.
pub fn send_detached<F>(
    transport: Arc<dyn HttpTransport>,
    request: HttpRequest,
    on_complete: F,
) -> JoinHandle<()>
where
    F: FnOnce(HttpOutcome) + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = transport.send(request).await;
        on_complete(outcome);
    })
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> HttpOutcome {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        }
        .timeout(request.timeout);

        if let Some(body) = request.body.filter(|b| !b.is_empty()) {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(method = %request.method, url = %request.url, error = %e, "HTTP request failed");
                return HttpOutcome::transport_failure(e.to_string());
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => HttpOutcome::response(status, body),
            Err(e) => {
                debug!(url = %request.url, error = %e, "Failed to read response body");
                HttpOutcome::transport_failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_get_returns_body_and_status() {
        let base = serve(Router::new().route("/api/status", get(|| async { r#"{"success":true}"# }))).await;

        let outcome = ReqwestTransport::new()
            .send(HttpRequest::get(format!("{base}/api/status"), Duration::from_secs(2)))
            .await;

        assert!(outcome.is_ok_200());
        assert_eq!(outcome.body, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn test_non_2xx_is_not_a_transport_failure() {
        let base = serve(Router::new().route(
            "/api/status",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        ))
        .await;

        let outcome = ReqwestTransport::new()
            .send(HttpRequest::get(format!("{base}/api/status"), Duration::from_secs(2)))
            .await;

        assert!(outcome.ok);
        assert_eq!(outcome.status, Some(503));
        assert!(!outcome.is_ok_200());
    }

    #[tokio::test]
    async fn test_json_content_type_only_with_body() {
        let echo = |headers: HeaderMap| async move {
            headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("none")
                .to_string()
        };
        let base = serve(Router::new().route("/api/echo", post(echo))).await;
        let transport = ReqwestTransport::new();

        let with_body = transport
            .send(HttpRequest::post(
                format!("{base}/api/echo"),
                Some(r#"{"type":"bar"}"#.to_string()),
                Duration::from_secs(2),
            ))
            .await;
        assert_eq!(with_body.body, "application/json");

        let empty = transport
            .send(HttpRequest::post(
                format!("{base}/api/echo"),
                Some(String::new()),
                Duration::from_secs(2),
            ))
            .await;
        assert_eq!(empty.body, "none");
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        let base = serve(Router::new().route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        ))
        .await;

        let outcome = ReqwestTransport::new()
            .send(HttpRequest::get(format!("{base}/api/slow"), Duration::from_millis(100)))
            .await;

        assert!(!outcome.ok);
        assert_eq!(outcome.status, None);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        // Bind then drop to get a port with nothing listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let outcome = ReqwestTransport::new()
            .send(HttpRequest::get(
                format!("http://127.0.0.1:{port}/api/status"),
                Duration::from_secs(1),
            ))
            .await;

        assert!(!outcome.ok);
    }

    #[tokio::test]
    async fn test_send_detached_invokes_callback_once() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| HttpOutcome::response(200, "{}"));

        let (tx, rx) = oneshot::channel();
        let handle = send_detached(
            Arc::new(transport),
            HttpRequest::get("http://127.0.0.1:1/api/status", Duration::from_secs(1)),
            move |outcome| {
                let _ = tx.send(outcome);
            },
        );

        handle.await.unwrap();
        let outcome = rx.await.unwrap();
        assert_eq!(outcome.status, Some(200));
    }
}
