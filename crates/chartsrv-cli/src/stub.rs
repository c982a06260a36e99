//! In-memory chart server speaking the chart server HTTP protocol.
//!
//! Used by `chart-server-stub` for local development and by the end-to-end
//! tests. Every response is a JSON object with a `success` flag; request
//! bodies that fail to parse are answered with `success: false` and HTTP 200.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use chartsrv_core::{
    CONFIG_PATH, ChartData, ChartKind, ConfigEnvelope, RANDOM_PATH, SHUTDOWN_PATH, STATUS_PATH,
    SWITCH_PATH, StatusEnvelope, UPDATE_PATH,
};
use rand::Rng;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Identifies this server in `/api/status` responses.
pub const SERVER_SIGNATURE: &str = "ChartServer";

/// Number of points produced by `/api/random`.
pub const RANDOM_POINTS: usize = 60;

/// Bounds of `/api/random` values, inclusive.
pub const RANDOM_RANGE: std::ops::RangeInclusive<i32> = -100..=100;

#[derive(Debug)]
struct Chart {
    data: ChartData,
    kind: ChartKind,
}

/// Shared server state.
#[derive(Debug, Clone)]
pub struct StubState {
    chart: Arc<Mutex<Chart>>,
    host: String,
    port: u16,
    shutdown: CancellationToken,
}

impl StubState {
    pub fn new(host: impl Into<String>, port: u16, shutdown: CancellationToken) -> Self {
        Self {
            chart: Arc::new(Mutex::new(Chart {
                data: initial_data(),
                kind: ChartKind::Line,
            })),
            host: host.into(),
            port,
            shutdown,
        }
    }
}

/// Data served before the first update.
pub fn initial_data() -> ChartData {
    ChartData::new(
        vec![65.0, 59.0, 80.0, 81.0, 56.0, 55.0],
        ["January", "February", "March", "April", "May", "June"]
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

pub fn router(state: StubState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(STATUS_PATH, get(status))
        .route(CONFIG_PATH, get(config))
        .route(UPDATE_PATH, post(update))
        .route(SWITCH_PATH, post(switch))
        .route(RANDOM_PATH, post(random))
        .route(SHUTDOWN_PATH, post(shutdown))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` is cancelled, either by the
/// caller or by a `POST /api/shutdown`.
pub async fn serve(
    listener: TcpListener,
    host: impl Into<String>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let port = listener.local_addr()?.port();
    let state = StubState::new(host, port, shutdown.clone());
    info!(port = %port, "Chart server stub listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!(port = %port, "Chart server stub stopped");
    Ok(())
}

fn failure(error: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": false, "error": error.into() }))
}

async fn index(State(state): State<StubState>) -> Html<String> {
    let chart = state.chart.lock().await;
    let data = serde_json::to_string(&chart.data).unwrap_or_default();
    Html(format!(
        "<!doctype html><html><head><title>{SERVER_SIGNATURE}</title></head>\
         <body><h1>{} chart</h1><pre>{data}</pre></body></html>",
        chart.kind
    ))
}

async fn status(State(state): State<StubState>) -> Json<StatusEnvelope> {
    let mut extra = Map::new();
    extra.insert("server".into(), json!(SERVER_SIGNATURE));
    extra.insert("host".into(), json!(state.host));
    extra.insert("actual_port".into(), json!(state.port));
    extra.insert(
        "url".into(),
        json!(format!("http://{}:{}", state.host, state.port)),
    );

    Json(StatusEnvelope {
        success: true,
        status: Some("running".into()),
        extra,
    })
}

async fn config(State(state): State<StubState>) -> Json<ConfigEnvelope> {
    let chart = state.chart.lock().await;
    Json(ConfigEnvelope::current(chart.data.clone(), chart.kind))
}

#[derive(Debug, Deserialize)]
struct UpdateBody {
    values: Option<Vec<f64>>,
    labels: Option<Vec<String>>,
}

async fn update(State(state): State<StubState>, body: String) -> Json<Value> {
    let parsed: UpdateBody = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(e) => return failure(format!("invalid request body: {e}")),
    };

    let data = match (parsed.values, parsed.labels) {
        (None, _) => return failure("missing values"),
        (Some(values), Some(labels)) => {
            if values.len() != labels.len() {
                return failure("values and labels must have the same length");
            }
            ChartData::new(values, labels)
        }
        (Some(values), None) => {
            let labels = (1..=values.len()).map(|i| format!("Item {i}")).collect();
            ChartData::new(values, labels)
        }
    };

    debug!(points = data.len(), "Chart data replaced");
    let mut chart = state.chart.lock().await;
    chart.data = data.clone();
    Json(json!({ "success": true, "data": data }))
}

#[derive(Debug, Deserialize)]
struct SwitchBody {
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn switch(State(state): State<StubState>, body: String) -> Json<Value> {
    let parsed: SwitchBody = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(e) => return failure(format!("invalid request body: {e}")),
    };

    let requested = parsed.kind.unwrap_or_else(|| ChartKind::Line.as_str().to_string());
    let mut chart = state.chart.lock().await;
    // Unknown kinds leave the current kind in place.
    if let Some(kind) = ChartKind::ALL.into_iter().find(|k| k.as_str() == requested) {
        chart.kind = kind;
    }

    Json(json!({ "success": true, "type": chart.kind }))
}

async fn random(State(state): State<StubState>) -> Json<Value> {
    let data = random_data();
    let mut chart = state.chart.lock().await;
    chart.data = data.clone();
    Json(json!({ "success": true, "data": data }))
}

fn random_data() -> ChartData {
    let mut rng = rand::rng();
    let values = (0..RANDOM_POINTS)
        .map(|_| f64::from(rng.random_range(RANDOM_RANGE)))
        .collect();
    let labels = (1..=RANDOM_POINTS).map(|i| format!("Q{i}")).collect();
    ChartData::new(values, labels)
}

async fn shutdown(State(state): State<StubState>) -> Json<Value> {
    info!("Shutdown requested");
    state.shutdown.cancel();
    Json(json!({ "success": true, "message": "Server is shutting down" }))
}
