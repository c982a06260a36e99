//! Chart data operations: update, switch, random, fetch.
//!
//! All four share one path through [`ChartSupervisor::execute`]: check that a
//! server is running, send the request, read the envelope, and on logical
//! success update the cache for the session that issued the request.

use std::sync::Arc;

use chartsrv_core::{
    CONFIG_PATH, ChartData, ChartKind, RANDOM_PATH, SWITCH_PATH, ServerStatus, SwitchRequest,
    UPDATE_PATH, UpdateRequest, is_success, parse_config_data, parse_random_data,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ChartSupervisor;
use crate::http::{HttpMethod, HttpOutcome, HttpRequest};

#[derive(Debug, Clone)]
enum DataRequest {
    Update(ChartData),
    Switch(ChartKind),
    Random,
    Fetch,
}

#[derive(Debug, Clone, PartialEq)]
enum CacheUpdate {
    Data(ChartData),
    Kind(ChartKind),
}

#[derive(Debug, Clone, PartialEq)]
enum Completion {
    Failed,
    Succeeded(Option<CacheUpdate>),
}

impl Completion {
    const fn succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

impl DataRequest {
    const fn name(&self) -> &'static str {
        match self {
            Self::Update(_) => "update",
            Self::Switch(_) => "switch",
            Self::Random => "random",
            Self::Fetch => "fetch",
        }
    }

    const fn method(&self) -> HttpMethod {
        match self {
            Self::Fetch => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    const fn path(&self) -> &'static str {
        match self {
            Self::Update(_) => UPDATE_PATH,
            Self::Switch(_) => SWITCH_PATH,
            Self::Random => RANDOM_PATH,
            Self::Fetch => CONFIG_PATH,
        }
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        match self {
            Self::Update(data) => serde_json::to_string(&UpdateRequest::from(data)).map(Some),
            Self::Switch(kind) => serde_json::to_string(&SwitchRequest { kind: *kind }).map(Some),
            Self::Random | Self::Fetch => Ok(None),
        }
    }

    fn interpret(self, outcome: &HttpOutcome) -> Completion {
        if !outcome.ok || !is_success(&outcome.body) {
            return Completion::Failed;
        }

        match self {
            Self::Update(data) => Completion::Succeeded(Some(CacheUpdate::Data(data))),
            Self::Switch(kind) => Completion::Succeeded(Some(CacheUpdate::Kind(kind))),
            Self::Random => {
                Completion::Succeeded(parse_random_data(&outcome.body).map(CacheUpdate::Data))
            }
            Self::Fetch => parse_config_data(&outcome.body)
                .map_or(Completion::Failed, |data| {
                    Completion::Succeeded(Some(CacheUpdate::Data(data)))
                }),
        }
    }
}

impl ChartSupervisor {
    /// Replace the server's chart data. Caches `data` on success.
    pub async fn update_data(&self, data: ChartData) -> bool {
        self.execute(DataRequest::Update(data)).await.succeeded()
    }

    /// Switch the chart kind. Caches `kind` on success.
    pub async fn switch_chart_kind(&self, kind: ChartKind) -> bool {
        self.execute(DataRequest::Switch(kind)).await.succeeded()
    }

    /// Have the server generate random data; caches it when returned.
    pub async fn generate_random_data(&self) -> bool {
        self.execute(DataRequest::Random).await.succeeded()
    }

    /// Read the server's current data, caching and returning it.
    pub async fn fetch_current_data(&self) -> Option<ChartData> {
        match self.execute(DataRequest::Fetch).await {
            Completion::Succeeded(Some(CacheUpdate::Data(data))) => Some(data),
            _ => None,
        }
    }

    pub fn update_data_detached<F>(self: &Arc<Self>, data: ChartData, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.spawn_request(DataRequest::Update(data), on_complete)
    }

    pub fn switch_chart_kind_detached<F>(
        self: &Arc<Self>,
        kind: ChartKind,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.spawn_request(DataRequest::Switch(kind), on_complete)
    }

    pub fn generate_random_data_detached<F>(self: &Arc<Self>, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.spawn_request(DataRequest::Random, on_complete)
    }

    pub fn fetch_current_data_detached<F>(self: &Arc<Self>, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.spawn_request(DataRequest::Fetch, on_complete)
    }

    fn spawn_request<F>(self: &Arc<Self>, request: DataRequest, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let succeeded = this.execute(request).await.succeeded();
            on_complete(succeeded);
        })
    }

    async fn execute(&self, request: DataRequest) -> Completion {
        let op = request.name();

        if let DataRequest::Update(data) = &request {
            if data.values.is_empty() {
                warn!(op, "Refusing to send chart update without values");
                return Completion::Failed;
            }
        }

        let (endpoint, generation) = {
            let state = self.state.lock().await;
            match (&state.endpoint, state.status) {
                (Some(endpoint), ServerStatus::Running) => (endpoint.clone(), state.generation),
                _ => {
                    warn!(op, status = %state.status, "Chart server is not running");
                    return Completion::Failed;
                }
            }
        };

        let body = match request.body() {
            Ok(body) => body,
            Err(e) => {
                warn!(op, error = %e, "Failed to encode chart request");
                return Completion::Failed;
            }
        };

        let http_request = HttpRequest {
            method: request.method(),
            url: endpoint.api_url(request.path()),
            body,
            timeout: self.options.control_timeout,
        };
        let outcome = self.transport.send(http_request).await;
        let completion = request.interpret(&outcome);

        match &completion {
            Completion::Failed if !outcome.ok => {
                warn!(op, error = %outcome.body, "Chart request failed");
            }
            Completion::Failed => {
                warn!(op, status = ?outcome.status, body = %outcome.body, "Chart server rejected request");
            }
            Completion::Succeeded(update) => {
                debug!(op, "Chart request succeeded");
                if let Some(update) = update {
                    self.apply_cache(op, generation, update.clone()).await;
                }
            }
        }

        completion
    }

    async fn apply_cache(&self, op: &str, generation: u64, update: CacheUpdate) {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(op, "Discarding response from a previous session");
            return;
        }
        match update {
            CacheUpdate::Data(data) => {
                info!(op, points = data.len(), "Cached chart data");
                state.cached_data = data;
            }
            CacheUpdate::Kind(kind) => {
                info!(op, %kind, "Cached chart kind");
                state.cached_kind = kind;
            }
        }
    }
}
