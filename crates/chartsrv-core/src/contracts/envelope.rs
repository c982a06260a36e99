use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ChartData, ChartKind};

/// Body of `POST /api/update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub values: Vec<f64>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl From<&ChartData> for UpdateRequest {
    fn from(data: &ChartData) -> Self {
        Self {
            values: data.values.clone(),
            labels: data.labels.clone(),
        }
    }
}

/// Body of `POST /api/switch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchRequest {
    #[serde(rename = "type")]
    pub kind: ChartKind,
}

/// Response of `GET /api/status`.
///
/// The chart server adds whatever extra fields it likes; they are kept in
/// `extra` so signature checks can look at them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Response of `POST /api/random`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ChartData>,
}

/// Response of `GET /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigBody>,
    /// Top-level data, as older servers return it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ChartData>,
}

impl ConfigEnvelope {
    /// Successful response carrying the current chart.
    pub const fn current(data: ChartData, kind: ChartKind) -> Self {
        Self {
            success: true,
            config: Some(ConfigBody {
                data: Some(data),
                kind: Some(kind),
            }),
            data: None,
        }
    }

    /// Chart data, preferring `config.data` over the top-level `data`.
    pub fn into_data(self) -> Option<ChartData> {
        if !self.success {
            return None;
        }
        self.config.and_then(|config| config.data).or(self.data)
    }
}

/// The `config` object inside [`ConfigEnvelope`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ChartData>,
    #[serde(default, rename = "chart_type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
}

/// Logical success of a response body.
///
/// `false` when the body is not JSON, is not an object, or has no boolean
/// `success` field.
pub fn is_success(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("success").and_then(Value::as_bool))
        .unwrap_or(false)
}

/// Extract the generated data from a `/api/random` response.
///
/// Returns `None` unless the envelope reports success and carries a `data` object.
pub fn parse_random_data(body: &str) -> Option<ChartData> {
    let envelope: DataEnvelope = serde_json::from_str(body).ok()?;
    if !envelope.success {
        return None;
    }
    envelope.data
}

/// Extract the current data from a `/api/config` response.
///
/// Looks at `config.data` first and falls back to a top-level `data` object,
/// which older servers return.
pub fn parse_config_data(body: &str) -> Option<ChartData> {
    serde_json::from_str::<ConfigEnvelope>(body)
        .ok()?
        .into_data()
}
