//! Chart payload types cached by the supervisor.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chart presentation kind.
///
/// The wire form is the lowercase name. Parsing is case-insensitive and
/// falls back to [`ChartKind::Line`] for anything unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
}

impl ChartKind {
    /// All kinds, in wire order.
    pub const ALL: [Self; 3] = [Self::Line, Self::Bar, Self::Pie];

    /// Canonical lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
        }
    }

    /// Parse a wire name, defaulting to `Line` when unrecognized.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
            .unwrap_or_default()
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl From<String> for ChartKind {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<ChartKind> for String {
    fn from(kind: ChartKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Last-known-good chart payload.
///
/// Not authoritative: the chart server owns the real data, this is only
/// what the supervisor last saw confirmed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ChartData {
    /// Create a payload from parallel value and label sequences.
    #[must_use]
    pub const fn new(values: Vec<f64>, labels: Vec<String>) -> Self {
        Self { values, labels }
    }

    /// Whether the payload carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::parse_lenient(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!(ChartKind::parse_lenient("BAR"), ChartKind::Bar);
        assert_eq!(ChartKind::parse_lenient("Pie"), ChartKind::Pie);
        assert_eq!(" line ".parse::<ChartKind>().unwrap(), ChartKind::Line);
    }

    #[test]
    fn test_unknown_kind_defaults_to_line() {
        assert_eq!(ChartKind::parse_lenient("scatter"), ChartKind::Line);
        assert_eq!(ChartKind::parse_lenient(""), ChartKind::Line);
    }

    #[test]
    fn test_kind_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&ChartKind::Bar).unwrap(), "\"bar\"");
        let kind: ChartKind = serde_json::from_str("\"PIE\"").unwrap();
        assert_eq!(kind, ChartKind::Pie);
        let kind: ChartKind = serde_json::from_str("\"donut\"").unwrap();
        assert_eq!(kind, ChartKind::Line);
    }

    #[test]
    fn test_chart_data_accepts_integer_values() {
        let data: ChartData =
            serde_json::from_str(r#"{"values":[1,2.5,-3],"labels":["a","b","c"]}"#).unwrap();
        assert_eq!(data.values, vec![1.0, 2.5, -3.0]);
        assert_eq!(data.labels, vec!["a", "b", "c"]);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_chart_data_missing_fields_default_to_empty() {
        let data: ChartData = serde_json::from_str("{}").unwrap();
        assert!(data.is_empty());
        assert!(data.labels.is_empty());
    }
}
