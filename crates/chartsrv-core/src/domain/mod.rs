//! Domain types shared by the supervisor and its adapters.

mod chart;
mod status;

pub use chart::{ChartData, ChartKind};
pub use status::{ServerEndpoint, ServerStatus};
