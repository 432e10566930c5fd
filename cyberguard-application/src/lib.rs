// CyberGuard Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod ops;
pub mod queries;
pub mod state;

pub use error::AppError;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ops::{AnalysisEvent, AnalysisStreamHub, DashboardHandle};
pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_support;
