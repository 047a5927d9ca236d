//! Data models and structures for the performance orchestrator

pub mod config;
pub mod metrics;
pub mod probe;

// Re-export main model types
pub use config::Config;
pub use metrics::{MetricEntry, MetricValue, MetricsTable};
pub use probe::{ProbeFailure, ProbeKind, ProbeResult, ProbeSpec};
