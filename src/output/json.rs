//! JSON output for scripting
//!
//! The report is the metrics table as an object whose keys keep extraction
//! order. A full run adds per-probe outcomes and the network section record.

use crate::{
    error::{AppError, Result},
    models::MetricsTable,
    orchestrator::{ProbeCatalog, RunOutcome},
    types::ProbeStatus,
};
use super::formatter::OutputFormatter;
use serde::Serialize;
use serde_json::json;

/// Formatter emitting pretty-printed JSON
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        let mut text = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::report(format!("Failed to serialize JSON output: {}", e)))?;
        text.push('\n');
        Ok(text)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, metrics: &MetricsTable) -> Result<String> {
        Self::to_json(metrics)
    }

    fn format_run(&self, outcome: &RunOutcome) -> Result<String> {
        Self::to_json(outcome)
    }

    fn format_summary(&self, outcome: &RunOutcome) -> Result<String> {
        Self::to_json(&json!({
            "session_id": outcome.session_id,
            "attempted": outcome.attempted(),
            "succeeded": outcome.count(ProbeStatus::Success),
            "failed": outcome.count(ProbeStatus::Failed),
            "not_found": outcome.count(ProbeStatus::NotFound),
            "skipped": outcome.count(ProbeStatus::Skipped),
            "metrics": outcome.metrics.len(),
            "duration_ms": outcome.duration.as_millis() as u64,
        }))
    }

    fn format_probe_catalog(&self, catalog: &ProbeCatalog) -> Result<String> {
        let probes: Vec<_> = catalog
            .probes()
            .iter()
            .map(|probe| {
                json!({
                    "name": probe.name(),
                    "mode": probe.mode.as_str(),
                    "description": probe.kind.description(),
                })
            })
            .collect();
        Self::to_json(&probes)
    }
}
