//! Output formatting and display system
//!
//! This module renders the performance report in plain text, colored text
//! or JSON, along with the optional run summary and probe listing.

mod formatter;
mod colored;
mod json;

pub use formatter::{
    format_value,
    OutputFormatter,
    PlainFormatter,
    FormattingOptions,
    ReportField,
    ReportSection,
    ValueStyle,
    NO_DATA_MESSAGE,
    REPORT_SECTIONS,
    REPORT_TITLE,
};
pub use colored::{ColoredFormatter, ColorScheme};
pub use json::JsonFormatter;

use crate::{error::Result, orchestrator::RunOutcome, types::OutputFormat};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter for the requested format and color preference
    pub fn create_formatter(format: OutputFormat, enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        match format {
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Text if enable_color => Box::new(ColoredFormatter::new(options)),
            OutputFormat::Text => Box::new(PlainFormatter::new(options)),
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(OutputFormat::Text, false, false)
    }
}

/// Puts together everything printed on stdout after a run
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    show_summary: bool,
}

impl OutputCoordinator {
    /// Create a new output coordinator with the specified formatter
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self {
            formatter,
            show_summary: false,
        }
    }

    /// Append the run summary after the report
    pub fn with_summary(mut self, show_summary: bool) -> Self {
        self.show_summary = show_summary;
        self
    }

    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }

    /// Display complete run results
    pub fn display_results(&self, outcome: &RunOutcome) -> Result<String> {
        let mut output = self.formatter.format_run(outcome)?;

        if self.show_summary {
            output.push('\n');
            output.push_str(&self.formatter.format_summary(outcome)?);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricsTable;
    use std::time::Duration;

    fn empty_outcome() -> RunOutcome {
        RunOutcome {
            session_id: "session-1".to_string(),
            metrics: MetricsTable::new(),
            probes: Vec::new(),
            network: None,
            duration: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_coordinator_report_only_by_default() {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_plain_formatter());
        let output = coordinator.display_results(&empty_outcome()).unwrap();

        assert!(output.contains(NO_DATA_MESSAGE));
        assert!(!output.contains("Run Summary"));
    }

    #[test]
    fn test_coordinator_appends_summary() {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_plain_formatter()).with_summary(true);
        let output = coordinator.display_results(&empty_outcome()).unwrap();

        let report_end = output.find(NO_DATA_MESSAGE).unwrap();
        let summary = output.find("Run Summary:").unwrap();
        assert!(report_end < summary);
        assert!(output.contains("Probes Attempted: 0"));
    }

    #[test]
    fn test_json_factory_outputs_full_run() {
        let formatter = OutputFormatterFactory::create_formatter(OutputFormat::Json, true, false);
        let output = formatter.format_run(&empty_outcome()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["session_id"], "session-1");
        assert!(value["metrics"].as_object().unwrap().is_empty());
    }
}
