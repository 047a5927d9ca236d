//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface, the fixed layout of
//! the performance report, and a plain text implementation.

use crate::{
    error::{AppError, Result},
    models::{MetricValue, MetricsTable},
    orchestrator::{NetworkOutcome, ProbeCatalog, RunOutcome},
    types::ProbeStatus,
};
use std::fmt::Write as _;
use std::time::Duration;

/// Title of the report
pub const REPORT_TITLE: &str = "Comprehensive Performance Overview";
/// Printed instead of sections when no probe produced a metric
pub const NO_DATA_MESSAGE: &str = "No performance data collected from any scripts.";
const RULE_WIDTH: usize = 30;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format the performance report for a metrics table
    fn format_report(&self, metrics: &MetricsTable) -> Result<String>;

    /// Format the result of a whole run; by default just its report
    fn format_run(&self, outcome: &RunOutcome) -> Result<String> {
        self.format_report(&outcome.metrics)
    }

    /// Format per-run counters (probes attempted, failed, ...)
    fn format_summary(&self, outcome: &RunOutcome) -> Result<String>;

    /// Format the probe catalog for `--list-probes`
    fn format_probe_catalog(&self, catalog: &ProbeCatalog) -> Result<String>;
}

/// How a metric is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueStyle {
    /// Counters, printed as integers
    Count,
    /// Two decimal places
    Fixed2,
}

/// One line of a report section
#[derive(Debug, Clone, Copy)]
pub struct ReportField {
    pub label: &'static str,
    pub key: &'static str,
    pub style: ValueStyle,
    /// Appended after the value when it is present
    pub unit: Option<&'static str>,
}

/// A titled group of metrics from one probe
#[derive(Debug, Clone, Copy)]
pub struct ReportSection {
    pub title: &'static str,
    pub fields: &'static [ReportField],
}

impl ReportSection {
    /// A section is shown if any of its metrics is present
    pub fn is_present(&self, metrics: &MetricsTable) -> bool {
        self.fields.iter().any(|field| metrics.contains(field.key))
    }
}

const fn field(label: &'static str, key: &'static str, style: ValueStyle, unit: Option<&'static str>) -> ReportField {
    ReportField { label, key, style, unit }
}

const SECONDS: Option<&str> = Some("seconds");
const MB_PER_SEC: Option<&str> = Some("MB/s");

/// Report layout, in print order
pub const REPORT_SECTIONS: [ReportSection; 9] = [
    ReportSection {
        title: "2D Pygame Test (Graphics)",
        fields: &[
            field("Total Sprites", "2D Total Sprites", ValueStyle::Count, None),
            field("Lowest FPS", "2D Lowest FPS", ValueStyle::Fixed2, None),
            field("Highest FPS", "2D Highest FPS", ValueStyle::Fixed2, None),
            field("Average FPS", "2D Average FPS", ValueStyle::Fixed2, None),
        ],
    },
    ReportSection {
        title: "3D Ursina Test (Graphics)",
        fields: &[
            field("Total Cubes", "3D Total Cubes", ValueStyle::Count, None),
            field("Lowest FPS", "3D Lowest FPS", ValueStyle::Fixed2, None),
            field("Highest FPS", "3D Highest FPS", ValueStyle::Fixed2, None),
            field("Average FPS", "3D Average FPS", ValueStyle::Fixed2, None),
        ],
    },
    ReportSection {
        title: "Minecraft Seed Gen Test (Light CPU)",
        fields: &[
            field("Seeds Generated", "MC Seeds Generated", ValueStyle::Count, None),
            field("Generation Time", "MC Generation Time (s)", ValueStyle::Fixed2, SECONDS),
        ],
    },
    ReportSection {
        title: "CPU Performance Test (Heavy CPU)",
        fields: &[
            field("Primes Found", "CPU Primes Found", ValueStyle::Count, None),
            field("Time Taken", "CPU Time Taken (s)", ValueStyle::Fixed2, SECONDS),
        ],
    },
    ReportSection {
        title: "Memory Performance Test",
        fields: &[
            field("Allocation Cycles", "Memory Allocation Cycles", ValueStyle::Count, None),
            field("Time Taken", "Memory Time Taken (s)", ValueStyle::Fixed2, SECONDS),
        ],
    },
    ReportSection {
        title: "File I/O Performance Test",
        fields: &[
            field("Write Speed", "File I/O Write Speed (MB/s)", ValueStyle::Fixed2, MB_PER_SEC),
            field("Read Speed", "File I/O Read Speed (MB/s)", ValueStyle::Fixed2, MB_PER_SEC),
        ],
    },
    ReportSection {
        title: "Simulated GPU Compute Test (CPU-based)",
        fields: &[
            field("Matrix Multiplications", "Simulated GPU Matrix Multiplications", ValueStyle::Count, None),
            field("Time Taken", "Simulated GPU Time Taken (s)", ValueStyle::Fixed2, SECONDS),
        ],
    },
    ReportSection {
        title: "Actual GPU Compute Test (OpenCL)",
        fields: &[
            field("Matrix Multiplications", "Real GPU Matrix Multiplications", ValueStyle::Count, None),
            field("Time Taken", "Real GPU Time Taken (s)", ValueStyle::Fixed2, SECONDS),
        ],
    },
    ReportSection {
        title: "Network Performance Test (Loopback)",
        fields: &[
            field("Send Speed", "Net Send Speed (MB/s)", ValueStyle::Fixed2, MB_PER_SEC),
            field("Receive Speed", "Net Receive Speed (MB/s)", ValueStyle::Fixed2, MB_PER_SEC),
        ],
    },
];

/// Render a metric value, or `None` if it is missing
pub fn format_value(value: Option<&MetricValue>, field: &ReportField) -> Option<String> {
    let text = match (value?, field.style) {
        (MetricValue::Int(v), ValueStyle::Count) => v.to_string(),
        (MetricValue::Int(v), ValueStyle::Fixed2) => format!("{:.2}", *v as f64),
        (MetricValue::Float(v), _) => format!("{:.2}", v),
        (MetricValue::Text(v), _) => v.clone(),
    };

    Some(match field.unit {
        Some(unit) => format!("{} {}", text, unit),
        None => text,
    })
}

/// Parts of the report a formatter may decorate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Part {
    Rule,
    Title,
    Section,
    Label,
    Value,
    Missing,
    Empty,
}

/// Lay out the report, letting `paint` decorate each part
pub(crate) fn write_report<F>(metrics: &MetricsTable, paint: F) -> Result<String>
where
    F: Fn(Part, &str) -> String,
{
    let mut output = String::new();
    let rule = paint(Part::Rule, &"=".repeat(RULE_WIDTH));
    let err = |e: std::fmt::Error| AppError::report(format!("Failed to format report: {}", e));

    writeln!(output, "{}", rule).map_err(err)?;
    writeln!(output, "  {}", paint(Part::Title, REPORT_TITLE)).map_err(err)?;
    writeln!(output, "{}", rule).map_err(err)?;

    if metrics.is_empty() {
        writeln!(output, "{}", paint(Part::Empty, NO_DATA_MESSAGE)).map_err(err)?;
        return Ok(output);
    }

    for section in REPORT_SECTIONS.iter().filter(|s| s.is_present(metrics)) {
        writeln!(output).map_err(err)?;
        let title = format!("--- {} ---", section.title);
        writeln!(output, "{}", paint(Part::Section, &title)).map_err(err)?;

        for field in section.fields {
            let value = match format_value(metrics.get(field.key), field) {
                Some(text) => paint(Part::Value, &text),
                None => paint(Part::Missing, "N/A"),
            };
            let label = paint(Part::Label, &format!("{}:", field.label));
            writeln!(output, "  {} {}", label, value).map_err(err)?;
        }
    }

    writeln!(output).map_err(err)?;
    writeln!(output, "{}", rule).map_err(err)?;
    Ok(output)
}

/// Format duration in human-readable format
pub(crate) fn format_duration(duration: Duration) -> String {
    let ms = duration.as_secs_f64() * 1000.0;
    if ms < 1000.0 {
        format!("{:.1}ms", ms)
    } else if ms < 60000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        let minutes = (ms / 60000.0) as u32;
        let seconds = (ms % 60000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}

/// One-line description of how the network section ended
pub(crate) fn describe_network(network: &NetworkOutcome) -> String {
    match (&network.server_error, &network.teardown) {
        (Some(error), _) => format!("failed to start ({})", error),
        (None, Some(report)) if report.already_exited => format!("exited before teardown (pid {})", report.pid),
        (None, Some(report)) if report.forced_kill => format!("killed after teardown timeout (pid {})", report.pid),
        (None, Some(report)) => format!("stopped gracefully (pid {})", report.pid),
        (None, None) => "not run".to_string(),
    }
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new(FormattingOptions::default())
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_report(&self, metrics: &MetricsTable) -> Result<String> {
        write_report(metrics, |_, text| text.to_string())
    }

    fn format_summary(&self, outcome: &RunOutcome) -> Result<String> {
        let mut output = String::new();
        let err = |e: std::fmt::Error| AppError::report(format!("Failed to format summary: {}", e));

        writeln!(output, "Run Summary:").map_err(err)?;
        writeln!(output, "------------").map_err(err)?;
        writeln!(output, "Probes Attempted: {}", outcome.attempted()).map_err(err)?;
        writeln!(output, "Succeeded:        {}", outcome.count(ProbeStatus::Success)).map_err(err)?;
        writeln!(output, "Failed:           {}", outcome.count(ProbeStatus::Failed)).map_err(err)?;
        writeln!(output, "Not Found:        {}", outcome.count(ProbeStatus::NotFound)).map_err(err)?;
        writeln!(output, "Skipped:          {}", outcome.count(ProbeStatus::Skipped)).map_err(err)?;
        writeln!(output, "Metrics:          {}", outcome.metrics.len()).map_err(err)?;
        if let Some(network) = &outcome.network {
            writeln!(output, "Network Server:   {}", describe_network(network)).map_err(err)?;
        }
        writeln!(output, "Total Duration:   {}", format_duration(outcome.duration)).map_err(err)?;

        if self.options.verbose_mode {
            writeln!(output).map_err(err)?;
            for probe in &outcome.probes {
                let detail = probe.message.as_deref().unwrap_or("");
                writeln!(
                    output,
                    "  {:<20} {:<10} {:>9}  {}",
                    probe.probe,
                    probe.status.as_str(),
                    format_duration(probe.duration),
                    detail
                )
                .map_err(err)?;
            }
        }

        Ok(output)
    }

    fn format_probe_catalog(&self, catalog: &ProbeCatalog) -> Result<String> {
        let mut output = String::new();
        let err = |e: std::fmt::Error| AppError::report(format!("Failed to format probe list: {}", e));

        writeln!(output, "Probes (in run order):").map_err(err)?;
        for (idx, probe) in catalog.probes().iter().enumerate() {
            writeln!(
                output,
                "  {:>2}. {:<20} {:<10} {}",
                idx + 1,
                probe.name(),
                probe.mode.as_str(),
                probe.kind.description()
            )
            .map_err(err)?;
        }

        Ok(output)
    }
}
