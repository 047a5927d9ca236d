//! Colored formatter implementation with terminal color support
//!
//! Produces the same layout as [`PlainFormatter`] with ANSI colors applied
//! to rules, section titles and values.

use crate::{
    error::{AppError, Result},
    models::MetricsTable,
    orchestrator::{ProbeCatalog, RunOutcome},
    types::ProbeStatus,
};
use super::formatter::{describe_network, format_duration, write_report, FormattingOptions, OutputFormatter, Part};
use std::fmt::Write as _;
use colored::*;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub section: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub value: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            section: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            value: Color::Green,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

impl ColorScheme {
    /// Color used for a probe status in summaries
    pub fn status_color(&self, status: ProbeStatus) -> Color {
        match status {
            ProbeStatus::Success => self.success,
            ProbeStatus::Failed => self.error,
            ProbeStatus::NotFound => self.warning,
            ProbeStatus::Skipped => self.muted,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self { options, color_scheme }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold formatting if colors are enabled
    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored, if colors are enabled
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn paint(&self, part: Part, text: &str) -> String {
        let scheme = &self.color_scheme;
        match part {
            Part::Rule => self.colorize(text, scheme.border).to_string(),
            Part::Title => self.emphasize(text, scheme.header).to_string(),
            Part::Section => self.emphasize(text, scheme.section).to_string(),
            Part::Label => text.to_string(),
            Part::Value => self.colorize(text, scheme.value).to_string(),
            Part::Missing => self.colorize(text, scheme.muted).to_string(),
            Part::Empty => self.colorize(text, scheme.warning).to_string(),
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_report(&self, metrics: &MetricsTable) -> Result<String> {
        write_report(metrics, |part, text| self.paint(part, text))
    }

    fn format_summary(&self, outcome: &RunOutcome) -> Result<String> {
        let mut output = String::new();
        let err = |e: std::fmt::Error| AppError::report(format!("Failed to format summary: {}", e));
        let scheme = &self.color_scheme;

        writeln!(output, "{}", self.bold("Run Summary:")).map_err(err)?;
        writeln!(output, "{}", self.colorize("------------", scheme.border)).map_err(err)?;
        writeln!(output, "Probes Attempted: {}", outcome.attempted()).map_err(err)?;
        for (label, status) in [
            ("Succeeded:       ", ProbeStatus::Success),
            ("Failed:          ", ProbeStatus::Failed),
            ("Not Found:       ", ProbeStatus::NotFound),
            ("Skipped:         ", ProbeStatus::Skipped),
        ] {
            let count = outcome.count(status).to_string();
            writeln!(output, "{} {}", label, self.colorize(&count, scheme.status_color(status))).map_err(err)?;
        }
        writeln!(output, "Metrics:          {}", outcome.metrics.len()).map_err(err)?;
        if let Some(network) = &outcome.network {
            let color = if network.server_error.is_some() { scheme.error } else { scheme.success };
            writeln!(output, "Network Server:   {}", self.colorize(&describe_network(network), color)).map_err(err)?;
        }
        writeln!(output, "Total Duration:   {}", format_duration(outcome.duration)).map_err(err)?;

        if self.options.verbose_mode {
            writeln!(output).map_err(err)?;
            for probe in &outcome.probes {
                let status = format!("{:<10}", probe.status.as_str());
                writeln!(
                    output,
                    "  {:<20} {} {:>9}  {}",
                    probe.probe,
                    self.colorize(&status, scheme.status_color(probe.status)),
                    format_duration(probe.duration),
                    self.colorize(probe.message.as_deref().unwrap_or(""), scheme.muted)
                )
                .map_err(err)?;
            }
        }

        Ok(output)
    }

    fn format_probe_catalog(&self, catalog: &ProbeCatalog) -> Result<String> {
        let mut output = String::new();
        let err = |e: std::fmt::Error| AppError::report(format!("Failed to format probe list: {}", e));

        writeln!(output, "{}", self.bold("Probes (in run order):")).map_err(err)?;
        for (idx, probe) in catalog.probes().iter().enumerate() {
            writeln!(
                output,
                "  {:>2}. {} {:<10} {}",
                idx + 1,
                self.colorize(&format!("{:<20}", probe.name()), self.color_scheme.section),
                probe.mode.as_str(),
                probe.kind.description()
            )
            .map_err(err)?;
        }

        Ok(output)
    }
}
