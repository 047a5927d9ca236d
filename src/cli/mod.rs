//! Command-line interface module with topic help

pub mod help;

pub use help::HelpSystem;

use crate::types::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Performance Orchestrator - runs the benchmark probe suite and prints a consolidated report
#[derive(Parser, Debug, Clone)]
#[command(name = "perfrun")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the probe files
    #[arg(long, value_name = "DIR")]
    pub probe_dir: Option<PathBuf>,

    /// Interpreter used to launch the probes
    #[arg(long, value_name = "PROG", conflicts_with = "no_interpreter")]
    pub interpreter: Option<String>,

    /// Execute probe files directly instead of through an interpreter
    #[arg(long)]
    pub no_interpreter: bool,

    /// Network server startup grace period in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub grace_period: Option<u64>,

    /// How long to wait for the network server to exit before killing it, in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub teardown_timeout: Option<u64>,

    /// Report format (text or json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log probe progress and print a run summary
    #[arg(long)]
    pub verbose: bool,

    /// Debug logging and configuration dump
    #[arg(long)]
    pub debug: bool,

    /// Show help for a specific topic (probes, config, report)
    #[arg(long, value_name = "TOPIC")]
    pub help_topic: Option<String>,

    /// Print the probe catalog and exit
    #[arg(long)]
    pub list_probes: bool,
}

impl Cli {
    /// Check if help should be displayed for a specific topic
    pub fn should_show_topic_help(&self) -> bool {
        self.help_topic.is_some()
    }

    /// Get the help topic if specified
    pub fn get_help_topic(&self) -> Option<&str> {
        self.help_topic.as_deref()
    }

    /// Explicit color choice from the command line, if any
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }

    /// Display help for the specified topic or main help
    pub fn display_help(&self) -> String {
        let help_system = HelpSystem::new();
        let use_colors = self.use_colors();

        if let Some(topic) = &self.help_topic {
            help_system.display_topic_help(topic, use_colors).unwrap_or_else(|| {
                format!(
                    "Unknown help topic: '{}'\n\nAvailable topics: {}\n\n{}",
                    topic,
                    HelpSystem::TOPICS.join(", "),
                    help_system.display_main_help(use_colors)
                )
            })
        } else {
            help_system.display_main_help(use_colors)
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command Line:\n");
        if let Some(dir) = &self.probe_dir {
            summary.push_str(&format!("  Probe directory: {}\n", dir.display()));
        }
        if self.no_interpreter {
            summary.push_str("  Interpreter: none\n");
        } else if let Some(interpreter) = &self.interpreter {
            summary.push_str(&format!("  Interpreter: {}\n", interpreter));
        }
        if let Some(grace) = self.grace_period {
            summary.push_str(&format!("  Grace period: {}ms\n", grace));
        }
        if let Some(teardown) = self.teardown_timeout {
            summary.push_str(&format!("  Teardown timeout: {}ms\n", teardown));
        }
        if let Some(format) = self.format {
            summary.push_str(&format!("  Format: {}\n", format));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Parse a millisecond count, rejecting signs and hex
fn parse_millis(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>().map_err(|_| format!("Invalid duration: {}", s))
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(["perfrun"]);
        assert!(cli.probe_dir.is_none());
        assert!(cli.interpreter.is_none());
        assert!(!cli.no_interpreter);
        assert!(cli.grace_period.is_none());
        assert!(cli.format.is_none());
        assert!(!cli.verbose);
        assert!(!cli.list_probes);
        assert_eq!(cli.color_override(), None);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "perfrun",
            "--probe-dir", "/opt/probes",
            "--interpreter", "python3",
            "--grace-period", "500",
            "--teardown-timeout", "1500",
            "--format", "json",
            "--no-color",
            "--verbose",
            "--debug",
            "--help-topic", "report",
        ]);

        assert_eq!(cli.probe_dir, Some(PathBuf::from("/opt/probes")));
        assert_eq!(cli.interpreter.as_deref(), Some("python3"));
        assert_eq!(cli.grace_period, Some(500));
        assert_eq!(cli.teardown_timeout, Some(1500));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.color_override(), Some(false));
        assert!(cli.verbose);
        assert!(cli.debug);
        assert_eq!(cli.get_help_topic(), Some("report"));
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Cli::try_parse_from(["perfrun", "--color", "--no-color"]).is_err());
        assert!(Cli::try_parse_from(["perfrun", "--interpreter", "python", "--no-interpreter"]).is_err());
        assert!(Cli::try_parse_from(["perfrun", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_millis_parsing() {
        assert_eq!(parse_millis("0").unwrap(), 0);
        assert_eq!(parse_millis("2000").unwrap(), 2000);
        assert!(parse_millis("+10").is_err());
        assert!(parse_millis("0x10").is_err());
        assert!(parse_millis("-5").is_err());
        assert!(parse_millis("1.5").is_err());
        assert!(parse_millis("").is_err());
    }

    #[test]
    fn test_help_display() {
        let cli = Cli::parse_from(["perfrun", "--no-color"]);
        let help = cli.display_help();
        assert!(help.contains("Performance Orchestrator"));
        assert!(help.contains("USAGE:"));

        let cli = Cli::parse_from(["perfrun", "--no-color", "--help-topic", "config"]);
        assert!(cli.display_help().contains("CONFIGURATION REFERENCE"));

        let cli = Cli::parse_from(["perfrun", "--no-color", "--help-topic", "invalid"]);
        let help = cli.display_help();
        assert!(help.contains("Unknown help topic"));
        assert!(help.contains("probes, config, report"));
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(["perfrun", "--no-interpreter", "--grace-period", "100", "--verbose"]);
        let summary = cli.get_config_summary();

        assert!(summary.contains("Interpreter: none"));
        assert!(summary.contains("Grace period: 100ms"));
        assert!(summary.contains("Verbose mode: true"));
    }
}
