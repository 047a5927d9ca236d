//! Command-line help system with topic pages and usage examples
//!
//! This module provides detailed help text and contextual guidance for
//! running the probe suite.

use crate::{
    config::env::EnvManager,
    models::ProbeKind,
    output::{NO_DATA_MESSAGE, REPORT_SECTIONS},
};
use colored::*;

/// Help system for the CLI application
pub struct HelpSystem {
    platform: String,
}

impl HelpSystem {
    /// Topics accepted by `--help-topic`
    pub const TOPICS: [&'static str; 3] = ["probes", "config", "report"];

    /// Create a new help system
    pub fn new() -> Self {
        Self {
            platform: get_platform_name(),
        }
    }

    /// Display the main help message with all available options
    pub fn display_main_help(&self, use_colors: bool) -> String {
        let mut help = String::new();

        help.push_str(&self.format_header(use_colors));
        help.push('\n');
        help.push_str(&self.format_usage_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_options_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_examples_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_footer(use_colors));

        help
    }

    /// Display help for a specific topic
    pub fn display_topic_help(&self, topic: &str, use_colors: bool) -> Option<String> {
        match topic.trim().to_lowercase().as_str() {
            "probes" | "probe" => Some(self.format_probes_help(use_colors)),
            "config" | "configuration" | "env" | "environment" => Some(self.format_configuration_help(use_colors)),
            "report" | "output" => Some(self.format_report_help(use_colors)),
            _ => None,
        }
    }

    fn section_header(&self, text: &str, use_colors: bool) -> String {
        if use_colors {
            text.bright_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Format the main header
    fn format_header(&self, use_colors: bool) -> String {
        let title = "Performance Orchestrator";
        let subtitle = "Runs the benchmark probe suite and prints a consolidated performance report";
        let version = env!("CARGO_PKG_VERSION");

        if use_colors {
            format!(
                "{}\n{}\nVersion: {} | Platform: {}\n",
                title.bright_cyan().bold(),
                subtitle.bright_blue(),
                version.green(),
                self.platform.yellow()
            )
        } else {
            format!("{}\n{}\nVersion: {} | Platform: {}\n", title, subtitle, version, self.platform)
        }
    }

    /// Format the usage section
    fn format_usage_section(&self, use_colors: bool) -> String {
        let mut usage = format!("{}\n", self.section_header("USAGE:", use_colors));
        for pattern in [
            "perfrun [OPTIONS]",
            "perfrun --list-probes",
            "perfrun --help-topic <TOPIC>",
        ] {
            if use_colors {
                usage.push_str(&format!("  {}\n", pattern.bright_white()));
            } else {
                usage.push_str(&format!("  {}\n", pattern));
            }
        }
        usage
    }

    /// Format the options section
    fn format_options_section(&self, use_colors: bool) -> String {
        let options = [
            OptionHelp {
                long: "probe-dir",
                value: "<DIR>",
                description: "Directory containing the probe files",
                example: Some("--probe-dir ./benchmarks"),
            },
            OptionHelp {
                long: "interpreter",
                value: "<PROG>",
                description: "Interpreter used to launch probes (default: python)",
                example: Some("--interpreter python3"),
            },
            OptionHelp {
                long: "no-interpreter",
                value: "",
                description: "Execute probe files directly",
                example: None,
            },
            OptionHelp {
                long: "grace-period",
                value: "<MS>",
                description: "Network server startup grace period (default: 2000)",
                example: None,
            },
            OptionHelp {
                long: "teardown-timeout",
                value: "<MS>",
                description: "Wait for the network server to exit before killing it (default: 5000)",
                example: None,
            },
            OptionHelp {
                long: "format",
                value: "<text|json>",
                description: "Report format",
                example: Some("--format json"),
            },
            OptionHelp {
                long: "color",
                value: "",
                description: "Force colored output",
                example: None,
            },
            OptionHelp {
                long: "no-color",
                value: "",
                description: "Disable colored output",
                example: None,
            },
            OptionHelp {
                long: "verbose",
                value: "",
                description: "Log probe progress and print a run summary",
                example: None,
            },
            OptionHelp {
                long: "debug",
                value: "",
                description: "Debug logging (JSON lines) and configuration dump",
                example: None,
            },
            OptionHelp {
                long: "list-probes",
                value: "",
                description: "Print the probe catalog and exit",
                example: None,
            },
            OptionHelp {
                long: "help-topic",
                value: "<TOPIC>",
                description: "Extended help: probes, config, report",
                example: Some("--help-topic report"),
            },
        ];

        let mut output = format!("{}\n", self.section_header("OPTIONS:", use_colors));
        for option in &options {
            output.push_str(&option.format(use_colors));
            output.push('\n');
        }
        output
    }

    /// Format the examples section
    fn format_examples_section(&self, use_colors: bool) -> String {
        let examples = [
            ExampleHelp {
                title: "Run the full suite next to the binary",
                command: "perfrun",
                description: "Probes are looked up in the executable's directory and run with python",
            },
            ExampleHelp {
                title: "Use a different probe directory and interpreter",
                command: "perfrun --probe-dir ./benchmarks --interpreter python3",
                description: "Missing probes are logged and skipped",
            },
            ExampleHelp {
                title: "Machine-readable output",
                command: "perfrun --format json > results.json",
                description: "Metrics in extraction order plus per-probe outcomes",
            },
            ExampleHelp {
                title: "Slow network server startup",
                command: "perfrun --grace-period 5000 --verbose",
                description: "Give the loopback server five seconds before the client starts",
            },
        ];

        let mut output = format!("{}\n", self.section_header("EXAMPLES:", use_colors));
        for example in &examples {
            output.push_str(&example.format(use_colors));
            output.push('\n');
        }
        output
    }

    /// Format the footer with additional resources
    fn format_footer(&self, use_colors: bool) -> String {
        let mut footer = format!("{}\n", self.section_header("ADDITIONAL HELP:", use_colors));

        for (command, description) in [
            ("--help-topic probes", "Probe catalog, run order and output contract"),
            ("--help-topic config", "Environment variables and .env file"),
            ("--help-topic report", "Report layout and formats"),
        ] {
            if use_colors {
                footer.push_str(&format!("  {}: {}\n", command.bright_yellow(), description.white()));
            } else {
                footer.push_str(&format!("  {}: {}\n", command, description));
            }
        }

        footer
    }

    /// Format the probe catalog help
    fn format_probes_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("PROBE CATALOG:", use_colors));

        help.push_str("Probes run one at a time in this order:\n");
        for (idx, kind) in ProbeKind::ALL.iter().enumerate() {
            let name = format!("{:<20}", kind.file_name());
            let name = if use_colors { name.bright_cyan().to_string() } else { name };
            help.push_str(&format!("  {:>2}. {} {:<10} {}\n", idx + 1, name, kind.default_mode().as_str(), kind.description()));
        }

        help.push_str("\nPROBE CONTRACT:\n");
        help.push_str("- Exit code 0 means success; anything else skips metric extraction\n");
        help.push_str("- Metrics are read from stdout lines such as 'Total Primes Found: 42'\n");
        help.push_str("- stderr is logged but never parsed\n");
        help.push_str("- A missing probe file is logged and the run continues\n\n");

        help.push_str("NETWORK PAIR:\n");
        help.push_str("- nettest_server.py is started in the background\n");
        help.push_str("- After the grace period nettest_client.py runs normally\n");
        help.push_str("- The server is then sent SIGTERM and killed if it outlives the teardown timeout\n");
        help.push_str("- If the server cannot be started the client is skipped\n");

        help
    }

    /// Format detailed configuration help
    fn format_configuration_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("CONFIGURATION REFERENCE:", use_colors));

        help.push_str(&EnvManager::display_env_help());
        help.push('\n');

        help.push_str("PARAMETER LIMITS:\n");
        help.push_str(&format!("- Grace period: 0-{} ms\n", crate::defaults::MAX_SERVER_GRACE_MS));
        help.push_str(&format!("- Teardown timeout: 1-{} ms\n", crate::defaults::MAX_SERVER_TEARDOWN_MS));
        help.push_str("- Probe directory must exist\n");
        help.push_str("- PROBE_INTERPRETER=none executes probe files directly\n");

        help
    }

    /// Format report layout help
    fn format_report_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("REPORT FORMAT:", use_colors));

        help.push_str("Sections, in print order (shown only when at least one value was found):\n");
        for section in REPORT_SECTIONS.iter() {
            let fields: Vec<&str> = section.fields.iter().map(|f| f.label).collect();
            help.push_str(&format!("  {}\n      {}\n", section.title, fields.join(", ")));
        }

        help.push_str("\nVALUES:\n");
        help.push_str("- Counts are printed as integers, everything else with two decimals\n");
        help.push_str("- A value missing from a shown section prints as N/A\n");
        help.push_str(&format!("- With no values at all the report reads: {}\n\n", NO_DATA_MESSAGE));

        help.push_str("FORMATS:\n");
        help.push_str("- text: the report above, colored unless --no-color\n");
        help.push_str("- json: metrics object, per-probe outcomes and network teardown details\n");

        help
    }
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable name of the current platform
fn get_platform_name() -> String {
    match std::env::consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "macOS".to_string(),
        "windows" => "Windows".to_string(),
        other => other.to_string(),
    }
}

/// Helper struct for formatting individual options
struct OptionHelp {
    long: &'static str,
    value: &'static str,
    description: &'static str,
    example: Option<&'static str>,
}

impl OptionHelp {
    fn format(&self, use_colors: bool) -> String {
        let long_with_value = if self.value.is_empty() {
            format!("--{}", self.long)
        } else {
            format!("--{} {}", self.long, self.value)
        };

        let mut option_str = if use_colors {
            format!("  {} {}", format!("{:<30}", long_with_value).bright_cyan(), self.description.white())
        } else {
            format!("  {:<30} {}", long_with_value, self.description)
        };

        if let Some(example) = self.example {
            if use_colors {
                option_str.push_str(&format!(
                    "\n{}{}",
                    " ".repeat(33),
                    format!("Example: {}", example).bright_blue().italic()
                ));
            } else {
                option_str.push_str(&format!("\n{}Example: {}", " ".repeat(33), example));
            }
        }

        option_str
    }
}

/// Helper struct for formatting examples
struct ExampleHelp {
    title: &'static str,
    command: &'static str,
    description: &'static str,
}

impl ExampleHelp {
    fn format(&self, use_colors: bool) -> String {
        if use_colors {
            format!(
                "  {}:\n    {}\n    {}\n",
                self.title.bright_yellow().bold(),
                self.command.bright_white(),
                self.description.bright_blue().italic()
            )
        } else {
            format!("  {}:\n    {}\n    {}\n", self.title, self.command, self.description)
        }
    }
}
