//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        // Existing process variables are not overwritten by the file
        EnvManager::load_env_file()?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.cli.probe_dir {
            config.probe_dir = dir.clone();
        }

        if self.cli.no_interpreter {
            config.interpreter = None;
        } else if let Some(interpreter) = &self.cli.interpreter {
            config.interpreter = crate::models::config::parse_interpreter(interpreter);
        }

        if let Some(grace) = self.cli.grace_period {
            config.server_grace_ms = grace;
        }

        if let Some(teardown) = self.cli.teardown_timeout {
            config.server_teardown_ms = teardown;
        }

        if let Some(format) = self.cli.format {
            config.output_format = format;
        }

        if let Some(color) = self.cli.color_override() {
            config.enable_color = color;
        }

        // CLI-only switches
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let summary = [
        format!("Probe Directory: {}", config.probe_dir.display()),
        format!("Interpreter: {}", config.interpreter.as_deref().unwrap_or("none (direct execution)")),
        format!("Server Grace Period: {}ms", config.server_grace_ms),
        format!("Server Teardown Timeout: {}ms", config.server_teardown_ms),
        format!("Output Format: {}", config.output_format),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}
