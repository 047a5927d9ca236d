//! Environment variable handling and .env file management

use crate::{
    error::{AppError, Result},
    models::config::parse_interpreter,
    types::OutputFormat,
};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if it exists.
    ///
    /// Variables already set in the process environment win over the file.
    /// Returns whether a file was loaded.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    /// Load a specific env file if it exists
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {} file: {}", path.display(), e)))?;
        Ok(true)
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Performance Orchestrator Configuration
#
# Values here are used as defaults and can be overridden by variables set
# in the shell or by command-line arguments.

# Directory containing the probe files
# PROBE_DIR=/opt/benchmarks

# Interpreter used to launch probes ("none" executes them directly)
# PROBE_INTERPRETER=python

# Network server startup grace period in milliseconds
# SERVER_GRACE_MS=2000

# How long the terminated network server may take to exit, in milliseconds
# SERVER_TEARDOWN_MS=5000

# Report format (text or json)
# OUTPUT_FORMAT=text

# Enable colored output (true/false)
# ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "PROBE_DIR" => {
                if value.trim().is_empty() {
                    return Err(AppError::config("PROBE_DIR cannot be empty"));
                }
            }
            "PROBE_INTERPRETER" => {
                if let Some(interpreter) = parse_interpreter(value) {
                    if interpreter.contains(char::is_whitespace) {
                        return Err(AppError::config(format!(
                            "PROBE_INTERPRETER must be a single program, got: '{}'",
                            interpreter
                        )));
                    }
                }
            }
            "SERVER_GRACE_MS" => {
                let grace: u64 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid SERVER_GRACE_MS value '{}': {}", value, e)))?;
                if grace > crate::defaults::MAX_SERVER_GRACE_MS {
                    return Err(AppError::config(format!(
                        "SERVER_GRACE_MS must be at most {}, got: {}",
                        crate::defaults::MAX_SERVER_GRACE_MS, grace
                    )));
                }
            }
            "SERVER_TEARDOWN_MS" => {
                let teardown: u64 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid SERVER_TEARDOWN_MS value '{}': {}", value, e)))?;
                if teardown == 0 || teardown > crate::defaults::MAX_SERVER_TEARDOWN_MS {
                    return Err(AppError::config(format!(
                        "SERVER_TEARDOWN_MS must be between 1 and {}, got: {}",
                        crate::defaults::MAX_SERVER_TEARDOWN_MS, teardown
                    )));
                }
            }
            "OUTPUT_FORMAT" => {
                value.parse::<OutputFormat>()
                    .map_err(|e| AppError::config(format!("Invalid OUTPUT_FORMAT value '{}': {}", value, e)))?;
            }
            "ENABLE_COLOR" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PROBE_DIR", "Directory containing the probe files", "/opt/benchmarks"),
            ("PROBE_INTERPRETER", "Interpreter for probes, or 'none'", "python3"),
            ("SERVER_GRACE_MS", "Network server startup grace period (ms)", "2000"),
            ("SERVER_TEARDOWN_MS", "Network server termination wait (ms)", "5000"),
            ("OUTPUT_FORMAT", "Report format (text or json)", "json"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<20} {}\n", var, description));
            help.push_str(&format!("  {:<20} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }

    /// Validate the entries of an env file without loading it
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {} file: {}", path.display(), e)))?;

        let warnings = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                let value = value.trim().trim_matches('"');
                Self::validate_env_var(key.trim(), value)
                    .err()
                    .map(|e| format!("Line '{}': {}", line, e))
            })
            .collect();

        Ok(Some(warnings))
    }
}
