//! Configuration data model and validation

use crate::types::{AppError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the probe executables live in
    #[serde(default = "default_probe_dir")]
    pub probe_dir: PathBuf,

    /// Interpreter used to launch probe files; `None` runs them directly
    #[serde(default = "default_interpreter")]
    pub interpreter: Option<String>,

    /// Startup grace period for the network server probe
    #[serde(default = "default_server_grace_ms")]
    pub server_grace_ms: u64,

    /// Bound on waiting for the terminated server before it is killed
    #[serde(default = "default_server_teardown_ms")]
    pub server_teardown_ms: u64,

    /// Report output format
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_dir: default_probe_dir(),
            interpreter: default_interpreter(),
            server_grace_ms: default_server_grace_ms(),
            server_teardown_ms: default_server_teardown_ms(),
            output_format: OutputFormat::default(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_grace(&self) -> Duration {
        Duration::from_millis(self.server_grace_ms)
    }

    pub fn server_teardown(&self) -> Duration {
        Duration::from_millis(self.server_teardown_ms)
    }

    /// Full path of a probe file inside the probe directory
    pub fn probe_path(&self, file_name: &str) -> PathBuf {
        self.probe_dir.join(file_name)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.probe_dir.as_os_str().is_empty() {
            return Err(AppError::config("Probe directory cannot be empty"));
        }

        if !self.probe_dir.is_dir() {
            return Err(AppError::config(format!(
                "Probe directory does not exist or is not a directory: {}",
                self.probe_dir.display()
            )));
        }

        if let Some(interpreter) = &self.interpreter {
            if interpreter.trim().is_empty() {
                return Err(AppError::config("Interpreter cannot be an empty string"));
            }
        }

        if self.server_grace_ms > crate::defaults::MAX_SERVER_GRACE_MS {
            return Err(AppError::config(format!(
                "Server grace period cannot exceed {}ms",
                crate::defaults::MAX_SERVER_GRACE_MS
            )));
        }

        if self.server_teardown_ms == 0 {
            return Err(AppError::config("Server teardown timeout must be greater than 0"));
        }

        if self.server_teardown_ms > crate::defaults::MAX_SERVER_TEARDOWN_MS {
            return Err(AppError::config(format!(
                "Server teardown timeout cannot exceed {}ms",
                crate::defaults::MAX_SERVER_TEARDOWN_MS
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(probe_dir) = std::env::var("PROBE_DIR") {
            let probe_dir = probe_dir.trim();
            if !probe_dir.is_empty() {
                self.probe_dir = PathBuf::from(probe_dir);
            }
        }

        if let Ok(interpreter) = std::env::var("PROBE_INTERPRETER") {
            self.interpreter = parse_interpreter(&interpreter);
        }

        if let Ok(grace) = std::env::var("SERVER_GRACE_MS") {
            self.server_grace_ms = grace.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SERVER_GRACE_MS value '{}': {}", grace, e)))?;
        }

        if let Ok(teardown) = std::env::var("SERVER_TEARDOWN_MS") {
            self.server_teardown_ms = teardown.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SERVER_TEARDOWN_MS value '{}': {}", teardown, e)))?;
        }

        if let Ok(format) = std::env::var("OUTPUT_FORMAT") {
            self.output_format = format.parse()
                .map_err(|e| AppError::config(format!("Invalid OUTPUT_FORMAT value '{}': {}", format, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// `""` and `"none"` mean "execute probe files directly"
pub fn parse_interpreter(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

// Default value functions for serde
fn default_probe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_interpreter() -> Option<String> {
    Some(crate::defaults::DEFAULT_INTERPRETER.to_string())
}

fn default_server_grace_ms() -> u64 {
    crate::defaults::DEFAULT_SERVER_GRACE.as_millis() as u64
}

fn default_server_teardown_ms() -> u64 {
    crate::defaults::DEFAULT_SERVER_TEARDOWN.as_millis() as u64
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
