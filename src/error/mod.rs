//! Error handling for the performance orchestrator

use thiserror::Error;

/// Custom error types for the performance orchestrator
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Probe executable missing from the probe directory
    #[error("Probe not found: {0}")]
    ProbeNotFound(String),

    /// Probe process could not be spawned
    #[error("Probe spawn error: {0}")]
    ProbeSpawn(String),

    /// Probe ran but did not complete successfully
    #[error("Probe execution error: {0}")]
    ProbeExecution(String),

    /// Background server start/stop problems
    #[error("Server lifecycle error: {0}")]
    ServerLifecycle(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// I/O errors (pipes, files, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (numbers, patterns, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Report rendering errors
    #[error("Report error: {0}")]
    Report(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new probe-not-found error
    pub fn probe_not_found<S: Into<String>>(message: S) -> Self {
        Self::ProbeNotFound(message.into())
    }

    /// Create a new probe spawn error
    pub fn probe_spawn<S: Into<String>>(message: S) -> Self {
        Self::ProbeSpawn(message.into())
    }

    /// Create a new probe execution error
    pub fn probe_execution<S: Into<String>>(message: S) -> Self {
        Self::ProbeExecution(message.into())
    }

    /// Create a new server lifecycle error
    pub fn server_lifecycle<S: Into<String>>(message: S) -> Self {
        Self::ServerLifecycle(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new report error
    pub fn report<S: Into<String>>(message: S) -> Self {
        Self::Report(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::ProbeNotFound(_) => "NOT_FOUND",
            Self::ProbeSpawn(_) => "SPAWN",
            Self::ProbeExecution(_) => "PROBE",
            Self::ServerLifecycle(_) => "SERVER",
            Self::Timeout(_) => "TIMEOUT",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Report(_) => "REPORT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether the orchestrator skips the affected probe and keeps going
    pub fn is_probe_local(&self) -> bool {
        match self {
            Self::ProbeNotFound(_) | Self::ProbeSpawn(_) | Self::ProbeExecution(_) => true,
            Self::ServerLifecycle(_) | Self::Timeout(_) => true,
            Self::Config(_) | Self::Parse(_) => false,
            Self::Io(_) | Self::Report(_) | Self::Internal(_) => false,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file, environment variables or command line arguments.", msg)
            }
            Self::ProbeNotFound(msg) => {
                format!("Probe missing: {}\n\nSuggestion: Point --probe-dir at the directory holding the probe scripts.", msg)
            }
            Self::ProbeSpawn(msg) => {
                format!("Could not start probe: {}\n\nSuggestion: Check that the interpreter is installed and on PATH, or use --no-interpreter.", msg)
            }
            Self::ProbeExecution(msg) => {
                format!("Probe failed: {}\n\nSuggestion: Run the probe by hand to see its full output.", msg)
            }
            Self::ServerLifecycle(msg) => {
                format!("Network server problem: {}\n\nSuggestion: Make sure no other process holds the loopback test port.", msg)
            }
            Self::Timeout(msg) => {
                format!("Operation timed out: {}\n\nSuggestion: Increase --teardown-timeout if the server needs longer to exit.", msg)
            }
            Self::Io(msg) => {
                format!("I/O operation failed: {}\n\nSuggestion: Check file permissions and disk space.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input values.", msg)
            }
            Self::Report(msg) => {
                format!("Report rendering failed: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::ProbeNotFound(_) | Self::ProbeSpawn(_) | Self::ProbeExecution(_) => 2,
            Self::ServerLifecycle(_) | Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::Report(_) => 6,
            Self::Internal(_) => 99,  // Internal/unexpected errors
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::ProbeNotFound(_) | Self::ProbeSpawn(_) | Self::ProbeExecution(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::ServerLifecycle(_) | Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) | Self::Report(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<regex::Error> for AppError {
    fn from(error: regex::Error) -> Self {
        Self::internal(format!("Invalid extraction pattern: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Float parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<std::fmt::Error> for AppError {
    fn from(error: std::fmt::Error) -> Self {
        Self::report(format!("Formatting failed: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user-facing error output
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
