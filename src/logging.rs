//! Structured logging system for the performance orchestrator
//!
//! This module provides the logging used throughout a run:
//! - Structured logging with multiple levels and contexts
//! - Debug mode detailed tracing with source locations
//! - Probe lifecycle logging (start, exit, failures, server teardown)
//! - Error event logging with correlation IDs
//! - JSON structured output for integration with log aggregators
//!
//! Every log line goes to stderr; stdout is reserved for the report.

use crate::error::{AppError, Result};
use crate::models::{Config, ProbeResult, ProbeSpec};
use crate::runner::TeardownReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - run progress
    Info = 2,
    /// Warning level - a probe failed or misbehaved
    Warn = 3,
    /// Error level - a step was skipped but the run continues
    Error = 4,
    /// Fatal level - the run cannot start
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",    // White
            LogLevel::Debug => "\x1b[36m",    // Cyan
            LogLevel::Info => "\x1b[32m",     // Green
            LogLevel::Warn => "\x1b[33m",     // Yellow
            LogLevel::Error => "\x1b[31m",    // Red
            LogLevel::Fatal => "\x1b[35m",    // Magenta
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: HashMap<String, serde_json::Value>,
    /// Thread ID if available
    pub thread_id: Option<String>,
    /// File and line information
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Logger implementation with multiple output formats
pub struct Logger {
    /// Minimum log level to output
    min_level: LogLevel,
    /// Whether to use colored output
    use_color: bool,
    /// Whether to include location information
    include_location: bool,
    /// Output format
    format: LogFormat,
    /// Logger name
    name: String,
    /// Shared context storage
    context: Arc<RwLock<LogContext>>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
}

/// Shared logging context for correlation and session tracking
#[derive(Debug, Default)]
struct LogContext {
    /// Correlation ID for the whole run
    session_id: Option<String>,
    /// Current operation correlation ID
    current_correlation_id: Option<String>,
}

/// Logger for probe runs and the background server lifecycle
pub struct ProbeLogger {
    logger: Logger,
    preview_chars: usize,
}

/// Error event logger with enhanced context
pub struct ErrorEventLogger {
    logger: Logger,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Start a correlated operation
    pub async fn start_operation(&self, operation_name: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        {
            let mut context = self.context.write().await;
            context.current_correlation_id = Some(correlation_id.clone());
        }

        self.debug(&format!("Started operation: {}", operation_name))
            .correlation_id(&correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "start")
            .log()
            .await;

        correlation_id
    }

    /// End a correlated operation
    pub async fn end_operation(&self, correlation_id: &str, operation_name: &str, success: bool) {
        self.debug(&format!("Completed operation: {} (success: {})", operation_name, success))
            .correlation_id(correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "end")
            .field("success", success)
            .log()
            .await;

        let mut context = self.context.write().await;
        if context.current_correlation_id.as_deref() == Some(correlation_id) {
            context.current_correlation_id = None;
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    /// Convenience methods for different log levels
    pub fn debug(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Write log entry to output
    async fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }
        if entry.correlation_id.is_none() {
            entry.correlation_id = context.current_correlation_id.clone();
        }
        drop(context);

        let output = self.format_entry(&entry);
        let _ = writeln!(io::stderr(), "{}", output);
    }

    fn format_entry(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
        }
    }

    /// Format log entry for console output
    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}",
            timestamp,
            formatted_level,
            entry.logger,
            entry.message
        );

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        // Multi-line values (captured stderr) are printed below the entry
        let mut trailing = Vec::new();
        let mut fields: Vec<(&String, &serde_json::Value)> = entry.fields.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let inline: Vec<String> = fields.into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::String(s) if s.contains('\n') => {
                    trailing.push(format!("  {}:\n{}", k, indent(s.trim_end(), "    ")));
                    None
                }
                _ => Some(format!("{}={}", k, v)),
            })
            .collect();
        if !inline.is_empty() {
            output.push_str(&format!(" {{{}}}", inline.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        for block in trailing {
            output.push('\n');
            output.push_str(&block);
        }

        output
    }

    /// Format log entry as JSON
    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => serde_json::json!({
                "error": "Failed to serialize log entry",
                "message": entry.message,
            })
            .to_string(),
        }
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
                thread_id: std::thread::current().name().map(String::from),
                location: None,
            },
        }
    }

    /// Add a correlation ID
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add location information
    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add the outcome of a probe run
    pub fn probe_result(self, result: &ProbeResult) -> Self {
        self.field("probe", &result.probe)
            .field("success", result.success)
            .field("exit_code", result.exit_code)
            .field("status", result.status().as_str())
            .field("duration_ms", millis(result.duration))
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_probe_local", error.is_probe_local())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl ProbeLogger {
    /// Create a new probe logger
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("PROBE".to_string(), config),
            preview_chars: crate::defaults::STDOUT_PREVIEW_CHARS,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Log that a probe is about to run
    pub async fn log_probe_start(&self, probe: &ProbeSpec, command_line: &[String]) {
        self.logger.info(&format!("Running {}...", probe.name()))
            .field("probe", probe.name())
            .field("mode", probe.mode.as_str())
            .field("command", command_line.join(" "))
            .log()
            .await;
    }

    /// Log the outcome of a blocking probe run.
    ///
    /// A failed run logs the exit code and a truncated stdout preview.
    /// Stderr output of a probe that ran is logged separately, even on
    /// success.
    pub async fn log_probe_result(&self, result: &ProbeResult) {
        match &result.failure {
            None => {
                self.logger.info(&format!("{} finished in {:.2}s", result.probe, result.duration.as_secs_f64()))
                    .probe_result(result)
                    .log()
                    .await;
            }
            Some(failure) => {
                let mut builder = self.logger.warn(&format!("{}: {}", result.probe, failure))
                    .probe_result(result);
                if let Some(error) = result.error() {
                    builder = builder.error_info(&error);
                }
                if !result.stdout.is_empty() {
                    builder = builder.field("stdout_preview", result.stdout_preview(self.preview_chars));
                }
                builder.log().await;
            }
        }

        if result.has_stderr() && result.ran() {
            self.log_stderr(&result.probe, &result.stderr).await;
        }
    }

    /// Log how many metrics a probe contributed
    pub async fn log_metrics_extracted(&self, probe: &str, extracted: usize, added: usize) {
        self.logger.debug(&format!("Extracted {} metric(s) from {}", extracted, probe))
            .field("probe", probe)
            .field("extracted", extracted)
            .field("added", added)
            .log()
            .await;
    }

    /// Log stderr output of a probe
    pub async fn log_stderr(&self, probe: &str, stderr: &str) {
        self.logger.warn(&format!("Errors from {}", probe))
            .field("probe", probe)
            .field("stderr", stderr.trim_end())
            .log()
            .await;
    }

    /// Log a background server launch
    pub async fn log_server_spawn(&self, server: &str, pid: u32, grace: Duration) {
        self.logger.info(&format!("Started {} in the background (pid {})", server, pid))
            .field("probe", server)
            .field("pid", pid)
            .field("grace_ms", millis(grace))
            .log()
            .await;
    }

    /// Log a failed background server launch
    pub async fn log_server_start_failed(&self, server: &str, error: &AppError) {
        self.logger.error("Network server failed to start, skipping client test.")
            .field("probe", server)
            .error_info(error)
            .field("error", error.to_string())
            .log()
            .await;
    }

    /// Log a state change of the network section
    pub async fn log_transition(&self, from: &str, to: &str) {
        self.logger.debug(&format!("Network section: {} -> {}", from, to))
            .field("from", from)
            .field("to", to)
            .log()
            .await;
    }

    /// Log the result of stopping a background server
    pub async fn log_teardown(&self, report: &TeardownReport) {
        let how = if report.already_exited {
            "had already exited"
        } else if report.graceful {
            "stopped"
        } else {
            "killed after teardown timeout"
        };

        let level = if report.forced_kill { LogLevel::Warn } else { LogLevel::Info };
        let mut builder = self.logger.log(level, &format!("{} {} (pid {})", report.server, how, report.pid))
            .field("probe", &report.server)
            .field("pid", report.pid)
            .field("graceful", report.graceful)
            .field("forced_kill", report.forced_kill)
            .field("exit_status", &report.exit_status)
            .field("duration_ms", millis(report.duration));
        if let Some(error) = report.timeout_error() {
            builder = builder.error_info(&error);
        }
        builder.log().await;

        for problem in &report.errors {
            self.logger.warn(&format!("Teardown of {}: {}", report.server, problem))
                .field("probe", &report.server)
                .field("pid", report.pid)
                .log()
                .await;
        }

        if report.has_stderr() {
            self.log_stderr(&report.server, &report.stderr).await;
        }
    }
}

impl ErrorEventLogger {
    /// Create a new error event logger
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("ERR".to_string(), config),
        }
    }

    /// Log a panic caught while driving a probe
    pub async fn log_panic(&self, probe: &str, message: &str) {
        self.logger.error(&format!("Orchestration of {} panicked: {}", probe, message))
            .field("probe", probe)
            .field("panic", message)
            .log()
            .await;
    }
}

/// Creates the loggers for one run, all sharing a session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    /// Create a new logger factory
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    /// Create a probe logger
    pub async fn create_probe_logger(&self) -> ProbeLogger {
        let probe_logger = ProbeLogger::new(&self.config);
        probe_logger.logger.set_session_id(self.session_id.clone()).await;
        probe_logger
    }

    /// Create an error event logger
    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        let error_logger = ErrorEventLogger::new(&self.config);
        error_logger.logger.set_session_id(self.session_id.clone()).await;
        error_logger
    }

    /// Get session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProbeKind;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Warn,
            message: message.to_string(),
            logger: "PROBE".to_string(),
            correlation_id: None,
            fields: HashMap::new(),
            thread_id: None,
            location: None,
        }
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_logger_levels_follow_config() {
        let quiet = Logger::with_config("T".to_string(), &Config::default());
        assert_eq!(quiet.min_level, LogLevel::Warn);
        assert_eq!(quiet.format, LogFormat::Console);

        let verbose = Logger::with_config("T".to_string(), &Config { verbose: true, ..Default::default() });
        assert_eq!(verbose.min_level, LogLevel::Info);

        let debug = Logger::with_config("T".to_string(), &Config { debug: true, enable_color: false, ..Default::default() });
        assert_eq!(debug.min_level, LogLevel::Debug);
        assert_eq!(debug.format, LogFormat::Json);
        assert!(debug.include_location);
        assert!(!debug.use_color);
    }

    #[test]
    fn test_session_id_management() {
        tokio_test::block_on(async {
            let logger = Logger::new("TEST".to_string());
            logger.set_session_id("test-session".to_string()).await;

            let context = logger.context.read().await;
            assert_eq!(context.session_id.as_deref(), Some("test-session"));
        });
    }

    #[tokio::test]
    async fn test_operation_correlation() {
        let logger = Logger::new("TEST".to_string());
        let correlation_id = logger.start_operation("network section").await;
        assert!(!correlation_id.is_empty());
        assert_eq!(logger.context.read().await.current_correlation_id.as_deref(), Some(correlation_id.as_str()));

        logger.end_operation(&correlation_id, "network section", true).await;
        assert!(logger.context.read().await.current_correlation_id.is_none());
    }

    #[test]
    fn test_would_log() {
        let mut logger = Logger::new("TEST".to_string());
        logger.min_level = LogLevel::Warn;

        assert!(!logger.would_log(LogLevel::Debug));
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
        assert!(logger.would_log(LogLevel::Fatal));
    }

    #[test]
    fn test_console_format() {
        let mut logger = Logger::new("PROBE".to_string());
        logger.use_color = false;

        let mut e = entry("cputest.py: exited with error code 1");
        e.correlation_id = Some("abc".to_string());
        e.fields.insert("exit_code".to_string(), serde_json::json!(1));
        e.fields.insert("stderr".to_string(), serde_json::json!("Traceback\n  boom\n"));

        let out = logger.format_console(&e);
        let first = out.lines().next().unwrap();
        assert!(first.contains(" WARN [PROBE] cputest.py: exited with error code 1"));
        assert!(first.contains("[abc]"));
        assert!(first.contains("exit_code=1"));
        assert!(out.contains("  stderr:\n    Traceback\n      boom"));
    }

    #[test]
    fn test_json_format() {
        let logger = Logger::new("PROBE".to_string());
        let e = entry("Errors from memorytest.py");

        let json: serde_json::Value = serde_json::from_str(&logger.format_json(&e)).unwrap();
        assert_eq!(json["level"], "Warn");
        assert_eq!(json["message"], "Errors from memorytest.py");
    }

    #[tokio::test]
    async fn test_probe_result_fields() {
        let logger = Logger::new("PROBE".to_string());
        let result = ProbeResult::from_exit("cputest.py", Some(2), String::new(), "bad".into(), Duration::from_millis(1500));

        let builder = logger.warn("x").probe_result(&result);
        assert_eq!(builder.entry.fields["probe"], "cputest.py");
        assert_eq!(builder.entry.fields["exit_code"], 2);
        assert_eq!(builder.entry.fields["status"], "failed");
        assert_eq!(builder.entry.fields["duration_ms"], 1500.0);
    }

    #[tokio::test]
    async fn test_probe_logger_paths() {
        let probe_logger = ProbeLogger::new(&Config::default());
        assert_eq!(probe_logger.logger().name(), "PROBE");

        let spec = ProbeSpec::for_kind(ProbeKind::Cpu);
        probe_logger.log_probe_start(&spec, &["python".to_string(), "cputest.py".to_string()]).await;

        let ok = ProbeResult::from_exit("cputest.py", Some(0), "out".into(), "note".into(), Duration::ZERO);
        probe_logger.log_probe_result(&ok).await;

        let missing = ProbeResult::not_found("gputest.py", PathBuf::from("/p/gputest.py"));
        probe_logger.log_probe_result(&missing).await;

        let report = TeardownReport {
            server: "nettest_server.py".to_string(),
            pid: 42,
            forced_kill: true,
            errors: vec!["Timed out collecting server stdout".to_string()],
            stderr: "Address in use".to_string(),
            ..Default::default()
        };
        probe_logger.log_teardown(&report).await;
    }

    #[tokio::test]
    async fn test_error_logging() {
        let err_logger = ErrorEventLogger::new(&Config::default());
        err_logger.log_panic("nettest_client.py", "index out of bounds").await;
    }

    #[tokio::test]
    async fn test_logger_factory_shares_session() {
        let factory = LoggerFactory::new(Config::default());
        let session = factory.session_id().to_string();
        assert!(!session.is_empty());

        let logger = factory.create_logger("RUN").await;
        assert_eq!(logger.name(), "RUN");
        assert_eq!(logger.context.read().await.session_id.as_deref(), Some(session.as_str()));

        let probe_logger = factory.create_probe_logger().await;
        assert_eq!(probe_logger.logger.context.read().await.session_id.as_deref(), Some(session.as_str()));

        let error_logger = factory.create_error_logger().await;
        assert_eq!(error_logger.logger.name(), "ERR");
    }

    #[test]
    fn test_log_entry_serialization() {
        let e = entry("Test");
        let json = serde_json::to_string(&e).unwrap();
        let deserialized: LogEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.level, LogLevel::Warn);
        assert_eq!(deserialized.message, "Test");
        assert_eq!(deserialized.logger, "PROBE");
    }
}
