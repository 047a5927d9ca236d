//! Performance Orchestrator
//!
//! Runs a fixed, ordered suite of benchmark probes as child processes,
//! extracts named metrics from their free-text output and renders a
//! consolidated performance report. The network probe pair is handled
//! specially: its server half runs in the background for the duration of
//! the client probe and is always torn down afterwards.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, MetricEntry, MetricValue, MetricsTable, ProbeResult, ProbeSpec};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use output::{OutputFormatter, OutputFormatterFactory, OutputCoordinator, PlainFormatter, ColoredFormatter, JsonFormatter};
pub use runner::{ProbeRunner, ProcessRunner, BackgroundServer, TeardownReport};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Interpreter the stock probes are written for
    pub const DEFAULT_INTERPRETER: &str = "python";
    /// Sleep between launching the network server and running the client
    pub const DEFAULT_SERVER_GRACE: Duration = Duration::from_secs(2);
    /// How long a terminated server may take to exit before it is killed
    pub const DEFAULT_SERVER_TEARDOWN: Duration = Duration::from_secs(5);
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    /// Characters of stdout shown when a probe exits with an error
    pub const STDOUT_PREVIEW_CHARS: usize = 500;

    pub const MAX_SERVER_GRACE_MS: u64 = 60_000;
    pub const MAX_SERVER_TEARDOWN_MS: u64 = 120_000;
}
