//! Probe execution
//!
//! This module contains the process-level side of the orchestrator:
//! - The `ProbeRunner` trait, the seam the orchestrator drives probes through
//! - `ProcessRunner`, which launches probes as child processes
//! - `BackgroundServer`, the owned handle of a probe started in the background

pub mod process;
pub mod server;

#[cfg(all(test, unix))]
pub(crate) mod scripted;

pub use process::ProcessRunner;
pub use server::{is_process_alive, BackgroundServer, TeardownReport};

use crate::{
    error::Result,
    models::{ProbeResult, ProbeSpec},
};
use async_trait::async_trait;

/// Launches probes on behalf of the orchestrator
#[async_trait]
pub trait ProbeRunner: Send + Sync {
    /// Run a probe to completion and capture its output.
    ///
    /// Never fails: a missing executable, a spawn error or a non-zero exit
    /// all come back as a `ProbeResult` with `success == false`.
    async fn run(&self, probe: &ProbeSpec) -> ProbeResult;

    /// Start a probe without waiting for it
    async fn spawn(&self, probe: &ProbeSpec) -> Result<BackgroundServer>;

    /// Program and arguments that launch `probe`, for logs and help output
    fn command_line(&self, probe: &ProbeSpec) -> Vec<String> {
        vec![probe.name().to_string()]
    }

    /// Runner name for logging
    fn name(&self) -> &str {
        "process"
    }
}
