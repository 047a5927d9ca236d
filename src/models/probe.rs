//! Probe definitions and probe run results

use crate::error::AppError;
use crate::types::{ProbeStatus, RunMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Every probe the orchestrator knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeKind {
    Render2d,
    Render3d,
    SeedGen,
    Cpu,
    Memory,
    FileIo,
    SimulatedGpu,
    RealGpu,
    NetServer,
    NetClient,
}

impl ProbeKind {
    /// All kinds in catalog order
    pub const ALL: [ProbeKind; 10] = [
        ProbeKind::Render2d,
        ProbeKind::Render3d,
        ProbeKind::SeedGen,
        ProbeKind::Cpu,
        ProbeKind::Memory,
        ProbeKind::FileIo,
        ProbeKind::SimulatedGpu,
        ProbeKind::RealGpu,
        ProbeKind::NetServer,
        ProbeKind::NetClient,
    ];

    /// File name the probe is expected under, relative to the probe directory
    pub fn file_name(&self) -> &'static str {
        match self {
            ProbeKind::Render2d => "2dtest.py",
            ProbeKind::Render3d => "3dtest.py",
            ProbeKind::SeedGen => "mcseedgen.py",
            ProbeKind::Cpu => "cputest.py",
            ProbeKind::Memory => "memorytest.py",
            ProbeKind::FileIo => "fileiotest.py",
            ProbeKind::SimulatedGpu => "gputest.py",
            ProbeKind::RealGpu => "real_gputest.py",
            ProbeKind::NetServer => "nettest_server.py",
            ProbeKind::NetClient => "nettest_client.py",
        }
    }

    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ProbeKind::Render2d => "2D sprite rendering frame rate",
            ProbeKind::Render3d => "3D cube rendering frame rate",
            ProbeKind::SeedGen => "Seed generation throughput",
            ProbeKind::Cpu => "Prime search (CPU bound)",
            ProbeKind::Memory => "Allocation churn",
            ProbeKind::FileIo => "Sequential file write/read",
            ProbeKind::SimulatedGpu => "Matrix multiplication on the CPU",
            ProbeKind::RealGpu => "Matrix multiplication via OpenCL",
            ProbeKind::NetServer => "Loopback echo server",
            ProbeKind::NetClient => "Loopback echo throughput",
        }
    }

    pub fn default_mode(&self) -> RunMode {
        match self {
            ProbeKind::NetServer => RunMode::Background,
            _ => RunMode::Blocking,
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A probe as the runner sees it: what to launch and how to wait on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSpec {
    pub kind: ProbeKind,
    pub file_name: String,
    pub args: Vec<String>,
    pub mode: RunMode,
}

impl ProbeSpec {
    /// Spec with the stock file name and run mode for `kind`
    pub fn for_kind(kind: ProbeKind) -> Self {
        Self {
            kind,
            file_name: kind.file_name().to_string(),
            args: Vec::new(),
            mode: kind.default_mode(),
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.file_name
    }
}

/// Why a probe did not produce usable output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProbeFailure {
    /// Executable missing
    NotFound { path: PathBuf },
    /// The OS refused to start the process
    SpawnFailed { message: String },
    /// Process exited with a non-zero code
    NonZeroExit { code: i32 },
    /// Process ended without an exit code (killed by a signal)
    Terminated,
    /// The orchestrator itself failed while driving the probe
    Panicked { message: String },
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::NotFound { path } => write!(f, "Script '{}' not found.", path.display()),
            ProbeFailure::SpawnFailed { message } => write!(f, "failed to start: {}", message),
            ProbeFailure::NonZeroExit { code } => write!(f, "exited with error code {}", code),
            ProbeFailure::Terminated => f.write_str("terminated by signal"),
            ProbeFailure::Panicked { message } => write!(f, "aborted: {}", message),
        }
    }
}

/// Outcome of one blocking probe run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Probe file name
    pub probe: String,
    /// `true` iff the process exited with code 0
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub failure: Option<ProbeFailure>,
}

impl ProbeResult {
    /// Build a result from a process that ran to completion
    pub fn from_exit(
        probe: impl Into<String>,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        let failure = match exit_code {
            Some(0) => None,
            Some(code) => Some(ProbeFailure::NonZeroExit { code }),
            None => Some(ProbeFailure::Terminated),
        };

        Self {
            probe: probe.into(),
            success: failure.is_none(),
            exit_code,
            stdout,
            stderr,
            duration,
            failure,
        }
    }

    /// Result for a probe whose executable does not exist
    pub fn not_found(probe: impl Into<String>, path: PathBuf) -> Self {
        let failure = ProbeFailure::NotFound { path };
        Self::failed_without_run(probe, failure)
    }

    /// Result for a probe the OS could not start
    pub fn spawn_failed(probe: impl Into<String>, message: impl Into<String>) -> Self {
        let failure = ProbeFailure::SpawnFailed { message: message.into() };
        Self::failed_without_run(probe, failure)
    }

    /// Result for a probe whose driver panicked
    pub fn panicked(probe: impl Into<String>, message: impl Into<String>) -> Self {
        let failure = ProbeFailure::Panicked { message: message.into() };
        Self::failed_without_run(probe, failure)
    }

    fn failed_without_run(probe: impl Into<String>, failure: ProbeFailure) -> Self {
        Self {
            probe: probe.into(),
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: failure.to_string(),
            duration: Duration::ZERO,
            failure: Some(failure),
        }
    }

    pub fn status(&self) -> ProbeStatus {
        match &self.failure {
            None => ProbeStatus::Success,
            Some(ProbeFailure::NotFound { .. }) => ProbeStatus::NotFound,
            Some(_) => ProbeStatus::Failed,
        }
    }

    /// First `max_chars` characters of stdout
    pub fn stdout_preview(&self, max_chars: usize) -> &str {
        match self.stdout.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.stdout[..idx],
            None => &self.stdout,
        }
    }

    /// Whether the process actually started; failures before launch carry
    /// their own message in `stderr`
    pub fn ran(&self) -> bool {
        !matches!(
            self.failure,
            Some(ProbeFailure::NotFound { .. })
                | Some(ProbeFailure::SpawnFailed { .. })
                | Some(ProbeFailure::Panicked { .. })
        )
    }

    pub fn has_stderr(&self) -> bool {
        !self.stderr.trim().is_empty()
    }

    /// The failure as an application error, for logging
    pub fn error(&self) -> Option<AppError> {
        let failure = self.failure.as_ref()?;
        let message = format!("{}: {}", self.probe, failure);
        Some(match failure {
            ProbeFailure::NotFound { .. } => AppError::probe_not_found(message),
            ProbeFailure::SpawnFailed { .. } => AppError::probe_spawn(message),
            ProbeFailure::NonZeroExit { .. } | ProbeFailure::Terminated | ProbeFailure::Panicked { .. } => {
                AppError::probe_execution(message)
            }
        })
    }
}
