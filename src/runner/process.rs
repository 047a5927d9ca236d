//! Child-process probe runner

use super::{BackgroundServer, ProbeRunner};
use crate::{
    error::{AppError, Result},
    models::{Config, ProbeResult, ProbeSpec},
};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

/// Runs probes found in a probe directory, optionally through an interpreter
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    probe_dir: PathBuf,
    interpreter: Option<String>,
}

impl ProcessRunner {
    pub fn new(probe_dir: impl Into<PathBuf>, interpreter: Option<String>) -> Self {
        Self {
            probe_dir: probe_dir.into(),
            interpreter,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.probe_dir.clone(), config.interpreter.clone())
    }

    pub fn probe_dir(&self) -> &Path {
        &self.probe_dir
    }

    pub fn interpreter(&self) -> Option<&str> {
        self.interpreter.as_deref()
    }

    /// Location of a probe's executable
    pub fn probe_path(&self, probe: &ProbeSpec) -> PathBuf {
        self.probe_dir.join(&probe.file_name)
    }

    fn command(&self, path: &Path, probe: &ProbeSpec) -> Command {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(path);
                cmd
            }
            None => Command::new(path),
        };

        cmd.args(&probe.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    // The program the OS tried to execute, for "not found" reporting
    fn launched_program(&self, path: &Path) -> PathBuf {
        match &self.interpreter {
            Some(interpreter) => PathBuf::from(interpreter),
            None => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ProbeRunner for ProcessRunner {
    async fn run(&self, probe: &ProbeSpec) -> ProbeResult {
        let path = self.probe_path(probe);
        if !path.is_file() {
            return ProbeResult::not_found(probe.name(), path);
        }

        let start = Instant::now();
        let output = match self.command(&path, probe).output().await {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return ProbeResult::not_found(probe.name(), self.launched_program(&path));
            }
            Err(e) => return ProbeResult::spawn_failed(probe.name(), e.to_string()),
        };

        ProbeResult::from_exit(
            probe.name(),
            output.status.code(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            start.elapsed(),
        )
    }

    async fn spawn(&self, probe: &ProbeSpec) -> Result<BackgroundServer> {
        let path = self.probe_path(probe);
        if !path.is_file() {
            return Err(AppError::probe_not_found(format!(
                "Script '{}' not found.",
                path.display()
            )));
        }

        let child = self.command(&path, probe).spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::probe_not_found(format!(
                    "'{}' not found while starting {}",
                    self.launched_program(&path).display(),
                    probe.name()
                ))
            } else {
                AppError::probe_spawn(format!("Failed to start {}: {}", probe.name(), e))
            }
        })?;

        BackgroundServer::new(probe.name(), child)
    }

    fn command_line(&self, probe: &ProbeSpec) -> Vec<String> {
        let mut line = Vec::with_capacity(probe.args.len() + 2);
        if let Some(interpreter) = &self.interpreter {
            line.push(interpreter.clone());
        }
        line.push(self.probe_path(probe).display().to_string());
        line.extend(probe.args.iter().cloned());
        line
    }
}
