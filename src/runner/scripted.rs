//! In-memory runner for orchestration tests

use super::{BackgroundServer, ProbeRunner};
use crate::{
    error::{AppError, Result},
    models::{ProbeKind, ProbeResult, ProbeSpec},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

/// Canned behaviour of one blocking probe
#[derive(Debug, Clone)]
pub enum Scripted {
    Exit { code: i32, stdout: String, stderr: String },
    Panic(String),
}

impl Scripted {
    pub fn ok(stdout: &str) -> Self {
        Scripted::Exit { code: 0, stdout: stdout.to_string(), stderr: String::new() }
    }

    pub fn fail(code: i32, stdout: &str, stderr: &str) -> Self {
        Scripted::Exit { code, stdout: stdout.to_string(), stderr: stderr.to_string() }
    }
}

/// Answers `run` from a table and starts background probes as `sh -c` bodies.
/// Probes without an entry behave as missing.
#[derive(Default)]
pub struct ScriptedRunner {
    probes: HashMap<ProbeKind, Scripted>,
    server_shell: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(mut self, kind: ProbeKind, script: Scripted) -> Self {
        self.probes.insert(kind, script);
        self
    }

    pub fn with_server_shell(mut self, body: &str) -> Self {
        self.server_shell = Some(body.to_string());
        self
    }

    /// Probe names in the order they were launched
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, probe: &ProbeSpec) {
        self.calls.lock().unwrap().push(probe.name().to_string());
    }
}

#[async_trait]
impl ProbeRunner for ScriptedRunner {
    async fn run(&self, probe: &ProbeSpec) -> ProbeResult {
        self.record(probe);
        match self.probes.get(&probe.kind) {
            None => ProbeResult::not_found(probe.name(), PathBuf::from(probe.name())),
            Some(Scripted::Exit { code, stdout, stderr }) => ProbeResult::from_exit(
                probe.name(),
                Some(*code),
                stdout.clone(),
                stderr.clone(),
                Duration::from_millis(1),
            ),
            Some(Scripted::Panic(message)) => panic!("{}", message),
        }
    }

    async fn spawn(&self, probe: &ProbeSpec) -> Result<BackgroundServer> {
        self.record(probe);
        let Some(body) = &self.server_shell else {
            return Err(AppError::probe_not_found(format!("Script '{}' not found.", probe.name())));
        };

        let child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(body)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        BackgroundServer::new(probe.name(), child)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
