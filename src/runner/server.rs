//! Background server handle and teardown

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// What happened while stopping a background server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeardownReport {
    pub server: String,
    pub pid: u32,
    /// The server had already exited before teardown began
    pub already_exited: bool,
    /// The server exited on its own after the terminate signal
    pub graceful: bool,
    /// The server had to be killed after the teardown timeout
    pub forced_kill: bool,
    pub exit_code: Option<i32>,
    pub exit_status: Option<String>,
    pub stdout: String,
    pub stderr: String,
    /// Problems hit during teardown; logged by the caller, never raised
    pub errors: Vec<String>,
    pub duration: Duration,
}

impl TeardownReport {
    fn new(server: &str, pid: u32) -> Self {
        Self {
            server: server.to_string(),
            pid,
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_stderr(&self) -> bool {
        !self.stderr.trim().is_empty()
    }

    /// Set when the server ignored the terminate signal and had to be killed
    pub fn timeout_error(&self) -> Option<AppError> {
        self.forced_kill.then(|| {
            AppError::timeout(format!(
                "{} (pid {}) did not exit after the terminate signal",
                self.server, self.pid
            ))
        })
    }

    fn record_exit(&mut self, status: ExitStatus) {
        self.exit_code = status.code();
        self.exit_status = Some(status.to_string());
    }
}

/// A probe process running in the background.
///
/// The handle owns the child process. Its output is collected by two reader
/// tasks so the server never stalls on a full pipe. `shutdown` is the normal
/// way out; dropping the handle without it still kills the process.
#[derive(Debug)]
pub struct BackgroundServer {
    name: String,
    pid: u32,
    child: Option<Child>,
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
}

impl BackgroundServer {
    /// Take ownership of a freshly spawned child
    pub fn new(name: impl Into<String>, mut child: Child) -> Result<Self> {
        let name = name.into();
        let pid = child.id().ok_or_else(|| {
            AppError::server_lifecycle(format!("{} exited before its pid could be read", name))
        })?;

        let stdout = child.stdout.take().map(collect_output);
        let stderr = child.stderr.take().map(collect_output);

        Ok(Self {
            name,
            pid,
            child: Some(child),
            stdout,
            stderr,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the process is still running
    pub fn is_alive(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Terminate, wait up to `limit`, kill if still running, then collect
    /// whatever the server printed.
    ///
    /// Never fails; problems end up in `TeardownReport::errors`.
    pub async fn shutdown(mut self, limit: Duration) -> TeardownReport {
        let start = Instant::now();
        let mut report = TeardownReport::new(&self.name, self.pid);

        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    report.already_exited = true;
                    report.record_exit(status);
                }
                Ok(None) => stop_child(&mut child, limit, &mut report).await,
                Err(e) => {
                    report.errors.push(format!("Failed to poll server state: {}", e));
                    stop_child(&mut child, limit, &mut report).await;
                }
            }
        }

        report.stdout = drain(self.stdout.take(), limit, "stdout", &mut report.errors).await;
        report.stderr = drain(self.stderr.take(), limit, "stderr", &mut report.errors).await;
        report.duration = start.elapsed();
        report
    }
}

impl Drop for BackgroundServer {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
        for handle in [self.stdout.take(), self.stderr.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

async fn stop_child(child: &mut Child, limit: Duration, report: &mut TeardownReport) {
    if let Err(e) = send_terminate(child) {
        report.errors.push(format!("Failed to send terminate signal: {}", e));
    }

    match timeout(limit, child.wait()).await {
        Ok(Ok(status)) => {
            report.graceful = true;
            report.record_exit(status);
            return;
        }
        Ok(Err(e)) => report.errors.push(format!("Failed to wait for server exit: {}", e)),
        Err(_) => {}
    }

    report.forced_kill = true;
    if let Err(e) = child.kill().await {
        report.errors.push(format!("Failed to kill server: {}", e));
    }
    match child.try_wait() {
        Ok(Some(status)) => report.record_exit(status),
        Ok(None) => report.errors.push("Server still running after kill".to_string()),
        Err(e) => report.errors.push(format!("Failed to reap server: {}", e)),
    }
}

fn collect_output<R>(mut reader: R) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        // A read error just truncates what we keep
        let _ = reader.read_to_end(&mut buf).await;
        String::from_utf8_lossy(&buf).into_owned()
    })
}

// Output readers only finish once every holder of the pipe is gone, which a
// server that forked helpers may never allow
async fn drain(
    handle: Option<JoinHandle<String>>,
    limit: Duration,
    stream: &str,
    errors: &mut Vec<String>,
) -> String {
    let Some(mut handle) = handle else {
        return String::new();
    };

    match timeout(limit, &mut handle).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            errors.push(format!("Failed to collect server {}: {}", stream, e));
            String::new()
        }
        Err(_) => {
            handle.abort();
            errors.push(format!("Timed out collecting server {}", stream));
            String::new()
        }
    }
}

#[cfg(unix)]
fn send_terminate(child: &mut Child) -> std::io::Result<()> {
    use std::io;

    let Some(pid) = child.id() else {
        // Already reaped
        return Ok(());
    };
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

    // SAFETY: signals a child we own and have not reaped, so the pid cannot
    // have been recycled
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) -> std::io::Result<()> {
    child.start_kill()
}

/// Whether a process with `pid` exists and has not exited.
///
/// Exited-but-unreaped (zombie) processes count as dead.
#[cfg(target_os = "linux")]
pub fn is_process_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }

    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => !matches!(process_state(&stat), Some('Z') | Some('X')),
        Err(_) => false,
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid == 0 {
        return false;
    }

    // SAFETY: signal 0 only checks for existence
    unsafe { libc::kill(pid, 0) == 0 }
}

#[cfg(not(unix))]
pub fn is_process_alive(_pid: u32) -> bool {
    false
}

// State letter from /proc/<pid>/stat; the command name may itself contain
// spaces and parentheses, so scan from the last ')'
#[cfg(target_os = "linux")]
fn process_state(stat: &str) -> Option<char> {
    let rest = &stat[stat.rfind(')')? + 1..];
    rest.trim_start().chars().next()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::{ProbeKind, ProbeSpec};
    use crate::runner::{ProbeRunner, ProcessRunner};
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_server(dir: &Path, body: &str) {
        let path = dir.join(ProbeKind::NetServer.file_name());
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    async fn spawn_server(dir: &Path) -> BackgroundServer {
        ProcessRunner::new(dir, None)
            .spawn(&ProbeSpec::for_kind(ProbeKind::NetServer))
            .await
            .unwrap()
    }

    async fn wait_until_dead(pid: u32) -> bool {
        for _ in 0..50 {
            if !is_process_alive(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_graceful_shutdown() {
        let dir = TempDir::new().unwrap();
        write_server(dir.path(), "exec sleep 30");

        let mut server = spawn_server(dir.path()).await;
        let pid = server.pid();
        assert!(server.is_alive());
        assert!(is_process_alive(pid));

        let report = server.shutdown(Duration::from_secs(5)).await;
        assert!(report.graceful);
        assert!(!report.forced_kill);
        assert!(report.is_clean(), "{:?}", report.errors);
        assert!(report.timeout_error().is_none());
        assert!(!is_process_alive(pid));
    }

    #[tokio::test]
    async fn test_forced_kill_after_timeout() {
        let dir = TempDir::new().unwrap();
        write_server(dir.path(), "trap '' TERM\nwhile true; do sleep 0.1; done");

        let server = spawn_server(dir.path()).await;
        let pid = server.pid();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let report = server.shutdown(Duration::from_millis(300)).await;
        assert!(!report.graceful);
        assert!(report.forced_kill);
        assert_eq!(report.timeout_error().unwrap().category(), "TIMEOUT");
        assert!(wait_until_dead(pid).await);
    }

    #[tokio::test]
    async fn test_output_is_collected() {
        let dir = TempDir::new().unwrap();
        write_server(dir.path(), "echo 'Server listening'\necho 'bind warning' >&2\nexec sleep 30");

        let server = spawn_server(dir.path()).await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        let report = server.shutdown(Duration::from_secs(5)).await;
        assert!(report.stdout.contains("Server listening"));
        assert!(report.has_stderr());
        assert!(report.stderr.contains("bind warning"));
    }

    #[tokio::test]
    async fn test_already_exited_server() {
        let dir = TempDir::new().unwrap();
        write_server(dir.path(), "echo bye\nexit 4");

        let mut server = spawn_server(dir.path()).await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!server.is_alive());

        let report = server.shutdown(Duration::from_secs(1)).await;
        assert!(report.already_exited);
        assert_eq!(report.exit_code, Some(4));
        assert!(report.stdout.contains("bye"));
    }

    #[tokio::test]
    async fn test_drop_kills_process() {
        let dir = TempDir::new().unwrap();
        write_server(dir.path(), "exec sleep 30");

        let server = spawn_server(dir.path()).await;
        let pid = server.pid();
        drop(server);

        assert!(wait_until_dead(pid).await);
    }

    #[test]
    fn test_pid_zero_is_never_alive() {
        assert!(!is_process_alive(0));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_process_state_parsing() {
        assert_eq!(process_state("123 (sleep) S 1 2 3"), Some('S'));
        assert_eq!(process_state("77 (odd) name) Z 1"), Some('Z'));
        assert_eq!(process_state("garbage"), None);
        assert!(is_process_alive(std::process::id()));
    }
}
