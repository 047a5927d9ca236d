//! Network test sub-orchestration
//!
//! The network probe is a client/server pair. The server is started in the
//! background, given a fixed grace period to bind its port, and the client
//! is then run like any other blocking probe. Whatever the client does,
//! including panicking inside the orchestrator while it runs, the server is
//! torn down before the section returns.
//!
//! ```text
//! Idle -> ServerStarting -> ServerReady -> ClientRunning -> Teardown -> Done
//!               |                                                      ^
//!               +------------------ launch failed ---------------------+
//! ```

use super::run_logged;
use crate::{
    logging::{ErrorEventLogger, ProbeLogger},
    models::{ProbeResult, ProbeSpec},
    runner::{ProbeRunner, TeardownReport},
};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// States of the network section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkPhase {
    Idle,
    ServerStarting,
    ServerReady,
    ClientRunning,
    Teardown,
    Done,
}

impl NetworkPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkPhase::Idle => "idle",
            NetworkPhase::ServerStarting => "server_starting",
            NetworkPhase::ServerReady => "server_ready",
            NetworkPhase::ClientRunning => "client_running",
            NetworkPhase::Teardown => "teardown",
            NetworkPhase::Done => "done",
        }
    }

    /// Whether `next` is a legal successor of this state
    pub fn allows(&self, next: NetworkPhase) -> bool {
        use NetworkPhase::*;
        matches!(
            (self, next),
            (Idle, ServerStarting)
                | (ServerStarting, ServerReady)
                | (ServerStarting, Done)
                | (ServerReady, ClientRunning)
                | (ClientRunning, Teardown)
                | (Teardown, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == NetworkPhase::Done
    }
}

impl fmt::Display for NetworkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one pass through the network section
#[derive(Debug, Clone, Serialize)]
pub struct NetworkOutcome {
    /// Every state visited, starting with `Idle`
    pub transitions: Vec<NetworkPhase>,
    pub server_pid: Option<u32>,
    /// Why the server could not be launched
    pub server_error: Option<String>,
    /// `None` when the client never ran
    pub client_result: Option<ProbeResult>,
    pub teardown: Option<TeardownReport>,
}

impl NetworkOutcome {
    fn new() -> Self {
        Self {
            transitions: vec![NetworkPhase::Idle],
            server_pid: None,
            server_error: None,
            client_result: None,
            teardown: None,
        }
    }

    /// Current state
    pub fn phase(&self) -> NetworkPhase {
        self.transitions.last().copied().unwrap_or(NetworkPhase::Idle)
    }

    pub fn server_started(&self) -> bool {
        self.server_pid.is_some()
    }
}

/// Runs the server/client pair through one [`ProbeRunner`]
pub struct NetworkSection<'a> {
    runner: &'a dyn ProbeRunner,
    probe_logger: &'a ProbeLogger,
    error_logger: &'a ErrorEventLogger,
    grace: Duration,
    teardown_timeout: Duration,
    outcome: NetworkOutcome,
}

impl<'a> NetworkSection<'a> {
    pub fn new(
        runner: &'a dyn ProbeRunner,
        probe_logger: &'a ProbeLogger,
        error_logger: &'a ErrorEventLogger,
        grace: Duration,
        teardown_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            probe_logger,
            error_logger,
            grace,
            teardown_timeout,
            outcome: NetworkOutcome::new(),
        }
    }

    async fn advance(&mut self, next: NetworkPhase) {
        let current = self.outcome.phase();
        debug_assert!(current.allows(next), "illegal network transition {} -> {}", current, next);

        self.probe_logger.log_transition(current.as_str(), next.as_str()).await;
        self.outcome.transitions.push(next);
    }

    /// Drive the section to `Done`. Never fails; problems are logged and
    /// recorded in the outcome.
    pub async fn run(mut self, server: &ProbeSpec, client: &ProbeSpec) -> NetworkOutcome {
        let correlation_id = self.probe_logger.logger().start_operation("network section").await;
        self.advance(NetworkPhase::ServerStarting).await;

        let handle = match self.runner.spawn(server).await {
            Ok(handle) => handle,
            Err(e) => {
                self.probe_logger.log_server_start_failed(server.name(), &e).await;
                self.outcome.server_error = Some(e.to_string());
                self.advance(NetworkPhase::Done).await;
                self.probe_logger.logger().end_operation(&correlation_id, "network section", false).await;
                return self.outcome;
            }
        };

        self.outcome.server_pid = Some(handle.pid());
        self.probe_logger.log_server_spawn(server.name(), handle.pid(), self.grace).await;

        // No readiness handshake; the grace period stands in for one
        tokio::time::sleep(self.grace).await;
        self.advance(NetworkPhase::ServerReady).await;

        self.advance(NetworkPhase::ClientRunning).await;
        let client_run = run_logged(self.runner, self.probe_logger, client);
        let client_result = match AssertUnwindSafe(client_run).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.error_logger.log_panic(client.name(), &message).await;
                ProbeResult::panicked(client.name(), message)
            }
        };
        let client_ok = client_result.success;
        self.outcome.client_result = Some(client_result);

        self.advance(NetworkPhase::Teardown).await;
        let report = handle.shutdown(self.teardown_timeout).await;
        self.probe_logger.log_teardown(&report).await;
        self.outcome.teardown = Some(report);

        self.advance(NetworkPhase::Done).await;
        self.probe_logger.logger().end_operation(&correlation_id, "network section", client_ok).await;
        self.outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        use NetworkPhase::*;

        assert!(Idle.allows(ServerStarting));
        assert!(ServerStarting.allows(Done));
        assert!(ClientRunning.allows(Teardown));
        assert!(!ClientRunning.allows(Done));
        assert!(!Idle.allows(ClientRunning));
        assert!(!Done.allows(Idle));
        assert!(Done.is_terminal());
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");

        let boxed: Box<dyn Any + Send> = Box::new(17u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }

    #[cfg(unix)]
    mod lifecycle {
        use super::*;
        use crate::models::{Config, ProbeKind};
        use crate::runner::is_process_alive;
        use crate::runner::scripted::{Scripted, ScriptedRunner};
        use crate::types::ProbeStatus;

        struct Harness {
            probe_logger: ProbeLogger,
            error_logger: ErrorEventLogger,
        }

        impl Harness {
            fn new() -> Self {
                let config = Config::default();
                Self {
                    probe_logger: ProbeLogger::new(&config),
                    error_logger: ErrorEventLogger::new(&config),
                }
            }

            async fn run(&self, runner: &ScriptedRunner, teardown: Duration) -> NetworkOutcome {
                NetworkSection::new(runner, &self.probe_logger, &self.error_logger, Duration::from_millis(200), teardown)
                    .run(
                        &ProbeSpec::for_kind(ProbeKind::NetServer),
                        &ProbeSpec::for_kind(ProbeKind::NetClient),
                    )
                    .await
            }
        }

        fn full_path() -> Vec<NetworkPhase> {
            use NetworkPhase::*;
            vec![Idle, ServerStarting, ServerReady, ClientRunning, Teardown, Done]
        }

        fn assert_server_gone(outcome: &NetworkOutcome) {
            let pid = outcome.server_pid.expect("server should have started");
            assert!(!is_process_alive(pid), "server pid {} still alive", pid);
        }

        #[tokio::test]
        async fn test_server_torn_down_after_client_success() {
            let runner = ScriptedRunner::new()
                .with_server_shell("exec sleep 30")
                .with_probe(ProbeKind::NetClient, Scripted::ok("Send Speed: 1.00 MB/s\n"));

            let outcome = Harness::new().run(&runner, Duration::from_secs(5)).await;

            assert_eq!(outcome.transitions, full_path());
            assert!(outcome.client_result.as_ref().unwrap().success);
            assert!(outcome.teardown.as_ref().unwrap().graceful);
            assert_server_gone(&outcome);
        }

        #[tokio::test]
        async fn test_server_torn_down_after_client_failure() {
            let runner = ScriptedRunner::new()
                .with_server_shell("exec sleep 30")
                .with_probe(ProbeKind::NetClient, Scripted::fail(1, "", "ConnectionRefusedError"));

            let outcome = Harness::new().run(&runner, Duration::from_secs(5)).await;

            assert_eq!(outcome.transitions, full_path());
            assert_eq!(outcome.client_result.as_ref().unwrap().status(), ProbeStatus::Failed);
            assert_server_gone(&outcome);
        }

        #[tokio::test]
        async fn test_server_torn_down_after_client_panic() {
            let runner = ScriptedRunner::new()
                .with_server_shell("exec sleep 30")
                .with_probe(ProbeKind::NetClient, Scripted::Panic("client driver exploded".to_string()));

            let outcome = Harness::new().run(&runner, Duration::from_secs(5)).await;

            assert_eq!(outcome.transitions, full_path());
            let client = outcome.client_result.as_ref().unwrap();
            assert!(!client.success);
            assert!(client.stderr.contains("client driver exploded"));
            assert_server_gone(&outcome);
        }

        #[tokio::test]
        async fn test_stubborn_server_is_killed() {
            let runner = ScriptedRunner::new()
                .with_server_shell("trap '' TERM; while true; do sleep 0.1; done")
                .with_probe(ProbeKind::NetClient, Scripted::ok(""));

            let outcome = Harness::new().run(&runner, Duration::from_millis(300)).await;

            let teardown = outcome.teardown.as_ref().unwrap();
            assert!(teardown.forced_kill);
            assert!(!teardown.graceful);
            assert_server_gone(&outcome);
        }

        #[tokio::test]
        async fn test_launch_failure_skips_client() {
            let runner = ScriptedRunner::new()
                .with_probe(ProbeKind::NetClient, Scripted::ok("Send Speed: 1.00 MB/s\n"));

            let outcome = Harness::new().run(&runner, Duration::from_secs(5)).await;

            assert_eq!(
                outcome.transitions,
                vec![NetworkPhase::Idle, NetworkPhase::ServerStarting, NetworkPhase::Done]
            );
            assert!(!outcome.server_started());
            assert!(outcome.server_error.is_some());
            assert!(outcome.client_result.is_none());
            assert!(outcome.teardown.is_none());
            assert_eq!(runner.calls(), vec!["nettest_server.py".to_string()]);
        }

        #[tokio::test]
        async fn test_server_stderr_is_drained() {
            let runner = ScriptedRunner::new()
                .with_server_shell("echo 'Address already in use' >&2; exec sleep 30")
                .with_probe(ProbeKind::NetClient, Scripted::ok(""));

            let outcome = Harness::new().run(&runner, Duration::from_secs(5)).await;

            let teardown = outcome.teardown.as_ref().unwrap();
            assert!(teardown.stderr.contains("Address already in use"));
        }
    }
}
