//! Probe sequencing
//!
//! The orchestrator walks a fixed catalog of probes in order. Each blocking
//! probe is run to completion; if it succeeds its stdout goes through the
//! probe's extractor and the resulting metrics are merged into the run's
//! [`MetricsTable`]. The network pair is handed to [`network::NetworkSection`],
//! which owns the background server for its whole lifetime.
//!
//! Failures never stop the run: every probe that cannot be found, fails to
//! start or exits non-zero is logged and skipped.

pub mod network;

pub use network::{NetworkOutcome, NetworkPhase, NetworkSection};

use crate::{
    error::Result,
    extract::Extractor,
    logging::{ErrorEventLogger, LoggerFactory, ProbeLogger},
    models::{Config, MetricsTable, ProbeKind, ProbeResult, ProbeSpec},
    runner::{ProbeRunner, ProcessRunner},
    types::ProbeStatus,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A probe together with the extractor for its output
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub spec: ProbeSpec,
    pub extractor: Extractor,
}

impl CatalogEntry {
    pub fn for_kind(kind: ProbeKind) -> Result<Self> {
        Ok(Self {
            spec: ProbeSpec::for_kind(kind),
            extractor: Extractor::for_kind(kind)?,
        })
    }
}

/// One step of the run
#[derive(Debug, Clone)]
pub enum PlanStep {
    /// A blocking probe
    Single(CatalogEntry),
    /// A background server that must be up while the client runs
    Paired { server: ProbeSpec, client: CatalogEntry },
}

/// Ordered, immutable list of steps
#[derive(Debug, Clone)]
pub struct ProbeCatalog {
    steps: Vec<PlanStep>,
}

impl ProbeCatalog {
    /// The stock suite: eight blocking probes, then the network pair
    pub fn standard() -> Result<Self> {
        let singles = [
            ProbeKind::Render2d,
            ProbeKind::Render3d,
            ProbeKind::SeedGen,
            ProbeKind::Cpu,
            ProbeKind::Memory,
            ProbeKind::FileIo,
            ProbeKind::SimulatedGpu,
            ProbeKind::RealGpu,
        ];

        let mut steps = singles
            .into_iter()
            .map(|kind| CatalogEntry::for_kind(kind).map(PlanStep::Single))
            .collect::<Result<Vec<_>>>()?;

        steps.push(PlanStep::Paired {
            server: ProbeSpec::for_kind(ProbeKind::NetServer),
            client: CatalogEntry::for_kind(ProbeKind::NetClient)?,
        });

        Ok(Self { steps })
    }

    pub fn from_steps(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Every probe in launch order, servers before their clients
    pub fn probes(&self) -> Vec<&ProbeSpec> {
        self.steps
            .iter()
            .flat_map(|step| match step {
                PlanStep::Single(entry) => vec![&entry.spec],
                PlanStep::Paired { server, client } => vec![server, &client.spec],
            })
            .collect()
    }
}

/// What happened to one blocking probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeOutcome {
    pub probe: String,
    pub kind: ProbeKind,
    pub status: ProbeStatus,
    pub exit_code: Option<i32>,
    pub duration: Duration,
    /// Metrics this probe added to the table
    pub metrics_added: usize,
    pub message: Option<String>,
}

impl ProbeOutcome {
    fn from_result(kind: ProbeKind, result: &ProbeResult, metrics_added: usize) -> Self {
        Self {
            probe: result.probe.clone(),
            kind,
            status: result.status(),
            exit_code: result.exit_code,
            duration: result.duration,
            metrics_added,
            message: result.failure.as_ref().map(ToString::to_string),
        }
    }

    fn skipped(spec: &ProbeSpec, reason: &str) -> Self {
        Self {
            probe: spec.name().to_string(),
            kind: spec.kind,
            status: ProbeStatus::Skipped,
            exit_code: None,
            duration: Duration::ZERO,
            metrics_added: 0,
            message: Some(reason.to_string()),
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub session_id: String,
    pub metrics: MetricsTable,
    pub probes: Vec<ProbeOutcome>,
    pub network: Option<NetworkOutcome>,
    pub duration: Duration,
}

impl RunOutcome {
    pub fn count(&self, status: ProbeStatus) -> usize {
        self.probes.iter().filter(|p| p.status == status).count()
    }

    /// Probes that were actually launched or looked for
    pub fn attempted(&self) -> usize {
        self.probes.len() - self.count(ProbeStatus::Skipped)
    }
}

/// Drives the catalog through a [`ProbeRunner`]
pub struct Orchestrator {
    config: Config,
    runner: Arc<dyn ProbeRunner>,
    catalog: ProbeCatalog,
    probe_logger: ProbeLogger,
    error_logger: ErrorEventLogger,
    session_id: String,
}

impl Orchestrator {
    /// Orchestrator for the stock catalog, launching real processes
    pub async fn from_config(config: Config) -> Result<Self> {
        let runner = Arc::new(ProcessRunner::from_config(&config));
        Self::new(config, runner, ProbeCatalog::standard()?).await
    }

    pub async fn new(config: Config, runner: Arc<dyn ProbeRunner>, catalog: ProbeCatalog) -> Result<Self> {
        let factory = LoggerFactory::new(config.clone());
        let probe_logger = factory.create_probe_logger().await;
        let error_logger = factory.create_error_logger().await;
        let session_id = factory.session_id().to_string();

        Ok(Self {
            config,
            runner,
            catalog,
            probe_logger,
            error_logger,
            session_id,
        })
    }

    pub fn catalog(&self) -> &ProbeCatalog {
        &self.catalog
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run every step in order and collect the metrics
    pub async fn run(&self) -> RunOutcome {
        let start = Instant::now();
        let mut metrics = MetricsTable::new();
        let mut probes = Vec::new();
        let mut network = None;

        crate::log_info!(
            self.probe_logger.logger(),
            "Starting run of {} probe(s) with the {} runner",
            self.catalog.probes().len(),
            self.runner.name()
        );

        for step in self.catalog.steps() {
            match step {
                PlanStep::Single(entry) => {
                    let result = run_logged(self.runner.as_ref(), &self.probe_logger, &entry.spec).await;
                    probes.push(self.absorb(entry, &result, &mut metrics).await);
                }
                PlanStep::Paired { server, client } => {
                    let section = NetworkSection::new(
                        self.runner.as_ref(),
                        &self.probe_logger,
                        &self.error_logger,
                        self.config.server_grace(),
                        self.config.server_teardown(),
                    );
                    let outcome = section.run(server, &client.spec).await;

                    probes.push(match &outcome.client_result {
                        Some(result) => self.absorb(client, result, &mut metrics).await,
                        None => ProbeOutcome::skipped(&client.spec, "network server failed to start"),
                    });
                    network = Some(outcome);
                }
            }
        }

        RunOutcome {
            session_id: self.session_id.clone(),
            metrics,
            probes,
            network,
            duration: start.elapsed(),
        }
    }

    // Extraction only happens for successful runs
    async fn absorb(&self, entry: &CatalogEntry, result: &ProbeResult, metrics: &mut MetricsTable) -> ProbeOutcome {
        let mut added = 0;
        if result.success {
            let entries = entry.extractor.extract(&result.stdout);
            let extracted = entries.len();
            added = metrics.extend(entries);
            self.probe_logger.log_metrics_extracted(&result.probe, extracted, added).await;
        }

        ProbeOutcome::from_result(entry.spec.kind, result, added)
    }
}

/// Run one blocking probe with start and result logging
pub(crate) async fn run_logged(runner: &dyn ProbeRunner, logger: &ProbeLogger, probe: &ProbeSpec) -> ProbeResult {
    logger.log_probe_start(probe, &runner.command_line(probe)).await;
    let result = runner.run(probe).await;
    logger.log_probe_result(&result).await;
    result
}
